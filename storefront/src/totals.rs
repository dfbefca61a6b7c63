//! Order totals and Rupiah formatting.

use crate::types::ResolvedCartLine;
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;

/// Fixed tax rate applied to the subtotal
pub const TAX_RATE: Decimal = dec!(0.11);

/// Totals derived from the resolved cart
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct OrderTotals {
    /// Sum of line quantities
    pub quantity: u32,
    /// Sum of `price × quantity`
    pub subtotal: Decimal,
    /// `subtotal × TAX_RATE`
    pub tax: Decimal,
    /// `subtotal + tax`
    pub grand_total: Decimal,
}

impl OrderTotals {
    /// Compute totals at full precision
    #[must_use]
    pub fn from_lines(lines: &[ResolvedCartLine]) -> Self {
        let quantity = lines
            .iter()
            .map(|resolved| u32::from(resolved.line.quantity.get()))
            .sum();
        let subtotal: Decimal = lines.iter().map(ResolvedCartLine::line_total).sum();
        let tax = subtotal * TAX_RATE;

        Self {
            quantity,
            subtotal,
            tax,
            grand_total: subtotal + tax,
        }
    }
}

/// Format an amount as Indonesian Rupiah, e.g. `Rp 222.000`
///
/// Rounds half away from zero to whole rupiah; the amount itself is not
/// modified.
#[must_use]
pub fn format_idr(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    let digits = rounded.abs().trunc().normalize().to_string();

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, digit) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(digit);
    }

    if rounded.is_sign_negative() && !rounded.is_zero() {
        format!("-Rp {grouped}")
    } else {
        format!("Rp {grouped}")
    }
}
