//! Wire types for the storefront API

use rust_decimal::Decimal;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

/// `{ "data": ... }` wrapper around every JSON response
#[derive(Debug, Deserialize)]
pub(crate) struct Envelope<T> {
    pub(crate) data: Option<T>,
}

/// A product in the catalog
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Cosmetic {
    /// Catalog identifier
    pub id: u64,
    /// Display name
    pub name: String,
    /// URL-safe lookup key
    pub slug: String,
    /// Long description
    #[serde(default)]
    pub description: String,
    /// Storage path of the main image
    pub thumbnail: String,
    /// Current unit price
    pub price: Decimal,
    /// Whether the product is flagged as popular this year
    #[serde(default, deserialize_with = "flag")]
    pub is_popular: bool,
    /// Category summary, when the endpoint embeds it
    #[serde(default)]
    pub category: Option<Category>,
    /// Brand summary, when the endpoint embeds it
    #[serde(default)]
    pub brand: Option<Brand>,
    /// Highlighted benefits
    #[serde(default)]
    pub benefits: Vec<Benefit>,
    /// Extra gallery photos
    #[serde(default)]
    pub photos: Vec<Photo>,
    /// Customer reviews
    #[serde(default)]
    pub testimonials: Vec<Testimonial>,
}

impl Cosmetic {
    /// Brand name, or an empty string when the brand is not embedded
    #[must_use]
    pub fn brand_name(&self) -> &str {
        self.brand.as_ref().map_or("", |brand| brand.name.as_str())
    }
}

/// Product category
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Category {
    /// Category identifier
    pub id: u64,
    /// Display name
    pub name: String,
    /// URL-safe lookup key
    pub slug: String,
    /// Storage path of the category icon
    #[serde(default)]
    pub photo: Option<String>,
    /// Number of products in the category
    #[serde(default)]
    pub cosmetics_count: Option<u32>,
    /// Products in the category (detail endpoint only)
    #[serde(default)]
    pub cosmetics: Vec<Cosmetic>,
    /// Popular products in the category (detail endpoint only)
    #[serde(default)]
    pub popular_cosmetics: Vec<Cosmetic>,
}

/// Product brand
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Brand {
    /// Brand identifier
    pub id: u64,
    /// Display name
    pub name: String,
    /// URL-safe lookup key
    pub slug: String,
    /// Storage path of the brand logo
    #[serde(default)]
    pub photo: Option<String>,
}

/// One highlighted product benefit
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Benefit {
    /// Benefit identifier
    pub id: u64,
    /// Benefit text
    pub name: String,
}

/// A gallery photo
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Photo {
    /// Photo identifier
    pub id: u64,
    /// Storage path
    pub photo: String,
}

/// A customer review
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Testimonial {
    /// Review identifier
    pub id: u64,
    /// Reviewer name
    pub name: String,
    /// Review text
    pub message: String,
    /// Reviewer avatar path
    #[serde(default)]
    pub photo: String,
    /// Rating out of five
    pub rating: u8,
}

/// Proof-of-payment attachment, passed through to the server untouched
#[derive(Clone, PartialEq, Eq)]
pub struct ProofOfPayment {
    /// Original file name
    pub file_name: String,
    /// MIME type sent with the multipart part
    pub content_type: String,
    /// File contents
    pub bytes: Vec<u8>,
}

impl ProofOfPayment {
    /// Build an attachment, inferring the content type from the file extension
    #[must_use]
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let file_name = file_name.into();
        let extension = file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();
        let content_type = match extension.as_str() {
            "png" => "image/png",
            "jpg" | "jpeg" => "image/jpeg",
            "webp" => "image/webp",
            "pdf" => "application/pdf",
            _ => "application/octet-stream",
        };

        Self {
            file_name,
            content_type: content_type.to_string(),
            bytes,
        }
    }

    /// Size of the attachment in bytes
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the attachment carries no data
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl std::fmt::Debug for ProofOfPayment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProofOfPayment")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// One product line of a booking
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingItem {
    /// Catalog identifier
    pub id: u64,
    /// Quantity ordered
    pub quantity: u8,
}

/// Payload of `POST /booking-transaction`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BookingRequest {
    /// Buyer name
    pub name: String,
    /// Buyer email
    pub email: String,
    /// Buyer phone
    pub phone: String,
    /// Shipping address
    pub address: String,
    /// Shipping post code
    pub post_code: String,
    /// Shipping city
    pub city: String,
    /// Ordered products
    pub items: Vec<BookingItem>,
    /// Payment proof
    pub proof: ProofOfPayment,
}

impl BookingRequest {
    /// Text fields of the multipart form, in submission order
    ///
    /// Items are flattened as `cosmetic_ids[i][id]` / `cosmetic_ids[i][quantity]`.
    #[must_use]
    pub fn form_fields(&self) -> Vec<(String, String)> {
        let mut fields = vec![
            ("name".to_string(), self.name.clone()),
            ("email".to_string(), self.email.clone()),
            ("phone".to_string(), self.phone.clone()),
            ("address".to_string(), self.address.clone()),
            ("post_code".to_string(), self.post_code.clone()),
            ("city".to_string(), self.city.clone()),
        ];

        for (index, item) in self.items.iter().enumerate() {
            fields.push((format!("cosmetic_ids[{index}][id]"), item.id.to_string()));
            fields.push((
                format!("cosmetic_ids[{index}][quantity]"),
                item.quantity.to_string(),
            ));
        }

        fields
    }
}

/// Result of a successful booking submission
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct BookingReceipt {
    /// Transaction identifier used by the confirmation and lookup views
    pub booking_trx_id: String,
}

/// Payload of `POST /check-booking`
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct CheckBookingRequest {
    /// Transaction identifier from the confirmation view
    pub booking_trx_id: String,
    /// Email the booking was made with
    pub email: String,
}

/// A booking as stored by the server
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct BookingDetails {
    /// Booking identifier
    pub id: u64,
    /// Buyer name
    pub name: String,
    /// Buyer phone
    #[serde(deserialize_with = "string_or_number")]
    pub phone: String,
    /// Buyer email
    pub email: String,
    /// Transaction identifier
    pub booking_trx_id: String,
    /// Storage path of the uploaded proof
    #[serde(default)]
    pub proof: Option<String>,
    /// Grand total charged
    pub total_amount: Decimal,
    /// Tax portion of the total
    pub total_tax_amount: Decimal,
    /// Total before tax
    pub sub_total_amount: Decimal,
    /// Total quantity
    pub quantity: u32,
    /// Whether payment has been confirmed
    #[serde(deserialize_with = "flag")]
    pub is_paid: bool,
    /// Shipping address
    pub address: String,
    /// Shipping post code
    #[serde(deserialize_with = "string_or_number")]
    pub post_code: String,
    /// Shipping city
    pub city: String,
    /// Booked products
    #[serde(default)]
    pub transaction_details: Vec<TransactionDetail>,
}

/// One booked product line
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct TransactionDetail {
    /// Line identifier
    pub id: u64,
    /// Unit price at booking time
    pub price: Decimal,
    /// Catalog identifier
    pub cosmetic_id: u64,
    /// Quantity booked
    pub quantity: u32,
    /// Product snapshot
    #[serde(default)]
    pub cosmetic: Option<Cosmetic>,
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(D::Error::custom(format!(
            "expected string or number, found {other}"
        ))),
    }
}

// Booleans sometimes arrive as 0/1 from the backend
fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Bool(b) => Ok(b),
        serde_json::Value::Number(n) => Ok(n.as_f64().is_some_and(|v| v != 0.0)),
        serde_json::Value::Null => Ok(false),
        other => Err(D::Error::custom(format!("expected boolean, found {other}"))),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde::de::DeserializeOwned;

    fn unwrap_data<T: DeserializeOwned>(body: &str) -> Option<T> {
        serde_json::from_str::<Envelope<T>>(body).unwrap().data
    }

    #[test]
    fn test_cosmetic_from_minimal_payload() {
        let json = r#"{
            "id": 7,
            "name": "Glow Serum",
            "slug": "glow-serum",
            "thumbnail": "thumbnails/glow.png",
            "price": 125000,
            "is_popular": 1,
            "brand": { "id": 2, "name": "Aurora", "slug": "aurora" }
        }"#;

        let cosmetic: Cosmetic = serde_json::from_str(json).unwrap();
        assert_eq!(cosmetic.price, dec!(125000));
        assert!(cosmetic.is_popular);
        assert_eq!(cosmetic.brand_name(), "Aurora");
        assert!(cosmetic.photos.is_empty());
        assert!(cosmetic.category.is_none());
    }

    #[test]
    fn test_envelope_with_null_data() {
        let envelope: Envelope<Cosmetic> = serde_json::from_str(r#"{"data": null}"#).unwrap();
        assert!(envelope.data.is_none());

        let envelope: Envelope<Cosmetic> = serde_json::from_str("{}").unwrap();
        assert!(envelope.data.is_none());
    }

    #[test]
    fn test_envelope_for_any_deserializable_payload() {
        let categories: Option<Vec<Category>> =
            unwrap_data(r#"{"data": [{"id": 1, "name": "Serum", "slug": "serum", "photo": "categories/serum.png"}]}"#);
        assert_eq!(categories.unwrap()[0].slug, "serum");

        let receipt: Option<BookingReceipt> = unwrap_data(r#"{"message": "queued"}"#);
        assert!(receipt.is_none());
    }

    #[test]
    fn test_booking_details_accepts_numeric_phone() {
        let json = r#"{
            "id": 1,
            "name": "Sari",
            "phone": 81234567,
            "email": "sari@example.com",
            "booking_trx_id": "SHAYNA123",
            "proof": null,
            "total_amount": 222000,
            "total_tax_amount": 22000,
            "sub_total_amount": 200000,
            "quantity": 2,
            "is_paid": false,
            "address": "Jl. Melati 1",
            "post_code": "40115",
            "city": "Bandung"
        }"#;

        let details: BookingDetails = serde_json::from_str(json).unwrap();
        assert_eq!(details.phone, "81234567");
        assert_eq!(details.total_amount, dec!(222000));
        assert!(details.transaction_details.is_empty());
    }

    #[test]
    fn test_form_fields_flatten_items() {
        let request = BookingRequest {
            name: "Sari".to_string(),
            email: "sari@example.com".to_string(),
            phone: "0812".to_string(),
            address: "Jl. Melati 1".to_string(),
            post_code: "40115".to_string(),
            city: "Bandung".to_string(),
            items: vec![
                BookingItem { id: 3, quantity: 2 },
                BookingItem { id: 9, quantity: 1 },
            ],
            proof: ProofOfPayment::new("transfer.png", vec![1, 2, 3]),
        };

        let fields = request.form_fields();
        assert_eq!(fields.len(), 10);
        assert_eq!(fields[6], ("cosmetic_ids[0][id]".to_string(), "3".to_string()));
        assert_eq!(
            fields[9],
            ("cosmetic_ids[1][quantity]".to_string(), "1".to_string())
        );
    }

    #[test]
    fn test_proof_content_type() {
        assert_eq!(ProofOfPayment::new("a.JPG", vec![1]).content_type, "image/jpeg");
        assert_eq!(ProofOfPayment::new("a.pdf", vec![1]).content_type, "application/pdf");
        assert_eq!(
            ProofOfPayment::new("receipt", vec![1]).content_type,
            "application/octet-stream"
        );
        assert!(ProofOfPayment::new("empty.png", Vec::new()).is_empty());
    }
}
