//! `shayna`: command-line front end for the storefront cart.
//!
//! Every invocation is one "page visit": the persisted cart is loaded and
//! reconciled against the live catalog before the command runs.

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use shayna_api::{ApiClient, ProofOfPayment};
use shayna_core::environment::SystemClock;
use shayna_runtime::Store;
use shayna_storefront::{
    format_idr, BookingLookupForm, BookingLookupReducer, BookingProfile, CartAction,
    CartEnvironment, CartReducer, CartState, CartStatus, FileStore, LookupAction,
    LookupEnvironment, LookupState, LookupStatus, StorefrontConfig,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "shayna", version, about = "Shayna cosmetics storefront cart")]
struct Cli {
    /// Override SHAYNA_API_URL
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Override SHAYNA_STATE_DIR
    #[arg(long, global = true)]
    state_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show the reconciled cart and totals
    Show,
    /// Add a product to the cart
    Add {
        /// Catalog id of the product
        product_id: u64,
        /// Product slug
        slug: String,
    },
    /// Remove a product from the cart
    Remove {
        /// Product slug
        slug: String,
    },
    /// Increase the quantity of a product
    Inc {
        /// Product slug
        slug: String,
    },
    /// Decrease the quantity of a product
    Dec {
        /// Product slug
        slug: String,
    },
    /// Save the buyer details used for the booking
    Profile {
        /// Buyer name
        #[arg(long)]
        name: String,
        /// Buyer email
        #[arg(long)]
        email: String,
        /// Buyer phone
        #[arg(long)]
        phone: String,
        /// Shipping address
        #[arg(long)]
        address: String,
        /// Shipping post code
        #[arg(long)]
        post_code: String,
        /// Shipping city
        #[arg(long)]
        city: String,
    },
    /// Submit the booking with a proof-of-payment file
    Pay {
        /// Path to the transfer receipt
        proof: PathBuf,
    },
    /// Look up a booking
    Check {
        /// Transaction id from the confirmation
        booking_trx_id: String,
        /// Email used for the booking
        email: String,
    },
}

type CartStore = Store<CartState, CartAction, CartEnvironment, CartReducer>;

/// Upper bound for one command, reconciliation included.
const COMMAND_BUDGET: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "shayna=warn,shayna_storefront=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let mut config = StorefrontConfig::from_env()?;
    if let Some(api_url) = cli.api_url {
        config.api_url = api_url;
    }
    if let Some(state_dir) = cli.state_dir {
        config.state_dir = state_dir;
    }
    config.validate()?;
    tracing::debug!(api_url = %config.api_url, state_dir = %config.state_dir.display(), "configuration loaded");

    let client = Arc::new(config.api_client()?);

    if let Command::Check {
        booking_trx_id,
        email,
    } = cli.command
    {
        return check_booking(client, booking_trx_id, email).await;
    }

    let env = CartEnvironment::new(
        Arc::new(FileStore::new(&config.state_dir)),
        client.clone(),
        client,
        Arc::new(SystemClock),
    );
    let store = Store::new(CartState::new(), CartReducer::new(), env);
    dispatch(&store, CartAction::LoadCart).await?;

    let action = match cli.command {
        Command::Show => None,
        Command::Add { product_id, slug } => Some(CartAction::AddToCart { product_id, slug }),
        Command::Remove { slug } => Some(CartAction::RemoveFromCart { slug }),
        Command::Inc { slug } => Some(CartAction::IncrementQuantity { slug }),
        Command::Dec { slug } => Some(CartAction::DecrementQuantity { slug }),
        Command::Profile {
            name,
            email,
            phone,
            address,
            post_code,
            city,
        } => Some(CartAction::SaveBookingProfile {
            profile: BookingProfile {
                name,
                email,
                phone,
                address,
                post_code,
                city,
            },
        }),
        Command::Pay { proof } => {
            let bytes = tokio::fs::read(&proof)
                .await
                .with_context(|| format!("reading {}", proof.display()))?;
            let file_name = proof
                .file_name()
                .map_or_else(|| "proof".to_string(), |n| n.to_string_lossy().into_owned());
            Some(CartAction::SubmitBooking {
                proof: Some(ProofOfPayment::new(file_name, bytes)),
            })
        },
        Command::Check { .. } => None,
    };

    if let Some(action) = action {
        dispatch(&store, action).await?;
    }

    // A newly added line has no product data until the next pass.
    let unresolved = store
        .state(|s| s.status == CartStatus::Ready && !s.is_reconciled())
        .await;
    if unresolved {
        dispatch(&store, CartAction::LoadCart).await?;
    }

    let state = store.state(Clone::clone).await;
    print_state(&state, &config);
    store.shutdown(Duration::from_secs(5)).await?;

    if !state.field_errors.is_empty() {
        bail!("command rejected");
    }
    Ok(())
}

async fn dispatch(store: &CartStore, action: CartAction) -> anyhow::Result<()> {
    store
        .send(action)
        .await?
        .wait_with_timeout(COMMAND_BUDGET)
        .await
        .context("storefront API did not answer in time")?;
    Ok(())
}

async fn check_booking(
    client: Arc<ApiClient>,
    booking_trx_id: String,
    email: String,
) -> anyhow::Result<()> {
    let store = Store::new(
        LookupState::default(),
        BookingLookupReducer::new(),
        LookupEnvironment::new(client),
    );

    store
        .send(LookupAction::LookupBooking {
            form: BookingLookupForm {
                booking_trx_id,
                email,
            },
        })
        .await?
        .wait()
        .await;

    let state = store.state(Clone::clone).await;
    for (field, message) in &state.field_errors {
        println!("{field}: {message}");
    }

    match (state.status, state.details) {
        (LookupStatus::Found, Some(details)) => {
            println!("Booking {}", details.booking_trx_id);
            println!("  {} <{}>, {}", details.name, details.email, details.phone);
            println!("  {}, {} {}", details.address, details.city, details.post_code);
            println!("  Paid: {}", if details.is_paid { "yes" } else { "awaiting confirmation" });
            for line in &details.transaction_details {
                let name = line
                    .cosmetic
                    .as_ref()
                    .map_or_else(|| format!("#{}", line.cosmetic_id), |c| c.name.clone());
                println!("  {name} x{} @ {}", line.quantity, format_idr(line.price));
            }
            println!("  Subtotal {}", format_idr(details.sub_total_amount));
            println!("  Tax      {}", format_idr(details.total_tax_amount));
            println!("  Total    {}", format_idr(details.total_amount));
            Ok(())
        },
        (LookupStatus::NotFound, _) => bail!("no booking matches that id and email"),
        _ => bail!(
            "lookup failed: {}",
            state.last_error.unwrap_or_else(|| "invalid input".to_string())
        ),
    }
}

fn print_state(state: &CartState, config: &StorefrontConfig) {
    if let Some(notice) = &state.notice {
        println!("{notice}");
    }
    for (field, message) in &state.field_errors {
        println!("  {field}: {message}");
    }

    if let CartStatus::Submitted { booking_trx_id } = &state.status {
        println!("Booking finished. Transaction id: {booking_trx_id}");
        return;
    }

    if state.cart.is_empty() {
        println!("Your cart is empty.");
        return;
    }

    for resolved in state.resolved_lines() {
        println!(
            "{:<24} {:<12} x{:<2} {:>16}  {}",
            resolved.product.name,
            resolved.product.brand_name(),
            resolved.line.quantity,
            format_idr(resolved.line_total()),
            config.media(&resolved.product.thumbnail),
        );
    }

    if let Some(totals) = state.totals() {
        println!("Quantity   {}", totals.quantity);
        println!("Subtotal   {}", format_idr(totals.subtotal));
        println!("Tax (11%)  {}", format_idr(totals.tax));
        println!("Total      {}", format_idr(totals.grand_total));
    }
}
