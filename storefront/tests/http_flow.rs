//! Cart reconciliation and booking against a mocked HTTP API.

#![allow(clippy::unwrap_used)] // Test code

use rust_decimal_macros::dec;
use serde_json::json;
use shayna_api::{ApiClient, ProofOfPayment};
use shayna_runtime::Store;
use shayna_storefront::persistence::CART_KEY;
use shayna_storefront::{
    BookingLookupForm, BookingLookupReducer, BookingProfile, CartAction, CartEnvironment,
    CartPersistence, CartReducer, CartState, CartStatus, LookupAction, LookupEnvironment,
    LookupState, LookupStatus, MemoryStore,
};
use shayna_testing::test_clock;
use std::sync::Arc;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn product(id: u64, slug: &str, price: u64) -> serde_json::Value {
    json!({
        "data": {
            "id": id,
            "name": slug,
            "slug": slug,
            "thumbnail": format!("thumbnails/{slug}.png"),
            "price": price,
            "is_popular": true,
            "brand": { "id": 3, "name": "Aurora", "slug": "aurora" }
        }
    })
}

async fn mount_product(server: &MockServer, id: u64, slug: &str, price: u64) {
    Mock::given(method("GET"))
        .and(path(format!("/api/cosmetic/{slug}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(product(id, slug, price)))
        .mount(server)
        .await;
}

fn cart_store(
    server: &MockServer,
    storage: Arc<MemoryStore>,
) -> Store<CartState, CartAction, CartEnvironment, CartReducer> {
    let client = Arc::new(ApiClient::new(format!("{}/api", server.uri())));
    let env = CartEnvironment::new(storage, client.clone(), client, Arc::new(test_clock()));
    Store::new(CartState::new(), CartReducer::new(), env)
}

#[tokio::test]
async fn test_not_found_product_is_dropped() {
    let server = MockServer::start().await;
    mount_product(&server, 1, "a", 100_000).await;
    Mock::given(method("GET"))
        .and(path("/api/cosmetic/retired"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let storage = Arc::new(MemoryStore::with_slot(
        CART_KEY,
        r#"[{"cosmetic_id":1,"slug":"a","quantity":2},{"cosmetic_id":4,"slug":"retired","quantity":1}]"#,
    ));
    let store = cart_store(&server, storage.clone());

    store.send(CartAction::LoadCart).await.unwrap().wait().await;

    let state = store.state(Clone::clone).await;
    assert_eq!(state.cart.len(), 1);
    assert_eq!(state.resolved_lines()[0].product.brand_name(), "Aurora");
    assert_eq!(state.totals().unwrap().grand_total, dec!(222000));
    assert_eq!(CartPersistence::new(storage).load_cart(), state.cart);
}

#[tokio::test]
async fn test_booking_round_trip() {
    let server = MockServer::start().await;
    mount_product(&server, 1, "a", 100_000).await;
    Mock::given(method("POST"))
        .and(path("/api/booking-transaction"))
        .and(body_string_contains("cosmetic_ids[0][quantity]"))
        .and(body_string_contains("Bandung"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "booking_trx_id": "SHAYNA2025042" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let storage = Arc::new(MemoryStore::with_slot(
        CART_KEY,
        r#"[{"cosmetic_id":1,"slug":"a","quantity":2}]"#,
    ));
    let store = cart_store(&server, storage);

    store.send(CartAction::LoadCart).await.unwrap().wait().await;
    store
        .send(CartAction::SaveBookingProfile {
            profile: BookingProfile {
                name: "Sari".to_string(),
                email: "sari@example.com".to_string(),
                phone: "08123456789".to_string(),
                address: "Jl. Melati 1".to_string(),
                post_code: "40115".to_string(),
                city: "Bandung".to_string(),
            },
        })
        .await
        .unwrap();
    store
        .send(CartAction::SubmitBooking {
            proof: Some(ProofOfPayment::new("transfer.jpg", b"jpeg".to_vec())),
        })
        .await
        .unwrap()
        .wait()
        .await;

    let status = store.state(|s| s.status.clone()).await;
    assert_eq!(
        status,
        CartStatus::Submitted {
            booking_trx_id: "SHAYNA2025042".to_string()
        }
    );
}

#[tokio::test]
async fn test_booking_lookup() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/check-booking"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {
                "id": 1,
                "name": "Sari",
                "phone": "08123456789",
                "email": "sari@example.com",
                "booking_trx_id": "SHAYNA2025042",
                "proof": null,
                "total_amount": 222000,
                "total_tax_amount": 22000,
                "sub_total_amount": 200000,
                "quantity": 2,
                "is_paid": false,
                "address": "Jl. Melati 1",
                "post_code": "40115",
                "city": "Bandung",
                "transaction_details": []
            }
        })))
        .mount(&server)
        .await;

    let client = Arc::new(ApiClient::new(format!("{}/api", server.uri())));
    let store = Store::new(
        LookupState::default(),
        BookingLookupReducer::new(),
        LookupEnvironment::new(client),
    );

    store
        .send(LookupAction::LookupBooking {
            form: BookingLookupForm {
                booking_trx_id: "SHAYNA2025042".to_string(),
                email: "sari@example.com".to_string(),
            },
        })
        .await
        .unwrap()
        .wait()
        .await;

    let state = store.state(Clone::clone).await;
    assert_eq!(state.status, LookupStatus::Found);
    let details = state.details.unwrap();
    assert!(!details.is_paid);
    assert_eq!(details.booking_trx_id, "SHAYNA2025042");
}

#[tokio::test]
async fn test_unknown_booking_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/check-booking"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let client = Arc::new(ApiClient::new(format!("{}/api", server.uri())));
    let store = Store::new(
        LookupState::default(),
        BookingLookupReducer::new(),
        LookupEnvironment::new(client),
    );

    store
        .send(LookupAction::LookupBooking {
            form: BookingLookupForm {
                booking_trx_id: "NOPE".to_string(),
                email: "sari@example.com".to_string(),
            },
        })
        .await
        .unwrap()
        .wait()
        .await;

    let state = store.state(Clone::clone).await;
    assert_eq!(state.status, LookupStatus::NotFound);
    assert!(state.details.is_none());
}
