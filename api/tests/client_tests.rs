//! HTTP-level tests for the storefront API client.

#![allow(clippy::unwrap_used, clippy::panic)] // Test code

use rust_decimal_macros::dec;
use serde_json::json;
use shayna_api::{ApiClient, ApiError, BookingItem, BookingRequest, CheckBookingRequest, ProofOfPayment};
use wiremock::matchers::{body_json, body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn cosmetic_json(id: u64, slug: &str, price: u64) -> serde_json::Value {
    json!({
        "id": id,
        "name": format!("Product {id}"),
        "slug": slug,
        "thumbnail": format!("thumbnails/{slug}.png"),
        "price": price,
        "is_popular": false,
        "benefits": [{ "id": 1, "name": "Hydrating" }],
        "photos": [],
        "testimonials": []
    })
}

fn booking_request() -> BookingRequest {
    BookingRequest {
        name: "Sari".to_string(),
        email: "sari@example.com".to_string(),
        phone: "08123456789".to_string(),
        address: "Jl. Melati 1".to_string(),
        post_code: "40115".to_string(),
        city: "Bandung".to_string(),
        items: vec![BookingItem { id: 1, quantity: 2 }],
        proof: ProofOfPayment::new("transfer.png", b"png-bytes".to_vec()),
    }
}

#[tokio::test]
async fn test_cosmetic_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/cosmetic/glow-serum"))
        .and(header("accept", "application/json"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "data": cosmetic_json(1, "glow-serum", 100_000) })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = ApiClient::new(format!("{}/api", server.uri()));
    let cosmetic = client.cosmetic("glow-serum").await.unwrap();

    assert_eq!(cosmetic.id, 1);
    assert_eq!(cosmetic.price, dec!(100000));
    assert_eq!(cosmetic.benefits.len(), 1);
}

#[tokio::test]
async fn test_cosmetic_null_data_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/cosmetic/gone"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": null })))
        .mount(&server)
        .await;

    let client = ApiClient::new(format!("{}/api", server.uri()));
    let err = client.cosmetic("gone").await.unwrap_err();

    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_cosmetic_slug_is_a_single_path_segment() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/cosmetic/lip%2F..%2Fcategories%3Fpage=2"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "data": cosmetic_json(7, "lip", 45_000) })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = ApiClient::new(format!("{}/api", server.uri()));
    let cosmetic = client.cosmetic("lip/../categories?page=2").await.unwrap();

    assert_eq!(cosmetic.id, 7);
}

#[tokio::test]
async fn test_cosmetic_404_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/cosmetic/gone"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let client = ApiClient::new(format!("{}/api", server.uri()));
    let err = client.cosmetic("gone").await.unwrap_err();

    assert!(matches!(err, ApiError::NotFound(ref what) if what == "cosmetic gone"));
}

#[tokio::test]
async fn test_server_error_keeps_status_and_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/categories"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let client = ApiClient::new(format!("{}/api", server.uri()));
    let err = client.categories().await.unwrap_err();

    match err {
        ApiError::ApiError { status, message } => {
            assert_eq!(status, 500);
            assert_eq!(message, "boom");
        },
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_malformed_body_is_parse_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/cosmetic/broken"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
        .mount(&server)
        .await;

    let client = ApiClient::new(format!("{}/api", server.uri()));
    let err = client.cosmetic("broken").await.unwrap_err();

    assert!(matches!(err, ApiError::ResponseParseFailed(_)));
}

#[tokio::test]
async fn test_category_with_products() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/category/skincare"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {
                "id": 4,
                "name": "Skincare",
                "slug": "skincare",
                "photo": "categories/skincare.png",
                "cosmetics_count": 2,
                "cosmetics": [
                    cosmetic_json(1, "glow-serum", 100_000),
                    cosmetic_json(2, "night-cream", 50_000)
                ],
                "popular_cosmetics": [cosmetic_json(1, "glow-serum", 100_000)]
            }
        })))
        .mount(&server)
        .await;

    let client = ApiClient::new(format!("{}/api", server.uri()));
    let category = client.category("skincare").await.unwrap();

    assert_eq!(category.cosmetics_count, Some(2));
    assert_eq!(category.cosmetics.len(), 2);
    assert_eq!(category.popular_cosmetics[0].slug, "glow-serum");
}

#[tokio::test]
async fn test_submit_booking_returns_transaction_id() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/booking-transaction"))
        .and(body_string_contains("cosmetic_ids[0][id]"))
        .and(body_string_contains("cosmetic_ids[0][quantity]"))
        .and(body_string_contains("transfer.png"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "data": { "id": 10, "booking_trx_id": "SHAYNA2025001", "is_paid": false }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = ApiClient::new(format!("{}/api", server.uri()));
    let receipt = client.submit_booking(&booking_request()).await.unwrap();

    assert_eq!(receipt.booking_trx_id, "SHAYNA2025001");
}

#[tokio::test]
async fn test_submit_booking_rejected_fields() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/booking-transaction"))
        .respond_with(
            ResponseTemplate::new(422).set_body_string(r#"{"message":"The email field is required."}"#),
        )
        .mount(&server)
        .await;

    let client = ApiClient::new(format!("{}/api", server.uri()));
    let err = client.submit_booking(&booking_request()).await.unwrap_err();

    assert!(matches!(err, ApiError::Validation(ref body) if body.contains("email")));
}

#[tokio::test]
async fn test_check_booking() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/check-booking"))
        .and(body_json(json!({
            "booking_trx_id": "SHAYNA2025001",
            "email": "sari@example.com"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {
                "id": 10,
                "name": "Sari",
                "phone": 8_123_456_789_u64,
                "email": "sari@example.com",
                "booking_trx_id": "SHAYNA2025001",
                "proof": "proofs/transfer.png",
                "total_amount": 222_000,
                "total_tax_amount": 22_000,
                "sub_total_amount": 200_000,
                "quantity": 2,
                "is_paid": 1,
                "address": "Jl. Melati 1",
                "post_code": 40115,
                "city": "Bandung",
                "transaction_details": [{
                    "id": 1,
                    "price": 100_000,
                    "cosmetic_id": 1,
                    "quantity": 2,
                    "cosmetic": cosmetic_json(1, "glow-serum", 100_000)
                }]
            }
        })))
        .mount(&server)
        .await;

    let client = ApiClient::new(format!("{}/api", server.uri()));
    let details = client
        .check_booking(&CheckBookingRequest {
            booking_trx_id: "SHAYNA2025001".to_string(),
            email: "sari@example.com".to_string(),
        })
        .await
        .unwrap();

    assert!(details.is_paid);
    assert_eq!(details.phone, "8123456789");
    assert_eq!(details.post_code, "40115");
    assert_eq!(details.total_amount, dec!(222000));
    assert_eq!(details.transaction_details.len(), 1);
}

#[tokio::test]
async fn test_unreachable_server_is_request_failure() {
    let client = ApiClient::new("http://127.0.0.1:1/api");
    let err = client.cosmetic("anything").await.unwrap_err();

    assert!(matches!(err, ApiError::RequestFailed(_)));
}
