//! Storefront API client implementation

use crate::{
    error::ApiError,
    types::{
        BookingDetails, BookingReceipt, BookingRequest, Category, CheckBookingRequest, Cosmetic,
        Envelope,
    },
};
use reqwest::{multipart, Client, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Storefront API client
#[derive(Clone, Debug)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    /// Create a new client for the given base URL (for example `https://host/api`)
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: normalize(base_url.into()),
        }
    }

    /// Create a client whose requests give up after `timeout`
    ///
    /// # Errors
    ///
    /// Returns `ApiError::RequestFailed` if the HTTP client cannot be built
    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::RequestFailed(e.to_string()))?;

        Ok(Self {
            client,
            base_url: normalize(base_url.into()),
        })
    }

    /// Base URL every endpoint is resolved against
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Resolve `segments` against the base URL, percent-encoding each one
    ///
    /// # Errors
    ///
    /// Returns `ApiError::RequestFailed` if the base URL cannot carry a path
    pub fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| ApiError::RequestFailed(format!("invalid base URL: {e}")))?;
        url.path_segments_mut()
            .map_err(|()| ApiError::RequestFailed(format!("base URL cannot have a path: {}", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Fetch one product by slug (`GET /cosmetic/{slug}`)
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` when the product does not exist, and
    /// request or parse errors otherwise
    pub async fn cosmetic(&self, slug: &str) -> Result<Cosmetic, ApiError> {
        tracing::debug!(slug, "fetching cosmetic");

        let response = self
            .client
            .get(self.endpoint(&["cosmetic", slug])?)
            .header("accept", "application/json")
            .send()
            .await
            .map_err(|e| ApiError::RequestFailed(e.to_string()))?;

        read_envelope(response, &format!("cosmetic {slug}")).await
    }

    /// List all categories (`GET /categories`)
    ///
    /// # Errors
    ///
    /// Returns request or parse errors
    pub async fn categories(&self) -> Result<Vec<Category>, ApiError> {
        let response = self
            .client
            .get(self.endpoint(&["categories"])?)
            .header("accept", "application/json")
            .send()
            .await
            .map_err(|e| ApiError::RequestFailed(e.to_string()))?;

        read_envelope(response, "categories").await
    }

    /// Fetch one category with its products (`GET /category/{slug}`)
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` when the category does not exist, and
    /// request or parse errors otherwise
    pub async fn category(&self, slug: &str) -> Result<Category, ApiError> {
        let response = self
            .client
            .get(self.endpoint(&["category", slug])?)
            .header("accept", "application/json")
            .send()
            .await
            .map_err(|e| ApiError::RequestFailed(e.to_string()))?;

        read_envelope(response, &format!("category {slug}")).await
    }

    /// Submit a booking as a multipart form (`POST /booking-transaction`)
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Validation` when the server rejects the fields, and
    /// request or parse errors otherwise
    pub async fn submit_booking(&self, request: &BookingRequest) -> Result<BookingReceipt, ApiError> {
        let proof = multipart::Part::bytes(request.proof.bytes.clone())
            .file_name(request.proof.file_name.clone())
            .mime_str(&request.proof.content_type)
            .map_err(|e| ApiError::RequestFailed(e.to_string()))?;

        let form = request
            .form_fields()
            .into_iter()
            .fold(multipart::Form::new().percent_encode_noop(), |form, (name, value)| {
                form.text(name, value)
            })
            .part("proof", proof);

        tracing::info!(
            items = request.items.len(),
            proof_bytes = request.proof.len(),
            "submitting booking"
        );

        let response = self
            .client
            .post(self.endpoint(&["booking-transaction"])?)
            .header("accept", "application/json")
            .multipart(form)
            .send()
            .await
            .map_err(|e| ApiError::RequestFailed(e.to_string()))?;

        read_envelope(response, "booking transaction").await
    }

    /// Look up a booking by transaction id and email (`POST /check-booking`)
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` when no booking matches, and request or
    /// parse errors otherwise
    pub async fn check_booking(
        &self,
        request: &CheckBookingRequest,
    ) -> Result<BookingDetails, ApiError> {
        let response = self
            .client
            .post(self.endpoint(&["check-booking"])?)
            .header("accept", "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| ApiError::RequestFailed(e.to_string()))?;

        read_envelope(response, &format!("booking {}", request.booking_trx_id)).await
    }
}

fn normalize(base_url: String) -> String {
    base_url.trim_end_matches('/').to_string()
}

async fn read_envelope<T: DeserializeOwned>(response: Response, what: &str) -> Result<T, ApiError> {
    match response.status() {
        StatusCode::OK | StatusCode::CREATED => {
            let envelope = response
                .json::<Envelope<T>>()
                .await
                .map_err(|e| ApiError::ResponseParseFailed(e.to_string()))?;

            envelope
                .data
                .ok_or_else(|| ApiError::NotFound(what.to_string()))
        },
        StatusCode::NOT_FOUND => Err(ApiError::NotFound(what.to_string())),
        StatusCode::UNPROCESSABLE_ENTITY => {
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::Validation(body))
        },
        status => {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(status = status.as_u16(), what, "unexpected API status");
            Err(ApiError::ApiError {
                status: status.as_u16(),
                message: body,
            })
        },
    }
}
