//! Order lookup ("check booking") reducer.

use crate::environment::{GatewayError, LookupEnvironment};
use crate::types::{field_errors, FieldErrors};
use serde::{Deserialize, Serialize};
use shayna_api::{BookingDetails, CheckBookingRequest};
use shayna_core::{effect::Effect, reducer::Reducer, smallvec, SmallVec};
use std::sync::Arc;
use validator::Validate;

/// Lookup form as entered by the buyer
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct BookingLookupForm {
    /// Transaction id from the confirmation view
    #[validate(length(min = 1, message = "Booking transaction ID is required"))]
    pub booking_trx_id: String,
    /// Email the booking was made with
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
}

/// Progress of the lookup
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum LookupStatus {
    /// Nothing searched yet
    #[default]
    Idle,
    /// Request in flight
    Searching,
    /// Booking found
    Found,
    /// No booking matched
    NotFound,
    /// The request failed
    Failed,
}

/// State of the lookup view
#[derive(Clone, Debug, Default)]
pub struct LookupState {
    /// Progress
    pub status: LookupStatus,
    /// The booking, once found
    pub details: Option<BookingDetails>,
    /// Field-level validation messages
    pub field_errors: FieldErrors,
    /// Last transport error
    pub last_error: Option<String>,
}

/// Actions for the lookup reducer
#[derive(Clone, Debug)]
pub enum LookupAction {
    /// Validate the form and query the server
    LookupBooking {
        /// Entered form
        form: BookingLookupForm,
    },
    /// The server returned the booking
    BookingFound {
        /// Booking record
        details: Box<BookingDetails>,
    },
    /// The lookup failed
    LookupFailed {
        /// Why
        error: GatewayError,
    },
}

/// Reducer for the lookup view
#[derive(Clone, Debug, Default)]
pub struct BookingLookupReducer;

impl BookingLookupReducer {
    /// Creates a new `BookingLookupReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Reducer for BookingLookupReducer {
    type State = LookupState;
    type Action = LookupAction;
    type Environment = LookupEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            LookupAction::LookupBooking { form } => {
                if let Err(invalid) = form.validate() {
                    state.field_errors = field_errors(&invalid);
                    return SmallVec::new();
                }

                state.field_errors.clear();
                state.last_error = None;
                state.details = None;
                state.status = LookupStatus::Searching;

                let gateway = Arc::clone(&env.gateway);
                let request = CheckBookingRequest {
                    booking_trx_id: form.booking_trx_id,
                    email: form.email,
                };
                smallvec![Effect::future(async move {
                    Some(match gateway.check(request).await {
                        Ok(details) => LookupAction::BookingFound {
                            details: Box::new(details),
                        },
                        Err(error) => LookupAction::LookupFailed { error },
                    })
                })]
            },

            LookupAction::BookingFound { details } => {
                state.status = LookupStatus::Found;
                state.details = Some(*details);
                SmallVec::new()
            },

            LookupAction::LookupFailed { error } => {
                state.status = if error == GatewayError::NotFound {
                    LookupStatus::NotFound
                } else {
                    tracing::warn!(%error, "booking lookup failed");
                    LookupStatus::Failed
                };
                state.last_error = Some(error.to_string());
                SmallVec::new()
            },
        }
    }
}
