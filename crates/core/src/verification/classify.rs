//! Response classification: backend result → outcome, with no I/O.

use crate::api::{ApiEnvelope, ApiError};

use super::types::{FailureKind, TicketRecord, VerificationOutcome};

/// Shown for transport failures, timeouts and unreadable responses.
pub const NETWORK_FAILURE_MESSAGE: &str = "Failed to verify ticket. Please try again.";

/// Shown when the backend rejects without a message.
pub const DEFAULT_REJECTION_MESSAGE: &str = "Ticket verification failed";

/// Shown when no bearer token is available.
pub const AUTH_REQUIRED_MESSAGE: &str = "Authentication required to verify tickets.";

/// Map a verification call result to the outcome the presenter shows.
pub fn classify(result: Result<ApiEnvelope<TicketRecord>, ApiError>) -> VerificationOutcome {
    match result {
        Ok(envelope) if envelope.success => match envelope.data {
            Some(record) => VerificationOutcome::Success(record),
            // success without a record is as useless as an unreadable body
            None => VerificationOutcome::failure(FailureKind::Network, NETWORK_FAILURE_MESSAGE),
        },
        Ok(envelope) => VerificationOutcome::failure(
            FailureKind::Rejected,
            envelope.message_or(DEFAULT_REJECTION_MESSAGE),
        ),
        Err(ApiError::MissingCredential) => {
            VerificationOutcome::failure(FailureKind::Unauthenticated, AUTH_REQUIRED_MESSAGE)
        }
        Err(ApiError::Rejected(message)) => {
            let message = if message.is_empty() {
                DEFAULT_REJECTION_MESSAGE.to_string()
            } else {
                message
            };
            VerificationOutcome::failure(FailureKind::Rejected, message)
        }
        Err(_) => VerificationOutcome::failure(FailureKind::Network, NETWORK_FAILURE_MESSAGE),
    }
}
