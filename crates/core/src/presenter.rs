//! Result presenter: the four mutually exclusive view states of a
//! verification screen.
//!
//! ```text
//! Idle ──begin──▶ Pending ──settle──▶ Success | Failure
//!                    ▲                      │
//!                    └────────begin─────────┘
//! ```
//!
//! Every `begin` hands out a [`DispatchToken`]. Only the token of the most
//! recent dispatch can settle the state, and only once, so a slow response
//! to a superseded scan can never overwrite a newer result.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::verification::{
    FailureKind, TicketIdentifier, TicketRecord, VerificationFailure, VerificationOutcome,
};

/// What the verification screen shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum PresenterState {
    /// Nothing scanned yet.
    Idle,
    /// A request is in flight.
    Pending { since: DateTime<Utc> },
    /// Ticket accepted by the backend.
    Success {
        ticket_id: TicketIdentifier,
        ticket: TicketRecord,
        verified_at: DateTime<Utc>,
    },
    /// Anything else.
    Failure { kind: FailureKind, message: String },
}

impl PresenterState {
    pub fn name(&self) -> &'static str {
        match self {
            PresenterState::Idle => "idle",
            PresenterState::Pending { .. } => "pending",
            PresenterState::Success { .. } => "success",
            PresenterState::Failure { .. } => "failure",
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, PresenterState::Pending { .. })
    }

    /// Record shown on success, if any.
    pub fn ticket(&self) -> Option<&TicketRecord> {
        match self {
            PresenterState::Success { ticket, .. } => Some(ticket),
            _ => None,
        }
    }

    /// Failure message shown, if any.
    pub fn failure_message(&self) -> Option<&str> {
        match self {
            PresenterState::Failure { message, .. } => Some(message),
            _ => None,
        }
    }
}

impl fmt::Display for PresenterState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PresenterState::Idle => write!(f, "awaiting QR code scan or upload"),
            PresenterState::Pending { .. } => write!(f, "verifying ticket"),
            PresenterState::Success { ticket, .. } => write!(
                f,
                "ticket verified: {} at {} for {} ({} ticket(s), {})",
                ticket.event.title,
                ticket.event.location,
                ticket.lead_user.full_name(),
                ticket.ticket_quantity,
                ticket.booking_status
            ),
            PresenterState::Failure { kind, message } => {
                write!(f, "verification failed ({}): {}", kind.as_str(), message)
            }
        }
    }
}

/// Identifies one dispatched verification request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchToken(u64);

impl DispatchToken {
    pub fn id(&self) -> u64 {
        self.0
    }
}

/// Holds the current state and arbitrates which completion may apply.
#[derive(Debug)]
pub struct Presenter {
    state: PresenterState,
    next_token: u64,
    in_flight: Option<u64>,
}

impl Default for Presenter {
    fn default() -> Self {
        Self::new()
    }
}

impl Presenter {
    pub fn new() -> Self {
        Self {
            state: PresenterState::Idle,
            next_token: 0,
            in_flight: None,
        }
    }

    pub fn state(&self) -> &PresenterState {
        &self.state
    }

    /// Enter Pending for a new request, discarding the previous outcome.
    pub fn begin(&mut self) -> DispatchToken {
        self.next_token += 1;
        self.in_flight = Some(self.next_token);
        self.state = PresenterState::Pending { since: Utc::now() };
        DispatchToken(self.next_token)
    }

    /// Apply a completed request. Returns `false` (and changes nothing) when
    /// `token` is not the latest dispatch or was already settled.
    pub fn settle(
        &mut self,
        token: DispatchToken,
        ticket_id: &TicketIdentifier,
        outcome: VerificationOutcome,
    ) -> bool {
        if self.in_flight != Some(token.0) {
            return false;
        }

        match outcome {
            VerificationOutcome::Pending => return false,
            VerificationOutcome::Success(ticket) => {
                self.state = PresenterState::Success {
                    ticket_id: ticket_id.clone(),
                    ticket,
                    verified_at: Utc::now(),
                };
            }
            VerificationOutcome::Failure(failure) => {
                self.state = PresenterState::Failure {
                    kind: failure.kind,
                    message: failure.message,
                };
            }
        }

        self.in_flight = None;
        true
    }

    /// Show a failure that did not come from a request (bad image, camera
    /// error). Any request still in flight is superseded.
    pub fn fail(&mut self, failure: VerificationFailure) {
        self.in_flight = None;
        self.state = PresenterState::Failure {
            kind: failure.kind,
            message: failure.message,
        };
    }
}
