use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Opaque ticket identifier decoded from a QR payload.
///
/// The only rule is non-emptiness; the text is forwarded verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct TicketIdentifier(String);

impl TicketIdentifier {
    /// Returns `None` for empty or whitespace-only text.
    pub fn new(raw: impl Into<String>) -> Option<Self> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            None
        } else {
            Some(Self(raw))
        }
    }

    /// Accepts the "maybe undefined" output of a decoder.
    pub fn parse(raw: Option<&str>) -> Option<Self> {
        raw.and_then(|text| Self::new(text))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TicketIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Event the ticket was booked for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventDetails {
    pub title: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub location: String,
    /// Server-formatted, kept as received.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub start_date: String,
    /// Open-ended events have none.
    #[serde(default)]
    pub end_date: Option<String>,
}

/// Person who made the booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadUser {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub first_name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub last_name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub email: String,
}

impl LeadUser {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

/// Booking snapshot returned by a successful verification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketRecord {
    pub event: EventDetails,
    pub lead_user: LeadUser,
    pub ticket_quantity: i64,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub booking_status: String,
}

/// The backend sends `null` for unset text fields.
fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Why a verification cycle failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// QR could not be obtained (bad image, camera problem).
    Acquisition,
    /// Transport failure, timeout or unreadable response.
    Network,
    /// Backend said no (invalid, expired, already used).
    Rejected,
    /// No bearer token to send.
    Unauthenticated,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::Acquisition => "acquisition",
            FailureKind::Network => "network",
            FailureKind::Rejected => "rejected",
            FailureKind::Unauthenticated => "unauthenticated",
        }
    }
}

/// User-facing failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationFailure {
    pub kind: FailureKind,
    pub message: String,
}

impl VerificationFailure {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Result of one verification cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerificationOutcome {
    Pending,
    Success(TicketRecord),
    Failure(VerificationFailure),
}

impl VerificationOutcome {
    pub fn failure(kind: FailureKind, message: impl Into<String>) -> Self {
        VerificationOutcome::Failure(VerificationFailure::new(kind, message))
    }

    /// Label for logs and metrics.
    pub fn label(&self) -> &'static str {
        match self {
            VerificationOutcome::Pending => "pending",
            VerificationOutcome::Success(_) => "success",
            VerificationOutcome::Failure(failure) => failure.kind.as_str(),
        }
    }
}
