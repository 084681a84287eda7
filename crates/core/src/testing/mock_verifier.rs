//! Mock ticket verifier for testing.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

use crate::api::{ApiEnvelope, ApiError};
use crate::verification::{TicketIdentifier, TicketRecord, TicketVerifier};

/// A recorded verification request for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedVerification {
    /// Identifier that was sent.
    pub ticket_id: String,
    /// When the request was made.
    pub timestamp: Instant,
}

type VerifyResult = Result<ApiEnvelope<TicketRecord>, ApiError>;

struct QueuedResponse {
    delay: Option<Duration>,
    result: VerifyResult,
}

/// Mock implementation of the TicketVerifier trait.
///
/// Provides controllable behavior for testing:
/// - Queue responses (served in order, one per request)
/// - Inject transport errors
/// - Delay responses to exercise timeouts and superseded requests
/// - Record every identifier sent
///
/// When the queue is empty the default response is returned: a rejection
/// with "Ticket not found" unless changed with `set_default`.
///
/// # Example
///
/// ```rust,ignore
/// use ticketgate_core::testing::{fixtures, MockVerifier};
///
/// let verifier = MockVerifier::new();
/// verifier.push_response(ApiEnvelope::ok(fixtures::ticket_record("Jazz Night", 2))).await;
///
/// station.submit("TKT-1").await;
/// assert_eq!(verifier.recorded_ids().await, vec!["TKT-1"]);
/// ```
pub struct MockVerifier {
    /// Responses served in order.
    queue: Arc<RwLock<VecDeque<QueuedResponse>>>,
    /// Returned when the queue is empty.
    default: Arc<RwLock<ApiEnvelope<TicketRecord>>>,
    /// Delay applied to every request without its own delay.
    delay: Arc<RwLock<Option<Duration>>>,
    /// Recorded requests.
    requests: Arc<RwLock<Vec<RecordedVerification>>>,
}

impl std::fmt::Debug for MockVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockVerifier")
            .field("queue", &"<queue>")
            .field("default", &"<default>")
            .field("delay", &"<delay>")
            .field("requests", &"<requests>")
            .finish()
    }
}

impl Default for MockVerifier {
    fn default() -> Self {
        Self::new()
    }
}

impl MockVerifier {
    /// Create a new mock verifier with an empty queue.
    pub fn new() -> Self {
        Self {
            queue: Arc::new(RwLock::new(VecDeque::new())),
            default: Arc::new(RwLock::new(ApiEnvelope::rejected("Ticket not found"))),
            delay: Arc::new(RwLock::new(None)),
            requests: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Queue an envelope for the next unanswered request.
    pub async fn push_response(&self, envelope: ApiEnvelope<TicketRecord>) {
        self.push(None, Ok(envelope)).await;
    }

    /// Queue an error for the next unanswered request.
    pub async fn push_error(&self, error: ApiError) {
        self.push(None, Err(error)).await;
    }

    /// Queue a result that is returned only after `delay`.
    pub async fn push_delayed(&self, delay: Duration, result: VerifyResult) {
        self.push(Some(delay), result).await;
    }

    async fn push(&self, delay: Option<Duration>, result: VerifyResult) {
        self.queue
            .write()
            .await
            .push_back(QueuedResponse { delay, result });
    }

    /// Set the response returned once the queue is exhausted.
    pub async fn set_default(&self, envelope: ApiEnvelope<TicketRecord>) {
        *self.default.write().await = envelope;
    }

    /// Delay every request that has no delay of its own.
    pub async fn set_delay(&self, delay: Duration) {
        *self.delay.write().await = Some(delay);
    }

    /// Get recorded requests.
    pub async fn recorded(&self) -> Vec<RecordedVerification> {
        self.requests.read().await.clone()
    }

    /// Identifiers sent, in order.
    pub async fn recorded_ids(&self) -> Vec<String> {
        self.requests
            .read()
            .await
            .iter()
            .map(|r| r.ticket_id.clone())
            .collect()
    }

    /// Get the number of requests made.
    pub async fn call_count(&self) -> usize {
        self.requests.read().await.len()
    }
}

#[async_trait]
impl TicketVerifier for MockVerifier {
    fn name(&self) -> &str {
        "mock"
    }

    async fn verify(&self, ticket_id: &TicketIdentifier) -> VerifyResult {
        self.requests.write().await.push(RecordedVerification {
            ticket_id: ticket_id.as_str().to_string(),
            timestamp: Instant::now(),
        });

        let queued = self.queue.write().await.pop_front();
        let (delay, result) = match queued {
            Some(queued) => (queued.delay, queued.result),
            None => (None, Ok(self.default.read().await.clone())),
        };

        let delay = match delay {
            Some(delay) => Some(delay),
            None => *self.delay.read().await,
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        result
    }
}
