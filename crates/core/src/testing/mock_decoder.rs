//! Mock QR decoder for testing.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::acquisition::{AcquisitionError, QrDecoder};

/// Mock implementation of the QrDecoder trait.
///
/// Decoding is synchronous (it runs on the blocking pool), so the mock uses
/// std primitives. Queued results are returned in order; once the queue is
/// empty every image decodes to "no code found".
#[derive(Debug, Default)]
pub struct MockDecoder {
    results: Mutex<VecDeque<Result<Option<String>, AcquisitionError>>>,
    calls: AtomicUsize,
}

impl MockDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the result of the next decode call.
    pub fn push_result(&self, result: Result<Option<String>, AcquisitionError>) {
        if let Ok(mut results) = self.results.lock() {
            results.push_back(result);
        }
    }

    /// Queue a successful decode of `text`.
    pub fn push_text(&self, text: &str) {
        self.push_result(Ok(Some(text.to_string())));
    }

    /// Number of decode calls made.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl QrDecoder for MockDecoder {
    fn name(&self) -> &str {
        "mock"
    }

    fn decode(&self, _image: &[u8]) -> Result<Option<String>, AcquisitionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.results
            .lock()
            .ok()
            .and_then(|mut results| results.pop_front())
            .unwrap_or(Ok(None))
    }
}
