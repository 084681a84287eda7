//! Mock camera for testing.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::acquisition::{AcquisitionError, CameraDevice, Frame, FrameSource};

#[derive(Debug, Default)]
struct CameraShared {
    frames: Mutex<VecDeque<Frame>>,
    open_error: Mutex<Option<AcquisitionError>>,
    capture_error: Mutex<Option<AcquisitionError>>,
    opens: AtomicUsize,
    releases: AtomicUsize,
}

/// Mock implementation of the CameraDevice trait.
///
/// Provides controllable behavior for testing:
/// - Feed frames that the next captures return
/// - Fail the next open or the next capture
/// - Count opens and releases to check the camera is released exactly once
///
/// With no frames queued, captures report "no new frame" forever, so a
/// session keeps running until stopped.
#[derive(Debug, Clone, Default)]
pub struct MockCameraDevice {
    shared: Arc<CameraShared>,
}

impl MockCameraDevice {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a frame for the next capture.
    pub fn push_frame(&self, frame: Frame) {
        if let Ok(mut frames) = self.shared.frames.lock() {
            frames.push_back(frame);
        }
    }

    /// Make the next `open` fail.
    pub fn fail_next_open(&self, error: AcquisitionError) {
        if let Ok(mut slot) = self.shared.open_error.lock() {
            *slot = Some(error);
        }
    }

    /// Make the next capture fail.
    pub fn fail_next_capture(&self, error: AcquisitionError) {
        if let Ok(mut slot) = self.shared.capture_error.lock() {
            *slot = Some(error);
        }
    }

    pub fn open_count(&self) -> usize {
        self.shared.opens.load(Ordering::SeqCst)
    }

    pub fn release_count(&self) -> usize {
        self.shared.releases.load(Ordering::SeqCst)
    }

    /// Sources opened and not yet released.
    pub fn open_sources(&self) -> usize {
        self.open_count().saturating_sub(self.release_count())
    }
}

impl CameraDevice for MockCameraDevice {
    fn name(&self) -> &str {
        "mock"
    }

    fn open(&self) -> Result<Box<dyn FrameSource>, AcquisitionError> {
        if let Some(error) = self.shared.open_error.lock().ok().and_then(|mut e| e.take()) {
            return Err(error);
        }

        self.shared.opens.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MockFrameSource {
            shared: Arc::clone(&self.shared),
        }))
    }
}

/// Frame source handed out by [`MockCameraDevice`].
#[derive(Debug)]
pub struct MockFrameSource {
    shared: Arc<CameraShared>,
}

#[async_trait]
impl FrameSource for MockFrameSource {
    async fn capture(&mut self) -> Result<Option<Frame>, AcquisitionError> {
        if let Some(error) = self
            .shared
            .capture_error
            .lock()
            .ok()
            .and_then(|mut e| e.take())
        {
            return Err(error);
        }

        Ok(self
            .shared
            .frames
            .lock()
            .ok()
            .and_then(|mut frames| frames.pop_front()))
    }

    fn release(&mut self) {
        self.shared.releases.fetch_add(1, Ordering::SeqCst);
    }
}
