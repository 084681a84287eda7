use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use futures::{stream, Stream, StreamExt};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::metrics::{CAMERA_RELEASES, CAMERA_SESSIONS_STARTED, QR_DECODES};
use crate::verification::TicketIdentifier;

use super::{AcquisitionError, QrDecoder};

/// One encoded camera frame (PNG or JPEG bytes).
pub type Frame = Vec<u8>;

/// An opened camera.
#[async_trait]
pub trait FrameSource: Send {
    /// Grab the next frame. `Ok(None)` when no new frame is available yet.
    async fn capture(&mut self) -> Result<Option<Frame>, AcquisitionError>;

    /// Release the underlying device. [`CameraHandle`] calls this exactly once.
    fn release(&mut self);
}

/// A camera that can be opened for scanning.
pub trait CameraDevice: Send + Sync {
    /// Returns the name of this device implementation.
    fn name(&self) -> &str;

    /// Acquire the device.
    fn open(&self) -> Result<Box<dyn FrameSource>, AcquisitionError>;
}

/// Owned camera resource.
///
/// Released on [`release`](Self::release) or on drop, whichever comes first,
/// and never touched afterwards.
pub struct CameraHandle {
    device: String,
    source: Option<Box<dyn FrameSource>>,
}

impl CameraHandle {
    pub fn open(device: &dyn CameraDevice) -> Result<Self, AcquisitionError> {
        let source = device.open()?;
        info!("Camera '{}' opened", device.name());
        Ok(Self {
            device: device.name().to_string(),
            source: Some(source),
        })
    }

    pub async fn capture(&mut self) -> Result<Option<Frame>, AcquisitionError> {
        match self.source.as_mut() {
            Some(source) => source.capture().await,
            None => Err(AcquisitionError::CaptureFailed(
                "camera already released".to_string(),
            )),
        }
    }

    pub fn release(&mut self) {
        if let Some(mut source) = self.source.take() {
            source.release();
            CAMERA_RELEASES.inc();
            info!("Camera '{}' released", self.device);
        }
    }

    pub fn is_released(&self) -> bool {
        self.source.is_none()
    }
}

impl Drop for CameraHandle {
    fn drop(&mut self) {
        self.release();
    }
}

/// Result of examining one frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeAttempt {
    /// A code was read. The text may still be empty.
    Decoded(String),
    /// No new frame from the device.
    NoFrame,
    /// Frame had no readable code.
    NoCode,
    /// Frame could not be decoded at all.
    Unreadable(String),
}

struct ScanLoop {
    handle: CameraHandle,
    decoder: Arc<dyn QrDecoder>,
    ticker: tokio::time::Interval,
    failed: bool,
}

/// Lazy, unbounded sequence of decode attempts, one per tick.
///
/// Decode failures are ordinary items. A capture failure is yielded once as
/// `Err` and ends the stream. Dropping the stream releases the camera; to
/// restart, open a new handle and build a new stream.
pub fn decode_attempts(
    handle: CameraHandle,
    decoder: Arc<dyn QrDecoder>,
    interval: Duration,
) -> impl Stream<Item = Result<DecodeAttempt, AcquisitionError>> + Send {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let state = ScanLoop {
        handle,
        decoder,
        ticker,
        failed: false,
    };

    stream::unfold(state, |mut state| async move {
        if state.failed {
            return None;
        }
        state.ticker.tick().await;

        let item = match state.handle.capture().await {
            Ok(None) => Ok(DecodeAttempt::NoFrame),
            Ok(Some(frame)) => {
                let decoder = Arc::clone(&state.decoder);
                let attempt = match tokio::task::spawn_blocking(move || decoder.decode(&frame)).await
                {
                    Ok(Ok(Some(text))) => DecodeAttempt::Decoded(text),
                    Ok(Ok(None)) => DecodeAttempt::NoCode,
                    Ok(Err(e)) => DecodeAttempt::Unreadable(e.to_string()),
                    Err(e) => DecodeAttempt::Unreadable(e.to_string()),
                };
                Ok(attempt)
            }
            Err(e) => {
                state.failed = true;
                Err(e)
            }
        };

        Some((item, state))
    })
}

/// Collapses a payload that stays in view into a single detection.
#[derive(Debug)]
pub struct RepeatFilter {
    cooldown: Duration,
    last: Option<(String, Instant)>,
}

impl RepeatFilter {
    pub fn new(cooldown: Duration) -> Self {
        Self {
            cooldown,
            last: None,
        }
    }

    /// Whether `text` seen at `now` is a new detection.
    ///
    /// Seeing the same text again inside the window extends the window.
    pub fn admit(&mut self, text: &str, now: Instant) -> bool {
        if self.cooldown.is_zero() {
            return true;
        }

        if let Some((last_text, last_seen)) = self.last.as_mut() {
            if last_text == text && now.saturating_duration_since(*last_seen) < self.cooldown {
                *last_seen = now;
                return false;
            }
        }

        self.last = Some((text.to_string(), now));
        true
    }
}

/// Camera session pacing.
#[derive(Debug, Clone, Copy)]
pub struct ScanSettings {
    pub frame_interval: Duration,
    pub repeat_cooldown: Duration,
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self {
            frame_interval: Duration::from_millis(100),
            repeat_cooldown: Duration::from_secs(2),
        }
    }
}

/// What a camera session reports.
#[derive(Debug, Clone)]
pub enum CameraEvent {
    /// A new, non-empty code came into view.
    Detected(TicketIdentifier),
    /// The camera failed; the session has ended and released it.
    Failed(AcquisitionError),
}

/// Background scanning over one opened camera.
///
/// The scanning task owns the [`CameraHandle`]. It ends, releasing the
/// camera, when [`stop`](Self::stop) is called, when the session is dropped,
/// when the event receiver goes away, or when the camera fails.
pub struct CameraSession {
    device: String,
    stop_tx: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl CameraSession {
    /// Open `device` and start scanning. Opening errors are returned here,
    /// before any task is spawned.
    pub fn start(
        device: &dyn CameraDevice,
        decoder: Arc<dyn QrDecoder>,
        settings: ScanSettings,
        events: mpsc::Sender<CameraEvent>,
    ) -> Result<Self, AcquisitionError> {
        let handle = CameraHandle::open(device)?;
        let device_name = device.name().to_string();
        let (stop_tx, stop_rx) = oneshot::channel();

        CAMERA_SESSIONS_STARTED.inc();

        let task = tokio::spawn(run_session(
            device_name.clone(),
            handle,
            decoder,
            settings,
            events,
            stop_rx,
        ));

        Ok(Self {
            device: device_name,
            stop_tx: Some(stop_tx),
            task: Some(task),
        })
    }

    pub fn device(&self) -> &str {
        &self.device
    }

    /// Whether the scanning task is still alive.
    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Stop scanning and wait until the camera has been released.
    pub async fn stop(mut self) {
        if let Some(stop_tx) = self.stop_tx.take() {
            let _ = stop_tx.send(());
        }
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                warn!("Camera session task for '{}' ended abnormally: {}", self.device, e);
            }
        }
    }
}

impl Drop for CameraSession {
    fn drop(&mut self) {
        // the task notices the closed channel and releases the camera
        if let Some(stop_tx) = self.stop_tx.take() {
            let _ = stop_tx.send(());
        }
    }
}

async fn run_session(
    device: String,
    handle: CameraHandle,
    decoder: Arc<dyn QrDecoder>,
    settings: ScanSettings,
    events: mpsc::Sender<CameraEvent>,
    mut stop_rx: oneshot::Receiver<()>,
) {
    info!("Camera session on '{}' started", device);

    let attempts = decode_attempts(handle, decoder, settings.frame_interval);
    scan(&device, attempts, settings, &events, &mut stop_rx).await;

    info!("Camera session on '{}' stopped", device);
}

/// Consumes `attempts` until told to stop. The stream, and with it the
/// camera handle, is dropped on return.
async fn scan(
    device: &str,
    attempts: impl Stream<Item = Result<DecodeAttempt, AcquisitionError>>,
    settings: ScanSettings,
    events: &mpsc::Sender<CameraEvent>,
    stop_rx: &mut oneshot::Receiver<()>,
) {
    futures::pin_mut!(attempts);
    let mut repeats = RepeatFilter::new(settings.repeat_cooldown);

    loop {
        tokio::select! {
            _ = &mut *stop_rx => {
                debug!("Camera session on '{}' received stop signal", device);
                break;
            }
            next = attempts.next() => match next {
                Some(Ok(DecodeAttempt::Decoded(text))) => {
                    QR_DECODES.with_label_values(&["camera", "decoded"]).inc();
                    let Some(ticket_id) = TicketIdentifier::new(text) else {
                        continue;
                    };
                    if !repeats.admit(ticket_id.as_str(), Instant::now()) {
                        continue;
                    }
                    debug!("Camera detected a ticket code");
                    if events.send(CameraEvent::Detected(ticket_id)).await.is_err() {
                        debug!("Camera event receiver closed");
                        break;
                    }
                }
                Some(Ok(DecodeAttempt::Unreadable(reason))) => {
                    QR_DECODES.with_label_values(&["camera", "unreadable"]).inc();
                    debug!("Skipping unreadable frame: {}", reason);
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    warn!("Camera '{}' failed: {}", device, e);
                    let _ = events.send(CameraEvent::Failed(e)).await;
                    break;
                }
                None => break,
            }
        }
    }
}
