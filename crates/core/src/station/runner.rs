//! Verification station implementation.

use std::sync::Arc;
use std::time::Instant;

use tokio::sync::{mpsc, Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::acquisition::{
    decode_upload, AcquisitionError, CameraDevice, CameraEvent, CameraSession, QrDecoder,
    ScanMode, UploadedImage,
};
use crate::api::ApiError;
use crate::metrics::{QR_DECODES, STALE_COMPLETIONS, VERIFICATIONS_TOTAL, VERIFICATION_DURATION};
use crate::presenter::{Presenter, PresenterState};
use crate::verification::{
    classify, FailureKind, TicketIdentifier, TicketVerifier, VerificationFailure,
    VerificationOutcome,
};

use super::types::{ScanStatus, StationSettings};

/// Camera detections buffered before the session task waits on the consumer.
const CAMERA_EVENT_BUFFER: usize = 16;

/// State shared between the station, the camera consumer and in-flight
/// dispatches.
struct StationCore {
    verifier: Arc<dyn TicketVerifier>,
    decoder: Arc<dyn QrDecoder>,
    presenter: RwLock<Presenter>,
    settings: StationSettings,
}

impl StationCore {
    /// Run one verification cycle for `ticket_id`.
    ///
    /// The presenter lock is only taken to begin and to settle, never across
    /// the network call.
    async fn dispatch(&self, ticket_id: TicketIdentifier) -> VerificationOutcome {
        let token = self.presenter.write().await.begin();
        debug!(
            "Dispatch {} verifying ticket '{}' via {}",
            token.id(),
            ticket_id,
            self.verifier.name()
        );

        let started = Instant::now();
        let timeout = self.settings.request_timeout;
        let result = match tokio::time::timeout(timeout, self.verifier.verify(&ticket_id)).await {
            Ok(result) => result,
            Err(_) => Err(ApiError::Timeout(timeout)),
        };

        if let Err(e) = &result {
            warn!("Verification request for dispatch {} failed: {}", token.id(), e);
        }

        let outcome = classify(result);
        let label = outcome.label();
        VERIFICATIONS_TOTAL.with_label_values(&[label]).inc();
        VERIFICATION_DURATION
            .with_label_values(&[label])
            .observe(started.elapsed().as_secs_f64());

        let applied = self
            .presenter
            .write()
            .await
            .settle(token, &ticket_id, outcome.clone());

        if applied {
            info!("Dispatch {} settled as {}", token.id(), label);
        } else {
            STALE_COMPLETIONS.inc();
            debug!(
                "Dispatch {} completed as {} after being superseded; ignored",
                token.id(),
                label
            );
        }

        outcome
    }

    /// Show an acquisition failure. Supersedes any request in flight.
    async fn fail_acquisition(&self, error: &AcquisitionError) -> VerificationOutcome {
        warn!("Acquisition failed: {}", error);
        VERIFICATIONS_TOTAL
            .with_label_values(&[FailureKind::Acquisition.as_str()])
            .inc();

        let failure = VerificationFailure::new(FailureKind::Acquisition, error.user_message());
        self.presenter.write().await.fail(failure.clone());
        VerificationOutcome::Failure(failure)
    }
}

/// A camera session together with the task consuming its detections.
struct ActiveScan {
    session: CameraSession,
    consumer: JoinHandle<()>,
}

struct ScanState {
    mode: ScanMode,
    active: Option<ActiveScan>,
}

impl ScanState {
    fn camera_running(&self) -> bool {
        self.active
            .as_ref()
            .is_some_and(|active| active.session.is_running())
    }
}

/// Drives one verification screen.
pub struct VerificationStation {
    core: Arc<StationCore>,
    camera: Option<Arc<dyn CameraDevice>>,
    scan: Mutex<ScanState>,
}

impl VerificationStation {
    /// Create a station. Nothing is opened until [`start`](Self::start) or
    /// [`set_mode`](Self::set_mode).
    pub fn new(
        verifier: Arc<dyn TicketVerifier>,
        decoder: Arc<dyn QrDecoder>,
        camera: Option<Arc<dyn CameraDevice>>,
        settings: StationSettings,
    ) -> Self {
        Self {
            core: Arc::new(StationCore {
                verifier,
                decoder,
                presenter: RwLock::new(Presenter::new()),
                settings,
            }),
            camera,
            scan: Mutex::new(ScanState {
                mode: settings.default_mode,
                active: None,
            }),
        }
    }

    /// Enter the configured default mode, opening the camera if needed.
    pub async fn start(&self) -> ScanStatus {
        let mut scan = self.scan.lock().await;
        info!("Starting verification station in {} mode", scan.mode);

        if scan.mode == ScanMode::Camera && !scan.camera_running() {
            self.start_camera(&mut scan).await;
        }

        self.status_of(&scan)
    }

    /// Release the camera, if one is open.
    pub async fn shutdown(&self) {
        let mut scan = self.scan.lock().await;
        info!("Shutting down verification station");
        Self::stop_camera(&mut scan).await;
    }

    /// Switch acquisition strategy.
    ///
    /// Leaving Camera stops the session and releases the device. Selecting
    /// the current mode does nothing, except that Camera is restarted when
    /// its session has died.
    pub async fn set_mode(&self, mode: ScanMode) -> ScanStatus {
        let mut scan = self.scan.lock().await;

        if scan.mode == mode && (mode == ScanMode::Upload || scan.camera_running()) {
            debug!("Scan mode already {}", mode);
            return self.status_of(&scan);
        }

        info!("Switching scan mode from {} to {}", scan.mode, mode);
        Self::stop_camera(&mut scan).await;
        scan.mode = mode;

        if mode == ScanMode::Camera {
            self.start_camera(&mut scan).await;
        }

        self.status_of(&scan)
    }

    /// Verify decoded text. Empty or whitespace-only text is ignored and
    /// returns `None` without touching the presenter.
    pub async fn submit(&self, text: &str) -> Option<VerificationOutcome> {
        let Some(ticket_id) = TicketIdentifier::new(text) else {
            debug!("Ignoring empty ticket identifier");
            return None;
        };
        Some(self.core.dispatch(ticket_id).await)
    }

    /// Decode an uploaded image and verify its payload.
    ///
    /// `None` when nothing was uploaded or the code encodes empty text. An
    /// image without a readable code becomes an acquisition failure.
    pub async fn submit_upload(&self, upload: UploadedImage) -> Option<VerificationOutcome> {
        let decoder = Arc::clone(&self.core.decoder);
        let decoded =
            match tokio::task::spawn_blocking(move || decode_upload(decoder.as_ref(), &upload))
                .await
            {
                Ok(result) => result,
                Err(e) => Err(AcquisitionError::InvalidImage(format!(
                    "decoder task failed: {}",
                    e
                ))),
            };

        match decoded {
            Ok(Some(ticket_id)) => {
                QR_DECODES.with_label_values(&["upload", "decoded"]).inc();
                Some(self.core.dispatch(ticket_id).await)
            }
            Ok(None) => {
                debug!("Upload produced no ticket identifier");
                None
            }
            Err(e) => {
                QR_DECODES.with_label_values(&["upload", "unreadable"]).inc();
                Some(self.core.fail_acquisition(&e).await)
            }
        }
    }

    /// Snapshot of what the screen shows.
    pub async fn state(&self) -> PresenterState {
        self.core.presenter.read().await.state().clone()
    }

    pub async fn mode(&self) -> ScanMode {
        self.scan.lock().await.mode
    }

    pub async fn camera_active(&self) -> bool {
        self.scan.lock().await.camera_running()
    }

    pub async fn scan_status(&self) -> ScanStatus {
        let scan = self.scan.lock().await;
        self.status_of(&scan)
    }

    fn status_of(&self, scan: &ScanState) -> ScanStatus {
        ScanStatus {
            mode: scan.mode,
            camera_active: scan.camera_running(),
            camera_device: self.camera.as_ref().map(|c| c.name().to_string()),
        }
    }

    async fn start_camera(&self, scan: &mut ScanState) {
        // a dead session still holds its consumer handle
        Self::stop_camera(scan).await;

        let Some(device) = self.camera.as_ref() else {
            self.core
                .fail_acquisition(&AcquisitionError::CameraUnavailable(
                    "no camera configured".to_string(),
                ))
                .await;
            return;
        };

        let (events_tx, events_rx) = mpsc::channel(CAMERA_EVENT_BUFFER);
        match CameraSession::start(
            device.as_ref(),
            Arc::clone(&self.core.decoder),
            self.core.settings.scan,
            events_tx,
        ) {
            Ok(session) => {
                let consumer = tokio::spawn(consume_camera_events(Arc::clone(&self.core), events_rx));
                scan.active = Some(ActiveScan { session, consumer });
            }
            Err(e) => {
                self.core.fail_acquisition(&e).await;
            }
        }
    }

    async fn stop_camera(scan: &mut ScanState) {
        if let Some(active) = scan.active.take() {
            active.session.stop().await;
            // the session dropped its sender, so the consumer drains and ends
            if let Err(e) = active.consumer.await {
                warn!("Camera event consumer ended abnormally: {}", e);
            }
        }
    }
}

/// Turns camera events into dispatches. Each detection is verified
/// concurrently; the presenter keeps only the latest.
async fn consume_camera_events(core: Arc<StationCore>, mut events: mpsc::Receiver<CameraEvent>) {
    while let Some(event) = events.recv().await {
        match event {
            CameraEvent::Detected(ticket_id) => {
                let core = Arc::clone(&core);
                tokio::spawn(async move {
                    core.dispatch(ticket_id).await;
                });
            }
            CameraEvent::Failed(e) => {
                core.fail_acquisition(&e).await;
            }
        }
    }
    debug!("Camera event stream closed");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiEnvelope;
    use crate::testing::{fixtures, MockCameraDevice, MockDecoder, MockVerifier};
    use std::time::Duration;

    fn station_with(
        verifier: Arc<MockVerifier>,
        decoder: Arc<MockDecoder>,
        camera: Option<Arc<MockCameraDevice>>,
    ) -> VerificationStation {
        let settings = StationSettings {
            default_mode: ScanMode::Upload,
            request_timeout: Duration::from_millis(200),
            ..Default::default()
        };
        VerificationStation::new(
            verifier,
            decoder,
            camera.map(|c| c as Arc<dyn CameraDevice>),
            settings,
        )
    }

    #[tokio::test]
    async fn test_submit_empty_is_noop() {
        let verifier = Arc::new(MockVerifier::new());
        let station = station_with(Arc::clone(&verifier), Arc::new(MockDecoder::new()), None);

        assert!(station.submit("").await.is_none());
        assert!(station.submit("   ").await.is_none());
        assert_eq!(verifier.call_count().await, 0);
        assert_eq!(station.state().await, PresenterState::Idle);
    }

    #[tokio::test]
    async fn test_submit_success() {
        let verifier = Arc::new(MockVerifier::new());
        let record = fixtures::ticket_record("Jazz Night", 2);
        verifier
            .push_response(ApiEnvelope::ok(record.clone()))
            .await;
        let station = station_with(Arc::clone(&verifier), Arc::new(MockDecoder::new()), None);

        let outcome = station.submit("TKT-1").await.unwrap();
        assert_eq!(outcome, VerificationOutcome::Success(record.clone()));
        assert_eq!(station.state().await.ticket(), Some(&record));
        assert_eq!(verifier.recorded_ids().await, vec!["TKT-1".to_string()]);
    }

    #[tokio::test]
    async fn test_slow_backend_times_out() {
        let verifier = Arc::new(MockVerifier::new());
        verifier.set_delay(Duration::from_secs(5)).await;
        let station = station_with(Arc::clone(&verifier), Arc::new(MockDecoder::new()), None);

        let outcome = station.submit("TKT-1").await.unwrap();
        assert_eq!(
            outcome.label(),
            "network",
            "timeout should be reported as a network failure"
        );
    }

    #[tokio::test]
    async fn test_upload_without_code_fails() {
        let verifier = Arc::new(MockVerifier::new());
        let decoder = Arc::new(MockDecoder::new());
        decoder.push_result(Ok(None));
        let station = station_with(Arc::clone(&verifier), Arc::clone(&decoder), None);

        let outcome = station
            .submit_upload(UploadedImage::new(vec![1, 2, 3]))
            .await
            .unwrap();
        assert_eq!(
            station.state().await.failure_message(),
            Some("Invalid QR code image")
        );
        assert_eq!(outcome.label(), "acquisition");
        assert_eq!(verifier.call_count().await, 0);
    }

    #[tokio::test]
    async fn test_camera_without_device_reports_failure() {
        let station = station_with(
            Arc::new(MockVerifier::new()),
            Arc::new(MockDecoder::new()),
            None,
        );

        let status = station.set_mode(ScanMode::Camera).await;
        assert_eq!(status.mode, ScanMode::Camera);
        assert!(!status.camera_active);
        assert_eq!(
            station.state().await.failure_message(),
            Some("Unable to start the camera")
        );
    }

    #[tokio::test]
    async fn test_same_mode_is_noop() {
        let camera = Arc::new(MockCameraDevice::new());
        let station = station_with(
            Arc::new(MockVerifier::new()),
            Arc::new(MockDecoder::new()),
            Some(Arc::clone(&camera)),
        );

        station.set_mode(ScanMode::Camera).await;
        station.set_mode(ScanMode::Camera).await;
        assert_eq!(camera.open_count(), 1);

        station.set_mode(ScanMode::Upload).await;
        station.set_mode(ScanMode::Upload).await;
        assert_eq!(camera.release_count(), 1);

        station.shutdown().await;
        assert_eq!(camera.release_count(), 1);
    }
}
