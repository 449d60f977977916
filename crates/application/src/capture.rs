use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use livi_media_domain::{
    capture_file_name, CaptureState, FacingMode, GeoPoint, GeolocationOptions, LocalImage,
    PreviewHandle, VideoConstraints, JPEG_QUALITY,
};
use tracing::{debug, info, warn};

use crate::{
    ApplicationError, CameraArbiter, CameraDevice, CameraLease, CameraStream, Clock,
    FrameEncoder, GeolocationProvider, GeotagWriter, PreviewRegistry,
};

/// Ports a capture session talks to.
#[derive(Clone)]
pub struct CaptureDevices {
    pub camera: Arc<dyn CameraDevice>,
    pub arbiter: Arc<CameraArbiter>,
    pub geolocation: Arc<dyn GeolocationProvider>,
    pub encoder: Arc<dyn FrameEncoder>,
    pub geotagger: Arc<dyn GeotagWriter>,
    pub previews: Arc<dyn PreviewRegistry>,
    pub clock: Arc<dyn Clock>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CapturedImage {
    pub file: LocalImage,
    pub location: Option<GeoPoint>,
}

type LeaseSlot = Arc<Mutex<Option<CameraLease>>>;

fn lock_lease(slot: &LeaseSlot) -> MutexGuard<'_, Option<CameraLease>> {
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Lets code outside the session request teardown, e.g. when the owning
/// view goes away while a device call is still pending.
///
/// Triggering stops the camera right away; results of the pending call are
/// discarded once it resumes.
#[derive(Clone)]
pub struct TeardownSignal {
    alive: Arc<AtomicBool>,
    arbiter: Arc<CameraArbiter>,
    lease: LeaseSlot,
}

impl TeardownSignal {
    pub fn trigger(&self) {
        self.alive.store(false, Ordering::SeqCst);
        if let Some(lease) = lock_lease(&self.lease).take() {
            if self.arbiter.release(lease) {
                debug!("camera stopped by teardown");
            }
        }
    }
}

struct HeldStream {
    lease: CameraLease,
    stream: Arc<dyn CameraStream>,
}

struct PendingCapture {
    jpeg: Vec<u8>,
    preview: PreviewHandle,
    location: Option<GeoPoint>,
}

/// One open camera: preview, capture, retake or accept, then close.
pub struct CaptureSession {
    devices: CaptureDevices,
    facing_mode: FacingMode,
    geolocation_options: GeolocationOptions,
    state: CaptureState,
    stream: Option<HeldStream>,
    pending: Option<PendingCapture>,
    alive: Arc<AtomicBool>,
    lease: LeaseSlot,
}

impl CaptureSession {
    pub fn new(devices: CaptureDevices, facing_mode: FacingMode) -> Self {
        Self {
            devices,
            facing_mode,
            geolocation_options: GeolocationOptions::default(),
            state: CaptureState::Idle,
            stream: None,
            pending: None,
            alive: Arc::new(AtomicBool::new(true)),
            lease: Arc::new(Mutex::new(None)),
        }
    }

    pub fn with_geolocation_options(mut self, options: GeolocationOptions) -> Self {
        self.geolocation_options = options;
        self
    }

    pub fn state(&self) -> &CaptureState {
        &self.state
    }

    pub fn facing_mode(&self) -> FacingMode {
        self.facing_mode
    }

    /// Location fixed at capture time, if any.
    pub fn pending_location(&self) -> Option<GeoPoint> {
        self.pending.as_ref().and_then(|pending| pending.location)
    }

    pub fn pending_preview(&self) -> Option<PreviewHandle> {
        self.pending.as_ref().map(|pending| pending.preview)
    }

    pub fn teardown_signal(&self) -> TeardownSignal {
        TeardownSignal {
            alive: Arc::clone(&self.alive),
            arbiter: Arc::clone(&self.devices.arbiter),
            lease: Arc::clone(&self.lease),
        }
    }

    fn is_alive(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }

    fn ensure_alive(&mut self) -> Result<(), ApplicationError> {
        if self.is_alive() {
            return Ok(());
        }
        self.close();
        Err(ApplicationError::SessionClosed)
    }

    fn invalid_state(&self, action: &'static str) -> ApplicationError {
        let state = match self.state {
            CaptureState::Idle => "idle",
            CaptureState::Initializing => "initializing",
            CaptureState::Streaming => "streaming",
            CaptureState::Captured => "showing a captured photo",
            CaptureState::Failed(_) => "failed",
            CaptureState::Closed => "closed",
        };
        ApplicationError::InvalidState { state, action }
    }

    /// Acquires the camera. A stream already held by this session is torn
    /// down first. On failure the session moves to `Failed` and can be
    /// retried with [`CaptureSession::try_again`].
    pub async fn open(&mut self) -> Result<(), ApplicationError> {
        self.ensure_alive()?;
        if self.state == CaptureState::Captured {
            return Err(self.invalid_state("open the camera"));
        }

        self.release_stream();
        self.state = CaptureState::Initializing;
        info!(facing_mode = self.facing_mode.as_str(), "opening camera");

        let opened = self
            .devices
            .camera
            .open_stream(VideoConstraints::for_facing(self.facing_mode))
            .await;

        if !self.is_alive() {
            if let Ok(stream) = opened {
                stream.stop();
            }
            self.close();
            return Err(ApplicationError::SessionClosed);
        }

        match opened {
            Ok(stream) => {
                let lease = self.devices.arbiter.activate(Arc::clone(&stream));
                *lock_lease(&self.lease) = Some(lease);
                self.stream = Some(HeldStream { lease, stream });
                self.state = CaptureState::Streaming;
                Ok(())
            }
            Err(error) => {
                warn!(%error, "cannot access camera");
                self.state = CaptureState::Failed(error.to_string());
                Err(error)
            }
        }
    }

    pub async fn try_again(&mut self) -> Result<(), ApplicationError> {
        if !self.state.is_retryable() {
            return Err(self.invalid_state("retry"));
        }
        self.open().await
    }

    pub async fn switch_camera(&mut self) -> Result<(), ApplicationError> {
        self.ensure_alive()?;
        if self.state == CaptureState::Captured {
            return Err(self.invalid_state("switch camera"));
        }
        self.facing_mode = self.facing_mode.toggled();
        self.open().await
    }

    /// Grabs the current frame, encodes it and shows it for review.
    pub async fn capture(&mut self) -> Result<PreviewHandle, ApplicationError> {
        self.ensure_alive()?;
        if self.state != CaptureState::Streaming {
            return Err(self.invalid_state("capture"));
        }

        let frame = {
            let Some(held) = self.stream.as_ref() else {
                return Err(self.invalid_state("capture"));
            };
            if !self.devices.arbiter.holds(held.lease) {
                Err("camera was taken over by another session")
            } else if !held.stream.is_live() {
                Err("camera stream ended")
            } else {
                Ok(held.stream.grab_frame())
            }
        };
        let frame = match frame {
            Ok(frame) => frame?,
            Err(reason) => {
                // Releasing a lease that was taken over is a no-op.
                self.release_stream();
                self.state = CaptureState::Failed(reason.to_string());
                return Err(ApplicationError::Device(reason.to_string()));
            }
        };
        if frame.width == 0 || frame.height == 0 {
            return Err(ApplicationError::Device(
                "camera produced an empty frame".to_string(),
            ));
        }

        let jpeg = self.devices.encoder.encode_jpeg(&frame, JPEG_QUALITY)?;
        let location = self.locate().await;
        self.ensure_alive()?;

        let preview = self.devices.previews.create(&jpeg);
        debug!(%preview, bytes = jpeg.len(), "photo captured");
        self.pending = Some(PendingCapture {
            jpeg,
            preview,
            location,
        });
        self.state = CaptureState::Captured;
        Ok(preview)
    }

    /// Discards the captured photo and goes back to the live feed.
    pub fn retake(&mut self) -> Result<(), ApplicationError> {
        if self.state != CaptureState::Captured {
            return Err(self.invalid_state("retake"));
        }
        if let Some(pending) = self.pending.take() {
            self.devices.previews.release(pending.preview);
        }
        self.state = CaptureState::Streaming;
        Ok(())
    }

    /// Finalizes the captured photo, geotagging it when a location is
    /// available, and closes the session.
    pub async fn accept(&mut self) -> Result<CapturedImage, ApplicationError> {
        self.ensure_alive()?;
        if self.state != CaptureState::Captured {
            return Err(self.invalid_state("accept"));
        }
        let Some(pending) = self.pending.take() else {
            return Err(self.invalid_state("accept"));
        };

        let location = match pending.location {
            Some(point) => Some(point),
            None => self.locate().await,
        };
        if !self.is_alive() {
            self.devices.previews.release(pending.preview);
            self.close();
            return Err(ApplicationError::SessionClosed);
        }

        let bytes = match location {
            Some(point) => match self.devices.geotagger.embed_location(&pending.jpeg, point) {
                Ok(tagged) => tagged,
                Err(error) => {
                    warn!(%error, "could not embed location data");
                    pending.jpeg
                }
            },
            None => pending.jpeg,
        };
        self.devices.previews.release(pending.preview);

        let file = LocalImage::jpeg(
            capture_file_name(self.devices.clock.now_unix_millis()),
            bytes,
        );
        info!(file = %file.file_name, geotagged = location.is_some(), "photo accepted");
        self.close();
        Ok(CapturedImage { file, location })
    }

    /// Stops the camera and releases the transient preview. Safe to call
    /// more than once; the stream is stopped only the first time.
    pub fn close(&mut self) {
        self.alive.store(false, Ordering::SeqCst);
        if let Some(pending) = self.pending.take() {
            self.devices.previews.release(pending.preview);
        }
        self.release_stream();
        if self.state != CaptureState::Closed {
            debug!("capture session closed");
            self.state = CaptureState::Closed;
        }
    }

    fn release_stream(&mut self) {
        lock_lease(&self.lease).take();
        if let Some(held) = self.stream.take() {
            if !self.devices.arbiter.release(held.lease) {
                debug!("camera already released or handed to another session");
            }
        }
    }

    async fn locate(&self) -> Option<GeoPoint> {
        let options = self.geolocation_options;
        let request = self.devices.geolocation.current_position(options);
        match tokio::time::timeout(options.timeout, request).await {
            Ok(Ok(point)) => Some(point),
            Ok(Err(error)) => {
                warn!(%error, "could not get location");
                None
            }
            Err(_) => {
                warn!(
                    timeout_ms = options.timeout.as_millis() as u64,
                    "location request timed out"
                );
                None
            }
        }
    }
}

impl Drop for CaptureSession {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;
    use std::time::Duration;

    use super::*;
    use crate::testing::{devices, FakeGeolocation, Rig};

    #[tokio::test]
    async fn capture_and_accept_geotags_and_closes() {
        let rig = Rig::new(FakeGeolocation::at(-33.92, 18.42));
        let mut session = CaptureSession::new(devices(&rig), FacingMode::Environment);

        session.open().await.expect("open");
        assert_eq!(session.state(), &CaptureState::Streaming);
        assert!(rig.arbiter.is_active());

        let preview = session.capture().await.expect("capture");
        assert_eq!(session.state(), &CaptureState::Captured);
        assert_eq!(session.pending_preview(), Some(preview));
        assert_eq!(rig.previews.live_count(), 1);

        let captured = session.accept().await.expect("accept");
        assert_eq!(
            captured.location,
            Some(GeoPoint {
                latitude: -33.92,
                longitude: 18.42
            })
        );
        assert!(captured.file.bytes.ends_with(b"GPS"));
        assert_eq!(captured.file.file_name, "property-photo-1700000000000.jpg");
        assert_eq!(session.state(), &CaptureState::Closed);
        assert_eq!(rig.previews.live_count(), 0);
        assert_eq!(rig.camera.last_stream_stops(), 1);
        assert!(!rig.arbiter.is_active());
    }

    #[tokio::test]
    async fn retake_releases_preview_and_resumes_streaming() {
        let rig = Rig::new(FakeGeolocation::unavailable());
        let mut session = CaptureSession::new(devices(&rig), FacingMode::Environment);
        session.open().await.expect("open");

        session.capture().await.expect("capture");
        session.retake().expect("retake");

        assert_eq!(session.state(), &CaptureState::Streaming);
        assert_eq!(rig.previews.live_count(), 0);
        assert!(session.retake().is_err());
    }

    #[tokio::test]
    async fn camera_denial_is_retryable() {
        let rig = Rig::new(FakeGeolocation::unavailable());
        rig.camera.fail_next_opens(1);
        let mut session = CaptureSession::new(devices(&rig), FacingMode::User);

        let result = session.open().await;
        assert!(matches!(result, Err(ApplicationError::Device(_))));
        assert!(session.state().is_retryable());
        assert!(!rig.arbiter.is_active());

        session.try_again().await.expect("retry");
        assert_eq!(session.state(), &CaptureState::Streaming);
    }

    #[tokio::test]
    async fn missing_location_still_accepts_plain_jpeg() {
        let rig = Rig::new(FakeGeolocation::unavailable());
        let mut session = CaptureSession::new(devices(&rig), FacingMode::Environment);
        session.open().await.expect("open");
        session.capture().await.expect("capture");

        let captured = session.accept().await.expect("accept");
        assert_eq!(captured.location, None);
        assert_eq!(captured.file.bytes, b"JPEG".to_vec());
    }

    #[tokio::test]
    async fn embedding_failure_keeps_location_and_plain_bytes() {
        let rig = Rig::new(FakeGeolocation::at(1.0, 1.0));
        rig.geotagger.fail.store(true, Ordering::SeqCst);
        let mut session = CaptureSession::new(devices(&rig), FacingMode::Environment);
        session.open().await.expect("open");
        session.capture().await.expect("capture");

        let captured = session.accept().await.expect("accept");
        assert_eq!(captured.file.bytes, b"JPEG".to_vec());
        assert!(captured.location.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn stalled_geolocation_times_out() {
        let rig = Rig::new(FakeGeolocation::stalled());
        let mut session = CaptureSession::new(devices(&rig), FacingMode::Environment);
        session.open().await.expect("open");

        session.capture().await.expect("capture");
        assert_eq!(session.pending_location(), None);
        let captured = session.accept().await.expect("accept");
        assert_eq!(captured.location, None);
    }

    #[tokio::test]
    async fn close_is_idempotent_and_stops_stream_once() {
        let rig = Rig::new(FakeGeolocation::unavailable());
        let mut session = CaptureSession::new(devices(&rig), FacingMode::Environment);
        session.open().await.expect("open");
        session.capture().await.expect("capture");

        session.close();
        session.close();
        drop(session);

        assert_eq!(rig.camera.last_stream_stops(), 1);
        assert_eq!(rig.previews.live_count(), 0);
    }

    #[tokio::test]
    async fn teardown_during_location_fix_discards_capture() {
        let rig = Rig::new(FakeGeolocation::at(1.0, 1.0));
        let mut session = CaptureSession::new(devices(&rig), FacingMode::Environment);
        rig.geolocation.teardown_on_request(session.teardown_signal());
        session.open().await.expect("open");

        let result = session.capture().await;

        assert!(matches!(result, Err(ApplicationError::SessionClosed)));
        assert_eq!(session.state(), &CaptureState::Closed);
        assert_eq!(rig.previews.live_count(), 0);
        assert_eq!(rig.camera.last_stream_stops(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn teardown_stops_camera_while_location_fix_is_pending() {
        let rig = Rig::new(FakeGeolocation::stalled());
        let mut session = CaptureSession::new(devices(&rig), FacingMode::Environment);
        let signal = session.teardown_signal();
        session.open().await.expect("open");

        let teardown = async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            signal.trigger();
            tokio::time::sleep(Duration::from_millis(100)).await;
            (rig.camera.last_stream_stops(), rig.arbiter.is_active())
        };
        let (result, (stops_while_pending, active_while_pending)) =
            tokio::join!(session.capture(), teardown);

        assert_eq!(stops_while_pending, 1);
        assert!(!active_while_pending);
        assert!(matches!(result, Err(ApplicationError::SessionClosed)));
        assert_eq!(session.state(), &CaptureState::Closed);
        assert_eq!(rig.camera.last_stream_stops(), 1);
        assert_eq!(rig.previews.live_count(), 0);
    }

    #[tokio::test]
    async fn stream_ending_on_its_own_releases_the_camera() {
        let rig = Rig::new(FakeGeolocation::unavailable());
        let mut session = CaptureSession::new(devices(&rig), FacingMode::Environment);
        session.open().await.expect("open");
        rig.camera.stream(0).stop();

        let result = session.capture().await;

        assert!(matches!(
            result,
            Err(ApplicationError::Device(reason)) if reason == "camera stream ended"
        ));
        assert!(session.state().is_retryable());
        assert!(!rig.arbiter.is_active());

        session.try_again().await.expect("retry");
        assert!(rig.arbiter.is_active());
        session.capture().await.expect("capture after retry");
    }

    #[tokio::test]
    async fn second_session_takes_the_camera() {
        let rig = Rig::new(FakeGeolocation::unavailable());
        let mut first = CaptureSession::new(devices(&rig), FacingMode::Environment);
        let mut second = CaptureSession::new(devices(&rig), FacingMode::Environment);
        first.open().await.expect("first open");
        second.open().await.expect("second open");

        assert_eq!(rig.camera.stream_stops(0), 1);
        let result = first.capture().await;
        assert!(matches!(result, Err(ApplicationError::Device(_))));
        assert!(first.state().is_retryable());

        second.capture().await.expect("second capture");
        first.close();
        assert_eq!(rig.camera.stream_stops(0), 1);
        assert_eq!(rig.camera.stream_stops(1), 0);
    }

    #[tokio::test]
    async fn switch_camera_toggles_facing_and_reopens() {
        let rig = Rig::new(FakeGeolocation::unavailable());
        let mut session = CaptureSession::new(devices(&rig), FacingMode::Environment);
        session.open().await.expect("open");

        session.switch_camera().await.expect("switch");

        assert_eq!(session.facing_mode(), FacingMode::User);
        assert_eq!(rig.camera.stream_stops(0), 1);
        assert_eq!(
            rig.camera.opened_facing_modes(),
            vec![FacingMode::Environment, FacingMode::User]
        );
        assert_eq!(session.state(), &CaptureState::Streaming);
    }
}
