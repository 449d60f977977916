//! Hand-written fakes shared by the unit tests of this crate.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use livi_media_domain::{
    FacingMode, GeoPoint, GeocodeFeature, GeolocationOptions, PreviewHandle, VideoConstraints,
};

use crate::{
    ApplicationError, CameraArbiter, CameraDevice, CameraStream, CaptureDevices, Clock, Frame,
    FrameEncoder, GeocodingClient, GeolocationProvider, GeotagWriter, PreviewRegistry,
    TeardownSignal,
};

#[derive(Default)]
pub(crate) struct CountingStream {
    pub(crate) stops: AtomicUsize,
}

impl CameraStream for CountingStream {
    fn grab_frame(&self) -> Result<Frame, ApplicationError> {
        Ok(Frame {
            width: 2,
            height: 1,
            rgb: vec![0; 6],
        })
    }

    fn stop(&self) {
        self.stops.fetch_add(1, Ordering::SeqCst);
    }

    fn is_live(&self) -> bool {
        self.stops.load(Ordering::SeqCst) == 0
    }
}

#[derive(Default)]
pub(crate) struct FakeCamera {
    streams: Mutex<Vec<Arc<CountingStream>>>,
    facing_modes: Mutex<Vec<FacingMode>>,
    failures: AtomicUsize,
}

impl FakeCamera {
    pub(crate) fn fail_next_opens(&self, count: usize) {
        self.failures.store(count, Ordering::SeqCst);
    }

    pub(crate) fn stream_stops(&self, index: usize) -> usize {
        self.streams.lock().expect("streams")[index]
            .stops
            .load(Ordering::SeqCst)
    }

    pub(crate) fn stream(&self, index: usize) -> Arc<CountingStream> {
        Arc::clone(&self.streams.lock().expect("streams")[index])
    }

    pub(crate) fn last_stream_stops(&self) -> usize {
        let streams = self.streams.lock().expect("streams");
        streams
            .last()
            .expect("a stream was opened")
            .stops
            .load(Ordering::SeqCst)
    }

    pub(crate) fn opened_facing_modes(&self) -> Vec<FacingMode> {
        self.facing_modes.lock().expect("facing modes").clone()
    }
}

#[async_trait]
impl CameraDevice for FakeCamera {
    async fn open_stream(
        &self,
        constraints: VideoConstraints,
    ) -> Result<Arc<dyn CameraStream>, ApplicationError> {
        if self.failures.load(Ordering::SeqCst) > 0 {
            self.failures.fetch_sub(1, Ordering::SeqCst);
            return Err(ApplicationError::Device("permission denied".to_string()));
        }
        let stream = Arc::new(CountingStream::default());
        self.streams.lock().expect("streams").push(Arc::clone(&stream));
        self.facing_modes
            .lock()
            .expect("facing modes")
            .push(constraints.facing_mode);
        Ok(stream)
    }
}

enum FixMode {
    At(GeoPoint),
    Unavailable,
    Stalled,
}

pub(crate) struct FakeGeolocation {
    mode: FixMode,
    teardown: Mutex<Option<TeardownSignal>>,
}

impl FakeGeolocation {
    fn with_mode(mode: FixMode) -> Self {
        Self {
            mode,
            teardown: Mutex::new(None),
        }
    }

    pub(crate) fn at(latitude: f64, longitude: f64) -> Self {
        Self::with_mode(FixMode::At(GeoPoint {
            latitude,
            longitude,
        }))
    }

    pub(crate) fn unavailable() -> Self {
        Self::with_mode(FixMode::Unavailable)
    }

    pub(crate) fn stalled() -> Self {
        Self::with_mode(FixMode::Stalled)
    }

    /// Simulates the owning view going away while the fix is in flight.
    pub(crate) fn teardown_on_request(&self, signal: TeardownSignal) {
        *self.teardown.lock().expect("teardown") = Some(signal);
    }
}

#[async_trait]
impl GeolocationProvider for FakeGeolocation {
    async fn current_position(
        &self,
        _options: GeolocationOptions,
    ) -> Result<GeoPoint, ApplicationError> {
        if let Some(signal) = self.teardown.lock().expect("teardown").as_ref() {
            signal.trigger();
        }
        match self.mode {
            FixMode::At(point) => Ok(point),
            FixMode::Unavailable => Err(ApplicationError::Device(
                "geolocation is not supported".to_string(),
            )),
            FixMode::Stalled => std::future::pending().await,
        }
    }
}

pub(crate) struct FakeEncoder;

impl FrameEncoder for FakeEncoder {
    fn encode_jpeg(&self, _frame: &Frame, _quality: u8) -> Result<Vec<u8>, ApplicationError> {
        Ok(b"JPEG".to_vec())
    }
}

#[derive(Default)]
pub(crate) struct FakeGeotagger {
    pub(crate) fail: AtomicBool,
}

impl GeotagWriter for FakeGeotagger {
    fn embed_location(&self, jpeg: &[u8], _point: GeoPoint) -> Result<Vec<u8>, ApplicationError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(ApplicationError::Encode("no APP1 room".to_string()));
        }
        let mut tagged = jpeg.to_vec();
        tagged.extend_from_slice(b"GPS");
        Ok(tagged)
    }
}

#[derive(Default)]
pub(crate) struct CountingPreviews {
    next: AtomicU64,
    live: Mutex<HashSet<PreviewHandle>>,
}

impl PreviewRegistry for CountingPreviews {
    fn create(&self, _bytes: &[u8]) -> PreviewHandle {
        let handle = PreviewHandle::new(self.next.fetch_add(1, Ordering::SeqCst) + 1);
        self.live.lock().expect("live").insert(handle);
        handle
    }

    fn release(&self, handle: PreviewHandle) -> bool {
        self.live.lock().expect("live").remove(&handle)
    }

    fn live_count(&self) -> usize {
        self.live.lock().expect("live").len()
    }
}

pub(crate) struct FixedClock;

impl Clock for FixedClock {
    fn now_unix_millis(&self) -> u128 {
        1_700_000_000_000
    }
}

#[derive(Default)]
pub(crate) struct FakeGeocoder {
    pub(crate) features: Vec<GeocodeFeature>,
    pub(crate) fail: bool,
    pub(crate) calls: AtomicUsize,
}

#[async_trait]
impl GeocodingClient for FakeGeocoder {
    async fn forward(
        &self,
        _query: &str,
        limit: usize,
        _types: &str,
    ) -> Result<Vec<GeocodeFeature>, ApplicationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(ApplicationError::Geocoding("status 401".to_string()));
        }
        Ok(self.features.iter().take(limit).cloned().collect())
    }

    async fn reverse(
        &self,
        _point: GeoPoint,
        limit: usize,
    ) -> Result<Vec<GeocodeFeature>, ApplicationError> {
        self.forward("", limit, "").await
    }
}

pub(crate) struct Rig {
    pub(crate) camera: Arc<FakeCamera>,
    pub(crate) arbiter: Arc<CameraArbiter>,
    pub(crate) geolocation: Arc<FakeGeolocation>,
    pub(crate) geotagger: Arc<FakeGeotagger>,
    pub(crate) previews: Arc<CountingPreviews>,
}

impl Rig {
    pub(crate) fn new(geolocation: FakeGeolocation) -> Self {
        Self {
            camera: Arc::new(FakeCamera::default()),
            arbiter: Arc::new(CameraArbiter::new()),
            geolocation: Arc::new(geolocation),
            geotagger: Arc::new(FakeGeotagger::default()),
            previews: Arc::new(CountingPreviews::default()),
        }
    }
}

pub(crate) fn devices(rig: &Rig) -> CaptureDevices {
    CaptureDevices {
        camera: rig.camera.clone(),
        arbiter: rig.arbiter.clone(),
        geolocation: rig.geolocation.clone(),
        encoder: Arc::new(FakeEncoder),
        geotagger: rig.geotagger.clone(),
        previews: rig.previews.clone(),
        clock: Arc::new(FixedClock),
    }
}
