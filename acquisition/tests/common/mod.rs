//! Test doubles shared by the acquisition integration tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use geotag_acquisition::{
    AcquisitionBuilder, AcquisitionConfig, AcquisitionLoop, AcquisitionState, Clock, ManualClock,
    ManualScheduler, PresentationSink,
};
use geotag_geocode::{GeocodeReply, GeocodeResult, GeocodingService, Placemark};
use geotag_location::{
    Coordinate, LocationDelegate, LocationError, LocationEvent, LocationResult, LocationSample,
    PermissionStatus, PositioningSource,
};

/// Clock start for every test: 2024-01-01T00:00:00Z.
pub const T0: u64 = 1_704_067_200_000;

/// Cupertino, used as the base position.
pub const BASE: Coordinate = Coordinate::new(37.331_705, -122.030_237);

/// A coordinate `metres` north of [`BASE`].
pub fn north_of_base(metres: f64) -> Coordinate {
    Coordinate::new(BASE.latitude + metres / 111_194.93, BASE.longitude)
}

/// Positioning source whose behaviour the test scripts.
pub struct FakeSource {
    status: Mutex<PermissionStatus>,
    enabled: AtomicBool,
    start_error: Mutex<Option<LocationError>>,
    delegate: Mutex<Option<Arc<dyn LocationDelegate>>>,
    pub starts: AtomicUsize,
    pub stops: AtomicUsize,
    pub authorization_requests: AtomicUsize,
}

impl FakeSource {
    pub fn granted() -> Arc<Self> {
        Arc::new(Self {
            status: Mutex::new(PermissionStatus::Granted),
            enabled: AtomicBool::new(true),
            start_error: Mutex::new(None),
            delegate: Mutex::new(None),
            starts: AtomicUsize::new(0),
            stops: AtomicUsize::new(0),
            authorization_requests: AtomicUsize::new(0),
        })
    }

    pub fn set_status(&self, status: PermissionStatus) {
        *self.status.lock().unwrap() = status;
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::SeqCst);
    }

    pub fn fail_start_with(&self, err: LocationError) {
        *self.start_error.lock().unwrap() = Some(err);
    }

    /// Deliver an event through the registered delegate.
    pub fn emit(&self, event: LocationEvent) {
        let delegate = self.delegate.lock().unwrap().clone();
        delegate.expect("controller registers a delegate").on_event(event);
    }

    pub fn emit_sample(&self, sample: LocationSample) {
        self.emit(LocationEvent::Sample(sample));
    }

    pub fn starts(&self) -> usize {
        self.starts.load(Ordering::SeqCst)
    }

    pub fn stops(&self) -> usize {
        self.stops.load(Ordering::SeqCst)
    }
}

impl PositioningSource for FakeSource {
    fn authorization_status(&self) -> PermissionStatus {
        *self.status.lock().unwrap()
    }

    fn request_authorization(&self) {
        self.authorization_requests.fetch_add(1, Ordering::SeqCst);
    }

    fn services_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    fn set_delegate(&self, delegate: Arc<dyn LocationDelegate>) {
        *self.delegate.lock().unwrap() = Some(delegate);
    }

    fn start_updates(&self) -> LocationResult<()> {
        if let Some(err) = self.start_error.lock().unwrap().clone() {
            return Err(err);
        }
        self.starts.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn stop_updates(&self) {
        self.stops.fetch_add(1, Ordering::SeqCst);
    }
}

/// Geocoder that holds every request until the test answers it.
#[derive(Default)]
pub struct QueueGeocoder {
    pending: Mutex<VecDeque<(Coordinate, GeocodeReply)>>,
    pub requests: AtomicUsize,
}

impl QueueGeocoder {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn pending(&self) -> usize {
        self.pending.lock().unwrap().len()
    }

    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    /// Coordinate of the oldest unanswered request.
    pub fn next_coordinate(&self) -> Option<Coordinate> {
        self.pending.lock().unwrap().front().map(|(c, _)| *c)
    }

    /// Answer the oldest request.
    pub fn answer(&self, result: GeocodeResult) -> Coordinate {
        let (coordinate, reply) = self
            .pending
            .lock()
            .unwrap()
            .pop_front()
            .expect("a geocode request is pending");
        reply.send(result);
        coordinate
    }
}

impl GeocodingService for QueueGeocoder {
    fn reverse_geocode(&self, coordinate: Coordinate, reply: GeocodeReply) {
        self.requests.fetch_add(1, Ordering::SeqCst);
        self.pending.lock().unwrap().push_back((coordinate, reply));
    }
}

/// Geocoder that drops every reply without answering.
#[derive(Default)]
pub struct DroppingGeocoder {
    pub requests: AtomicUsize,
}

impl GeocodingService for DroppingGeocoder {
    fn reverse_geocode(&self, _coordinate: Coordinate, reply: GeocodeReply) {
        self.requests.fetch_add(1, Ordering::SeqCst);
        drop(reply);
    }
}

/// Sink recording every snapshot and first-fix signal.
#[derive(Default)]
pub struct RecordingSink {
    pub states: Mutex<Vec<AcquisitionState>>,
    pub first_fixes: Mutex<Vec<Placemark>>,
}

impl RecordingSink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn notifications(&self) -> usize {
        self.states.lock().unwrap().len()
    }

    pub fn first_fix_count(&self) -> usize {
        self.first_fixes.lock().unwrap().len()
    }

    pub fn last(&self) -> Option<AcquisitionState> {
        self.states.lock().unwrap().last().cloned()
    }
}

impl PresentationSink for RecordingSink {
    fn on_status_changed(&self, state: &AcquisitionState) {
        self.states.lock().unwrap().push(state.clone());
    }

    fn on_first_fix(&self, placemark: &Placemark) {
        self.first_fixes.lock().unwrap().push(placemark.clone());
    }
}

/// A fully wired loop on a manual clock.
pub struct Harness {
    pub acquisition: AcquisitionLoop,
    pub source: Arc<FakeSource>,
    pub geocoder: Arc<QueueGeocoder>,
    pub sink: Arc<RecordingSink>,
    pub clock: ManualClock,
    pub scheduler: ManualScheduler,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(AcquisitionConfig::default())
    }

    pub fn with_config(config: AcquisitionConfig) -> Self {
        let geocoder = QueueGeocoder::new();
        Self::build(config, geocoder.clone(), geocoder)
    }

    /// A harness whose lookups go to `service` instead of the queue.
    pub fn with_geocoder(service: Arc<dyn GeocodingService>) -> Self {
        Self::build(AcquisitionConfig::default(), service, QueueGeocoder::new())
    }

    fn build(
        config: AcquisitionConfig,
        service: Arc<dyn GeocodingService>,
        geocoder: Arc<QueueGeocoder>,
    ) -> Self {
        let source = FakeSource::granted();
        let sink = RecordingSink::new();
        let clock = ManualClock::new(T0);
        let scheduler = ManualScheduler::new(clock.clone());
        let acquisition = AcquisitionBuilder::new(source.clone(), service)
            .sink(sink.clone())
            .config(config)
            .clock(Arc::new(clock.clone()))
            .scheduler(Arc::new(scheduler.clone()))
            .build();
        Self {
            acquisition,
            source,
            geocoder,
            sink,
            clock,
            scheduler,
        }
    }

    pub fn state(&self) -> &AcquisitionState {
        self.acquisition.state()
    }

    /// Start a session and handle the queue.
    pub fn start(&mut self) {
        self.acquisition.handle().start();
        self.acquisition.pump();
    }

    /// Move time forward, firing due timers, and handle the queue.
    pub fn advance(&mut self, by: Duration) {
        self.scheduler.advance(by);
        self.acquisition.pump();
    }

    /// A sample measured "now" at the given accuracy.
    pub fn sample_now(&self, coordinate: Coordinate, accuracy: f64) -> LocationSample {
        LocationSample::new(coordinate, accuracy, self.clock.now_ms())
    }

    /// Deliver a sample through the source and handle the queue.
    pub fn deliver(&mut self, sample: LocationSample) {
        self.source.emit_sample(sample);
        self.acquisition.pump();
    }

    /// Answer the oldest geocode request and handle the queue.
    pub fn answer_geocode(&mut self, result: GeocodeResult) -> Coordinate {
        let coordinate = self.geocoder.answer(result);
        self.acquisition.pump();
        coordinate
    }
}

pub fn cupertino() -> Placemark {
    Placemark::default()
        .sub_thoroughfare("1")
        .thoroughfare("Infinite Loop")
        .locality("Cupertino")
        .administrative_area("CA")
        .postal_code("95014")
}
