//! The async event loop on a real executor, wall clock and timer threads.

mod common;

use std::sync::Arc;
use std::time::Duration;

use geotag_acquisition::{
    AcquisitionBuilder, AcquisitionPhase, AcquisitionState, PresentationSink,
};
use geotag_geocode::{OfflineGeocoder, Placemark};
use geotag_location::{LocationSample, timestamp_now};

use common::{BASE, FakeSource, cupertino};

struct ChannelSink {
    states: async_channel::Sender<AcquisitionState>,
    first_fixes: async_channel::Sender<Placemark>,
}

impl PresentationSink for ChannelSink {
    fn on_status_changed(&self, state: &AcquisitionState) {
        let _ = self.states.try_send(state.clone());
    }

    fn on_first_fix(&self, placemark: &Placemark) {
        let _ = self.first_fixes.try_send(placemark.clone());
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn test_run_until_shutdown() {
    let source = FakeSource::granted();
    let geocoder = Arc::new(OfflineGeocoder::new().with_entry(BASE, cupertino()));
    let (state_tx, state_rx) = async_channel::unbounded();
    let (fix_tx, fix_rx) = async_channel::unbounded();

    let acquisition = AcquisitionBuilder::new(source.clone(), geocoder)
        .sink(Arc::new(ChannelSink {
            states: state_tx,
            first_fixes: fix_tx,
        }))
        .build();
    let handle = acquisition.handle();
    let task = tokio::spawn(acquisition.run());

    handle.start();
    let searching = tokio::time::timeout(Duration::from_secs(5), state_rx.recv())
        .await
        .expect("state within 5s")
        .expect("sink alive");
    assert!(searching.is_searching());

    source.emit_sample(LocationSample::new(BASE, 4.0, timestamp_now()));
    let placemark = tokio::time::timeout(Duration::from_secs(5), fix_rx.recv())
        .await
        .expect("first fix within 5s")
        .expect("sink alive");
    assert_eq!(placemark, cupertino());

    handle.shutdown();
    let controller = tokio::time::timeout(Duration::from_secs(5), task)
        .await
        .expect("loop ends after shutdown")
        .expect("loop task did not panic");

    let state = controller.state();
    assert_eq!(state.phase(), AcquisitionPhase::Done);
    assert!(!state.is_searching());
    assert_eq!(state.placemark(), Some(&cupertino()));
    assert!(!handle.start());
}
