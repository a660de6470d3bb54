//! A positioning source fed from a track.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use log::debug;

use geotag_location::{
    LocationDelegate, LocationEvent, LocationResult, PermissionStatus, PositioningSource,
};

/// Forwards whatever the replay feeds it, but only while started.
#[derive(Default)]
pub struct ScriptedSource {
    delegate: Mutex<Option<Arc<dyn LocationDelegate>>>,
    running: AtomicBool,
}

impl ScriptedSource {
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Deliver `event`; dropped when the source is stopped.
    pub fn feed(&self, event: LocationEvent) -> bool {
        if !self.is_running() {
            debug!("source stopped, dropping {event:?}");
            return false;
        }
        let delegate = self
            .delegate
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        delegate.is_some_and(|delegate| {
            delegate.on_event(event);
            true
        })
    }
}

impl PositioningSource for ScriptedSource {
    fn authorization_status(&self) -> PermissionStatus {
        PermissionStatus::Granted
    }

    fn request_authorization(&self) {}

    fn set_delegate(&self, delegate: Arc<dyn LocationDelegate>) {
        *self
            .delegate
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(delegate);
    }

    fn start_updates(&self) -> LocationResult<()> {
        self.running.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn stop_updates(&self) {
        self.running.store(false, Ordering::SeqCst);
    }
}
