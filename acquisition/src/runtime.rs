//! Event loop plumbing around [`AcquisitionController`].

use std::sync::Arc;

use async_channel::Receiver;
use log::{debug, info};

use geotag_geocode::GeocodingService;
use geotag_location::PositioningSource;

use crate::clock::{Clock, SystemClock};
use crate::controller::{AcquisitionController, Collaborators, PresentationSink};
use crate::timer::{Scheduler, ThreadScheduler};
use crate::{AcquisitionConfig, AcquisitionEvent, AcquisitionHandle, AcquisitionState};

/// Assembles an [`AcquisitionLoop`].
///
/// Defaults: [`SystemClock`], [`ThreadScheduler`], [`AcquisitionConfig::default`]
/// and a sink that ignores every update.
pub struct AcquisitionBuilder {
    source: Arc<dyn PositioningSource>,
    geocoder: Arc<dyn GeocodingService>,
    sink: Arc<dyn PresentationSink>,
    scheduler: Arc<dyn Scheduler>,
    clock: Arc<dyn Clock>,
    config: AcquisitionConfig,
}

impl std::fmt::Debug for AcquisitionBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AcquisitionBuilder")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl AcquisitionBuilder {
    /// Start from the two collaborators every loop needs.
    #[must_use]
    pub fn new(source: Arc<dyn PositioningSource>, geocoder: Arc<dyn GeocodingService>) -> Self {
        Self {
            source,
            geocoder,
            sink: Arc::new(|_: &AcquisitionState| {}),
            scheduler: Arc::new(ThreadScheduler),
            clock: Arc::new(SystemClock),
            config: AcquisitionConfig::default(),
        }
    }

    /// Where state changes go.
    #[must_use]
    pub fn sink(mut self, sink: Arc<dyn PresentationSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Session tuning.
    #[must_use]
    pub fn config(mut self, config: AcquisitionConfig) -> Self {
        self.config = config;
        self
    }

    /// Time source for freshness checks and deadlines.
    #[must_use]
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Timer backend for the session timeout.
    #[must_use]
    pub fn scheduler(mut self, scheduler: Arc<dyn Scheduler>) -> Self {
        self.scheduler = scheduler;
        self
    }

    /// Create the queue and the controller, and register the controller's
    /// handle as the source's delegate.
    #[must_use]
    pub fn build(self) -> AcquisitionLoop {
        let (sender, receiver) = async_channel::unbounded();
        let handle = AcquisitionHandle::new(sender);
        let controller = AcquisitionController::new(
            Collaborators {
                source: self.source,
                geocoder: self.geocoder,
                sink: self.sink,
                scheduler: self.scheduler,
                clock: self.clock,
            },
            self.config,
            handle.clone(),
        );
        AcquisitionLoop {
            controller,
            handle,
            receiver,
        }
    }
}

/// A controller plus the queue feeding it.
///
/// Drive it with [`run`](Self::run) on an executor, or call
/// [`pump`](Self::pump) from a host-owned loop.
#[derive(Debug)]
pub struct AcquisitionLoop {
    controller: AcquisitionController,
    handle: AcquisitionHandle,
    receiver: Receiver<AcquisitionEvent>,
}

impl AcquisitionLoop {
    /// A handle for posting events from anywhere.
    #[must_use]
    pub fn handle(&self) -> AcquisitionHandle {
        self.handle.clone()
    }

    /// The controller.
    #[must_use]
    pub const fn controller(&self) -> &AcquisitionController {
        &self.controller
    }

    /// The controller, for calling handlers directly on the loop's context.
    pub const fn controller_mut(&mut self) -> &mut AcquisitionController {
        &mut self.controller
    }

    /// Latest state snapshot.
    #[must_use]
    pub const fn state(&self) -> &AcquisitionState {
        self.controller.state()
    }

    /// Handle every queued event without waiting. Returns how many ran.
    ///
    /// Events posted by a handler during the drain are handled in the same
    /// call.
    pub fn pump(&mut self) -> usize {
        let mut handled = 0;
        while let Ok(event) = self.receiver.try_recv() {
            self.controller.handle(event);
            handled += 1;
        }
        handled
    }

    /// Handle events until [`AcquisitionEvent::Shutdown`] arrives, then hand
    /// the controller back.
    pub async fn run(mut self) -> AcquisitionController {
        info!("acquisition loop running");
        while let Ok(event) = self.receiver.recv().await {
            let shutdown = matches!(event, AcquisitionEvent::Shutdown);
            self.controller.handle(event);
            if shutdown {
                break;
            }
        }
        debug!("acquisition loop finished");
        self.controller
    }
}
