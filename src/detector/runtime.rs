// src/detector/runtime.rs

use std::fmt;

use tokio::sync::{broadcast, mpsc};
use tracing::{debug, error, info, warn};

use crate::bus::{BusEvent, EventBus};
use crate::detector::core::DetectorCore;
use crate::detector::debounce::Debouncer;
use crate::detector::{DetectorCommand, DetectorEvent, DetectorOptions};
use crate::errors::Result;
use crate::types::FileChange;
use crate::watch::WatchBackend;

/// Async shell around [`DetectorCore`].
///
/// Reacts, one event at a time, to:
/// - bus events (source initialized, target selected, shutdown)
/// - file changes reported by the watch backend
/// - debounce expiry
///
/// and carries out the commands the core returns: restarting the watch
/// backend, rescheduling the debounce and posting coalesced changes.
pub struct ChangeDetector<B: WatchBackend> {
    core: DetectorCore,
    bus: EventBus,
    bus_rx: broadcast::Receiver<BusEvent>,
    changes_rx: mpsc::UnboundedReceiver<FileChange>,
    backend: B,
    debouncer: Debouncer,
}

impl<B: WatchBackend> fmt::Debug for ChangeDetector<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChangeDetector")
            .field("core", &self.core)
            .field("debouncer", &self.debouncer)
            .finish_non_exhaustive()
    }
}

impl<B: WatchBackend> ChangeDetector<B> {
    /// Create a detector and subscribe it to `bus` immediately, so that it
    /// sees every event posted after this call returns.
    ///
    /// `changes_rx` must be the receiving end of the channel `backend`
    /// reports file changes on.
    pub fn new(
        bus: &EventBus,
        backend: B,
        changes_rx: mpsc::UnboundedReceiver<FileChange>,
        options: DetectorOptions,
    ) -> Self {
        let debouncer = Debouncer::new(options.debounce);
        Self {
            core: DetectorCore::new(options),
            bus: bus.clone(),
            bus_rx: bus.subscribe(),
            changes_rx,
            backend,
            debouncer,
        }
    }

    /// Main event loop. Returns after `ShutdownRequested` or once the bus
    /// is gone.
    pub async fn run(mut self) -> Result<()> {
        info!(debounce = ?self.debouncer.window(), "package change detector running");

        loop {
            // Bus first so descriptors are in place before queued file
            // changes are looked at; the timer only wins when both are quiet.
            let event = tokio::select! {
                biased;

                bus_event = self.bus_rx.recv() => match bus_event {
                    Ok(ev) => match detector_event_from_bus(ev) {
                        Some(ev) => ev,
                        None => continue,
                    },
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(skipped, "detector lagged behind the event bus");
                        continue;
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        info!("event bus closed; exiting");
                        break;
                    }
                },
                Some(change) = self.changes_rx.recv() => DetectorEvent::FileChanged(change),
                _ = self.debouncer.expired() => DetectorEvent::DebounceElapsed,
            };

            debug!(?event, "detector received event");

            let step = self.core.step(event);
            for command in step.commands {
                self.execute_command(command);
            }

            if !step.keep_running {
                info!("detector stopping");
                break;
            }
        }

        let queued = self.changes_rx.len();
        if queued > 0 {
            debug!(dropped = queued, "detector stopped with unread file changes; dropping");
        }

        self.backend.stop();
        Ok(())
    }

    fn execute_command(&mut self, command: DetectorCommand) {
        match command {
            DetectorCommand::StopWatcher => self.backend.stop(),
            DetectorCommand::StartWatcher(request) => {
                if let Err(err) = self.backend.start(&request) {
                    // Keep running: the next target selection may succeed.
                    error!(error = %err, roots = ?request.roots, "failed to start file watcher");
                } else {
                    info!("Package change detector started.");
                }
            }
            DetectorCommand::RescheduleDebounce => self.debouncer.reschedule(),
            DetectorCommand::Publish(changes) => {
                self.bus.post(BusEvent::PackagesChanged(changes));
            }
        }
    }
}

/// Bus events the detector reacts to; everything else (including its own
/// `PackagesChanged`) is ignored.
fn detector_event_from_bus(event: BusEvent) -> Option<DetectorEvent> {
    match event {
        BusEvent::SourceInitialized(source) => Some(DetectorEvent::SourceInitialized(source)),
        BusEvent::TargetSelected(target) => Some(DetectorEvent::TargetSelected(target)),
        BusEvent::ShutdownRequested => Some(DetectorEvent::ShutdownRequested),
        BusEvent::PackagesChanged(_) => None,
    }
}
