// src/detector/core.rs

//! Pure core state machine of the change detector.
//!
//! The core consumes [`DetectorEvent`]s and produces:
//! - an updated state (descriptors + accumulated change buffer)
//! - a list of [`DetectorCommand`]s for the IO shell
//!
//! The async shell (`detector::runtime`) owns the bus subscription, the watch
//! backend and the debounce timer. The core has no channels, no Tokio types
//! and performs no IO, so it can be tested step by step.

use tracing::debug;

use crate::detector::event_handlers::{
    handle_debounce_elapsed, handle_file_changed, handle_source_initialized,
    handle_target_selected, DetectorCommand, DetectorStep,
};
use crate::detector::{DetectorEvent, DetectorOptions, DetectorState};

#[derive(Debug)]
pub struct DetectorCore {
    state: DetectorState,
    buffer: Vec<String>,
    options: DetectorOptions,
}

impl DetectorCore {
    pub fn new(options: DetectorOptions) -> Self {
        Self {
            state: DetectorState::Uninitialized,
            buffer: Vec::new(),
            options,
        }
    }

    pub fn state(&self) -> &DetectorState {
        &self.state
    }

    pub fn options(&self) -> &DetectorOptions {
        &self.options
    }

    /// Paths waiting for the next drain (for tests).
    pub fn pending(&self) -> &[String] {
        &self.buffer
    }

    /// Handle a single event, updating state and returning the commands the
    /// IO shell should run.
    pub fn step(&mut self, event: DetectorEvent) -> DetectorStep {
        match event {
            DetectorEvent::SourceInitialized(source) => {
                handle_source_initialized(&mut self.state, source)
            }
            DetectorEvent::TargetSelected(target) => {
                handle_target_selected(&mut self.state, target, &self.options)
            }
            DetectorEvent::FileChanged(change) => {
                handle_file_changed(&self.state, &mut self.buffer, change)
            }
            DetectorEvent::DebounceElapsed => {
                handle_debounce_elapsed(&self.state, &mut self.buffer, &self.options)
            }
            DetectorEvent::ShutdownRequested => {
                if !self.buffer.is_empty() {
                    debug!(
                        dropped = self.buffer.len(),
                        "shutdown with buffered changes; dropping"
                    );
                    self.buffer.clear();
                }
                DetectorStep {
                    commands: vec![DetectorCommand::StopWatcher],
                    keep_running: false,
                }
            }
        }
    }
}
