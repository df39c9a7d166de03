use std::sync::{Arc, Mutex};

use applink::detector::WatchRequest;
use applink::errors::{ApplinkError, Result};
use anyhow::anyhow;
use applink::watch::WatchBackend;

/// One call made against the fake backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendCall {
    Start(WatchRequest),
    Stop,
}

/// A watch backend that:
/// - records every `start`/`stop` call
/// - never produces events on its own (tests push `FileChange`s into the
///   detector's channel directly)
/// - optionally fails every `start`.
#[derive(Debug, Clone, Default)]
pub struct FakeWatchBackend {
    calls: Arc<Mutex<Vec<BackendCall>>>,
    fail_start: bool,
}

impl FakeWatchBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail_start: true,
            ..Self::default()
        }
    }

    /// Shared view of the recorded calls; stays valid after the backend has
    /// been moved into a detector.
    pub fn calls(&self) -> Arc<Mutex<Vec<BackendCall>>> {
        Arc::clone(&self.calls)
    }
}

impl WatchBackend for FakeWatchBackend {
    fn start(&mut self, request: &WatchRequest) -> Result<()> {
        self.calls
            .lock()
            .unwrap()
            .push(BackendCall::Start(request.clone()));
        if self.fail_start {
            return Err(ApplinkError::Other(anyhow!("fake start failure")));
        }
        Ok(())
    }

    fn stop(&mut self) {
        self.calls.lock().unwrap().push(BackendCall::Stop);
    }
}
