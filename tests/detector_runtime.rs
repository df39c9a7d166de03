// tests/detector_runtime.rs

mod common;
use crate::common::builders::{foo_bar_source, target};
use crate::common::fake_backend::{BackendCall, FakeWatchBackend};
use crate::common::{init_tracing, with_timeout};

use std::error::Error;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tokio::time::{sleep, timeout};

use applink::bus::{BusEvent, EventBus};
use applink::descriptor::PackageChange;
use applink::detector::{ChangeDetector, DetectorOptions, WatchRequest};
use applink::types::{ChangeKind, FileChange, UnresolvedPathBehaviour};

type TestResult = Result<(), Box<dyn Error>>;

/// A running detector wired to a fake backend, plus a bus listener that was
/// subscribed before anything was posted.
struct Harness {
    bus: EventBus,
    listener: broadcast::Receiver<BusEvent>,
    changes_tx: mpsc::UnboundedSender<FileChange>,
    calls: Arc<Mutex<Vec<BackendCall>>>,
    task: JoinHandle<applink::errors::Result<()>>,
}

impl Harness {
    fn start(options: DetectorOptions, backend: FakeWatchBackend) -> Self {
        init_tracing();

        let bus = EventBus::new();
        let listener = bus.subscribe();
        let calls = backend.calls();
        let (changes_tx, changes_rx) = mpsc::unbounded_channel();

        let detector = ChangeDetector::new(&bus, backend, changes_rx, options);
        let task = tokio::spawn(detector.run());

        Self {
            bus,
            listener,
            changes_tx,
            calls,
            task,
        }
    }

    fn with_debounce(ms: u64) -> Self {
        Self::start(
            DetectorOptions {
                debounce: Duration::from_millis(ms),
                ..DetectorOptions::default()
            },
            FakeWatchBackend::new(),
        )
    }

    fn change(&self, path: &str) {
        self.changes_tx
            .send(FileChange::new(path, ChangeKind::Change))
            .unwrap();
    }

    fn starts(&self) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| matches!(c, BackendCall::Start(_)))
            .count()
    }

    /// Wait until the backend has seen `n` starts.
    async fn wait_for_starts(&self, n: usize) {
        while self.starts() < n {
            sleep(Duration::from_millis(2)).await;
        }
    }

    /// Post source + target and wait for the watcher to be started.
    async fn select(&self, deps: &[&str]) {
        let before = self.starts();
        self.bus
            .post(BusEvent::SourceInitialized(foo_bar_source("/repo")));
        self.bus.post(BusEvent::TargetSelected(target("app", deps)));
        self.wait_for_starts(before + 1).await;
    }

    async fn next_packages_changed(&mut self) -> Vec<PackageChange> {
        loop {
            match self.listener.recv().await {
                Ok(BusEvent::PackagesChanged(changes)) => return changes,
                Ok(_) => continue,
                Err(e) => panic!("bus listener failed: {e}"),
            }
        }
    }

    async fn shutdown(self) -> TestResult {
        self.bus.post(BusEvent::ShutdownRequested);
        self.task.await??;
        Ok(())
    }
}

fn change(name: &str, files: &[&str]) -> PackageChange {
    PackageChange {
        package_name: name.to_string(),
        files: files.iter().map(|s| s.to_string()).collect(),
    }
}

#[tokio::test]
async fn burst_within_window_is_published_once() -> TestResult {
    with_timeout(async {
        let mut h = Harness::with_debounce(50);
        h.select(&["Foo", "Bar"]).await;

        h.change("libs/foo/src/a.ts");
        h.change("libs/bar/src/b.ts");
        h.change("libs/foo/src/c.ts");

        let published = h.next_packages_changed().await;
        assert_eq!(
            published,
            vec![
                change("Foo", &["src/a.ts", "src/c.ts"]),
                change("Bar", &["src/b.ts"]),
            ]
        );

        // No second publication for the same burst.
        let again = timeout(Duration::from_millis(200), h.next_packages_changed()).await;
        assert!(again.is_err(), "unexpected second batch: {again:?}");

        h.shutdown().await
    })
    .await
}

#[tokio::test]
async fn events_after_the_window_start_a_new_cycle() -> TestResult {
    with_timeout(async {
        let mut h = Harness::with_debounce(30);
        h.select(&["Foo"]).await;

        h.change("libs/foo/src/a.ts");
        assert_eq!(h.next_packages_changed().await, vec![change("Foo", &["src/a.ts"])]);

        h.change("libs/foo/src/b.ts");
        assert_eq!(h.next_packages_changed().await, vec![change("Foo", &["src/b.ts"])]);

        h.shutdown().await
    })
    .await
}

#[tokio::test]
async fn switching_target_keeps_pending_changes() -> TestResult {
    with_timeout(async {
        let mut h = Harness::with_debounce(150);
        h.select(&["Foo"]).await;

        h.change("libs/foo/src/a.ts");
        // Let the detector buffer the change before the switch arrives.
        sleep(Duration::from_millis(20)).await;
        h.bus.post(BusEvent::TargetSelected(target("other", &["Bar"])));
        h.wait_for_starts(2).await;

        assert_eq!(h.next_packages_changed().await, vec![change("Foo", &["src/a.ts"])]);

        let calls = h.calls.lock().unwrap().clone();
        assert_eq!(
            calls,
            vec![
                BackendCall::Stop,
                BackendCall::Start(WatchRequest {
                    base: "/repo".into(),
                    roots: vec!["libs/foo/src".into()],
                }),
                BackendCall::Stop,
                BackendCall::Start(WatchRequest {
                    base: "/repo".into(),
                    roots: vec!["libs/bar/src".into()],
                }),
            ]
        );

        h.shutdown().await
    })
    .await
}

#[tokio::test]
async fn reselecting_same_target_does_not_duplicate_publications() -> TestResult {
    with_timeout(async {
        let mut h = Harness::with_debounce(100);
        h.select(&["Foo"]).await;

        h.change("libs/foo/src/a.ts");
        h.bus.post(BusEvent::TargetSelected(target("app", &["Foo"])));
        h.bus.post(BusEvent::TargetSelected(target("app", &["Foo"])));
        h.wait_for_starts(3).await;

        assert_eq!(h.next_packages_changed().await, vec![change("Foo", &["src/a.ts"])]);
        let again = timeout(Duration::from_millis(250), h.next_packages_changed()).await;
        assert!(again.is_err(), "unexpected second batch: {again:?}");

        h.shutdown().await
    })
    .await
}

#[tokio::test]
async fn unresolved_path_is_skipped_by_default() -> TestResult {
    with_timeout(async {
        let mut h = Harness::with_debounce(30);
        h.select(&["Foo"]).await;

        h.change("unknown/x.ts");
        h.change("libs/foo/src/a.ts");

        assert_eq!(h.next_packages_changed().await, vec![change("Foo", &["src/a.ts"])]);
        h.shutdown().await
    })
    .await
}

#[tokio::test]
async fn unresolvable_only_window_publishes_an_empty_batch() -> TestResult {
    with_timeout(async {
        let mut h = Harness::with_debounce(30);
        h.select(&["Foo"]).await;

        h.change("unknown/x.ts");
        assert_eq!(h.next_packages_changed().await, Vec::<PackageChange>::new());

        // Exactly one batch for that window.
        let again = timeout(Duration::from_millis(150), h.next_packages_changed()).await;
        assert!(again.is_err(), "unexpected second batch: {again:?}");

        h.shutdown().await
    })
    .await
}

#[tokio::test]
async fn abort_mode_publishes_an_empty_batch_after_a_leading_unresolved_path() -> TestResult {
    with_timeout(async {
        let options = DetectorOptions {
            debounce: Duration::from_millis(30),
            unresolved_paths: UnresolvedPathBehaviour::Abort,
            ..DetectorOptions::default()
        };
        let mut h = Harness::start(options, FakeWatchBackend::new());
        h.select(&["Foo"]).await;

        h.change("unknown/x.ts");
        h.change("libs/foo/src/a.ts");

        assert_eq!(h.next_packages_changed().await, Vec::<PackageChange>::new());

        // The detector is still alive and handles the next batch normally.
        h.change("libs/foo/src/b.ts");
        assert_eq!(h.next_packages_changed().await, vec![change("Foo", &["src/b.ts"])]);

        h.shutdown().await
    })
    .await
}

#[tokio::test]
async fn failed_watcher_start_is_not_fatal() -> TestResult {
    with_timeout(async {
        let h = Harness::start(DetectorOptions::default(), FakeWatchBackend::failing());
        h.select(&["Foo"]).await;
        h.bus.post(BusEvent::TargetSelected(target("app", &["Bar"])));
        h.wait_for_starts(2).await;

        assert!(!h.task.is_finished());
        h.shutdown().await
    })
    .await
}

#[tokio::test]
async fn shutdown_stops_the_watcher() -> TestResult {
    with_timeout(async {
        let h = Harness::with_debounce(30);
        h.select(&["Foo"]).await;

        let calls = Arc::clone(&h.calls);
        h.shutdown().await?;

        assert_eq!(calls.lock().unwrap().last(), Some(&BackendCall::Stop));
        Ok::<(), Box<dyn Error>>(())
    })
    .await
}
