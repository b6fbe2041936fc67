//! Controller module - per-screen state owners
//!
//! Each controller owns its screen's state and publishes it through `watch`
//! channels. It runs fetches as reconciliation cycles on a spawned task and
//! cancels outstanding work on `dispose()` or drop.
//!
//! - `home_feed`: carousels on the home screen
//! - `artist_detail`: an artist's popular tracks and paged albums
//! - `search`: combined search results and per-variant paging

mod artist_detail;
mod home_feed;
mod search;

pub use artist_detail::ArtistDetailController;
pub use home_feed::HomeFeedController;
pub use search::{SearchController, SearchSessions};

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;

/// The single reconciliation cycle a controller may have in flight
pub(crate) struct CycleRunner {
    screen: &'static str,
    handle: Mutex<Option<JoinHandle<()>>>,
    started: AtomicU64,
    finished: Arc<watch::Sender<u64>>,
    disposed: AtomicBool,
}

impl CycleRunner {
    pub(crate) fn new(screen: &'static str) -> Self {
        let (finished, _) = watch::channel(0);
        Self {
            screen,
            handle: Mutex::new(None),
            started: AtomicU64::new(0),
            finished: Arc::new(finished),
            disposed: AtomicBool::new(false),
        }
    }

    /// Start `cycle` unless one is already running. Returns whether it was
    /// started.
    pub(crate) async fn start_if_idle<F>(&self, cycle: F) -> bool
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let mut handle = self.handle.lock().await;
        if self.disposed.load(Ordering::SeqCst) {
            return false;
        }
        if handle.as_ref().is_some_and(|h| !h.is_finished()) {
            tracing::debug!(screen = self.screen, "Cycle already in flight, ignoring refresh");
            return false;
        }
        *handle = Some(self.spawn(cycle));
        true
    }

    /// Abort the running cycle, if any, and start `cycle` in its place.
    pub(crate) async fn restart<F>(&self, cycle: F) -> bool
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let mut handle = self.handle.lock().await;
        if self.disposed.load(Ordering::SeqCst) {
            return false;
        }
        if let Some(previous) = handle.take() {
            previous.abort();
            let _ = previous.await;
        }
        *handle = Some(self.spawn(cycle));
        true
    }

    fn spawn<F>(&self, cycle: F) -> JoinHandle<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let number = self.started.fetch_add(1, Ordering::SeqCst) + 1;
        let finished = self.finished.clone();
        tracing::debug!(screen = self.screen, cycle = number, "Starting reconciliation cycle");
        tokio::spawn(async move {
            cycle.await;
            finished.send_modify(|done| *done = (*done).max(number));
        })
    }

    pub(crate) async fn is_running(&self) -> bool {
        self.handle
            .lock()
            .await
            .as_ref()
            .is_some_and(|h| !h.is_finished())
    }

    /// Resolves once the most recently started cycle has finished, or the
    /// runner has been disposed.
    pub(crate) async fn wait(&self) {
        let target = self.started.load(Ordering::SeqCst);
        let mut finished = self.finished.subscribe();
        let _ = finished.wait_for(|done| *done >= target).await;
    }

    pub(crate) async fn dispose(&self) {
        let mut handle = self.handle.lock().await;
        self.disposed.store(true, Ordering::SeqCst);
        if let Some(running) = handle.take() {
            running.abort();
            // A poll already underway on another worker runs to its next
            // yield; wait it out so nothing publishes after dispose returns
            let _ = running.await;
            tracing::debug!(screen = self.screen, "Aborted in-flight cycle on dispose");
        }
        self.finished.send_replace(self.started.load(Ordering::SeqCst));
    }

    pub(crate) fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::SeqCst)
    }
}

impl Drop for CycleRunner {
    fn drop(&mut self) {
        if let Some(running) = self.handle.get_mut().take() {
            running.abort();
        }
    }
}
