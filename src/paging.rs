//! Paged, cached result streams for list screens
//!
//! A [`PagedResultStream`] owns at most one open session. Each session
//! ([`PageSource`]) fetches pages lazily through a [`PageTransport`], keeps
//! every page it has delivered, and replays them to any new
//! [`PageConsumer`] before fetching further. Closing a session cancels the
//! in-flight fetch and drops the cache.

use async_trait::async_trait;
use futures::Stream;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio_util::sync::CancellationToken;

use crate::model::{ErrorCause, FetchedResource, Page, PageCursor, PageQuery, StatusInfo};

/// Fetches a single page in one round trip.
#[async_trait]
pub trait PageTransport<T>: Send + Sync {
    async fn fetch_page(&self, query: &PageQuery) -> FetchedResource<Page<T>, StatusInfo>;
}

#[derive(thiserror::Error, Clone, Copy, Debug, PartialEq, Eq)]
pub enum PagingError {
    /// The fetch failed; asking for the next page again retries it.
    #[error("page fetch failed: {0}")]
    Fetch(ErrorCause),
    #[error("paging session was closed")]
    Closed,
}

#[derive(Clone, Copy, Debug)]
enum Cursor {
    Start,
    Next(PageCursor),
    Exhausted,
}

struct SessionState<T> {
    pages: Vec<Arc<Page<T>>>,
    cursor: Cursor,
}

/// What a consumer at some position should do next
enum Step<T> {
    Cached(Arc<Page<T>>),
    Fetch(Option<PageCursor>),
    Done,
}

impl<T> SessionState<T> {
    fn release(&mut self) {
        self.pages = Vec::new();
        self.cursor = Cursor::Exhausted;
    }

    fn step(&self, position: usize) -> Step<T> {
        if let Some(page) = self.pages.get(position) {
            return Step::Cached(page.clone());
        }
        match self.cursor {
            Cursor::Start => Step::Fetch(None),
            Cursor::Next(cursor) => Step::Fetch(Some(cursor)),
            Cursor::Exhausted => Step::Done,
        }
    }
}

struct Session<T> {
    id: u64,
    query: PageQuery,
    transport: Arc<dyn PageTransport<T>>,
    /// Held only briefly, never across an await
    state: Mutex<SessionState<T>>,
    /// Serializes fetches so concurrent consumers never fetch the same page twice
    fetching: tokio::sync::Mutex<()>,
    cancel: CancellationToken,
}

impl<T> Session<T> {
    fn state(&self) -> MutexGuard<'_, SessionState<T>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn close(&self) {
        if !self.cancel.is_cancelled() {
            tracing::debug!(session = self.id, "Closing paging session");
            self.cancel.cancel();
        }
        self.state().release();
    }
}

/// An open paging session. Cheap to clone; all clones share one cache.
pub struct PageSource<T> {
    session: Arc<Session<T>>,
}

impl<T> Clone for PageSource<T> {
    fn clone(&self) -> Self {
        Self {
            session: self.session.clone(),
        }
    }
}

impl<T: Send + Sync + 'static> PageSource<T> {
    fn new(id: u64, query: PageQuery, transport: Arc<dyn PageTransport<T>>) -> Self {
        Self {
            session: Arc::new(Session {
                id,
                query,
                transport,
                state: Mutex::new(SessionState {
                    pages: Vec::new(),
                    cursor: Cursor::Start,
                }),
                fetching: tokio::sync::Mutex::new(()),
                cancel: CancellationToken::new(),
            }),
        }
    }

    pub fn query(&self) -> &PageQuery {
        &self.session.query
    }

    /// A new consumer starting from the first page. Pages already fetched in
    /// this session are replayed from the cache.
    pub fn subscribe(&self) -> PageConsumer<T> {
        PageConsumer {
            session: self.session.clone(),
            position: 0,
        }
    }

    /// Snapshot of the pages fetched so far. Empty once closed.
    pub fn cached_pages(&self) -> Vec<Arc<Page<T>>> {
        self.session.state().pages.clone()
    }

    pub fn is_closed(&self) -> bool {
        self.session.cancel.is_cancelled()
    }

    /// Cancel any in-flight fetch and drop the cache. Idempotent.
    pub fn close(&self) {
        self.session.close();
    }
}

/// Reads pages from a session in order
pub struct PageConsumer<T> {
    session: Arc<Session<T>>,
    position: usize,
}

impl<T: Send + Sync + 'static> PageConsumer<T> {
    /// Next page of this consumer.
    ///
    /// `Ok(None)` means the resource has no more data. `Err(Fetch)` means
    /// the fetch failed and calling again retries the same page.
    pub async fn next_page(&mut self) -> Result<Option<Arc<Page<T>>>, PagingError> {
        let session = self.session.clone();
        if session.cancel.is_cancelled() {
            return Err(PagingError::Closed);
        }

        let step = session.state().step(self.position);
        match step {
            Step::Cached(page) => {
                self.position += 1;
                return Ok(Some(page));
            }
            Step::Done => return Ok(None),
            Step::Fetch(_) => {}
        }

        let _fetching = tokio::select! {
            biased;
            _ = session.cancel.cancelled() => return Err(PagingError::Closed),
            guard = session.fetching.lock() => guard,
        };

        if session.cancel.is_cancelled() {
            return Err(PagingError::Closed);
        }
        // Another consumer may have fetched this page while we waited
        let step = session.state().step(self.position);
        let cursor = match step {
            Step::Cached(page) => {
                self.position += 1;
                return Ok(Some(page));
            }
            Step::Done => return Ok(None),
            Step::Fetch(cursor) => cursor,
        };
        let query = session.query.with_cursor(cursor);

        let fetched = tokio::select! {
            biased;
            _ = session.cancel.cancelled() => {
                tracing::debug!(session = session.id, "In-flight page fetch cancelled");
                return Err(PagingError::Closed);
            }
            fetched = session.transport.fetch_page(&query) => fetched,
        };

        match fetched {
            FetchedResource::Success { data: page } => {
                let page = Arc::new(page);
                let mut state = session.state();
                // close() cancels before it clears the cache, so checking
                // under the lock rules out a page landing after close
                if session.cancel.is_cancelled() {
                    state.release();
                    return Err(PagingError::Closed);
                }
                state.cursor = match page.next_cursor {
                    Some(next) => Cursor::Next(next),
                    None => Cursor::Exhausted,
                };
                state.pages.push(page.clone());
                self.position = state.pages.len();
                tracing::debug!(
                    session = session.id,
                    page = self.position,
                    items = page.items.len(),
                    "Fetched page"
                );
                Ok(Some(page))
            }
            FetchedResource::Failure { cause } => {
                let cause = ErrorCause::from(cause);
                tracing::warn!(session = session.id, cause = ?cause, "Page fetch failed");
                Err(PagingError::Fetch(cause))
            }
        }
    }

    /// Adapt into a stream that ends after the last page or right after
    /// the first error.
    pub fn into_stream(self) -> impl Stream<Item = Result<Arc<Page<T>>, PagingError>> + Send {
        futures::stream::unfold(Some(self), |consumer| async move {
            let mut consumer = consumer?;
            match consumer.next_page().await {
                Ok(Some(page)) => Some((Ok(page), Some(consumer))),
                Ok(None) => None,
                Err(error) => Some((Err(error), None)),
            }
        })
    }
}

/// Paging for one list (one screen and one result variant). Opening a new
/// session closes the previous one, and dropping the stream closes the
/// current one.
pub struct PagedResultStream<T> {
    transport: Arc<dyn PageTransport<T>>,
    current: Option<PageSource<T>>,
    sessions_opened: u64,
}

impl<T: Send + Sync + 'static> PagedResultStream<T> {
    pub fn new(transport: Arc<dyn PageTransport<T>>) -> Self {
        Self {
            transport,
            current: None,
            sessions_opened: 0,
        }
    }

    pub fn open(&mut self, query: PageQuery) -> PageSource<T> {
        self.close();
        self.sessions_opened += 1;
        tracing::debug!(
            session = self.sessions_opened,
            term = %query.search_term,
            country = %query.country_code,
            "Opening paging session"
        );
        let source = PageSource::new(self.sessions_opened, query, self.transport.clone());
        self.current = Some(source.clone());
        source
    }

    pub fn current(&self) -> Option<&PageSource<T>> {
        self.current.as_ref()
    }

    pub fn close(&mut self) {
        if let Some(previous) = self.current.take() {
            previous.close();
        }
    }
}

impl<T> Drop for PagedResultStream<T> {
    fn drop(&mut self) {
        if let Some(current) = self.current.take() {
            current.session.close();
        }
    }
}
