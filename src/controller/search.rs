//! Search: combined first-page results plus one paged session per variant

use std::sync::Arc;
use tokio::sync::{Mutex, watch};

use super::CycleRunner;
use crate::model::{
    AlbumSearchResult, ArtistSearchResult, EpisodeSearchResult, PageQuery, PlaylistSearchResult,
    PodcastSearchResult, ScreenState, SearchResults, TrackSearchResult,
};
use crate::paging::{PageSource, PagedResultStream};
use crate::reconciler::ResultReconciler;
use crate::repository::{LocaleProvider, SearchRepository};

const SEARCH_ERROR: &str = "Could not complete the search, please check your internet connection";

/// Open paging sessions for the current search term
#[derive(Clone)]
pub struct SearchSessions {
    pub albums: PageSource<AlbumSearchResult>,
    pub artists: PageSource<ArtistSearchResult>,
    pub tracks: PageSource<TrackSearchResult>,
    pub playlists: PageSource<PlaylistSearchResult>,
    pub podcasts: PageSource<PodcastSearchResult>,
    pub episodes: PageSource<EpisodeSearchResult>,
}

struct SearchStreams {
    albums: PagedResultStream<AlbumSearchResult>,
    artists: PagedResultStream<ArtistSearchResult>,
    tracks: PagedResultStream<TrackSearchResult>,
    playlists: PagedResultStream<PlaylistSearchResult>,
    podcasts: PagedResultStream<PodcastSearchResult>,
    episodes: PagedResultStream<EpisodeSearchResult>,
    current: Option<SearchSessions>,
}

impl SearchStreams {
    fn open(&mut self, query: PageQuery) -> SearchSessions {
        let sessions = SearchSessions {
            albums: self.albums.open(query.clone()),
            artists: self.artists.open(query.clone()),
            tracks: self.tracks.open(query.clone()),
            playlists: self.playlists.open(query.clone()),
            podcasts: self.podcasts.open(query.clone()),
            episodes: self.episodes.open(query),
        };
        self.current = Some(sessions.clone());
        sessions
    }

    fn close(&mut self) {
        self.albums.close();
        self.artists.close();
        self.tracks.close();
        self.playlists.close();
        self.podcasts.close();
        self.episodes.close();
        self.current = None;
    }
}

struct SearchState {
    repository: Arc<dyn SearchRepository>,
    state: watch::Sender<ScreenState>,
    results: watch::Sender<SearchResults>,
}

pub struct SearchController {
    shared: Arc<SearchState>,
    locale: Arc<dyn LocaleProvider>,
    streams: Mutex<SearchStreams>,
    last_term: Mutex<Option<String>>,
    cycle: CycleRunner,
}

impl SearchController {
    pub fn new(repository: Arc<dyn SearchRepository>, locale: Arc<dyn LocaleProvider>) -> Self {
        let transports = repository.search_transports();
        let (state, _) = watch::channel(ScreenState::Idle);
        let (results, _) = watch::channel(SearchResults::default());
        Self {
            shared: Arc::new(SearchState {
                repository,
                state,
                results,
            }),
            locale,
            streams: Mutex::new(SearchStreams {
                albums: PagedResultStream::new(transports.albums),
                artists: PagedResultStream::new(transports.artists),
                tracks: PagedResultStream::new(transports.tracks),
                playlists: PagedResultStream::new(transports.playlists),
                podcasts: PagedResultStream::new(transports.podcasts),
                episodes: PagedResultStream::new(transports.episodes),
                current: None,
            }),
            last_term: Mutex::new(None),
            cycle: CycleRunner::new("search"),
        }
    }

    pub fn state(&self) -> watch::Receiver<ScreenState> {
        self.shared.state.subscribe()
    }

    pub fn results(&self) -> watch::Receiver<SearchResults> {
        self.shared.results.subscribe()
    }

    pub async fn sessions(&self) -> Option<SearchSessions> {
        self.streams.lock().await.current.clone()
    }

    /// Start searching for `term`, replacing any search in flight and every
    /// open paging session. A blank term clears the results.
    pub async fn search(&self, term: &str) -> Option<SearchSessions> {
        if self.cycle.is_disposed() {
            return None;
        }
        let term = term.trim();
        let mut streams = self.streams.lock().await;

        if term.is_empty() {
            streams.close();
            *self.last_term.lock().await = None;
            let shared = self.shared.clone();
            self.cycle
                .restart(async move {
                    shared.results.send_replace(SearchResults::default());
                    shared.state.send_replace(ScreenState::Idle);
                })
                .await;
            return None;
        }

        let country = self.locale.country_code();
        let sessions = streams.open(PageQuery::new(term, country.clone()));
        drop(streams);

        *self.last_term.lock().await = Some(term.to_string());
        let shared = self.shared.clone();
        self.cycle
            .restart(run_search(shared, term.to_string(), country))
            .await;
        Some(sessions)
    }

    /// Repeat the last search. Ignored while a search is in flight.
    pub async fn refresh(&self) -> bool {
        let Some(term) = self.last_term.lock().await.clone() else {
            return false;
        };
        if self.cycle.is_running().await {
            return false;
        }
        self.search(&term).await.is_some()
    }

    pub async fn settled(&self) {
        self.cycle.wait().await;
    }

    pub async fn dispose(&self) {
        self.cycle.dispose().await;
        self.streams.lock().await.close();
    }
}

async fn run_search(shared: Arc<SearchState>, term: String, country: String) {
    tracing::debug!(term = %term, country = %country, "Searching");
    let mut reconciler = ResultReconciler::new(SEARCH_ERROR);
    reconciler.track(
        shared.repository.fetch_search_results(&term, &country),
        |results: &mut Option<SearchResults>, fetched| *results = Some(fetched),
    );

    let mut results = None;
    reconciler.run(&shared.state, &mut results).await;
    if let Some(results) = results {
        shared.results.send_replace(results);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ErrorCause;
    use crate::paging::PagingError;
    use crate::testing::{FakeSearch, FixedLocale, Scripted, album, track};

    fn results() -> SearchResults {
        SearchResults {
            albums: vec![album("a1")],
            tracks: vec![track("t1")],
            ..Default::default()
        }
    }

    fn controller(search: FakeSearch) -> (Arc<FakeSearch>, SearchController) {
        let search = Arc::new(search);
        let controller = SearchController::new(search.clone(), Arc::new(FixedLocale));
        (search, controller)
    }

    #[tokio::test(start_paused = true)]
    async fn search_publishes_results_and_opens_sessions() {
        let (search, controller) = controller(FakeSearch::new(Scripted::ok(10, results())));
        let sessions = controller.search("  radiohead ").await.unwrap();
        controller.settled().await;

        assert_eq!(*controller.state().borrow(), ScreenState::Idle);
        assert_eq!(*controller.results().borrow(), results());

        let page = sessions.albums.subscribe().next_page().await.unwrap().unwrap();
        assert_eq!(page.items[0].id, "paged");
        assert_eq!(search.albums.queries.lock().unwrap()[0].search_term, "radiohead");
    }

    #[tokio::test(start_paused = true)]
    async fn new_search_closes_previous_sessions() {
        let (_, controller) = controller(FakeSearch::new(Scripted::ok(10, results())));
        let first = controller.search("radiohead").await.unwrap();
        let second = controller.search("portishead").await.unwrap();

        assert!(first.tracks.is_closed());
        assert_eq!(
            first.tracks.subscribe().next_page().await,
            Err(PagingError::Closed)
        );
        assert!(!second.tracks.is_closed());
        assert_eq!(
            controller.sessions().await.unwrap().tracks.query().search_term,
            "portishead"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn failed_search_keeps_previous_results() {
        let (search, controller) = controller(FakeSearch::new(Scripted::ok(10, results())));
        controller.search("radiohead").await;
        controller.settled().await;
        assert_eq!(*controller.results().borrow(), results());

        *search.results.lock().unwrap() = Scripted::err(10, ErrorCause::ExpiredOrBadToken);
        controller.search("portishead").await;
        controller.settled().await;

        assert!(controller.state().borrow().is_error());
        assert_eq!(*controller.results().borrow(), results());
    }

    #[tokio::test(start_paused = true)]
    async fn blank_term_clears_everything() {
        let (_, controller) = controller(FakeSearch::new(Scripted::ok(10, results())));
        controller.search("radiohead").await;
        controller.settled().await;

        assert!(controller.search("   ").await.is_none());
        controller.settled().await;
        assert!(controller.sessions().await.is_none());
        assert_eq!(*controller.results().borrow(), SearchResults::default());
        assert!(!controller.refresh().await);
    }

    #[tokio::test(start_paused = true)]
    async fn dispose_stops_search() {
        let (_, controller) = controller(FakeSearch::new(Scripted::ok(10, results())));
        let sessions = controller.search("radiohead").await.unwrap();
        controller.dispose().await;
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;

        assert!(controller.results().borrow().is_empty());
        assert!(sessions.albums.is_closed());
        assert!(controller.search("again").await.is_none());
    }
}
