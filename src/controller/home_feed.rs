//! Home feed: featured playlists, new releases and per-category playlists

use chrono::Utc;
use std::sync::Arc;
use tokio::sync::watch;

use super::CycleRunner;
use crate::greeting;
use crate::model::{HomeFeedCarousel, ScreenState, SearchResult};
use crate::reconciler::ResultReconciler;
use crate::repository::{HomeFeedRepository, LocaleProvider};

pub const FEATURED_PLAYLISTS: &str = "Featured Playlists";
pub const NEWLY_RELEASED_ALBUMS: &str = "Newly Released Albums";
const HOME_FEED_ERROR: &str = "Could not load the home feed, please check your internet connection";

struct HomeFeedState {
    repository: Arc<dyn HomeFeedRepository>,
    locale: Arc<dyn LocaleProvider>,
    state: watch::Sender<ScreenState>,
    carousels: watch::Sender<Vec<HomeFeedCarousel>>,
}

pub struct HomeFeedController {
    shared: Arc<HomeFeedState>,
    cycle: CycleRunner,
    greeting: &'static str,
}

impl HomeFeedController {
    /// Create the controller and start loading the feed. Must be called
    /// inside a Tokio runtime.
    pub async fn new(
        repository: Arc<dyn HomeFeedRepository>,
        locale: Arc<dyn LocaleProvider>,
    ) -> Self {
        let (state, _) = watch::channel(ScreenState::Idle);
        let (carousels, _) = watch::channel(Vec::new());
        let controller = Self {
            shared: Arc::new(HomeFeedState {
                repository,
                locale,
                state,
                carousels,
            }),
            cycle: CycleRunner::new("home_feed"),
            greeting: greeting::current_greeting(),
        };
        controller.start_cycle().await;
        controller
    }

    pub fn state(&self) -> watch::Receiver<ScreenState> {
        self.shared.state.subscribe()
    }

    pub fn carousels(&self) -> watch::Receiver<Vec<HomeFeedCarousel>> {
        self.shared.carousels.subscribe()
    }

    pub fn greeting(&self) -> &'static str {
        self.greeting
    }

    /// Reload the feed. Ignored while a load is in flight.
    pub async fn refresh(&self) -> bool {
        self.start_cycle().await
    }

    /// Wait for the current load to finish
    pub async fn settled(&self) {
        self.cycle.wait().await;
    }

    /// Cancel any in-flight load. Nothing is published afterwards.
    pub async fn dispose(&self) {
        self.cycle.dispose().await;
    }

    async fn start_cycle(&self) -> bool {
        let shared = self.shared.clone();
        self.cycle.start_if_idle(load_home_feed(shared)).await
    }
}

async fn load_home_feed(shared: Arc<HomeFeedState>) {
    let country = shared.locale.country_code();
    let language = shared.locale.language_code();
    let repository = &shared.repository;
    tracing::debug!(country = %country, language = %language, "Loading home feed");

    let mut reconciler = ResultReconciler::new(HOME_FEED_ERROR);
    reconciler
        .track(
            repository.fetch_featured_playlists(Utc::now(), &country, &language),
            |carousels: &mut Vec<HomeFeedCarousel>, featured| {
                carousels.push(HomeFeedCarousel::from_results(
                    FEATURED_PLAYLISTS,
                    featured.playlists.into_iter().map(SearchResult::Playlist),
                ));
            },
        )
        .track(
            repository.fetch_newly_released_albums(&country),
            |carousels: &mut Vec<HomeFeedCarousel>, albums| {
                carousels.push(HomeFeedCarousel::from_results(
                    NEWLY_RELEASED_ALBUMS,
                    albums.into_iter().map(SearchResult::Album),
                ));
            },
        )
        .track(
            repository.fetch_playlists_for_categories(&country, &language),
            |carousels: &mut Vec<HomeFeedCarousel>, categories| {
                carousels.extend(categories.into_iter().map(HomeFeedCarousel::from));
            },
        );

    let mut carousels = Vec::new();
    reconciler.run(&shared.state, &mut carousels).await;
    tracing::info!(carousels = carousels.len(), "Home feed loaded");
    shared.carousels.send_replace(carousels);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ErrorCause;
    use crate::testing::{FakeHomeFeed, FixedLocale, Scripted};
    use std::sync::atomic::Ordering;

    async fn controller(feed: FakeHomeFeed) -> (Arc<FakeHomeFeed>, HomeFeedController) {
        let feed = Arc::new(feed);
        let controller = HomeFeedController::new(feed.clone(), Arc::new(FixedLocale)).await;
        (feed, controller)
    }

    fn titles(carousels: &[HomeFeedCarousel]) -> Vec<&str> {
        carousels.iter().map(|c| c.title.as_str()).collect()
    }

    #[tokio::test(start_paused = true)]
    async fn carousels_follow_completion_order() {
        let mut feed = FakeHomeFeed::healthy();
        feed.new_albums.delay = std::time::Duration::from_millis(5);
        let (_, controller) = controller(feed).await;
        controller.settled().await;

        assert_eq!(*controller.state().borrow(), ScreenState::Idle);
        assert_eq!(
            titles(&controller.carousels().borrow()),
            vec![NEWLY_RELEASED_ALBUMS, FEATURED_PLAYLISTS, "Chill"]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn early_failure_is_masked_by_later_successes() {
        let mut feed = FakeHomeFeed::healthy();
        feed.featured = Scripted::err(5, ErrorCause::ConnectivityFailure);
        let (_, controller) = controller(feed).await;
        let mut state = controller.state();

        state.wait_for(ScreenState::is_error).await.unwrap();
        controller.settled().await;

        assert_eq!(*controller.state().borrow(), ScreenState::Idle);
        let carousels = controller.carousels().borrow().clone();
        assert_eq!(titles(&carousels), vec![NEWLY_RELEASED_ALBUMS, "Chill"]);
        assert!(carousels.iter().all(|c| c.title != FEATURED_PLAYLISTS));
    }

    #[tokio::test(start_paused = true)]
    async fn last_failure_leaves_error() {
        let mut feed = FakeHomeFeed::healthy();
        feed.categories = Scripted::err(40, ErrorCause::RateLimitExceeded);
        let (_, controller) = controller(feed).await;
        controller.settled().await;

        assert_eq!(
            *controller.state().borrow(),
            ScreenState::Error {
                message: HOME_FEED_ERROR,
                cause: ErrorCause::RateLimitExceeded
            }
        );
        assert_eq!(controller.carousels().borrow().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn refresh_is_ignored_while_loading() {
        let (feed, controller) = controller(FakeHomeFeed::healthy()).await;
        assert!(!controller.refresh().await);
        controller.settled().await;
        assert_eq!(feed.calls.load(Ordering::SeqCst), 3);

        assert!(controller.refresh().await);
        controller.settled().await;
        assert_eq!(feed.calls.load(Ordering::SeqCst), 6);
    }

    #[tokio::test(start_paused = true)]
    async fn dispose_publishes_nothing_further() {
        let (_, controller) = controller(FakeHomeFeed::healthy()).await;
        let carousels = controller.carousels();
        tokio::time::sleep(std::time::Duration::from_millis(15)).await;
        controller.dispose().await;
        tokio::time::sleep(std::time::Duration::from_millis(100)).await;

        assert!(!carousels.has_changed().unwrap());
        assert!(carousels.borrow().is_empty());
        assert!(!controller.refresh().await);
    }
}
