//! Artist detail: top tracks plus a paged list of the artist's albums

use std::sync::Arc;
use tokio::sync::{Mutex, watch};

use super::CycleRunner;
use crate::model::{AlbumSearchResult, PageQuery, ScreenState, TrackSearchResult};
use crate::paging::{PageSource, PagedResultStream};
use crate::reconciler::ResultReconciler;
use crate::repository::{AlbumsRepository, LocaleProvider, TracksRepository};

pub const POPULAR_TRACKS_ERROR: &str = "Error loading tracks, please check internet connection";

struct ArtistDetailState {
    artist_id: String,
    tracks: Arc<dyn TracksRepository>,
    locale: Arc<dyn LocaleProvider>,
    state: watch::Sender<ScreenState>,
    popular_tracks: watch::Sender<Vec<TrackSearchResult>>,
}

pub struct ArtistDetailController {
    shared: Arc<ArtistDetailState>,
    albums: Mutex<PagedResultStream<AlbumSearchResult>>,
    cycle: CycleRunner,
}

impl ArtistDetailController {
    /// Create the controller, open the album stream and start fetching the
    /// artist's popular tracks. Must be called inside a Tokio runtime.
    pub async fn new(
        artist_id: impl Into<String>,
        tracks: Arc<dyn TracksRepository>,
        albums: Arc<dyn AlbumsRepository>,
        locale: Arc<dyn LocaleProvider>,
    ) -> Self {
        let artist_id = artist_id.into();
        let (state, _) = watch::channel(ScreenState::Idle);
        let (popular_tracks, _) = watch::channel(Vec::new());

        let mut album_stream = PagedResultStream::new(albums.artist_albums_transport());
        album_stream.open(PageQuery::new(artist_id.clone(), locale.country_code()));

        let controller = Self {
            shared: Arc::new(ArtistDetailState {
                artist_id,
                tracks,
                locale,
                state,
                popular_tracks,
            }),
            albums: Mutex::new(album_stream),
            cycle: CycleRunner::new("artist_detail"),
        };
        controller.refresh().await;
        controller
    }

    pub fn artist_id(&self) -> &str {
        &self.shared.artist_id
    }

    pub fn state(&self) -> watch::Receiver<ScreenState> {
        self.shared.state.subscribe()
    }

    pub fn popular_tracks(&self) -> watch::Receiver<Vec<TrackSearchResult>> {
        self.shared.popular_tracks.subscribe()
    }

    /// The open album session, `None` once disposed
    pub async fn albums(&self) -> Option<PageSource<AlbumSearchResult>> {
        self.albums.lock().await.current().cloned()
    }

    /// Refetch popular tracks. Ignored while a fetch is in flight.
    pub async fn refresh(&self) -> bool {
        let shared = self.shared.clone();
        self.cycle.start_if_idle(load_popular_tracks(shared)).await
    }

    pub async fn settled(&self) {
        self.cycle.wait().await;
    }

    pub async fn dispose(&self) {
        self.cycle.dispose().await;
        self.albums.lock().await.close();
    }
}

async fn load_popular_tracks(shared: Arc<ArtistDetailState>) {
    let country = shared.locale.country_code();
    let mut reconciler = ResultReconciler::new(POPULAR_TRACKS_ERROR);
    reconciler.track(
        shared
            .tracks
            .fetch_top_tracks_for_artist(&shared.artist_id, &country),
        |tracks: &mut Option<Vec<TrackSearchResult>>, fetched| *tracks = Some(fetched),
    );

    let mut tracks = None;
    reconciler.run(&shared.state, &mut tracks).await;
    if let Some(tracks) = tracks {
        tracing::info!(artist_id = %shared.artist_id, tracks = tracks.len(), "Popular tracks loaded");
        shared.popular_tracks.send_replace(tracks);
    }
}
