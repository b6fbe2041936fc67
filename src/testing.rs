//! In-memory fakes for controller and paging tests

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::model::{
    AlbumSearchResult, ArtistSearchResult, EpisodeSearchResult, ErrorCause, FeaturedPlaylists,
    FetchedResource, Page, PageCursor, PageQuery, PlaylistSearchResult, PlaylistsForCategory,
    PodcastSearchResult, SearchResults, StatusInfo, TrackSearchResult,
};
use crate::paging::PageTransport;
use crate::repository::{
    AlbumsRepository, HomeFeedRepository, LocaleProvider, SearchRepository, SearchTransports,
    TracksRepository,
};

pub struct FixedLocale;

impl LocaleProvider for FixedLocale {
    fn country_code(&self) -> String {
        "US".to_string()
    }

    fn language_code(&self) -> String {
        "en".to_string()
    }
}

/// Pages over `0..total` in pages of `page_size`
pub struct FakePages {
    total: u32,
    page_size: u32,
    delay: Duration,
    calls: AtomicUsize,
    failures: Mutex<HashMap<u32, StatusInfo>>,
}

impl FakePages {
    pub fn new(total: u32, page_size: u32) -> Self {
        Self {
            total,
            page_size,
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
            failures: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Fail the next fetch at `offset` once
    pub fn fail_once_at(&self, offset: u32, info: StatusInfo) {
        self.failures.lock().unwrap().insert(offset, info);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PageTransport<u32> for FakePages {
    async fn fetch_page(&self, query: &PageQuery) -> FetchedResource<Page<u32>, StatusInfo> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        let offset = query.offset();
        if let Some(info) = self.failures.lock().unwrap().remove(&offset) {
            return FetchedResource::failure(info);
        }
        let end = (offset + self.page_size).min(self.total);
        FetchedResource::success(Page {
            items: (offset..end).collect(),
            next_cursor: (end < self.total).then(|| PageCursor::at(end)),
            total: Some(self.total),
        })
    }
}

/// Answers every page request with the same single-page result
pub struct StaticPages<T> {
    items: Vec<T>,
    pub queries: Mutex<Vec<PageQuery>>,
}

impl<T> StaticPages<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self {
            items,
            queries: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl<T: Clone + Send + Sync> PageTransport<T> for StaticPages<T> {
    async fn fetch_page(&self, query: &PageQuery) -> FetchedResource<Page<T>, StatusInfo> {
        self.queries.lock().unwrap().push(query.clone());
        FetchedResource::success(Page::last(self.items.clone()))
    }
}

/// A canned response delivered after a delay
#[derive(Clone)]
pub struct Scripted<T> {
    pub delay: Duration,
    pub outcome: Result<T, ErrorCause>,
}

impl<T: Clone> Scripted<T> {
    pub fn ok(delay_ms: u64, data: T) -> Self {
        Self {
            delay: Duration::from_millis(delay_ms),
            outcome: Ok(data),
        }
    }

    pub fn err(delay_ms: u64, cause: ErrorCause) -> Self {
        Self {
            delay: Duration::from_millis(delay_ms),
            outcome: Err(cause),
        }
    }

    async fn play(&self) -> FetchedResource<T> {
        tokio::time::sleep(self.delay).await;
        self.outcome.clone().into()
    }
}

pub fn album(id: &str) -> AlbumSearchResult {
    AlbumSearchResult {
        id: id.to_string(),
        name: format!("Album {id}"),
        artists_string: "Radiohead".to_string(),
        album_art_url: format!("https://img/{id}"),
        year_of_release: "1997-05-21".to_string(),
    }
}

pub fn playlist(id: &str) -> PlaylistSearchResult {
    PlaylistSearchResult {
        id: id.to_string(),
        name: format!("Playlist {id}"),
        owner_name: "Spotify".to_string(),
        total_number_of_tracks: 50,
        image_url: Some(format!("https://img/{id}")),
    }
}

pub fn track(id: &str) -> TrackSearchResult {
    TrackSearchResult {
        id: id.to_string(),
        name: format!("Track {id}"),
        artists_string: "Radiohead".to_string(),
        image_url: None,
        preview_url: None,
        duration_ms: 200_000,
    }
}

pub struct FakeHomeFeed {
    pub featured: Scripted<FeaturedPlaylists>,
    pub new_albums: Scripted<Vec<AlbumSearchResult>>,
    pub categories: Scripted<Vec<PlaylistsForCategory>>,
    pub calls: AtomicUsize,
}

impl FakeHomeFeed {
    /// All three fetches succeed with one item each, completing in the order
    /// featured, albums, categories.
    pub fn healthy() -> Self {
        Self {
            featured: Scripted::ok(
                10,
                FeaturedPlaylists {
                    message: "Editor's picks".to_string(),
                    playlists: vec![playlist("featured")],
                },
            ),
            new_albums: Scripted::ok(20, vec![album("new")]),
            categories: Scripted::ok(
                30,
                vec![PlaylistsForCategory {
                    category_id: "chill".to_string(),
                    name_of_category: "Chill".to_string(),
                    associated_playlists: vec![playlist("chill-1")],
                }],
            ),
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl HomeFeedRepository for FakeHomeFeed {
    async fn fetch_newly_released_albums(
        &self,
        _country_code: &str,
    ) -> FetchedResource<Vec<AlbumSearchResult>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.new_albums.play().await
    }

    async fn fetch_featured_playlists(
        &self,
        _timestamp: DateTime<Utc>,
        _country_code: &str,
        _language_code: &str,
    ) -> FetchedResource<FeaturedPlaylists> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.featured.play().await
    }

    async fn fetch_playlists_for_categories(
        &self,
        _country_code: &str,
        _language_code: &str,
    ) -> FetchedResource<Vec<PlaylistsForCategory>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.categories.play().await
    }
}

pub struct FakeTracks(pub Scripted<Vec<TrackSearchResult>>);

#[async_trait]
impl TracksRepository for FakeTracks {
    async fn fetch_top_tracks_for_artist(
        &self,
        _artist_id: &str,
        _country_code: &str,
    ) -> FetchedResource<Vec<TrackSearchResult>> {
        self.0.play().await
    }
}

pub struct FakeAlbums(pub Arc<StaticPages<AlbumSearchResult>>);

impl AlbumsRepository for FakeAlbums {
    fn artist_albums_transport(&self) -> Arc<dyn PageTransport<AlbumSearchResult>> {
        self.0.clone()
    }
}

pub struct FakeSearch {
    pub results: Mutex<Scripted<SearchResults>>,
    pub albums: Arc<StaticPages<AlbumSearchResult>>,
}

impl FakeSearch {
    pub fn new(results: Scripted<SearchResults>) -> Self {
        Self {
            results: Mutex::new(results),
            albums: Arc::new(StaticPages::new(vec![album("paged")])),
        }
    }
}

#[async_trait]
impl SearchRepository for FakeSearch {
    async fn fetch_search_results(
        &self,
        _query: &str,
        _country_code: &str,
    ) -> FetchedResource<SearchResults> {
        let script = self.results.lock().unwrap().clone();
        script.play().await
    }

    fn search_transports(&self) -> SearchTransports {
        SearchTransports {
            albums: self.albums.clone(),
            artists: Arc::new(StaticPages::<ArtistSearchResult>::new(Vec::new())),
            tracks: Arc::new(StaticPages::new(vec![track("paged")])),
            playlists: Arc::new(StaticPages::<PlaylistSearchResult>::new(Vec::new())),
            podcasts: Arc::new(StaticPages::<PodcastSearchResult>::new(Vec::new())),
            episodes: Arc::new(StaticPages::<EpisodeSearchResult>::new(Vec::new())),
        }
    }
}
