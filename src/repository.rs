//! Repository interfaces controllers fetch through
//!
//! Each method is a single round trip and reports failure as a value. The
//! only production implementation is [`CatalogClient`](crate::model::CatalogClient);
//! tests substitute in-memory fakes.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::model::{
    AlbumSearchResult, ArtistSearchResult, EpisodeSearchResult, FeaturedPlaylists,
    FetchedResource, PlaylistSearchResult, PlaylistsForCategory, PodcastSearchResult,
    SearchResults, TrackSearchResult,
};
use crate::paging::PageTransport;

/// Current locale of the user
pub trait LocaleProvider: Send + Sync {
    /// ISO 3166-1 alpha-2 country code, e.g. "US"
    fn country_code(&self) -> String;
    /// ISO 639-1 language code, e.g. "en"
    fn language_code(&self) -> String;
}

#[async_trait]
pub trait HomeFeedRepository: Send + Sync {
    async fn fetch_newly_released_albums(
        &self,
        country_code: &str,
    ) -> FetchedResource<Vec<AlbumSearchResult>>;

    async fn fetch_featured_playlists(
        &self,
        timestamp: DateTime<Utc>,
        country_code: &str,
        language_code: &str,
    ) -> FetchedResource<FeaturedPlaylists>;

    async fn fetch_playlists_for_categories(
        &self,
        country_code: &str,
        language_code: &str,
    ) -> FetchedResource<Vec<PlaylistsForCategory>>;
}

#[async_trait]
pub trait TracksRepository: Send + Sync {
    async fn fetch_top_tracks_for_artist(
        &self,
        artist_id: &str,
        country_code: &str,
    ) -> FetchedResource<Vec<TrackSearchResult>>;
}

pub trait AlbumsRepository: Send + Sync {
    /// Pages through an artist's albums. The artist id is the query's
    /// search term.
    fn artist_albums_transport(&self) -> Arc<dyn PageTransport<AlbumSearchResult>>;
}

/// One page transport per search result variant
#[derive(Clone)]
pub struct SearchTransports {
    pub albums: Arc<dyn PageTransport<AlbumSearchResult>>,
    pub artists: Arc<dyn PageTransport<ArtistSearchResult>>,
    pub tracks: Arc<dyn PageTransport<TrackSearchResult>>,
    pub playlists: Arc<dyn PageTransport<PlaylistSearchResult>>,
    pub podcasts: Arc<dyn PageTransport<PodcastSearchResult>>,
    pub episodes: Arc<dyn PageTransport<EpisodeSearchResult>>,
}

#[async_trait]
pub trait SearchRepository: Send + Sync {
    /// First page of every variant for `query`
    async fn fetch_search_results(
        &self,
        query: &str,
        country_code: &str,
    ) -> FetchedResource<SearchResults>;

    fn search_transports(&self) -> SearchTransports;
}
