//! Spotify catalog client implementing the repository traits

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::future::join_all;
use serde::de::DeserializeOwned;
use std::marker::PhantomData;
use std::sync::Arc;
use rspotify::{
    ClientCredsSpotify, ClientResult,
    model::{
        self as spotify, AlbumType, ArtistId, Country, FullArtist, FullTrack, Image, Market, SearchType,
        SimplifiedAlbum, SimplifiedEpisode, SimplifiedPlaylist, SimplifiedShow,
    },
    prelude::*,
};

use super::content::{
    AlbumSearchResult, ArtistSearchResult, EpisodeSearchResult, FeaturedPlaylists,
    PlaylistSearchResult, PlaylistsForCategory, PodcastSearchResult, SearchResults,
    TrackSearchResult,
};
use super::error::{ErrorCause, StatusInfo};
use super::fetched::FetchedResource;
use super::types::{Page, PageCursor, PageQuery};
use crate::paging::PageTransport;
use crate::repository::{
    AlbumsRepository, HomeFeedRepository, SearchRepository, SearchTransports, TracksRepository,
};

/// Catalog client backed by a client-credentials rspotify session
#[derive(Clone)]
pub struct CatalogClient {
    client: Arc<ClientCredsSpotify>,
    page_size: u32,
}

impl CatalogClient {
    pub fn new(client: ClientCredsSpotify, page_size: u32) -> Self {
        Self {
            client: Arc::new(client),
            page_size,
        }
    }

    fn pager<T: SearchVariant>(&self) -> Arc<SearchPager<T>> {
        Arc::new(SearchPager {
            client: self.client.clone(),
            page_size: self.page_size,
            variant: PhantomData,
        })
    }

    async fn playlists_for_category(
        &self,
        category: spotify::Category,
        country_code: &str,
    ) -> Option<PlaylistsForCategory> {
        let result = self
            .client
            .category_playlists_manual(
                &category.id,
                market_for(country_code),
                Some(self.page_size),
                None,
            )
            .await;
        match result {
            Ok(page) => Some(PlaylistsForCategory {
                category_id: category.id,
                name_of_category: category.name,
                associated_playlists: page.items.into_iter().map(playlist_result).collect(),
            }),
            Err(e) => {
                tracing::warn!(category = %category.id, error = %e, "Skipping category, playlists unavailable");
                None
            }
        }
    }
}

/// Resolve a country code into a market. Unknown codes fall back to the
/// catalog's default market.
pub fn market_for(country_code: &str) -> Option<Market> {
    let code = serde_json::Value::String(country_code.to_ascii_uppercase());
    match serde_json::from_value::<Country>(code) {
        Ok(country) => Some(Market::Country(country)),
        Err(_) => {
            tracing::warn!(country_code, "Unknown country code, using default market");
            None
        }
    }
}

fn fetched<T>(operation: &'static str, result: ClientResult<T>) -> FetchedResource<T> {
    crate::log_fetch_result!(operation, result);
    match result {
        Ok(data) => FetchedResource::success(data),
        Err(e) => FetchedResource::failure(ErrorCause::from(&e)),
    }
}

fn first_image(images: &[Image]) -> Option<String> {
    images.first().map(|image| image.url.clone())
}

fn join_artist_names(artists: &[spotify::SimplifiedArtist]) -> String {
    artists
        .iter()
        .map(|a| a.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

fn album_result(album: SimplifiedAlbum) -> AlbumSearchResult {
    AlbumSearchResult {
        id: album.id.as_ref().map(|id| id.id().to_string()).unwrap_or_default(),
        artists_string: join_artist_names(&album.artists),
        album_art_url: first_image(&album.images).unwrap_or_default(),
        year_of_release: album.release_date.unwrap_or_default(),
        name: album.name,
    }
}

fn artist_result(artist: FullArtist) -> ArtistSearchResult {
    ArtistSearchResult {
        id: artist.id.id().to_string(),
        image_url: first_image(&artist.images),
        name: artist.name,
    }
}

fn track_result(track: FullTrack) -> TrackSearchResult {
    TrackSearchResult {
        id: track.id.as_ref().map(|id| id.id().to_string()).unwrap_or_default(),
        artists_string: join_artist_names(&track.artists),
        image_url: first_image(&track.album.images),
        preview_url: track.preview_url,
        duration_ms: track.duration.num_milliseconds() as u32,
        name: track.name,
    }
}

fn playlist_result(playlist: SimplifiedPlaylist) -> PlaylistSearchResult {
    PlaylistSearchResult {
        id: playlist.id.id().to_string(),
        owner_name: playlist
            .owner
            .display_name
            .clone()
            .unwrap_or_else(|| playlist.owner.id.id().to_string()),
        total_number_of_tracks: playlist.tracks.total,
        image_url: first_image(&playlist.images),
        name: playlist.name,
    }
}

fn podcast_result(show: SimplifiedShow) -> PodcastSearchResult {
    PodcastSearchResult {
        id: show.id.id().to_string(),
        image_url: first_image(&show.images),
        name: show.name,
        publisher: show.publisher,
    }
}

fn episode_result(episode: SimplifiedEpisode) -> EpisodeSearchResult {
    EpisodeSearchResult {
        id: episode.id.id().to_string(),
        image_url: first_image(&episode.images),
        duration_ms: episode.duration.num_milliseconds() as u32,
        release_date: episode.release_date,
        name: episode.name,
    }
}

/// All six first pages, or the first failure among them
fn combine_first_pages(
    albums: FetchedResource<Page<AlbumSearchResult>, StatusInfo>,
    artists: FetchedResource<Page<ArtistSearchResult>, StatusInfo>,
    tracks: FetchedResource<Page<TrackSearchResult>, StatusInfo>,
    playlists: FetchedResource<Page<PlaylistSearchResult>, StatusInfo>,
    podcasts: FetchedResource<Page<PodcastSearchResult>, StatusInfo>,
    episodes: FetchedResource<Page<EpisodeSearchResult>, StatusInfo>,
) -> Result<SearchResults, StatusInfo> {
    Ok(SearchResults {
        albums: albums.into_result()?.items,
        artists: artists.into_result()?.items,
        tracks: tracks.into_result()?.items,
        playlists: playlists.into_result()?.items,
        podcasts: podcasts.into_result()?.items,
        episodes: episodes.into_result()?.items,
    })
}

fn convert_page<S, T>(page: spotify::Page<S>, convert: impl Fn(S) -> T) -> Page<T>
where
    S: DeserializeOwned,
{
    let delivered = page.offset + page.items.len() as u32;
    Page {
        next_cursor: page.next.is_some().then(|| PageCursor::at(delivered)),
        total: Some(page.total),
        items: page.items.into_iter().map(convert).collect(),
    }
}

/// A result type that can be searched for on its own
pub trait SearchVariant: Sized + Send + Sync + 'static {
    const SEARCH_TYPE: SearchType;

    /// `None` if the response holds a different variant
    fn page_of(result: spotify::SearchResult) -> Option<Page<Self>>;
}

impl SearchVariant for AlbumSearchResult {
    const SEARCH_TYPE: SearchType = SearchType::Album;

    fn page_of(result: spotify::SearchResult) -> Option<Page<Self>> {
        match result {
            spotify::SearchResult::Albums(page) => Some(convert_page(page, album_result)),
            _ => None,
        }
    }
}

impl SearchVariant for ArtistSearchResult {
    const SEARCH_TYPE: SearchType = SearchType::Artist;

    fn page_of(result: spotify::SearchResult) -> Option<Page<Self>> {
        match result {
            spotify::SearchResult::Artists(page) => Some(convert_page(page, artist_result)),
            _ => None,
        }
    }
}

impl SearchVariant for TrackSearchResult {
    const SEARCH_TYPE: SearchType = SearchType::Track;

    fn page_of(result: spotify::SearchResult) -> Option<Page<Self>> {
        match result {
            spotify::SearchResult::Tracks(page) => Some(convert_page(page, track_result)),
            _ => None,
        }
    }
}

impl SearchVariant for PlaylistSearchResult {
    const SEARCH_TYPE: SearchType = SearchType::Playlist;

    fn page_of(result: spotify::SearchResult) -> Option<Page<Self>> {
        match result {
            spotify::SearchResult::Playlists(page) => Some(convert_page(page, playlist_result)),
            _ => None,
        }
    }
}

impl SearchVariant for PodcastSearchResult {
    const SEARCH_TYPE: SearchType = SearchType::Show;

    fn page_of(result: spotify::SearchResult) -> Option<Page<Self>> {
        match result {
            spotify::SearchResult::Shows(page) => Some(convert_page(page, podcast_result)),
            _ => None,
        }
    }
}

impl SearchVariant for EpisodeSearchResult {
    const SEARCH_TYPE: SearchType = SearchType::Episode;

    fn page_of(result: spotify::SearchResult) -> Option<Page<Self>> {
        match result {
            spotify::SearchResult::Episodes(page) => Some(convert_page(page, episode_result)),
            _ => None,
        }
    }
}

/// Pages through search results of one variant
pub struct SearchPager<T> {
    client: Arc<ClientCredsSpotify>,
    page_size: u32,
    variant: PhantomData<fn() -> T>,
}

impl<T: SearchVariant> SearchPager<T> {
    async fn search(&self, query: &PageQuery) -> FetchedResource<Page<T>, StatusInfo> {
        crate::log_fetch_request!("search", term = %query.search_term, search_type = ?T::SEARCH_TYPE, offset = query.offset());
        let result = self
            .client
            .search(
                &query.search_term,
                T::SEARCH_TYPE,
                market_for(&query.country_code),
                None,
                Some(self.page_size),
                Some(query.offset()),
            )
            .await;
        match result {
            Ok(result) => match T::page_of(result) {
                Some(page) => FetchedResource::success(page),
                None => FetchedResource::failure(StatusInfo::Decode),
            },
            Err(e) => {
                tracing::warn!(term = %query.search_term, error = %e, "Search page request failed");
                FetchedResource::failure(StatusInfo::from(&e))
            }
        }
    }
}

#[async_trait]
impl<T: SearchVariant> PageTransport<T> for SearchPager<T> {
    async fn fetch_page(&self, query: &PageQuery) -> FetchedResource<Page<T>, StatusInfo> {
        self.search(query).await
    }
}

/// Pages through an artist's albums; the query's search term is the artist id
pub struct ArtistAlbumsPager {
    client: Arc<ClientCredsSpotify>,
    page_size: u32,
}

#[async_trait]
impl PageTransport<AlbumSearchResult> for ArtistAlbumsPager {
    async fn fetch_page(
        &self,
        query: &PageQuery,
    ) -> FetchedResource<Page<AlbumSearchResult>, StatusInfo> {
        let id = match ArtistId::from_id(query.search_term.as_str()) {
            Ok(id) => id,
            Err(e) => return FetchedResource::failure(StatusInfo::Other(e.to_string())),
        };
        crate::log_fetch_request!("artist_albums", artist_id = %query.search_term, offset = query.offset());
        let result = self
            .client
            .artist_albums_manual(
                id,
                [AlbumType::Album, AlbumType::Single],
                market_for(&query.country_code),
                Some(self.page_size),
                Some(query.offset()),
            )
            .await;
        match result {
            Ok(page) => FetchedResource::success(convert_page(page, album_result)),
            Err(e) => FetchedResource::failure(StatusInfo::from(&e)),
        }
    }
}

#[async_trait]
impl HomeFeedRepository for CatalogClient {
    async fn fetch_newly_released_albums(
        &self,
        country_code: &str,
    ) -> FetchedResource<Vec<AlbumSearchResult>> {
        crate::log_fetch_request!("new_releases", country = country_code);
        let result = self
            .client
            .new_releases_manual(market_for(country_code), Some(self.page_size), None)
            .await;
        fetched("new_releases", result)
            .map(|page| page.items.into_iter().map(album_result).collect())
    }

    async fn fetch_featured_playlists(
        &self,
        timestamp: DateTime<Utc>,
        country_code: &str,
        language_code: &str,
    ) -> FetchedResource<FeaturedPlaylists> {
        let locale = format!("{language_code}_{country_code}");
        crate::log_fetch_request!("featured_playlists", locale = %locale, timestamp = %timestamp);
        let result = self
            .client
            .featured_playlists(
                Some(locale.as_str()),
                market_for(country_code),
                Some(timestamp),
                Some(self.page_size),
                None,
            )
            .await;
        fetched("featured_playlists", result).map(|featured| FeaturedPlaylists {
            message: featured.message,
            playlists: featured
                .playlists
                .items
                .into_iter()
                .map(playlist_result)
                .collect(),
        })
    }

    async fn fetch_playlists_for_categories(
        &self,
        country_code: &str,
        language_code: &str,
    ) -> FetchedResource<Vec<PlaylistsForCategory>> {
        let locale = format!("{language_code}_{country_code}");
        crate::log_fetch_request!("categories", locale = %locale);
        let result = self
            .client
            .categories_manual(
                Some(locale.as_str()),
                market_for(country_code),
                Some(self.page_size),
                None,
            )
            .await;
        let categories = match fetched("categories", result) {
            FetchedResource::Success { data } => data.items,
            FetchedResource::Failure { cause } => return FetchedResource::failure(cause),
        };

        let per_category = join_all(
            categories
                .into_iter()
                .map(|category| self.playlists_for_category(category, country_code)),
        )
        .await;
        FetchedResource::success(per_category.into_iter().flatten().collect())
    }
}

#[async_trait]
impl TracksRepository for CatalogClient {
    async fn fetch_top_tracks_for_artist(
        &self,
        artist_id: &str,
        country_code: &str,
    ) -> FetchedResource<Vec<TrackSearchResult>> {
        let id = match ArtistId::from_id(artist_id) {
            Ok(id) => id,
            Err(e) => {
                tracing::warn!(artist_id, error = %e, "Invalid artist id");
                return FetchedResource::failure(ErrorCause::InvalidRequest);
            }
        };
        crate::log_fetch_request!("artist_top_tracks", artist_id = artist_id);
        let result = self
            .client
            .artist_top_tracks(id, market_for(country_code))
            .await;
        fetched("artist_top_tracks", result)
            .map(|tracks| tracks.into_iter().map(track_result).collect())
    }
}

impl AlbumsRepository for CatalogClient {
    fn artist_albums_transport(&self) -> Arc<dyn PageTransport<AlbumSearchResult>> {
        Arc::new(ArtistAlbumsPager {
            client: self.client.clone(),
            page_size: self.page_size,
        })
    }
}

#[async_trait]
impl SearchRepository for CatalogClient {
    async fn fetch_search_results(
        &self,
        query: &str,
        country_code: &str,
    ) -> FetchedResource<SearchResults> {
        let first_page = PageQuery::new(query, country_code);
        let (album_pager, artist_pager, track_pager) = (
            self.pager::<AlbumSearchResult>(),
            self.pager::<ArtistSearchResult>(),
            self.pager::<TrackSearchResult>(),
        );
        let (playlist_pager, podcast_pager, episode_pager) = (
            self.pager::<PlaylistSearchResult>(),
            self.pager::<PodcastSearchResult>(),
            self.pager::<EpisodeSearchResult>(),
        );

        // All variants in parallel, same as the sidebar search
        let (albums, artists, tracks, playlists, podcasts, episodes) = futures::join!(
            album_pager.search(&first_page),
            artist_pager.search(&first_page),
            track_pager.search(&first_page),
            playlist_pager.search(&first_page),
            podcast_pager.search(&first_page),
            episode_pager.search(&first_page),
        );

        let combined = combine_first_pages(albums, artists, tracks, playlists, podcasts, episodes);
        let combined = FetchedResource::from(combined).map_err(ErrorCause::from);
        if let FetchedResource::Success { data } = &combined {
            tracing::info!(
                query,
                albums = data.albums.len(),
                artists = data.artists.len(),
                tracks = data.tracks.len(),
                playlists = data.playlists.len(),
                podcasts = data.podcasts.len(),
                episodes = data.episodes.len(),
                "Search completed successfully"
            );
        }
        combined
    }

    fn search_transports(&self) -> SearchTransports {
        SearchTransports {
            albums: self.pager::<AlbumSearchResult>(),
            artists: self.pager::<ArtistSearchResult>(),
            tracks: self.pager::<TrackSearchResult>(),
            playlists: self.pager::<PlaylistSearchResult>(),
            podcasts: self.pager::<PodcastSearchResult>(),
            episodes: self.pager::<EpisodeSearchResult>(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rspotify_page<T: DeserializeOwned>(
        items: Vec<T>,
        offset: u32,
        total: u32,
        next: bool,
    ) -> spotify::Page<T> {
        spotify::Page {
            href: String::new(),
            limit: items.len() as u32,
            next: next.then(|| "https://api.spotify.com/next".to_string()),
            offset,
            previous: None,
            total,
            items,
        }
    }

    #[test]
    fn cursor_advances_past_delivered_items() {
        let page = convert_page(rspotify_page(vec![1, 2, 3], 20, 40, true), |n: u32| n * 2);
        assert_eq!(page.items, vec![2, 4, 6]);
        assert_eq!(page.next_cursor, Some(PageCursor::at(23)));
        assert_eq!(page.total, Some(40));
    }

    #[test]
    fn last_page_has_no_cursor() {
        let page = convert_page(rspotify_page(vec![1], 39, 40, false), |n: u32| n);
        assert_eq!(page.next_cursor, None);
    }

    #[test]
    fn known_country_codes_become_markets() {
        assert!(matches!(market_for("gb"), Some(Market::Country(_))));
        assert!(market_for("not-a-country").is_none());
    }

    #[test]
    fn wrong_variant_is_rejected() {
        let result = spotify::SearchResult::Albums(rspotify_page(Vec::new(), 0, 0, false));
        assert!(TrackSearchResult::page_of(result).is_none());
    }
}
