//! Catalog results and the home feed projections built from them

/// An album from search results, new releases or an artist's discography
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AlbumSearchResult {
    pub id: String,
    pub name: String,
    pub artists_string: String,
    pub album_art_url: String,
    /// Release date as reported by the catalog, e.g. "1997-05-21" or "1997"
    pub year_of_release: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArtistSearchResult {
    pub id: String,
    pub name: String,
    pub image_url: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TrackSearchResult {
    pub id: String,
    pub name: String,
    pub artists_string: String,
    pub image_url: Option<String>,
    pub preview_url: Option<String>,
    pub duration_ms: u32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlaylistSearchResult {
    pub id: String,
    pub name: String,
    pub owner_name: String,
    pub total_number_of_tracks: u32,
    pub image_url: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PodcastSearchResult {
    pub id: String,
    pub name: String,
    pub publisher: String,
    pub image_url: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EpisodeSearchResult {
    pub id: String,
    pub name: String,
    pub release_date: String,
    pub duration_ms: u32,
    pub image_url: Option<String>,
}

/// Any single catalog result
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SearchResult {
    Album(AlbumSearchResult),
    Artist(ArtistSearchResult),
    Track(TrackSearchResult),
    Playlist(PlaylistSearchResult),
    Podcast(PodcastSearchResult),
    Episode(EpisodeSearchResult),
}

impl SearchResult {
    pub fn id(&self) -> &str {
        match self {
            SearchResult::Album(r) => &r.id,
            SearchResult::Artist(r) => &r.id,
            SearchResult::Track(r) => &r.id,
            SearchResult::Playlist(r) => &r.id,
            SearchResult::Podcast(r) => &r.id,
            SearchResult::Episode(r) => &r.id,
        }
    }
}

/// First page of every variant for one query
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SearchResults {
    pub albums: Vec<AlbumSearchResult>,
    pub artists: Vec<ArtistSearchResult>,
    pub tracks: Vec<TrackSearchResult>,
    pub playlists: Vec<PlaylistSearchResult>,
    pub podcasts: Vec<PodcastSearchResult>,
    pub episodes: Vec<EpisodeSearchResult>,
}

impl SearchResults {
    pub fn is_empty(&self) -> bool {
        self.albums.is_empty()
            && self.artists.is_empty()
            && self.tracks.is_empty()
            && self.playlists.is_empty()
            && self.podcasts.is_empty()
            && self.episodes.is_empty()
    }
}

/// Featured playlists together with the catalog's headline for them
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FeaturedPlaylists {
    pub message: String,
    pub playlists: Vec<PlaylistSearchResult>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlaylistsForCategory {
    pub category_id: String,
    pub name_of_category: String,
    pub associated_playlists: Vec<PlaylistSearchResult>,
}

/// A single card in a home feed carousel
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CarouselItem {
    pub id: String,
    pub image_url: String,
    pub caption: String,
    pub source: SearchResult,
}

impl CarouselItem {
    /// Build a card from an album or playlist result.
    ///
    /// # Panics
    ///
    /// Panics for any other variant. Carousels only ever hold albums and
    /// playlists, so anything else is a bug in the caller.
    pub fn from_search_result(result: SearchResult) -> Self {
        let (image_url, caption) = match &result {
            SearchResult::Album(album) => (album.album_art_url.clone(), album.name.clone()),
            SearchResult::Playlist(playlist) => (
                playlist.image_url.clone().unwrap_or_default(),
                playlist.name.clone(),
            ),
            other => panic!(
                "carousel items can only be built from albums and playlists, got {:?}",
                other
            ),
        };
        Self {
            id: result.id().to_string(),
            image_url,
            caption,
            source: result,
        }
    }
}

/// A named, ordered group of cards on the home feed
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HomeFeedCarousel {
    pub id: String,
    pub title: String,
    pub items: Vec<CarouselItem>,
}

impl HomeFeedCarousel {
    pub fn from_results(title: &str, results: impl IntoIterator<Item = SearchResult>) -> Self {
        Self {
            id: title.to_string(),
            title: title.to_string(),
            items: results
                .into_iter()
                .map(CarouselItem::from_search_result)
                .collect(),
        }
    }
}

impl From<PlaylistsForCategory> for HomeFeedCarousel {
    fn from(category: PlaylistsForCategory) -> Self {
        Self {
            id: category.category_id,
            title: category.name_of_category,
            items: category
                .associated_playlists
                .into_iter()
                .map(|p| CarouselItem::from_search_result(SearchResult::Playlist(p)))
                .collect(),
        }
    }
}
