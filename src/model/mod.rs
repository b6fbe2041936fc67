//! Model module - catalog data types and the client that fetches them
//!
//! Organized into submodules by responsibility:
//!
//! - `types`: Screen state and paging types
//! - `content`: Catalog results and home feed carousels
//! - `error`: Error taxonomy and HTTP status classification
//! - `fetched`: Success/failure value returned by every catalog fetch
//! - `catalog_client`: rspotify-backed repositories and page transports

mod types;
mod content;
mod error;
mod fetched;
mod catalog_client;

// Re-export all public types for convenient access
pub use types::{
    Page, PageCursor, PageQuery, ScreenState, SearchResultKind,
};

pub use content::{
    AlbumSearchResult, ArtistSearchResult, CarouselItem, EpisodeSearchResult, FeaturedPlaylists,
    HomeFeedCarousel, PlaylistSearchResult, PlaylistsForCategory, PodcastSearchResult,
    SearchResult, SearchResults, TrackSearchResult,
};

pub use error::{classify, ErrorCause, StatusInfo};

pub use fetched::FetchedResource;

pub use catalog_client::{market_for, ArtistAlbumsPager, CatalogClient, SearchPager, SearchVariant};
