//! Core type definitions shared by controllers and the paging layer

use super::error::ErrorCause;

/// UI-facing state of one screen
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ScreenState {
    Idle,
    Loading,
    /// `message` is fixed per screen and safe to show; `cause` is there for
    /// richer messaging if the UI wants it.
    Error {
        message: &'static str,
        cause: ErrorCause,
    },
}

impl ScreenState {
    pub fn is_error(&self) -> bool {
        matches!(self, ScreenState::Error { .. })
    }
}

/// Opaque position of the next page of a paged resource
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PageCursor(u32);

impl PageCursor {
    pub(crate) fn at(offset: u32) -> Self {
        Self(offset)
    }

    pub(crate) fn offset(self) -> u32 {
        self.0
    }
}

/// Identifies one page request. Streams hold a template with no cursor and
/// derive a query per page with [`PageQuery::with_cursor`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PageQuery {
    pub search_term: String,
    pub country_code: String,
    pub cursor: Option<PageCursor>,
}

impl PageQuery {
    pub fn new(search_term: impl Into<String>, country_code: impl Into<String>) -> Self {
        Self {
            search_term: search_term.into(),
            country_code: country_code.into(),
            cursor: None,
        }
    }

    pub fn with_cursor(&self, cursor: Option<PageCursor>) -> Self {
        Self {
            cursor,
            ..self.clone()
        }
    }

    pub(crate) fn offset(&self) -> u32 {
        self.cursor.map(PageCursor::offset).unwrap_or(0)
    }
}

/// One page of results
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// `None` on the last page
    pub next_cursor: Option<PageCursor>,
    pub total: Option<u32>,
}

impl<T> Page<T> {
    pub fn last(items: Vec<T>) -> Self {
        Self {
            items,
            next_cursor: None,
            total: None,
        }
    }
}

/// Which search result variant a list screen is showing
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SearchResultKind {
    Album,
    Artist,
    Track,
    Playlist,
    Podcast,
    Episode,
}

impl SearchResultKind {
    pub const ALL: [SearchResultKind; 6] = [
        Self::Album,
        Self::Artist,
        Self::Track,
        Self::Playlist,
        Self::Podcast,
        Self::Episode,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Album => "albums",
            Self::Artist => "artists",
            Self::Track => "tracks",
            Self::Playlist => "playlists",
            Self::Podcast => "podcasts",
            Self::Episode => "episodes",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(name))
    }
}
