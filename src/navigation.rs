//! Navigation destinations and the routes that open them
//!
//! Image URLs travel as `application/x-www-form-urlencoded` strings so they
//! survive being embedded in a route.

use url::form_urlencoded::byte_serialize;

use crate::model::{AlbumSearchResult, ArtistSearchResult, PlaylistSearchResult};

const PREFIX: &str = "MusifyNavigationDestinations";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Destination {
    Home,
    Search,
    ArtistDetail,
    AlbumDetail,
    PlaylistDetail,
    PodcastEpisodeDetail,
    PodcastShowDetail,
}

impl Destination {
    /// Route pattern with `{placeholder}` arguments
    pub fn template(self) -> &'static str {
        match self {
            Destination::Home => "MusifyNavigationDestinations.HomeScreen",
            Destination::Search => "MusifyNavigationDestinations.SearchScreen",
            Destination::ArtistDetail => {
                "MusifyNavigationDestinations.ArtistDetailScreen/{artistId}/{artistName}?encodedUrlString={encodedImageUrlString}"
            }
            Destination::AlbumDetail => {
                "MusifyNavigationDestinations.AlbumDetailScreen/{albumId}/{albumName}/{artistsString}/{yearOfReleaseString}/{encodedImageUrlString}"
            }
            Destination::PlaylistDetail => {
                "MusifyNavigationDestinations.PlaylistDetailScreen/{playlistId}/{playlistName}/{ownerName}/{numberOfTracks}?encodedImageUrlString={encodedImageUrlString}"
            }
            Destination::PodcastEpisodeDetail => {
                "MusifyNavigationDestinations.PodcastEpisodeDetailScreen/{episodeId}"
            }
            Destination::PodcastShowDetail => {
                "MusifyNavigationDestinations.PodcastShowDetailScreen/{showId}"
            }
        }
    }
}

pub fn encode_image_url(url: &str) -> String {
    byte_serialize(url.as_bytes()).collect()
}

pub fn artist_detail_route(artist: &ArtistSearchResult) -> String {
    let route = format!("{PREFIX}.ArtistDetailScreen/{}/{}", artist.id, artist.name);
    match &artist.image_url {
        Some(url) => format!("{route}?encodedUrlString={}", encode_image_url(url)),
        None => route,
    }
}

pub fn album_detail_route(album: &AlbumSearchResult) -> String {
    let year = album
        .year_of_release
        .split('-')
        .next()
        .unwrap_or_default();
    format!(
        "{PREFIX}.AlbumDetailScreen/{}/{}/{}/{}/{}",
        album.id,
        album.name,
        album.artists_string,
        year,
        encode_image_url(&album.album_art_url)
    )
}

pub fn playlist_detail_route(playlist: &PlaylistSearchResult) -> String {
    let route = format!(
        "{PREFIX}.PlaylistDetailScreen/{}/{}/{}/{}",
        playlist.id, playlist.name, playlist.owner_name, playlist.total_number_of_tracks
    );
    match &playlist.image_url {
        Some(url) => format!("{route}?encodedImageUrlString={}", encode_image_url(url)),
        None => route,
    }
}

pub fn podcast_episode_route(episode_id: &str) -> String {
    format!("{PREFIX}.PodcastEpisodeDetailScreen/{episode_id}")
}

pub fn podcast_show_route(show_id: &str) -> String {
    format!("{PREFIX}.PodcastShowDetailScreen/{show_id}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{album, playlist};

    #[test]
    fn image_urls_are_form_encoded() {
        assert_eq!(
            encode_image_url("https://i.scdn.co/image/ab 67?x=1&y=2"),
            "https%3A%2F%2Fi.scdn.co%2Fimage%2Fab+67%3Fx%3D1%26y%3D2"
        );
    }

    #[test]
    fn artist_route_omits_missing_image() {
        let mut artist = ArtistSearchResult {
            id: "4Z8W4fKeB5YxbusRsdQVPb".into(),
            name: "Radiohead".into(),
            image_url: None,
        };
        assert_eq!(
            artist_detail_route(&artist),
            "MusifyNavigationDestinations.ArtistDetailScreen/4Z8W4fKeB5YxbusRsdQVPb/Radiohead"
        );

        artist.image_url = Some("https://img/a.jpg".into());
        assert_eq!(
            artist_detail_route(&artist),
            "MusifyNavigationDestinations.ArtistDetailScreen/4Z8W4fKeB5YxbusRsdQVPb/Radiohead\
             ?encodedUrlString=https%3A%2F%2Fimg%2Fa.jpg"
        );
    }

    #[test]
    fn album_route_uses_release_year() {
        let mut album = album("a1");
        album.name = "OK Computer".into();
        album.artists_string = "Radiohead".into();
        album.year_of_release = "1997-05-21".into();
        album.album_art_url = "https://img/ok.jpg".into();

        assert_eq!(
            album_detail_route(&album),
            "MusifyNavigationDestinations.AlbumDetailScreen/a1/OK Computer/Radiohead/1997/https%3A%2F%2Fimg%2Fok.jpg"
        );
    }

    #[test]
    fn playlist_route_carries_track_count() {
        let mut playlist = playlist("p1");
        playlist.name = "Chill".into();
        playlist.owner_name = "musify".into();
        playlist.total_number_of_tracks = 42;
        playlist.image_url = None;

        assert_eq!(
            playlist_detail_route(&playlist),
            "MusifyNavigationDestinations.PlaylistDetailScreen/p1/Chill/musify/42"
        );
    }

    #[test]
    fn podcast_routes_fill_their_templates() {
        assert_eq!(
            podcast_episode_route("e1"),
            Destination::PodcastEpisodeDetail.template().replace("{episodeId}", "e1")
        );
        assert_eq!(
            podcast_show_route("s1"),
            Destination::PodcastShowDetail.template().replace("{showId}", "s1")
        );
        assert!(Destination::Home.template().starts_with(PREFIX));
    }
}
