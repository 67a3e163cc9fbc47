use color_eyre::eyre::{Result, WrapErr};
use reqwest::Client;
use serde::Deserialize;
use url::Url;

use crate::plex_rs::PlexResponse;

/* ---------- Playlists ---------- */

#[derive(Debug, Clone, Deserialize)]
pub struct PlexPlaylist {
    #[serde(rename = "ratingKey")]
    pub rating_key: String,

    pub title: String,

    #[serde(rename = "playlistType")]
    pub playlist_type: String,

    #[serde(rename = "leafCount", default)]
    pub leaf_count: Option<u32>,
}

async fn fetch_playlists(
    client: &Client,
    url: Url,
    user_token: &str,
) -> Result<Vec<PlexPlaylist>> {
    let res = client
        .get(url)
        .header("Accept", "application/json")
        .header("X-Plex-Token", user_token)
        .send()
        .await?
        .error_for_status()?
        .json::<PlexResponse<PlexPlaylist>>()
        .await
        .wrap_err("Failed to deserialize Plex playlists response")?;

    Ok(res.media_container.metadata)
}

/// Fetch all audio playlists on the server.
///
/// Endpoint
/// - `GET /playlists?playlistType=audio`
pub async fn get_playlists(
    client: &Client,
    base_url: &Url,
    user_token: &str,
) -> Result<Vec<PlexPlaylist>> {
    let mut url = base_url.join("playlists")?;
    url.query_pairs_mut().append_pair("playlistType", "audio");

    fetch_playlists(client, url, user_token).await
}

/// Fetch the audio playlists associated with one library section.
///
/// Endpoint
/// - `GET /playlists?playlistType=audio&sectionID={id}`
pub async fn get_section_playlists(
    client: &Client,
    base_url: &Url,
    user_token: &str,
    section_id: &str,
) -> Result<Vec<PlexPlaylist>> {
    let mut url = base_url.join("playlists")?;
    url.query_pairs_mut()
        .append_pair("playlistType", "audio")
        .append_pair("sectionID", section_id);

    fetch_playlists(client, url, user_token).await
}

/* ---------- Playlist items ---------- */

/// Fetch the raw items response of a playlist.
///
/// The body is returned undecoded because item shapes vary between server
/// versions; callers validate it field by field.
///
/// Endpoint
/// - `GET /playlists/{ratingKey}/items`
pub async fn get_playlist_items(
    client: &Client,
    base_url: &Url,
    user_token: &str,
    playlist_id: &str,
) -> Result<serde_json::Value> {
    let url = base_url.join(&format!("playlists/{}/items", playlist_id))?;

    let res = client
        .get(url)
        .header("Accept", "application/json")
        .header("X-Plex-Token", user_token)
        .send()
        .await?
        .error_for_status()?
        .json::<serde_json::Value>()
        .await
        .wrap_err("Failed to deserialize playlist items response")?;

    Ok(res)
}

pub fn is_music_playlist(p: &PlexPlaylist) -> bool {
    p.playlist_type == "audio"
}
