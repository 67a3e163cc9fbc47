use color_eyre::eyre::{Result, WrapErr};
use reqwest::Client;
use serde::Deserialize;
use url::Url;

/* ---------- Library sections ---------- */

/// Response type for `/library/sections`.
#[derive(Debug, Deserialize)]
pub struct PlexLibrarySectionsResponse {
    #[serde(rename = "MediaContainer")]
    pub media_container: PlexLibrarySectionsContainer,
}

/// `MediaContainer` for `/library/sections` which returns a `Directory` list.
#[derive(Debug, Deserialize)]
pub struct PlexLibrarySectionsContainer {
    #[serde(rename = "Directory", default)]
    pub directories: Vec<PlexLibrarySection>,
}

/// A Plex library section.
///
/// Notes
/// - `key` is the library section id, matched against a track's `librarySectionID`.
/// - `section_type` is commonly `movie`, `show`, or for music libraries `artist`.
#[derive(Debug, Clone, Deserialize)]
pub struct PlexLibrarySection {
    pub key: String,
    pub title: String,
    #[serde(rename = "type")]
    pub section_type: String,
}

/// Fetch all Plex library sections.
///
/// Endpoint
/// - `GET /library/sections`
pub async fn get_library_sections(
    client: &Client,
    base_url: &Url,
    user_token: &str,
) -> Result<Vec<PlexLibrarySection>> {
    let url = base_url.join("library/sections")?;

    let res = client
        .get(url)
        .header("Accept", "application/json")
        .header("X-Plex-Token", user_token)
        .send()
        .await?
        .error_for_status()?
        .json::<PlexLibrarySectionsResponse>()
        .await
        .wrap_err("Failed to deserialize library sections")?;

    Ok(res.media_container.directories)
}

pub fn find_section_by_title<'a>(
    sections: &'a [PlexLibrarySection],
    title: &str,
) -> Option<&'a PlexLibrarySection> {
    sections.iter().find(|s| s.title == title)
}
