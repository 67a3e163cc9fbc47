use serde::Deserialize;
use url::Url;

pub mod library;
pub mod library_refresh;
pub mod playlist;

/* ---------- Shared container ---------- */

/// A minimal Plex JSON envelope for list style endpoints that return `MediaContainer.Metadata`.
///
/// Notes
/// - Plex responses are wrapped in a top level `MediaContainer`.
/// - `metadata` defaults to an empty vec when missing, which Plex does for empty lists.
#[derive(Debug, Clone, Deserialize)]
pub struct PlexResponse<T> {
    #[serde(rename = "MediaContainer")]
    pub media_container: PlexMediaContainer<T>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlexMediaContainer<T> {
    #[serde(rename = "Metadata", default = "Vec::new")]
    pub metadata: Vec<T>,
}

fn get_protocol(secure: bool) -> &'static str {
    if secure { "https" } else { "http" }
}

/// Base URL for a Plex Media Server, e.g. `http://127.0.0.1:32400/`.
pub fn server_url(host: &str, port: u16, secure: bool) -> color_eyre::Result<Url> {
    let url = Url::parse(&format!("{}://{}:{}/", get_protocol(secure), host, port))?;
    Ok(url)
}
