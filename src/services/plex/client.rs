use std::time::Duration;

use color_eyre::eyre::{Result, WrapErr};
use reqwest::Client;
use url::Url;

use crate::config::PlexConfig;
use crate::plex_rs::library::{PlexLibrarySection, get_library_sections};
use crate::plex_rs::library_refresh::refresh_library_section;
use crate::plex_rs::playlist::{
    PlexPlaylist, get_playlist_items, get_playlists, get_section_playlists,
};
use crate::plex_rs::server_url;
use crate::ports::plex::PlexClient;

/// Requests that take longer than this fail instead of hanging.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

pub struct PlexHttpAdapter {
    client: Client,
    server_url: Url,
    token: String,
}

impl PlexHttpAdapter {
    /// Build an adapter for `http(s)://host:port/` authenticated with `token`.
    ///
    /// No request is made here; an unreachable server surfaces on first use.
    pub fn connect(host: &str, port: u16, token: &str, secure: bool) -> Result<Self> {
        let server_url = server_url(host, port, secure)
            .wrap_err_with(|| format!("Invalid Plex server address '{}:{}'", host, port))?;
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .wrap_err("Failed to build HTTP client")?;

        Ok(Self {
            client,
            server_url,
            token: token.to_string(),
        })
    }

    pub fn from_config(config: &PlexConfig) -> Result<Self> {
        Self::connect(&config.host, config.port, &config.token, config.secure)
    }

    pub fn server_url(&self) -> &Url {
        &self.server_url
    }
}

#[async_trait::async_trait]
impl PlexClient for PlexHttpAdapter {
    async fn get_library_sections(&self) -> Result<Vec<PlexLibrarySection>> {
        get_library_sections(&self.client, &self.server_url, &self.token).await
    }

    async fn get_playlists(&self) -> Result<Vec<PlexPlaylist>> {
        get_playlists(&self.client, &self.server_url, &self.token).await
    }

    async fn get_section_playlists(&self, section_id: &str) -> Result<Vec<PlexPlaylist>> {
        get_section_playlists(&self.client, &self.server_url, &self.token, section_id).await
    }

    async fn get_playlist_items(&self, playlist_id: &str) -> Result<serde_json::Value> {
        get_playlist_items(&self.client, &self.server_url, &self.token, playlist_id).await
    }

    async fn refresh_library_section(&self, section_id: &str) -> Result<()> {
        refresh_library_section(&self.client, &self.server_url, &self.token, section_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connect_builds_url() {
        let adapter = PlexHttpAdapter::connect("127.0.0.1", 32400, "token", false).unwrap();
        assert_eq!(adapter.server_url().as_str(), "http://127.0.0.1:32400/");
    }

    #[test]
    fn test_connect_rejects_invalid_host() {
        let err = PlexHttpAdapter::connect("not a host", 32400, "token", true)
            .err()
            .unwrap();
        assert!(err.to_string().contains("Invalid Plex server address"));
    }
}
