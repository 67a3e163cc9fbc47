use color_eyre::eyre::Result;

use crate::plex_rs::library::PlexLibrarySection;
use crate::plex_rs::playlist::PlexPlaylist;

/// Port trait wrapping the Plex API capabilities used by playlist resolution.
///
/// The connection (server URL and token) is fixed when the implementation is
/// built. Implementations live in `services::plex::client` (production) or
/// test mocks.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait PlexClient: Send + Sync {
    async fn get_library_sections(&self) -> Result<Vec<PlexLibrarySection>>;

    async fn get_playlists(&self) -> Result<Vec<PlexPlaylist>>;

    async fn get_section_playlists(&self, section_id: &str) -> Result<Vec<PlexPlaylist>>;

    /// Raw `/playlists/{id}/items` body, unvalidated.
    async fn get_playlist_items(&self, playlist_id: &str) -> Result<serde_json::Value>;

    async fn refresh_library_section(&self, section_id: &str) -> Result<()>;
}
