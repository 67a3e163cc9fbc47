pub mod client;
pub mod schema;

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::error::{PlaylistError, PlaylistResult};
use crate::paths::translate;
use crate::plex_rs::library::find_section_by_title;
use crate::plex_rs::playlist::{PlexPlaylist, is_music_playlist};
use crate::ports::plex::PlexClient;

/// Local paths of a resolved playlist: no duplicates, first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedPathSet {
    paths: Vec<PathBuf>,
}

impl ResolvedPathSet {
    pub fn from_paths<I, P>(paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for path in paths {
            let path = path.into();
            if seen.insert(path.as_os_str().to_owned()) {
                out.push(path);
            }
        }
        Self { paths: out }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Path> {
        self.paths.iter().map(PathBuf::as_path)
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn into_paths(self) -> Vec<PathBuf> {
        self.paths
    }
}

/// Resolves Plex playlists into local file paths.
///
/// `remote_root` is the library root as the Plex server sees it and
/// `local_root` the same directory on this machine.
pub struct PlexPlaylistResolver<C: PlexClient> {
    client: C,
    remote_root: String,
    local_root: String,
}

impl<C: PlexClient> PlexPlaylistResolver<C> {
    pub fn new(client: C, remote_root: impl Into<String>, local_root: impl Into<String>) -> Self {
        Self {
            client,
            remote_root: remote_root.into(),
            local_root: local_root.into(),
        }
    }

    /// Look up the key of the library section titled `library_name`.
    pub async fn library_section_key(&self, library_name: &str) -> PlaylistResult<String> {
        let sections = self.client.get_library_sections().await.map_err(|e| {
            PlaylistError::unhandled(
                format!(
                    "An unexpected error occurred attempting to access Plex library '{}'",
                    library_name
                ),
                e,
            )
        })?;

        let section = find_section_by_title(&sections, library_name).ok_or_else(|| {
            PlaylistError::not_found(format!("Library '{}' not found.", library_name))
        })?;

        if section.key.parse::<u64>().is_err() {
            return Err(PlaylistError::validation(format!(
                "Library '{}' section.key '{}' is invalid.",
                library_name, section.key
            )));
        }

        Ok(section.key.clone())
    }

    /// Audio playlists, optionally limited to one library section, sorted by title.
    pub async fn list_playlists(
        &self,
        section_key: Option<&str>,
    ) -> PlaylistResult<Vec<PlexPlaylist>> {
        let playlists = match section_key {
            Some(key) => self.client.get_section_playlists(key).await,
            None => self.client.get_playlists().await,
        }
        .map_err(|e| {
            PlaylistError::unhandled(
                "An unexpected error occurred attempting to retrieve Playlists",
                e,
            )
        })?;

        let mut playlists: Vec<PlexPlaylist> =
            playlists.into_iter().filter(is_music_playlist).collect();
        playlists.sort_by_key(|p| p.title.to_lowercase());
        Ok(playlists)
    }

    async fn find_playlist(&self, playlist_name: &str) -> PlaylistResult<PlexPlaylist> {
        let playlists = self.client.get_playlists().await.map_err(|e| {
            PlaylistError::unhandled(
                format!(
                    "An unexpected error occurred attempting to access Playlist '{}'",
                    playlist_name
                ),
                e,
            )
        })?;

        playlists
            .into_iter()
            .find(|p| p.title == playlist_name)
            .ok_or_else(|| {
                PlaylistError::not_found(format!("Playlist '{}' not found.", playlist_name))
            })
    }

    /// Resolve `playlist_name` into the local paths of its tracks.
    ///
    /// With `section_key`, tracks from other library sections are skipped.
    pub async fn resolve(
        &self,
        playlist_name: &str,
        section_key: Option<&str>,
    ) -> PlaylistResult<ResolvedPathSet> {
        let playlist = self.find_playlist(playlist_name).await?;

        let response = self
            .client
            .get_playlist_items(&playlist.rating_key)
            .await
            .map_err(|e| {
                PlaylistError::unhandled(
                    format!(
                        "An unexpected error occurred attempting to access Items in Playlist '{}'",
                        playlist_name
                    ),
                    e,
                )
            })?;

        let items = schema::playlist_items(&response, playlist_name)?;

        let mut remote_paths = Vec::new();
        for (index, item) in items.iter().enumerate() {
            if let Some(key) = section_key {
                let section_id = schema::section_id(item, index, playlist_name)?;
                if section_id.as_deref() != Some(key) {
                    tracing::debug!(
                        "Skipping item[{}] of playlist '{}': section {:?} is not {}",
                        index,
                        playlist_name,
                        section_id,
                        key
                    );
                    continue;
                }
            }
            let track = schema::track(item, index, playlist_name)?;
            remote_paths.extend(schema::part_files(&track)?);
        }

        let resolved = ResolvedPathSet::from_paths(
            remote_paths
                .into_iter()
                .map(|path| translate(path, &self.remote_root, &self.local_root)),
        );

        tracing::info!(
            "Resolved playlist '{}' to {} paths",
            playlist_name,
            resolved.len()
        );
        Ok(resolved)
    }

    /// Ask the server to rescan a library section.
    pub async fn refresh_library(&self, section_key: &str) -> PlaylistResult<()> {
        self.client
            .refresh_library_section(section_key)
            .await
            .map_err(|e| {
                PlaylistError::unhandled(
                    format!("Failed to refresh Plex library section '{}'", section_key),
                    e,
                )
            })
    }
}
