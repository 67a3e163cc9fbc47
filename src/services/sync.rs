use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::ledger::ChangeLedger;
use crate::playlist::{PlaylistRewriter, scan_playlists};
use crate::ports::plex::PlexClient;
use crate::services::plex::PlexPlaylistResolver;

#[derive(Debug, Clone)]
pub struct PlaylistSyncOptions {
    /// When false the lifecycle hooks ignore every event.
    pub auto: bool,
    pub playlist_dir: PathBuf,
    /// `None` resolves relative entries against each playlist's own directory.
    pub relative_to: Option<PathBuf>,
    pub forward_slash: bool,
}

impl PlaylistSyncOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            auto: config.playlist.auto,
            playlist_dir: config.playlist_dir_path(),
            relative_to: config.relative_base(),
            forward_slash: config.playlist.forward_slash,
        }
    }

    fn base_dir_for(&self, playlist: &Path) -> PathBuf {
        match &self.relative_to {
            Some(base) => base.clone(),
            None => playlist
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from(".")),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub playlists_checked: usize,
    pub playlists_updated: usize,
    pub changes: usize,
    pub deletions: usize,
    pub failures: Vec<PathBuf>,
}

/// Collects library moves and removals during a run and applies them to the
/// playlist directory when the run ends.
pub struct PlaylistSync {
    options: PlaylistSyncOptions,
    ledger: ChangeLedger,
}

impl PlaylistSync {
    pub fn new(options: PlaylistSyncOptions) -> Self {
        Self {
            options,
            ledger: ChangeLedger::new(),
        }
    }

    pub fn ledger(&self) -> &ChangeLedger {
        &self.ledger
    }

    pub fn on_item_moved(&mut self, source: impl AsRef<Path>, destination: impl AsRef<Path>) {
        if !self.options.auto {
            return;
        }
        self.ledger.record_move(source, destination);
    }

    pub fn on_item_removed(&mut self, path: impl AsRef<Path>) {
        if !self.options.auto {
            return;
        }
        self.ledger.record_removal(path);
    }

    /// Rewrite every playlist affected by the recorded changes.
    ///
    /// A playlist that fails to update is logged and skipped.
    pub fn on_run_end(self) -> RunSummary {
        if self.ledger.is_empty() {
            tracing::debug!("No library changes recorded, playlists left as-is");
            return RunSummary::default();
        }

        self.rewrite_playlists(&scan_playlists(&self.options.playlist_dir))
    }

    fn rewrite_playlists(&self, playlists: impl IntoIterator<Item = PathBuf>) -> RunSummary {
        let mut summary = RunSummary::default();
        let rewriter = PlaylistRewriter::new(&self.ledger, self.options.forward_slash);
        for playlist in playlists {
            summary.playlists_checked += 1;
            let base_dir = self.options.base_dir_for(&playlist);

            match rewriter.rewrite(&playlist, &base_dir) {
                Ok(outcome) => {
                    if outcome.is_modified() {
                        summary.playlists_updated += 1;
                    }
                    summary.changes += outcome.changes;
                    summary.deletions += outcome.deletions;
                }
                Err(e) => {
                    tracing::error!("Failed to update playlist {}: {}", playlist.display(), e);
                    summary.failures.push(playlist);
                }
            }
        }

        tracing::info!(
            "Checked {} playlists, updated {} ({} entries changed, {} removed)",
            summary.playlists_checked,
            summary.playlists_updated,
            summary.changes,
            summary.deletions
        );
        summary
    }
}

/// Ask Plex to rescan the configured library after playlists changed.
///
/// Any failure is logged and swallowed; an unreachable server must not fail
/// the run.
pub async fn refresh_remote_library<C: PlexClient>(
    resolver: &PlexPlaylistResolver<C>,
    library_name: &str,
) {
    let result = async {
        let key = resolver.library_section_key(library_name).await?;
        resolver.refresh_library(&key).await
    }
    .await;

    match result {
        Ok(()) => tracing::info!("Requested refresh of Plex library '{}'", library_name),
        Err(e) => tracing::warn!(
            kind = %e.kind(),
            "Failed to refresh Plex library '{}': {}",
            library_name,
            e
        ),
    }
}
