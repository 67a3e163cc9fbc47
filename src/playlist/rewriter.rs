use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use tempfile::NamedTempFile;

use crate::error::{PlaylistError, PlaylistResult};
use crate::ledger::{ChangeLedger, LedgerLookup};
use crate::paths::{PathKey, relative_to};
use crate::playlist::{PlaylistLine, bytes_to_path, path_to_bytes, split_terminator};

/// Counts produced by rewriting one playlist.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RewriteOutcome {
    pub changes: usize,
    pub deletions: usize,
}

impl RewriteOutcome {
    pub fn is_modified(&self) -> bool {
        self.changes + self.deletions > 0
    }
}

/// Applies a [`ChangeLedger`] to playlist files.
///
/// Every line is copied to a scratch file next to the playlist. Comment lines
/// and unaffected paths pass through byte for byte; moved paths are replaced
/// and removed paths dropped. The scratch file only replaces the original if
/// something changed.
pub struct PlaylistRewriter<'a> {
    ledger: &'a ChangeLedger,
    forward_slash: bool,
}

impl<'a> PlaylistRewriter<'a> {
    pub fn new(ledger: &'a ChangeLedger, forward_slash: bool) -> Self {
        Self {
            ledger,
            forward_slash,
        }
    }

    /// Rewrite `playlist`, resolving relative entries against `base_dir`.
    pub fn rewrite(&self, playlist: &Path, base_dir: &Path) -> PlaylistResult<RewriteOutcome> {
        tracing::debug!(
            "Rewriting playlist {} relative to {}",
            playlist.display(),
            base_dir.display()
        );

        let source =
            File::open(playlist).map_err(|e| PlaylistError::filesystem("open", playlist, e))?;
        let mut reader = BufReader::new(source);

        let scratch_dir = match playlist.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let scratch = NamedTempFile::new_in(scratch_dir)
            .map_err(|e| PlaylistError::filesystem("create temp file in", scratch_dir, e))?;
        let mut writer = BufWriter::new(scratch);

        let mut outcome = RewriteOutcome::default();
        let mut line = Vec::new();
        loop {
            line.clear();
            let read = reader
                .read_until(b'\n', &mut line)
                .map_err(|e| PlaylistError::filesystem("read", playlist, e))?;
            if read == 0 {
                break;
            }

            if let Some(emitted) = self.process_line(&line, base_dir, &mut outcome) {
                writer
                    .write_all(&emitted)
                    .map_err(|e| PlaylistError::filesystem("write temp file for", playlist, e))?;
            }
        }

        let scratch = writer.into_inner().map_err(|e| {
            PlaylistError::filesystem("flush temp file for", playlist, e.into_error())
        })?;

        if !outcome.is_modified() {
            // Dropping the scratch file deletes it.
            tracing::debug!("Playlist {} unchanged", playlist.display());
            return Ok(outcome);
        }

        let permissions = std::fs::metadata(playlist)
            .map_err(|e| PlaylistError::filesystem("stat", playlist, e))?
            .permissions();
        scratch
            .as_file()
            .set_permissions(permissions)
            .map_err(|e| PlaylistError::filesystem("set permissions for", playlist, e))?;
        scratch
            .persist(playlist)
            .map_err(|e| PlaylistError::filesystem("replace", playlist, e.error))?;

        tracing::info!(
            "Updated playlist {} ({} changed, {} removed)",
            playlist.display(),
            outcome.changes,
            outcome.deletions
        );
        Ok(outcome)
    }

    /// Returns the bytes to emit for `line`, or `None` if it should be dropped.
    fn process_line(
        &self,
        line: &[u8],
        base_dir: &Path,
        outcome: &mut RewriteOutcome,
    ) -> Option<Vec<u8>> {
        let raw = match PlaylistLine::classify(line) {
            PlaylistLine::Comment(raw) => return Some(self.emit(raw.to_vec())),
            PlaylistLine::PathReference(raw) => raw,
        };

        let (original, terminator) = split_terminator(raw);
        let original_path = bytes_to_path(original);
        let is_relative = !original_path.is_absolute();
        let key = if is_relative {
            PathKey::new(base_dir.join(&original_path))
        } else {
            PathKey::new(&original_path)
        };

        match self.ledger.lookup(&key) {
            LedgerLookup::Miss => Some(self.emit(raw.to_vec())),
            LedgerLookup::Tombstone => {
                tracing::debug!("Dropping removed entry {}", original_path.display());
                outcome.deletions += 1;
                None
            }
            LedgerLookup::Moved(destination) => {
                let new_path = if is_relative {
                    relative_to(destination.as_path(), base_dir)
                } else {
                    destination.as_path().to_path_buf()
                };
                tracing::debug!(
                    "Replacing entry {} with {}",
                    original_path.display(),
                    new_path.display()
                );
                outcome.changes += 1;

                let mut bytes = path_to_bytes(&new_path);
                bytes.extend_from_slice(terminator);
                Some(self.emit(bytes))
            }
        }
    }

    fn emit(&self, mut line: Vec<u8>) -> Vec<u8> {
        if self.forward_slash {
            for byte in line.iter_mut().filter(|b| **b == b'\\') {
                *byte = b'/';
            }
        }
        line
    }
}
