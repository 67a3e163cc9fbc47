use std::path::{Path, PathBuf};

use walkdir::WalkDir;

pub const PLAYLIST_EXTENSIONS: &[&str] = &["m3u", "m3u8"];

/// The playlist files directly inside a directory.
///
/// Each call to [`PlaylistFiles::iter`] reads the directory again, so the
/// sequence can be walked any number of times.
#[derive(Debug, Clone)]
pub struct PlaylistFiles {
    directory: PathBuf,
}

impl PlaylistFiles {
    pub fn iter(&self) -> PlaylistFilesIter<'_> {
        PlaylistFilesIter {
            directory: &self.directory,
            entries: None,
        }
    }
}

impl<'a> IntoIterator for &'a PlaylistFiles {
    type Item = PathBuf;
    type IntoIter = PlaylistFilesIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over [`PlaylistFiles`]; the directory is read on first poll.
pub struct PlaylistFilesIter<'a> {
    directory: &'a Path,
    entries: Option<std::vec::IntoIter<PathBuf>>,
}

impl PlaylistFilesIter<'_> {
    fn read(&self) -> Vec<PathBuf> {
        let mut found = Vec::new();
        for entry in WalkDir::new(self.directory)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            match entry {
                Ok(entry) => {
                    if entry.path().is_file() && is_playlist(entry.path()) {
                        found.push(entry.into_path());
                    }
                }
                Err(e) => {
                    tracing::warn!(
                        "Unable to read playlist directory {}: {}",
                        self.directory.display(),
                        e
                    );
                    return Vec::new();
                }
            }
        }
        found
    }
}

impl Iterator for PlaylistFilesIter<'_> {
    type Item = PathBuf;

    fn next(&mut self) -> Option<Self::Item> {
        if self.entries.is_none() {
            self.entries = Some(self.read().into_iter());
        }
        self.entries.as_mut().and_then(Iterator::next)
    }
}

/// Enumerate `.m3u`/`.m3u8` files in `directory`, case-insensitively.
///
/// Nothing is read until iteration starts. An unreadable directory yields
/// nothing and logs a warning.
pub fn scan_playlists(directory: impl Into<PathBuf>) -> PlaylistFiles {
    PlaylistFiles {
        directory: directory.into(),
    }
}

pub fn is_playlist(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            PLAYLIST_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
        .unwrap_or(false)
}
