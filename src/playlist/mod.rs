pub mod rewriter;
pub mod scanner;

use std::path::{Path, PathBuf};

pub use rewriter::{PlaylistRewriter, RewriteOutcome};
pub use scanner::{PLAYLIST_EXTENSIONS, PlaylistFiles, is_playlist, scan_playlists};

/// A single raw line of a playlist file, terminator included.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaylistLine<'a> {
    /// `#EXTM3U`, `#EXTINF:...`, other directives, and blank lines.
    Comment(&'a [u8]),
    PathReference(&'a [u8]),
}

impl<'a> PlaylistLine<'a> {
    pub fn classify(line: &'a [u8]) -> Self {
        match line.iter().find(|b| !b.is_ascii_whitespace()) {
            Some(b'#') | None => PlaylistLine::Comment(line),
            Some(_) => PlaylistLine::PathReference(line),
        }
    }
}

/// Split a raw line into its content and its `\r\n`, `\n` or empty terminator.
pub fn split_terminator(line: &[u8]) -> (&[u8], &[u8]) {
    if line.ends_with(b"\r\n") {
        line.split_at(line.len() - 2)
    } else if line.ends_with(b"\n") {
        line.split_at(line.len() - 1)
    } else {
        (line, &[])
    }
}

#[cfg(unix)]
pub(crate) fn bytes_to_path(bytes: &[u8]) -> PathBuf {
    use std::os::unix::ffi::OsStrExt;
    PathBuf::from(std::ffi::OsStr::from_bytes(bytes))
}

#[cfg(not(unix))]
pub(crate) fn bytes_to_path(bytes: &[u8]) -> PathBuf {
    PathBuf::from(String::from_utf8_lossy(bytes).into_owned())
}

#[cfg(unix)]
pub(crate) fn path_to_bytes(path: &Path) -> Vec<u8> {
    use std::os::unix::ffi::OsStrExt;
    path.as_os_str().as_bytes().to_vec()
}

#[cfg(not(unix))]
pub(crate) fn path_to_bytes(path: &Path) -> Vec<u8> {
    path.to_string_lossy().into_owned().into_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify() {
        assert!(matches!(
            PlaylistLine::classify(b"#EXTM3U\n"),
            PlaylistLine::Comment(_)
        ));
        assert!(matches!(
            PlaylistLine::classify(b"   #EXTINF:123,Artist - Title\r\n"),
            PlaylistLine::Comment(_)
        ));
        assert!(matches!(
            PlaylistLine::classify(b"\r\n"),
            PlaylistLine::Comment(_)
        ));
        assert!(matches!(
            PlaylistLine::classify(b"songs/a.mp3\n"),
            PlaylistLine::PathReference(_)
        ));
    }

    #[test]
    fn test_split_terminator() {
        assert_eq!(
            split_terminator(b"a.mp3\r\n"),
            (&b"a.mp3"[..], &b"\r\n"[..])
        );
        assert_eq!(split_terminator(b"a.mp3\n"), (&b"a.mp3"[..], &b"\n"[..]));
        assert_eq!(split_terminator(b"a.mp3"), (&b"a.mp3"[..], &b""[..]));
    }
}
