use std::fmt;
use std::path::PathBuf;

/// Failure kinds surfaced by playlist resolution and rewriting.
#[derive(Debug, thiserror::Error)]
pub enum PlaylistError {
    #[error("{message}")]
    NotFound { message: String },

    #[error("{message}")]
    Validation { message: String },

    #[error("File system error during {operation} on {}: {source}", .path.display())]
    Filesystem {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{message}: {source}")]
    Unhandled {
        message: String,
        #[source]
        source: color_eyre::Report,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Validation,
    Filesystem,
    Unhandled,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::NotFound => "NotFound",
            ErrorKind::Validation => "ValidationError",
            ErrorKind::Filesystem => "FilesystemError",
            ErrorKind::Unhandled => "UnhandledError",
        };
        f.write_str(name)
    }
}

impl PlaylistError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn filesystem(
        operation: &'static str,
        path: impl Into<PathBuf>,
        source: std::io::Error,
    ) -> Self {
        Self::Filesystem {
            operation,
            path: path.into(),
            source,
        }
    }

    pub fn unhandled(message: impl Into<String>, source: impl Into<color_eyre::Report>) -> Self {
        Self::Unhandled {
            message: message.into(),
            source: source.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            PlaylistError::NotFound { .. } => ErrorKind::NotFound,
            PlaylistError::Validation { .. } => ErrorKind::Validation,
            PlaylistError::Filesystem { .. } => ErrorKind::Filesystem,
            PlaylistError::Unhandled { .. } => ErrorKind::Unhandled,
        }
    }
}

pub type PlaylistResult<T> = Result<T, PlaylistError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_names() {
        assert_eq!(
            PlaylistError::not_found("x").kind().to_string(),
            "NotFound"
        );
        assert_eq!(
            PlaylistError::validation("x").kind().to_string(),
            "ValidationError"
        );
    }

    #[test]
    fn test_unhandled_keeps_cause() {
        let err = PlaylistError::unhandled(
            "Failed to fetch playlists",
            color_eyre::eyre::eyre!("connection refused"),
        );
        assert_eq!(err.kind(), ErrorKind::Unhandled);
        assert_eq!(
            err.to_string(),
            "Failed to fetch playlists: connection refused"
        );
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_filesystem_message() {
        let err = PlaylistError::filesystem(
            "open",
            "/tmp/list.m3u",
            std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        );
        assert_eq!(
            err.to_string(),
            "File system error during open on /tmp/list.m3u: missing"
        );
    }
}
