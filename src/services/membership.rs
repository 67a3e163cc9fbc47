use std::collections::HashSet;
use std::ffi::OsString;
use std::io::{self, BufRead, Write};
use std::path::Path;

use crate::config::Config;
use crate::error::{ErrorKind, PlaylistError, PlaylistResult};
use crate::playlist::{bytes_to_path, split_terminator};
use crate::ports::plex::PlexClient;
use crate::services::plex::client::PlexHttpAdapter;
use crate::services::plex::{PlexPlaylistResolver, ResolvedPathSet};

/// Tests record paths for membership in a Plex playlist.
///
/// Building one never fails: if the playlist cannot be resolved the failure
/// is logged and the predicate matches nothing.
#[derive(Debug, Clone)]
pub struct PathMembership {
    playlist_name: String,
    paths: ResolvedPathSet,
    members: HashSet<OsString>,
}

impl PathMembership {
    pub async fn resolve<C: PlexClient>(
        resolver: &PlexPlaylistResolver<C>,
        playlist_name: &str,
        section_key: Option<&str>,
    ) -> Self {
        let resolution = resolver.resolve(playlist_name, section_key).await;
        Self::from_resolution(playlist_name, resolution)
    }

    pub fn from_resolution(
        playlist_name: &str,
        resolution: PlaylistResult<ResolvedPathSet>,
    ) -> Self {
        let paths = match resolution {
            Ok(paths) => paths,
            Err(e) => {
                match e.kind() {
                    ErrorKind::NotFound => tracing::warn!(
                        playlist = playlist_name,
                        kind = %e.kind(),
                        "Unable to build playlist query: {}",
                        e
                    ),
                    _ => tracing::error!(
                        playlist = playlist_name,
                        kind = %e.kind(),
                        "Unable to build playlist query: {:?}",
                        e
                    ),
                }
                ResolvedPathSet::default()
            }
        };

        let members = paths.iter().map(|p| p.as_os_str().to_owned()).collect();
        Self {
            playlist_name: playlist_name.to_string(),
            paths,
            members,
        }
    }

    /// Connect to the configured server and resolve `playlist_name`, limited
    /// to the configured library when one is set.
    pub async fn from_config(config: &Config, playlist_name: &str) -> Self {
        let client = match PlexHttpAdapter::from_config(&config.plex) {
            Ok(client) => client,
            Err(e) => {
                let error = PlaylistError::unhandled("Failed to connect to Plex", e);
                return Self::from_resolution(playlist_name, Err(error));
            }
        };
        let (remote_root, local_root) = config.translation_roots();
        let resolver = PlexPlaylistResolver::new(client, remote_root, local_root);

        let section_key = match &config.plex.library_name {
            Some(library_name) => match resolver.library_section_key(library_name).await {
                Ok(key) => Some(key),
                Err(e) => return Self::from_resolution(playlist_name, Err(e)),
            },
            None => None,
        };

        Self::resolve(&resolver, playlist_name, section_key.as_deref()).await
    }

    /// True iff `record_path` is exactly one of the resolved paths.
    pub fn matches(&self, record_path: impl AsRef<Path>) -> bool {
        self.members.contains(record_path.as_ref().as_os_str())
    }

    /// Copy the member paths among newline-separated `input` to `output`.
    ///
    /// Lines are compared as raw bytes, so paths that are not valid UTF-8
    /// still match. Returns the number of lines written.
    pub fn filter_paths<R: BufRead, W: Write>(
        &self,
        mut input: R,
        mut output: W,
    ) -> io::Result<usize> {
        let mut written = 0;
        let mut line = Vec::new();
        loop {
            line.clear();
            if input.read_until(b'\n', &mut line)? == 0 {
                break;
            }
            let (path, _) = split_terminator(&line);
            if self.matches(bytes_to_path(path)) {
                output.write_all(path)?;
                output.write_all(b"\n")?;
                written += 1;
            }
        }
        output.flush()?;
        Ok(written)
    }

    pub fn playlist_name(&self) -> &str {
        &self.playlist_name
    }

    /// The resolved paths in playlist order.
    pub fn paths(&self) -> &ResolvedPathSet {
        &self.paths
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::plex::MockPlexClient;
    use crate::test_utils::{items_response, plex_playlist, plex_track};

    #[test]
    fn test_matches_exact_members_only() {
        let membership = PathMembership::from_resolution(
            "Mix",
            Ok(ResolvedPathSet::from_paths(["/music/a.mp3", "/music/b.mp3"])),
        );

        assert!(membership.matches("/music/a.mp3"));
        assert!(!membership.matches("/music/./a.mp3"));
        assert!(!membership.matches("/music//a.mp3"));
        assert!(!membership.matches("/music/c.mp3"));
        assert_eq!(membership.paths().len(), 2);
    }

    #[test]
    fn test_failure_collapses_to_empty() {
        let membership =
            PathMembership::from_resolution("Mix", Err(PlaylistError::validation("broken")));

        assert!(membership.paths().is_empty());
        assert!(!membership.matches("/music/a.mp3"));
        assert_eq!(membership.playlist_name(), "Mix");
    }

    #[test]
    fn test_filter_paths_keeps_members_in_input_order() {
        let membership = PathMembership::from_resolution(
            "Mix",
            Ok(ResolvedPathSet::from_paths(["/music/a.mp3", "/music/b.mp3"])),
        );
        let input = b"/music/b.mp3\r\n/music/c.mp3\n\n/music/a.mp3";

        let mut output = Vec::new();
        let written = membership.filter_paths(&input[..], &mut output).unwrap();

        assert_eq!(written, 2);
        assert_eq!(output, b"/music/b.mp3\n/music/a.mp3\n".to_vec());
    }

    #[cfg(unix)]
    #[test]
    fn test_filter_paths_matches_non_utf8_bytes() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let latin1 = OsStr::from_bytes(b"/music/caf\xe9.mp3");
        let membership =
            PathMembership::from_resolution("Mix", Ok(ResolvedPathSet::from_paths([latin1])));
        let input = b"/music/\xff.mp3\n/music/caf\xe9.mp3\n/music/cafe.mp3\n";

        let mut output = Vec::new();
        let written = membership.filter_paths(&input[..], &mut output).unwrap();

        assert_eq!(written, 1);
        assert_eq!(output, b"/music/caf\xe9.mp3\n".to_vec());
    }

    #[tokio::test]
    async fn test_resolve_through_client() {
        let mut client = MockPlexClient::new();
        client
            .expect_get_playlists()
            .returning(|| Ok(vec![plex_playlist("5", "Mix")]));
        client.expect_get_playlist_items().returning(|_| {
            Ok(items_response(vec![plex_track("1", 2, &["/srv/a.mp3"])]))
        });
        let resolver = PlexPlaylistResolver::new(client, "/srv", "/home/me");

        let membership = PathMembership::resolve(&resolver, "Mix", Some("2")).await;
        assert!(membership.matches("/home/me/a.mp3"));
        assert!(!membership.matches("/srv/a.mp3"));
    }

    #[tokio::test]
    async fn test_unreachable_server_matches_nothing() {
        let mut client = MockPlexClient::new();
        client
            .expect_get_playlists()
            .returning(|| Err(color_eyre::eyre::eyre!("connection refused")));
        let resolver = PlexPlaylistResolver::new(client, "", "");

        let membership = PathMembership::resolve(&resolver, "Mix", None).await;
        assert!(membership.paths().is_empty());
    }

    #[tokio::test]
    async fn test_from_config_with_bad_host_matches_nothing() {
        let config = Config::from_toml(
            r#"
directory = "/music"
[plex]
host = "bad host"
"#,
        )
        .unwrap();

        let membership = PathMembership::from_config(&config, "Mix").await;
        assert!(membership.paths().is_empty());
        assert!(!membership.matches("/music/a.mp3"));
    }
}
