use std::fmt;
use std::path::{Path, PathBuf};

use color_eyre::eyre::{OptionExt, Result, WrapErr};
use serde::{Deserialize, Serialize};

const DEFAULT_CONFIG: &str = r#"# Local music library root
directory = "~/Music"

[plex]
host = "localhost"
port = 32400
token = ""
secure = false
# library_name = "Music"
# Library root as the Plex server sees it
plex_dir = ""

[playlist]
auto = false
playlist_dir = "."
relative_to = "library"
forward_slash = false
refresh_library = false
"#;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    directory: String,
    #[serde(default)]
    pub plex: PlexConfig,
    #[serde(default)]
    pub playlist: PlaylistConfig,
}

#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlexConfig {
    pub host: String,
    pub port: u16,
    pub token: String,
    pub secure: bool,
    pub library_name: Option<String>,
    pub plex_dir: String,
}

impl Default for PlexConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 32400,
            token: String::new(),
            secure: false,
            library_name: None,
            plex_dir: String::new(),
        }
    }
}

// Keep the token out of logs.
impl fmt::Debug for PlexConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlexConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("token", &"<redacted>")
            .field("secure", &self.secure)
            .field("library_name", &self.library_name)
            .field("plex_dir", &self.plex_dir)
            .finish()
    }
}

/// Which directory relative playlist entries are resolved against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RelativeTo {
    Library,
    Playlist,
    Path(PathBuf),
}

impl From<String> for RelativeTo {
    fn from(value: String) -> Self {
        match value.as_str() {
            "library" => RelativeTo::Library,
            "playlist" => RelativeTo::Playlist,
            _ => RelativeTo::Path(PathBuf::from(value)),
        }
    }
}

impl From<RelativeTo> for String {
    fn from(value: RelativeTo) -> Self {
        match value {
            RelativeTo::Library => "library".to_string(),
            RelativeTo::Playlist => "playlist".to_string(),
            RelativeTo::Path(path) => path.to_string_lossy().into_owned(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaylistConfig {
    pub auto: bool,
    pub playlist_dir: String,
    pub relative_to: RelativeTo,
    pub forward_slash: bool,
    pub refresh_library: bool,
}

impl Default for PlaylistConfig {
    fn default() -> Self {
        Self {
            auto: false,
            playlist_dir: ".".to_string(),
            relative_to: RelativeTo::Library,
            forward_slash: false,
            refresh_library: false,
        }
    }
}

impl Config {
    /// Load config from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .wrap_err(format!("Failed to read config file: {}", path.display()))?;
        Self::from_toml(&contents)
            .wrap_err(format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        Ok(config)
    }

    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|path| path.join("plex-playlist-sync").join("config.toml"))
    }

    /// Load config with default fallback
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path().ok_or_eyre("Config file not found")?;

        Self::from_file(&config_path)
    }

    /// Write the default config file, unless one already exists.
    pub fn create_default() -> Result<PathBuf> {
        let config_path = Self::config_path().ok_or_eyre("No config directory available")?;
        if config_path.exists() {
            tracing::info!("Config already exists at {}", config_path.display());
            return Ok(config_path);
        }

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)
                .wrap_err(format!("Failed to create {}", parent.display()))?;
        }
        std::fs::write(&config_path, DEFAULT_CONFIG)
            .wrap_err(format!("Failed to write {}", config_path.display()))?;
        Ok(config_path)
    }

    /// Expand ~ to home directory
    fn expand_path(path: &str) -> PathBuf {
        if let Some(rest) = path.strip_prefix("~/")
            && let Some(home) = dirs::home_dir()
        {
            return home.join(rest);
        }
        PathBuf::from(path)
    }

    /// Local library root.
    pub fn directory_path(&self) -> PathBuf {
        Self::expand_path(&self.directory)
    }

    pub fn playlist_dir_path(&self) -> PathBuf {
        Self::expand_path(&self.playlist.playlist_dir)
    }

    /// Directory relative playlist entries resolve against, or `None` when
    /// each playlist's own directory is used.
    pub fn relative_base(&self) -> Option<PathBuf> {
        match &self.playlist.relative_to {
            RelativeTo::Library => Some(self.directory_path()),
            RelativeTo::Playlist => None,
            RelativeTo::Path(path) => Some(Self::expand_path(&path.to_string_lossy())),
        }
    }

    /// Roots for translating Plex paths to local ones: (remote, local).
    pub fn translation_roots(&self) -> (String, String) {
        (
            self.plex.plex_dir.clone(),
            self.directory_path().to_string_lossy().into_owned(),
        )
    }
}
