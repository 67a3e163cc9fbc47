use std::fmt;
use std::path::{Component, Path, PathBuf};

/// An absolute, lexically normalized path used as a ledger key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PathKey(PathBuf);

impl PathKey {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self(normalize(path.as_ref()))
    }

    pub fn as_path(&self) -> &Path {
        &self.0
    }
}

impl AsRef<Path> for PathKey {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl fmt::Display for PathKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

/// Map `path` from the `from_root` namespace into the `to_root` namespace.
///
/// Only a leading, literal prefix is substituted. When either root is empty or
/// the path lies outside `from_root`, the path is returned unchanged.
pub fn translate(path: &str, from_root: &str, to_root: &str) -> String {
    if !from_root.is_empty()
        && !to_root.is_empty()
        && let Some(rest) = path.strip_prefix(from_root)
    {
        let translated = format!("{}{}", to_root, rest);
        tracing::debug!("Plex path: {} -> {}", path, translated);
        return translated;
    }

    tracing::debug!("Plex path: {}", path);
    path.to_string()
}

/// Make `path` absolute against the current directory and collapse `.` and `..`.
///
/// Symlinks are not resolved; the result may name a file that does not exist.
pub fn normalize(path: &Path) -> PathBuf {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        match std::env::current_dir() {
            Ok(cwd) => cwd.join(path),
            Err(e) => {
                tracing::warn!("Failed to read current directory: {}", e);
                path.to_path_buf()
            }
        }
    };

    let mut out = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                // `..` at the root stays at the root
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Express `path` relative to `base`, walking up with `..` where needed.
///
/// Both sides are normalized first. If they share no common root (different
/// drive prefixes on Windows), `path` is returned as-is.
pub fn relative_to(path: &Path, base: &Path) -> PathBuf {
    let path = normalize(path);
    let base = normalize(base);

    let path_components: Vec<Component> = path.components().collect();
    let base_components: Vec<Component> = base.components().collect();

    if path_components.first() != base_components.first() {
        return path;
    }

    let common = path_components
        .iter()
        .zip(base_components.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut out = PathBuf::new();
    for _ in common..base_components.len() {
        out.push("..");
    }
    for component in &path_components[common..] {
        out.push(component.as_os_str());
    }

    if out.as_os_str().is_empty() {
        PathBuf::from(".")
    } else {
        out
    }
}
