use std::path::{Path, PathBuf};

use serde_json::{Value, json};

use crate::plex_rs::library::PlexLibrarySection;
use crate::plex_rs::playlist::PlexPlaylist;

pub fn write_playlist(dir: &Path, name: &str, contents: &[u8]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

pub fn plex_playlist(rating_key: &str, title: &str) -> PlexPlaylist {
    PlexPlaylist {
        rating_key: rating_key.to_string(),
        title: title.to_string(),
        playlist_type: "audio".to_string(),
        leaf_count: None,
    }
}

pub fn plex_section(key: &str, title: &str, section_type: &str) -> PlexLibrarySection {
    PlexLibrarySection {
        key: key.to_string(),
        title: title.to_string(),
        section_type: section_type.to_string(),
    }
}

/// A playlist item as `/playlists/{id}/items` returns it, one media entry
/// holding one part per file.
pub fn plex_track(rating_key: &str, section_id: u32, files: &[&str]) -> Value {
    let parts: Vec<Value> = files.iter().map(|file| json!({ "file": file })).collect();
    json!({
        "type": "track",
        "ratingKey": rating_key,
        "librarySectionID": section_id,
        "Media": [{ "Part": parts }],
    })
}

pub fn items_response(items: Vec<Value>) -> Value {
    json!({
        "MediaContainer": {
            "size": items.len(),
            "Metadata": items,
        }
    })
}
