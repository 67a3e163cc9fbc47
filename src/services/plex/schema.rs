//! Shape checks for the loosely typed `/playlists/{id}/items` response.
//!
//! Each level of `MediaContainer.Metadata[i].Media[j].Part[k].file` is checked
//! separately so a failure names the exact position that broke.

use serde_json::{Map, Value};

use crate::error::{PlaylistError, PlaylistResult};

/// A playlist entry that passed the track shape check.
#[derive(Debug)]
pub struct TrackItem<'a> {
    pub index: usize,
    pub rating_key: Option<&'a str>,
    fields: &'a Map<String, Value>,
}

impl TrackItem<'_> {
    fn label(&self) -> &str {
        self.rating_key.unwrap_or("?")
    }
}

/// The `Metadata` array of a playlist items response. A missing array means
/// the playlist is empty.
pub fn playlist_items<'a>(
    response: &'a Value,
    playlist_name: &str,
) -> PlaylistResult<&'a [Value]> {
    let container = response
        .get("MediaContainer")
        .and_then(Value::as_object)
        .ok_or_else(|| {
            PlaylistError::validation(format!(
                "Playlist '{}' items response has no MediaContainer.",
                playlist_name
            ))
        })?;

    match container.get("Metadata") {
        None => Ok(&[]),
        Some(Value::Array(items)) => Ok(items.as_slice()),
        Some(_) => Err(PlaylistError::validation(format!(
            "Playlist '{}' playlist.items is invalid.",
            playlist_name
        ))),
    }
}

fn invalid_item(playlist_name: &str, index: usize) -> PlaylistError {
    PlaylistError::validation(format!(
        "Playlist '{}' playlist.items[{}] is invalid.",
        playlist_name, index
    ))
}

/// Read the library section of a playlist entry, whatever its type.
///
/// Only the entry itself has to be an object; nothing below it is checked.
pub fn section_id(
    item: &Value,
    index: usize,
    playlist_name: &str,
) -> PlaylistResult<Option<String>> {
    let fields = item
        .as_object()
        .ok_or_else(|| invalid_item(playlist_name, index))?;

    match fields.get("librarySectionID") {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(id)) => Ok(Some(id.clone())),
        Some(Value::Number(id)) => Ok(Some(id.to_string())),
        Some(_) => Err(PlaylistError::validation(format!(
            "Track '{}' track[{}].librarySectionID is invalid.",
            fields
                .get("ratingKey")
                .and_then(Value::as_str)
                .unwrap_or("?"),
            index
        ))),
    }
}

/// Check that `item` looks like a track.
pub fn track<'a>(
    item: &'a Value,
    index: usize,
    playlist_name: &str,
) -> PlaylistResult<TrackItem<'a>> {
    let fields = item
        .as_object()
        .ok_or_else(|| invalid_item(playlist_name, index))?;
    if fields.get("type").and_then(Value::as_str) != Some("track") {
        return Err(invalid_item(playlist_name, index));
    }

    Ok(TrackItem {
        index,
        rating_key: fields.get("ratingKey").and_then(Value::as_str),
        fields,
    })
}

/// Collect every `Media[*].Part[*].file` of a track, in order.
pub fn part_files<'a>(track: &TrackItem<'a>) -> PlaylistResult<Vec<&'a str>> {
    let invalid = |position: String| {
        PlaylistError::validation(format!(
            "Track '{}' track[{}]{} is invalid.",
            track.label(),
            track.index,
            position
        ))
    };

    let medias = track
        .fields
        .get("Media")
        .and_then(Value::as_array)
        .ok_or_else(|| invalid(".media".to_string()))?;

    let mut files = Vec::new();
    for (media_index, media) in medias.iter().enumerate() {
        let media = media
            .as_object()
            .ok_or_else(|| invalid(format!(".media[{}]", media_index)))?;

        let parts = media
            .get("Part")
            .and_then(Value::as_array)
            .ok_or_else(|| invalid(format!(".media[{}].parts", media_index)))?;

        for (part_index, part) in parts.iter().enumerate() {
            let part = part.as_object().ok_or_else(|| {
                invalid(format!(".media[{}].parts[{}]", media_index, part_index))
            })?;

            let file = part
                .get("file")
                .and_then(Value::as_str)
                .filter(|file| !file.is_empty())
                .ok_or_else(|| {
                    invalid(format!(
                        ".media[{}].parts[{}].file",
                        media_index, part_index
                    ))
                })?;

            files.push(file);
        }
    }

    Ok(files)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::error::ErrorKind;

    fn message(err: PlaylistError) -> String {
        assert_eq!(err.kind(), ErrorKind::Validation);
        err.to_string()
    }

    #[test]
    fn test_missing_metadata_is_empty() {
        let response = json!({"MediaContainer": {"size": 0}});
        assert!(playlist_items(&response, "Empty").unwrap().is_empty());
    }

    #[test]
    fn test_metadata_not_array() {
        let response = json!({"MediaContainer": {"Metadata": {"oops": true}}});
        let err = playlist_items(&response, "Mix").unwrap_err();
        assert_eq!(message(err), "Playlist 'Mix' playlist.items is invalid.");
    }

    #[test]
    fn test_non_track_item() {
        let item = json!({"type": "movie", "ratingKey": "7"});
        let err = track(&item, 3, "Mix").unwrap_err();
        assert_eq!(message(err), "Playlist 'Mix' playlist.items[3] is invalid.");
    }

    #[test]
    fn test_section_id_number_or_string() {
        let numeric = json!({"type": "track", "librarySectionID": 4});
        assert_eq!(section_id(&numeric, 0, "Mix").unwrap().as_deref(), Some("4"));

        let text = json!({"type": "track", "librarySectionID": "4"});
        assert_eq!(section_id(&text, 0, "Mix").unwrap().as_deref(), Some("4"));

        let missing = json!({"type": "track", "ratingKey": "8"});
        assert!(section_id(&missing, 0, "Mix").unwrap().is_none());
        assert_eq!(track(&missing, 0, "Mix").unwrap().rating_key, Some("8"));
    }

    #[test]
    fn test_section_id_of_any_item_type() {
        let episode = json!({"type": "episode", "librarySectionID": 9});
        assert_eq!(section_id(&episode, 1, "Mix").unwrap().as_deref(), Some("9"));

        let bad = json!({"ratingKey": "5", "librarySectionID": [9]});
        assert_eq!(
            message(section_id(&bad, 2, "Mix").unwrap_err()),
            "Track '5' track[2].librarySectionID is invalid."
        );

        assert_eq!(
            message(section_id(&json!("oops"), 0, "Mix").unwrap_err()),
            "Playlist 'Mix' playlist.items[0] is invalid."
        );
    }

    #[test]
    fn test_collects_all_parts() {
        let item = json!({
            "type": "track",
            "ratingKey": "10",
            "Media": [
                {"Part": [{"file": "/m/a.flac"}, {"file": "/m/a.cue"}]},
                {"Part": [{"file": "/m/a.mp3"}]}
            ]
        });
        let item = track(&item, 0, "Mix").unwrap();
        assert_eq!(
            part_files(&item).unwrap(),
            vec!["/m/a.flac", "/m/a.cue", "/m/a.mp3"]
        );
    }

    #[test]
    fn test_media_not_array() {
        let item = json!({"type": "track", "ratingKey": "10", "Media": {"Part": []}});
        let item = track(&item, 2, "Mix").unwrap();
        assert_eq!(
            message(part_files(&item).unwrap_err()),
            "Track '10' track[2].media is invalid."
        );
    }

    #[test]
    fn test_part_without_file() {
        let item = json!({
            "type": "track",
            "ratingKey": "11",
            "Media": [{"Part": [{"file": "/m/ok.mp3"}]}, {"Part": [{"id": 5}]}]
        });
        let item = track(&item, 0, "Mix").unwrap();
        assert_eq!(
            message(part_files(&item).unwrap_err()),
            "Track '11' track[0].media[1].parts[0].file is invalid."
        );
    }

    #[test]
    fn test_empty_file_rejected() {
        let item = json!({"type": "track", "Media": [{"Part": [{"file": ""}]}]});
        let item = track(&item, 1, "Mix").unwrap();
        assert_eq!(
            message(part_files(&item).unwrap_err()),
            "Track '?' track[1].media[0].parts[0].file is invalid."
        );
    }
}
