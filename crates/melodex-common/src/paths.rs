//! File classification for the music catalog.
//!
//! A path is catalog-eligible when its extension is on the audio allow-list.
//! Its catalog name is the file name with the extension removed, which is
//! also the catalog's uniqueness key: `Track.mp3` and `Track.flac` map to
//! the same entry.

use std::path::{Component, Path};

/// Audio extensions accepted into the catalog (compared case-insensitively).
const AUDIO_EXTENSIONS: &[&str] = &["mp3", "flac", "wav", "aac", "ogg", "m4a"];

/// Result of classifying a single path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    /// Whether the path belongs in the catalog.
    pub eligible: bool,
    /// File name with its extension stripped, case preserved.
    pub normalized_name: String,
}

/// Classify a path.
///
/// Decided by the name alone, except that a path which currently exists as
/// a directory is never eligible (an `album.mp3/` folder stays out of the
/// catalog). That one check touches the filesystem; for paths that do not
/// exist, such as a file that was just removed, the answer is purely
/// name-based.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use melodex_common::paths::classify;
///
/// let song = classify(Path::new("Song.MP3"));
/// assert!(song.eligible);
/// assert_eq!(song.normalized_name, "Song");
///
/// assert!(!classify(Path::new("notes.txt")).eligible);
/// ```
pub fn classify(path: &Path) -> Classification {
    Classification {
        // directories are never eligible
        eligible: is_audio_file(path) && !path.is_dir(),
        normalized_name: normalized_name(path),
    }
}

/// Check if a path has an audio file extension.
pub fn is_audio_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| AUDIO_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Base file name with the final extension removed.
///
/// ```
/// use std::path::Path;
/// use melodex_common::paths::normalized_name;
///
/// assert_eq!(normalized_name(Path::new("/music/Live.At.Home.flac")), "Live.At.Home");
/// ```
pub fn normalized_name(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Path of `path` relative to `root`, `/`-separated and prefixed with `/`.
///
/// Paths outside `root` are returned unchanged (lossily converted to a
/// string), mirroring how a failed relativization is reported upstream.
///
/// ```
/// use std::path::Path;
/// use melodex_common::paths::catalog_relative_path;
///
/// assert_eq!(
///     catalog_relative_path(Path::new("/srv/music"), Path::new("/srv/music/a.mp3")),
///     "/a.mp3"
/// );
/// ```
pub fn catalog_relative_path(root: &Path, path: &Path) -> String {
    match path.strip_prefix(root) {
        Ok(rel) => {
            let parts: Vec<String> = rel
                .components()
                .filter_map(|c| match c {
                    Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
                    _ => None,
                })
                .collect();
            format!("/{}", parts.join("/"))
        }
        Err(_) => path.to_string_lossy().into_owned(),
    }
}
