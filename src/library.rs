//! Music directory scanning.
//!
//! Enumerates the configured directory and returns song identifiers: paths
//! relative to the music directory, so the playlist never stores absolute
//! paths.

use std::path::Path;

use walkdir::WalkDir;

use crate::config::LibrarySettings;

fn is_audio_file(path: &Path, settings: &LibrarySettings) -> bool {
    let exts: Vec<String> = settings
        .extensions
        .iter()
        .map(|e| e.trim().trim_start_matches('.').to_ascii_lowercase())
        .filter(|e| !e.is_empty())
        .collect();

    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            exts.iter().any(|e| e == &ext)
        })
        .unwrap_or(false)
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|s| s.to_str())
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

/// Collect playable song names under `dir`, sorted case-insensitively.
pub fn scan(dir: &Path, settings: &LibrarySettings) -> Vec<String> {
    let mut songs: Vec<String> = Vec::new();

    let mut walker = WalkDir::new(dir).follow_links(settings.follow_links);

    // Non-recursive = only the root directory.
    let depth_cap = if settings.recursive {
        settings.max_depth
    } else {
        Some(1)
    };
    if let Some(d) = depth_cap {
        walker = walker.max_depth(d);
    }

    for entry in walker
        .into_iter()
        .filter_entry(|e| settings.include_hidden || e.depth() == 0 || !is_hidden(e.path()))
        .filter_map(Result::ok)
    {
        let path = entry.path();
        if path.is_file()
            && (settings.include_hidden || !is_hidden(path))
            && is_audio_file(path, settings)
        {
            let name = path.strip_prefix(dir).unwrap_or(path);
            if let Some(name) = name.to_str() {
                songs.push(name.to_string());
            }
        }
    }

    songs.sort_by_key(|s| s.to_lowercase());
    songs
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn is_audio_file_matches_configured_extensions_case_insensitive() {
        let settings = LibrarySettings::default();
        assert!(is_audio_file(Path::new("/tmp/a.mp3"), &settings));
        assert!(is_audio_file(Path::new("/tmp/a.MP3"), &settings));
        assert!(is_audio_file(Path::new("/tmp/a.flac"), &settings));
        assert!(is_audio_file(Path::new("/tmp/a.ogg"), &settings));
        assert!(!is_audio_file(Path::new("/tmp/a.txt"), &settings));
        assert!(!is_audio_file(Path::new("/tmp/a"), &settings));
    }

    #[test]
    fn scan_filters_non_audio_and_sorts_case_insensitive() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("b.MP3"), b"not a real mp3").unwrap();
        fs::write(dir.path().join("A.ogg"), b"not a real ogg").unwrap();
        fs::write(dir.path().join("c.txt"), b"ignore me").unwrap();

        let songs = scan(dir.path(), &LibrarySettings::default());
        assert_eq!(songs, vec!["A.ogg", "b.MP3"]);
    }

    #[test]
    fn scan_skips_subdirectories_unless_recursive() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("root.mp3"), b"not real").unwrap();
        let sub = dir.path().join("sub");
        fs::create_dir_all(&sub).unwrap();
        fs::write(sub.join("child.mp3"), b"not real").unwrap();

        let flat = scan(dir.path(), &LibrarySettings::default());
        assert_eq!(flat, vec!["root.mp3"]);

        let settings = LibrarySettings {
            recursive: true,
            ..LibrarySettings::default()
        };
        let deep = scan(dir.path(), &settings);
        assert_eq!(deep.len(), 2);
        // Recursive hits keep their directory-relative name.
        assert!(deep.contains(&format!("sub{}child.mp3", std::path::MAIN_SEPARATOR)));
    }

    #[test]
    fn scan_skips_hidden_files_by_default() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(".hidden.mp3"), b"not real").unwrap();
        fs::write(dir.path().join("visible.mp3"), b"not real").unwrap();

        let songs = scan(dir.path(), &LibrarySettings::default());
        assert_eq!(songs, vec!["visible.mp3"]);

        let settings = LibrarySettings {
            include_hidden: true,
            ..LibrarySettings::default()
        };
        assert_eq!(scan(dir.path(), &settings).len(), 2);
    }
}
