use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use super::{SubtitleCue, parse_subtitle_file};

const CAPTION_EXTENSIONS: [&str; 2] = ["srt", "vtt"];

/// Locate a caption file for `media_path` in the same directory.
///
/// See [`load_captions_for_media`] for the search order.
pub fn find_caption_file(media_path: &Path, lang: &str) -> Option<PathBuf> {
    load_captions_for_media(media_path, lang).0
}

/// Find and parse the captions that belong to `media_path`.
///
/// Caption files named after the media stem and containing `lang` are tried
/// first, in sorted order. Then `<stem>.<lang>.srt`, `<stem>.<lang>.vtt`,
/// `<stem>.srt` and `<stem>.vtt`. The first candidate that yields at least one
/// cue wins; files that parse to nothing are passed over.
pub fn load_captions_for_media(media_path: &Path, lang: &str) -> (Option<PathBuf>, Vec<SubtitleCue>) {
    let Some(stem) = media_path.file_stem().and_then(|stem| stem.to_str()) else {
        warn!("Media path {} has no usable file stem", media_path.display());
        return (None, Vec::new());
    };
    let dir = match media_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };

    let candidates = matching_caption_files(&dir, stem, lang)
        .into_iter()
        .chain(fallback_caption_paths(&dir, stem, lang).filter(|path| path.is_file()));
    for candidate in candidates {
        let cues = parse_subtitle_file(&candidate);
        if cues.is_empty() {
            debug!("Caption candidate {} has no cues", candidate.display());
            continue;
        }
        info!("Loaded {} cues from {}", cues.len(), candidate.display());
        return (Some(candidate), cues);
    }
    debug!("No captions found for {}", media_path.display());
    (None, Vec::new())
}

fn matching_caption_files(dir: &Path, stem: &str, lang: &str) -> Vec<PathBuf> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) => {
            warn!("Failed to list {}: {err}", dir.display());
            return Vec::new();
        }
    };
    let mut matches: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| is_caption_file(path))
        .filter(|path| {
            path.file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| name.contains(stem) && name.contains(lang))
        })
        .collect();
    matches.sort();
    matches
}

fn fallback_caption_paths<'a>(
    dir: &'a Path,
    stem: &'a str,
    lang: &'a str,
) -> impl Iterator<Item = PathBuf> + 'a {
    let with_lang = CAPTION_EXTENSIONS
        .into_iter()
        .map(move |ext| dir.join(format!("{stem}.{lang}.{ext}")));
    let bare = CAPTION_EXTENSIONS
        .into_iter()
        .map(move |ext| dir.join(format!("{stem}.{ext}")));
    with_lang.chain(bare)
}

fn is_caption_file(path: &Path) -> bool {
    path.is_file()
        && path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| {
                CAPTION_EXTENSIONS
                    .iter()
                    .any(|known| ext.eq_ignore_ascii_case(known))
            })
}
