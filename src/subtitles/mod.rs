//! Timed caption parsing for SRT and WebVTT files.
//!
//! Unlike the waveform pipeline, caption loading is deliberately soft: a file
//! that cannot be read yields an empty cue list, and a cue with a malformed
//! timing line is dropped while the rest of the file still parses.

mod discover;
pub mod machine;
pub mod timeline;
pub mod timestamp;
pub mod typing;

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

pub use discover::{find_caption_file, load_captions_for_media};
pub use machine::{CueMachine, ParserState};
pub use timeline::{active_cue_index, format_clock};
pub use timestamp::parse_timestamp;
pub use typing::{TypedChar, align_typed};

/// Header token that marks WebVTT content.
pub const VTT_HEADER: &str = "WEBVTT";

/// One timed caption entry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SubtitleCue {
    /// Cue start in seconds.
    #[serde(rename = "start")]
    pub start_sec: f64,
    /// Cue end in seconds, never before `start_sec`.
    #[serde(rename = "end")]
    pub end_sec: f64,
    /// Cue text with multi-line captions joined by a single space.
    pub text: String,
}

/// Caption grammar.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CaptionFormat {
    /// Numbered SubRip cues with `,` millisecond separators.
    Srt,
    /// WebVTT, introduced by a `WEBVTT` header.
    Vtt,
}

impl CaptionFormat {
    /// VTT when the file name has a `.vtt` extension or the first non-empty line
    /// is exactly the `WEBVTT` header; SRT otherwise.
    pub fn detect<'a>(file_name: Option<&Path>, mut lines: impl Iterator<Item = &'a str>) -> Self {
        let vtt_extension = file_name
            .and_then(|path| path.extension())
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("vtt"));
        if vtt_extension {
            return Self::Vtt;
        }
        let header = lines.find(|line| !line.trim().is_empty()).map(|line| {
            line.trim_start_matches('\u{feff}').trim()
        });
        if header == Some(VTT_HEADER) {
            Self::Vtt
        } else {
            Self::Srt
        }
    }
}

/// Parse caption text, detecting the grammar from `file_name` and the content.
pub fn parse_subtitle_str(text: &str, file_name: Option<&Path>) -> Vec<SubtitleCue> {
    CueMachine::new(text, file_name).run()
}

/// Read and parse a caption file.
///
/// A missing, unreadable, or non-UTF-8 file is logged and yields no cues.
pub fn parse_subtitle_file(path: &Path) -> Vec<SubtitleCue> {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) => {
            warn!("Failed to read subtitles {}: {err}", path.display());
            return Vec::new();
        }
    };
    let cues = parse_subtitle_str(&text, Some(path));
    debug!("Parsed {} cues from {}", cues.len(), path.display());
    cues
}
