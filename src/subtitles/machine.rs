//! Line-oriented cue state machine.
//!
//! ```text
//! DetectFormat -> SkipHeader (VTT) -> SeekCue -> ParseTiming -> CollectText -> EmitCue
//!                                       ^                                         |
//!                                       +-----------------------------------------+
//! ```
//!
//! Every transition consumes at most the lines it inspects, so each state can be
//! stepped and checked in isolation.

use std::mem;
use std::path::Path;

use tracing::debug;

use super::timestamp::{is_timing_line, parse_timing_line};
use super::{CaptionFormat, SubtitleCue};

/// Separator used when a cue's text spans several lines.
pub const LINE_JOINER: &str = " ";

/// Where the parser is in the caption text.
#[derive(Clone, Debug, PartialEq)]
pub enum ParserState {
    /// Decide between SRT and VTT grammar.
    DetectFormat,
    /// Skip the VTT header block up to the first timing line.
    SkipHeader,
    /// Skip blank lines, sequence numbers and stray text until a timing line.
    SeekCue,
    /// Parse the timing line under the cursor.
    ParseTiming,
    /// Gather the text lines that follow a valid timing line.
    CollectText { start_sec: f64, end_sec: f64 },
    /// Append a finished cue to the output.
    EmitCue(SubtitleCue),
    /// End of input.
    Done,
}

/// Stepwise parser over the lines of one caption file.
pub struct CueMachine<'a> {
    lines: Vec<&'a str>,
    cursor: usize,
    file_name: Option<&'a Path>,
    format: Option<CaptionFormat>,
    state: ParserState,
    cues: Vec<SubtitleCue>,
}

impl<'a> CueMachine<'a> {
    /// Start in `DetectFormat`, using `file_name` (if any) as a grammar hint.
    pub fn new(text: &'a str, file_name: Option<&'a Path>) -> Self {
        Self {
            lines: text.lines().collect(),
            cursor: 0,
            file_name,
            format: None,
            state: ParserState::DetectFormat,
            cues: Vec::new(),
        }
    }

    /// Start with a known grammar, skipping detection.
    pub fn with_format(text: &'a str, format: CaptionFormat) -> Self {
        let mut machine = Self::new(text, None);
        machine.format = Some(format);
        machine.state = Self::after_detection(format);
        machine
    }

    /// Current state.
    pub fn state(&self) -> &ParserState {
        &self.state
    }

    /// Index of the line the next transition will look at.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Grammar in use, once detected.
    pub fn format(&self) -> Option<CaptionFormat> {
        self.format
    }

    /// Cues emitted so far.
    pub fn cues(&self) -> &[SubtitleCue] {
        &self.cues
    }

    /// Perform one transition and return the new state.
    pub fn step(&mut self) -> &ParserState {
        let current = mem::replace(&mut self.state, ParserState::Done);
        self.state = match current {
            ParserState::DetectFormat => self.detect_format(),
            ParserState::SkipHeader => self.skip_header(),
            ParserState::SeekCue => self.seek_cue(),
            ParserState::ParseTiming => self.parse_timing(),
            ParserState::CollectText { start_sec, end_sec } => {
                self.collect_text(start_sec, end_sec)
            }
            ParserState::EmitCue(cue) => self.emit_cue(cue),
            ParserState::Done => ParserState::Done,
        };
        &self.state
    }

    /// Step until `Done` and return the cues in file order.
    pub fn run(mut self) -> Vec<SubtitleCue> {
        while self.state != ParserState::Done {
            self.step();
        }
        self.cues
    }

    fn after_detection(format: CaptionFormat) -> ParserState {
        match format {
            CaptionFormat::Vtt => ParserState::SkipHeader,
            CaptionFormat::Srt => ParserState::SeekCue,
        }
    }

    fn current_line(&self) -> Option<&'a str> {
        self.lines.get(self.cursor).copied()
    }

    fn detect_format(&mut self) -> ParserState {
        let format = CaptionFormat::detect(self.file_name, self.lines.iter().copied());
        debug!("Detected {format:?} caption grammar");
        self.format = Some(format);
        Self::after_detection(format)
    }

    fn skip_header(&mut self) -> ParserState {
        while let Some(line) = self.current_line() {
            if is_timing_line(line) {
                break;
            }
            self.cursor += 1;
        }
        ParserState::SeekCue
    }

    fn seek_cue(&mut self) -> ParserState {
        while self.current_line().is_some_and(|line| line.trim().is_empty()) {
            self.cursor += 1;
        }
        let Some(line) = self.current_line() else {
            return ParserState::Done;
        };
        if is_timing_line(line) {
            return ParserState::ParseTiming;
        }
        // Sequence numbers, cue identifiers and stray text are all skipped one line
        // at a time; only a timing line starts a cue.
        self.cursor += 1;
        ParserState::SeekCue
    }

    fn parse_timing(&mut self) -> ParserState {
        let Some(line) = self.current_line() else {
            return ParserState::Done;
        };
        self.cursor += 1;
        match parse_timing_line(line) {
            Some((start_sec, end_sec)) => ParserState::CollectText { start_sec, end_sec },
            None => {
                debug!("Skipping cue with malformed timing on line {}: {line}", self.cursor);
                ParserState::SeekCue
            }
        }
    }

    fn collect_text(&mut self, start_sec: f64, end_sec: f64) -> ParserState {
        let mut text_lines = Vec::new();
        while let Some(line) = self.current_line() {
            if line.trim().is_empty() {
                break;
            }
            text_lines.push(line);
            self.cursor += 1;
        }
        if text_lines.is_empty() {
            return ParserState::SeekCue;
        }
        ParserState::EmitCue(SubtitleCue {
            start_sec,
            end_sec,
            text: text_lines.join(LINE_JOINER),
        })
    }

    fn emit_cue(&mut self, cue: SubtitleCue) -> ParserState {
        self.cues.push(cue);
        ParserState::SeekCue
    }
}
