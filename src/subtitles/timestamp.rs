use std::sync::LazyLock;

use regex::Regex;

/// Separator between the start and end timestamps of a cue.
pub const TIMING_ARROW: &str = " --> ";

static TIMESTAMP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d+):(\d{2}):(\d{2})[,.](\d{3})$").expect("timestamp regex must compile")
});

/// Parse `HH:MM:SS,mmm` or `HH:MM:SS.mmm` into seconds.
pub fn parse_timestamp(token: &str) -> Option<f64> {
    let caps = TIMESTAMP.captures(token.trim())?;
    let field = |index: usize| caps.get(index)?.as_str().parse::<u64>().ok();
    let hours = field(1)?;
    let minutes = field(2)?;
    let seconds = field(3)?;
    let millis = field(4)?;
    let whole = hours as f64 * 3600.0 + (minutes * 60 + seconds) as f64;
    Some(whole + millis as f64 / 1000.0)
}

/// True when `line` looks like a cue timing line.
pub fn is_timing_line(line: &str) -> bool {
    line.contains(TIMING_ARROW)
}

/// Split a timing line into start and end seconds.
///
/// Cue settings after the end timestamp (`align:start position:10%`) are ignored.
/// Returns `None` when either timestamp is malformed or the cue ends before it
/// starts.
pub fn parse_timing_line(line: &str) -> Option<(f64, f64)> {
    let (start, rest) = line.split_once(TIMING_ARROW)?;
    let end = rest.split_whitespace().next()?;
    let start = parse_timestamp(start)?;
    let end = parse_timestamp(end)?;
    (end >= start).then_some((start, end))
}
