use super::SubtitleCue;

/// Slack applied around each cue when matching a playback position.
pub const DEFAULT_ACTIVE_TOLERANCE_SECS: f64 = 0.5;

/// Index of the first cue, in file order, covering `time_sec` within `tolerance_sec`.
pub fn active_cue_index(cues: &[SubtitleCue], time_sec: f64, tolerance_sec: f64) -> Option<usize> {
    if !time_sec.is_finite() {
        return None;
    }
    let tolerance = tolerance_sec.max(0.0);
    cues.iter().position(|cue| {
        time_sec >= cue.start_sec - tolerance && time_sec <= cue.end_sec + tolerance
    })
}

/// Render seconds as `m:ss`; negative or non-finite input shows `0:00`.
pub fn format_clock(seconds: f64) -> String {
    if !seconds.is_finite() || seconds < 0.0 {
        return "0:00".to_string();
    }
    let whole = seconds.floor() as u64;
    format!("{}:{:02}", whole / 60, whole % 60)
}
