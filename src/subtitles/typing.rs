use serde::Serialize;

/// One character of a cue, marked by whether the typist has reached it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "char", rename_all = "lowercase")]
pub enum TypedChar {
    /// Matched by a typed character.
    Matched(char),
    /// Skipped over or not yet typed.
    Pending(char),
}

/// Align `typed` against `lyric` for a type-along display.
///
/// Each typed character is matched case-insensitively against the next equal
/// character at or after the current lyric position. Lyric characters jumped
/// over stay `Pending`; typed characters with no match ahead are ignored.
pub fn align_typed(typed: &str, lyric: &str) -> Vec<TypedChar> {
    let lyric: Vec<char> = lyric.chars().collect();
    let mut matched = vec![false; lyric.len()];
    let mut position = 0;
    for typed_char in typed.chars() {
        if position >= lyric.len() {
            break;
        }
        let hit = lyric[position..]
            .iter()
            .position(|&candidate| chars_match(typed_char, candidate));
        if let Some(offset) = hit {
            matched[position + offset] = true;
            position += offset + 1;
        }
    }
    lyric
        .into_iter()
        .zip(matched)
        .map(|(ch, hit)| {
            if hit {
                TypedChar::Matched(ch)
            } else {
                TypedChar::Pending(ch)
            }
        })
        .collect()
}

fn chars_match(a: char, b: char) -> bool {
    a == b || a.to_lowercase().eq(b.to_lowercase())
}
