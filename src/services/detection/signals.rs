// Auxiliary Signals
// Punctuation and emoticon scorers run on the raw, unnormalized input

use crate::services::text_processor::{hide_urls, NormalizeError};

const MAX_EXCLAMATION_POINTS: usize = 20;
const MIN_QUESTION_MARK_RATIO: f64 = 0.001;

const POSITIVE_EMOTICONS: &[&str] = &[
    ":)", ": )", ":-)", ":d", "=)", "(:", ";)", ";-)", ":]", "<3", "&lt;3",
];
const NEGATIVE_EMOTICONS: &[&str] = &[":(", ": (", ":-(", "):", ":["];

/// One auxiliary contribution and the feature entry describing it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signal {
    pub contribution: i64,
    pub feature: String,
}

fn describe(symbol: char, marks: String, contribution: i64, debug_level: u32) -> String {
    if debug_level > 0 {
        format!("{}: '{}' = {}", symbol, marks, contribution)
    } else {
        marks
    }
}

/// Exclamation density: quadratic in the count, capped at 20 marks.
pub fn exclamation_signal(text: &str, scale: f32, debug_level: u32) -> Option<Signal> {
    let marks: String = text.chars().filter(|c| *c == '!').collect();
    if marks.is_empty() {
        return None;
    }

    let n = marks.len().min(MAX_EXCLAMATION_POINTS) as f64;
    let contribution = (f64::from(scale) * (0.002 * n * n - 0.083 * n + 0.87)).round() as i64;

    Some(Signal {
        contribution,
        feature: describe('!', marks, contribution, debug_level),
    })
}

/// Question-mark ratio over URL-masked prose, per byte. Frequent `?` reads as skepticism.
pub fn question_mark_signal(
    text: &str,
    scale: f32,
    debug_level: u32,
) -> Result<Option<Signal>, NormalizeError> {
    let masked = hide_urls(text)?;
    let length = masked.len();
    if length == 0 {
        return Ok(None);
    }

    let marks: String = masked.chars().filter(|c| *c == '?').collect();
    let ratio = marks.len() as f64 / length as f64;
    if ratio <= MIN_QUESTION_MARK_RATIO {
        return Ok(None);
    }

    let contribution = (f64::from(scale) * (-156.0 * ratio - 0.3)).round() as i64;
    Ok(Some(Signal {
        contribution,
        feature: describe('?', marks, contribution, debug_level),
    }))
}

/// Question-mark count for tweets, logarithmic and applied only when negative.
pub fn tweet_question_mark_signal(
    text: &str,
    scale: f32,
    debug_level: u32,
) -> Result<Option<Signal>, NormalizeError> {
    let masked = hide_urls(text)?;
    let marks: String = masked.chars().filter(|c| *c == '?').collect();
    if marks.is_empty() {
        return Ok(None);
    }

    let count = marks.len() as f64;
    let contribution = (f64::from(scale) * (-0.5533 * count.ln() - 0.3533)).round() as i64;
    if contribution >= 0 {
        return Ok(None);
    }

    Ok(Some(Signal {
        contribution,
        feature: describe('?', marks, contribution, debug_level),
    }))
}

fn count_glyphs(lowered: &str, glyphs: &[&str]) -> i64 {
    glyphs.iter().map(|g| lowered.matches(g).count() as i64).sum()
}

/// Positive minus negative emoticons, case-insensitive. Silent when they cancel.
pub fn emoticon_signal(text: &str, weight: i64) -> Option<Signal> {
    let lowered = text.to_lowercase();
    let positive = count_glyphs(&lowered, POSITIVE_EMOTICONS);
    let negative = count_glyphs(&lowered, NEGATIVE_EMOTICONS);
    let balance = positive - negative;
    if balance == 0 {
        return None;
    }

    Some(Signal {
        contribution: balance.saturating_mul(weight),
        feature: format!(":) *{}; :( *{}", positive, negative),
    })
}
