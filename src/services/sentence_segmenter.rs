// Sentence Segmenter
// Splits regular content into independently scored sentences

use super::text_processor::{hide_urls, translate_html_entities, NormalizeError};

const SENTENCE_DELIMITERS: [char; 3] = [';', '?', '!'];

/// Split on any of `;?!`. Empty segments are preserved, so `"a!!b"` yields
/// `["a", "", "b"]`.
pub fn split_sentences(content: &str) -> Vec<&str> {
    content.split(&SENTENCE_DELIMITERS[..]).collect()
}

/// Prepare content for splitting: URLs are masked first so their `?` query
/// separators do not end a sentence, and entities are translated so their
/// trailing `;` does not either.
pub fn prepare_for_split(content: &str) -> Result<String, NormalizeError> {
    let masked = hide_urls(content)?;
    Ok(translate_html_entities(&masked))
}
