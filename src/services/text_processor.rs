// Text Processing Service
// Normalization profiles applied before phrase matching

use regex::Regex;
use std::sync::OnceLock;
use thiserror::Error;

use crate::models::ContentType;

/// Placeholder substituted for masked `http:` URLs.
pub const URL_PLACEHOLDER: &str = "'http'";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NormalizeError {
    #[error("failed to compile {name} pattern: {message}")]
    Pattern { name: &'static str, message: String },
}

// Applied in order. `&lt;` and `&gt;` map to `>` and `<`; existing dictionaries
// were built against this mapping.
const HTML_ENTITIES: &[(&str, &str)] = &[
    ("&quot;", "\""),
    ("&amp;", "&"),
    ("&lt;", ">"),
    ("&gt;", "<"),
    ("&nbsp;", " "),
    ("&#34;", "\""),
    ("&#034;", "\""),
    ("&#35;", "#"),
    ("&#035;", "#"),
    ("&#39;", "'"),
    ("&#039;", "'"),
    ("&#96;", "'"),
    ("&#8211;", "--"),
    ("&#8212;", "--"),
    ("&#8220;", "..."),
    ("&#8230;", "..."),
    ("&heart;", "'heart'"),
    ("\\u00b4", "'"),
    ("\\u2019", "'"),
    ("\u{201c}", "\""),
    ("\u{201d}", "\""),
    ("\u{2018}", "'"),
    ("\u{2019}", "'"),
    ("\u{00b4}", "'"),
    ("\u{2013}", "--"),
    ("\u{2014}", "--"),
];

struct Patterns {
    url: Regex,
    hashtag_blank: Regex,
    mention_blank: Regex,
    mention_tag: Regex,
    hashtag_tag: Regex,
    unicode_escape: Regex,
    number: Regex,
    retweet: Regex,
    symbol: Regex,
    whitespace: Regex,
    url_host: Regex,
    url_html_suffix: Regex,
    url_symbol: Regex,
}

fn compile(name: &'static str, pattern: &str) -> Result<Regex, NormalizeError> {
    Regex::new(pattern).map_err(|e| NormalizeError::Pattern {
        name,
        message: e.to_string(),
    })
}

impl Patterns {
    fn build() -> Result<Self, NormalizeError> {
        Ok(Self {
            url: compile("url", r"http:[_/\w.=&?\-]+")?,
            hashtag_blank: compile("hashtag", r"^#\S+| #\S+")?,
            mention_blank: compile("mention", r"^@\S+| @\S+")?,
            mention_tag: compile("tweet mention", r"@[_a-z0-9]+")?,
            hashtag_tag: compile("tweet hashtag", r"#[_a-z0-9]+")?,
            unicode_escape: compile("unicode escape", r"\\u[0-9a-f]{4}")?,
            number: compile("number", r"[,0-9.]*[0-9]")?,
            retweet: compile("retweet", r"\brt ")?,
            symbol: compile("symbol", r"[^a-z0-9']")?,
            whitespace: compile("whitespace", r"\s+")?,
            url_host: compile("url host", r"https?://[^/]+/")?,
            url_html_suffix: compile("url suffix", r"\.html$")?,
            url_symbol: compile("url symbol", r"[^a-zA-Z0-9]+")?,
        })
    }
}

fn patterns() -> Result<&'static Patterns, NormalizeError> {
    static PATTERNS: OnceLock<Result<Patterns, NormalizeError>> = OnceLock::new();
    PATTERNS
        .get_or_init(Patterns::build)
        .as_ref()
        .map_err(|e| e.clone())
}

/// Normalize text with the profile matching its content type.
pub fn normalize(text: &str, content_type: ContentType) -> Result<String, NormalizeError> {
    match content_type {
        ContentType::Regular => normalize_content(text),
        ContentType::Twitter => normalize_tweet(text),
    }
}

/// Regular (prose) profile.
///
/// Lower-cases, blanks hashtags and mentions, masks URLs, collapses letter runs
/// and reduces everything to `[a-z0-9']` tokens separated by single spaces.
pub fn normalize_content(text: &str) -> Result<String, NormalizeError> {
    let p = patterns()?;

    let s = text.to_lowercase();
    let s = p.hashtag_blank.replace_all(&s, " ");
    let s = p.mention_blank.replace_all(&s, " ");
    let s = p.url.replace_all(&s, URL_PLACEHOLDER);

    Ok(reduce_tokens(p, &s))
}

/// Tweet profile: escape sequences, entities, mentions, hashtags, unicode
/// escapes and numerals are masked, then the token reduction shared with the
/// regular profile runs. Hashtag and mention blanking is regular-only.
pub fn normalize_tweet(text: &str) -> Result<String, NormalizeError> {
    let p = patterns()?;

    let s = unescape_control_sequences(text);
    let s = p.url.replace_all(&s, URL_PLACEHOLDER);
    let s = translate_html_entities(&s).to_lowercase();
    let s = p.mention_tag.replace_all(&s, "'atdel'");
    let s = p.hashtag_tag.replace_all(&s, "'hashdel'");
    let s = p.unicode_escape.replace_all(&s, "'u'");
    let s = p.number.replace_all(&s, "'n'");

    Ok(reduce_tokens(p, &s))
}

/// Shared tail of both profiles: collapse letter runs, reduce to
/// `[a-z0-9']` tokens, drop `rt` markers.
fn reduce_tokens(p: &Patterns, text: &str) -> String {
    let s = collapse_repeated_chars(text);
    let s = p.symbol.replace_all(&s, " ");
    let s = p.whitespace.replace_all(&s, " ");
    // `rt` is stripped last: earlier, punctuation such as "rt," would only
    // turn into a strippable token on a second pass.
    let s = p.retweet.replace_all(s.trim(), "");
    s.trim().to_string()
}

/// URL section transform: drops scheme and host, a trailing `.html`, and
/// splits the path on anything non-alphanumeric.
pub fn normalize_url(url: &str) -> Result<String, NormalizeError> {
    let p = patterns()?;

    let s = url.to_lowercase();
    let s = p.url_host.replace_all(&s, "");
    let s = p.url_html_suffix.replace_all(&s, " ");
    let s = p.url_symbol.replace_all(&s, " ");

    Ok(s.trim().to_string())
}

/// Replace `http:` URLs with [`URL_PLACEHOLDER`].
pub fn hide_urls(text: &str) -> Result<String, NormalizeError> {
    let p = patterns()?;
    Ok(p.url.replace_all(text, URL_PLACEHOLDER).into_owned())
}

pub fn translate_html_entities(text: &str) -> String {
    let mut s = text.to_string();
    for &(entity, plain) in HTML_ENTITIES {
        if s.contains(entity) {
            s = s.replace(entity, plain);
        }
    }
    s
}

/// Collapse runs of three or more identical word characters to two.
fn collapse_repeated_chars(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut prev: Option<char> = None;
    let mut run = 0usize;

    for ch in text.chars() {
        if prev == Some(ch) {
            run += 1;
        } else {
            prev = Some(ch);
            run = 1;
        }
        if run <= 2 || !is_word_char(ch) {
            out.push(ch);
        }
    }

    out
}

fn is_word_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_'
}

/// Turn literal `\n`, `\r`, `\t` sequences into spaces unless the backslash is itself escaped.
fn unescape_control_sequences(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut i = 0;

    while i < chars.len() {
        let ch = chars[i];
        let escaped = i > 0 && chars[i - 1] == '\\';
        if ch == '\\' && !escaped && matches!(chars.get(i + 1).copied(), Some('n' | 'r' | 't')) {
            out.push(' ');
            i += 2;
            continue;
        }
        out.push(ch);
        i += 1;
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_content_masks_tags_and_urls() {
        let out = normalize_content("I LOOOOVE this!!! #blessed @bob http://t.co/xyz").unwrap();
        assert_eq!(out, "i loove this 'http'");
    }

    #[test]
    fn test_normalize_content_strips_retweet_prefix() {
        assert_eq!(normalize_content("RT @user: Great game").unwrap(), "great game");
        assert_eq!(normalize_content("rt, rt great").unwrap(), "great");
        assert_eq!(normalize_content("art is great").unwrap(), "art is great");
    }

    #[test]
    fn test_normalize_content_empty() {
        assert_eq!(normalize_content("").unwrap(), "");
        assert_eq!(normalize_content("  !!! ?? ").unwrap(), "");
    }

    #[test]
    fn test_normalize_content_is_idempotent() {
        let samples = [
            "I LOOOOVE this!!! #blessed @bob http://t.co/xyz",
            "rt, rt: Don't stop me now...",
            "#tag first and @mention second; then http://a.b/c?d=e",
            "Ünïcödé ßtraße éée",
            "aaaa''''bbbb ___ 1111 rt",
            "  rt rt rt hello rt  ",
            "",
        ];
        for sample in samples {
            let once = normalize_content(sample).unwrap();
            let twice = normalize_content(&once).unwrap();
            assert_eq!(once, twice, "not idempotent for {:?}", sample);
        }
    }

    #[test]
    fn test_normalize_tweet_masks_numbers_and_tags() {
        let out = normalize_tweet("@Bob scored 2,500.5 points &amp; #won\\nyay").unwrap();
        assert_eq!(out, "'atdel' scored 'n' points 'hashdel' yay");
    }

    #[test]
    fn test_normalize_tweet_keeps_escaped_backslash() {
        let out = normalize_tweet("a\\\\nb").unwrap();
        assert_eq!(out, "a nb");
    }

    #[test]
    fn test_normalize_tweet_masks_unicode_escapes() {
        assert_eq!(normalize_tweet("caf\\u00e9 rt hi").unwrap(), "caf'u' hi");
        assert_eq!(normalize_tweet("x \\u2764\\u2764 y").unwrap(), "x 'u''u' y");
    }

    #[test]
    fn test_normalize_tweet_does_not_blank_unmatched_tags() {
        assert_eq!(normalize_tweet("#über cool").unwrap(), "ber cool");
        assert_eq!(normalize_content("#über cool").unwrap(), "cool");
    }

    #[test]
    fn test_normalize_url() {
        let out = normalize_url("http://www.example.com/news/Great-Win_today.html").unwrap();
        assert_eq!(out, "news great win today");
    }

    #[test]
    fn test_entity_table_keeps_swapped_angle_brackets() {
        assert_eq!(translate_html_entities("a &lt; b &gt; c"), "a > b < c");
        assert_eq!(translate_html_entities("don&#39;t &amp; won\u{2019}t"), "don't & won't");
    }

    #[test]
    fn test_entity_table_folds_smart_punctuation() {
        assert_eq!(translate_html_entities("\u{201c}a\u{201d} \u{2014}"), "\"a\" --");
        assert_eq!(translate_html_entities("\u{2018}b\u{2019} \u{2013} \u{00b4}"), "'b' -- '");
    }

    #[test]
    fn test_hide_urls() {
        assert_eq!(
            hide_urls("see http://x.com/a?b=1 now").unwrap(),
            "see 'http' now"
        );
    }
}
