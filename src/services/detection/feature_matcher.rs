// Greedy Feature Matcher
// Longest-match n-gram extraction against the phrase dictionary

use std::collections::BTreeMap;

use tracing::debug;

use crate::models::ContentType;
use crate::services::dictionary::PhraseDictionary;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchedSpan {
    pub phrase: String,
    /// Index of the first covered token.
    pub start: usize,
    /// Number of covered tokens.
    pub len: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchSet {
    pub spans: Vec<MatchedSpan>,
}

impl MatchSet {
    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    /// Occurrence count per distinct phrase, ordered by phrase.
    pub fn counts(&self) -> BTreeMap<&str, usize> {
        let mut counts = BTreeMap::new();
        for span in &self.spans {
            *counts.entry(span.phrase.as_str()).or_insert(0) += 1;
        }
        counts
    }
}

/// A scored section: summed contribution plus one feature entry per distinct phrase.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeatureScore {
    pub raw_score: i64,
    pub features: Vec<String>,
}

/// Split normalized text on spaces, keeping only the most recent `max_tokens`.
pub fn tokenize(content: &str, max_tokens: usize) -> Vec<&str> {
    let tokens: Vec<&str> = content.split(' ').filter(|t| !t.is_empty()).collect();
    if tokens.len() > max_tokens {
        tokens[tokens.len() - max_tokens..].to_vec()
    } else {
        tokens
    }
}

/// Scan left to right, taking at each position the longest n-gram (up to
/// `max_ngram` tokens) whose relevance exceeds `relevance_cutoff`.
/// Matched spans never overlap.
pub fn match_features(
    tokens: &[&str],
    dictionary: &PhraseDictionary,
    content_type: ContentType,
    relevance_cutoff: i32,
    max_ngram: usize,
) -> MatchSet {
    let mut spans = Vec::new();
    let mut i = 0;

    while i < tokens.len() {
        let longest = max_ngram.min(tokens.len() - i);
        let hit = (1..=longest).rev().find_map(|s| {
            let phrase = tokens[i..i + s].join(" ");
            match dictionary.get(&phrase, content_type) {
                Some(entry) if entry.relevance > relevance_cutoff => Some((phrase, s)),
                _ => None,
            }
        });

        match hit {
            Some((phrase, s)) => {
                spans.push(MatchedSpan { phrase, start: i, len: s });
                i += s;
            }
            None => i += 1,
        }
    }

    MatchSet { spans }
}

/// Sub-linear repetition weighting: `round((1 + log2(count)) * score)`.
pub fn repeated_contribution(count: usize, score: i32) -> i64 {
    if count == 0 {
        return 0;
    }
    ((1.0 + (count as f64).log2()) * f64::from(score)).round() as i64
}

/// Score a match set. Each phrase contributes `weight * repeated_contribution`;
/// with `debug_level > 0` entries read `phrase *count = contribution`.
pub fn score_matches(
    matches: &MatchSet,
    dictionary: &PhraseDictionary,
    content_type: ContentType,
    weight: i64,
    debug_level: u32,
) -> FeatureScore {
    let mut result = FeatureScore::default();

    for (phrase, count) in matches.counts() {
        let Some(entry) = dictionary.get(phrase, content_type) else {
            continue;
        };
        let contribution = repeated_contribution(count, entry.score);
        result.raw_score = result.raw_score.saturating_add(weight.saturating_mul(contribution));

        if debug_level > 1 {
            debug!(phrase, count, score = entry.score, contribution, "feature.matched");
        }
        if debug_level > 0 {
            result.features.push(format!("{} *{} = {}", phrase, count, contribution));
        } else {
            result.features.push(phrase.to_string());
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dict() -> PhraseDictionary {
        PhraseDictionary::from_entries([
            ("good", ContentType::Regular, 400),
            ("not good", ContentType::Regular, -600),
            ("not good at all", ContentType::Regular, -900),
            ("weak", ContentType::Regular, 100),
            ("lol", ContentType::Twitter, 350),
        ])
    }

    #[test]
    fn test_longest_match_wins() {
        let d = dict();
        let tokens = tokenize("it is not good", 500);
        let m = match_features(&tokens, &d, ContentType::Regular, 288, 3);
        assert_eq!(m.spans, vec![MatchedSpan { phrase: "not good".to_string(), start: 2, len: 2 }]);
    }

    #[test]
    fn test_ngram_cap_limits_match_length() {
        let d = dict();
        let tokens = tokenize("not good at all", 500);
        let m = match_features(&tokens, &d, ContentType::Regular, 288, 4);
        assert_eq!(m.spans.len(), 1);
        assert_eq!(m.spans[0].phrase, "not good at all");

        let m = match_features(&tokens, &d, ContentType::Regular, 288, 2);
        assert_eq!(m.spans[0].phrase, "not good");
    }

    #[test]
    fn test_spans_do_not_overlap() {
        let d = dict();
        let tokens = tokenize("good not good good not good at all good", 500);
        let m = match_features(&tokens, &d, ContentType::Regular, 288, 7);
        let mut covered = vec![false; tokens.len()];
        for span in &m.spans {
            for slot in &mut covered[span.start..span.start + span.len] {
                assert!(!*slot, "token covered twice");
                *slot = true;
            }
        }
        assert_eq!(m.counts().get("good"), Some(&3));
    }

    #[test]
    fn test_relevance_cutoff_and_content_type() {
        let d = dict();
        let tokens = tokenize("weak lol", 500);
        assert!(match_features(&tokens, &d, ContentType::Regular, 288, 3).is_empty());
        assert_eq!(match_features(&tokens, &d, ContentType::Regular, 50, 3).spans.len(), 1);
        assert_eq!(match_features(&tokens, &d, ContentType::Twitter, 288, 3).spans[0].phrase, "lol");
    }

    #[test]
    fn test_weighted_score_saturates() {
        let d = dict();
        let tokens = tokenize("good good", 500);
        let m = match_features(&tokens, &d, ContentType::Regular, 288, 3);
        let score = score_matches(&m, &d, ContentType::Regular, i64::MAX / 2, 0);
        assert_eq!(score.raw_score, i64::MAX);
        assert_eq!(score.features, vec!["good"]);
    }

    #[test]
    fn test_repetition_scaling() {
        assert_eq!(repeated_contribution(1, 288), 288);
        assert_eq!(repeated_contribution(2, 288), 576);
        assert_eq!(repeated_contribution(4, 288), 864);
        assert!(repeated_contribution(3, 288) < 3 * 288);
        assert_eq!(repeated_contribution(2, -400), -800);
    }

    #[test]
    fn test_tokenize_keeps_most_recent_tokens() {
        let content = format!("good {}", vec!["filler"; 600].join(" "));
        let tokens = tokenize(&content, 500);
        assert_eq!(tokens.len(), 500);
        assert!(!tokens.contains(&"good"));
        assert!(tokenize("", 500).is_empty());
    }

    #[test]
    fn test_score_matches_weight_and_debug_format() {
        let d = dict();
        let tokens = tokenize("good good not good", 500);
        let m = match_features(&tokens, &d, ContentType::Regular, 288, 3);

        let plain = score_matches(&m, &d, ContentType::Regular, 3, 0);
        assert_eq!(plain.raw_score, 3 * (800 - 600));
        assert_eq!(plain.features, vec!["good", "not good"]);

        let verbose = score_matches(&m, &d, ContentType::Regular, 1, 1);
        assert_eq!(verbose.features, vec!["good *2 = 800", "not good *1 = -600"]);
    }
}
