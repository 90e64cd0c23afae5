// Aggregation Logic
// Fuses section and sentence scores into a final decision

use crate::models::{Decision, NO_DECISION_CONFIDENCE};

use super::feature_matcher::FeatureScore;
use super::signals::Signal;

const CONFIDENCE_BASE: i64 = 50;
const CONFIDENCE_DIVISOR: i64 = 70;

/// Signed decision: `sign(raw_score)`, forced neutral when `|raw_score| < neutral_threshold`.
pub fn derive_decision(raw_score: i64, neutral_threshold: i64) -> i8 {
    if raw_score == 0 || raw_score.saturating_abs() < neutral_threshold {
        0
    } else if raw_score > 0 {
        1
    } else {
        -1
    }
}

/// `50 + raw_score / 70`, clamped to `1..=100`.
pub fn derive_confidence(raw_score: i64) -> i32 {
    (CONFIDENCE_BASE + raw_score / CONFIDENCE_DIVISOR).clamp(1, 100) as i32
}

/// Evidence gathered over one or more passes (sentences, sections, signals)
/// before thresholding.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartialScore {
    pub raw_score: i64,
    pub features: Vec<String>,
    /// Normalized text of every pass that produced tokens.
    pub content: Vec<String>,
}

impl PartialScore {
    pub fn add_features(&mut self, score: FeatureScore) {
        self.raw_score = self.raw_score.saturating_add(score.raw_score);
        self.features.extend(score.features);
    }

    pub fn add_signal(&mut self, signal: Signal) {
        self.raw_score = self.raw_score.saturating_add(signal.contribution);
        self.features.push(signal.feature);
    }

    pub fn merge(&mut self, other: PartialScore) {
        self.raw_score = self.raw_score.saturating_add(other.raw_score);
        self.features.extend(other.features);
        self.content.extend(other.content);
    }

    pub fn has_evidence(&self) -> bool {
        !self.features.is_empty()
    }

    /// Threshold the accumulated score. Without evidence the decision stays
    /// neutral and carries the no-decision confidence.
    pub fn finalize(self, neutral_threshold: i64) -> Decision {
        let normalized_content = self.content.join(" ;; ");

        if !self.has_evidence() {
            return Decision {
                decision: 0,
                raw_score: self.raw_score,
                confidence: NO_DECISION_CONFIDENCE,
                normalized_content,
                matched_features: self.features,
            };
        }

        Decision {
            decision: derive_decision(self.raw_score, neutral_threshold),
            raw_score: self.raw_score,
            confidence: derive_confidence(self.raw_score),
            normalized_content,
            matched_features: self.features,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_decision_threshold_is_strict() {
        assert_eq!(derive_decision(288, 288), 1);
        assert_eq!(derive_decision(-288, 288), -1);
        assert_eq!(derive_decision(287, 288), 0);
        assert_eq!(derive_decision(-287, 288), 0);
        assert_eq!(derive_decision(0, 0), 0);
        assert_eq!(derive_decision(1, 0), 1);
        assert_eq!(derive_decision(i64::MIN, 1440), -1);
    }

    #[test]
    fn test_decision_matches_sign_above_threshold() {
        let threshold = 1440;
        for raw in (-5000..=5000).step_by(37) {
            let d = derive_decision(raw, threshold);
            if raw.abs() >= threshold {
                assert_eq!(i64::from(d), raw.signum());
            } else {
                assert_eq!(d, 0);
            }
        }
    }

    #[test]
    fn test_confidence_is_clamped() {
        assert_eq!(derive_confidence(0), 50);
        assert_eq!(derive_confidence(-600), 42);
        assert_eq!(derive_confidence(1000), 64);
        assert_eq!(derive_confidence(1_000_000), 100);
        assert_eq!(derive_confidence(-1_000_000), 1);
        for raw in (-10_000..=10_000).step_by(101) {
            let c = derive_confidence(raw);
            assert!((1..=100).contains(&c));
        }
    }

    #[test]
    fn test_finalize_without_evidence() {
        let decision = PartialScore::default().finalize(288);
        assert_eq!(decision.decision, 0);
        assert_eq!(decision.confidence, NO_DECISION_CONFIDENCE);
        assert!(decision.matched_features.is_empty());
    }

    #[test]
    fn test_merge_concatenates_in_order() {
        let mut total = PartialScore::default();
        total.merge(PartialScore {
            raw_score: 900,
            features: vec!["great".to_string()],
            content: vec!["great title".to_string()],
        });
        total.add_signal(Signal { contribution: -100, feature: "?".to_string() });
        total.merge(PartialScore {
            raw_score: -200,
            features: vec!["meh".to_string()],
            content: vec!["meh body".to_string()],
        });

        let decision = total.finalize(288);
        assert_eq!(decision.raw_score, 600);
        assert_eq!(decision.decision, 1);
        assert_eq!(decision.matched_features, vec!["great", "?", "meh"]);
        assert_eq!(decision.normalized_content, "great title ;; meh body");
    }
}
