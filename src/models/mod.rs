// Sentiscope Data Models
// Shared types for dictionary entries and classification results

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Confidence reported when no decision could be reached.
pub const NO_DECISION_CONFIDENCE: i32 = -1;

// ============ Content Type ============

/// Kind of text being classified. Dictionary phrases are tagged with the
/// content type they were derived from and only match inputs of that type.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    #[default]
    Regular,
    Twitter,
}

impl ContentType {
    /// Dictionary file tag (`re` / `tw`).
    pub fn tag(self) -> &'static str {
        match self {
            ContentType::Regular => "re",
            ContentType::Twitter => "tw",
        }
    }

    /// Relevance and neutral cutoffs used when the configuration leaves them unset.
    pub fn default_cutoffs(self) -> (f32, f32) {
        match self {
            ContentType::Regular => (1.0, 5.0),
            ContentType::Twitter => (1.0, 5.0),
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContentType::Regular => f.write_str("regular"),
            ContentType::Twitter => f.write_str("twitter"),
        }
    }
}

impl FromStr for ContentType {
    type Err = String;

    fn from_str(val: &str) -> Result<Self, Self::Err> {
        match val.trim().to_lowercase().as_str() {
            "regular" | "re" | "r" => Ok(Self::Regular),
            "twitter" | "tweet" | "tw" | "t" => Ok(Self::Twitter),
            other => Err(format!("invalid classification type: '{}'", other)),
        }
    }
}

// ============ Dictionary Entry ============

#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub struct FeatureEntry {
    /// Signed composite score of the phrase.
    pub score: i32,
    /// Magnitude used for cutoff filtering, `|score|`.
    pub relevance: i32,
}

impl FeatureEntry {
    pub fn from_score(score: i32) -> Self {
        Self {
            score,
            relevance: score.saturating_abs(),
        }
    }
}

// ============ Decision ============

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Decision {
    /// 1: positive; 0: neutral; -1: negative
    pub decision: i8,
    pub raw_score: i64,
    /// 1..=100, or -1 when no decision was reached
    pub confidence: i32,
    pub normalized_content: String,
    pub matched_features: Vec<String>,
}

impl Default for Decision {
    fn default() -> Self {
        Self {
            decision: 0,
            raw_score: 0,
            confidence: NO_DECISION_CONFIDENCE,
            normalized_content: String::new(),
            matched_features: Vec::new(),
        }
    }
}

impl Decision {
    pub fn is_decided(&self) -> bool {
        self.confidence != NO_DECISION_CONFIDENCE
    }

    pub fn label(&self) -> &'static str {
        match self.decision {
            1 => "positive",
            -1 => "negative",
            _ => "neutral",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_type_parse() {
        assert_eq!("tw".parse::<ContentType>().unwrap(), ContentType::Twitter);
        assert_eq!("Regular".parse::<ContentType>().unwrap(), ContentType::Regular);
        assert!("news".parse::<ContentType>().is_err());
    }

    #[test]
    fn test_feature_entry_relevance() {
        let entry = FeatureEntry::from_score(-450);
        assert_eq!(entry.score, -450);
        assert_eq!(entry.relevance, 450);
    }

    #[test]
    fn test_decision_serialization() {
        let decision = Decision {
            decision: 1,
            raw_score: 900,
            confidence: 62,
            normalized_content: "great day".to_string(),
            matched_features: vec!["great day".to_string()],
        };
        let json = serde_json::to_string(&decision).unwrap();
        assert!(json.contains("\"rawScore\":900"));
        assert!(json.contains("\"matchedFeatures\""));
        let parsed: Decision = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, decision);
        assert_eq!(Decision::default().label(), "neutral");
        assert!(!Decision::default().is_decided());
    }
}
