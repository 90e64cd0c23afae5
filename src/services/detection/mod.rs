// Detection Module
// Sentiment classification core organized into specialized submodules:
// - feature_matcher: Greedy longest-match phrase extraction and repetition scoring
// - signals: Exclamation, question-mark and emoticon scorers on raw text
// - aggregation: Fuses partial scores into a thresholded decision
// - classifier: Single-content and title/body/url entry points

pub mod feature_matcher;
pub mod signals;
pub mod aggregation;
pub mod classifier;

// Re-export commonly used functions
pub use feature_matcher::{
    match_features,
    repeated_contribution,
    score_matches,
    tokenize,
    FeatureScore,
    MatchSet,
    MatchedSpan,
};
pub use signals::{
    emoticon_signal,
    exclamation_signal,
    question_mark_signal,
    tweet_question_mark_signal,
    Signal,
};
pub use aggregation::{derive_confidence, derive_decision, PartialScore};
pub use classifier::{ClassifyError, SentimentClassifier};
