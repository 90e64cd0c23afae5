// Sentiscope Core Services

pub mod text_processor;
pub mod sentence_segmenter;
pub mod dictionary;
pub mod config_store;
pub mod input_records;
pub mod detection;

pub use text_processor::*;
pub use sentence_segmenter::*;
pub use dictionary::*;
pub use config_store::*;

// Re-export detection module entry points
pub use detection::{
    derive_confidence,
    derive_decision,
    match_features,
    ClassifyError,
    SentimentClassifier,
};
