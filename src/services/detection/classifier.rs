// Sentiment Classifier
// Entry points combining normalization, phrase matching, signals and fusion

use std::path::Path;
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, warn};

use crate::models::{ContentType, Decision};
use crate::services::config_store::ClassifierConfig;
use crate::services::dictionary::PhraseDictionary;
use crate::services::sentence_segmenter::{prepare_for_split, split_sentences};
use crate::services::text_processor::{normalize_content, normalize_tweet, normalize_url, NormalizeError};

use super::aggregation::PartialScore;
use super::feature_matcher::{match_features, score_matches, tokenize};
use super::signals::{emoticon_signal, exclamation_signal, question_mark_signal, tweet_question_mark_signal};

#[derive(Error, Debug)]
pub enum ClassifyError {
    #[error("classifier not initialized: {0}")]
    NotInitialized(String),
    #[error("normalization failed: {0}")]
    Normalization(#[from] NormalizeError),
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("no decision could be reached")]
    NoDecisionReached(Box<Decision>),
}

impl ClassifyError {
    /// True when the input simply carried no evidence, as opposed to a fault.
    pub fn is_no_decision(&self) -> bool {
        matches!(self, ClassifyError::NoDecisionReached(_))
    }

    /// The neutral, evidence-free decision attached to a no-decision outcome.
    pub fn decision(&self) -> Option<&Decision> {
        match self {
            ClassifyError::NoDecisionReached(decision) => Some(decision),
            _ => None,
        }
    }
}

/// Dictionary-driven sentiment classifier.
///
/// The dictionary is loaded once and never mutated; classification takes
/// `&self` and keeps all per-call state local, so one instance can be shared
/// across threads.
#[derive(Debug, Clone)]
pub struct SentimentClassifier {
    dictionary: Option<Arc<PhraseDictionary>>,
    config: ClassifierConfig,
    init_error: Option<String>,
}

impl SentimentClassifier {
    pub fn new(dictionary: Arc<PhraseDictionary>, config: ClassifierConfig) -> Self {
        Self {
            dictionary: Some(dictionary),
            config,
            init_error: None,
        }
    }

    /// Load the feature file. A load failure does not panic or return early:
    /// it leaves the classifier uninitialized, see [`Self::inited`].
    pub fn open(features_file: impl AsRef<Path>, config: ClassifierConfig) -> Self {
        match PhraseDictionary::load(features_file) {
            Ok(dictionary) => Self::new(Arc::new(dictionary), config),
            Err(e) => {
                warn!(error = %e, "dictionary.load_failed");
                Self {
                    dictionary: None,
                    config,
                    init_error: Some(e.to_string()),
                }
            }
        }
    }

    pub fn inited(&self) -> bool {
        self.dictionary.is_some()
    }

    /// Message of the initialization failure, if any.
    pub fn last_error(&self) -> Option<&str> {
        self.init_error.as_deref()
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: ClassifierConfig) {
        self.config = config;
    }

    pub fn dictionary(&self) -> Option<&PhraseDictionary> {
        self.dictionary.as_deref()
    }

    /// Classify a single piece of content.
    ///
    /// Regular content is split into sentences which are scored independently;
    /// tweets are scored whole. Enabled auxiliary signals (emoticons,
    /// exclamation points, question marks) are then added from the raw text.
    pub fn classify(&self, content: &str, content_type: ContentType) -> Result<Decision, ClassifyError> {
        let dictionary = self.ready()?;
        let cutoffs = self.config.cutoffs(content_type);
        let scale = self.config.scoring.scale;
        let debug_level = self.config.debug_level;

        let mut partial = self.score_text(dictionary, content, content_type, 1, cutoffs.relevance)?;

        if self.config.use_emoticons {
            if let Some(signal) = emoticon_signal(content, self.config.scoring.emoticon_weight) {
                partial.add_signal(signal);
            }
        }

        if self.config.use_exclamation_points {
            if let Some(signal) = exclamation_signal(content, scale, debug_level) {
                partial.add_signal(signal);
            }
        }

        if self.config.use_question_marks {
            let signal = match content_type {
                ContentType::Regular => question_mark_signal(content, scale, debug_level)?,
                ContentType::Twitter => tweet_question_mark_signal(content, scale, debug_level)?,
            };
            if let Some(signal) = signal {
                partial.add_signal(signal);
            }
        }

        conclude(partial.finalize(cutoffs.neutral))
    }

    /// Classify an article by title, body and URL. Each section is scored
    /// independently and weighted (title 3, body 1, url 1 by default); the
    /// fused score is their weighted sum. Auxiliary signals are not used.
    pub fn classify_sections(
        &self,
        title: &str,
        body: &str,
        url: &str,
        content_type: ContentType,
    ) -> Result<Decision, ClassifyError> {
        let dictionary = self.ready()?;
        let cutoffs = self.config.cutoffs(content_type);
        let weights = &self.config.scoring;

        let mut partial = PartialScore::default();
        partial.merge(self.score_text(dictionary, title, content_type, weights.title_weight, cutoffs.relevance)?);
        partial.merge(self.score_text(dictionary, body, content_type, weights.body_weight, cutoffs.relevance)?);

        let nurl = if self.config.pre_normalized {
            url.to_string()
        } else {
            normalize_url(url)?
        };
        partial.merge(self.score_normalized(dictionary, &nurl, content_type, weights.url_weight, cutoffs.relevance));

        conclude(partial.finalize(cutoffs.neutral))
    }

    fn ready(&self) -> Result<&PhraseDictionary, ClassifyError> {
        let dictionary = self.dictionary.as_deref().ok_or_else(|| {
            ClassifyError::NotInitialized(
                self.init_error
                    .clone()
                    .unwrap_or_else(|| "no dictionary loaded".to_string()),
            )
        })?;
        self.config
            .validate()
            .map_err(ClassifyError::InvalidConfiguration)?;
        Ok(dictionary)
    }

    fn score_text(
        &self,
        dictionary: &PhraseDictionary,
        text: &str,
        content_type: ContentType,
        weight: i64,
        relevance_cutoff: i32,
    ) -> Result<PartialScore, ClassifyError> {
        match content_type {
            ContentType::Regular => {
                let prepared = prepare_for_split(text)?;
                let mut partial = PartialScore::default();
                for sentence in split_sentences(&prepared) {
                    let normalized = if self.config.pre_normalized {
                        sentence.trim().to_string()
                    } else {
                        normalize_content(sentence)?
                    };
                    partial.merge(self.score_normalized(dictionary, &normalized, content_type, weight, relevance_cutoff));
                }
                Ok(partial)
            }
            ContentType::Twitter => {
                let normalized = if self.config.pre_normalized {
                    text.to_string()
                } else {
                    normalize_tweet(text)?
                };
                Ok(self.score_normalized(dictionary, &normalized, content_type, weight, relevance_cutoff))
            }
        }
    }

    fn score_normalized(
        &self,
        dictionary: &PhraseDictionary,
        normalized: &str,
        content_type: ContentType,
        weight: i64,
        relevance_cutoff: i32,
    ) -> PartialScore {
        let mut partial = PartialScore::default();
        if normalized.is_empty() {
            return partial;
        }

        let tokens = tokenize(normalized, self.config.scoring.max_tokens);
        let matches = match_features(
            &tokens,
            dictionary,
            content_type,
            relevance_cutoff,
            self.config.max_feature_size,
        );
        if self.config.debug_level > 1 {
            debug!(content = normalized, matched = matches.spans.len(), "section.scored");
        }

        partial.add_features(score_matches(&matches, dictionary, content_type, weight, self.config.debug_level));
        partial.content.push(normalized.to_string());
        partial
    }
}

fn conclude(decision: Decision) -> Result<Decision, ClassifyError> {
    if decision.matched_features.is_empty() {
        Err(ClassifyError::NoDecisionReached(Box::new(decision)))
    } else {
        Ok(decision)
    }
}
