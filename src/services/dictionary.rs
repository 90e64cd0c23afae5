// Phrase Dictionary
// Immutable phrase -> score table keyed by content type

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{info, warn};

use crate::models::{ContentType, FeatureEntry};

#[derive(Error, Debug)]
pub enum DictionaryError {
    #[error("Failed to open features file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Malformed feature record at line {line}: {reason}")]
    Malformed { line: usize, reason: String },
}

/// Phrase table loaded once from a feature file.
///
/// Regular and tweet phrases live in separate maps so lookups take the
/// joined n-gram by reference without building a composite key.
#[derive(Debug, Clone, Default)]
pub struct PhraseDictionary {
    regular: HashMap<String, FeatureEntry>,
    twitter: HashMap<String, FeatureEntry>,
}

impl PhraseDictionary {
    /// Build from `(phrase, content type, score)` triples. Later duplicates win.
    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, ContentType, i32)>,
        S: Into<String>,
    {
        let mut dict = Self::default();
        for (phrase, content_type, score) in entries {
            dict.table_mut(content_type)
                .insert(phrase.into(), FeatureEntry::from_score(score));
        }
        dict
    }

    /// Load a feature file: one `phrase<TAB>score[ tag]` record per line.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DictionaryError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| DictionaryError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let dict = Self::parse(&content)?;
        info!(
            path = %path.display(),
            regular = dict.regular.len(),
            twitter = dict.twitter.len(),
            "dictionary.loaded"
        );
        Ok(dict)
    }

    pub fn parse(content: &str) -> Result<Self, DictionaryError> {
        let mut dict = Self::default();

        for (idx, raw) in content.lines().enumerate() {
            let line = idx + 1;
            if raw.trim().is_empty() {
                continue;
            }

            let (phrase, entry) = raw.split_once('\t').ok_or_else(|| DictionaryError::Malformed {
                line,
                reason: "missing tab between phrase and score".to_string(),
            })?;

            let mut fields = entry.split_whitespace();
            let score_field = fields.next().ok_or_else(|| DictionaryError::Malformed {
                line,
                reason: "missing score".to_string(),
            })?;
            let score: i32 = score_field.parse().map_err(|_| DictionaryError::Malformed {
                line,
                reason: format!("score '{}' is not an integer", score_field),
            })?;

            let content_type = match fields.next() {
                None | Some("re") => ContentType::Regular,
                Some("tw") => ContentType::Twitter,
                Some(other) => {
                    warn!(line, tag = other, "unknown feature type tag, treating as regular");
                    ContentType::Regular
                }
            };

            dict.table_mut(content_type)
                .insert(phrase.to_string(), FeatureEntry::from_score(score));
        }

        Ok(dict)
    }

    pub fn get(&self, phrase: &str, content_type: ContentType) -> Option<&FeatureEntry> {
        self.table(content_type).get(phrase)
    }

    pub fn len(&self) -> usize {
        self.regular.len() + self.twitter.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn table(&self, content_type: ContentType) -> &HashMap<String, FeatureEntry> {
        match content_type {
            ContentType::Regular => &self.regular,
            ContentType::Twitter => &self.twitter,
        }
    }

    fn table_mut(&mut self, content_type: ContentType) -> &mut HashMap<String, FeatureEntry> {
        match content_type {
            ContentType::Regular => &mut self.regular,
            ContentType::Twitter => &mut self.twitter,
        }
    }
}
