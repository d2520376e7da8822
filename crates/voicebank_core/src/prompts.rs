//! crates/voicebank_core/src/prompts.rs
//!
//! Loads the prompt collection from a CSV file at startup and exposes
//! uniform random selection over it.

use crate::domain::Prompt;
use rand::Rng;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// The CSV column that carries the prompt text. Any other columns are kept
/// as free-form extras on the loaded `Prompt`.
pub const PHRASE_COLUMN: &str = "phrase";

/// Errors that can occur while loading the prompt file.
#[derive(Debug, thiserror::Error)]
pub enum PromptError {
    /// The prompt file does not exist. The caller is expected to log this
    /// and continue with an empty store; it is a degradation, not a fatal
    /// condition.
    #[error("Prompt file not found: {0}")]
    ResourceMissing(PathBuf),
    /// The file exists but has no `phrase` column in its header row.
    #[error("Prompt file {0} has no '{PHRASE_COLUMN}' column")]
    MissingColumn(PathBuf),
    /// The file exists but could not be parsed as CSV.
    #[error("Prompt file unreadable: {0}")]
    Malformed(#[from] csv::Error),
}

/// Returned by [`PromptStore::pick_random`] when no prompts were loaded.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
#[error("No prompts available")]
pub struct EmptyStore;

/// An immutable, in-memory collection of prompts.
#[derive(Debug, Default)]
pub struct PromptStore {
    prompts: Vec<Prompt>,
}

impl PromptStore {
    /// Reads the prompt CSV at `path`. Executed once at startup.
    ///
    /// Rows whose `phrase` value is blank are skipped. Columns other than
    /// `phrase` become `Prompt::extras`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, PromptError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(PromptError::ResourceMissing(path.to_path_buf()));
        }

        let mut reader = csv::Reader::from_path(path)?;
        let headers = reader.headers()?.clone();
        let phrase_idx = headers
            .iter()
            .position(|h| h == PHRASE_COLUMN)
            .ok_or_else(|| PromptError::MissingColumn(path.to_path_buf()))?;

        let mut prompts = Vec::new();
        for row in reader.records() {
            let row = row?;
            let text = row.get(phrase_idx).unwrap_or("").trim();
            if text.is_empty() {
                continue;
            }
            let extras: BTreeMap<String, String> = headers
                .iter()
                .zip(row.iter())
                .filter(|(header, _)| *header != PHRASE_COLUMN)
                .map(|(header, value)| (header.to_string(), value.to_string()))
                .collect();
            prompts.push(Prompt {
                text: text.to_string(),
                extras,
            });
        }

        Ok(Self { prompts })
    }

    /// An empty store, used when the prompt file is absent.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builds a store from prompts already in memory.
    pub fn from_prompts(prompts: Vec<Prompt>) -> Self {
        Self { prompts }
    }

    /// Returns a uniformly random prompt, with replacement; repeats across
    /// calls are allowed and expected.
    pub fn pick_random(&self) -> Result<&Prompt, EmptyStore> {
        if self.prompts.is_empty() {
            return Err(EmptyStore);
        }
        let idx = rand::thread_rng().gen_range(0..self.prompts.len());
        Ok(&self.prompts[idx])
    }

    pub fn len(&self) -> usize {
        self.prompts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prompts.is_empty()
    }

    pub fn prompts(&self) -> &[Prompt] {
        &self.prompts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn prompt_file(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn loads_rows_and_extras() {
        let file = prompt_file("phrase,dialect\nhello there,northern\ngood morning,coastal\n");
        let store = PromptStore::load(file.path()).unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(store.prompts()[0].text, "hello there");
        assert_eq!(
            store.prompts()[0].extras.get("dialect").map(String::as_str),
            Some("northern")
        );
    }

    #[test]
    fn skips_blank_phrase_rows() {
        let file = prompt_file("phrase\nfirst\n\n   \nsecond\n");
        let store = PromptStore::load(file.path()).unwrap();
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn missing_file_is_resource_missing() {
        let err = PromptStore::load("/definitely/not/here.csv").unwrap_err();
        assert!(matches!(err, PromptError::ResourceMissing(_)));
    }

    #[test]
    fn missing_phrase_column_is_rejected() {
        let file = prompt_file("sentence\nhello\n");
        let err = PromptStore::load(file.path()).unwrap_err();
        assert!(matches!(err, PromptError::MissingColumn(_)));
    }

    #[test]
    fn pick_random_is_a_member_of_the_loaded_set() {
        let store = PromptStore::from_prompts(vec![
            Prompt::new("one"),
            Prompt::new("two"),
            Prompt::new("three"),
        ]);
        for _ in 0..50 {
            let picked = store.pick_random().unwrap();
            assert!(store.prompts().contains(picked));
        }
    }

    #[test]
    fn pick_random_over_empty_store_fails() {
        assert_eq!(PromptStore::empty().pick_random().unwrap_err(), EmptyStore);
    }
}
