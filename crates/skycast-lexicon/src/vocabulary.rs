// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{RwLock, RwLockWriteGuard};
use thiserror::Error;

pub const SITUATIONAL: &str = "situational";
pub const RECOMMENDATION: &str = "recommendation";
pub const LOCATION: &str = "location";
pub const WEATHER: &str = "weather";

const DEFAULT_SITUATIONAL: &[&str] = &[
    "where",
    "best place",
    "worst place",
    "should go",
    "can go",
    "where to",
    "recommend me",
];

const DEFAULT_WEATHER: &[&str] = &["weather", "temperature", "forecast", "rain", "sunny"];

const DEFAULT_RECOMMENDATION: &[&str] = &[
    "best",
    "top",
    "recommend",
    "suggest",
    "favorite",
    "popular",
];

const DEFAULT_LOCATION: &[&str] = &[
    "beach", "coast", "shore", "seaside", "ocean", "sea", "coastal", "mountain", "peak",
    "summit", "hill", "alpine", "hiking", "climbing", "city", "town", "urban",
    "metropolitan", "downtown", "capital", "village", "resort", "park", "forest", "lake",
    "river", "island", "peninsula", "valley", "desert", "canyon", "volcano", "glacier",
    "waterfall", "cave", "monument", "landmark", "attraction", "destination",
];

/// Trigger phrases grouped by category. Phrases are stored lowercased so
/// membership is case-insensitive and duplicates collapse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Vocabulary {
    categories: BTreeMap<String, BTreeSet<String>>,
}

impl Default for Vocabulary {
    fn default() -> Self {
        let mut vocabulary = Self::empty();
        for (category, phrases) in [
            (SITUATIONAL, DEFAULT_SITUATIONAL),
            (WEATHER, DEFAULT_WEATHER),
            (RECOMMENDATION, DEFAULT_RECOMMENDATION),
            (LOCATION, DEFAULT_LOCATION),
        ] {
            vocabulary.extend(category, phrases.iter().copied());
        }
        vocabulary
    }
}

impl Vocabulary {
    pub fn empty() -> Self {
        Self {
            categories: BTreeMap::new(),
        }
    }

    pub fn phrases(&self, category: &str) -> impl Iterator<Item = &str> {
        self.categories
            .get(&normalize(category))
            .into_iter()
            .flat_map(|set| set.iter().map(String::as_str))
    }

    pub fn contains(&self, category: &str, phrase: &str) -> bool {
        self.categories
            .get(&normalize(category))
            .is_some_and(|set| set.contains(&normalize(phrase)))
    }

    /// True when any phrase of `category` occurs in `text_lower` as whole words.
    pub fn matches(&self, category: &str, text_lower: &str) -> bool {
        self.phrases(category)
            .any(|phrase| contains_phrase(text_lower, phrase))
    }

    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.categories.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.categories.values().map(BTreeSet::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Set union of `phrases` into `category`; returns how many were new.
    pub fn extend<'a>(&mut self, category: &str, phrases: impl IntoIterator<Item = &'a str>) -> usize {
        let category = normalize(category);
        if category.is_empty() {
            return 0;
        }
        let set = self.categories.entry(category).or_default();
        let mut added = 0;
        for phrase in phrases {
            let phrase = normalize(phrase);
            if !phrase.is_empty() && set.insert(phrase) {
                added += 1;
            }
        }
        added
    }

    /// Unions every category of `updates` into `self`.
    pub fn union(&mut self, updates: &BTreeMap<String, Vec<String>>) -> usize {
        updates
            .iter()
            .map(|(category, phrases)| self.extend(category, phrases.iter().map(String::as_str)))
            .sum()
    }

    fn absorb(&mut self, other: &Vocabulary) -> usize {
        other
            .categories
            .iter()
            .map(|(category, phrases)| self.extend(category, phrases.iter().map(String::as_str)))
            .sum()
    }
}

/// Whole-word containment, allowing a plural "s"/"es": `phrase` must not be
/// glued to other letters or digits ("lake" matches "lakes" and "lake,"
/// but "where" never matches "nowhere").
pub fn contains_phrase(text: &str, phrase: &str) -> bool {
    if phrase.is_empty() {
        return false;
    }
    let ends_word = |rest: &str| !rest.chars().next().is_some_and(char::is_alphanumeric);
    text.match_indices(phrase).any(|(at, _)| {
        let before = text[..at].chars().next_back();
        if before.is_some_and(char::is_alphanumeric) {
            return false;
        }
        let rest = &text[at + phrase.len()..];
        ends_word(rest)
            || rest.strip_prefix("es").is_some_and(ends_word)
            || rest.strip_prefix('s').is_some_and(ends_word)
    })
}

fn normalize(s: &str) -> String {
    s.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

#[derive(Error, Debug)]
pub enum VocabularyError {
    #[error("IO error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid vocabulary file {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Result of a best-effort write. Callers may log it; nothing has to handle it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Persistence {
    Saved(PathBuf),
    Unchanged,
    Failed(String),
}

impl Persistence {
    pub fn is_saved(&self) -> bool {
        matches!(self, Persistence::Saved(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeReport {
    pub added: usize,
    pub persistence: Persistence,
}

/// The shared, persisted vocabulary. Readers take snapshots; writers merge.
///
/// Merges within one process are serialised by the lock. Two processes
/// writing the same file can still lose each other's additions.
#[derive(Debug)]
pub struct VocabularyStore {
    path: PathBuf,
    inner: RwLock<Vocabulary>,
}

impl VocabularyStore {
    /// Platform default location, e.g. `~/.config/skycast/vocabulary.json`.
    pub fn default_path() -> PathBuf {
        ProjectDirs::from("org", "skycast", "skycast")
            .map(|dirs| dirs.config_dir().join("vocabulary.json"))
            .unwrap_or_else(|| PathBuf::from("vocabulary.json"))
    }

    /// Loads the persisted vocabulary, or the built-in defaults when the file
    /// is missing or unreadable. Never fails.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let vocabulary = match read_vocabulary(&path) {
            Ok(Some(vocabulary)) => {
                log::debug!(
                    "[Vocabulary] Loaded {} phrases from {:?}",
                    vocabulary.len(),
                    path
                );
                vocabulary
            }
            Ok(None) => {
                log::debug!("[Vocabulary] No vocabulary file at {:?}, using defaults", path);
                Vocabulary::default()
            }
            Err(e) => {
                log::warn!("[Vocabulary] Ignoring unreadable file: {}", e);
                Vocabulary::default()
            }
        };
        Self {
            path,
            inner: RwLock::new(vocabulary),
        }
    }

    pub fn in_memory(vocabulary: Vocabulary, path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            inner: RwLock::new(vocabulary),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn snapshot(&self) -> Vocabulary {
        match self.inner.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Unions whatever is on disk into memory. Phrases are only ever added.
    pub fn refresh(&self) -> usize {
        let on_disk = match read_vocabulary(&self.path) {
            Ok(Some(vocabulary)) => vocabulary,
            Ok(None) => return 0,
            Err(e) => {
                log::debug!("[Vocabulary] Refresh skipped: {}", e);
                return 0;
            }
        };
        let added = self.lock_for_write().absorb(&on_disk);
        if added > 0 {
            log::debug!("[Vocabulary] Refresh picked up {} phrases", added);
        }
        added
    }

    pub fn save(&self) -> Persistence {
        let guard = self.lock_for_write();
        self.write(&guard)
    }

    /// Set-unions `updates` into the store and persists the result.
    /// Merging the same updates twice leaves the store unchanged.
    ///
    /// The file is written while the lock is held, so concurrent merges reach
    /// the disk in the same order they reach memory.
    pub fn merge(&self, updates: &BTreeMap<String, Vec<String>>) -> MergeReport {
        let mut guard = self.lock_for_write();
        let added = guard.union(updates);

        let persistence = if added == 0 {
            Persistence::Unchanged
        } else {
            log::info!(
                "[Vocabulary] Merged {} new phrases across {} categories",
                added,
                updates.len()
            );
            self.write(&guard)
        };

        MergeReport { added, persistence }
    }

    fn lock_for_write(&self) -> RwLockWriteGuard<'_, Vocabulary> {
        match self.inner.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn write(&self, vocabulary: &Vocabulary) -> Persistence {
        match write_vocabulary(&self.path, vocabulary) {
            Ok(()) => {
                log::debug!("[Vocabulary] Saved to {:?}", self.path);
                Persistence::Saved(self.path.clone())
            }
            Err(e) => {
                log::warn!("[Vocabulary] Save failed: {}", e);
                Persistence::Failed(e.to_string())
            }
        }
    }
}

fn read_vocabulary(path: &Path) -> Result<Option<Vocabulary>, VocabularyError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path).map_err(|source| VocabularyError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let raw: BTreeMap<String, Vec<String>> =
        serde_json::from_str(&content).map_err(|source| VocabularyError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
    let mut vocabulary = Vocabulary::empty();
    vocabulary.union(&raw);
    Ok(Some(vocabulary))
}

fn write_vocabulary(path: &Path, vocabulary: &Vocabulary) -> Result<(), VocabularyError> {
    let io_error = |source| VocabularyError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(io_error)?;
        }
    }
    let content =
        serde_json::to_string_pretty(vocabulary).map_err(|source| VocabularyError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
    fs::write(path, content).map_err(io_error)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn updates(pairs: &[(&str, &[&str])]) -> BTreeMap<String, Vec<String>> {
        pairs
            .iter()
            .map(|(c, ps)| (c.to_string(), ps.iter().map(|p| p.to_string()).collect()))
            .collect()
    }

    #[test]
    fn test_defaults_cover_all_categories() {
        let v = Vocabulary::default();
        assert!(v.contains(SITUATIONAL, "should go"));
        assert!(v.contains(WEATHER, "forecast"));
        assert!(v.contains(RECOMMENDATION, "best"));
        assert!(v.contains(LOCATION, "glacier"));
    }

    #[test]
    fn test_phrases_are_case_insensitive_and_deduplicated() {
        let mut v = Vocabulary::empty();
        assert_eq!(v.extend("Weather", ["Drizzle", "drizzle", "  DRIZZLE "]), 1);
        assert!(v.contains("weather", "drizzle"));
        assert_eq!(v.len(), 1);
    }

    #[test]
    fn test_phrase_matching_respects_word_boundaries() {
        assert!(contains_phrase("where should i go?", "where"));
        assert!(contains_phrase("where should i go?", "should go"));
        assert!(!contains_phrase("nowhere to be found", "where"));
        assert!(!contains_phrase("bus stop", "top"));
        assert!(contains_phrase("best lakes in austria", "lake"));
        assert!(!contains_phrase("lakeside", "lake"));

        let v = Vocabulary::default();
        assert!(v.matches(SITUATIONAL, "where can i go skiing"));
        assert!(!v.matches(RECOMMENDATION, "please stop the rain"));
    }

    #[test]
    fn test_merge_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = VocabularyStore::load(dir.path().join("vocabulary.json"));
        let k = updates(&[(WEATHER, &["hail", "sleet"]), ("activity", &["skiing"])]);

        let first = store.merge(&k);
        let after_first = store.snapshot();
        let second = store.merge(&k);

        assert_eq!(first.added, 3);
        assert!(first.persistence.is_saved());
        assert_eq!(second.added, 0);
        assert_eq!(second.persistence, Persistence::Unchanged);
        assert_eq!(store.snapshot(), after_first);
        assert!(after_first.contains("activity", "skiing"));
    }

    #[test]
    fn test_save_failure_is_swallowed() {
        let dir = tempfile::tempdir().unwrap();
        // A directory where the file should be makes the write fail.
        let path = dir.path().join("vocabulary.json");
        fs::create_dir_all(&path).unwrap();
        let store = VocabularyStore::in_memory(Vocabulary::default(), &path);

        let report = store.merge(&updates(&[(WEATHER, &["hail"])]));
        assert_eq!(report.added, 1);
        assert!(matches!(report.persistence, Persistence::Failed(_)));
        assert!(store.snapshot().contains(WEATHER, "hail"));
    }

    #[test]
    fn test_concurrent_merges_all_reach_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vocabulary.json");
        let store = VocabularyStore::load(&path);

        std::thread::scope(|scope| {
            for i in 0..8 {
                let store = &store;
                scope.spawn(move || {
                    let phrase = format!("learned phrase {}", i);
                    store.merge(&updates(&[(WEATHER, &[phrase.as_str()])]));
                });
            }
        });

        let on_disk = VocabularyStore::load(&path).snapshot();
        assert_eq!(on_disk, store.snapshot());
        for i in 0..8 {
            assert!(on_disk.contains(WEATHER, &format!("learned phrase {}", i)));
        }
    }

    #[test]
    fn test_corrupt_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vocabulary.json");
        fs::write(&path, "{ not json").unwrap();
        let store = VocabularyStore::load(&path);
        assert_eq!(store.snapshot(), Vocabulary::default());
    }
}
