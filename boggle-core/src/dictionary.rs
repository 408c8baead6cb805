use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{info, warn};

use boggle_types::GameError;

use crate::classify::normalize_word;

/// Membership oracle for "is this a real word". Lookups expect normalized
/// (uppercase) text; construction normalizes for callers that load raw
/// word lists.
#[derive(Debug)]
pub struct Dictionary {
    words: HashSet<String>,
}

impl Dictionary {
    /// Build a dictionary from newline-separated words. Blank lines and
    /// `#` comments are skipped.
    pub fn from_word_list(word_list: &str) -> Self {
        let words = word_list
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(normalize_word)
            .collect();
        Self { words }
    }

    pub fn contains(&self, normalized: &str) -> bool {
        self.words.contains(normalized)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

/// Named dictionaries discovered from a directory of `.dic` files, one
/// dictionary per file, named after the file stem.
#[derive(Debug, Default)]
pub struct DictionaryRegistry {
    dictionaries: BTreeMap<String, Arc<Dictionary>>,
}

impl DictionaryRegistry {
    /// Load every readable `.dic` file under `dir`. Unreadable files are
    /// logged and skipped; an unreadable directory is an error.
    pub fn load<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref();
        let entries = std::fs::read_dir(dir)
            .with_context(|| format!("cannot read dictionary directory {}", dir.display()))?;

        let mut dictionaries = BTreeMap::new();
        for entry in entries {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("dic") {
                continue;
            }
            let Some(name) = path.file_stem().and_then(|stem| stem.to_str()) else {
                continue;
            };
            match std::fs::read_to_string(&path) {
                Ok(contents) => {
                    let dict = Dictionary::from_word_list(&contents);
                    info!("Loaded dictionary {} ({} words)", name, dict.len());
                    dictionaries.insert(name.to_string(), Arc::new(dict));
                }
                Err(err) => {
                    warn!("Failed to read dictionary file {}: {}", path.display(), err);
                }
            }
        }
        Ok(Self { dictionaries })
    }

    pub fn names(&self) -> Vec<String> {
        self.dictionaries.keys().cloned().collect()
    }

    pub fn get(&self, name: &str) -> Option<Arc<Dictionary>> {
        self.dictionaries.get(name).cloned()
    }

    /// The default choice when a session does not name a dictionary:
    /// unambiguous only if exactly one is loaded.
    pub fn sole_entry(&self) -> Option<(String, Arc<Dictionary>)> {
        if self.dictionaries.len() == 1 {
            self.dictionaries
                .iter()
                .next()
                .map(|(name, dict)| (name.clone(), dict.clone()))
        } else {
            None
        }
    }

    #[doc(hidden)]
    pub fn insert_for_tests(&mut self, name: &str, dict: Dictionary) {
        self.dictionaries.insert(name.to_string(), Arc::new(dict));
    }
}

/// Resolve a session's dictionary request against the registry.
/// An omitted request takes the sole dictionary if there is exactly one,
/// an explicit `Some(None)` plays without validation, and a named
/// dictionary must exist.
pub fn resolve_dictionary(
    registry: &DictionaryRegistry,
    requested: Option<Option<&str>>,
) -> Result<Option<(String, Arc<Dictionary>)>, GameError> {
    match requested {
        Some(Some(name)) => registry
            .get(name)
            .map(|dict| Some((name.to_string(), dict)))
            .ok_or_else(|| GameError::UnknownDictionary {
                name: name.to_string(),
            }),
        Some(None) => Ok(None),
        None => Ok(registry.sole_entry()),
    }
}
