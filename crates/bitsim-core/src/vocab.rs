//! Word ↔ identifier dictionary
//!
//! Identifiers are dense and assigned in first-seen order starting at 0.
//! The index is append-only: a word never changes identifier once assigned.

use std::collections::HashMap;

/// Bidirectional mapping between normalized words and dense identifiers
#[derive(Debug, Default, Clone)]
pub struct Vocabulary {
    ids: HashMap<String, usize>,
    words: Vec<String>,
}

impl Vocabulary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty vocabulary with room for `capacity` words
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            ids: HashMap::with_capacity(capacity),
            words: Vec::with_capacity(capacity),
        }
    }

    /// Exact (case-sensitive) lookup of an already-normalized word
    #[inline]
    pub fn lookup(&self, word: &str) -> Option<usize> {
        self.ids.get(word).copied()
    }

    /// Return the identifier of `word`, assigning the next one if it is new
    ///
    /// Callers normalize (see [`normalize`]) before inserting.
    pub fn insert_if_absent(&mut self, word: &str) -> usize {
        if let Some(&id) = self.ids.get(word) {
            return id;
        }
        let id = self.words.len();
        self.words.push(word.to_owned());
        self.ids.insert(word.to_owned(), id);
        id
    }

    /// Reverse lookup
    #[inline]
    pub fn word(&self, id: usize) -> Option<&str> {
        self.words.get(id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

/// Lower-case a raw token the way judgment and query words are normalized
pub fn normalize(word: &str) -> String {
    word.to_lowercase()
}
