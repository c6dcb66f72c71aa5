use std::collections::{HashMap, HashSet};

use once_cell::sync::Lazy;
use regex::Regex;

use crate::utils::{char_len, is_word_char};

static SENTENCE_BREAK_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[.!?]+").unwrap());

/// Fragments must be longer than this (trimmed) to count as a sentence.
const MIN_SENTENCE_CHARS: usize = 10;
/// Words must be longer than this to enter the frequency index.
pub const MIN_WORD_CHARS: usize = 3;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TextAnalysis {
    pub sentences: Vec<String>,
    /// Lowercased words in reading order, duplicates included.
    pub words: Vec<String>,
    pub word_frequency: HashMap<String, usize>,
}

impl TextAnalysis {
    pub fn frequency(&self, word: &str) -> usize {
        self.word_frequency.get(word).copied().unwrap_or(0)
    }

    /// Distinct words in first-seen order.
    pub fn vocabulary(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.words
            .iter()
            .map(String::as_str)
            .filter(|word| seen.insert(*word))
            .collect()
    }
}

pub fn analyze(text: &str) -> TextAnalysis {
    let sentences = split_sentences(text);
    let words = tokenize_words(text);

    let mut word_frequency = HashMap::new();
    for word in &words {
        *word_frequency.entry(word.clone()).or_insert(0) += 1;
    }

    TextAnalysis {
        sentences,
        words,
        word_frequency,
    }
}

pub fn split_sentences(text: &str) -> Vec<String> {
    SENTENCE_BREAK_RE
        .split(text)
        .map(str::trim)
        .filter(|fragment| char_len(fragment) > MIN_SENTENCE_CHARS)
        .map(str::to_string)
        .collect()
}

pub fn tokenize_words(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !is_word_char(c))
        .filter(|word| char_len(word) > MIN_WORD_CHARS)
        .map(str::to_string)
        .collect()
}
