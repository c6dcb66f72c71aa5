use std::collections::{HashMap, HashSet};

use rand::Rng;
use rand::seq::SliceRandom;

use crate::analyzer::MIN_WORD_CHARS;
use crate::utils::{char_len, strip_non_word};

pub const MAX_DISTRACTORS: usize = 5;

const LONG_WORD_CHARS: usize = 5;
const RARE_WORD_COUNT: usize = 3;

/// A word of a sentence that could be blanked out.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlankCandidate {
    /// Token with non-word characters stripped.
    pub word: String,
    /// Index of the token in the space-split sentence.
    pub position: usize,
    pub score: u8,
}

/// Long words score higher, and so do words that are rare across the whole
/// text. Words missing from the index count as never seen.
pub fn score_word(word: &str, frequency: &HashMap<String, usize>) -> u8 {
    let length_score = if char_len(word) > LONG_WORD_CHARS { 2 } else { 1 };
    let seen = frequency
        .get(&word.to_lowercase())
        .copied()
        .unwrap_or(0);
    let rarity_score = if seen < RARE_WORD_COUNT { 1 } else { 0 };
    length_score + rarity_score
}

/// Candidates ordered best first. Equal scores keep sentence order, so the
/// leftmost token wins a tie.
pub fn rank_blank_candidates(
    sentence: &str,
    frequency: &HashMap<String, usize>,
) -> Vec<BlankCandidate> {
    let mut candidates: Vec<BlankCandidate> = sentence
        .split(' ')
        .enumerate()
        .filter_map(|(position, token)| {
            let word = strip_non_word(token);
            if word.is_empty() {
                return None;
            }
            let score = score_word(&word, frequency);
            Some(BlankCandidate {
                word,
                position,
                score,
            })
        })
        .collect();

    // stable: ties stay left to right
    candidates.sort_by(|a, b| b.score.cmp(&a.score));
    candidates
}

pub fn select_blank_word(sentence: &str, frequency: &HashMap<String, usize>) -> Option<String> {
    rank_blank_candidates(sentence, frequency)
        .into_iter()
        .next()
        .map(|candidate| candidate.word)
}

/// Picks up to [`MAX_DISTRACTORS`] wrong answers from `vocabulary`, in random
/// order. The correct answer (any casing) and words of three characters or
/// fewer never qualify.
pub fn generate_distractors<R: Rng + ?Sized>(
    correct: &str,
    vocabulary: &[&str],
    rng: &mut R,
) -> Vec<String> {
    let correct = strip_non_word(correct).to_lowercase();
    let mut seen = HashSet::new();
    let mut pool: Vec<&str> = vocabulary
        .iter()
        .copied()
        .filter(|word| char_len(word) > MIN_WORD_CHARS)
        .filter(|word| word.to_lowercase() != correct)
        .filter(|word| seen.insert(*word))
        .collect();

    pool.shuffle(rng);
    pool.into_iter()
        .take(MAX_DISTRACTORS)
        .map(str::to_string)
        .collect()
}
