use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::analyzer::{MIN_WORD_CHARS, analyze};
use crate::exercise::{BlankedSentence, FillBlankBatch, McqItem};
use crate::llm::{Capability, ModelRegistry};
use crate::selector::{generate_distractors, select_blank_word};
use crate::utils::{BLANK_MARKER, char_len, strip_non_word, trim_non_word};

/// Upper bound on questions and on blanks per run.
pub const DEFAULT_MAX_ITEMS: usize = 4;

pub const SUMMARY_TOO_SHORT: &str = "Text too short for summarization.";
pub const FILL_BLANKS_TOO_SHORT: &str = "Text too short.";
pub const MCQ_TOO_SHORT: &str = "Text too short for question generation";

const MIN_SUMMARY_CHARS: usize = 50;
const MIN_FILL_BLANK_CHARS: usize = 50;
const MIN_MCQ_CHARS: usize = 100;

const MIN_SENTENCE_TOKENS: usize = 6;
const SUMMARY_SENTENCES: usize = 3;
const MAX_OPTIONS: usize = 4;
const MCQ_DISTRACTORS: usize = MAX_OPTIONS - 1;

/// Builds study exercises from raw text.
///
/// Questions and fill-in-the-blanks always come from the heuristics in
/// [`crate::selector`]. Summaries come from the model registry when its
/// summarizer is ready and from the first sentences of the text otherwise.
pub struct Synthesizer<R = StdRng> {
    rng: R,
    models: Option<Arc<ModelRegistry>>,
}

impl Synthesizer<StdRng> {
    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_os_rng())
    }

    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> Synthesizer<R> {
    pub fn new(rng: R) -> Self {
        Self { rng, models: None }
    }

    pub fn with_models(mut self, models: Arc<ModelRegistry>) -> Self {
        self.models = Some(models);
        self
    }

    pub fn models(&self) -> Option<&ModelRegistry> {
        self.models.as_deref()
    }

    pub async fn synthesize_summary(&self, text: &str) -> Result<String> {
        if char_len(text.trim()) < MIN_SUMMARY_CHARS {
            return Ok(SUMMARY_TOO_SHORT.to_string());
        }

        if let Some(models) = self.models()
            && models.is_ready(Capability::Summarization)
        {
            return models.summarize(text).await;
        }

        debug!("summarizer not ready, using extractive summary");
        Ok(extractive_summary(text))
    }

    pub fn synthesize_mcqs(&mut self, text: &str, max: usize) -> Vec<McqItem> {
        if char_len(text.trim()) < MIN_MCQ_CHARS {
            return vec![too_short_mcq()];
        }

        let max = max.min(DEFAULT_MAX_ITEMS);
        let analysis = analyze(text);
        let vocabulary = analysis.vocabulary();

        let mut questions = Vec::new();
        for sentence in &analysis.sentences {
            if questions.len() >= max {
                break;
            }
            if let Some(question) = build_mcq(sentence, &vocabulary, &mut self.rng) {
                questions.push(question);
            }
        }
        questions
    }

    /// The fill-in-the-blank drill as prose, or a notice when the text is too
    /// short.
    pub fn synthesize_fill_blanks(&self, text: &str, max: usize) -> String {
        match self.fill_blanks(text, max) {
            Some(batch) => batch.render(),
            None => FILL_BLANKS_TOO_SHORT.to_string(),
        }
    }

    /// Same drill as [`Synthesizer::synthesize_fill_blanks`], keeping each
    /// sentence and its answer. `None` when the text is too short.
    pub fn fill_blanks(&self, text: &str, max: usize) -> Option<FillBlankBatch> {
        if char_len(text.trim()) < MIN_FILL_BLANK_CHARS {
            return None;
        }

        let max = max.min(DEFAULT_MAX_ITEMS);
        let analysis = analyze(text);

        let mut batch = FillBlankBatch::default();
        for (index, sentence) in analysis.sentences.iter().enumerate() {
            if batch.len() >= max {
                break;
            }
            if let Some(item) = blank_sentence(sentence, index, &analysis.word_frequency) {
                batch.items.push(item);
            }
        }
        Some(batch)
    }
}

/// The first few sentences, verbatim.
pub fn extractive_summary(text: &str) -> String {
    let analysis = analyze(text);
    let lead: Vec<&str> = analysis
        .sentences
        .iter()
        .take(SUMMARY_SENTENCES)
        .map(String::as_str)
        .collect();
    format!("{}.", lead.join(". "))
}

pub fn too_short_mcq() -> McqItem {
    McqItem {
        question: MCQ_TOO_SHORT.to_string(),
        options: vec![
            "Provide more text".to_string(),
            "Minimum 100 chars needed".to_string(),
            "Try a longer passage".to_string(),
            "All of the above".to_string(),
        ],
        correct_index: 3,
    }
}

/// Blanks the middle content word of a sentence. Sentences with fewer than
/// six words of four or more characters are skipped.
fn build_mcq<R: Rng + ?Sized>(sentence: &str, vocabulary: &[&str], rng: &mut R) -> Option<McqItem> {
    let tokens: Vec<&str> = sentence
        .split(' ')
        .filter(|token| char_len(&strip_non_word(token)) > MIN_WORD_CHARS)
        .collect();
    if tokens.len() < MIN_SENTENCE_TOKENS {
        return None;
    }

    let answer = trim_non_word(tokens[tokens.len() / 2]);
    let question = sentence.replacen(answer, BLANK_MARKER, 1);

    let mut options = vec![answer.to_string()];
    options.extend(
        generate_distractors(answer, vocabulary, rng)
            .into_iter()
            .take(MCQ_DISTRACTORS),
    );
    options.shuffle(rng);
    options.truncate(MAX_OPTIONS);

    let correct_index = options.iter().position(|option| option == answer)?;
    Some(McqItem {
        question,
        options,
        correct_index,
    })
}

fn blank_sentence(
    sentence: &str,
    source_index: usize,
    frequency: &HashMap<String, usize>,
) -> Option<BlankedSentence> {
    let mut tokens: Vec<&str> = sentence.split(' ').collect();
    if tokens.len() < MIN_SENTENCE_TOKENS {
        return None;
    }

    let answer = select_blank_word(sentence, frequency)?;
    let wanted = answer.to_lowercase();
    let Some(position) = tokens
        .iter()
        .position(|token| strip_non_word(token).to_lowercase() == wanted)
    else {
        debug!(sentence, %answer, "blank word not found among tokens, skipping");
        return None;
    };

    tokens[position] = BLANK_MARKER;
    Some(BlankedSentence {
        text: tokens.join(" "),
        answer,
        source_index,
    })
}
