use serde::{Deserialize, Serialize};

use crate::utils::BLANK_MARKER;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct McqItem {
    /// Source sentence with the answer replaced by the blank marker.
    pub question: String,
    pub options: Vec<String>,
    pub correct_index: usize,
}

impl McqItem {
    pub fn correct_answer(&self) -> Option<&str> {
        self.options.get(self.correct_index).map(String::as_str)
    }

    /// Option label as printed in exports: `A`, `B`, ...
    pub fn option_letter(index: usize) -> char {
        (b'A' + (index % 26) as u8) as char
    }
}

/// One drill sentence with exactly one word blanked out.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlankedSentence {
    pub text: String,
    pub answer: String,
    /// Index of the sentence in the analyzed text it was taken from.
    pub source_index: usize,
}

impl BlankedSentence {
    /// The sentence with the answer written back in place of the marker.
    pub fn restored(&self) -> String {
        self.text.replacen(BLANK_MARKER, &self.answer, 1)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FillBlankBatch {
    pub items: Vec<BlankedSentence>,
}

impl FillBlankBatch {
    /// Answers in the order the blanks appear in [`FillBlankBatch::render`].
    pub fn answers(&self) -> Vec<String> {
        self.items.iter().map(|item| item.answer.clone()).collect()
    }

    pub fn render(&self) -> String {
        let joined = self
            .items
            .iter()
            .map(|item| item.text.as_str())
            .collect::<Vec<_>>()
            .join(". ");
        collapse_doubled_periods(&joined)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

fn collapse_doubled_periods(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if c == '.' && out.ends_with('.') {
            continue;
        }
        out.push(c);
    }
    out
}

/// Everything one generation run produces.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationResult {
    pub summary: String,
    pub mcqs: Vec<McqItem>,
    pub fill_blanks: String,
    /// Answer for each blank of `fill_blanks`, in reading order.
    #[serde(default)]
    pub fill_blank_answers: Vec<String>,
}
