//! Writes a generation result, together with the text it came from, to a
//! study document.

pub mod docx;
pub mod html;
pub mod markdown;
pub mod pdf;

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::Serialize;

use crate::exercise::{GenerationResult, McqItem};

pub const DOCUMENT_TITLE: &str = "Generated Doc";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExportFormat {
    Markdown,
    Html,
    Docx,
    Pdf,
    Json,
}

impl ExportFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);
        match extension.as_deref() {
            Some("md") | Some("markdown") => Ok(ExportFormat::Markdown),
            Some("html") | Some("htm") => Ok(ExportFormat::Html),
            Some("docx") => Ok(ExportFormat::Docx),
            Some("pdf") => Ok(ExportFormat::Pdf),
            Some("json") => Ok(ExportFormat::Json),
            _ => bail!(
                "Unsupported export format for {}. Use .md, .html, .docx, .pdf or .json",
                path.display()
            ),
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            ExportFormat::Markdown => "Markdown",
            ExportFormat::Html => "HTML",
            ExportFormat::Docx => "Word",
            ExportFormat::Pdf => "PDF",
            ExportFormat::Json => "JSON",
        }
    }
}

/// Layout shared by the document formats.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Block {
    Title(String),
    Note(String),
    Heading(String),
    Paragraph(String),
    Question(String),
    Choice { text: String, correct: bool },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonExport<'a> {
    generated_on: &'a str,
    original_text: &'a str,
    #[serde(flatten)]
    result: &'a GenerationResult,
}

/// Lays out the document: title, original text, then each non-empty section.
pub fn blocks(original_text: &str, result: &GenerationResult, generated_on: &str) -> Vec<Block> {
    let mut blocks = vec![
        Block::Title(DOCUMENT_TITLE.to_string()),
        Block::Note(format!("Generated on {generated_on}")),
        Block::Heading("Original Article".to_string()),
        Block::Paragraph(original_text.trim().to_string()),
    ];

    if !result.summary.is_empty() {
        blocks.push(Block::Heading("Summary".to_string()));
        blocks.push(Block::Paragraph(result.summary.clone()));
    }

    if !result.mcqs.is_empty() {
        blocks.push(Block::Heading("Multiple Choice Questions".to_string()));
        for (number, mcq) in result.mcqs.iter().enumerate() {
            blocks.push(Block::Question(format!("{}. {}", number + 1, mcq.question)));
            for (index, option) in mcq.options.iter().enumerate() {
                blocks.push(Block::Choice {
                    text: format!("{}. {}", McqItem::option_letter(index), option),
                    correct: index == mcq.correct_index,
                });
            }
        }
    }

    if !result.fill_blanks.is_empty() {
        blocks.push(Block::Heading("Fill in the Blanks".to_string()));
        blocks.push(Block::Paragraph(result.fill_blanks.clone()));
        if !result.fill_blank_answers.is_empty() {
            let key = result
                .fill_blank_answers
                .iter()
                .enumerate()
                .map(|(i, answer)| format!("{}. {}", i + 1, answer))
                .collect::<Vec<_>>()
                .join("   ");
            blocks.push(Block::Note(format!("Answers: {key}")));
        }
    }

    blocks
}

pub fn write(path: &Path, original_text: &str, result: &GenerationResult) -> Result<ExportFormat> {
    let format = ExportFormat::from_path(path)?;
    let generated_on = chrono::Local::now().format("%Y-%m-%d").to_string();

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }

    match format {
        ExportFormat::Markdown => {
            let contents = markdown::render(&blocks(original_text, result, &generated_on));
            write_string(path, &contents)?;
        }
        ExportFormat::Html => {
            let contents = html::render(&blocks(original_text, result, &generated_on));
            write_string(path, &contents)?;
        }
        ExportFormat::Docx => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            docx::write(BufWriter::new(file), &blocks(original_text, result, &generated_on))
                .with_context(|| format!("Failed to write Word document {}", path.display()))?;
        }
        ExportFormat::Pdf => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            pdf::write(&mut BufWriter::new(file), &blocks(original_text, result, &generated_on))
                .with_context(|| format!("Failed to write PDF {}", path.display()))?;
        }
        ExportFormat::Json => {
            let export = JsonExport {
                generated_on: &generated_on,
                original_text,
                result,
            };
            let contents = format!("{}\n", serde_json::to_string_pretty(&export)?);
            write_string(path, &contents)?;
        }
    }

    Ok(format)
}

fn write_string(path: &Path, contents: &str) -> Result<()> {
    std::fs::write(path, contents).with_context(|| format!("Failed to write {}", path.display()))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use tempfile::tempdir;

    pub(crate) fn sample_result() -> GenerationResult {
        GenerationResult {
            summary: "Rivers shape valleys.".to_string(),
            mcqs: vec![McqItem {
                question: "Rivers carve _____ over time".to_string(),
                options: vec!["mountains".into(), "valleys".into(), "glaciers".into()],
                correct_index: 1,
            }],
            fill_blanks: "Erosion moves _____ downstream".to_string(),
            fill_blank_answers: vec!["sediment".to_string()],
        }
    }

    #[test]
    fn format_follows_extension() {
        assert_eq!(
            ExportFormat::from_path(Path::new("out/notes.MD")).unwrap(),
            ExportFormat::Markdown
        );
        assert_eq!(
            ExportFormat::from_path(Path::new("notes.docx")).unwrap(),
            ExportFormat::Docx
        );
        assert_eq!(
            ExportFormat::from_path(Path::new("notes.pdf")).unwrap(),
            ExportFormat::Pdf
        );
        assert!(ExportFormat::from_path(Path::new("notes.odt")).is_err());
        assert!(ExportFormat::from_path(Path::new("notes")).is_err());
    }

    #[test]
    fn blocks_mark_the_correct_choice() {
        let blocks = blocks("Rivers flow.", &sample_result(), "2026-10-19");
        let choices: Vec<_> = blocks
            .iter()
            .filter_map(|b| match b {
                Block::Choice { text, correct } => Some((text.as_str(), *correct)),
                _ => None,
            })
            .collect();
        assert_eq!(
            choices,
            vec![
                ("A. mountains", false),
                ("B. valleys", true),
                ("C. glaciers", false)
            ]
        );
        assert!(blocks.contains(&Block::Note("Answers: 1. sediment".to_string())));
    }

    #[test]
    fn empty_sections_are_left_out() {
        let blocks = blocks("Rivers flow.", &GenerationResult::default(), "2026-10-19");
        assert_eq!(blocks.len(), 4);
        assert!(!blocks.contains(&Block::Heading("Summary".to_string())));
    }

    #[test]
    fn json_export_includes_original_text() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested/result.json");
        let format = write(&path, "Rivers flow.", &sample_result()).unwrap();
        assert_eq!(format, ExportFormat::Json);

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["originalText"], "Rivers flow.");
        assert_eq!(value["mcqs"][0]["correctIndex"], 1);
        assert_eq!(value["fillBlankAnswers"][0], "sediment");
    }

    #[test]
    fn markdown_export_writes_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("result.md");
        write(&path, "Rivers flow.", &sample_result()).unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.starts_with("# Generated Doc"));
        assert!(contents.contains("Rivers flow."));
    }

    #[test]
    fn pdf_export_writes_a_pdf_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("result.pdf");
        let format = write(&path, "Rivers flow.", &sample_result()).unwrap();
        assert_eq!(format, ExportFormat::Pdf);

        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }
}
