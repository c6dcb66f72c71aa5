use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Result, bail};
use tracing::{debug, warn};

use crate::exercise::{GenerationResult, McqItem};
use crate::export;
use crate::llm::{self, ModelRegistry, ProgressFn};
use crate::palette::Palette;
use crate::session::{GenerationStep, StepEvent, StudySession};
use crate::synthesizer::Synthesizer;
use crate::utils::{char_len, pluralize, read_input_text, word_count};

#[derive(Debug, Clone)]
pub struct GenerateOptions {
    pub path: Option<PathBuf>,
    pub max_questions: usize,
    pub max_blanks: usize,
    pub seed: Option<u64>,
    pub offline: bool,
    pub json: bool,
    pub export: Option<PathBuf>,
}

pub async fn run(options: GenerateOptions) -> Result<()> {
    let text = read_input_text(options.path.as_deref())?;
    if text.trim().is_empty() {
        bail!("No text to work with. Pass a .txt file or pipe text on stdin.");
    }
    eprintln!("{}", Palette::dim(input_stats(&text)));

    let mut synthesizer = match options.seed {
        Some(seed) => Synthesizer::seeded(seed),
        None => Synthesizer::from_entropy(),
    };
    if !options.offline
        && let Some(models) = load_models().await?
    {
        synthesizer = synthesizer.with_models(models);
    }

    let mut session =
        StudySession::new(synthesizer).with_limits(options.max_questions, options.max_blanks);
    let json = options.json;
    let result = session
        .generate_all(&text, |event, partial| match event {
            StepEvent::Started(step) => {
                eprintln!("{} {}...", Palette::paint(Palette::INFO, "•"), step.label());
            }
            // sections stream out as they finish; JSON waits for the whole result
            StepEvent::Finished(step) if !json => print!("{}", render_section(step, partial)),
            StepEvent::Finished(_) => {}
        })
        .await;
    debug!(
        mcqs = result.mcqs.len(),
        blanks = result.fill_blank_answers.len(),
        "generation finished"
    );

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    }

    if let Some(path) = options.export {
        let format = export::write(&path, &text, &result)?;
        eprintln!(
            "{} {} document to {}",
            Palette::paint(Palette::SUCCESS, "Saved"),
            format.description(),
            path.display()
        );
    }

    Ok(())
}

/// "N characters • M words"
pub fn input_stats(text: &str) -> String {
    format!(
        "{} • {}",
        pluralize("character", char_len(text)),
        pluralize("word", word_count(text))
    )
}

async fn load_models() -> Result<Option<Arc<ModelRegistry>>> {
    let Some((registry, source)) = llm::connect()? else {
        return Ok(None);
    };
    eprintln!(
        "{}",
        Palette::dim(format!("Using the OpenAI API key from the {}.", source.description()))
    );

    let registry = Arc::new(registry);
    let on_progress: ProgressFn = Arc::new(|current: usize, total: usize, name: &str| {
        eprintln!(
            "{} {} ({}/{})",
            Palette::paint(Palette::SUCCESS, "Loaded"),
            name,
            current,
            total
        );
    });
    registry.load(Some(on_progress)).await;

    if !registry.all_ready() {
        warn!(
            ready = registry.ready_capabilities().len(),
            "some models failed to load"
        );
        eprintln!(
            "{}",
            Palette::paint(
                Palette::WARNING,
                "Some models could not be loaded. Falling back to offline generation where needed."
            )
        );
    }

    Ok(Some(registry))
}

pub fn render_plain(result: &GenerationResult) -> String {
    GenerationStep::ALL
        .into_iter()
        .map(|step| render_section(step, result))
        .collect()
}

/// The part of `result` that `step` produced.
pub fn render_section(step: GenerationStep, result: &GenerationResult) -> String {
    match step {
        GenerationStep::Summary => render_summary(result),
        GenerationStep::Questions => render_questions(result),
        GenerationStep::FillBlanks => render_fill_blanks(result),
    }
}

fn render_summary(result: &GenerationResult) -> String {
    format!(
        "{}\n{}\n\n",
        Palette::paint(Palette::ACCENT, "Summary"),
        result.summary
    )
}

fn render_questions(result: &GenerationResult) -> String {
    let mut out = format!(
        "{}\n",
        Palette::paint(Palette::ACCENT, "Multiple Choice Questions")
    );
    if result.mcqs.is_empty() {
        out.push_str(&format!("{}\n", Palette::dim("No questions generated.")));
    }
    for (number, mcq) in result.mcqs.iter().enumerate() {
        out.push_str(&format!("{}\n", Palette::bold(format!("{}. {}", number + 1, mcq.question))));
        for (index, option) in mcq.options.iter().enumerate() {
            let line = format!("{}. {}", McqItem::option_letter(index), option);
            if index == mcq.correct_index {
                out.push_str(&format!(
                    "   {}\n",
                    Palette::paint(Palette::SUCCESS, format!("{line} ✓"))
                ));
            } else {
                out.push_str(&format!("   {line}\n"));
            }
        }
    }
    out.push('\n');
    out
}

fn render_fill_blanks(result: &GenerationResult) -> String {
    let mut out = format!("{}\n", Palette::paint(Palette::ACCENT, "Fill in the Blanks"));
    out.push_str(&format!("{}\n", result.fill_blanks));
    if !result.fill_blank_answers.is_empty() {
        let key = result
            .fill_blank_answers
            .iter()
            .enumerate()
            .map(|(i, answer)| format!("{}. {}", i + 1, answer))
            .collect::<Vec<_>>()
            .join("   ");
        out.push_str(&format!("{} {}\n", Palette::dim("Answers:"), key));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::tests::sample_result;

    #[test]
    fn input_stats_counts_characters_and_words() {
        assert_eq!(input_stats("Hello brave world"), "17 characters • 3 words");
        assert_eq!(input_stats("a"), "1 character • 1 word");
    }

    #[test]
    fn plain_rendering_marks_the_answer() {
        let rendered = render_plain(&sample_result());
        assert!(rendered.contains("Rivers shape valleys."));
        assert!(rendered.contains("1. Rivers carve _____ over time"));
        assert!(rendered.contains("B. valleys ✓"));
        assert!(!rendered.contains("A. mountains ✓"));
        assert!(rendered.contains("1. sediment"));
    }

    #[test]
    fn sections_render_independently() {
        let result = sample_result();
        let summary = render_section(GenerationStep::Summary, &result);
        assert!(summary.contains("Rivers shape valleys."));
        assert!(!summary.contains("Multiple Choice Questions"));

        let questions = render_section(GenerationStep::Questions, &result);
        assert!(questions.contains("B. valleys ✓"));
        assert!(!questions.contains("Rivers shape valleys."));

        assert_eq!(
            render_plain(&result),
            format!(
                "{summary}{questions}{}",
                render_section(GenerationStep::FillBlanks, &result)
            )
        );
    }

    #[test]
    fn plain_rendering_notes_missing_questions() {
        let rendered = render_plain(&GenerationResult::default());
        assert!(rendered.contains("No questions generated."));
        assert!(!rendered.contains("Answers:"));
    }

    #[tokio::test]
    async fn offline_run_writes_the_export() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("notes.txt");
        std::fs::write(
            &input,
            "Glaciers grind valleys into broad U shapes over centuries. \
             Meltwater carries fine sediment far beyond the ice front. \
             Moraines mark the furthest point a glacier once reached.",
        )
        .unwrap();
        let output = dir.path().join("out.md");

        run(GenerateOptions {
            path: Some(input),
            max_questions: 2,
            max_blanks: 2,
            seed: Some(11),
            offline: true,
            json: true,
            export: Some(output.clone()),
        })
        .await
        .unwrap();

        let contents = std::fs::read_to_string(&output).unwrap();
        assert!(contents.contains("## Multiple Choice Questions"));
        assert!(contents.contains("Glaciers grind valleys"));
    }

    #[tokio::test]
    async fn empty_input_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("empty.txt");
        std::fs::write(&input, "   \n").unwrap();

        let err = run(GenerateOptions {
            path: Some(input),
            max_questions: 4,
            max_blanks: 4,
            seed: None,
            offline: true,
            json: false,
            export: None,
        })
        .await
        .unwrap_err();
        assert!(err.to_string().contains("No text"));
    }
}
