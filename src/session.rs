use rand::Rng;
use rand::rngs::StdRng;
use tracing::warn;

use crate::exercise::GenerationResult;
use crate::synthesizer::{DEFAULT_MAX_ITEMS, FILL_BLANKS_TOO_SHORT, Synthesizer};

pub const SUMMARY_FAILED: &str = "Failed to generate summary";

/// The generation steps, in the order they run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GenerationStep {
    Summary,
    Questions,
    FillBlanks,
}

/// Reported around each step. `Finished` comes with the result filled in up
/// to and including that step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepEvent {
    Started(GenerationStep),
    Finished(GenerationStep),
}

impl GenerationStep {
    pub const ALL: [GenerationStep; 3] = [
        GenerationStep::Summary,
        GenerationStep::Questions,
        GenerationStep::FillBlanks,
    ];

    pub fn label(self) -> &'static str {
        match self {
            GenerationStep::Summary => "Generating summary",
            GenerationStep::Questions => "Generating multiple choice questions",
            GenerationStep::FillBlanks => "Generating fill-in-the-blanks",
        }
    }
}

/// One user's generation state: the synthesizer (with its random source and
/// optional models) plus the per-run limits.
pub struct StudySession<R = StdRng> {
    synthesizer: Synthesizer<R>,
    max_questions: usize,
    max_blanks: usize,
}

impl<R: Rng> StudySession<R> {
    pub fn new(synthesizer: Synthesizer<R>) -> Self {
        Self {
            synthesizer,
            max_questions: DEFAULT_MAX_ITEMS,
            max_blanks: DEFAULT_MAX_ITEMS,
        }
    }

    pub fn with_limits(mut self, max_questions: usize, max_blanks: usize) -> Self {
        self.max_questions = max_questions;
        self.max_blanks = max_blanks;
        self
    }

    /// Runs summary, questions and fill-in-the-blanks one after the other,
    /// reporting each step as it starts and as it finishes. A failing summary
    /// is replaced by a notice and does not stop the later steps.
    pub async fn generate_all(
        &mut self,
        text: &str,
        mut on_event: impl FnMut(StepEvent, &GenerationResult),
    ) -> GenerationResult {
        let mut result = GenerationResult::default();

        on_event(StepEvent::Started(GenerationStep::Summary), &result);
        result.summary = match self.synthesizer.synthesize_summary(text).await {
            Ok(summary) => summary,
            Err(err) => {
                warn!("summary generation failed: {err:#}");
                SUMMARY_FAILED.to_string()
            }
        };
        on_event(StepEvent::Finished(GenerationStep::Summary), &result);

        on_event(StepEvent::Started(GenerationStep::Questions), &result);
        result.mcqs = self.synthesizer.synthesize_mcqs(text, self.max_questions);
        on_event(StepEvent::Finished(GenerationStep::Questions), &result);

        on_event(StepEvent::Started(GenerationStep::FillBlanks), &result);
        match self.synthesizer.fill_blanks(text, self.max_blanks) {
            Some(batch) => {
                result.fill_blanks = batch.render();
                result.fill_blank_answers = batch.answers();
            }
            None => result.fill_blanks = FILL_BLANKS_TOO_SHORT.to_string(),
        }
        on_event(StepEvent::Finished(GenerationStep::FillBlanks), &result);

        result
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::llm::mock::MockBackend;
    use crate::llm::{Capability, ModelRegistry};
    use crate::synthesizer::{MCQ_TOO_SHORT, SUMMARY_TOO_SHORT};

    const TEXT: &str = "Volcanoes form where molten rock escapes through the crust. \
        Lava cools quickly into dark basalt near the surface. \
        Ash clouds travel hundreds of kilometres carried by strong winds. \
        Scientists monitor tremors to predict dangerous eruptions early.";

    #[tokio::test]
    async fn steps_run_in_order() {
        let mut session = StudySession::new(Synthesizer::seeded(3));
        let mut events = Vec::new();
        let result = session
            .generate_all(TEXT, |event, _| events.push(event))
            .await;

        assert_eq!(
            events,
            vec![
                StepEvent::Started(GenerationStep::Summary),
                StepEvent::Finished(GenerationStep::Summary),
                StepEvent::Started(GenerationStep::Questions),
                StepEvent::Finished(GenerationStep::Questions),
                StepEvent::Started(GenerationStep::FillBlanks),
                StepEvent::Finished(GenerationStep::FillBlanks),
            ]
        );
        assert!(result.summary.ends_with('.'));
        assert!(!result.mcqs.is_empty());
        assert_eq!(
            result.fill_blank_answers.len(),
            result.fill_blanks.matches("_____").count()
        );
    }

    #[tokio::test]
    async fn each_step_sees_the_results_of_earlier_steps() {
        let mut session = StudySession::new(Synthesizer::seeded(3));
        let mut snapshots = Vec::new();
        session
            .generate_all(TEXT, |event, partial| {
                snapshots.push((event, partial.clone()));
            })
            .await;

        let at = |event: StepEvent| {
            snapshots
                .iter()
                .find(|(seen, _)| *seen == event)
                .map(|(_, partial)| partial.clone())
                .unwrap()
        };

        let questions_start = at(StepEvent::Started(GenerationStep::Questions));
        assert!(!questions_start.summary.is_empty());
        assert!(questions_start.mcqs.is_empty());

        let summary_done = at(StepEvent::Finished(GenerationStep::Summary));
        assert_eq!(summary_done.summary, questions_start.summary);

        let blanks_start = at(StepEvent::Started(GenerationStep::FillBlanks));
        assert!(!blanks_start.mcqs.is_empty());
        assert!(blanks_start.fill_blanks.is_empty());

        let blanks_done = at(StepEvent::Finished(GenerationStep::FillBlanks));
        assert!(blanks_done.fill_blanks.contains("_____"));
    }

    #[tokio::test]
    async fn failing_summary_does_not_stop_later_steps() {
        let backend = Arc::new(MockBackend::new("unused"));
        backend.set_summarize_failing(true);
        let registry = Arc::new(ModelRegistry::new(backend.clone()));
        registry.load(None).await;
        assert!(registry.is_ready(Capability::Summarization));

        let synthesizer = Synthesizer::seeded(3).with_models(registry);
        let mut session = StudySession::new(synthesizer);
        let result = session.generate_all(TEXT, |_, _| {}).await;

        assert_eq!(result.summary, SUMMARY_FAILED);
        assert!(!result.mcqs.is_empty());
        assert!(result.fill_blanks.contains("_____"));
    }

    #[tokio::test]
    async fn short_text_yields_placeholders_for_every_step() {
        let mut session = StudySession::new(Synthesizer::seeded(3));
        let result = session.generate_all("Too short.", |_, _| {}).await;

        assert_eq!(result.summary, SUMMARY_TOO_SHORT);
        assert_eq!(result.mcqs.len(), 1);
        assert_eq!(result.mcqs[0].question, MCQ_TOO_SHORT);
        assert_eq!(result.fill_blanks, FILL_BLANKS_TOO_SHORT);
        assert!(result.fill_blank_answers.is_empty());
    }

    #[tokio::test]
    async fn limits_apply_to_each_step() {
        let mut session = StudySession::new(Synthesizer::seeded(3)).with_limits(1, 2);
        let result = session.generate_all(TEXT, |_, _| {}).await;

        assert_eq!(result.mcqs.len(), 1);
        assert_eq!(result.fill_blank_answers.len(), 2);
    }
}
