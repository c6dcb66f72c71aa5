use anyhow::{Context, Result};
use async_openai::{Client, config::OpenAIConfig};
use async_trait::async_trait;
use tracing::instrument;

use super::backend::{Capability, ModelBackend};
use super::response::{TextRequest, request_text};
use crate::settings::ModelIds;
use crate::utils::word_count;

const SUMMARY_SYSTEM_PROMPT: &str = r#"
You summarize study material for a student.
Keep the facts, names and numbers of the source. Do not add anything that is not in the text.
Answer with the summary only, as plain prose without headings or bullet points.
"#;

const MIN_SUMMARY_WORDS: usize = 30;
const SUMMARY_OUTPUT_TOKENS: u32 = 2000;

/// Models served by the OpenAI API, one per capability.
pub struct OpenAiBackend {
    client: Client<OpenAIConfig>,
    models: ModelIds,
}

impl OpenAiBackend {
    pub fn new(api_key: &str, models: ModelIds) -> Self {
        let config = OpenAIConfig::new().with_api_key(api_key);
        Self {
            client: Client::with_config(config),
            models,
        }
    }

    fn model_for(&self, capability: Capability) -> &str {
        match capability {
            Capability::Summarization => &self.models.summary,
            Capability::QuestionGeneration => &self.models.questions,
            Capability::FillMask => &self.models.fill_mask,
        }
    }
}

#[async_trait]
impl ModelBackend for OpenAiBackend {
    fn name(&self) -> &str {
        "openai"
    }

    #[instrument(skip(self), fields(model = self.model_for(capability)))]
    async fn load(&self, capability: Capability) -> Result<()> {
        let model = self.model_for(capability);
        self.client
            .models()
            .retrieve(model)
            .await
            .with_context(|| format!("Model {model} is not available"))?;
        Ok(())
    }

    #[instrument(skip_all, fields(model = %self.models.summary, chars = text.len()))]
    async fn summarize(&self, text: &str) -> Result<String> {
        let user_prompt = format!(
            "Summarize the following text in at most {} words.\n\n{text}",
            summary_word_budget(text)
        );
        request_text(
            &self.client,
            TextRequest {
                model: &self.models.summary,
                system_prompt: SUMMARY_SYSTEM_PROMPT,
                user_prompt: &user_prompt,
                max_output_tokens: SUMMARY_OUTPUT_TOKENS,
            },
        )
        .await
    }
}

/// Roughly 70% of the source length, but never fewer than
/// [`MIN_SUMMARY_WORDS`].
fn summary_word_budget(text: &str) -> usize {
    (word_count(text) * 7 / 10).max(MIN_SUMMARY_WORDS)
}
