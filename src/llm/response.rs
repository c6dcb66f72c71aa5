use anyhow::{Context, Result, bail};
use async_openai::{
    Client,
    config::OpenAIConfig,
    types::responses::{
        CreateResponseArgs, InputMessage, InputRole, OutputItem, OutputMessageContent,
    },
};

/// A system + user prompt pair sent to a single model.
pub struct TextRequest<'a> {
    pub model: &'a str,
    pub system_prompt: &'a str,
    pub user_prompt: &'a str,
    pub max_output_tokens: u32,
}

/// Sends the request through the Responses API and returns the first
/// non-empty text the model produced.
pub async fn request_text(client: &Client<OpenAIConfig>, request: TextRequest<'_>) -> Result<String> {
    let payload = CreateResponseArgs::default()
        .model(request.model)
        .max_output_tokens(request.max_output_tokens)
        .input(vec![
            InputMessage {
                role: InputRole::System,
                content: vec![request.system_prompt.into()],
                status: None,
            },
            InputMessage {
                role: InputRole::User,
                content: vec![request.user_prompt.into()],
                status: None,
            },
        ])
        .build()?;

    let response = client
        .responses()
        .create(payload)
        .await
        .with_context(|| format!("Request to {} failed", request.model))?;

    let text = response.output.into_iter().find_map(|item| match item {
        OutputItem::Message(message) => message.content.into_iter().find_map(|content| {
            match content {
                OutputMessageContent::OutputText(text) => {
                    let trimmed = text.text.trim();
                    (!trimmed.is_empty()).then(|| trimmed.to_string())
                }
                _ => None,
            }
        }),
        _ => None,
    });

    match text {
        Some(text) => Ok(text),
        None => bail!("{} returned no text output", request.model),
    }
}
