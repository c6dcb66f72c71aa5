use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use super::openai::OpenAiBackend;
use super::registry::ModelRegistry;
use crate::settings::{API_KEY_ENV, ApiKeySource, load_settings, resolve_api_key};

/// Builds a registry over the configured OpenAI account. Returns `None` when
/// no API key is configured, in which case callers stay on the heuristic
/// generators.
pub fn connect() -> Result<Option<(ModelRegistry, ApiKeySource)>> {
    let lookup = resolve_api_key()?;
    let (Some(api_key), Some(source)) = (lookup.api_key, lookup.source) else {
        info!("no API key in {API_KEY_ENV} or settings, using offline generation");
        return Ok(None);
    };

    Ok(Some((connect_with_key(&api_key)?, source)))
}

pub fn connect_with_key(api_key: &str) -> Result<ModelRegistry> {
    let settings = load_settings()?;
    let backend = OpenAiBackend::new(api_key, settings.models);
    Ok(ModelRegistry::new(Arc::new(backend)))
}
