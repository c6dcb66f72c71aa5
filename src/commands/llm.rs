use std::sync::Arc;

use anyhow::{Result, bail};

use crate::llm::{self, Capability, ProgressFn};
use crate::palette::Palette;
use crate::settings::{
    API_KEY_ENV, clear_api_key, load_settings, prompt_for_api_key, resolve_api_key,
    settings_path, store_api_key,
};

#[derive(Debug, Clone, Default)]
pub struct LlmOptions {
    /// `Some(None)` means `--set` was given without a value.
    pub set: Option<Option<String>>,
    pub clear: bool,
    pub test: bool,
    pub status: bool,
}

pub async fn run(options: LlmOptions) -> Result<()> {
    let mut action_taken = false;

    if let Some(key) = options.set {
        let key = match key {
            Some(key) => key,
            None => prompt_for_api_key()?,
        };
        if key.trim().is_empty() {
            println!("No API key entered; nothing stored.");
        } else {
            store_api_key(&key)?;
            println!("Stored OpenAI API key in the local settings file.");
        }
        action_taken = true;
    }

    if options.clear {
        if clear_api_key()? {
            println!("Removed the stored OpenAI API key.");
        } else {
            println!("No OpenAI API key found in the settings file.");
        }
        action_taken = true;
    }

    if options.test {
        test_models().await?;
        action_taken = true;
    }

    if options.status {
        print_status()?;
        action_taken = true;
    }

    if !action_taken {
        bail!("No action provided. Use --set, --clear, --test, or --status.");
    }
    Ok(())
}

async fn test_models() -> Result<()> {
    let Some((registry, source)) = llm::connect()? else {
        bail!("No OpenAI API key configured. Set {API_KEY_ENV} or run `studyaid llm --set`.");
    };

    let on_progress: ProgressFn = Arc::new(|current: usize, total: usize, name: &str| {
        println!("{} {name} ({current}/{total})", Palette::dim("Loaded"));
    });
    registry.load(Some(on_progress)).await;

    for capability in Capability::ALL {
        let state = if registry.is_ready(capability) {
            Palette::paint(Palette::SUCCESS, "ready")
        } else {
            Palette::paint(Palette::DANGER, "unavailable")
        };
        println!("{:<20} {}", capability.display_name(), state);
    }

    if registry.ready_capabilities().is_empty() {
        bail!(
            "None of the configured models could be reached with the API key from the {}.",
            source.description()
        );
    }
    println!(
        "API key from the {} is valid for the {} backend.",
        source.description(),
        registry.backend_name()
    );
    Ok(())
}

fn print_status() -> Result<()> {
    let lookup = resolve_api_key()?;
    let key_state = match lookup.source {
        Some(source) => Palette::paint(Palette::SUCCESS, format!("set ({})", source.description())),
        None => Palette::paint(Palette::WARNING, "not configured"),
    };
    println!("{} {}", Palette::dim("API key:"), key_state);
    println!(
        "{} {}",
        Palette::dim("Settings file:"),
        settings_path()?.display()
    );

    let models = load_settings()?.models;
    println!("{} {}", Palette::dim("Summarizer model:"), models.summary);
    println!("{} {}", Palette::dim("Question model:"), models.questions);
    println!("{} {}", Palette::dim("Fill mask model:"), models.fill_mask);
    Ok(())
}
