use std::fmt;

use anyhow::Result;
use async_trait::async_trait;

/// Something a model backend can be asked to load and serve.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Capability {
    Summarization,
    QuestionGeneration,
    FillMask,
}

impl Capability {
    /// Load order.
    pub const ALL: [Capability; 3] = [
        Capability::Summarization,
        Capability::QuestionGeneration,
        Capability::FillMask,
    ];

    pub fn display_name(self) -> &'static str {
        match self {
            Capability::Summarization => "Summarizer",
            Capability::QuestionGeneration => "Question Generator",
            Capability::FillMask => "Fill Mask Model",
        }
    }

    pub(crate) fn index(self) -> usize {
        match self {
            Capability::Summarization => 0,
            Capability::QuestionGeneration => 1,
            Capability::FillMask => 2,
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// An inference service the synthesizer can defer to.
#[async_trait]
pub trait ModelBackend: Send + Sync {
    fn name(&self) -> &str;

    /// Prepares one capability. Called at most once per capability unless a
    /// previous attempt failed.
    async fn load(&self, capability: Capability) -> Result<()>;

    async fn summarize(&self, text: &str) -> Result<String>;
}
