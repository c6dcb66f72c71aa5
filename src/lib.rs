pub mod analyzer;
pub mod commands;
pub mod exercise;
pub mod export;
pub mod llm;
pub mod palette;
pub mod selector;
pub mod session;
pub mod settings;
pub mod synthesizer;
pub mod utils;

pub use exercise::{FillBlankBatch, GenerationResult, McqItem};
pub use session::{GenerationStep, StepEvent, StudySession};
pub use synthesizer::Synthesizer;
