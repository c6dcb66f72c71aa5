pub mod generate;
pub mod llm;
