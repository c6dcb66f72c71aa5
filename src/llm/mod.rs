pub mod backend;
pub mod client;
#[cfg(test)]
pub(crate) mod mock;
pub mod openai;
pub mod registry;
pub mod response;

pub use backend::{Capability, ModelBackend};
pub use client::{connect, connect_with_key};
pub use openai::OpenAiBackend;
pub use registry::{ModelRegistry, ProgressFn};
