// src/llm/mod.rs
pub mod openai;

pub use openai::OpenAiClient;

use crate::utils::error::ModelError;

/// A hosted text-generation model: one prompt in, one raw text reply out.
/// The pipeline invokes this exactly once per filing.
#[allow(async_fn_in_trait)]
pub trait TextModel {
    async fn generate(&self, prompt: &str) -> Result<String, ModelError>;
}
