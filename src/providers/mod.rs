pub mod openai;
pub mod streaming;

use crate::config::Config;
use crate::error::Result;
use crate::history::Message;
use async_trait::async_trait;
use futures_util::stream::BoxStream;

/// Response text as it arrives, in order.
pub type FragmentStream = BoxStream<'static, Result<String>>;

pub struct ChatRequest<'a> {
    pub model: &'a str,
    /// Full conversation, system prompt first
    pub messages: &'a [Message],
}

#[async_trait]
pub trait LlmProvider: Send + Sync {
    async fn complete(&self, request: &ChatRequest<'_>) -> Result<String>;

    async fn stream(&self, request: &ChatRequest<'_>) -> Result<FragmentStream>;
}

pub fn create_provider(config: &Config) -> Box<dyn LlmProvider> {
    Box::new(openai::OpenAIProvider::new(config))
}
