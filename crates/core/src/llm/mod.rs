pub mod error;
pub mod json;
pub mod openai;

#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub system: String,
    pub user: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

/// One system/user exchange with a chat-completion endpoint. Returns the raw
/// text of the first choice; shaping it is the caller's job.
#[async_trait::async_trait]
pub trait CompletionClient: Send + Sync {
    fn provider_name(&self) -> &'static str;

    async fn complete(&self, api_key: &str, request: CompletionRequest) -> anyhow::Result<String>;
}
