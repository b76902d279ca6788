use serde_json::Value;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionStage {
    /// Non-2xx response from the endpoint.
    Http,
    /// 2xx response whose body is not a usable completion.
    Decode,
}

impl CompletionStage {
    pub fn as_str(self) -> &'static str {
        match self {
            CompletionStage::Http => "http",
            CompletionStage::Decode => "decode",
        }
    }
}

/// A failed completion call. The raw body is kept for diagnostics and never
/// shown to end users.
#[derive(Debug, Clone)]
pub struct CompletionError {
    pub provider: &'static str,
    pub stage: CompletionStage,
    pub status: Option<u16>,
    pub detail: String,
    pub raw_body: Option<String>,
}

impl CompletionError {
    /// Uses the provider's `error.message` as the detail when the body carries one.
    pub fn http(provider: &'static str, status: u16, body: String) -> Self {
        let message = serde_json::from_str::<Value>(&body)
            .ok()
            .and_then(|v| v.pointer("/error/message")?.as_str().map(str::to_string));
        Self {
            provider,
            stage: CompletionStage::Http,
            status: Some(status),
            detail: message.unwrap_or_else(|| format!("status={status}")),
            raw_body: Some(body),
        }
    }

    pub fn decode(provider: &'static str, detail: impl Into<String>, raw_body: Option<String>) -> Self {
        Self {
            provider,
            stage: CompletionStage::Decode,
            status: None,
            detail: detail.into(),
            raw_body,
        }
    }
}

impl fmt::Display for CompletionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} completion failed at {}", self.provider, self.stage.as_str())?;
        if let Some(status) = self.status {
            write!(f, " (HTTP {status})")?;
        }
        write!(f, ": {}", self.detail)
    }
}

impl std::error::Error for CompletionError {}
