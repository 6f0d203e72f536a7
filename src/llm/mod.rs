pub mod embedder;
pub mod openai;
pub mod prompts;

use crate::errors::{Error, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Declaration of a callable tool, in OpenAI function-calling shape.
#[derive(Debug, Clone)]
pub struct ToolSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub parameters: Value,
}

/// One tool invocation the model asked for.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolCall {
    pub name: String,
    pub arguments: Value,
}

/// What came back from a tool-enabled completion: free text, tool calls,
/// or both.
#[derive(Debug, Clone, Default)]
pub struct ToolOutcome {
    pub message: Option<String>,
    pub calls: Vec<ToolCall>,
}

/// Chat model seam. The interactive shell only ever talks to this trait,
/// which keeps the natural-language paths scriptable in tests.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    fn name(&self) -> &'static str;
    async fn complete(&self, system: &str, user: &str) -> Result<String>;
    async fn complete_with_tools(
        &self,
        system: &str,
        user: &str,
        tools: &[ToolSpec],
    ) -> Result<ToolOutcome>;
}

/// Embedding seam with the same role as [`LlmProvider`].
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    fn name(&self) -> &'static str;
    fn dimensions(&self) -> usize;
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        let mut out = Vec::with_capacity(texts.len());
        for text in texts {
            out.push(self.embed(text).await?);
        }
        Ok(out)
    }
}

/// Parse a JSON payload out of a model reply, tolerating markdown fences
/// and surrounding prose.
pub fn parse_structured<T: DeserializeOwned>(raw: &str) -> Result<T> {
    let candidate = extract_json(raw);
    serde_json::from_str(candidate).map_err(|e| {
        Error::llm(format!(
            "Model reply was not valid JSON ({e}). Reply started with: {}",
            truncate(raw, 120)
        ))
    })
}

fn extract_json(raw: &str) -> &str {
    let trimmed = raw.trim();
    // Fenced block wins if present.
    if let Some(start) = trimmed.find("```") {
        let after = &trimmed[start + 3..];
        let after = after.strip_prefix("json").unwrap_or(after);
        if let Some(end) = after.find("```") {
            return after[..end].trim();
        }
    }
    // Otherwise take the outermost object or array.
    let open = trimmed.find(['{', '[']);
    let close = trimmed.rfind(['}', ']']);
    match (open, close) {
        (Some(o), Some(c)) if c > o => &trimmed[o..=c],
        _ => trimmed,
    }
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
