use crate::errors::{Error, Result};
use crate::llm::{LlmProvider, ToolCall, ToolOutcome, ToolSpec};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Chat client for any OpenAI-compatible completions endpoint.
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<Value>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    tool_calls: Vec<RawToolCall>,
}

#[derive(Debug, Deserialize)]
struct RawToolCall {
    function: RawFunction,
}

#[derive(Debug, Deserialize)]
struct RawFunction {
    name: String,
    /// The API delivers arguments as a JSON-encoded string.
    arguments: String,
}

impl OpenAiClient {
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        api_key: Option<String>,
    ) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            client: reqwest::Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .unwrap_or_default(),
            base_url,
            api_key,
            model: model.into(),
        }
    }

    async fn chat(&self, request: ChatRequest<'_>) -> Result<ResponseMessage> {
        let mut builder = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .json(&request);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }
        let response = builder.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::llm(format!("Chat API returned {status}: {body}")));
        }

        let parsed: ChatResponse = response.json().await?;
        parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message)
            .ok_or_else(|| Error::llm("Chat API returned no choices."))
    }

    fn tool_payload(tools: &[ToolSpec]) -> Vec<Value> {
        tools
            .iter()
            .map(|t| {
                json!({
                    "type": "function",
                    "function": {
                        "name": t.name,
                        "description": t.description,
                        "parameters": t.parameters,
                    }
                })
            })
            .collect()
    }
}

#[async_trait]
impl LlmProvider for OpenAiClient {
    fn name(&self) -> &'static str {
        "openai"
    }

    async fn complete(&self, system: &str, user: &str) -> Result<String> {
        let message = self
            .chat(ChatRequest {
                model: &self.model,
                messages: vec![
                    ChatMessage {
                        role: "system",
                        content: system,
                    },
                    ChatMessage {
                        role: "user",
                        content: user,
                    },
                ],
                tools: None,
            })
            .await?;
        message
            .content
            .ok_or_else(|| Error::llm("Chat API returned an empty message."))
    }

    async fn complete_with_tools(
        &self,
        system: &str,
        user: &str,
        tools: &[ToolSpec],
    ) -> Result<ToolOutcome> {
        let message = self
            .chat(ChatRequest {
                model: &self.model,
                messages: vec![
                    ChatMessage {
                        role: "system",
                        content: system,
                    },
                    ChatMessage {
                        role: "user",
                        content: user,
                    },
                ],
                tools: Some(Self::tool_payload(tools)),
            })
            .await?;

        let mut calls = Vec::with_capacity(message.tool_calls.len());
        for raw in message.tool_calls {
            let arguments: Value = serde_json::from_str(&raw.function.arguments)
                .map_err(|e| Error::llm(format!("Tool call arguments were not JSON: {e}")))?;
            calls.push(ToolCall {
                name: raw.function.name,
                arguments,
            });
        }
        Ok(ToolOutcome {
            message: message.content,
            calls,
        })
    }
}
