use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::extractive::{off_runtime, plain_text};
use super::Enricher;
use crate::error::EnrichmentError;

/// Summarizer backed by an OpenAI-compatible chat completions endpoint.
///
/// Per-call deadlines are enforced by the enrichment stage, not here.
pub struct RemoteEnricher {
    api_url: String,
    api_key: String,
    model: String,
    max_tokens: usize,
    temperature: f32,
    client: reqwest::Client,
}

impl RemoteEnricher {
    pub fn new(
        api_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            api_url: api_url.into(),
            api_key: api_key.into(),
            model: model.into(),
            max_tokens: 200,
            temperature: 0.3,
            client: reqwest::Client::new(),
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: usize) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    fn prompt(content: &str) -> String {
        format!(
            "Summarize the following news article in two or three sentences. \
             Keep the original language. Reply with the summary text only.\n\n\
             ARTICLE:\n{}",
            plain_text(content)
        )
    }
}

#[async_trait]
impl Enricher for RemoteEnricher {
    async fn summarize(&self, content: &str) -> Result<String, EnrichmentError> {
        let content = content.to_string();
        let prompt = off_runtime(move || Self::prompt(&content)).await?;
        let req_body = ChatRequest {
            model: self.model.clone(),
            messages: vec![Message {
                role: "user".to_string(),
                content: prompt,
            }],
            max_tokens: Some(self.max_tokens),
            temperature: Some(self.temperature),
        };

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&req_body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(EnrichmentError::Status { status, body });
        }

        let resp_body: ChatResponse = response.json().await?;
        let text = resp_body
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content.trim().to_string())
            .unwrap_or_default();

        if text.is_empty() {
            return Err(EnrichmentError::Empty);
        }
        Ok(text)
    }
}

// OpenAI API request/response structures
#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Message,
}
