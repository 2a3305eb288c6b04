use std::time::Duration;

use anyhow::Context as _;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::LlmConfig;
use crate::domain::repository::Enricher;
use crate::domain::types::{Enrichment, Resource};
use crate::error::ApiServiceError;

const LLM_TIMEOUT: Duration = Duration::from_secs(30);

const SYSTEM_PROMPT: &str = "You review links submitted to a resource-sharing site. \
Reply with a single JSON object and nothing else: \
{\"summary\": string (at most 3 sentences), \"tags\": [string] (at most 5, lowercase), \
\"score\": number (0-100, usefulness and quality)}.";

/// OpenAI-compatible chat-completions client.
#[derive(Clone)]
pub struct LlmEnricher {
    client: Client,
    config: LlmConfig,
}

impl LlmEnricher {
    pub fn new(client: Client, config: LlmConfig) -> Self {
        Self { client, config }
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: String,
}

impl Enricher for LlmEnricher {
    async fn enrich(&self, resource: &Resource) -> Result<Enrichment, ApiServiceError> {
        let prompt = format!(
            "Title: {}\nDescription: {}\nLink: {}",
            resource.title, resource.description, resource.link
        );
        let request = ChatRequest {
            model: &self.config.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: &prompt,
                },
            ],
            temperature: 0.2,
        };

        let response: ChatResponse = self
            .client
            .post(&self.config.api_url)
            .bearer_auth(&self.config.api_key)
            .timeout(LLM_TIMEOUT)
            .json(&request)
            .send()
            .await
            .context("call LLM")?
            .error_for_status()
            .context("LLM returned an error status")?
            .json()
            .await
            .context("decode LLM response")?;

        let content = response
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .context("LLM returned no choices")?;
        tracing::debug!(resource_id = %resource.id, "enrichment received");
        Ok(parse_enrichment(&content)?)
    }
}

/// Models sometimes wrap the object in a ```json fence; take the outermost braces.
fn parse_enrichment(content: &str) -> anyhow::Result<Enrichment> {
    let start = content.find('{').context("no JSON object in LLM reply")?;
    let end = content.rfind('}').context("no JSON object in LLM reply")?;
    anyhow::ensure!(start < end, "no JSON object in LLM reply");
    serde_json::from_str(&content[start..=end]).context("parse LLM reply")
}
