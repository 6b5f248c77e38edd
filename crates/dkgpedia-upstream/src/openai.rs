//! OpenAI-compatible chat client used as the term-substitution corrector.

use async_trait::async_trait;
use dkgpedia_core::correction::Corrector;
use dkgpedia_core::{Config, DkgError, DkgResult};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::http::{send_error, trim_base, UpstreamResponse};

const SERVICE: &str = "language model";

const SYSTEM_PROMPT: &str = "You are a precise text editor. You replace terms exactly as instructed \
and never change anything else: wording, formatting, punctuation and line breaks stay as they are.";

/// Build the user prompt for one substitution.
pub fn substitution_prompt(paragraph: &str, old: &str, new: &str) -> String {
    format!(
        "Replace all occurrences of \"{old}\" with \"{new}\" in the text below. \
Keep everything else exactly as written, including formatting, punctuation and line breaks. \
Return only the modified text, with no explanation.\n\nText:\n{paragraph}"
    )
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Chat-completions client implementing [`Corrector`].
#[derive(Clone)]
pub struct OpenAiCorrector {
    base_url: String,
    api_key: Option<String>,
    model: String,
    client: reqwest::Client,
}

impl OpenAiCorrector {
    pub fn new(base_url: &str, api_key: Option<String>, model: &str) -> Self {
        Self {
            base_url: trim_base(base_url),
            api_key,
            model: model.to_string(),
            client: reqwest::Client::new(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            &config.openai_base_url,
            config.openai_api_key.clone(),
            &config.openai_model,
        )
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// One chat completion; returns the trimmed assistant text.
    pub async fn complete(&self, prompt: &str) -> DkgResult<String> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| DkgError::Config("OPENAI_API_KEY is not set".to_string()))?;

        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            temperature: 0.0,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| send_error(SERVICE, e))?;
        let body = UpstreamResponse::read(SERVICE, response)
            .await?
            .into_json(SERVICE)?;

        let parsed: ChatResponse = serde_json::from_value(body)?;
        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default();
        debug!(model = %self.model, chars = content.len(), "Chat completion received");
        Ok(content.trim().to_string())
    }
}

#[async_trait]
impl Corrector for OpenAiCorrector {
    async fn replace_term(&self, paragraph: &str, old: &str, new: &str) -> DkgResult<String> {
        self.complete(&substitution_prompt(paragraph, old, new)).await
    }
}
