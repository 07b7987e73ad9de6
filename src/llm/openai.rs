//! OpenAI-compatible chat completions client.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use super::prompts::{
    describe_user_prompt, rate_function, rating_user_prompt, DESCRIBE_SYSTEM_PROMPT,
    RATE_FUNCTION_NAME, RATING_SYSTEM_PROMPT,
};
use super::{LlmError, LlmResult};
use crate::discovery::rating::description_placeholder;
use crate::discovery::{CandidateMatch, RelationshipRater, Strength, TableDescriber};
use crate::source::QueryResult;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o";

/// Client for `{base_url}/chat/completions`.
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Debug, Deserialize)]
struct Message {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    function_call: Option<FunctionCall>,
}

#[derive(Debug, Deserialize)]
struct FunctionCall {
    name: String,
    arguments: String,
}

#[derive(Debug, Deserialize)]
struct RateArguments {
    strengths: Vec<String>,
}

impl OpenAiClient {
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        base_url: impl Into<String>,
    ) -> LlmResult<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(LlmError::MissingApiKey);
        }
        Ok(Self {
            http: reqwest::Client::new(),
            api_key,
            model: model.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn rating_request(&self, matches: &[CandidateMatch]) -> Value {
        json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": RATING_SYSTEM_PROMPT},
                {"role": "user", "content": rating_user_prompt(matches)},
            ],
            "functions": [rate_function()],
            "function_call": {"name": RATE_FUNCTION_NAME},
        })
    }

    fn describe_request(&self, table: &str, sample: &QueryResult) -> Value {
        json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": DESCRIBE_SYSTEM_PROMPT},
                {"role": "user", "content": describe_user_prompt(table, sample)},
            ],
            "temperature": 0.2,
        })
    }

    async fn post(&self, body: &Value) -> LlmResult<ChatResponse> {
        let response = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(LlmError::Status {
                status: status.as_u16(),
                body: text,
            });
        }
        Ok(serde_json::from_str(&text)?)
    }

    /// Rate a batch through the `rate_matches` function call.
    pub async fn rate_matches(&self, matches: &[CandidateMatch]) -> LlmResult<Vec<Strength>> {
        debug!(count = matches.len(), model = %self.model, "requesting ratings");
        let response = self.post(&self.rating_request(matches)).await?;
        parse_strengths(&function_arguments(response)?)
    }

    /// Describe a table from its sample rows.
    pub async fn describe_table(&self, table: &str, sample: &QueryResult) -> LlmResult<String> {
        let response = self.post(&self.describe_request(table, sample)).await?;
        message_content(response)
    }
}

fn first_message(response: ChatResponse) -> LlmResult<Message> {
    response
        .choices
        .into_iter()
        .next()
        .map(|c| c.message)
        .ok_or_else(|| LlmError::UnexpectedResponse("empty choices array".into()))
}

fn function_arguments(response: ChatResponse) -> LlmResult<String> {
    let message = first_message(response)?;
    match message.function_call {
        Some(call) if call.name == RATE_FUNCTION_NAME => Ok(call.arguments),
        Some(call) => Err(LlmError::UnexpectedResponse(format!(
            "unexpected function '{}'",
            call.name
        ))),
        None => Err(LlmError::UnexpectedResponse(format!(
            "no function call, content: {}",
            message.content.unwrap_or_default()
        ))),
    }
}

fn message_content(response: ChatResponse) -> LlmResult<String> {
    first_message(response)?
        .content
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .ok_or_else(|| LlmError::UnexpectedResponse("empty message content".into()))
}

fn parse_strengths(arguments: &str) -> LlmResult<Vec<Strength>> {
    let args: RateArguments = serde_json::from_str(arguments)?;
    args.strengths
        .iter()
        .map(|s| Strength::parse(s).ok_or_else(|| LlmError::InvalidRating(s.clone())))
        .collect()
}

#[async_trait]
impl RelationshipRater for OpenAiClient {
    async fn rate(&self, matches: &[CandidateMatch]) -> Vec<Strength> {
        if matches.is_empty() {
            return Vec::new();
        }
        match self.rate_matches(matches).await {
            Ok(strengths) => strengths,
            Err(e) => {
                warn!(error = %e, "rating failed, treating all pairs as weak");
                Strength::unavailable(matches.len())
            }
        }
    }
}

#[async_trait]
impl TableDescriber for OpenAiClient {
    async fn describe(&self, table: &str, sample: &QueryResult) -> String {
        match self.describe_table(table, sample).await {
            Ok(text) => text,
            Err(e) => {
                warn!(table, error = %e, "description failed");
                description_placeholder(e)
            }
        }
    }
}
