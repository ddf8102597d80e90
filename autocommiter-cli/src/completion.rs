//! OpenAI-style chat completion client.

use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

const USER_AGENT: &str = concat!("autocommiter/", env!("CARGO_PKG_VERSION"));
const TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    messages: [ChatMessage<'a>; 2],
    model: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

pub struct CompletionClient {
    agent: ureq::Agent,
    endpoint: String,
    token: String,
    model: String,
}

impl CompletionClient {
    pub fn new(endpoint: &str, token: &str, model: &str) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(TIMEOUT)
            .user_agent(USER_AGENT)
            .build();
        Self {
            agent,
            endpoint: endpoint.to_string(),
            token: token.to_string(),
            model: model.to_string(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Send one system + user exchange and return the trimmed reply.
    pub fn complete(&self, system: &str, user: &str) -> Result<String> {
        let request = ChatRequest {
            messages: [
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
            model: &self.model,
        };

        tracing::debug!(endpoint = %self.endpoint, model = %self.model, "requesting completion");
        let response = self
            .agent
            .post(&self.endpoint)
            .set("Authorization", &format!("Bearer {}", self.token))
            .set("Content-Type", "application/json")
            .send_json(&request);

        let body: ChatResponse = match response {
            Ok(resp) => resp
                .into_json()
                .context("failed to decode completion response")?,
            Err(ureq::Error::Status(code, resp)) => {
                let body = resp.into_string().unwrap_or_default();
                bail!("completion request failed with status {code}: {}", body.trim());
            }
            Err(err) => bail!("completion request failed: {err}"),
        };

        extract_message(body)
    }
}

fn extract_message(body: ChatResponse) -> Result<String> {
    body.choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .map(|content| content.trim().to_string())
        .filter(|content| !content.is_empty())
        .context("completion response contained no message")
}
