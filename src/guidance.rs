use std::time::Duration;

use anyhow::{anyhow, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::app::{Message, Role};

/// Fallback guidance text served by the canned backend.
const CANNED_GUIDANCE: &str = "Please remain calm. If you're experiencing chest pain: \
1. Sit down and rest 2. Take aspirin if available 3. Loosen any tight clothing \
4. Call emergency services immediately. Stay on the line with them until help arrives.";

/// Simulated backend latency, matching the reference behavior.
const CANNED_DELAY_MS: u64 = 1500;

#[derive(Serialize)]
struct WireMessage {
    role: String,
    content: String,
}

#[derive(Serialize)]
struct GuidanceRequest {
    messages: Vec<WireMessage>,
}

#[derive(Deserialize)]
struct GuidanceResponse {
    guidance: String,
}

fn to_wire(conversation: &[Message]) -> Vec<WireMessage> {
    conversation
        .iter()
        .map(|m| WireMessage {
            role: match m.role {
                Role::User => "user".to_string(),
                Role::Assistant => "assistant".to_string(),
            },
            content: m.content.clone(),
        })
        .collect()
}

/// HTTP client for a real guidance service. One request per submission; the
/// whole conversation so far is sent and a single guidance message comes back.
#[derive(Clone)]
pub struct GuidanceClient {
    client: Client,
    base_url: String,
}

impl GuidanceClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub async fn guide(&self, conversation: &[Message]) -> Result<String> {
        let url = format!("{}/api/guidance", self.base_url);

        let request = GuidanceRequest {
            messages: to_wire(conversation),
        };

        let response = self.client.post(&url).json(&request).send().await?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "Guidance request failed with status: {}",
                response.status()
            ));
        }

        let guidance_response: GuidanceResponse = response.json().await?;
        Ok(guidance_response.guidance)
    }
}

/// Stand-in backend used when no endpoint is configured: resolves with a
/// fixed guidance message after a simulated round-trip delay.
#[derive(Clone)]
pub struct CannedGuidance {
    delay: Duration,
}

impl CannedGuidance {
    pub fn new() -> Self {
        Self {
            delay: Duration::from_millis(CANNED_DELAY_MS),
        }
    }

    pub fn with_delay(delay: Duration) -> Self {
        Self { delay }
    }

    pub async fn guide(&self, _conversation: &[Message]) -> Result<String> {
        tokio::time::sleep(self.delay).await;
        Ok(CANNED_GUIDANCE.to_string())
    }
}

impl Default for CannedGuidance {
    fn default() -> Self {
        Self::new()
    }
}

/// The configured guidance backend. Remote when an endpoint is set, canned
/// otherwise.
#[derive(Clone)]
pub enum Backend {
    Canned(CannedGuidance),
    Remote(GuidanceClient),
}

impl Backend {
    pub fn from_endpoint(endpoint: Option<&str>) -> Self {
        match endpoint {
            Some(url) => Backend::Remote(GuidanceClient::new(url)),
            None => Backend::Canned(CannedGuidance::new()),
        }
    }

    pub async fn guide(&self, conversation: &[Message]) -> Result<String> {
        match self {
            Backend::Canned(canned) => canned.guide(conversation).await,
            Backend::Remote(client) => client.guide(conversation).await,
        }
    }

    pub fn describe(&self) -> &'static str {
        match self {
            Backend::Canned(_) => "canned",
            Backend::Remote(_) => "remote",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Local;

    fn user_message(content: &str) -> Message {
        Message {
            role: Role::User,
            content: content.to_string(),
            timestamp: Local::now(),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_canned_guidance_resolves_with_fixed_text() {
        let canned = CannedGuidance::new();
        let conversation = vec![user_message("chest pain")];
        let guidance = canned.guide(&conversation).await.unwrap();
        assert_eq!(guidance, CANNED_GUIDANCE);
    }

    #[tokio::test]
    async fn test_canned_guidance_with_zero_delay() {
        let canned = CannedGuidance::with_delay(Duration::from_millis(0));
        let guidance = canned.guide(&[]).await.unwrap();
        assert!(guidance.contains("Call emergency services"));
    }

    #[test]
    fn test_backend_defaults_to_canned_without_endpoint() {
        let backend = Backend::from_endpoint(None);
        assert_eq!(backend.describe(), "canned");

        let backend = Backend::from_endpoint(Some("http://localhost:8080"));
        assert_eq!(backend.describe(), "remote");
    }

    #[test]
    fn test_wire_format_roles() {
        let conversation = vec![
            user_message("I feel dizzy"),
            Message {
                role: Role::Assistant,
                content: "Sit down and rest.".to_string(),
                timestamp: Local::now(),
            },
        ];

        let wire = to_wire(&conversation);
        assert_eq!(wire.len(), 2);
        assert_eq!(wire[0].role, "user");
        assert_eq!(wire[1].role, "assistant");

        let body = serde_json::to_value(GuidanceRequest { messages: wire }).unwrap();
        assert_eq!(body["messages"][0]["content"], "I feel dizzy");
    }
}
