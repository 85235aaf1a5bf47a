//! The opaque text-completion boundary.
//!
//! The pipeline is generic over anything that can turn a (system prompt,
//! user content) pair into text. Production uses an OpenAI-compatible chat
//! endpoint with model-rotation failover on rate/quota limits; the test
//! suite injects [`crate::CannedClient`] and never touches the network.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use anyhow::{Context, Result, anyhow, bail};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use reqwest::header::{HeaderMap, RETRY_AFTER};
use serde_json::{Value, json};
use tracing::warn;

const DEFAULT_COOLDOWN: Duration = Duration::from_secs(600);

/// One-method capability: `(system prompt, user content) -> text`.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, system_prompt: &str, user_content: &str) -> Result<String>;
}

/// OpenAI-compatible chat-completions client.
#[derive(Debug)]
pub struct ApiClient {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
    rotator: Mutex<ModelRotator>,
}

impl ApiClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        models: Vec<String>,
    ) -> Result<Self> {
        if models.is_empty() {
            bail!("at least one model is required for ApiClient");
        }

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            client: reqwest::Client::new(),
            rotator: Mutex::new(ModelRotator::new(models)),
        })
    }
}

#[async_trait]
impl CompletionClient for ApiClient {
    async fn complete(&self, system_prompt: &str, user_content: &str) -> Result<String> {
        loop {
            let model = {
                let mut rotator = self
                    .rotator
                    .lock()
                    .map_err(|_| anyhow!("model rotator poisoned"))?;
                if rotator.all_exhausted() {
                    bail!("all analysis models are currently in cooldown");
                }
                rotator.next_available().to_string()
            };

            let url = format!("{}/chat/completions", self.base_url);
            let response = self
                .client
                .post(&url)
                .bearer_auth(&self.api_key)
                .json(&json!({
                    "model": model,
                    "messages": [
                        {"role": "system", "content": system_prompt},
                        {"role": "user", "content": user_content}
                    ],
                    "temperature": 0.2
                }))
                .send()
                .await
                .with_context(|| format!("completion request failed for model {model}"))?;

            let status = response.status();
            let headers = response.headers().clone();
            let body = response
                .text()
                .await
                .with_context(|| format!("failed to read response body for model {model}"))?;

            if status.is_success() {
                return parse_completion_content(&body);
            }

            if is_rate_or_quota_error(status, &body) {
                let cooldown = parse_retry_after(&headers).unwrap_or(DEFAULT_COOLDOWN);
                let has_next = {
                    let mut rotator = self
                        .rotator
                        .lock()
                        .map_err(|_| anyhow!("model rotator poisoned"))?;
                    rotator.mark_exhausted(&model, cooldown);
                    !rotator.all_exhausted()
                };

                if has_next {
                    warn!(
                        "rate limited on {}; rotating to next model (cooldown {}s)",
                        model,
                        cooldown.as_secs()
                    );
                    continue;
                }

                bail!(
                    "all analysis models exhausted after rate/quota limit; last model: {model}, status: {status}"
                );
            }

            return Err(anyhow!(
                "completion request failed for model {model}: status {status}, body {body}"
            ));
        }
    }
}

/// Round-robin over the configured models, skipping any still in cooldown.
#[derive(Debug, Clone)]
pub struct ModelRotator {
    models: Vec<String>,
    cooldowns: HashMap<String, Instant>,
    current_index: usize,
}

impl ModelRotator {
    pub fn new(models: Vec<String>) -> Self {
        assert!(
            !models.is_empty(),
            "ModelRotator requires at least one model"
        );
        Self {
            models,
            cooldowns: HashMap::new(),
            current_index: 0,
        }
    }

    pub fn next_available(&mut self) -> &str {
        self.purge_expired();
        let total = self.models.len();

        let mut chosen = self.current_index % total;
        for _ in 0..total {
            let index = self.current_index % total;
            self.current_index = (self.current_index + 1) % total;
            if !self.in_cooldown(&self.models[index]) {
                chosen = index;
                break;
            }
        }

        &self.models[chosen]
    }

    pub fn mark_exhausted(&mut self, model: &str, cooldown: Duration) {
        self.cooldowns
            .insert(model.to_string(), Instant::now() + cooldown);
    }

    pub fn all_exhausted(&self) -> bool {
        let now = Instant::now();
        self.models.iter().all(|model| {
            self.cooldowns
                .get(model)
                .is_some_and(|until| *until > now)
        })
    }

    fn in_cooldown(&self, model: &str) -> bool {
        let now = Instant::now();
        self.cooldowns
            .get(model)
            .is_some_and(|until| *until > now)
    }

    fn purge_expired(&mut self) {
        let now = Instant::now();
        self.cooldowns.retain(|_, until| *until > now);
    }
}

fn is_rate_or_quota_error(status: StatusCode, body: &str) -> bool {
    if status == StatusCode::TOO_MANY_REQUESTS {
        return true;
    }

    let body_lower = body.to_ascii_lowercase();
    body_lower.contains("rate_limit")
        || body_lower.contains("quota")
        || body_lower.contains("insufficient_quota")
}

fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
    let raw = headers.get(RETRY_AFTER)?.to_str().ok()?.trim();

    if let Ok(seconds) = raw.parse::<u64>() {
        return Some(Duration::from_secs(seconds));
    }

    let retry_at = DateTime::parse_from_rfc2822(raw).ok()?.with_timezone(&Utc);
    let seconds = (retry_at - Utc::now()).num_seconds().max(0) as u64;
    Some(Duration::from_secs(seconds))
}

fn parse_completion_content(body: &str) -> Result<String> {
    let value: Value =
        serde_json::from_str(body).context("failed to parse completion response JSON")?;
    let content = value
        .get("choices")
        .and_then(|choices| choices.get(0))
        .and_then(|choice| choice.get("message"))
        .and_then(|message| message.get("content"))
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| anyhow!("missing choices[0].message.content in completion response"))?;
    Ok(content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    #[test]
    fn test_rotator_round_robin() {
        let mut rotator = ModelRotator::new(vec!["gpt-a".to_string(), "gpt-b".to_string()]);
        assert_eq!(rotator.next_available(), "gpt-a");
        assert_eq!(rotator.next_available(), "gpt-b");
        assert_eq!(rotator.next_available(), "gpt-a");
    }

    #[test]
    fn test_rotator_skips_cooled_down_model() {
        let mut rotator = ModelRotator::new(vec!["gpt-a".to_string(), "gpt-b".to_string()]);
        rotator.mark_exhausted("gpt-a", Duration::from_secs(60));
        assert_eq!(rotator.next_available(), "gpt-b");
        assert_eq!(rotator.next_available(), "gpt-b");
    }

    #[test]
    fn test_rotator_cooldown_expiry() {
        let mut rotator = ModelRotator::new(vec!["gpt-a".to_string()]);
        rotator.mark_exhausted("gpt-a", Duration::from_secs(0));
        assert_eq!(rotator.next_available(), "gpt-a");
        assert!(!rotator.all_exhausted());
    }

    #[test]
    fn test_rotator_all_exhausted() {
        let mut rotator = ModelRotator::new(vec!["gpt-a".to_string(), "gpt-b".to_string()]);
        rotator.mark_exhausted("gpt-a", Duration::from_secs(60));
        rotator.mark_exhausted("gpt-b", Duration::from_secs(60));
        assert!(rotator.all_exhausted());
    }

    #[test]
    fn test_retry_after_seconds() {
        let mut headers = HeaderMap::new();
        headers.insert(RETRY_AFTER, HeaderValue::from_static("120"));
        assert_eq!(parse_retry_after(&headers), Some(Duration::from_secs(120)));
    }

    #[test]
    fn test_parse_completion_content() {
        let body = r#"{"choices":[{"message":{"content":"hello"}}]}"#;
        assert_eq!(parse_completion_content(body).unwrap(), "hello");
        assert!(parse_completion_content("{}").is_err());
        assert!(parse_completion_content("not json").is_err());
    }

    #[test]
    fn test_rate_or_quota_detection() {
        assert!(is_rate_or_quota_error(StatusCode::TOO_MANY_REQUESTS, ""));
        assert!(is_rate_or_quota_error(
            StatusCode::BAD_REQUEST,
            r#"{"error":"insufficient_quota"}"#
        ));
        assert!(!is_rate_or_quota_error(StatusCode::BAD_REQUEST, "oops"));
    }

    #[test]
    fn test_api_client_requires_models() {
        assert!(ApiClient::new("https://api.example.com/v1", "key", vec![]).is_err());
    }
}
