use std::time::Duration;

use anyhow::{bail, Context, Result};
use reqwest::blocking::{Client as HttpClient, Response as HttpResponse};
use serde_json::Value;

use crate::config::StudioConfig;
use crate::payload::ProviderRequest;

/// The remote side of a batch: one call per step, plus the usage lookup.
pub trait GenerationTransport {
    fn generate_content(&self, credential: &str, request: &ProviderRequest) -> Result<Value>;
    fn fetch_usage(&self, credential: &str) -> Result<Value>;
}

pub struct GeminiClient {
    api_base: String,
    model: String,
    timeout: Duration,
    http: HttpClient,
}

impl GeminiClient {
    pub fn new(config: &StudioConfig) -> Self {
        Self {
            api_base: config.api_base.trim_end_matches('/').to_string(),
            model: config.model.trim().to_string(),
            timeout: Duration::from_secs_f64(config.request_timeout_s),
            http: HttpClient::new(),
        }
    }

    pub fn generate_endpoint(&self) -> String {
        let model_path = if self.model.starts_with("models/") {
            self.model.clone()
        } else {
            format!("models/{}", self.model)
        };
        format!("{}/{}:generateContent", self.api_base, model_path)
    }

    pub fn usage_endpoint(&self) -> String {
        format!("{}/usage", self.api_base)
    }
}

impl GenerationTransport for GeminiClient {
    fn generate_content(&self, credential: &str, request: &ProviderRequest) -> Result<Value> {
        let endpoint = self.generate_endpoint();
        let response = self
            .http
            .post(&endpoint)
            .query(&[("key", credential)])
            .timeout(self.timeout)
            .json(request)
            .send()
            .with_context(|| format!("Gemini request failed ({endpoint})"))?;
        response_json_or_error("Gemini", response)
    }

    fn fetch_usage(&self, credential: &str) -> Result<Value> {
        let endpoint = self.usage_endpoint();
        let response = self
            .http
            .get(&endpoint)
            .query(&[("key", credential)])
            .timeout(self.timeout)
            .send()
            .with_context(|| format!("Gemini usage request failed ({endpoint})"))?;
        response_json_or_error("Gemini usage", response)
    }
}

fn response_json_or_error(provider: &str, response: HttpResponse) -> Result<Value> {
    let status = response.status();
    let code = status.as_u16();
    let body = response
        .text()
        .with_context(|| format!("{provider} response body read failed"))?;
    if !status.is_success() {
        bail!(
            "{provider} request failed ({code}): {}",
            truncate_text(&body, 512)
        );
    }
    let parsed: Value = serde_json::from_str(&body)
        .with_context(|| format!("{provider} returned invalid JSON payload"))?;
    Ok(parsed)
}

pub(crate) fn truncate_text(value: &str, max_chars: usize) -> String {
    if value.chars().count() <= max_chars {
        return value.to_string();
    }
    value.chars().take(max_chars).collect::<String>() + "…"
}

/// Flattens an error chain into one line for logs and event payloads.
pub fn error_chain_text(err: &anyhow::Error, max_chars: usize) -> String {
    let mut parts: Vec<String> = Vec::new();
    for cause in err.chain() {
        let text = cause.to_string();
        let trimmed = text.trim();
        if trimmed.is_empty() || parts.last().map(String::as_str) == Some(trimmed) {
            continue;
        }
        parts.push(trimmed.to_string());
    }
    if parts.is_empty() {
        return truncate_text(&err.to_string(), max_chars);
    }
    truncate_text(&parts.join(" | caused by: "), max_chars)
}

#[cfg(test)]
mod tests {
    use super::{error_chain_text, truncate_text, GeminiClient};
    use crate::config::StudioConfig;
    use crate::count::ImageCount;
    use crate::orchestrator::BatchPlan;
    use crate::testing::{image_reply, ScriptedTransport};

    #[test]
    fn endpoints_follow_model_and_base() {
        let mut config = StudioConfig::default();
        let client = GeminiClient::new(&config);
        assert_eq!(
            client.generate_endpoint(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.5-flash:generateContent"
        );
        assert_eq!(
            client.usage_endpoint(),
            "https://generativelanguage.googleapis.com/v1beta/usage"
        );

        config.set_api_base("http://127.0.0.1:9/v1beta/");
        config.model = "models/gemini-2.5-flash-image".to_string();
        let client = GeminiClient::new(&config);
        assert_eq!(
            client.generate_endpoint(),
            "http://127.0.0.1:9/v1beta/models/gemini-2.5-flash-image:generateContent"
        );
    }

    #[test]
    fn truncate_text_marks_cut_bodies() {
        assert_eq!(truncate_text("short", 10), "short");
        assert_eq!(truncate_text("abcdef", 3), "abc…");
    }

    #[test]
    fn failed_step_renders_call_position_then_cause() -> anyhow::Result<()> {
        let transport = ScriptedTransport::new();
        transport.push_reply(Ok(image_reply(&["ok"])));
        transport.push_reply(Err("Gemini request failed (503): overloaded".to_string()));
        let plan = BatchPlan::new("key", "lighthouse", &[], ImageCount::clamp(3))?;

        let failure = plan
            .steps(&transport)
            .find_map(Result::err)
            .ok_or_else(|| anyhow::anyhow!("second call should fail"))?;
        assert_eq!(
            error_chain_text(&failure, 400),
            "generation call 2 of 3 failed | caused by: Gemini request failed (503): overloaded"
        );
        assert_eq!(error_chain_text(&failure, 22), "generation call 2 of 3…");
        Ok(())
    }
}
