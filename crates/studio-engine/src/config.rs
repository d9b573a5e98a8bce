use std::env;
use std::path::PathBuf;

pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_DATA_DIR: &str = ".image-studio";

const DEFAULT_TIMEOUT_S: f64 = 90.0;
const MIN_TIMEOUT_S: f64 = 15.0;
const MAX_TIMEOUT_S: f64 = 300.0;

#[derive(Debug, Clone, PartialEq)]
pub struct StudioConfig {
    pub api_base: String,
    pub model: String,
    pub request_timeout_s: f64,
    pub data_dir: PathBuf,
    pub events_path: Option<PathBuf>,
    /// Used when neither the caller nor storage supplies a credential.
    pub fallback_credential: Option<String>,
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            model: DEFAULT_MODEL.to_string(),
            request_timeout_s: DEFAULT_TIMEOUT_S,
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            events_path: None,
            fallback_credential: None,
        }
    }
}

impl StudioConfig {
    /// Defaults overlaid with `IMAGE_STUDIO_HOME`, `IMAGE_STUDIO_EVENTS`,
    /// `GEMINI_API_BASE`, `GEMINI_MODEL`, `GEMINI_REQUEST_TIMEOUT` and the
    /// `GEMINI_API_KEY`/`GOOGLE_API_KEY` fallback credential.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(home) = non_empty_env("IMAGE_STUDIO_HOME") {
            config.data_dir = PathBuf::from(home);
        }
        config.events_path = non_empty_env("IMAGE_STUDIO_EVENTS").map(PathBuf::from);
        if let Some(base) = non_empty_env("GEMINI_API_BASE") {
            config.set_api_base(&base);
        }
        if let Some(model) = non_empty_env("GEMINI_MODEL") {
            config.model = model;
        }
        if let Some(raw) = non_empty_env("GEMINI_REQUEST_TIMEOUT") {
            config.request_timeout_s = clamp_timeout(raw.parse::<f64>().ok());
        }
        config.fallback_credential = env_credential();
        config
    }

    pub fn set_api_base(&mut self, raw: &str) {
        let trimmed = raw.trim().trim_end_matches('/');
        if !trimmed.is_empty() {
            self.api_base = trimmed.to_string();
        }
    }

    pub fn storage_path(&self) -> PathBuf {
        self.data_dir.join("storage.json")
    }

    pub fn results_dir(&self) -> PathBuf {
        self.data_dir.join("results")
    }
}

/// Credential from `GEMINI_API_KEY`, then `GOOGLE_API_KEY`.
pub fn env_credential() -> Option<String> {
    non_empty_env("GEMINI_API_KEY").or_else(|| non_empty_env("GOOGLE_API_KEY"))
}

pub fn non_empty_env(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn clamp_timeout(value: Option<f64>) -> f64 {
    match value {
        Some(value) if value.is_finite() => value.clamp(MIN_TIMEOUT_S, MAX_TIMEOUT_S),
        _ => DEFAULT_TIMEOUT_S,
    }
}
