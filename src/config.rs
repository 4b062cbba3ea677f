use std::str::FromStr;

/// Default OpenWeatherMap host. Overridable so tests can point at a mock server.
const DEFAULT_OWM_BASE_URL: &str = "https://api.openweathermap.org";
/// Default location of the persisted regression model artifact.
const DEFAULT_MODEL_PATH: &str = "./model/climbing_conditions_model.json";
/// Per-call timeout for upstream weather requests (seconds).
const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 10;

/// Which scoring strategy backs the Climbing Conditions Score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScorerKind {
    /// Trained regression model loaded from `MODEL_PATH`.
    Model,
    /// Hand-tuned penalty formula; needs no artifact.
    Formula,
}

impl ScorerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScorerKind::Model => "model",
            ScorerKind::Formula => "formula",
        }
    }
}

impl FromStr for ScorerKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "model" => Ok(ScorerKind::Model),
            "formula" => Ok(ScorerKind::Formula),
            other => Err(format!(
                "unknown scorer '{}', expected 'model' or 'formula'",
                other
            )),
        }
    }
}

/// Application configuration, parsed from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub owm_api_key: String,
    pub owm_base_url: String,
    pub port: u16,
    pub scorer: ScorerKind,
    /// Path to the JSON model artifact (only read when `scorer` is `Model`).
    pub model_path: String,
    pub fetch_timeout_secs: u64,
    /// Emit JSON log lines instead of the human-readable format.
    pub json_logs: bool,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            owm_api_key: std::env::var("OWM_API_KEY").expect("OWM_API_KEY must be set"),
            owm_base_url: std::env::var("OWM_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_OWM_BASE_URL.to_string()),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .expect("PORT must be a valid u16"),
            scorer: std::env::var("SCORER")
                .unwrap_or_else(|_| "model".to_string())
                .parse()
                .expect("SCORER must be 'model' or 'formula'"),
            model_path: std::env::var("MODEL_PATH")
                .unwrap_or_else(|_| DEFAULT_MODEL_PATH.to_string()),
            fetch_timeout_secs: std::env::var("FETCH_TIMEOUT_SECS")
                .unwrap_or_else(|_| DEFAULT_FETCH_TIMEOUT_SECS.to_string())
                .parse()
                .expect("FETCH_TIMEOUT_SECS must be a whole number of seconds"),
            json_logs: std::env::var("LOG_FORMAT")
                .map(|v| v.eq_ignore_ascii_case("json"))
                .unwrap_or(false),
        }
    }
}
