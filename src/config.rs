use std::env;
use std::path::PathBuf;
use std::time::Duration;

use tracing::debug;

pub const DEFAULT_MODEL: &str = "llama-4-scout-17b-16e-instruct";
const DEFAULT_MAX_TOKENS: u32 = 600;
const DEFAULT_TEMPERATURE: f32 = 0.2;
const DEFAULT_MAX_RESULTS: usize = 5;
const DEFAULT_FOLLOW_UP_RESULTS: usize = 4;
const DEFAULT_MAX_CONTENT_CHARS: usize = 1000;
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_OUTPUT_DIR: &str = "output";
const MAX_RESULTS_CAP: usize = 25;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} not set. Add it to your environment or a .env file")]
    Missing(&'static str),

    #[error("invalid value for {var} ({value:?}): {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Clone, PartialEq)]
pub struct ApiKey(String);

impl ApiKey {
    #[cfg(test)]
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("[REDACTED]")
    }
}

/// Knobs the orchestrator reads on every research call.
#[derive(Debug, Clone)]
pub struct ResearchSettings {
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub max_results: usize,
    pub follow_up_results: usize,
    pub max_content_chars: usize,
    /// Documents with fewer characters than this are dropped before synthesis.
    pub min_content_chars: usize,
}

impl Default for ResearchSettings {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
            max_results: DEFAULT_MAX_RESULTS,
            follow_up_results: DEFAULT_FOLLOW_UP_RESULTS,
            max_content_chars: DEFAULT_MAX_CONTENT_CHARS,
            min_content_chars: 0,
        }
    }
}

/// Startup configuration.
///
/// Environment variables:
/// - `EXA_API_KEY`, `CEREBRAS_API_KEY`: required
/// - `CEREBRAS_MODEL`, `QUARRY_MAX_TOKENS`, `QUARRY_TEMPERATURE`
/// - `QUARRY_MAX_RESULTS`, `QUARRY_FOLLOW_UP_RESULTS`
/// - `QUARRY_MAX_CONTENT_CHARS`, `QUARRY_MIN_CONTENT_CHARS`
/// - `QUARRY_TIMEOUT_SECS`, `QUARRY_OUTPUT_DIR`
#[derive(Debug, Clone)]
pub struct Config {
    pub exa_api_key: ApiKey,
    pub cerebras_api_key: ApiKey,
    pub request_timeout: Duration,
    pub output_dir: PathBuf,
    pub research: ResearchSettings,
}

impl Config {
    /// Loads `.env` (if present) and then reads the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        match dotenvy::dotenv() {
            Ok(path) => debug!(path = %path.display(), "loaded .env"),
            Err(e) => debug!("no .env loaded: {e}"),
        }
        Self::from_lookup(|var| env::var(var).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let exa_api_key = required_key(&lookup, "EXA_API_KEY")?;
        let cerebras_api_key = required_key(&lookup, "CEREBRAS_API_KEY")?;

        let model = optional(&lookup, "CEREBRAS_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string());
        let max_tokens = parse_or(&lookup, "QUARRY_MAX_TOKENS", DEFAULT_MAX_TOKENS, |v| *v > 0)?;
        let temperature = parse_or(&lookup, "QUARRY_TEMPERATURE", DEFAULT_TEMPERATURE, |v| {
            (0.0..=2.0).contains(v)
        })?;
        let max_results = parse_or(&lookup, "QUARRY_MAX_RESULTS", DEFAULT_MAX_RESULTS, |v| {
            (1..=MAX_RESULTS_CAP).contains(v)
        })?;
        let follow_up_results = parse_or(
            &lookup,
            "QUARRY_FOLLOW_UP_RESULTS",
            DEFAULT_FOLLOW_UP_RESULTS,
            |v| (1..=MAX_RESULTS_CAP).contains(v),
        )?;
        let max_content_chars = parse_or(
            &lookup,
            "QUARRY_MAX_CONTENT_CHARS",
            DEFAULT_MAX_CONTENT_CHARS,
            |v| *v > 0,
        )?;
        let min_content_chars = parse_or(&lookup, "QUARRY_MIN_CONTENT_CHARS", 0usize, |_| true)?;
        let timeout_secs = parse_or(&lookup, "QUARRY_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS, |v| *v > 0)?;
        let output_dir = optional(&lookup, "QUARRY_OUTPUT_DIR")
            .unwrap_or_else(|| DEFAULT_OUTPUT_DIR.to_string());

        Ok(Self {
            exa_api_key,
            cerebras_api_key,
            request_timeout: Duration::from_secs(timeout_secs),
            output_dir: PathBuf::from(output_dir),
            research: ResearchSettings {
                model,
                max_tokens,
                temperature,
                max_results,
                follow_up_results,
                max_content_chars,
                min_content_chars,
            },
        })
    }
}

fn optional(lookup: &impl Fn(&str) -> Option<String>, var: &str) -> Option<String> {
    lookup(var)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn required_key(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
) -> Result<ApiKey, ConfigError> {
    let key = optional(lookup, var).ok_or(ConfigError::Missing(var))?;
    // .env.example ships values like "your-exa-api-key"
    if key.starts_with("your-") && key.ends_with("-api-key") {
        return Err(ConfigError::Missing(var));
    }
    Ok(ApiKey(key))
}

fn parse_or<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
    default: T,
    valid: impl Fn(&T) -> bool,
) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let Some(raw) = optional(lookup, var) else {
        return Ok(default);
    };
    let value = raw.parse::<T>().map_err(|e| ConfigError::Invalid {
        var,
        value: raw.clone(),
        reason: e.to_string(),
    })?;
    if !valid(&value) {
        return Err(ConfigError::Invalid {
            var,
            value: raw,
            reason: "out of range".to_string(),
        });
    }
    Ok(value)
}
