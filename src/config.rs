// ABOUTME: Explicit configuration for provider credentials, timeouts and the cache.
// ABOUTME: Loaded once from the environment (and .env) and passed to constructors.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::ConfigError;

const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_TOOL_TIMEOUT_SECS: u64 = 120;
const DEFAULT_CACHE_TTL_SECS: u64 = 500;
const DEFAULT_COMPARISON_CONCURRENCY: usize = 3;

/// Runtime configuration.
///
/// Credentials are optional here; components that need one report
/// [`ConfigError::MissingCredential`] when they are constructed or used.
#[derive(Clone)]
pub struct Config {
    pub openai_api_key: Option<String>,
    pub claude_api_key: Option<String>,
    pub gemini_api_key: Option<String>,
    pub mistral_api_key: Option<String>,
    pub huggingface_api_token: Option<String>,

    /// Model backing the orchestrator itself.
    pub agent_model: String,

    /// Bound on every outbound HTTP request.
    pub request_timeout: Duration,

    /// Bound on a single tool execution inside the agent loop.
    pub tool_timeout: Duration,

    pub cache_ttl: Duration,
    pub cache_dir: PathBuf,

    /// Worker count for comparison fan-out.
    pub comparison_concurrency: usize,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let redact = |k: &Option<String>| k.as_ref().map(|_| "..");
        f.debug_struct("Config")
            .field("openai_api_key", &redact(&self.openai_api_key))
            .field("claude_api_key", &redact(&self.claude_api_key))
            .field("gemini_api_key", &redact(&self.gemini_api_key))
            .field("mistral_api_key", &redact(&self.mistral_api_key))
            .field("huggingface_api_token", &redact(&self.huggingface_api_token))
            .field("agent_model", &self.agent_model)
            .field("request_timeout", &self.request_timeout)
            .field("tool_timeout", &self.tool_timeout)
            .field("cache_ttl", &self.cache_ttl)
            .field("cache_dir", &self.cache_dir)
            .field("comparison_concurrency", &self.comparison_concurrency)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            openai_api_key: None,
            claude_api_key: None,
            gemini_api_key: None,
            mistral_api_key: None,
            huggingface_api_token: None,
            agent_model: DEFAULT_MODEL.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            tool_timeout: Duration::from_secs(DEFAULT_TOOL_TIMEOUT_SECS),
            cache_ttl: Duration::from_secs(DEFAULT_CACHE_TTL_SECS),
            cache_dir: std::env::temp_dir(),
            comparison_concurrency: DEFAULT_COMPARISON_CONCURRENCY,
        }
    }
}

impl Config {
    /// Load from the process environment, reading `.env` first if present.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |var: &str| lookup(var).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let defaults = Self::default();

        Ok(Self {
            openai_api_key: get("OPENAI_API_KEY"),
            claude_api_key: get("CLAUDE_API_KEY").or_else(|| get("ANTHROPIC_API_KEY")),
            gemini_api_key: get("GEMINI_API_KEY").or_else(|| get("GOOGLE_API_KEY")),
            mistral_api_key: get("MISTRAL_API_KEY"),
            huggingface_api_token: get("HUGGINGFACEHUB_API_TOKEN"),
            agent_model: get("ORCHESTRA_MODEL").unwrap_or(defaults.agent_model),
            request_timeout: parse_secs(get("ORCHESTRA_TIMEOUT_SECS"), "ORCHESTRA_TIMEOUT_SECS")?
                .unwrap_or(defaults.request_timeout),
            tool_timeout: parse_secs(
                get("ORCHESTRA_TOOL_TIMEOUT_SECS"),
                "ORCHESTRA_TOOL_TIMEOUT_SECS",
            )?
            .unwrap_or(defaults.tool_timeout),
            cache_ttl: parse_secs(get("ORCHESTRA_CACHE_TTL_SECS"), "ORCHESTRA_CACHE_TTL_SECS")?
                .unwrap_or(defaults.cache_ttl),
            cache_dir: get("ORCHESTRA_CACHE_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.cache_dir),
            comparison_concurrency: match get("ORCHESTRA_COMPARISON_CONCURRENCY") {
                Some(raw) => match raw.parse::<usize>() {
                    Ok(n) if n > 0 => n,
                    _ => {
                        return Err(ConfigError::Invalid {
                            var: "ORCHESTRA_COMPARISON_CONCURRENCY",
                            value: raw,
                        });
                    }
                },
                None => defaults.comparison_concurrency,
            },
        })
    }

    /// The OpenAI key, required by the orchestrator's backing model.
    pub fn require_openai_key(&self) -> Result<&str, ConfigError> {
        self.openai_api_key
            .as_deref()
            .ok_or(ConfigError::MissingCredential {
                provider: "openai",
                var: "OPENAI_API_KEY",
            })
    }
}

fn parse_secs(raw: Option<String>, var: &'static str) -> Result<Option<Duration>, ConfigError> {
    match raw {
        None => Ok(None),
        Some(value) => match value.parse::<u64>() {
            Ok(secs) if secs > 0 => Ok(Some(Duration::from_secs(secs))),
            _ => Err(ConfigError::Invalid { var, value }),
        },
    }
}
