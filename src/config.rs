use crate::error::{ArchitectError, Result};
use serde::Serialize;
use std::str::FromStr;

const DEFAULT_BASE_URL: &str = "http://localhost:11434";
const DEFAULT_MODEL: &str = "codellama:7b";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8000";
const DEFAULT_CORS_ORIGINS: [&str; 3] = [
    "http://localhost",
    "http://localhost:8080",
    "http://localhost:5173",
];

/// Sampling knobs forwarded to the backend as `options`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SamplingOptions {
    pub temperature: f32,
    pub top_p: f32,
    pub top_k: u32,
}

impl Default for SamplingOptions {
    fn default() -> Self {
        // Low temperature keeps technical output consistent.
        Self {
            temperature: 0.1,
            top_p: 0.9,
            top_k: 40,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BackendConfig {
    pub base_url: String,
    pub model: String,
    pub timeout_secs: u64,
    pub sampling: SamplingOptions,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout_secs: 120,
            sampling: SamplingOptions::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub backend: BackendConfig,
    pub bind_addr: String,
    pub cors_origins: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend: BackendConfig::default(),
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            cors_origins: DEFAULT_CORS_ORIGINS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup, falling back to defaults for
    /// unset keys.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();
        let sampling = defaults.backend.sampling;

        let backend = BackendConfig {
            base_url: lookup("OLLAMA_BASE_URL").unwrap_or(defaults.backend.base_url),
            model: lookup("OLLAMA_MODEL").unwrap_or(defaults.backend.model),
            timeout_secs: parse_or(&lookup, "OLLAMA_TIMEOUT_SECS", defaults.backend.timeout_secs)?,
            sampling: SamplingOptions {
                temperature: parse_or(&lookup, "OLLAMA_TEMPERATURE", sampling.temperature)?,
                top_p: parse_or(&lookup, "OLLAMA_TOP_P", sampling.top_p)?,
                top_k: parse_or(&lookup, "OLLAMA_TOP_K", sampling.top_k)?,
            },
        };

        let cors_origins = match lookup("CORS_ORIGINS") {
            Some(raw) => raw
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect(),
            None => defaults.cors_origins,
        };

        Ok(Self {
            backend,
            bind_addr: lookup("BIND_ADDR").unwrap_or(defaults.bind_addr),
            cors_origins,
        })
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ArchitectError::Config {
            key: key.to_string(),
            reason: e.to_string(),
        }),
        None => Ok(default),
    }
}
