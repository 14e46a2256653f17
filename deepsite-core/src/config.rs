// Settings read from the environment (and an optional .env file)

use crate::error::{CoreError, Result};
use deepsite_scanner::CrawlConfig;
use std::str::FromStr;
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_OLLAMA_HOST: &str = "http://localhost:11434";
pub const DEFAULT_OLLAMA_MODEL: &str = "llama3.1:8b";

#[derive(Debug, Clone)]
pub struct OllamaConfig {
    pub host: String,
    pub model: String,
    pub timeout: Duration,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_OLLAMA_HOST.to_string(),
            model: DEFAULT_OLLAMA_MODEL.to_string(),
            timeout: Duration::from_secs(60),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Settings {
    pub crawl: CrawlConfig,
    pub ollama: OllamaConfig,
}

impl Settings {
    /// Load `.env` if present, then read the process environment.
    pub fn from_env() -> Result<Self> {
        match dotenvy::dotenv() {
            Ok(path) => debug!("Loaded environment from {}", path.display()),
            Err(e) if e.not_found() => {}
            Err(e) => debug!("Ignoring unreadable .env file: {}", e),
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from any key lookup; missing keys keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = CrawlConfig::default();
        let ollama_defaults = OllamaConfig::default();

        let crawl = CrawlConfig {
            max_pages: parse_or(&lookup, "MAX_PAGES", defaults.max_pages)?,
            max_chars: parse_or(&lookup, "MAX_CHARS", defaults.max_chars)?,
            timeout: seconds_or(&lookup, "CRAWL_TIMEOUT", defaults.timeout)?,
            max_depth: parse_or(&lookup, "MAX_DEPTH", defaults.max_depth)?,
            max_queue: parse_or(&lookup, "MAX_QUEUE", defaults.max_queue)?,
            focused_pages: parse_or(&lookup, "FOCUSED_PAGES", defaults.focused_pages)?,
            min_text_len: parse_or(&lookup, "MIN_TEXT_LEN", defaults.min_text_len)?,
            parallel_fetches: parse_or(&lookup, "PARALLEL_FETCHES", defaults.parallel_fetches)?,
            ..defaults
        };

        if crawl.parallel_fetches == 0 {
            return Err(CoreError::InvalidConfig {
                key: "PARALLEL_FETCHES".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }

        let ollama = OllamaConfig {
            host: lookup("OLLAMA_HOST").unwrap_or(ollama_defaults.host),
            model: lookup("OLLAMA_MODEL").unwrap_or(ollama_defaults.model),
            timeout: seconds_or(&lookup, "OLLAMA_TIMEOUT", ollama_defaults.timeout)?,
        };

        Ok(Self { crawl, ollama })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| CoreError::InvalidConfig {
            key: key.to_string(),
            reason: format!("{:?}: {}", raw, e),
        }),
        None => Ok(default),
    }
}

// Durations are given in (possibly fractional) seconds
fn seconds_or<F>(lookup: &F, key: &str, default: Duration) -> Result<Duration>
where
    F: Fn(&str) -> Option<String>,
{
    let secs: f64 = parse_or(lookup, key, default.as_secs_f64())?;
    if !secs.is_finite() || secs <= 0.0 {
        return Err(CoreError::InvalidConfig {
            key: key.to_string(),
            reason: format!("{} is not a positive number of seconds", secs),
        });
    }
    Ok(Duration::from_secs_f64(secs))
}
