use std::time::Duration;

use anyhow::{Context, Result};

use crate::interview::InterviewLimits;

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    /// Unset means logs and sessions are kept in process memory only.
    pub database_url: Option<String>,
    pub anthropic_api_key: String,
    pub port: u16,
    pub rust_log: String,
    pub limits: InterviewLimits,
    pub llm_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let defaults = InterviewLimits::default();
        Ok(Config {
            database_url: std::env::var("DATABASE_URL")
                .ok()
                .filter(|url| !url.trim().is_empty()),
            anthropic_api_key: require_env("ANTHROPIC_API_KEY")?,
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            limits: InterviewLimits {
                technical_questions: parse_env(
                    "TECHNICAL_QUESTION_LIMIT",
                    defaults.technical_questions,
                )?,
                dsa_questions: parse_env("DSA_QUESTION_LIMIT", defaults.dsa_questions)?,
            },
            llm_timeout: Duration::from_secs(parse_env("LLM_TIMEOUT_SECS", 120)?),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number, got '{raw}'")),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_env_uses_default_when_unset() {
        let value: u32 = parse_env("INTERVIEW_API_TEST_UNSET_VAR", 7).unwrap();
        assert_eq!(value, 7);
    }

    #[test]
    fn test_parse_env_rejects_garbage() {
        std::env::set_var("INTERVIEW_API_TEST_BAD_PORT", "eighty");
        assert!(parse_env::<u16>("INTERVIEW_API_TEST_BAD_PORT", 8080).is_err());
        std::env::remove_var("INTERVIEW_API_TEST_BAD_PORT");
    }
}
