use anyhow::{Context, Result};
use reqwest::Url;
use std::env;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8000;

// Process configuration, read once at startup and shared read-only afterwards.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub upstream_url: Url,
    pub host: String,
    pub port: u16,
}

impl RelayConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw_url = lookup("LLM_API_URL")
            .filter(|v| !v.trim().is_empty())
            .context("LLM_API_URL must be set")?;
        let upstream_url = Url::parse(raw_url.trim())
            .with_context(|| format!("LLM_API_URL is not a valid URL: {}", raw_url))?;

        let host = lookup("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());

        let port = match lookup("PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .with_context(|| format!("PORT is not a valid port number: {}", raw))?,
            None => DEFAULT_PORT,
        };

        Ok(Self {
            upstream_url,
            host,
            port,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<RelayConfig> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        RelayConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults_for_host_and_port() {
        let config = load(&[("LLM_API_URL", "http://localhost:8081/v1/chat/completions")]).unwrap();

        assert_eq!(
            config.upstream_url.as_str(),
            "http://localhost:8081/v1/chat/completions"
        );
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 8000);
    }

    #[test]
    fn test_explicit_host_and_port() {
        let config = load(&[
            ("LLM_API_URL", "http://llm:9000/chat"),
            ("HOST", "127.0.0.1"),
            ("PORT", "9100"),
        ])
        .unwrap();

        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 9100);
    }

    #[test]
    fn test_missing_upstream_url_is_fatal() {
        let err = load(&[("PORT", "9100")]).unwrap_err();
        assert!(err.to_string().contains("LLM_API_URL"));

        assert!(load(&[("LLM_API_URL", "  ")]).is_err());
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(load(&[("LLM_API_URL", "not a url")]).is_err());
        assert!(load(&[("LLM_API_URL", "http://llm/chat"), ("PORT", "eighty")]).is_err());
        assert!(load(&[("LLM_API_URL", "http://llm/chat"), ("PORT", "70000")]).is_err());
    }
}
