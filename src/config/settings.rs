use anyhow::{Context, Result, bail};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use url::Url;

use crate::analytics::AnalyticsConfig;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

const DEFAULT_ALLOWED_ORIGINS: &str =
    "http://localhost:3000,https://remcostoeten.nl,https://www.remcostoeten.nl";

#[derive(Debug, Clone)]
pub struct Settings {
    pub environment: String,
    pub host: String,
    pub port: u16,
    pub allowed_origins: Vec<String>,
    pub enable_analytics: bool,
    pub strict_visitor_references: bool,
    pub top_n: usize,
    pub backup_dir: PathBuf,
    pub backup_timeout: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            host: "127.0.0.1".to_string(),
            port: 8000,
            allowed_origins: split_list(DEFAULT_ALLOWED_ORIGINS),
            enable_analytics: true,
            strict_visitor_references: false,
            top_n: 10,
            backup_dir: PathBuf::from("."),
            backup_timeout: Duration::from_secs(10),
        }
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// Parse a comma-separated list of CORS origins. Every entry must be an
/// explicit http(s) origin; `*` is refused.
fn parse_origins(value: &str) -> Result<Vec<String>> {
    let origins = split_list(value);
    for origin in &origins {
        if origin == "*" {
            bail!("ALLOWED_ORIGINS must list origins explicitly, `*` is not supported");
        }
        let url = Url::parse(origin)
            .with_context(|| format!("ALLOWED_ORIGINS has an invalid origin: {:?}", origin))?;
        if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
            bail!("ALLOWED_ORIGINS has an invalid origin: {:?}", origin);
        }
    }
    Ok(origins)
}

fn parse_var<T>(name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(value) => value
            .trim()
            .parse::<T>()
            .with_context(|| format!("{} has an invalid value: {:?}", name, value)),
        Err(_) => Ok(default),
    }
}

impl Settings {
    /// Read settings from the environment (after `.env` has been loaded).
    pub fn from_env() -> Result<Self> {
        let defaults = Settings::default();

        // PORT wins over API_PORT so hosting platforms can inject it
        let port = match env::var("PORT") {
            Ok(_) => parse_var("PORT", defaults.port)?,
            Err(_) => parse_var("API_PORT", defaults.port)?,
        };

        Ok(Self {
            environment: env::var("ENVIRONMENT").unwrap_or(defaults.environment),
            host: env::var("API_HOST").unwrap_or(defaults.host),
            port,
            allowed_origins: match env::var("ALLOWED_ORIGINS") {
                Ok(value) => parse_origins(&value)?,
                Err(_) => defaults.allowed_origins,
            },
            enable_analytics: parse_var("ENABLE_ANALYTICS", defaults.enable_analytics)?,
            strict_visitor_references: parse_var(
                "STRICT_VISITOR_REFERENCES",
                defaults.strict_visitor_references,
            )?,
            top_n: parse_var("TOP_N", defaults.top_n)?,
            backup_dir: env::var("BACKUP_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.backup_dir),
            backup_timeout: Duration::from_secs(parse_var(
                "BACKUP_TIMEOUT_SECS",
                defaults.backup_timeout.as_secs(),
            )?),
        })
    }

    pub fn is_production(&self) -> bool {
        self.environment.eq_ignore_ascii_case("production")
    }

    pub fn analytics_config(&self) -> AnalyticsConfig {
        AnalyticsConfig {
            strict_visitor_references: self.strict_visitor_references,
            top_n: self.top_n,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_origins() {
        assert_eq!(
            split_list(" http://a , ,http://b"),
            vec!["http://a".to_string(), "http://b".to_string()]
        );
    }

    #[test]
    fn origins_must_be_explicit() {
        assert_eq!(
            parse_origins("http://localhost:3000, https://example.com").unwrap(),
            vec![
                "http://localhost:3000".to_string(),
                "https://example.com".to_string()
            ]
        );
        let err = parse_origins("https://example.com,*").unwrap_err();
        assert!(err.to_string().contains("ALLOWED_ORIGINS"));
        assert!(parse_origins("*").is_err());
        assert!(parse_origins("not a url").is_err());
        assert!(parse_origins("ftp://example.com").is_err());
    }

    #[test]
    fn production_check_ignores_case() {
        let settings = Settings {
            environment: "Production".to_string(),
            ..Default::default()
        };
        assert!(settings.is_production());
        assert!(!Settings::default().is_production());
    }

    #[test]
    fn analytics_config_follows_settings() {
        let settings = Settings {
            strict_visitor_references: true,
            top_n: 3,
            ..Default::default()
        };
        let config = settings.analytics_config();
        assert!(config.strict_visitor_references);
        assert_eq!(config.top_n, 3);
    }

    #[test]
    fn unset_variable_uses_default() {
        let value: u64 = parse_var("BLOGPULSE_TEST_SURELY_UNSET_VARIABLE", 42).unwrap();
        assert_eq!(value, 42);
    }
}
