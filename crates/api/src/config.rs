use std::path::PathBuf;
use std::str::FromStr;

use axum::http::HeaderValue;
use boxoffice_core::attributes::BudgetTierScheme;
use boxoffice_core::variant::ModelVariant;

/// Log output format for the tracing subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(format!("expected pretty or json, got '{other}'")),
        }
    }
}

/// A configuration variable that is set but cannot be used.
#[derive(Debug, thiserror::Error)]
#[error("Invalid value '{value}' for {var}: {reason}")]
pub struct ConfigError {
    pub var: &'static str,
    pub value: String,
    pub reason: String,
}

/// Server configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS`.
    pub cors_origins: Vec<HeaderValue>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Directory holding the model, scaler, schema and metrics artifacts.
    pub model_dir: PathBuf,
    /// Movie dataset for the variance analysis. Analysis is disabled when unset.
    pub dataset_path: Option<PathBuf>,
    pub budget_tier_scheme: BudgetTierScheme,
    /// Variant used when a prediction request does not name one.
    pub default_variant: ModelVariant,
    pub log_format: LogFormat,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                 | Default                 |
    /// |-------------------------|-------------------------|
    /// | `HOST`                  | `0.0.0.0`               |
    /// | `PORT`                  | `3000`                  |
    /// | `CORS_ORIGINS`          | `http://localhost:5173` |
    /// | `REQUEST_TIMEOUT_SECS`  | `30`                    |
    /// | `MODEL_DIR`             | `models`                |
    /// | `DATASET_PATH`          | unset                   |
    /// | `BUDGET_TIER_SCHEME`    | `three_tier`            |
    /// | `DEFAULT_MODEL_VARIANT` | `iteration_0`           |
    /// | `LOG_FORMAT`            | `pretty`                |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Same as [`ServerConfig::from_env`] over an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |name: &str, default: &str| lookup(name).unwrap_or_else(|| default.to_string());

        let host = var("HOST", "0.0.0.0");
        let port = parse("PORT", var("PORT", "3000"))?;

        let cors_origins = var("CORS_ORIGINS", "http://localhost:5173")
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|o| {
                o.parse::<HeaderValue>().map_err(|e| ConfigError {
                    var: "CORS_ORIGINS",
                    value: o.to_string(),
                    reason: e.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let request_timeout_secs = parse("REQUEST_TIMEOUT_SECS", var("REQUEST_TIMEOUT_SECS", "30"))?;
        let model_dir = PathBuf::from(var("MODEL_DIR", "models"));
        let dataset_path = lookup("DATASET_PATH")
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from);
        let budget_tier_scheme = parse("BUDGET_TIER_SCHEME", var("BUDGET_TIER_SCHEME", "three_tier"))?;
        let default_variant = parse("DEFAULT_MODEL_VARIANT", var("DEFAULT_MODEL_VARIANT", "iteration_0"))?;
        let log_format = parse("LOG_FORMAT", var("LOG_FORMAT", "pretty"))?;

        Ok(Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            model_dir,
            dataset_path,
            budget_tier_scheme,
            default_variant,
            log_format,
        })
    }
}

fn parse<T>(var: &'static str, value: String) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e: T::Err| ConfigError {
        var,
        reason: e.to_string(),
        value,
    })
}
