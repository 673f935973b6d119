//! Deployment environment and log output settings

use serde::{Deserialize, Serialize};
use std::{env, fmt, str::FromStr};

/// Variables checked, in order, for the deployment environment
const ENVIRONMENT_VARS: [&str; 3] = ["ENVIRONMENT", "ENV", "RUST_ENV"];

/// Where the identity service is running
///
/// Selects the defaults `AppConfig` starts from and the files layered on top.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    pub fn is_production(&self) -> bool {
        matches!(self, Environment::Production)
    }

    /// First parseable value of `ENVIRONMENT`, `ENV` or `RUST_ENV`; development otherwise
    pub fn from_env() -> Self {
        ENVIRONMENT_VARS
            .iter()
            .find_map(|name| env::var(name).ok())
            .and_then(|value| value.parse().ok())
            .unwrap_or_default()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Staging => "staging",
            Environment::Production => "production",
        }
    }

    /// Stem of the optional settings file, e.g. `config.staging`
    pub fn config_file(&self) -> String {
        format!("config.{}", self.as_str())
    }

    /// Dotenv file loaded after `.env`, e.g. `.env.staging`
    pub fn env_file(&self) -> String {
        format!(".env.{}", self.as_str())
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" | "local" => Ok(Environment::Development),
            "staging" | "stage" | "test" => Ok(Environment::Staging),
            "production" | "prod" => Ok(Environment::Production),
            other => Err(format!("Unknown environment: {}", other)),
        }
    }
}

/// Output layout of the tracing subscriber
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    #[default]
    Pretty,
    Compact,
}

/// Tracing subscriber settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// `EnvFilter` directive, e.g. `info,ident_core=debug`; `RUST_LOG` wins when set
    pub level: String,

    #[serde(default)]
    pub format: LogFormat,

    /// ANSI colours for pretty and compact output
    #[serde(default = "default_colored")]
    pub colored: bool,

    /// Emit file and line of each event
    #[serde(default)]
    pub source_location: bool,
}

fn default_colored() -> bool {
    true
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: String::from("info"),
            format: LogFormat::default(),
            colored: default_colored(),
            source_location: false,
        }
    }
}

impl LoggingConfig {
    /// Human-readable output in development, JSON elsewhere
    pub fn for_environment(env: Environment) -> Self {
        let json = Self {
            format: LogFormat::Json,
            colored: false,
            ..Self::default()
        };
        match env {
            Environment::Development => Self {
                level: String::from("debug,ident_core=trace,ident_infra=debug,sqlx=warn"),
                source_location: true,
                ..Self::default()
            },
            Environment::Staging => json,
            Environment::Production => Self {
                level: String::from("warn,ident_core=info,ident_infra=info"),
                ..json
            },
        }
    }
}
