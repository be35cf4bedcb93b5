//! Service configuration.
//!
//! Precedence: CLI flags, then environment variables (both via clap), then
//! the optional YAML file, then built-in defaults. The judge credential is
//! only ever read from the environment.

use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Parser;
use consensus_runtime::prompts::check_template;
use consensus_runtime::{
    PromptError, SemanticConfig, DEFAULT_BASE_URL, DEFAULT_JUDGE_MODEL, DEFAULT_JUDGE_TIMEOUT,
    MAX_REPLY_TOKENS,
};
use serde::Deserialize;
use thiserror::Error;

/// Address used when nothing else is configured.
pub const DEFAULT_LISTEN: &str = "0.0.0.0:8000";

/// Errors from loading configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid duration '{value}': {source}")]
    InvalidDuration {
        value: String,
        source: humantime::DurationError,
    },

    #[error("Invalid listen address '{0}'")]
    InvalidListen(String),

    #[error("Invalid judge base URL '{0}': must start with http:// or https://")]
    InvalidBaseUrl(String),

    #[error("Invalid max_tokens {0}: must be between 1 and {max}", max = MAX_REPLY_TOKENS)]
    InvalidMaxTokens(u32),

    #[error("Invalid prompt template: {0}")]
    InvalidTemplate(#[from] PromptError),
}

/// Command-line interface.
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "consensus", version, about = "Answer validation service")]
pub struct Cli {
    /// Address to listen on [default: 0.0.0.0:8000]
    #[arg(long, env = "CONSENSUS_LISTEN")]
    pub listen: Option<SocketAddr>,

    /// Optional YAML configuration file
    #[arg(long, short, env = "CONSENSUS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Judge model identifier [default: gpt-4o]
    #[arg(long, env = "CONSENSUS_JUDGE_MODEL")]
    pub model: Option<String>,

    /// Judge API base URL
    #[arg(long, env = "CONSENSUS_JUDGE_BASE_URL")]
    pub judge_base_url: Option<String>,

    /// Per-call judge timeout, e.g. "30s" or "1m 30s"
    #[arg(long, env = "CONSENSUS_JUDGE_TIMEOUT", value_parser = humantime::parse_duration)]
    pub judge_timeout: Option<Duration>,
}

/// Judge section of the YAML file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct JudgeFileConfig {
    pub model: Option<String>,
    pub base_url: Option<String>,
    /// Humantime duration string
    pub timeout: Option<String>,
}

/// YAML configuration file.
///
/// ```yaml
/// listen: "127.0.0.1:8000"
/// judge:
///   model: gpt-4o-mini
///   timeout: 20s
/// semantic:
///   expected_reference: "A red bicycle with a wicker basket"
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub listen: Option<String>,
    pub judge: JudgeFileConfig,
    pub semantic: SemanticConfig,
}

impl FileConfig {
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&contents)
    }
}

/// Settings for the judge client. Never contains the credential.
#[derive(Debug, Clone, PartialEq)]
pub struct JudgeSettings {
    pub model: String,
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for JudgeSettings {
    fn default() -> Self {
        Self {
            model: DEFAULT_JUDGE_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_JUDGE_TIMEOUT,
        }
    }
}

/// Fully resolved service configuration.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub listen: SocketAddr,
    pub judge: JudgeSettings,
    pub semantic: SemanticConfig,
}

impl ServiceConfig {
    /// Resolve configuration from the CLI, reading the YAML file if one is named.
    pub fn resolve(cli: &Cli) -> Result<Self, ConfigError> {
        let file = match &cli.config {
            Some(path) => FileConfig::from_yaml_file(path)?,
            None => FileConfig::default(),
        };
        Self::merge(cli, file)
    }

    /// Merge CLI/env values over a parsed file.
    pub fn merge(cli: &Cli, file: FileConfig) -> Result<Self, ConfigError> {
        let listen = match (cli.listen, file.listen) {
            (Some(addr), _) => addr,
            (None, Some(raw)) => raw.parse().map_err(|_| ConfigError::InvalidListen(raw))?,
            (None, None) => DEFAULT_LISTEN
                .parse()
                .map_err(|_| ConfigError::InvalidListen(DEFAULT_LISTEN.to_string()))?,
        };

        let file_timeout = file
            .judge
            .timeout
            .map(|value| {
                humantime::parse_duration(&value)
                    .map_err(|source| ConfigError::InvalidDuration { value, source })
            })
            .transpose()?;

        let defaults = JudgeSettings::default();
        let judge = JudgeSettings {
            model: cli
                .model
                .clone()
                .or(file.judge.model)
                .unwrap_or(defaults.model),
            base_url: cli
                .judge_base_url
                .clone()
                .or(file.judge.base_url)
                .unwrap_or(defaults.base_url),
            timeout: cli
                .judge_timeout
                .or(file_timeout)
                .unwrap_or(defaults.timeout),
        };

        let config = Self {
            listen,
            judge,
            semantic: file.semantic,
        };
        config.validate()?;
        Ok(config)
    }

    /// Reject settings that could never produce a working judge call.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = &self.judge.base_url;
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(ConfigError::InvalidBaseUrl(url.clone()));
        }
        let max_tokens = self.semantic.max_tokens;
        if max_tokens == 0 || max_tokens > MAX_REPLY_TOKENS {
            return Err(ConfigError::InvalidMaxTokens(max_tokens));
        }
        check_template(&self.semantic.prompt_template)?;
        Ok(())
    }
}
