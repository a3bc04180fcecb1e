pub mod toml_config;

use crate::core::gradio::DEFAULT_API_PREFIX;
use crate::core::ConfigProvider;
use crate::utils::error::Result;
use crate::utils::validation::{self, Validate};
use std::time::Duration;
use toml_config::TomlConfig;

#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use serde::{Deserialize, Serialize};

pub const DEFAULT_ENDPOINT: &str = "Fa0713/AetherCare";
pub const DEFAULT_OPERATION: &str = "/predict";

/// 命令列參數；未指定的欄位依序由設定檔、預設值補上
#[cfg(feature = "cli")]
#[derive(Debug, Clone, Default, Serialize, Deserialize, Parser)]
#[command(name = "vitals-relay")]
#[command(about = "Relay a vitals JSON payload from stdin to a hosted prediction endpoint")]
pub struct CliConfig {
    #[arg(long, help = "Gradio Space id (owner/name) or base URL [default: Fa0713/AetherCare]")]
    pub endpoint: Option<String>,

    #[arg(long, help = "Prediction operation name [default: /predict]")]
    pub operation: Option<String>,

    #[arg(long, help = "Gradio API path prefix [default: /gradio_api]")]
    pub api_prefix: Option<String>,

    #[arg(long, help = "Per-request timeout in seconds (no timeout when unset)")]
    pub timeout_seconds: Option<u64>,

    #[arg(long, help = "User-Agent header for requests [default: vitals-relay/<version>]")]
    pub user_agent: Option<String>,

    #[arg(long, help = "Optional TOML config file")]
    pub config: Option<String>,

    #[arg(long, help = "Attach the parsed health status to the output")]
    pub health_status: bool,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Write logs to stderr as JSON lines")]
    pub json_logs: bool,
}

/// 合併後的最終設定
#[derive(Debug, Clone, PartialEq)]
pub struct RelayConfig {
    pub endpoint: String,
    pub operation: String,
    pub api_prefix: String,
    pub timeout_seconds: Option<u64>,
    pub user_agent: Option<String>,
    pub health_status: bool,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            operation: DEFAULT_OPERATION.to_string(),
            api_prefix: DEFAULT_API_PREFIX.to_string(),
            timeout_seconds: None,
            user_agent: None,
            health_status: false,
        }
    }
}

impl RelayConfig {
    pub fn apply_file(mut self, file: &TomlConfig) -> Self {
        let remote = &file.remote;
        if let Some(endpoint) = &remote.endpoint {
            self.endpoint = endpoint.clone();
        }
        if let Some(operation) = &remote.operation {
            self.operation = operation.clone();
        }
        if let Some(api_prefix) = &remote.api_prefix {
            self.api_prefix = api_prefix.clone();
        }
        if remote.timeout_seconds.is_some() {
            self.timeout_seconds = remote.timeout_seconds;
        }
        if remote.user_agent.is_some() {
            self.user_agent = remote.user_agent.clone();
        }
        if let Some(health_status) = file.output.health_status {
            self.health_status = health_status;
        }
        self
    }

    #[cfg(feature = "cli")]
    pub fn apply_cli(mut self, cli: &CliConfig) -> Self {
        if let Some(endpoint) = &cli.endpoint {
            self.endpoint = endpoint.clone();
        }
        if let Some(operation) = &cli.operation {
            self.operation = operation.clone();
        }
        if let Some(api_prefix) = &cli.api_prefix {
            self.api_prefix = api_prefix.clone();
        }
        if cli.timeout_seconds.is_some() {
            self.timeout_seconds = cli.timeout_seconds;
        }
        if cli.user_agent.is_some() {
            self.user_agent = cli.user_agent.clone();
        }
        if cli.health_status {
            self.health_status = true;
        }
        self
    }

    /// 預設值 < 設定檔 < 命令列
    #[cfg(feature = "cli")]
    pub fn load(cli: &CliConfig) -> Result<Self> {
        let mut config = Self::default();
        if let Some(path) = &cli.config {
            tracing::debug!("Loading config file: {}", path);
            config = config.apply_file(&TomlConfig::from_file(path)?);
        }
        Ok(config.apply_cli(cli))
    }
}

impl ConfigProvider for RelayConfig {
    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn operation(&self) -> &str {
        &self.operation
    }

    fn api_prefix(&self) -> &str {
        &self.api_prefix
    }

    fn timeout(&self) -> Option<Duration> {
        self.timeout_seconds.map(Duration::from_secs)
    }

    fn user_agent(&self) -> Option<&str> {
        self.user_agent.as_deref()
    }

    fn health_status(&self) -> bool {
        self.health_status
    }
}

impl Validate for RelayConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_endpoint_id("endpoint", &self.endpoint)?;
        validation::validate_non_empty_string("operation", self.operation.trim_matches('/'))?;

        if let Some(timeout) = self.timeout_seconds {
            validation::validate_range("timeout_seconds", timeout, 1, 3600)?;
        }

        if let Some(user_agent) = &self.user_agent {
            validation::validate_non_empty_string("user_agent", user_agent)?;
        }

        Ok(())
    }
}
