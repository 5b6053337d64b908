use anyhow::Result;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure for the preflight engine
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PreflightConfig {
    /// Checklist definition source
    #[serde(default)]
    pub checklist: ChecklistConfig,
    /// Telemetry snapshot source
    #[serde(default)]
    pub telemetry: TelemetryConfig,
    /// Observability settings
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ChecklistConfig {
    /// Path to the checklist definition JSON document produced by the
    /// offline manual-extraction tool
    pub definition_path: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TelemetryConfig {
    /// Path to the telemetry snapshot JSON document
    pub snapshot_path: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    /// Log level when RUST_LOG is unset
    pub log_level: String,
    /// Emit JSON log lines instead of plain text
    pub json_logs: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
        }
    }
}

impl PreflightConfig {
    /// Load configuration from multiple sources with precedence:
    /// 1. Default values
    /// 2. Configuration file (preflight.toml)
    /// 3. Environment variables (prefixed with PREFLIGHT_)
    pub fn load() -> Result<Self> {
        let mut builder = Config::builder();

        if Path::new("preflight.toml").exists() {
            builder = builder.add_source(File::with_name("preflight"));
        }

        // Override with environment variables
        builder = builder.add_source(
            Environment::with_prefix("PREFLIGHT")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        let preflight_config: PreflightConfig = config.try_deserialize()?;
        Ok(preflight_config)
    }

    /// Load .env file if it exists
    pub fn load_env_file() -> Result<()> {
        if Path::new(".env").exists() {
            dotenvy::dotenv()?;
            tracing::info!("Loaded environment variables from .env file");
        }
        Ok(())
    }
}

/// Global configuration instance
static CONFIG: std::sync::LazyLock<Result<PreflightConfig, anyhow::Error>> =
    std::sync::LazyLock::new(|| {
        // Load .env file first
        let _ = PreflightConfig::load_env_file();
        PreflightConfig::load()
    });

/// Get the global configuration
pub fn config() -> Result<&'static PreflightConfig> {
    CONFIG
        .as_ref()
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))
}

/// Initialize configuration (called at startup)
pub fn init_config() -> Result<()> {
    let _config = config()?;
    tracing::info!("Configuration loaded successfully");
    Ok(())
}
