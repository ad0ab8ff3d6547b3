// Configuration management for the OpenVPN status check
// Supports CLI arguments, environment variables and a config file (TOML)

use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::Level;

use crate::check::ThresholdConfig;
use crate::error::{CheckError, CheckResult};

/// OpenVPN server status check for Sensu/Nagios style schedulers
#[derive(Parser, Debug, Clone)]
#[command(name = "openvpn-status-check")]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// The OpenVPN status file
    #[arg(short = 'f', long, env = "OPENVPN_STATUS_FILE")]
    pub status_file: Option<PathBuf>,

    /// The OpenVPN status file age threshold for critical [default: 180]
    #[arg(long, env = "OPENVPN_STATUS_FILE_AGE_CRIT")]
    pub status_file_age_crit: Option<u64>,

    /// The OpenVPN status file age threshold for warning [default: 120]
    #[arg(long, env = "OPENVPN_STATUS_FILE_AGE_WARN")]
    pub status_file_age_warn: Option<u64>,

    /// The OpenVPN minimum clients threshold for critical [default: 0]
    #[arg(long, env = "OPENVPN_MIN_CLIENTS_CRIT")]
    pub min_clients_crit: Option<u64>,

    /// The OpenVPN minimum clients threshold for warning [default: 0]
    #[arg(long, env = "OPENVPN_MIN_CLIENTS_WARN")]
    pub min_clients_warn: Option<u64>,

    /// Path to configuration file
    #[arg(short, long, env = "OPENVPN_CHECK_CONFIG")]
    pub config: Option<PathBuf>,

    /// Logging level (error, warn, info, debug, trace)
    #[arg(short, long, default_value = "warn", env = "OPENVPN_CHECK_LOG_LEVEL")]
    pub log_level: String,

    /// Print route count and queue length as well
    #[arg(short, long, env = "OPENVPN_CHECK_VERBOSE")]
    pub verbose: bool,
}

/// Configuration file structure (TOML format)
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ConfigFile {
    #[serde(default)]
    pub check: CheckSection,
}

/// `[check]` table; anything left out falls back to the built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CheckSection {
    pub status_file: Option<PathBuf>,
    pub status_file_age_crit: Option<u64>,
    pub status_file_age_warn: Option<u64>,
    pub min_clients_crit: Option<u64>,
    pub min_clients_warn: Option<u64>,
}

const DEFAULT_CONFIG_PATHS: [&str; 2] = [
    "openvpn-status-check.toml",
    "/etc/openvpn-status-check.toml",
];

/// Merged configuration from all sources
#[derive(Debug, Clone)]
pub struct Config {
    pub status_file: Option<PathBuf>,
    pub thresholds: ThresholdConfig,
    pub verbose: bool,
}

impl Config {
    /// Load configuration from all sources (CLI args, config file, defaults)
    /// Priority: CLI args > Environment variables > Config file > Defaults
    pub fn load(cli_args: CliArgs) -> anyhow::Result<Self> {
        let config_file = match &cli_args.config {
            Some(config_path) => read_config_file(config_path)?,
            None => {
                let mut loaded_config = None;
                for path in DEFAULT_CONFIG_PATHS.iter().map(Path::new) {
                    if path.exists() {
                        loaded_config = Some(read_config_file(path)?);
                        break;
                    }
                }
                loaded_config.unwrap_or_default()
            }
        };

        Ok(Self::merge(cli_args, config_file))
    }

    /// Overlay CLI/env values on top of the config file and defaults
    pub fn merge(cli_args: CliArgs, config_file: ConfigFile) -> Self {
        let file = config_file.check;
        let defaults = ThresholdConfig::default();

        let thresholds = ThresholdConfig {
            status_file_age_crit: cli_args
                .status_file_age_crit
                .or(file.status_file_age_crit)
                .unwrap_or(defaults.status_file_age_crit),
            status_file_age_warn: cli_args
                .status_file_age_warn
                .or(file.status_file_age_warn)
                .unwrap_or(defaults.status_file_age_warn),
            min_clients_crit: cli_args
                .min_clients_crit
                .or(file.min_clients_crit)
                .unwrap_or(defaults.min_clients_crit),
            min_clients_warn: cli_args
                .min_clients_warn
                .or(file.min_clients_warn)
                .unwrap_or(defaults.min_clients_warn),
        };

        Config {
            status_file: cli_args.status_file.or(file.status_file),
            thresholds,
            verbose: cli_args.verbose,
        }
    }

    /// Pre-flight check run before the status file is touched
    pub fn validate(&self) -> CheckResult<&Path> {
        match self.status_file.as_deref() {
            Some(path) if !path.as_os_str().is_empty() => Ok(path),
            _ => Err(CheckError::Usage(
                "--status-file or OPENVPN_STATUS_FILE environment variable is required".to_string(),
            )),
        }
    }
}

fn read_config_file(path: &Path) -> anyhow::Result<ConfigFile> {
    tracing::info!("Loading configuration from: {}", path.display());
    let config_content = std::fs::read_to_string(path)?;
    Ok(toml::from_str::<ConfigFile>(&config_content)?)
}

pub fn parse_log_level(level_str: &str) -> anyhow::Result<Level> {
    match level_str.to_lowercase().as_str() {
        "error" => Ok(Level::ERROR),
        "warn" => Ok(Level::WARN),
        "info" => Ok(Level::INFO),
        "debug" => Ok(Level::DEBUG),
        "trace" => Ok(Level::TRACE),
        _ => Err(anyhow::anyhow!("Invalid log level: {}", level_str)),
    }
}
