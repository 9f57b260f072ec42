use std::path::Path;

use anyhow::Context;
use config::{Config, Environment, File, FileFormat};
use qcar_sim::{FeatureColumn, ProbeConfig, SessionConfig, SweepConfig};
use serde::Deserialize;
use tracing::{debug, info};

pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Prefix of environment overrides, e.g. `QCAR__PADE__NEIGHBOURS=5`.
const ENV_PREFIX: &str = "QCAR";

/// Application settings, one section per subsystem.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Session used by `drive`.
    pub session: SessionConfig,
    pub sweep: SweepConfig,
    pub probe: ProbeConfig,
    pub pade: PadeSettings,
    pub drive: DriveSettings,
}

/// Which columns feed the estimator and which Q-table columns become labels.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Analysis {
    pub features: Vec<FeatureColumn>,
    pub target: FeatureColumn,
    /// Must be a subset of `features`.
    pub labels: Vec<FeatureColumn>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PadeSettings {
    pub neighbours: usize,
    pub sweep: Analysis,
    pub probe: Analysis,
}

impl Default for PadeSettings {
    fn default() -> Self {
        PadeSettings {
            neighbours: qcar_pade::DEFAULT_NEIGHBOURS,
            sweep: Analysis {
                features: vec![FeatureColumn::Heading, FeatureColumn::X, FeatureColumn::Dx, FeatureColumn::Gamma],
                target: FeatureColumn::Speed,
                labels: vec![FeatureColumn::Gamma],
            },
            probe: Analysis {
                features: vec![FeatureColumn::Heading, FeatureColumn::Gamma],
                target: FeatureColumn::Dx,
                labels: vec![FeatureColumn::Gamma],
            },
        }
    }
}

/// One leg of a scripted drive: hold a discrete action for some frames.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct ScriptStep {
    /// Index into the discrete action table.
    pub action: usize,
    pub frames: usize,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DriveSettings {
    pub script: Vec<ScriptStep>,
    /// Sleep between frames to run at the session's frame rate.
    pub realtime: bool,
    /// Stop as soon as the car is within the goal tolerance.
    pub stop_at_goal: bool,
}

impl Default for DriveSettings {
    fn default() -> Self {
        DriveSettings {
            script: vec![
                ScriptStep { action: 4, frames: 100 },
                ScriptStep { action: 5, frames: 100 },
                ScriptStep { action: 0, frames: 50 },
            ],
            realtime: false,
            stop_at_goal: true,
        }
    }
}

/// Loads settings from an optional TOML file, then `QCAR__*` environment
/// variables, on top of built-in defaults.
pub fn load_config(path: &Path) -> anyhow::Result<AppConfig> {
    info!("Attempting to load configuration from {}", path.display());

    let settings = Config::builder()
        .add_source(File::new(&path.to_string_lossy(), FileFormat::Toml).required(false))
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("pade.sweep.features")
                .with_list_parse_key("pade.sweep.labels")
                .with_list_parse_key("pade.probe.features")
                .with_list_parse_key("pade.probe.labels")
                .with_list_parse_key("sweep.initial_headings"),
        )
        .build()
        .with_context(|| format!("Failed to read configuration from {}", path.display()))?;

    let config: AppConfig = settings
        .try_deserialize()
        .context("Invalid configuration")?;
    debug!(?config, "Configuration loaded");
    Ok(config)
}
