//! Optional TOML configuration file.
//!
//! ```toml
//! sensitivity = "low"
//! device = "constrained"
//! loss_debounce = 0.5
//!
//! [smoother]
//! stabilization_frames = 10
//! prediction_strength = 0.05
//! ```
//!
//! Missing keys keep their defaults. Profiles are applied on top of the
//! `[smoother]` table: device first, then sensitivity.

use anyhow::Result;
use serde::Deserialize;
use smoother_core::{
    bank::BankConfig,
    lifecycle::DEFAULT_LOSS_DEBOUNCE,
    DeviceClass, Sensitivity, SmootherConfig,
};
use std::fs;
use std::path::Path;

#[derive(Debug, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub smoother: SmootherConfig,
    #[serde(default = "default_loss_debounce")]
    pub loss_debounce: f64,
    #[serde(default)]
    pub sensitivity: Option<Sensitivity>,
    #[serde(default)]
    pub device: Option<DeviceClass>,
}

fn default_loss_debounce() -> f64 { DEFAULT_LOSS_DEBOUNCE }

impl Default for Config {
    fn default() -> Self {
        Self {
            smoother: SmootherConfig::default(),
            loss_debounce: default_loss_debounce(),
            sensitivity: None,
            device: None,
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Resolve into a bank configuration. Command-line profiles override the
    /// ones from the file.
    pub fn bank_config(
        &self,
        sensitivity: Option<Sensitivity>,
        device: Option<DeviceClass>,
    ) -> Result<BankConfig> {
        let mut smoother = self.smoother.clone();
        if let Some(device) = device.or(self.device) {
            device.apply(&mut smoother);
        }
        if let Some(level) = sensitivity.or(self.sensitivity) {
            level.apply(&mut smoother);
        }
        smoother.validate()?;
        if !(self.loss_debounce.is_finite() && self.loss_debounce >= 0.0) {
            anyhow::bail!("loss_debounce must be a non-negative number of seconds");
        }
        Ok(BankConfig {
            smoother,
            loss_debounce: self.loss_debounce,
        })
    }
}
