//! # Settings Module
//!
//! ## Purpose
//! Run-time configuration of the primordial network: temperature grid of the
//! rate tables, redshift, the temperature iteration policy, numerical-domain
//! checks and the location of the table file. Configuration is stored as JSON
//! so it can be edited by hand or from the CLI.
//!
//! ## Configuration Format
//! ```json
//! {
//!   "t_min": 1.0,
//!   "t_max": 100000.0,
//!   "nbins": 1023,
//!   "redshift": 0.0,
//!   "initial_temperature": 1000.0,
//!   "temperature_iteration": { "Fixed": { "iterations": 10 } },
//!   "check_domain": true,
//!   "table_file": null
//! }
//! ```
//!
//! ## Usage
//! ```rust
//! use PrimoChem::settings::ConfigManager;
//! let dir = tempfile::tempdir().unwrap();
//! let path = dir.path().join("network.json");
//! let mut manager = ConfigManager::with_config_file(path.to_str().unwrap());
//! manager.set_redshift(3.0).unwrap();
//! manager.save_config().unwrap();
//! ```
use crate::Network::network_error::ChemistryError;
use crate::Network::rate_tables::TemperatureGrid;
use crate::Network::temperature_solver::TemperatureIteration;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// default name of the configuration file
pub const DEFAULT_CONFIG_FILE: &str = "primochem_config.json";

/// Configuration of one network instance.
///
/// # Fields
/// * `t_min`, `t_max`, `nbins` - temperature grid of the rate tables
/// * `redshift` - enters only the Compton term; redshift-dependent tables are disabled
/// * `initial_temperature` - Newton warm start for cells evaluated for the first time
/// * `temperature_iteration` - fixed step count or convergence-checked loop
/// * `check_domain` - report non-finite or non-positive intermediate values as errors
/// * `table_file` - JSON table file; analytic fits are used when absent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    pub t_min: f64,
    pub t_max: f64,
    pub nbins: usize,
    pub redshift: f64,
    pub initial_temperature: f64,
    pub temperature_iteration: TemperatureIteration,
    pub check_domain: bool,
    pub table_file: Option<String>,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            t_min: 1.0,
            t_max: 1e5,
            nbins: 1023,
            redshift: 0.0,
            initial_temperature: 1000.0,
            temperature_iteration: TemperatureIteration::default(),
            check_domain: true,
            table_file: None,
        }
    }
}

impl NetworkConfig {
    pub fn grid(&self) -> Result<TemperatureGrid, ChemistryError> {
        TemperatureGrid::new(self.t_min, self.t_max, self.nbins)
    }

    /// Checks the values a JSON file could get wrong.
    pub fn validate(&self) -> Result<(), ChemistryError> {
        self.grid()?;
        if !(self.redshift >= 0.0 && self.redshift.is_finite()) {
            return Err(ChemistryError::Config(format!(
                "redshift must be a finite non-negative number, got {}",
                self.redshift
            )));
        }
        if !(self.initial_temperature > 0.0 && self.initial_temperature.is_finite()) {
            return Err(ChemistryError::Config(format!(
                "initial temperature must be positive, got {}",
                self.initial_temperature
            )));
        }
        match self.temperature_iteration {
            TemperatureIteration::Fixed { iterations } if iterations == 0 => Err(
                ChemistryError::Config("fixed iteration count must be at least 1".to_string()),
            ),
            TemperatureIteration::Converged {
                rtol,
                max_iterations,
            } if !(rtol > 0.0) || max_iterations == 0 => Err(ChemistryError::Config(format!(
                "convergence policy needs rtol > 0 and max_iterations > 0, got {} and {}",
                rtol, max_iterations
            ))),
            _ => Ok(()),
        }
    }

    pub fn load_from_file(path: &str) -> Result<Self, ChemistryError> {
        let content = fs::read_to_string(path).map_err(|e| ChemistryError::FileAccess {
            path: path.to_string(),
            source: e,
        })?;
        let config: NetworkConfig = serde_json::from_str(&content)
            .map_err(|e| ChemistryError::Config(format!("{}: {}", path, e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn save_to_file(&self, path: &str) -> Result<(), ChemistryError> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content).map_err(|e| ChemistryError::FileAccess {
            path: path.to_string(),
            source: e,
        })
    }

    /// Loads `path` if it exists, otherwise falls back to the defaults.
    pub fn load_or_default(path: &str) -> Result<Self, ChemistryError> {
        if Path::new(path).exists() {
            Self::load_from_file(path)
        } else {
            warn!("configuration file '{}' not found, using defaults", path);
            Ok(Self::default())
        }
    }
}

/// Keeps a [`NetworkConfig`] together with the file it is persisted to.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config: NetworkConfig,
    config_file: String,
}

impl ConfigManager {
    /// Manager bound to [`DEFAULT_CONFIG_FILE`] in the working directory.
    pub fn new() -> Self {
        Self::with_config_file(DEFAULT_CONFIG_FILE)
    }

    /// A broken file is reported and replaced by the defaults.
    pub fn with_config_file(config_file: &str) -> Self {
        let config = match NetworkConfig::load_or_default(config_file) {
            Ok(config) => config,
            Err(e) => {
                warn!("ignoring configuration file '{}': {}", config_file, e);
                NetworkConfig::default()
            }
        };
        Self {
            config,
            config_file: config_file.to_string(),
        }
    }

    pub fn config(&self) -> &NetworkConfig {
        &self.config
    }

    pub fn config_file(&self) -> &str {
        &self.config_file
    }

    pub fn save_config(&self) -> Result<(), ChemistryError> {
        self.config.save_to_file(&self.config_file)?;
        info!("configuration saved to '{}'", self.config_file);
        Ok(())
    }

    /// The file must exist; it is parsed only when the network is built.
    pub fn set_table_file(&mut self, path: &str) -> Result<(), ChemistryError> {
        if !Path::new(path).exists() {
            return Err(ChemistryError::Config(format!(
                "table file does not exist: {}",
                path
            )));
        }
        self.config.table_file = Some(path.to_string());
        Ok(())
    }

    pub fn clear_table_file(&mut self) {
        self.config.table_file = None;
    }

    pub fn set_redshift(&mut self, redshift: f64) -> Result<(), ChemistryError> {
        let mut candidate = self.config.clone();
        candidate.redshift = redshift;
        candidate.validate()?;
        self.config = candidate;
        Ok(())
    }

    pub fn set_temperature_iteration(
        &mut self,
        policy: TemperatureIteration,
    ) -> Result<(), ChemistryError> {
        let mut candidate = self.config.clone();
        candidate.temperature_iteration = policy;
        candidate.validate()?;
        self.config = candidate;
        Ok(())
    }

    pub fn set_check_domain(&mut self, on: bool) {
        self.config.check_domain = on;
    }

    pub fn reset_to_defaults(&mut self) {
        self.config = NetworkConfig::default();
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}
