//! # Settings Module
//!
//! ## Purpose
//! Analysis defaults of the command line front end, persisted as JSON. A settings file is
//! optional: if the default file does not exist the built-in defaults are used. A file named
//! explicitly must exist. Fields missing from an existing file take their default values.
//!
//! ## Configuration Format
//! ```json
//! {
//!   "time_steps": 100,
//!   "reltol": 0.01,
//!   "concentration_unit": "molecules/cm^3",
//!   "time_scaling_factor": 1.0,
//!   "default_format": "rs",
//!   "foam_species": ["H3O+", "H3O+(H2O)", "H3O+(H2O)2"]
//! }
//! ```
//!
//! ## Usage
//! ```rust, ignore
//! use KiTra::settings::AnalysisSettings;
//!
//! let settings = AnalysisSettings::load("kitra_settings.json")?;
//! let result = equilibrium_state(&tra, settings.time_steps, settings.reltol)?;
//! ```
use crate::Analysis::equilibrium::{DEFAULT_RELTOL, DEFAULT_TIME_STEPS};
use crate::Importers::import_format::ImportFormat;
use crate::Trajectories::trajectory::DEFAULT_CONCENTRATION_UNIT;
use log::info;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// settings file looked up in the working directory when no file is given
pub const DEFAULT_SETTINGS_FILE: &str = "kitra_settings.json";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Failed to access settings file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid settings JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Settings file '{}' does not exist", .0.display())]
    NotFound(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisSettings {
    /// width of the trailing equilibrium window in time steps
    pub time_steps: usize,
    /// relative tolerance of the equilibrium check
    pub reltol: f64,
    /// concentration unit attached to imported trajectories
    pub concentration_unit: String,
    /// time scaling factor attached to imported trajectories whose importer does not set one
    pub time_scaling_factor: f64,
    /// file format assumed when none is given on the command line
    pub default_format: ImportFormat,
    /// species names of the OpenFOAM concentration vector
    pub foam_species: Vec<String>,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            time_steps: DEFAULT_TIME_STEPS,
            reltol: DEFAULT_RELTOL,
            concentration_unit: DEFAULT_CONCENTRATION_UNIT.to_string(),
            time_scaling_factor: 1.0,
            default_format: ImportFormat::default(),
            foam_species: Vec::new(),
        }
    }
}

impl AnalysisSettings {
    /// Loads settings from a JSON file, the defaults if the file does not exist.
    pub fn load<P: AsRef<Path>>(settings_file: P) -> Result<Self, SettingsError> {
        let path = settings_file.as_ref();
        if path.exists() {
            let content = fs::read_to_string(path)?;
            let settings: AnalysisSettings = serde_json::from_str(&content)?;
            info!("settings loaded from '{}'", path.display());
            Ok(settings)
        } else {
            info!("no settings file '{}', using defaults", path.display());
            Ok(AnalysisSettings::default())
        }
    }

    /// Loads settings from a JSON file that must exist.
    pub fn load_required<P: AsRef<Path>>(settings_file: P) -> Result<Self, SettingsError> {
        let path = settings_file.as_ref();
        if !path.exists() {
            return Err(SettingsError::NotFound(path.to_path_buf()));
        }
        Self::load(path)
    }

    pub fn save<P: AsRef<Path>>(&self, settings_file: P) -> Result<(), SettingsError> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(settings_file, content)?;
        Ok(())
    }

    /// species names to pass to an importer of the given format
    pub fn species_names_for(&self, format: ImportFormat) -> Option<&[String]> {
        match format {
            ImportFormat::Foam if !self.foam_species.is_empty() => Some(&self.foam_species),
            _ => None,
        }
    }
}
