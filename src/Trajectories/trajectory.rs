//! # Kinetic Trajectory Module
//!
//! ## Purpose
//! A kinetic trajectory is an abstracted kinetic simulation result: a time series of
//! concentrations, simulation run meta data and convenient data access methods.
//! Every importer of simulation result files and every simulation driver produces a
//! `Trajectory`; analysis and reporting code only reads it.
//!
//! ## Main Data Structures
//! - `Trajectory`: species names, time stamps, concentration matrix, attributes, units
//! - `AttributeValue`: numeric or text run metadata value (pressure, temperature, ...)
//! - `TrajectoryError`: construction and lookup failures
//!
//! ## Storage
//! Concentrations live in a column-major `nalgebra::DMatrix<f64>` of shape
//! `[n_timesteps, n_species]`. Column-major storage keeps the time series of every species
//! contiguous, so label access hands out plain `&[f64]` slices without copying.
//!
//! ## Usage
//! ```rust, ignore
//! let tra = Trajectory::from_rows(
//!     vec!["A".to_string(), "B".to_string()],
//!     vec![0.0, 1.0, 2.0],
//!     vec![vec![1.0, 10.0], vec![1.0, 10.0], vec![1.0, 10.0]],
//! )?
//! .with_concentration_unit("mol/m^3")
//! .with_time_scaling_factor(1e-6);
//! let water = tra.series_for("B")?;
//! ```
use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

/// Default display unit of concentrations
pub const DEFAULT_CONCENTRATION_UNIT: &str = "molecules/cm^3";

/// errors of trajectory construction and trajectory lookups
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TrajectoryError {
    #[error("Shape error: {0}")]
    Shape(String),
    #[error("Duplicate species name: {0}")]
    DuplicateName(String),
    #[error("Unknown species: {0}")]
    UnknownSpecies(String),
    #[error("Invalid index: {0}")]
    InvalidIndex(String),
}

/// A single run attribute value. Attributes are opaque to the crate and only passed through.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Number(f64),
    Text(String),
}

impl AttributeValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            AttributeValue::Number(x) => Some(*x),
            AttributeValue::Text(_) => None,
        }
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeValue::Number(x) => write!(f, "{}", x),
            AttributeValue::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<f64> for AttributeValue {
    fn from(x: f64) -> Self {
        AttributeValue::Number(x)
    }
}

impl From<&str> for AttributeValue {
    fn from(s: &str) -> Self {
        AttributeValue::Text(s.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(s: String) -> Self {
        AttributeValue::Text(s)
    }
}

/// Base kinetic trajectory.
///
/// Invariants established by the constructors:
/// - `times.len() == data.nrows()`
/// - `species_names.len() == data.ncols()`
/// - `times` are non-decreasing and never NaN
/// - species names are unique
///
/// There is no mutation API; the builder methods `with_*` consume the value and are meant to be
/// chained right after construction.
#[derive(Debug, Clone, PartialEq)]
pub struct Trajectory {
    pub(crate) species_names: Vec<String>,
    pub(crate) times: Vec<f64>,
    /// concentrations, shape [n_timesteps, n_species]
    pub(crate) data: DMatrix<f64>,
    pub(crate) attributes: HashMap<String, AttributeValue>,
    pub(crate) time_scaling_factor: f64,
    pub(crate) concentration_unit: String,
    /// species name -> column index
    species_lookup: HashMap<String, usize>,
}

impl Trajectory {
    /// Constructs a new kinetic trajectory from a concentration matrix of shape
    /// `[number of time steps, number of species]`.
    ///
    /// # Errors
    /// * `TrajectoryError::Shape` - the number of species differs from the number of matrix columns
    ///   or the number of time stamps differs from the number of matrix rows, or the time stamps
    ///   decrease somewhere (repeated stamps are fine)
    /// * `TrajectoryError::DuplicateName` - a species name occurs more than once
    pub fn new(
        species_names: Vec<String>,
        times: Vec<f64>,
        data: DMatrix<f64>,
    ) -> Result<Self, TrajectoryError> {
        if species_names.len() != data.ncols() {
            return Err(TrajectoryError::Shape(format!(
                "{} species names given, but the data has {} columns",
                species_names.len(),
                data.ncols()
            )));
        }
        if times.len() != data.nrows() {
            return Err(TrajectoryError::Shape(format!(
                "{} time stamps given, but the data has {} rows",
                times.len(),
                data.nrows()
            )));
        }
        if let Some(i) = times.iter().position(|t| t.is_nan()) {
            return Err(TrajectoryError::Shape(format!("time stamp at position {} is NaN", i)));
        }
        if let Some(i) = (1..times.len()).find(|&i| times[i] < times[i - 1]) {
            return Err(TrajectoryError::Shape(format!(
                "time stamps must not decrease: time {} at position {} follows time {}",
                times[i],
                i,
                times[i - 1]
            )));
        }
        let species_lookup = build_species_lookup(&species_names)?;

        Ok(Self {
            species_names,
            times,
            data,
            attributes: HashMap::new(),
            time_scaling_factor: 1.0,
            concentration_unit: DEFAULT_CONCENTRATION_UNIT.to_string(),
            species_lookup,
        })
    }

    /// Constructs a trajectory from row-major nested vectors, one inner vector per time step.
    /// This is the form the importers produce.
    pub fn from_rows(
        species_names: Vec<String>,
        times: Vec<f64>,
        rows: Vec<Vec<f64>>,
    ) -> Result<Self, TrajectoryError> {
        if times.len() != rows.len() {
            return Err(TrajectoryError::Shape(format!(
                "{} time stamps given, but the data has {} rows",
                times.len(),
                rows.len()
            )));
        }
        let n_species = species_names.len();
        if let Some((i, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != n_species) {
            return Err(TrajectoryError::Shape(format!(
                "row {} has {} entries, expected {} (one per species)",
                i,
                row.len(),
                n_species
            )));
        }
        let data = DMatrix::from_fn(rows.len(), n_species, |i, j| rows[i][j]);
        Self::new(species_names, times, data)
    }

    pub fn with_attributes(mut self, attributes: HashMap<String, AttributeValue>) -> Self {
        self.attributes = attributes;
        self
    }

    pub fn with_time_scaling_factor(mut self, time_scaling_factor: f64) -> Self {
        self.time_scaling_factor = time_scaling_factor;
        self
    }

    pub fn with_concentration_unit(mut self, concentration_unit: &str) -> Self {
        self.concentration_unit = concentration_unit.to_string();
        self
    }

    /// Returns the number of timesteps in the kinetic trajectory
    pub fn number_of_timesteps(&self) -> usize {
        self.times.len()
    }

    pub fn len(&self) -> usize {
        self.number_of_timesteps()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    pub fn number_of_species(&self) -> usize {
        self.species_names.len()
    }

    /// Returns the chemical species names in the kinetic trajectory
    pub fn species_names(&self) -> &[String] {
        &self.species_names
    }

    /// Column index of a species
    pub fn species_index(&self, name: &str) -> Result<usize, TrajectoryError> {
        self.species_lookup
            .get(name)
            .copied()
            .ok_or_else(|| TrajectoryError::UnknownSpecies(name.to_string()))
    }

    pub fn contains_species(&self, name: &str) -> bool {
        self.species_lookup.contains_key(name)
    }

    /// Returns the times of the recorded time steps (in stored units)
    pub fn times(&self) -> &[f64] {
        &self.times
    }

    /// Returns the recorded times converted to seconds with the time scaling factor
    pub fn times_in_seconds(&self) -> Vec<f64> {
        self.times
            .iter()
            .map(|t| t * self.time_scaling_factor)
            .collect()
    }

    /// Returns the underlying concentration matrix
    pub fn data(&self) -> &DMatrix<f64> {
        &self.data
    }

    pub fn attributes(&self) -> &HashMap<String, AttributeValue> {
        &self.attributes
    }

    pub fn attribute(&self, key: &str) -> Option<&AttributeValue> {
        self.attributes.get(key)
    }

    pub fn time_scaling_factor(&self) -> f64 {
        self.time_scaling_factor
    }

    pub fn concentration_unit(&self) -> &str {
        &self.concentration_unit
    }
}

fn build_species_lookup(species_names: &[String]) -> Result<HashMap<String, usize>, TrajectoryError> {
    let mut lookup = HashMap::with_capacity(species_names.len());
    for (i, name) in species_names.iter().enumerate() {
        if lookup.insert(name.clone(), i).is_some() {
            return Err(TrajectoryError::DuplicateName(name.clone()));
        }
    }
    Ok(lookup)
}
