//! # Equilibrium State Module
//!
//! ## Aim
//! Decides whether the tail of a kinetic trajectory represents a converged steady state and,
//! if so, returns the averaged concentrations.
//!
//! ## Algorithm
//! For a trajectory of `n` time steps and a window length `time_steps`:
//! 1. `time_steps >= n` is rejected: a non-empty burn-in prefix must stay out of the window
//! 2. the window covers the time positions `[n - time_steps, n - 1)`; the very last sample is
//!    NOT part of the window
//! 3. mean, max and min of every species are accumulated in a single pass over the window
//! 4. relative spread = |max - min| / |mean|
//! 5. a spread above `reltol` for any species fails the whole calculation
//!
//! ## Zero mean
//! A species without spread (max == min) is converged with spread 0, whatever its mean.
//! A spread over a zero mean, or a non-finite spread (NaN concentrations), is reported as
//! `AnalysisError::UndefinedSpread`.
//!
//! ## Negative mean
//! The spread is taken relative to the magnitude of the mean, so slightly negative solver
//! output is judged like its positive mirror and a negative mean never passes the tolerance
//! check by sign alone.
//!
//! ## Output string
//! `equilibrium_state_concentration_string` produces `A:1.000000e+00,B:1.000000e+01`: species in
//! trajectory order, no spaces, values in C `%e` notation. The string is fed verbatim to the
//! kinetics solver as an initial mole fraction specification.
use crate::Trajectories::trajectory::{Trajectory, TrajectoryError};
use log::{debug, info, warn};
use prettytable::{Table, row};
use std::fmt;
use thiserror::Error;

/// Default number of trailing time steps averaged
pub const DEFAULT_TIME_STEPS: usize = 100;
/// Default maximal relative spread in the averaging window
pub const DEFAULT_RELTOL: f64 = 0.01;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalysisError {
    #[error(
        "Insufficient data: averaging window of {time_steps} time steps needs a trajectory longer than {n_timesteps} time steps"
    )]
    InsufficientData {
        time_steps: usize,
        n_timesteps: usize,
    },
    #[error("Empty averaging window: {time_steps} time steps leave no samples once the last sample is excluded")]
    EmptyWindow { time_steps: usize },
    #[error("Not converged: relative spread of {species} is {spread:e}, tolerance {reltol:e}")]
    NotConverged {
        species: String,
        spread: f64,
        reltol: f64,
    },
    #[error("Undefined relative spread of {species}: mean {mean:e}, max {max:e}, min {min:e}")]
    UndefinedSpread {
        species: String,
        mean: f64,
        max: f64,
        min: f64,
    },
    #[error("Length mismatch: {0}")]
    LengthMismatch(String),
    #[error(transparent)]
    Trajectory(#[from] TrajectoryError),
}

/// Statistics of one species over the averaging window
#[derive(Debug, Clone, PartialEq)]
pub struct WindowStats {
    pub species: String,
    pub mean: f64,
    pub max: f64,
    pub min: f64,
    /// |max - min| / mean, `None` if undefined (spread over zero mean, NaN data)
    pub relative_spread: Option<f64>,
}

/// single pass accumulator
#[derive(Debug, Clone, Copy)]
struct Accumulator {
    sum: f64,
    max: f64,
    min: f64,
    count: usize,
}

impl Accumulator {
    fn new() -> Self {
        Self {
            sum: 0.0,
            max: f64::NEG_INFINITY,
            min: f64::INFINITY,
            count: 0,
        }
    }

    fn push(&mut self, x: f64) {
        self.sum += x;
        // NaN must not be swallowed by f64::max / f64::min
        if x.is_nan() || x > self.max {
            self.max = x;
        }
        if x.is_nan() || x < self.min {
            self.min = x;
        }
        self.count += 1;
    }

    fn finish(self, species: &str) -> WindowStats {
        let mean = self.sum / self.count as f64;
        let spread = (self.max - self.min).abs();
        let relative_spread = if spread == 0.0 {
            Some(0.0)
        } else {
            let rel = spread / mean.abs();
            if rel.is_finite() { Some(rel) } else { None }
        };
        WindowStats {
            species: species.to_string(),
            mean,
            max: self.max,
            min: self.min,
            relative_spread,
        }
    }
}

/// Averaged concentrations of all species, in trajectory species order
#[derive(Debug, Clone, PartialEq)]
pub struct EquilibriumResult {
    concentrations: Vec<(String, f64)>,
}

impl EquilibriumResult {
    pub fn get(&self, species: &str) -> Option<f64> {
        self.concentrations
            .iter()
            .find(|(name, _)| name == species)
            .map(|(_, c)| *c)
    }

    pub fn species_names(&self) -> Vec<&str> {
        self.concentrations.iter().map(|(name, _)| name.as_str()).collect()
    }

    pub fn values(&self) -> Vec<f64> {
        self.concentrations.iter().map(|(_, c)| *c).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.concentrations.iter().map(|(name, c)| (name.as_str(), *c))
    }

    pub fn len(&self) -> usize {
        self.concentrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.concentrations.is_empty()
    }

    /// `name1:value1,name2:value2,...` in species order
    pub fn to_concentration_string(&self) -> String {
        self.concentrations
            .iter()
            .map(|(name, c)| format!("{}:{}", name, format_scientific(*c)))
            .collect::<Vec<String>>()
            .join(",")
    }

    pub fn to_table(&self) -> Table {
        let mut table = Table::new();
        table.add_row(row!["substance", "equilibrium concentration"]);
        for (name, c) in &self.concentrations {
            table.add_row(row![name, format_scientific(*c)]);
        }
        table
    }

    pub fn pretty_print(&self) {
        println!("__________equilibrium state__________");
        self.to_table().printstd();
        println!("_____________________________________________________________");
    }
}

impl fmt::Display for EquilibriumResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_concentration_string())
    }
}

/// Formats a number like C `printf("%e")`: six digits after the decimal point and a signed
/// exponent of at least two digits, e.g. `2.426859e+19`
pub fn format_scientific(x: f64) -> String {
    if !x.is_finite() {
        return format!("{}", x).to_lowercase();
    }
    let formatted = format!("{:.6e}", x);
    match formatted.split_once('e') {
        Some((mantissa, exponent)) => {
            let exponent: i32 = exponent.parse().unwrap_or(0);
            let sign = if exponent < 0 { '-' } else { '+' };
            format!("{}e{}{:02}", mantissa, sign, exponent.abs())
        }
        None => formatted,
    }
}

fn check_window(trajectory: &Trajectory, time_steps: usize) -> Result<(usize, usize), AnalysisError> {
    let n = trajectory.number_of_timesteps();
    if time_steps >= n {
        return Err(AnalysisError::InsufficientData {
            time_steps,
            n_timesteps: n,
        });
    }
    if time_steps < 2 {
        return Err(AnalysisError::EmptyWindow { time_steps });
    }
    Ok((n - time_steps, n - 1))
}

/// Mean, max, min and relative spread of every species over the window
/// `[n - time_steps, n - 1)`, without tolerance check
pub fn window_statistics(
    trajectory: &Trajectory,
    time_steps: usize,
) -> Result<Vec<WindowStats>, AnalysisError> {
    let (start, end) = check_window(trajectory, time_steps)?;
    debug!(
        "averaging window [{}, {}) of {} time steps",
        start,
        end,
        trajectory.number_of_timesteps()
    );
    let stats = trajectory
        .species_names()
        .iter()
        .enumerate()
        .map(|(j, name)| {
            let mut acc = Accumulator::new();
            for &x in &trajectory.column_data(j)[start..end] {
                acc.push(x);
            }
            acc.finish(name)
        })
        .collect();
    Ok(stats)
}

/// Calculates the final equilibrium state of a kinetic trajectory: the average concentrations of
/// the species over the trailing `time_steps` time steps (last sample excluded). Fails if the
/// relative fluctuation of any species in the window exceeds `reltol`.
pub fn equilibrium_state(
    trajectory: &Trajectory,
    time_steps: usize,
    reltol: f64,
) -> Result<EquilibriumResult, AnalysisError> {
    let stats = window_statistics(trajectory, time_steps)?;

    let mut first_failure: Option<AnalysisError> = None;
    for s in &stats {
        let failure = match s.relative_spread {
            None => Some(AnalysisError::UndefinedSpread {
                species: s.species.clone(),
                mean: s.mean,
                max: s.max,
                min: s.min,
            }),
            Some(spread) if spread > reltol => Some(AnalysisError::NotConverged {
                species: s.species.clone(),
                spread,
                reltol,
            }),
            Some(_) => None,
        };
        if let Some(failure) = failure {
            warn!("equilibrium check failed: {}", failure);
            if first_failure.is_none() {
                first_failure = Some(failure);
            }
        }
    }
    if let Some(failure) = first_failure {
        return Err(failure);
    }

    info!(
        "equilibrium state of {} species averaged over {} time steps",
        stats.len(),
        time_steps - 1
    );
    Ok(EquilibriumResult {
        concentrations: stats.into_iter().map(|s| (s.species, s.mean)).collect(),
    })
}

/// Equilibrium state serialized as the solver initial-condition string
pub fn equilibrium_state_concentration_string(
    trajectory: &Trajectory,
    time_steps: usize,
    reltol: f64,
) -> Result<String, AnalysisError> {
    let result = equilibrium_state(trajectory, time_steps, reltol)?;
    Ok(result.to_concentration_string())
}

/// Table of the window statistics, for reporting
pub fn window_statistics_table(stats: &[WindowStats]) -> Table {
    let mut table = Table::new();
    table.add_row(row!["substance", "mean", "min", "max", "relative spread"]);
    for s in stats {
        let spread = match s.relative_spread {
            Some(x) => format!("{:.4e}", x),
            None => "undefined".to_string(),
        };
        table.add_row(row![
            s.species,
            format_scientific(s.mean),
            format_scientific(s.min),
            format_scientific(s.max),
            spread
        ]);
    }
    table
}
