//! # OpenFOAM Solver Log Importer
//!
//! The chemistry solver of the OpenFOAM reactor cases prints the current time and the
//! concentration vector of every time step to its log:
//!
//! ```text
//! Time = 1e-07
//! ...
//!     Chemical Concentrations              = 3(1000 12.5 0)
//! ```
//!
//! The log holds no species names, they are supplied by the caller. Each concentration block
//! belongs to the most recent `Time =` line.
use super::import_error::{ImportError, parse_field};
use crate::Trajectories::trajectory::Trajectory;
use log::{info, warn};
use regex::Regex;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

const TIME_PATTERN: &str = r"^Time = (?P<T>.*)$";
const CONCENTRATIONS_PATTERN: &str = r"^\s*Chemical Concentrations\s*=\s*\d*\((?P<concs>.*)\)";

/// Reads the concentration time series from an OpenFOAM solver log
///
/// * `species_names` - names of the concentration vector entries, `species_1..N` if `None`
/// * `max_samples` - stop after this many concentration blocks, read all if `None`
pub fn read_openfoam_log<P: AsRef<Path>>(
    log_path: P,
    species_names: Option<&[String]>,
    max_samples: Option<usize>,
) -> Result<Trajectory, ImportError> {
    let path = log_path.as_ref();
    let file = File::open(path)?;
    let trajectory = read_openfoam_log_from_reader(BufReader::new(file), species_names, max_samples)?;
    info!(
        "Successfully read OpenFOAM log '{}': {} species, {} time steps",
        path.display(),
        trajectory.number_of_species(),
        trajectory.number_of_timesteps()
    );
    Ok(trajectory)
}

pub fn read_openfoam_log_from_reader<R: BufRead>(
    reader: R,
    species_names: Option<&[String]>,
    max_samples: Option<usize>,
) -> Result<Trajectory, ImportError> {
    let time_re = Regex::new(TIME_PATTERN)?;
    let concs_re = Regex::new(CONCENTRATIONS_PATTERN)?;

    let mut current_time: Option<f64> = None;
    let mut times = Vec::new();
    let mut rows: Vec<Vec<f64>> = Vec::new();

    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        let line_number = i + 1;
        if let Some(caps) = time_re.captures(&line) {
            current_time = Some(parse_field(&caps["T"], line_number)?);
            continue;
        }
        let Some(caps) = concs_re.captures(&line) else {
            continue;
        };
        let time = current_time.ok_or_else(|| {
            ImportError::Format(format!(
                "concentrations in line {} precede the first time step",
                line_number
            ))
        })?;
        let row = caps["concs"]
            .split_whitespace()
            .map(|v| parse_field(v, line_number))
            .collect::<Result<Vec<f64>, ImportError>>()?;
        if let Some(first) = rows.first() {
            if first.len() != row.len() {
                return Err(ImportError::Format(format!(
                    "line {} has {} concentrations, expected {}",
                    line_number,
                    row.len(),
                    first.len()
                )));
            }
        }
        times.push(time);
        rows.push(row);
        if max_samples.is_some_and(|max| rows.len() >= max) {
            break;
        }
    }

    if rows.is_empty() {
        warn!("no concentration lines found in OpenFOAM log");
    }
    let n_species = rows.first().map_or(0, |r| r.len());
    let names: Vec<String> = match species_names {
        Some(names) => {
            if !rows.is_empty() && names.len() != n_species {
                return Err(ImportError::Format(format!(
                    "{} species names for {} concentrations",
                    names.len(),
                    n_species
                )));
            }
            names.to_vec()
        }
        None => (1..=n_species).map(|j| format!("species_{}", j)).collect(),
    };

    Ok(Trajectory::from_rows(names, times, rows)?)
}
