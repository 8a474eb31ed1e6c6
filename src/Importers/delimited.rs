//! # Delimited Concentration Table Importer
//!
//! Generic reader for concentration tables written by the reactor simulator and the lab tools:
//! some header lines, then one line per recorded time step holding the time and the species
//! concentrations. Species names are taken from a header row or supplied by the caller.
//!
//! ```rust, ignore
//! let options = DelimitedOptions {
//!     delimiter: Delimiter::Char(b','),
//!     skip_lines: 0,
//!     time_column: 0,
//!     first_species_column: 3,
//!     ..Default::default()
//! };
//! let tra = read_delimited("reactor_dump.csv", &options)?;
//! ```
use super::import_error::{ImportError, parse_field};
use crate::Trajectories::trajectory::Trajectory;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Field separator of a delimited table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Delimiter {
    /// a single byte separator (`,`, `;`, tab)
    Char(u8),
    /// any run of white space
    Whitespace,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DelimitedOptions {
    pub delimiter: Delimiter,
    /// lines skipped before the header row (or before the data if `species_names` is given)
    pub skip_lines: usize,
    pub time_column: usize,
    pub first_species_column: usize,
    /// number of species columns, all remaining columns if `None`
    pub n_species: Option<usize>,
    /// species names; if `None` they are read from the header row
    pub species_names: Option<Vec<String>>,
    /// multiplier applied to the time column while reading
    pub time_multiplier: f64,
    /// time scaling factor stored in the trajectory
    pub time_scaling_factor: f64,
}

impl Default for DelimitedOptions {
    fn default() -> Self {
        Self {
            delimiter: Delimiter::Char(b','),
            skip_lines: 0,
            time_column: 0,
            first_species_column: 1,
            n_species: None,
            species_names: None,
            time_multiplier: 1.0,
            time_scaling_factor: 1.0,
        }
    }
}

impl DelimitedOptions {
    /// white space separated table without header, as written by the chemked tool:
    /// column 0 is a step counter, column 1 the time in s (converted to microseconds)
    pub fn whitespace(species_names: Vec<String>, skip_lines: usize) -> Self {
        Self {
            delimiter: Delimiter::Whitespace,
            skip_lines,
            time_column: 1,
            first_species_column: 2,
            n_species: Some(species_names.len()),
            species_names: Some(species_names),
            time_multiplier: 1e6,
            time_scaling_factor: 1e-6,
        }
    }
}

/// Reads a delimited concentration table from a file
pub fn read_delimited<P: AsRef<Path>>(
    file_path: P,
    options: &DelimitedOptions,
) -> Result<Trajectory, ImportError> {
    let path = file_path.as_ref();
    let file = File::open(path)?;
    let trajectory = read_delimited_from_reader(BufReader::new(file), options)?;
    info!(
        "Successfully read concentration table '{}': {} species, {} time steps",
        path.display(),
        trajectory.number_of_species(),
        trajectory.number_of_timesteps()
    );
    Ok(trajectory)
}

/// Reads a delimited concentration table from any buffered reader
pub fn read_delimited_from_reader<R: BufRead>(
    reader: R,
    options: &DelimitedOptions,
) -> Result<Trajectory, ImportError> {
    let records = split_records(reader, options)?;
    let mut records = records.into_iter();

    let n_columns_needed = |n_species: usize| options.first_species_column + n_species;

    let species_names: Vec<String> = match &options.species_names {
        Some(names) => names.clone(),
        None => {
            let (_, header) = records
                .next()
                .ok_or_else(|| ImportError::Format("missing header row".to_string()))?;
            if header.len() <= options.first_species_column {
                return Err(ImportError::Format(format!(
                    "header has {} columns, species start at column {}",
                    header.len(),
                    options.first_species_column
                )));
            }
            let available = header.len() - options.first_species_column;
            let n = options.n_species.unwrap_or(available).min(available);
            header[options.first_species_column..options.first_species_column + n].to_vec()
        }
    };
    let n_species = options.n_species.unwrap_or(species_names.len());
    if n_species != species_names.len() {
        return Err(ImportError::Format(format!(
            "{} species names for {} species columns",
            species_names.len(),
            n_species
        )));
    }
    if options.time_column >= options.first_species_column
        && options.time_column < n_columns_needed(n_species)
    {
        return Err(ImportError::Format(format!(
            "time column {} overlaps the species columns",
            options.time_column
        )));
    }

    let mut times = Vec::new();
    let mut rows = Vec::new();
    for (line, fields) in records {
        let needed = n_columns_needed(n_species).max(options.time_column + 1);
        if fields.len() < needed {
            return Err(ImportError::Format(format!(
                "line {} has {} fields, expected at least {}",
                line,
                fields.len(),
                needed
            )));
        }
        times.push(parse_field(&fields[options.time_column], line)? * options.time_multiplier);
        let row = fields[options.first_species_column..n_columns_needed(n_species)]
            .iter()
            .map(|v| parse_field(v, line))
            .collect::<Result<Vec<f64>, ImportError>>()?;
        rows.push(row);
    }
    debug!("read {} rows of {} species", rows.len(), n_species);

    Ok(Trajectory::from_rows(species_names, times, rows)?
        .with_time_scaling_factor(options.time_scaling_factor))
}

/// Splits the table into (line number, fields) records, skipping the leading lines and blank lines
fn split_records<R: BufRead>(
    reader: R,
    options: &DelimitedOptions,
) -> Result<Vec<(usize, Vec<String>)>, ImportError> {
    match options.delimiter {
        Delimiter::Whitespace => {
            let mut records = Vec::new();
            for (i, line) in reader.lines().enumerate().skip(options.skip_lines) {
                let line = line?;
                if line.trim().is_empty() {
                    continue;
                }
                let fields = line.split_whitespace().map(|s| s.to_string()).collect();
                records.push((i + 1, fields));
            }
            Ok(records)
        }
        Delimiter::Char(delimiter) => {
            let mut reader = reader;
            let mut skipped = String::new();
            for _ in 0..options.skip_lines {
                skipped.clear();
                if reader.read_line(&mut skipped)? == 0 {
                    break;
                }
            }
            let mut csv_reader = csv::ReaderBuilder::new()
                .delimiter(delimiter)
                .flexible(true)
                .has_headers(false)
                .trim(csv::Trim::All)
                .from_reader(reader);
            let mut records = Vec::new();
            for record in csv_reader.records() {
                let record = record?;
                let line = record
                    .position()
                    .map(|p| p.line() as usize + options.skip_lines)
                    .unwrap_or(0);
                let fields: Vec<String> = record.iter().map(|s| s.to_string()).collect();
                if fields.iter().all(|f| f.is_empty()) {
                    continue;
                }
                records.push((line, fields));
            }
            Ok(records)
        }
    }
}
