//! # IDSimF RS Result Importer
//!
//! Reads the concentration file of an IDSimF reaction simulation (RS) run:
//!
//! ```text
//! IDSimF RS result, version 1.0
//! Time ; Timestep ; Cl_1 ; Cl_2 ; Cl_3 ;
//! 0.0 ; 0 ; 1000 ; 0 ; 0 ;
//! 2e-06 ; 1 ; 920 ; 71 ; 9 ;
//! ```
//!
//! - the first line is a free text header and is skipped
//! - fields are `;` separated, every line ends with a `;` which produces an empty trailing
//!   column that is dropped
//! - column names are trimmed, the `Time` column holds the time stamps, the column after the
//!   time column is bookkeeping of the simulation and species start at the third column
use super::import_error::{ImportError, parse_field};
use crate::Trajectories::trajectory::Trajectory;
use log::{info, warn};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// index of the first species column
const FIRST_SPECIES_COLUMN: usize = 2;

/// Reads an IDSimF reaction simulation (RS) result from an RS result file
pub fn read_idsimf_rs_result<P: AsRef<Path>>(rs_file_path: P) -> Result<Trajectory, ImportError> {
    let path = rs_file_path.as_ref();
    let file = File::open(path)?;
    let trajectory = read_idsimf_rs_from_reader(BufReader::new(file))?;
    info!(
        "Successfully read IDSimF RS result '{}': {} species, {} time steps",
        path.display(),
        trajectory.number_of_species(),
        trajectory.number_of_timesteps()
    );
    Ok(trajectory)
}

/// Reads an IDSimF RS result from any buffered reader
pub fn read_idsimf_rs_from_reader<R: BufRead>(mut reader: R) -> Result<Trajectory, ImportError> {
    let mut comment = String::new();
    if reader.read_line(&mut comment)? == 0 {
        return Err(ImportError::Format("empty RS result file".to_string()));
    }

    let mut csv_reader = csv::ReaderBuilder::new()
        .delimiter(b';')
        .flexible(true)
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut headers: Vec<String> = csv_reader
        .headers()?
        .iter()
        .map(|s| s.trim().to_string())
        .collect();
    if headers.last().is_some_and(|h| h.is_empty()) {
        headers.pop();
    }

    let time_column = headers
        .iter()
        .position(|h| h == "Time")
        .ok_or_else(|| ImportError::MissingColumn("Time".to_string()))?;
    if headers.len() <= FIRST_SPECIES_COLUMN {
        return Err(ImportError::Format(format!(
            "RS result has {} columns, expected at least {}",
            headers.len(),
            FIRST_SPECIES_COLUMN + 1
        )));
    }
    let species_names = headers[FIRST_SPECIES_COLUMN..].to_vec();
    let n_columns = headers.len();

    let mut times = Vec::new();
    let mut rows = Vec::new();
    for record in csv_reader.records() {
        let record = record?;
        // the comment line precedes the csv stream
        let line = record.position().map(|p| p.line() as usize + 1).unwrap_or(0);
        if record.iter().all(|field| field.is_empty()) {
            continue;
        }
        let fields: Vec<&str> = record.iter().take(n_columns).collect();
        if fields.len() < n_columns {
            warn!("line {} of RS result is truncated, stopping", line);
            break;
        }
        times.push(parse_field(fields[time_column], line)?);
        let row = fields[FIRST_SPECIES_COLUMN..]
            .iter()
            .map(|v| parse_field(v, line))
            .collect::<Result<Vec<f64>, ImportError>>()?;
        rows.push(row);
    }

    Ok(Trajectory::from_rows(species_names, times, rows)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Importers::import_error::ImportError;
    use crate::Trajectories::trajectory::TrajectoryError;
    use approx::assert_relative_eq;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_rs_file(n_steps: usize) -> NamedTempFile {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "IDSimF RS result, qitSim 2019_04_15_001").unwrap();
        writeln!(temp_file, "Time ; Timestep ; Cl_1 ; Cl_2 ; Cl_3 ;").unwrap();
        for i in 0..n_steps {
            writeln!(
                temp_file,
                "{:e} ; {} ; {} ; {} ; {} ;",
                i as f64 * 2e-6,
                i,
                1000 - 2 * i,
                50 + 5 * i,
                i
            )
            .unwrap();
        }
        temp_file
    }

    #[test]
    fn test_basic_idsimf_rs_reading() {
        let temp_file = write_rs_file(50);
        let tra = read_idsimf_rs_result(temp_file.path()).unwrap();

        assert_eq!(tra.number_of_timesteps(), 50);
        assert_eq!(tra.species_names(), &["Cl_1", "Cl_2", "Cl_3"]);
        assert_relative_eq!(*tra.times().last().unwrap(), 9.8e-5, epsilon = 1e-15);
        assert_eq!(tra.series_for("Cl_2").unwrap()[4], 70.0);
        assert_eq!(tra.value_at("Cl_1", 49).unwrap(), 902.0);
    }

    #[test]
    fn test_rs_reading_without_trailing_separator() {
        let data = "comment\nTime;Timestep;A;B\n0.0;0;1;2\n1.0;1;3;4\n";
        let tra = read_idsimf_rs_from_reader(data.as_bytes()).unwrap();
        assert_eq!(tra.species_names(), &["A", "B"]);
        assert_eq!(tra.series_for("B").unwrap(), &[2.0, 4.0]);
    }

    #[test]
    fn test_rs_reading_missing_time_column() {
        let data = "comment\nt;Timestep;A;\n0.0;0;1;\n";
        let result = read_idsimf_rs_from_reader(data.as_bytes());
        assert!(matches!(result, Err(ImportError::MissingColumn(c)) if c == "Time"));
    }

    #[test]
    fn test_rs_reading_invalid_number() {
        let data = "comment\nTime;Timestep;A;\n0.0;0;1;\n1.0;1;x;\n";
        let result = read_idsimf_rs_from_reader(data.as_bytes());
        match result {
            Err(ImportError::ParseFloat { line, value }) => {
                assert_eq!(value, "x");
                assert_eq!(line, 4);
            }
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn test_rs_reading_duplicate_species() {
        let data = "comment\nTime;Timestep;A;A;\n0.0;0;1;2;\n";
        let result = read_idsimf_rs_from_reader(data.as_bytes());
        assert!(matches!(
            result,
            Err(ImportError::Trajectory(TrajectoryError::DuplicateName(_)))
        ));
    }

    #[test]
    fn test_rs_reading_empty_file() {
        let result = read_idsimf_rs_from_reader("".as_bytes());
        assert!(matches!(result, Err(ImportError::Format(_))));
    }

    #[test]
    fn test_rs_reading_file_not_found() {
        let result = read_idsimf_rs_result("non_existent_file.txt");
        assert!(matches!(result, Err(ImportError::Io(_))));
    }
}
