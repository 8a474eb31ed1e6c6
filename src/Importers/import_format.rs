use super::delimited::{Delimiter, DelimitedOptions, read_delimited};
use super::idsimf_rs::read_idsimf_rs_result;
use super::import_error::ImportError;
use super::openfoam_log::read_openfoam_log;
use crate::Trajectories::trajectory::Trajectory;
use log::info;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Simulation result file formats known to the importers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportFormat {
    /// IDSimF reaction simulation result
    #[default]
    Rs,
    /// comma separated table with header row, time in the first column
    Csv,
    /// white space separated table with header row, time in the first column
    #[serde(alias = "ws")]
    Whitespace,
    /// OpenFOAM solver log
    Foam,
}

impl FromStr for ImportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "rs" | "idsimf" => Ok(ImportFormat::Rs),
            "csv" => Ok(ImportFormat::Csv),
            "ws" | "whitespace" => Ok(ImportFormat::Whitespace),
            "foam" | "openfoam" => Ok(ImportFormat::Foam),
            other => Err(format!(
                "unknown file format '{}', expected one of rs, csv, ws, foam",
                other
            )),
        }
    }
}

impl fmt::Display for ImportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ImportFormat::Rs => "rs",
            ImportFormat::Csv => "csv",
            ImportFormat::Whitespace => "ws",
            ImportFormat::Foam => "foam",
        };
        write!(f, "{}", name)
    }
}

/// Loads a trajectory in the given format.
/// `species_names` overrides the header names of the table formats and names the
/// concentration vector entries of an OpenFOAM log; it is ignored for RS results.
pub fn load_trajectory<P: AsRef<Path>>(
    path: P,
    format: ImportFormat,
    species_names: Option<&[String]>,
) -> Result<Trajectory, ImportError> {
    let path = path.as_ref();
    info!("loading '{}' as {}", path.display(), format);
    let table_options = |delimiter: Delimiter| DelimitedOptions {
        delimiter,
        skip_lines: usize::from(species_names.is_some()),
        n_species: species_names.map(|names| names.len()),
        species_names: species_names.map(|names| names.to_vec()),
        ..Default::default()
    };
    match format {
        ImportFormat::Rs => read_idsimf_rs_result(path),
        ImportFormat::Csv => read_delimited(path, &table_options(Delimiter::Char(b','))),
        ImportFormat::Whitespace => read_delimited(path, &table_options(Delimiter::Whitespace)),
        ImportFormat::Foam => read_openfoam_log(path, species_names, None),
    }
}
