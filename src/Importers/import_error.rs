use crate::Trajectories::trajectory::TrajectoryError;
use thiserror::Error;

/// Errors that can occur while importing a simulation result file
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Pattern error: {0}")]
    Regex(#[from] regex::Error),
    #[error("Invalid number '{value}' in line {line}")]
    ParseFloat { line: usize, value: String },
    #[error("Missing column: {0}")]
    MissingColumn(String),
    #[error("Invalid format: {0}")]
    Format(String),
    #[error("Invalid trajectory: {0}")]
    Trajectory(#[from] TrajectoryError),
}

/// Parses a trimmed number field, reporting the line on failure
pub(crate) fn parse_field(value: &str, line: usize) -> Result<f64, ImportError> {
    value.trim().parse::<f64>().map_err(|_| ImportError::ParseFloat {
        line,
        value: value.trim().to_string(),
    })
}
