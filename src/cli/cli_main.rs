use super::batch::{ClusterOptions, run_batch};
use crate::Analysis::equilibrium::{
    AnalysisError, equilibrium_state, format_scientific, window_statistics, window_statistics_table,
};
use crate::Importers::import_error::ImportError;
use crate::Importers::import_format::{ImportFormat, load_trajectory};
use crate::Trajectories::indexing::{Selection, Selector};
use crate::Trajectories::trajectory::{Trajectory, TrajectoryError};
use crate::settings::{AnalysisSettings, DEFAULT_SETTINGS_FILE, SettingsError};
use clap::{Args, Parser, Subcommand};
use log::{LevelFilter, info};
use prettytable::{Table, row};
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Import(#[from] ImportError),
    #[error(transparent)]
    Analysis(#[from] AnalysisError),
    #[error(transparent)]
    Trajectory(#[from] TrajectoryError),
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error("Failed to write output: {0}")]
    Io(#[from] std::io::Error),
    #[error("{failed} of {total} files failed")]
    Batch { failed: usize, total: usize },
}

/// KiTra - kinetic trajectory analysis of reaction simulation results
#[derive(Parser, Debug)]
#[command(name = "kitra")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Verbosity level (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// JSON settings file with the analysis defaults
    #[arg(long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Input file and how to read it
#[derive(Args, Debug, Clone)]
pub struct InputArgs {
    /// Simulation result file
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// File format: rs, csv, ws or foam (default from the settings)
    #[arg(short, long)]
    pub format: Option<ImportFormat>,

    /// Comma separated species names, overriding the names of the file
    #[arg(long, value_delimiter = ',')]
    pub species: Vec<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print an overview of a trajectory
    Summary {
        #[command(flatten)]
        input: InputArgs,
    },

    /// Print part of a trajectory, e.g. `3`, `H2O,2:5`, `[A,B],1:3` or `H2O@5e-6`
    Query {
        #[command(flatten)]
        input: InputArgs,

        /// Selector expression
        #[arg(value_name = "SELECTOR", allow_hyphen_values = true)]
        selector: String,
    },

    /// Check the trajectory tail for convergence and print the equilibrium state
    Equilibrium {
        #[command(flatten)]
        input: InputArgs,

        /// Number of trailing time steps in the averaging window
        #[arg(short, long)]
        time_steps: Option<usize>,

        /// Maximal relative spread in the averaging window
        #[arg(short, long)]
        reltol: Option<f64>,

        /// Print the concentration string only
        #[arg(long)]
        string: bool,

        /// Print the window statistics of every species
        #[arg(long)]
        stats: bool,
    },

    /// Analyze several result files and write `<file>_analysis.txt` reports
    Batch {
        /// Simulation result files
        #[arg(value_name = "FILES", required = true)]
        files: Vec<PathBuf>,

        /// File format of all files
        #[arg(short, long)]
        format: Option<ImportFormat>,

        /// Species column holding the field phase flag (1 high field, 0 low field)
        #[arg(long)]
        flag_species: Option<String>,

        /// Comma separated cluster species in cluster size order (default: all species)
        #[arg(long, value_delimiter = ',')]
        clusters: Vec<String>,

        /// Comma separated ion masses of the clusters (amu) for the mean mobility estimate
        #[arg(long, value_delimiter = ',')]
        masses: Vec<f64>,
    },
}

/// Initializes the console logger with the level selected by `-v`
pub fn init_logger(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };
    // a second initialization (tests) is harmless
    let _ = TermLogger::init(level, Config::default(), TerminalMode::Mixed, ColorChoice::Auto);
}

/// Settings of a run: an explicit `--config` file must exist, the default file is optional
pub fn load_settings(config: Option<&Path>) -> Result<AnalysisSettings, SettingsError> {
    match config {
        Some(path) => AnalysisSettings::load_required(path),
        None => AnalysisSettings::load(DEFAULT_SETTINGS_FILE),
    }
}

/// Imports a file with the format and species names of the command line, falling back to the
/// settings, and attaches the units of the settings
pub fn load_input(
    path: &Path,
    format: Option<ImportFormat>,
    species: &[String],
    settings: &AnalysisSettings,
) -> Result<Trajectory, CliError> {
    let format = format.unwrap_or(settings.default_format);
    let species_names = if species.is_empty() {
        settings.species_names_for(format)
    } else {
        Some(species)
    };
    let trajectory = load_trajectory(path, format, species_names)?;
    // importers that know the time unit set their own factor
    let trajectory = if trajectory.time_scaling_factor() == 1.0 {
        trajectory.with_time_scaling_factor(settings.time_scaling_factor)
    } else {
        trajectory
    };
    Ok(trajectory.with_concentration_unit(&settings.concentration_unit))
}

pub fn run(cli: Cli) -> Result<(), CliError> {
    let settings = load_settings(cli.config.as_deref())?;
    match cli.command {
        Commands::Summary { input } => {
            let tra = load_input(&input.file, input.format, &input.species, &settings)?;
            tra.pretty_print();
        }
        Commands::Query { input, selector } => {
            let tra = load_input(&input.file, input.format, &input.species, &settings)?;
            let selector: Selector = selector.parse()?;
            let selection = tra.select(&selector)?;
            selection_table(&tra, &selection).printstd();
        }
        Commands::Equilibrium {
            input,
            time_steps,
            reltol,
            string,
            stats,
        } => {
            let tra = load_input(&input.file, input.format, &input.species, &settings)?;
            let time_steps = time_steps.unwrap_or(settings.time_steps);
            let reltol = reltol.unwrap_or(settings.reltol);
            if stats {
                window_statistics_table(&window_statistics(&tra, time_steps)?).printstd();
            }
            let result = equilibrium_state(&tra, time_steps, reltol)?;
            if string {
                println!("{}", result.to_concentration_string());
            } else {
                result.pretty_print();
            }
        }
        Commands::Batch {
            files,
            format,
            flag_species,
            clusters,
            masses,
        } => {
            let options = ClusterOptions {
                flag_species,
                clusters,
                masses,
            };
            run_batch(&files, format, &options, &settings)?;
        }
    }
    info!("done");
    Ok(())
}

/// Console table of a selection
pub fn selection_table(trajectory: &Trajectory, selection: &Selection<'_>) -> Table {
    match selection {
        Selection::Value(x) => {
            let mut table = Table::new();
            table.add_row(row!["value"]);
            table.add_row(row![format_scientific(*x)]);
            table
        }
        Selection::Row(values) => {
            let mut table = Table::new();
            table.add_row(row!["substance", "concentration"]);
            for (name, x) in trajectory.species_names().iter().zip(values.iter()) {
                table.add_row(row![name, format_scientific(*x)]);
            }
            table
        }
        Selection::Series(start, values) => {
            let times = trajectory.times().get(*start..).unwrap_or_default();
            let mut table = Table::new();
            table.add_row(row!["#", "time", "concentration"]);
            for (i, (t, x)) in times.iter().zip(values.iter()).enumerate() {
                table.add_row(row![start + i, t, format_scientific(*x)]);
            }
            table
        }
        Selection::Table(species_table) => species_table.to_table(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn rs_file() -> NamedTempFile {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "IDSimF RS result").unwrap();
        writeln!(temp_file, "Time ; Timestep ; A ; B ;").unwrap();
        for i in 0..20 {
            writeln!(temp_file, "{} ; {} ; 1.0 ; 10.0 ;", i, i).unwrap();
        }
        temp_file
    }

    #[test]
    fn test_parse_equilibrium_command() {
        let cli = Cli::try_parse_from([
            "kitra",
            "-vv",
            "equilibrium",
            "result.txt",
            "--format",
            "csv",
            "--time-steps",
            "50",
            "--reltol",
            "0.05",
            "--string",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Equilibrium {
                input,
                time_steps,
                reltol,
                string,
                stats,
            } => {
                assert_eq!(input.file, PathBuf::from("result.txt"));
                assert_eq!(input.format, Some(ImportFormat::Csv));
                assert_eq!(time_steps, Some(50));
                assert_eq!(reltol, Some(0.05));
                assert!(string);
                assert!(!stats);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_parse_query_and_batch_commands() {
        let cli = Cli::try_parse_from([
            "kitra",
            "query",
            "log.txt",
            "-f",
            "foam",
            "--species",
            "A,B,C",
            "[A,B],1:3",
        ])
        .unwrap();
        match cli.command {
            Commands::Query { input, selector } => {
                assert_eq!(input.species, vec!["A", "B", "C"]);
                assert_eq!(selector, "[A,B],1:3");
            }
            other => panic!("unexpected command {:?}", other),
        }

        let cli = Cli::try_parse_from([
            "kitra",
            "--config",
            "my_settings.json",
            "batch",
            "a.txt",
            "b.txt",
            "--flag-species",
            "field",
            "--masses",
            "19,37.5",
        ])
        .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("my_settings.json")));
        match cli.command {
            Commands::Batch {
                files,
                flag_species,
                masses,
                ..
            } => {
                assert_eq!(files.len(), 2);
                assert_eq!(flag_species.as_deref(), Some("field"));
                assert_eq!(masses, vec![19.0, 37.5]);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_parse_errors() {
        assert!(Cli::try_parse_from(["kitra", "summary", "a.txt", "--format", "xlsx"]).is_err());
        assert!(Cli::try_parse_from(["kitra", "batch"]).is_err());
    }

    #[test]
    fn test_load_input_applies_settings() {
        let file = rs_file();
        let settings = AnalysisSettings {
            concentration_unit: "particles".to_string(),
            time_scaling_factor: 1e-6,
            ..Default::default()
        };
        let tra = load_input(file.path(), None, &[], &settings).unwrap();
        assert_eq!(tra.number_of_timesteps(), 20);
        assert_eq!(tra.concentration_unit(), "particles");
        assert_eq!(tra.time_scaling_factor(), 1e-6);
    }

    #[test]
    fn test_run_equilibrium_and_query() {
        let file = rs_file();
        let path = file.path().to_str().unwrap();
        let cli = Cli::try_parse_from(["kitra", "equilibrium", path, "-t", "10", "--stats"]).unwrap();
        assert!(run(cli).is_ok());

        let cli = Cli::try_parse_from(["kitra", "query", path, "B,3:5"]).unwrap();
        assert!(run(cli).is_ok());

        let cli = Cli::try_parse_from(["kitra", "query", path, "C"]).unwrap();
        assert!(matches!(run(cli), Err(CliError::Trajectory(_))));

        let cli = Cli::try_parse_from(["kitra", "equilibrium", path, "-t", "20"]).unwrap();
        assert!(matches!(
            run(cli),
            Err(CliError::Analysis(AnalysisError::InsufficientData { .. }))
        ));
    }

    #[test]
    fn test_selection_table() {
        let tra = Trajectory::from_rows(
            vec!["A".to_string(), "B".to_string()],
            vec![0.0, 1.0],
            vec![vec![1.0, 2.0], vec![3.0, 4.0]],
        )
        .unwrap();
        let table = selection_table(&tra, &tra.select(&Selector::Row(1)).unwrap());
        let text = table.to_string();
        assert!(text.contains("3.000000e+00"));
        assert!(text.contains("B"));
        let table = selection_table(&tra, &tra.select(&Selector::Series("A".to_string())).unwrap());
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn test_series_table_keeps_time_positions() {
        let tra = Trajectory::from_rows(
            vec!["H2O".to_string()],
            vec![0.0, 0.5, 1.0, 1.5, 2.0, 2.5],
            (0..6).map(|i| vec![i as f64 * 10.0]).collect(),
        )
        .unwrap();
        let selector: Selector = "H2O,2:5".parse().unwrap();
        let table = selection_table(&tra, &tra.select(&selector).unwrap());
        assert_eq!(table.len(), 4);
        let first = table.get_row(1).unwrap();
        assert_eq!(first.get_cell(0).unwrap().get_content(), "2");
        assert_eq!(first.get_cell(1).unwrap().get_content(), "1");
        assert_eq!(first.get_cell(2).unwrap().get_content(), "2.000000e+01");
        let last = table.get_row(3).unwrap();
        assert_eq!(last.get_cell(0).unwrap().get_content(), "4");
    }

    #[test]
    fn test_explicit_config_must_exist() {
        let result = load_settings(Some(Path::new("no_such_kitra_settings.json")));
        assert!(matches!(result, Err(SettingsError::NotFound(_))));

        let file = rs_file();
        let path = file.path().to_str().unwrap();
        let cli = Cli::try_parse_from([
            "kitra",
            "--config",
            "no_such_kitra_settings.json",
            "summary",
            path,
        ])
        .unwrap();
        assert!(matches!(run(cli), Err(CliError::Settings(SettingsError::NotFound(_)))));
    }
}
