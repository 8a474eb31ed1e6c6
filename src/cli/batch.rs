//! # Batch Analysis
//!
//! Processes a set of simulation result files in one go. For every file:
//! - the trajectory summary is printed
//! - the equilibrium state of the trajectory tail is computed and printed (a trajectory that
//!   did not converge is reported and the batch continues)
//! - the cluster abundances averaged over the trajectory tail are normalized, the mean
//!   cluster size is computed and both are written to `<file>_analysis.txt`
//!
//! For FAIMS / DMS runs a flag species separates the high and low field phases, which are
//! then reported separately.
use super::cli_main::{CliError, load_input};
use crate::Analysis::clusters::{
    mean_cluster_size, normalize_vector, split_by_flag, weighted_mean_cluster_mobility,
};
use crate::Analysis::equilibrium::{AnalysisError, equilibrium_state, window_statistics};
use crate::Importers::import_format::ImportFormat;
use crate::Trajectories::trajectory::Trajectory;
use crate::Utils::mobility::{MobilityConditions, mobility_from_mass_sds};
use crate::settings::AnalysisSettings;
use log::{error, info, warn};
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

/// Path of the report written for a result file: `<file>_analysis.txt`
pub fn analysis_file_path(result_file: &Path) -> PathBuf {
    let mut name = result_file.as_os_str().to_owned();
    name.push("_analysis.txt");
    PathBuf::from(name)
}

/// Mean abundances of the cluster species over the trailing `samples` time steps
/// (at most the whole trajectory but its first and last sample), in the order of `clusters`
pub fn cluster_abundances(
    trajectory: &Trajectory,
    clusters: &[String],
    samples: usize,
) -> Result<Vec<f64>, AnalysisError> {
    let time_steps = samples.min(trajectory.number_of_timesteps().saturating_sub(1));
    let stats = window_statistics(trajectory, time_steps)?;
    clusters
        .iter()
        .map(|name| -> Result<f64, AnalysisError> {
            let j = trajectory.species_index(name)?;
            Ok(stats[j].mean)
        })
        .collect()
}

fn write_section(
    report: &mut String,
    title: &str,
    trajectory: &Trajectory,
    clusters: &[String],
    mobilities: Option<&[f64]>,
    samples: usize,
) -> Result<(), AnalysisError> {
    let abundances = cluster_abundances(trajectory, clusters, samples)?;
    let normalized: Vec<String> = normalize_vector(&abundances)
        .iter()
        .map(|p| format!("{:.6}", p))
        .collect();
    // writing into a String cannot fail
    let _ = writeln!(report, "{}:", title);
    let _ = writeln!(report, "[{}]", normalized.join(", "));
    let _ = writeln!(report, "mean cluster size: {}", mean_cluster_size(&abundances));
    if let Some(mobilities) = mobilities {
        let k = weighted_mean_cluster_mobility(&abundances, mobilities)?;
        let _ = writeln!(report, "weighted mean mobility: {:.6}", k);
    }
    Ok(())
}

/// Cluster abundance report of a trajectory. With a flag species the high and low field
/// phases are reported separately and the flag species is no cluster. With the ion masses of
/// the clusters (amu) the abundance weighted mean mobility is added.
pub fn analysis_report(
    trajectory: &Trajectory,
    clusters: &[String],
    flag_species: Option<&str>,
    masses: &[f64],
    samples: usize,
) -> Result<String, AnalysisError> {
    let clusters: Vec<String> = if clusters.is_empty() {
        trajectory
            .species_names()
            .iter()
            .filter(|name| Some(name.as_str()) != flag_species)
            .cloned()
            .collect()
    } else {
        clusters.to_vec()
    };
    let conditions = MobilityConditions::default();
    let mobilities: Option<Vec<f64>> = (!masses.is_empty()).then(|| {
        masses
            .iter()
            .map(|m| mobility_from_mass_sds(*m, &conditions))
            .collect()
    });
    let mobilities = mobilities.as_deref();

    let mut report = String::new();
    let _ = writeln!(report, "clusters: {}", clusters.join(", "));
    match flag_species {
        Some(flag) => {
            let (high, low) = split_by_flag(trajectory, flag)?;
            write_section(&mut report, "high", &high, &clusters, mobilities, samples)?;
            write_section(&mut report, "low", &low, &clusters, mobilities, samples)?;
        }
        None => write_section(&mut report, "all", trajectory, &clusters, mobilities, samples)?,
    }
    Ok(report)
}

/// Selection of the cluster species and their properties for the batch reports
#[derive(Debug, Clone, Default)]
pub struct ClusterOptions {
    /// species column with the field phase flag
    pub flag_species: Option<String>,
    /// cluster species in cluster size order, all species if empty
    pub clusters: Vec<String>,
    /// ion masses of the clusters (amu), no mobility estimate if empty
    pub masses: Vec<f64>,
}

fn process_file(
    file: &Path,
    format: Option<ImportFormat>,
    options: &ClusterOptions,
    settings: &AnalysisSettings,
) -> Result<PathBuf, CliError> {
    let trajectory = load_input(file, format, &[], settings)?;
    trajectory.pretty_print();

    match equilibrium_state(&trajectory, settings.time_steps, settings.reltol) {
        Ok(result) => result.pretty_print(),
        Err(e) => warn!("{}: no equilibrium state: {}", file.display(), e),
    }

    let report = analysis_report(
        &trajectory,
        &options.clusters,
        options.flag_species.as_deref(),
        &options.masses,
        settings.time_steps,
    )?;
    let report_path = analysis_file_path(file);
    fs::write(&report_path, report)?;
    info!("analysis of '{}' written to '{}'", file.display(), report_path.display());
    Ok(report_path)
}

/// Runs the batch analysis over all files. A failing file is logged and skipped; the batch
/// fails at the end if any file failed.
pub fn run_batch(
    files: &[PathBuf],
    format: Option<ImportFormat>,
    options: &ClusterOptions,
    settings: &AnalysisSettings,
) -> Result<Vec<PathBuf>, CliError> {
    let mut written = Vec::new();
    let mut failed = 0;
    for file in files {
        match process_file(file, format, options, settings) {
            Ok(report_path) => written.push(report_path),
            Err(e) => {
                error!("{}: {}", file.display(), e);
                failed += 1;
            }
        }
    }
    if failed > 0 {
        return Err(CliError::Batch {
            failed,
            total: files.len(),
        });
    }
    Ok(written)
}
