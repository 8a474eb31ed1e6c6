use super::equilibrium::AnalysisError;
use crate::Trajectories::trajectory::{Trajectory, TrajectoryError};
use log::info;

/// Normalizes a vector of abundances to unit sum
pub fn normalize_vector(abundances: &[f64]) -> Vec<f64> {
    let total: f64 = abundances.iter().sum();
    abundances.iter().map(|x| x / total).collect()
}

/// Mean cluster size from an ordered vector of cluster abundances
/// (the i-th entry is the abundance of the cluster with i+1 ligands)
pub fn mean_cluster_size(abundances: &[f64]) -> f64 {
    normalize_vector(abundances)
        .iter()
        .enumerate()
        .map(|(i, p)| (i + 1) as f64 * p)
        .sum()
}

/// Abundance weighted mean ion mobility of an ordered set of clusters
pub fn weighted_mean_cluster_mobility(
    abundances: &[f64],
    mobilities: &[f64],
) -> Result<f64, AnalysisError> {
    if abundances.len() != mobilities.len() {
        return Err(AnalysisError::LengthMismatch(format!(
            "{} cluster abundances but {} mobilities",
            abundances.len(),
            mobilities.len()
        )));
    }
    Ok(normalize_vector(abundances)
        .iter()
        .zip(mobilities)
        .map(|(p, k)| p * k)
        .sum())
}

/// Separates the field phases of a FAIMS / DMS simulation. `flag_species` names the column that
/// records the field state: samples with flag 1 belong to the high field phase, samples with
/// flag 0 to the low field phase. Returns `(high, low)`.
pub fn split_by_flag(
    trajectory: &Trajectory,
    flag_species: &str,
) -> Result<(Trajectory, Trajectory), TrajectoryError> {
    let flags = trajectory.series_for(flag_species)?;
    let high = select_rows(trajectory, |i| flags[i] == 1.0)?;
    let low = select_rows(trajectory, |i| flags[i] == 0.0)?;
    info!(
        "field phase separation by '{}': {} high field samples, {} low field samples",
        flag_species,
        high.number_of_timesteps(),
        low.number_of_timesteps()
    );
    Ok((high, low))
}

fn select_rows<F: Fn(usize) -> bool>(
    trajectory: &Trajectory,
    keep: F,
) -> Result<Trajectory, TrajectoryError> {
    let positions: Vec<usize> = (0..trajectory.number_of_timesteps())
        .filter(|&i| keep(i))
        .collect();
    let times = positions.iter().map(|&i| trajectory.times()[i]).collect();
    let data = trajectory.data().select_rows(positions.iter());
    Ok(Trajectory::new(trajectory.species_names().to_vec(), times, data)?
        .with_attributes(trajectory.attributes().clone())
        .with_time_scaling_factor(trajectory.time_scaling_factor())
        .with_concentration_unit(trajectory.concentration_unit()))
}
