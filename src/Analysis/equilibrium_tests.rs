#[cfg(test)]
mod tests {
    use crate::Analysis::equilibrium::*;
    use crate::Trajectories::trajectory::Trajectory;
    use approx::assert_relative_eq;

    fn names(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    fn constant_trajectory() -> Trajectory {
        Trajectory::from_rows(
            names(&["A", "B"]),
            vec![0.0, 1.0, 2.0, 3.0, 4.0],
            vec![vec![1.0, 10.0]; 5],
        )
        .unwrap()
    }

    fn trajectory_with_a(a: &[f64]) -> Trajectory {
        let rows = a.iter().map(|&x| vec![x, 10.0]).collect();
        Trajectory::from_rows(names(&["A", "B"]), vec![0.0, 1.0, 2.0, 3.0, 4.0], rows).unwrap()
    }

    /// exponential relaxation towards a steady state, plus a noisy species
    fn relaxing_trajectory(n: usize) -> Trajectory {
        let times: Vec<f64> = (0..n).map(|i| i as f64 * 1e-3).collect();
        let rows = times
            .iter()
            .enumerate()
            .map(|(i, t)| {
                let relaxed = 2.5e14 * (1.0 - (-t * 1e3 / 5.0).exp()) + 1e10;
                let noisy = 2.54e17 * (1.0 + 1e-4 * if i % 2 == 0 { 1.0 } else { -1.0 });
                vec![relaxed, noisy]
            })
            .collect();
        Trajectory::from_rows(names(&["H2O", "N2"]), times, rows).unwrap()
    }

    #[test]
    fn test_constant_trajectory_is_converged() {
        let tra = constant_trajectory();
        let result = equilibrium_state(&tra, 3, 0.01).unwrap();
        assert_eq!(result.len(), 2);
        assert_eq!(result.get("A"), Some(1.0));
        assert_eq!(result.get("B"), Some(10.0));
        assert_eq!(result.species_names(), vec!["A", "B"]);
    }

    #[test]
    fn test_perturbation_inside_window_is_not_converged() {
        // window [1, 4) holds A = [1, 1, 5]
        let tra = trajectory_with_a(&[1.0, 1.0, 1.0, 5.0, 1.0]);
        let err = equilibrium_state(&tra, 4, 0.01).unwrap_err();
        match err {
            AnalysisError::NotConverged {
                species,
                spread,
                reltol,
            } => {
                assert_eq!(species, "A");
                assert_relative_eq!(spread, 4.0 / (7.0 / 3.0), epsilon = 1e-12);
                assert_relative_eq!(spread, 1.7142857, epsilon = 1e-6);
                assert_eq!(reltol, 0.01);
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_last_sample_is_excluded_from_window() {
        // the perturbation sits at the last index, outside of the window [1, 4)
        let tra = trajectory_with_a(&[1.0, 1.0, 1.0, 1.0, 5.0]);
        let result = equilibrium_state(&tra, 4, 0.01).unwrap();
        assert_eq!(result.get("A"), Some(1.0));
    }

    #[test]
    fn test_burn_in_is_excluded_from_window() {
        let tra = trajectory_with_a(&[100.0, 1.0, 1.0, 1.0, 1.0]);
        assert!(equilibrium_state(&tra, 4, 0.01).is_ok());
        assert!(matches!(
            equilibrium_state(&tra, 5, 0.01),
            Err(AnalysisError::InsufficientData { .. })
        ));
    }

    #[test]
    fn test_insufficient_data() {
        let tra = constant_trajectory();
        for time_steps in [5, 6, 100] {
            let err = equilibrium_state(&tra, time_steps, 0.01).unwrap_err();
            assert_eq!(
                err,
                AnalysisError::InsufficientData {
                    time_steps,
                    n_timesteps: 5
                }
            );
        }
    }

    #[test]
    fn test_empty_window() {
        let tra = constant_trajectory();
        assert_eq!(
            equilibrium_state(&tra, 1, 0.01).unwrap_err(),
            AnalysisError::EmptyWindow { time_steps: 1 }
        );
        assert_eq!(
            equilibrium_state(&tra, 0, 0.01).unwrap_err(),
            AnalysisError::EmptyWindow { time_steps: 0 }
        );
        // two time steps leave exactly one sample
        assert!(equilibrium_state(&tra, 2, 0.01).is_ok());
    }

    #[test]
    fn test_first_offending_species_is_reported() {
        let rows = vec![
            vec![1.0, 1.0],
            vec![1.0, 1.0],
            vec![2.0, 3.0],
            vec![1.0, 1.0],
            vec![1.0, 1.0],
        ];
        let tra = Trajectory::from_rows(names(&["X", "Y"]), vec![0.0, 1.0, 2.0, 3.0, 4.0], rows)
            .unwrap();
        let err = equilibrium_state(&tra, 4, 0.01).unwrap_err();
        assert!(matches!(err, AnalysisError::NotConverged { ref species, .. } if species == "X"));
        assert!(err.to_string().contains("X"));
    }

    #[test]
    fn test_zero_mean_without_spread_is_converged() {
        let tra = trajectory_with_a(&[0.0; 5]);
        let result = equilibrium_state(&tra, 3, 0.01).unwrap();
        assert_eq!(result.get("A"), Some(0.0));
    }

    #[test]
    fn test_zero_mean_with_spread_is_undefined() {
        let tra = trajectory_with_a(&[0.0, -1.0, 1.0, 0.0, 0.0]);
        let err = equilibrium_state(&tra, 4, 0.01).unwrap_err();
        assert!(matches!(err, AnalysisError::UndefinedSpread { ref species, .. } if species == "A"));
    }

    #[test]
    fn test_negative_mean_uses_absolute_relative_spread() {
        // window [1, 4) holds A = [-1, -1.5, -1], mean -7/6
        let tra = trajectory_with_a(&[-1.0, -1.0, -1.5, -1.0, -1.0]);
        match equilibrium_state(&tra, 4, 0.01).unwrap_err() {
            AnalysisError::NotConverged { species, spread, .. } => {
                assert_eq!(species, "A");
                assert_relative_eq!(spread, 0.5 / (3.5 / 3.0), epsilon = 1e-12);
                assert_relative_eq!(spread, 0.4285714, epsilon = 1e-6);
            }
            other => panic!("unexpected error {:?}", other),
        }
        // a tight negative window converges like its positive mirror
        let tra = trajectory_with_a(&[-1.0, -1.0, -1.001, -1.0, -1.0]);
        let result = equilibrium_state(&tra, 4, 0.01).unwrap();
        assert_relative_eq!(result.get("A").unwrap(), -3.001 / 3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_nan_concentration_is_undefined() {
        let tra = trajectory_with_a(&[1.0, 1.0, f64::NAN, 1.0, 1.0]);
        let err = equilibrium_state(&tra, 4, 0.01).unwrap_err();
        assert!(matches!(err, AnalysisError::UndefinedSpread { .. }));
    }

    #[test]
    fn test_equilibrium_state_is_idempotent() {
        let tra = relaxing_trajectory(2000);
        let first = equilibrium_state(&tra, 100, 0.01).unwrap();
        let second = equilibrium_state(&tra, 100, 0.01).unwrap();
        assert_eq!(first, second);
        assert_relative_eq!(first.get("N2").unwrap(), 2.54e17, max_relative = 1e-4);
        assert_relative_eq!(first.get("H2O").unwrap(), 2.5e14 + 1e10, max_relative = 1e-4);
    }

    #[test]
    fn test_relaxing_trajectory_not_converged_early() {
        let tra = relaxing_trajectory(2000);
        // a window covering the relaxation is rejected
        let err = equilibrium_state(&tra, 1999, 0.01).unwrap_err();
        assert!(matches!(err, AnalysisError::NotConverged { ref species, .. } if species == "H2O"));
    }

    #[test]
    fn test_window_statistics() {
        let tra = trajectory_with_a(&[1.0, 1.0, 1.0, 5.0, 1.0]);
        let stats = window_statistics(&tra, 4).unwrap();
        assert_eq!(stats.len(), 2);
        assert_eq!(stats[0].species, "A");
        assert_relative_eq!(stats[0].mean, 7.0 / 3.0, epsilon = 1e-12);
        assert_eq!(stats[0].max, 5.0);
        assert_eq!(stats[0].min, 1.0);
        assert_eq!(stats[1].relative_spread, Some(0.0));
        let table = window_statistics_table(&stats);
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn test_format_scientific() {
        assert_eq!(format_scientific(2.426859e19), "2.426859e+19");
        assert_eq!(format_scientific(1.0), "1.000000e+00");
        assert_eq!(format_scientific(10.0), "1.000000e+01");
        assert_eq!(format_scientific(0.0), "0.000000e+00");
        assert_eq!(format_scientific(1.5e-5), "1.500000e-05");
        assert_eq!(format_scientific(-2.5e300), "-2.500000e+300");
        assert_eq!(format_scientific(123456789.0), "1.234568e+08");
    }

    #[test]
    fn test_concentration_string() {
        let tra = constant_trajectory();
        let s = equilibrium_state_concentration_string(&tra, 3, 0.01).unwrap();
        assert_eq!(s, "A:1.000000e+00,B:1.000000e+01");
        assert!(!s.contains(' '));
        assert!(!s.ends_with(','));
    }

    #[test]
    fn test_concentration_string_preserves_species_order() {
        let species = names(&["N2", "H3O+", "H2O", "Cl_2"]);
        let rows = vec![vec![2.54e17, 1e10, 2.5e14, 71.0]; 10];
        let times = (0..10).map(|i| i as f64).collect();
        let tra = Trajectory::from_rows(species.clone(), times, rows).unwrap();
        let s = equilibrium_state_concentration_string(&tra, 5, 0.01).unwrap();
        let parsed: Vec<String> = s
            .split(',')
            .map(|pair| pair.split_once(':').unwrap().0.to_string())
            .collect();
        assert_eq!(parsed, species);
        assert_eq!(s, "N2:2.540000e+17,H3O+:1.000000e+10,H2O:2.500000e+14,Cl_2:7.100000e+01");
    }

    #[test]
    fn test_concentration_string_fails_like_equilibrium_state() {
        let tra = constant_trajectory();
        assert!(matches!(
            equilibrium_state_concentration_string(&tra, 5, 0.01),
            Err(AnalysisError::InsufficientData { .. })
        ));
    }

    #[test]
    fn test_result_table() {
        let tra = constant_trajectory();
        let result = equilibrium_state(&tra, 3, 0.01).unwrap();
        let table = result.to_table();
        assert_eq!(table.len(), 3);
        assert_eq!(result.to_string(), result.to_concentration_string());
    }
}
