#[cfg(test)]
mod tests {
    use crate::Network::analytic_tables::AnalyticTables;
    use crate::Network::network_error::ChemistryError;
    use crate::Network::rate_tables::{RateTableStore, TemperatureGrid};
    use crate::Network::species::{GAMMA_MONATOMIC, KB, MH, NCHEM, mass_density_amu};
    use crate::Network::temperature_solver::*;
    use approx::assert_relative_eq;

    fn primordial_cell() -> [f64; NCHEM] {
        [1e-6, 1e-14, 0.76, 1e-4, 1e-12, 0.24, 1e-8, 1e-14, 1e-4, 0.0]
    }

    fn constant_gamma_store() -> RateTableStore {
        let grid = TemperatureGrid::new(1.0, 1e5, 1023).unwrap();
        AnalyticTables::primordial(grid).build().unwrap()
    }

    /// gamma rising from 1.3 towards 1.4 with temperature
    fn varying_gamma_store() -> RateTableStore {
        let grid = TemperatureGrid::new(1.0, 1e5, 1023).unwrap();
        let gamma = |t: f64| 1.3 + 0.1 * t / (t + 1000.0);
        let dgamma = |t: f64| 100.0 / ((t + 1000.0) * (t + 1000.0));
        AnalyticTables::primordial(grid)
            .with_fit("gammaH2_1", gamma)
            .with_fit("dgammaH2_1_dT", dgamma)
            .with_fit("gammaH2_2", gamma)
            .with_fit("dgammaH2_2_dT", dgamma)
            .build()
            .unwrap()
    }

    fn with_energy(mut cell: [f64; NCHEM], ge: f64) -> [f64; NCHEM] {
        cell[9] = ge;
        cell
    }

    #[test]
    fn test_energy_formula_for_constant_gamma() {
        let store = constant_gamma_store();
        let cell = primordial_cell();
        let t = 1234.5;
        let rho = mass_density_amu(&cell) * MH;
        let mono: f64 = cell[2..9].iter().sum();
        let expected = t * KB * ((cell[0] + cell[1]) / 0.4 + mono / (GAMMA_MONATOMIC - 1.0)) / rho;
        let e = specific_energy_from_temperature(&store, &cell, t);
        assert_relative_eq!(e, expected, max_relative = 1e-12);
    }

    #[test]
    fn test_fixed_policy_recovers_temperature() {
        let store = constant_gamma_store();
        let solver = TemperatureSolver::new(&store, TemperatureIteration::default());
        for target in [5.0, 300.0, 1000.0, 4321.0, 8.0e4] {
            let ge = specific_energy_from_temperature(&store, &primordial_cell(), target);
            let cell = with_energy(primordial_cell(), ge);
            let thermal = solver.solve(&cell, 1000.0, 0).unwrap();
            assert_relative_eq!(thermal.temperature, target, max_relative = 1e-10);
            assert_relative_eq!(thermal.log_t, target.ln(), max_relative = 1e-10);
            assert_relative_eq!(thermal.inv_t * target, 1.0, max_relative = 1e-10);
        }
    }

    #[test]
    fn test_varying_gamma_converges() {
        let store = varying_gamma_store();
        let target = 3000.0;
        let ge = specific_energy_from_temperature(&store, &primordial_cell(), target);
        let cell = with_energy(primordial_cell(), ge);
        let fixed = TemperatureSolver::new(&store, TemperatureIteration::default())
            .solve(&cell, 1000.0, 0)
            .unwrap();
        assert_relative_eq!(fixed.temperature, target, max_relative = 1e-8);
        let policy = TemperatureIteration::Converged {
            rtol: 1e-12,
            max_iterations: 100,
        };
        let converged = TemperatureSolver::new(&store, policy).solve(&cell, 50.0, 0).unwrap();
        assert_relative_eq!(converged.temperature, target, max_relative = 1e-9);
    }

    #[test]
    fn test_fixed_policy_takes_the_configured_steps() {
        let store = varying_gamma_store();
        // mostly molecular gas, so e(T) is visibly nonlinear in T
        let molecular = [0.5, 1e-10, 1e-3, 1e-6, 1e-12, 0.08, 1e-8, 1e-14, 1e-6, 0.0];
        let target = 3000.0;
        let ge = specific_energy_from_temperature(&store, &molecular, target);
        let cell = with_energy(molecular, ge);
        let one = TemperatureSolver::new(&store, TemperatureIteration::Fixed { iterations: 1 })
            .solve(&cell, 1000.0, 0)
            .unwrap();
        let ten = TemperatureSolver::new(&store, TemperatureIteration::Fixed { iterations: 10 })
            .solve(&cell, 1000.0, 0)
            .unwrap();
        assert!(
            (one.temperature - target).abs() > 1e-3 * target,
            "one step already at {}",
            one.temperature
        );
        assert_relative_eq!(ten.temperature, target, max_relative = 1e-8);
        assert!((one.temperature - ten.temperature).abs() > 1.0);
    }

    #[test]
    fn test_dt_dge_matches_finite_difference() {
        let store = varying_gamma_store();
        let solver = TemperatureSolver::new(&store, TemperatureIteration::converged());
        let strict = TemperatureSolver::new(
            &store,
            TemperatureIteration::Converged {
                rtol: 1e-14,
                max_iterations: 200,
            },
        );
        let ge = specific_energy_from_temperature(&store, &primordial_cell(), 2000.0);
        let thermal = solver.solve(&with_energy(primordial_cell(), ge), 2000.0, 0).unwrap();
        let h = ge * 1e-7;
        let up = strict.solve(&with_energy(primordial_cell(), ge + h), 2000.0, 0).unwrap();
        let down = strict.solve(&with_energy(primordial_cell(), ge - h), 2000.0, 0).unwrap();
        let fd = (up.temperature - down.temperature) / (2.0 * h);
        // dgamma is tabulated, not the exact slope of the gamma interpolant
        assert_relative_eq!(thermal.dt_dge, fd, max_relative = 1e-3);
    }

    #[test]
    fn test_clamps_to_table_bounds() {
        let store = constant_gamma_store();
        let solver = TemperatureSolver::new(&store, TemperatureIteration::default());
        let cold = solver.solve(&with_energy(primordial_cell(), 1e-3), 1000.0, 0).unwrap();
        assert_eq!(cold.temperature, 1.0);
        assert_eq!(cold.log_t, 0.0);
        let hot = solver.solve(&with_energy(primordial_cell(), 1e20), 1000.0, 0).unwrap();
        assert_eq!(hot.temperature, 1e5);
        assert_eq!(hot.inv_t, 1e-5);
    }

    #[test]
    fn test_converged_policy_reports_failure() {
        let store = constant_gamma_store();
        let policy = TemperatureIteration::Converged {
            rtol: 1e-3,
            max_iterations: 1,
        };
        let ge = specific_energy_from_temperature(&store, &primordial_cell(), 5000.0);
        let err = TemperatureSolver::new(&store, policy)
            .solve(&with_energy(primordial_cell(), ge), 1000.0, 7)
            .unwrap_err();
        assert!(matches!(
            err,
            ChemistryError::TemperatureNotConverged {
                cell: 7,
                iterations: 1
            }
        ));
        assert_eq!(err.status_code(), -1);
    }

    #[test]
    fn test_policy_serde_round_trip() {
        let json = serde_json::to_string(&TemperatureIteration::converged()).unwrap();
        let back: TemperatureIteration = serde_json::from_str(&json).unwrap();
        assert_eq!(back, TemperatureIteration::converged());
    }
}
