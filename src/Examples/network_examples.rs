use crate::Network::jacobian_assembler::SparseJacobian;
use crate::Network::network_api::{PrimordialNetwork, ScaleVector};
use crate::Network::network_error::ChemistryError;
use crate::Network::species::NCHEM;
use crate::Utils::network_report::{jacobian_table, rhs_table, temperature_table};
use crate::settings::NetworkConfig;
use log::error;

/// low-ionisation primordial composition, number densities in cm^-3
const PRIMORDIAL_CELL: [f64; NCHEM] = [1e-6, 1e-14, 0.76, 1e-4, 1e-12, 0.24, 1e-8, 1e-14, 0.0, 0.0];

/// Strip of identical compositions at the given temperatures, electrons and
/// internal energy filled in.
pub fn primordial_strip(
    network: &PrimordialNetwork,
    temperatures: &[f64],
) -> Result<Vec<f64>, ChemistryError> {
    let mut y: Vec<f64> = PRIMORDIAL_CELL
        .iter()
        .cycle()
        .take(NCHEM * temperatures.len())
        .copied()
        .collect();
    network.prepare_initial_state(&mut y, temperatures.len(), temperatures)?;
    Ok(y)
}

pub fn network_examples(task: usize) {
    if let Err(e) = run_example(task) {
        error!("example {} failed: {}", task, e);
    }
}

fn run_example(task: usize) -> Result<(), ChemistryError> {
    let network = PrimordialNetwork::from_config(NetworkConfig::default())?;
    match task {
        0 => {
            // one cell at 1000 K, unit scales
            let y = primordial_strip(&network, &[1000.0])?;
            let mut ctx = network.new_context(1, ScaleVector::unit(1))?;
            network.set_extra_variables(&mut ctx, &y)?;
            let mut ydot = vec![0.0; NCHEM];
            let status = network.rhs_flag(&y, &mut ydot, &mut ctx);
            println!("status {}, T = {:.2} K", status, ctx.temperatures()[0]);
            rhs_table(&y, &ydot, 0).printstd();
        }
        1 => {
            // cooling curve: one strip, one temperature per cell
            let temperatures = [30.0, 100.0, 300.0, 1e3, 3e3, 1e4, 2e4, 5e4, 9e4];
            let y = primordial_strip(&network, &temperatures)?;
            let n = temperatures.len();
            let mut ctx = network.new_context(n, ScaleVector::unit(n))?;
            network.set_extra_variables(&mut ctx, &y)?;
            let mut ydot = vec![0.0; y.len()];
            network.rhs(&y, &mut ydot, &mut ctx)?;
            temperature_table(ctx.temperatures(), &ydot).printstd();
        }
        2 => {
            // scaled Jacobian as the integrator sees it
            let y = primordial_strip(&network, &[8000.0])?;
            let scale = ScaleVector::from_state(&y);
            let y_scaled = scale.to_scaled(&y);
            let mut ctx = network.new_context(1, scale)?;
            network.set_extra_variables(&mut ctx, &y)?;
            let mut jac = SparseJacobian::new(1);
            network.jacobian(&y_scaled, &mut jac, &mut ctx)?;
            println!("{} nonzeros", jac.nnz());
            jacobian_table(&jac, 0).printstd();
        }
        3 => {
            // tables written to a file and read back
            use crate::Utils::load_from_file::save_tables_to_file;
            let path = std::env::temp_dir().join("primochem_tables.json");
            let path = path.to_string_lossy().to_string();
            save_tables_to_file(network.store(), &path)?;
            let config = NetworkConfig {
                table_file: Some(path),
                ..NetworkConfig::default()
            };
            let from_file = PrimordialNetwork::from_config(config)?;
            let y = primordial_strip(&from_file, &[1000.0, 10000.0])?;
            let mut ctx = from_file.new_context(2, ScaleVector::unit(2))?;
            from_file.set_extra_variables(&mut ctx, &y)?;
            let mut ydot = vec![0.0; y.len()];
            from_file.rhs(&y, &mut ydot, &mut ctx)?;
            temperature_table(ctx.temperatures(), &ydot).printstd();
        }
        _ => println!("no example with number {}", task),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_examples_run() {
        for task in 0..4 {
            assert!(run_example(task).is_ok(), "example {}", task);
        }
        network_examples(99);
    }
}
