//! Right-hand side of one cell in physical units.
//!
//! Species rows are number densities per second, generated from
//! [`REACTIONS`]; the energy row is the net heating rate divided by the mass
//! density, erg/g/s. Scaling to the integrator's variables is applied by the
//! strip driver in `network_api`.
use crate::Network::derived_quantities::PerCellDerived;
use crate::Network::energy_equation::heating_rate;
use crate::Network::rate_interpolator::CellRates;
use crate::Network::reaction_terms::REACTIONS;
use crate::Network::species::{NCHEM, Species};
use crate::Network::temperature_solver::CellThermal;

/// Everything besides the species amounts that one cell's RHS or Jacobian
/// depends on.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CellEnvironment {
    pub thermal: CellThermal,
    pub rates: CellRates,
    pub derived: PerCellDerived,
    pub redshift: f64,
}

pub fn cell_rhs(cell: &[f64; NCHEM], env: &CellEnvironment) -> [f64; NCHEM] {
    let mut out = [0.0; NCHEM];
    for term in REACTIONS.iter() {
        let flux = env.rates.k(term.rate) * term.mass_action(cell);
        for (s, nu) in term.changes() {
            out[s.index()] += nu * flux;
        }
    }
    out[Species::Energy.index()] = heating_rate(cell, env) * env.derived.inv_mdensity;
    out
}
