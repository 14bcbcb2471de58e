//! # Temperature from internal energy
//!
//! The specific internal energy of a cell is
//!
//! ```text
//! e(T) = kB·T·( n(H2_1)/(γ1(T)−1) + n(H2_2)/(γ2(T)−1) + Σ n_mono/(5/3−1) ) / (mH·ρ)
//! ```
//!
//! where `ρ` is the mass-weighted species sum (see
//! [`mass_density_amu`]), `Σ n_mono` runs over H_1, H_2, H_m0, He_1, He_2,
//! He_3 and electrons, and `γ1`, `γ2` are the tabulated adiabatic indices of
//! the two molecular species. Recovering `T` from `ge` means solving
//! `e(T) − ge = 0`, which is done with Newton's method warm-started from the
//! temperature the cell had at the previous evaluation.
//!
//! The slope `de/dT` at the solution is kept as `dT/dge = 1/(de/dT)`; the
//! Jacobian uses it as the chain-rule factor for every temperature-dependent
//! rate.
use crate::Network::network_error::ChemistryError;
use crate::Network::rate_tables::{GammaTable, RateTableStore, lerp};
use crate::Network::species::{GAMMA_MONATOMIC, KB, MH, NCHEM, Species, mass_density_amu};
use serde::{Deserialize, Serialize};

/// How many Newton steps the temperature solve takes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum TemperatureIteration {
    /// Always take exactly `iterations` steps, never report failure.
    Fixed { iterations: usize },
    /// Iterate until the relative change drops to `rtol`; give up with
    /// [`ChemistryError::TemperatureNotConverged`] after `max_iterations`.
    Converged { rtol: f64, max_iterations: usize },
}

impl Default for TemperatureIteration {
    fn default() -> Self {
        TemperatureIteration::Fixed { iterations: 10 }
    }
}

impl TemperatureIteration {
    pub fn converged() -> Self {
        TemperatureIteration::Converged {
            rtol: 1e-3,
            max_iterations: 100,
        }
    }
}

/// Result of the temperature solve for one cell.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CellThermal {
    /// clamped to the table range
    pub temperature: f64,
    pub log_t: f64,
    pub inv_t: f64,
    /// 1/(de/dT)
    pub dt_dge: f64,
}

/// Adiabatic indices of H2_1 and H2_2 with their temperature slopes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MolecularGamma {
    pub gamma_h2i: f64,
    pub dgamma_h2i_dt: f64,
    pub gamma_h2ii: f64,
    pub dgamma_h2ii_dt: f64,
}

pub struct TemperatureSolver<'a> {
    store: &'a RateTableStore,
    policy: TemperatureIteration,
}

impl<'a> TemperatureSolver<'a> {
    pub fn new(store: &'a RateTableStore, policy: TemperatureIteration) -> Self {
        Self { store, policy }
    }

    pub fn policy(&self) -> TemperatureIteration {
        self.policy
    }

    /// Gamma tables interpolated at `t`. The lookup temperature is clamped to
    /// the grid so wild Newton iterates still read sensible values.
    pub fn molecular_gamma(&self, t: f64) -> MolecularGamma {
        let grid = self.store.grid();
        let loc = grid.locate(grid.clamp(t).ln());
        let at = |g: GammaTable| {
            let table = self.store.gamma(g);
            lerp(table[loc.bin], table[loc.bin + 1], loc.frac)
        };
        MolecularGamma {
            gamma_h2i: at(GammaTable::GammaH2I),
            dgamma_h2i_dt: at(GammaTable::DGammaH2IdT),
            gamma_h2ii: at(GammaTable::GammaH2II),
            dgamma_h2ii_dt: at(GammaTable::DGammaH2IIdT),
        }
    }

    /// Specific internal energy `e(T)` and its slope `de/dT` for a cell.
    pub fn energy_and_slope(&self, cell: &[f64; NCHEM], t: f64) -> (f64, f64) {
        let g = self.molecular_gamma(t);
        let h2i = cell[Species::H2I.index()];
        let h2ii = cell[Species::H2II.index()];
        let mono: f64 = [
            Species::HI,
            Species::HII,
            Species::HM,
            Species::HeI,
            Species::HeII,
            Species::HeIII,
            Species::Electron,
        ]
        .iter()
        .map(|s| cell[s.index()])
        .sum();
        let rho = mass_density_amu(cell) * MH;
        let heat_capacity = h2i / (g.gamma_h2i - 1.0)
            + h2ii / (g.gamma_h2ii - 1.0)
            + mono / (GAMMA_MONATOMIC - 1.0);
        let gamma_slope = -h2i * g.dgamma_h2i_dt / (g.gamma_h2i - 1.0).powi(2)
            - h2ii * g.dgamma_h2ii_dt / (g.gamma_h2ii - 1.0).powi(2);
        let energy = t * KB * heat_capacity / rho;
        let slope = KB * heat_capacity / rho + t * KB * gamma_slope / rho;
        (energy, slope)
    }

    /// Solves `e(T) = ge` for one cell starting from `warm_start`.
    /// `cell_index` only labels the error.
    pub fn solve(
        &self,
        cell: &[f64; NCHEM],
        warm_start: f64,
        cell_index: usize,
    ) -> Result<CellThermal, ChemistryError> {
        let ge = cell[Species::Energy.index()];
        let mut t = warm_start;
        match self.policy {
            TemperatureIteration::Fixed { iterations } => {
                for _ in 0..iterations {
                    let (e, slope) = self.energy_and_slope(cell, t);
                    t -= (e - ge) / slope;
                }
            }
            TemperatureIteration::Converged {
                rtol,
                max_iterations,
            } => {
                let mut converged = false;
                for _ in 0..max_iterations {
                    let (e, slope) = self.energy_and_slope(cell, t);
                    let t_new = t - (e - ge) / slope;
                    let change = ((t_new - t) / t_new).abs();
                    t = t_new;
                    if change <= rtol {
                        converged = true;
                        break;
                    }
                }
                if !converged {
                    return Err(ChemistryError::TemperatureNotConverged {
                        cell: cell_index,
                        iterations: max_iterations,
                    });
                }
            }
        }
        let t = self.store.grid().clamp(t);
        let (_, slope) = self.energy_and_slope(cell, t);
        Ok(CellThermal {
            temperature: t,
            log_t: t.ln(),
            inv_t: 1.0 / t,
            dt_dge: 1.0 / slope,
        })
    }
}

/// Internal energy a cell would have at temperature `t`; the inverse of the
/// temperature solve, handy for building initial conditions.
pub fn specific_energy_from_temperature(
    store: &RateTableStore,
    cell: &[f64; NCHEM],
    t: f64,
) -> f64 {
    TemperatureSolver::new(store, TemperatureIteration::default())
        .energy_and_slope(cell, t)
        .0
}
