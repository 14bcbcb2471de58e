//! Species of the primordial network, their ordering inside a cell and the
//! per-species constants (mass weights, ionisation states).
//!
//! A strip is stored cell-major: cell `i` occupies `y[i*NCHEM..(i+1)*NCHEM]`,
//! and inside a cell the order is fixed by [`Species::ALL`].
use crate::Network::network_error::ChemistryError;

/// Number of state variables per cell (9 species + specific internal energy).
pub const NCHEM: usize = 10;
/// Number of chemical species (everything except `ge`).
pub const NSPECIES: usize = 9;
/// Upper bound on the number of cells processed in one strip.
pub const MAX_NCELLS: usize = 1024;

/// Boltzmann constant [erg/K]
pub const KB: f64 = 1.3806504e-16;
/// Hydrogen mass [g]
pub const MH: f64 = 1.67e-24;
/// Adiabatic index of the monatomic species and electrons.
pub const GAMMA_MONATOMIC: f64 = 5.0 / 3.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Species {
    H2I,
    H2II,
    HI,
    HII,
    HM,
    HeI,
    HeII,
    HeIII,
    Electron,
    /// specific internal energy, erg/g
    Energy,
}

impl Species {
    pub const ALL: [Species; NCHEM] = [
        Species::H2I,
        Species::H2II,
        Species::HI,
        Species::HII,
        Species::HM,
        Species::HeI,
        Species::HeII,
        Species::HeIII,
        Species::Electron,
        Species::Energy,
    ];

    pub const fn index(self) -> usize {
        self as usize
    }

    /// field name reported to the caller for labelling
    pub fn name(self) -> &'static str {
        match self {
            Species::H2I => "H2_1",
            Species::H2II => "H2_2",
            Species::HI => "H_1",
            Species::HII => "H_2",
            Species::HM => "H_m0",
            Species::HeI => "He_1",
            Species::HeII => "He_2",
            Species::HeIII => "He_3",
            Species::Electron => "de",
            Species::Energy => "ge",
        }
    }

    /// Mass weight in units of the hydrogen mass used for the mass density.
    /// Electrons and the energy slot carry no mass.
    pub const fn mass_weight(self) -> f64 {
        match self {
            Species::H2I | Species::H2II => 2.0,
            Species::HI | Species::HII | Species::HM => 1.00794,
            Species::HeI | Species::HeII | Species::HeIII => 4.002602,
            Species::Electron | Species::Energy => 0.0,
        }
    }

    /// Ionisation state used by the charge-neutrality recomputation.
    pub const fn charge(self) -> f64 {
        match self {
            Species::H2II | Species::HII | Species::HeII => 1.0,
            Species::HeIII => 2.0,
            Species::HM => -1.0,
            Species::H2I | Species::HI | Species::HeI | Species::Electron | Species::Energy => 0.0,
        }
    }

    /// the two molecular species whose adiabatic index depends on temperature
    pub const fn is_molecular(self) -> bool {
        matches!(self, Species::H2I | Species::H2II)
    }
}

/// Ordered species manifest, used by callers for labelling only.
pub fn species_names() -> Vec<String> {
    Species::ALL.iter().map(|s| s.name().to_string()).collect()
}

/// Copies one cell out of a strip-ordered vector.
pub fn cell_values(y: &[f64], cell: usize) -> [f64; NCHEM] {
    let mut out = [0.0; NCHEM];
    out.copy_from_slice(&y[cell * NCHEM..(cell + 1) * NCHEM]);
    out
}

/// Mass-weighted sum of the species amounts in units of `MH`.
pub fn mass_density_amu(cell: &[f64; NCHEM]) -> f64 {
    Species::ALL
        .iter()
        .map(|s| cell[s.index()] * s.mass_weight())
        .sum()
}

/// Electron density implied by charge neutrality for one cell.
pub fn charge_neutral_electrons(cell: &[f64; NCHEM]) -> f64 {
    Species::ALL
        .iter()
        .filter(|s| **s != Species::Electron)
        .map(|s| cell[s.index()] * s.charge())
        .sum()
}

/// Overwrites the electron slot of every cell with the charge-neutral value.
/// The incoming electron amount is ignored.
pub fn ensure_electron_consistency(y: &mut [f64], nstrip: usize) -> Result<(), ChemistryError> {
    check_strip_len("state vector", y.len(), nstrip)?;
    for i in 0..nstrip {
        let cell = cell_values(y, i);
        y[i * NCHEM + Species::Electron.index()] = charge_neutral_electrons(&cell);
    }
    Ok(())
}

pub(crate) fn check_strip_len(
    what: &'static str,
    found: usize,
    nstrip: usize,
) -> Result<(), ChemistryError> {
    if found != nstrip * NCHEM {
        return Err(ChemistryError::ShapeMismatch {
            what,
            expected: nstrip * NCHEM,
            found,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_manifest_order() {
        let names = species_names();
        assert_eq!(
            names,
            vec!["H2_1", "H2_2", "H_1", "H_2", "H_m0", "He_1", "He_2", "He_3", "de", "ge"]
        );
        for (i, s) in Species::ALL.iter().enumerate() {
            assert_eq!(s.index(), i);
        }
    }

    #[test]
    fn test_mass_density_is_linear() {
        let cell = [1e-8, 1e-10, 0.76, 1e-4, 1e-12, 0.24, 1e-6, 1e-10, 1e-4, 1e12];
        let rho = mass_density_amu(&cell);
        let k = 37.5;
        let mut scaled = cell;
        for v in scaled.iter_mut() {
            *v *= k;
        }
        assert_relative_eq!(mass_density_amu(&scaled), k * rho, max_relative = 1e-15);
        // electrons and energy carry no mass
        let mut heavy_e = cell;
        heavy_e[Species::Electron.index()] = 1e30;
        heavy_e[Species::Energy.index()] = 1e30;
        assert_eq!(mass_density_amu(&heavy_e), rho);
    }

    #[test]
    fn test_electron_consistency() {
        let mut y = vec![
            0.1, 0.2, 0.3, 0.4, 0.05, 0.6, 0.7, 0.8, 123.0, 1e10, //
            1.0, 0.0, 2.0, 0.5, 0.25, 3.0, 0.125, 0.0, -7.0, 1e11,
        ];
        ensure_electron_consistency(&mut y, 2).unwrap();
        // 2*He_3 + He_2 + H_2 + H2_2 - H_m0
        assert_relative_eq!(y[8], 2.0 * 0.8 + 0.7 + 0.4 + 0.2 - 0.05, epsilon = 1e-15);
        // no leakage of the first cell's charge into the second one
        assert_relative_eq!(y[18], 0.125 + 0.5 - 0.25, epsilon = 1e-15);
        assert_eq!(y[9], 1e10);
    }

    #[test]
    fn test_strip_length_checked() {
        let mut y = vec![0.0; 15];
        let err = ensure_electron_consistency(&mut y, 2).unwrap_err();
        assert!(matches!(err, ChemistryError::ShapeMismatch { expected: 20, found: 15, .. }));
    }
}
