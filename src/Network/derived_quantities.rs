//! Mass density and the two escape-probability factors that damp cooling at
//! high density. Computed once per change of the species amounts and cached
//! on the strip context.
use crate::Network::species::{MH, NCHEM, mass_density_amu};

/// density scale of the continuum (CIE) optical depth, g/cm^3
const CIE_DENSITY_SCALE: f64 = 3.3e-8;
const CIE_TAU_EXPONENT: f64 = 2.8;
const CIE_TAU_FLOOR: f64 = 1e-5;
/// density scale of the H2 line optical depth, g/cm^3
const H2_LINE_DENSITY_SCALE: f64 = 1.34e-14;
const H2_LINE_EXPONENT: f64 = -0.45;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PerCellDerived {
    /// g/cm^3
    pub mdensity: f64,
    pub inv_mdensity: f64,
    pub cie_optical_depth: f64,
    pub h2_optical_depth: f64,
}

impl PerCellDerived {
    pub fn from_cell(cell: &[f64; NCHEM]) -> Self {
        let mdensity = MH * mass_density_amu(cell);
        Self::from_mass_density(mdensity)
    }

    pub fn from_mass_density(mdensity: f64) -> Self {
        Self {
            mdensity,
            inv_mdensity: 1.0 / mdensity,
            cie_optical_depth: cie_escape_probability(mdensity),
            h2_optical_depth: h2_line_escape_probability(mdensity),
        }
    }
}

/// `min(1, (1 − e^−τ)/τ)` with `τ = max((ρ/3.3e-8)^2.8, 1e-5)`
pub fn cie_escape_probability(mdensity: f64) -> f64 {
    let tau = (mdensity / CIE_DENSITY_SCALE)
        .powf(CIE_TAU_EXPONENT)
        .max(CIE_TAU_FLOOR);
    ((1.0 - (-tau).exp()) / tau).min(1.0)
}

/// `min(1, (ρ/1.34e-14)^−0.45)`
pub fn h2_line_escape_probability(mdensity: f64) -> f64 {
    (mdensity / H2_LINE_DENSITY_SCALE)
        .powf(H2_LINE_EXPONENT)
        .min(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_escape_probabilities_bounded() {
        let mut rho = 1e-30;
        while rho < 1e3 {
            let cie = cie_escape_probability(rho);
            let h2 = h2_line_escape_probability(rho);
            assert!(cie > 0.0 && cie <= 1.0, "cie {} at {}", cie, rho);
            assert!(h2 > 0.0 && h2 <= 1.0, "h2 {} at {}", h2, rho);
            rho *= 3.0;
        }
    }

    #[test]
    fn test_escape_probabilities_limits() {
        assert_relative_eq!(cie_escape_probability(1e-25), 1.0, epsilon = 1e-5);
        assert_eq!(h2_line_escape_probability(1e-25), 1.0);
        assert!(cie_escape_probability(1.0) < 1e-10);
        assert!(h2_line_escape_probability(1e3) < 1e-6);
    }

    #[test]
    fn test_cie_decreases_with_density() {
        let mut rho = 1e-9;
        let mut previous = cie_escape_probability(rho);
        while rho < 1e-4 {
            rho *= 1.5;
            let current = cie_escape_probability(rho);
            assert!(current < previous, "not decreasing at {}", rho);
            previous = current;
        }
    }

    #[test]
    fn test_from_cell() {
        let cell = [0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 1e12];
        let derived = PerCellDerived::from_cell(&cell);
        assert_relative_eq!(derived.mdensity, 1.00794 * MH, max_relative = 1e-15);
        assert_relative_eq!(derived.inv_mdensity * derived.mdensity, 1.0, max_relative = 1e-15);
        assert_eq!(derived.h2_optical_depth, 1.0);
    }
}
