//! Closed-form fits evaluated on the temperature grid, used as a table source
//! when no table file is available (tests, demos, the CLI).
//!
//! The fits follow the usual primordial-chemistry literature forms
//! (Cen 1992, Abel et al. 1997, Galli & Palla 1998, Glover & Abel 2008) closely
//! enough to give physically sensible signs and magnitudes. They are not a
//! substitute for production tables.
//!
//! # Examples
//! ```
//! use PrimoChem::Network::analytic_tables::AnalyticTables;
//! use PrimoChem::Network::rate_tables::{Reaction, TemperatureGrid};
//! let grid = TemperatureGrid::new(1.0, 1e5, 1023).unwrap();
//! let store = AnalyticTables::primordial(grid)
//!     .with_constant("k10", 1e-9)
//!     .build()
//!     .unwrap();
//! assert_eq!(store.reaction(Reaction::K10)[7], 1e-9);
//! ```
use crate::Network::network_error::ChemistryError;
use crate::Network::rate_tables::{RateTableStore, TableSource, TemperatureGrid};
use std::collections::HashMap;

type Fit = Box<dyn Fn(f64) -> f64 + Send + Sync>;

/// suppression of collisional rates above 1e5 K
fn hot(t: f64) -> f64 {
    1.0 / (1.0 + (t / 1e5).sqrt())
}

/// radiative recombination shape
fn rec(t: f64) -> f64 {
    (t / 1e3).powf(-0.2) / (1.0 + (t / 1e6).powf(0.7))
}

const PRIMORDIAL_FITS: &[(&str, fn(f64) -> f64)] = &[
    // reactions
    ("k01", |t| 5.85e-11 * t.sqrt() * (-157809.1 / t).exp() * hot(t)),
    ("k02", |t| 8.40e-11 / t.sqrt() * rec(t)),
    ("k03", |t| 2.38e-11 * t.sqrt() * (-285335.4 / t).exp() * hot(t)),
    ("k04", |t| 1.50e-10 * t.powf(-0.6353)),
    ("k05", |t| 5.68e-12 * t.sqrt() * (-631515.0 / t).exp() * hot(t)),
    ("k06", |t| 3.36e-10 / t.sqrt() * rec(t)),
    ("k07", |t| 1.4e-18 * t.powf(0.928) * (-t / 16200.0).exp()),
    ("k08", |t| 4.0e-9 * t.powf(-0.17)),
    ("k09", |t| 1.85e-23 * t.powf(1.8)),
    ("k10", |_| 6.0e-10),
    ("k11", |t| 3.0e-10 * (-21050.0 / t).exp()),
    ("k12", |t| 4.4e-10 * t.powf(0.35) * (-102000.0 / t).exp()),
    ("k13", |t| 1.0e-10 * (-52000.0 / t).exp()),
    ("k14", |t| 4.0e-12 * t * (-8750.0 / t).exp()),
    ("k15", |t| 5.3e-20 * t.powf(2.17) * (-8750.0 / t).exp()),
    ("k16", |t| 7.0e-8 * (t / 100.0).powf(-0.5)),
    ("k17", |t| 1.0e-8 * t.powf(-0.4)),
    ("k18", |t| 1.32e-6 * t.powf(-0.76)),
    ("k19", |t| 5.0e-7 * (100.0 / t).sqrt()),
    ("k21", |t| 2.8e-31 * t.powf(-0.6)),
    ("k22", |t| 5.5e-29 / t),
    // cooling
    ("brem_brem", |t| 1.43e-27 * t.sqrt() * 1.3),
    ("ceHeI_ceHeI", |t| {
        9.1e-27 * t.powf(-0.1687) * (-13179.0 / t).exp() * hot(t)
    }),
    ("ceHeII_ceHeII", |t| {
        5.54e-17 * t.powf(-0.397) * (-473638.0 / t).exp() * hot(t)
    }),
    ("ceHI_ceHI", |t| 7.5e-19 * (-118348.0 / t).exp() * hot(t)),
    ("cie_cooling_cieco", |t| 1.0e-40 * t.powi(4)),
    ("ciHeI_ciHeI", |t| {
        9.38e-22 * t.sqrt() * (-285335.4 / t).exp() * hot(t)
    }),
    ("ciHeII_ciHeII", |t| {
        4.95e-22 * t.sqrt() * (-631515.0 / t).exp() * hot(t)
    }),
    ("ciHeIS_ciHeIS", |t| {
        5.01e-27 * t.powf(-0.1687) * (-55338.0 / t).exp() * hot(t)
    }),
    ("ciHI_ciHI", |t| {
        1.27e-21 * t.sqrt() * (-157809.1 / t).exp() * hot(t)
    }),
    ("compton_comp_", |_| 5.65e-36),
    // photoheating is disabled
    ("gammah_gammah", |_| 0.0),
    ("gloverabel08_gael", |t| 1.0e-21 * (t / 1e3).powf(1.2)),
    ("gloverabel08_gaH2", |t| 1.4e-25 * (t / 1e3).powf(3.8)),
    ("gloverabel08_gaHe", |t| 0.9e-25 * (t / 1e3).powf(3.8)),
    ("gloverabel08_gaHI", |t| 1.0e-25 * (t / 1e3).powf(3.8)),
    ("gloverabel08_gaHp", |t| 1.0e-22 * (t / 1e3).powf(1.4)),
    ("gloverabel08_gphdl", |t| 1.0e-25 * (t / 1e3).powi(2)),
    ("gloverabel08_gpldl", |t| 0.5e-25 * (t / 1e3).powi(2)),
    ("gloverabel08_h2lte", |t| 1.1e-19 * (-6744.0 / t).exp()),
    ("h2formation_h2mcool", |t| 7.177e-12 * 1.0e-10 * (-52000.0 / t).exp()),
    ("h2formation_h2mheat", |t| 7.177e-12 * 5.5e-29 / t),
    ("h2formation_ncrd1", |t| 1.6 * (-(400.0 / t).powi(2)).exp()),
    ("h2formation_ncrd2", |t| 1.4 * (-12000.0 / (t + 1200.0)).exp()),
    ("h2formation_ncrn", |t| 1.0e6 / t.sqrt()),
    ("reHeII1_reHeII1", |t| 1.55e-26 * t.powf(0.3647)),
    ("reHeII2_reHeII2", |t| {
        1.24e-13 * t.powf(-1.5) * (-470000.0 / t).exp() * (1.0 + 0.3 * (-94000.0 / t).exp())
    }),
    ("reHeIII_reHeIII", |t| 3.48e-26 * t.sqrt() * rec(t)),
    ("reHII_reHII", |t| 8.7e-27 * t.sqrt() * rec(t)),
    // H2 treated as a rigid rotor everywhere
    ("gammaH2_1", |_| 1.4),
    ("dgammaH2_1_dT", |_| 0.0),
    ("gammaH2_2", |_| 1.4),
    ("dgammaH2_2_dT", |_| 0.0),
];

/// Table source built from closed-form functions of temperature.
pub struct AnalyticTables {
    grid: TemperatureGrid,
    fits: HashMap<String, Fit>,
}

impl AnalyticTables {
    /// Empty source; every key has to be added with [`AnalyticTables::with_fit`].
    pub fn new(grid: TemperatureGrid) -> Self {
        Self {
            grid,
            fits: HashMap::new(),
        }
    }

    /// Fits for every table of the primordial network.
    pub fn primordial(grid: TemperatureGrid) -> Self {
        let mut tables = Self::new(grid);
        for (key, fit) in PRIMORDIAL_FITS {
            let fit = *fit;
            tables.fits.insert(key.to_string(), Box::new(fit));
        }
        tables
    }

    /// Adds or replaces the fit for one table.
    pub fn with_fit(mut self, key: &str, fit: impl Fn(f64) -> f64 + Send + Sync + 'static) -> Self {
        self.fits.insert(key.to_string(), Box::new(fit));
        self
    }

    pub fn with_constant(self, key: &str, value: f64) -> Self {
        self.with_fit(key, move |_| value)
    }

    pub fn grid(&self) -> &TemperatureGrid {
        &self.grid
    }

    pub fn build(&self) -> Result<RateTableStore, ChemistryError> {
        RateTableStore::load(self.grid.clone(), self)
    }
}

impl TableSource for AnalyticTables {
    fn read_table(&self, key: &str) -> Result<Vec<f64>, ChemistryError> {
        let fit = self
            .fits
            .get(key)
            .ok_or_else(|| ChemistryError::MissingTable(key.to_string()))?;
        Ok(self.grid.node_temperatures().into_iter().map(|t| fit(t)).collect())
    }

    fn describe(&self) -> String {
        format!("{} analytic fits", self.fits.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Network::rate_tables::{Cooling, GammaTable, Reaction};

    #[test]
    fn test_primordial_covers_every_key() {
        let grid = TemperatureGrid::new(1.0, 1e5, 255).unwrap();
        let store = AnalyticTables::primordial(grid).build().unwrap();
        for r in Reaction::ALL {
            assert!(store.reaction(*r).iter().all(|v| v.is_finite() && *v >= 0.0), "{}", r.key());
        }
        for c in Cooling::ALL {
            assert!(store.cooling(*c).iter().all(|v| v.is_finite() && *v >= 0.0), "{}", c.key());
        }
        assert!(store.gamma(GammaTable::GammaH2I).iter().all(|g| *g == 1.4));
    }

    #[test]
    fn test_overrides_and_missing_keys() {
        let grid = TemperatureGrid::new(10.0, 1e4, 8).unwrap();
        let tables = AnalyticTables::primordial(grid.clone()).with_fit("k01", |t| t);
        let k01 = tables.read_table("k01").unwrap();
        assert_eq!(k01.len(), 9);
        approx::assert_relative_eq!(k01[8], 1e4, max_relative = 1e-12);
        let err = AnalyticTables::new(grid).build().unwrap_err();
        assert!(matches!(err, ChemistryError::MissingTable(ref k) if k == "k01"));
    }
}
