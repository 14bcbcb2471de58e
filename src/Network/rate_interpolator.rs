//! Piecewise-linear lookup of every reaction and cooling coefficient at the
//! temperature found by the temperature solve.
//!
//! The slope of each coefficient is the finite difference across the bin
//! divided by the bin width, times `1/T`: the tables are spaced in `ln T`, so
//! `(t[b+1] − t[b])/Δ(ln T) · 1/T` estimates `dk/dT`. The same constant slope
//! is used for the whole bin, which is what the Jacobian chain rule consumes.
use crate::Network::rate_tables::{BinLocation, Cooling, RateTableStore, Reaction, lerp};
use crate::Network::temperature_solver::CellThermal;

/// Interpolated coefficients and their temperature slopes for one cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellRates {
    reactions: [f64; Reaction::COUNT],
    reaction_slopes: [f64; Reaction::COUNT],
    cooling: [f64; Cooling::COUNT],
    cooling_slopes: [f64; Cooling::COUNT],
}

impl Default for CellRates {
    fn default() -> Self {
        Self {
            reactions: [0.0; Reaction::COUNT],
            reaction_slopes: [0.0; Reaction::COUNT],
            cooling: [0.0; Cooling::COUNT],
            cooling_slopes: [0.0; Cooling::COUNT],
        }
    }
}

impl CellRates {
    #[inline]
    pub fn k(&self, r: Reaction) -> f64 {
        self.reactions[r.index()]
    }

    /// dk/dT
    #[inline]
    pub fn dk(&self, r: Reaction) -> f64 {
        self.reaction_slopes[r.index()]
    }

    #[inline]
    pub fn c(&self, c: Cooling) -> f64 {
        self.cooling[c.index()]
    }

    /// dc/dT
    #[inline]
    pub fn dc(&self, c: Cooling) -> f64 {
        self.cooling_slopes[c.index()]
    }

    /// Overrides one reaction coefficient and its slope.
    pub fn set_reaction(&mut self, r: Reaction, value: f64, slope: f64) {
        self.reactions[r.index()] = value;
        self.reaction_slopes[r.index()] = slope;
    }

    /// Overrides one cooling coefficient and its slope.
    pub fn set_cooling(&mut self, c: Cooling, value: f64, slope: f64) {
        self.cooling[c.index()] = value;
        self.cooling_slopes[c.index()] = slope;
    }
}

pub struct RateInterpolator<'a> {
    store: &'a RateTableStore,
}

impl<'a> RateInterpolator<'a> {
    pub fn new(store: &'a RateTableStore) -> Self {
        Self { store }
    }

    pub fn locate(&self, thermal: &CellThermal) -> BinLocation {
        self.store.grid().locate(thermal.log_t)
    }

    /// `(value, dvalue/dT)` of one table at `loc`.
    #[inline]
    fn sample(&self, table: &[f64], loc: BinLocation, inv_t: f64) -> (f64, f64) {
        let lo = table[loc.bin];
        let hi = table[loc.bin + 1];
        let slope = (hi - lo) / self.store.grid().bin_width() * inv_t;
        (lerp(lo, hi, loc.frac), slope)
    }

    pub fn interpolate(&self, thermal: &CellThermal) -> CellRates {
        let loc = self.locate(thermal);
        let mut rates = CellRates::default();
        for r in Reaction::ALL {
            let (v, dv) = self.sample(self.store.reaction(*r), loc, thermal.inv_t);
            rates.set_reaction(*r, v, dv);
        }
        for c in Cooling::ALL {
            let (v, dv) = self.sample(self.store.cooling(*c), loc, thermal.inv_t);
            rates.set_cooling(*c, v, dv);
        }
        rates
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Network::analytic_tables::AnalyticTables;
    use crate::Network::rate_tables::TemperatureGrid;
    use approx::assert_relative_eq;

    fn thermal_at(t: f64) -> CellThermal {
        CellThermal {
            temperature: t,
            log_t: t.ln(),
            inv_t: 1.0 / t,
            dt_dge: 1.0,
        }
    }

    #[test]
    fn test_nodes_reproduce_table_entries() {
        let grid = TemperatureGrid::new(1.0, 1e5, 1023).unwrap();
        let store = AnalyticTables::primordial(grid.clone()).build().unwrap();
        let interp = RateInterpolator::new(&store);
        for node in [0, 1, 311, 700, 1022] {
            let log_t = grid.log_node(node);
            let rates = interp.interpolate(&CellThermal {
                temperature: log_t.exp(),
                log_t,
                inv_t: (-log_t).exp(),
                dt_dge: 1.0,
            });
            let loc = grid.locate(log_t);
            let k01 = store.reaction(Reaction::K01);
            let expected = lerp(k01[loc.bin], k01[loc.bin + 1], loc.frac);
            assert_relative_eq!(rates.k(Reaction::K01), expected, max_relative = 1e-15);
            assert_relative_eq!(
                rates.c(Cooling::ReHII),
                store.cooling(Cooling::ReHII)[node],
                max_relative = 1e-9
            );
        }
    }

    #[test]
    fn test_slope_is_bin_difference_over_t() {
        let grid = TemperatureGrid::new(1.0, 1e5, 1023).unwrap();
        let store = AnalyticTables::primordial(grid.clone())
            .with_fit("k09", |t| t.ln())
            .build()
            .unwrap();
        let interp = RateInterpolator::new(&store);
        // k = ln T has slope exactly dbin/dbin * 1/T inside every bin
        let t = 2345.0;
        let rates = interp.interpolate(&thermal_at(t));
        assert_relative_eq!(rates.k(Reaction::K09), t.ln(), max_relative = 1e-12);
        assert_relative_eq!(rates.dk(Reaction::K09), 1.0 / t, max_relative = 1e-9);
        // constants have zero slope
        assert_eq!(rates.dk(Reaction::K10), 0.0);
    }

    #[test]
    fn test_extrapolates_past_the_top_edge() {
        let grid = TemperatureGrid::new(1.0, 1e5, 255).unwrap();
        let store = AnalyticTables::primordial(grid)
            .with_fit("k10", |t| t.ln())
            .build()
            .unwrap();
        let rates = RateInterpolator::new(&store).interpolate(&thermal_at(2e5));
        assert_relative_eq!(rates.k(Reaction::K10), 2e5_f64.ln(), max_relative = 1e-12);
    }
}
