//! # Integrator-facing entry points
//!
//! [`PrimordialNetwork`] holds the immutable part (rate tables shared through
//! an `Arc`, configuration) and can be cloned freely across threads.
//! [`StripContext`] holds everything that belongs to one batch of cells: the
//! scale vector, the temperature warm start that persists between
//! evaluations, the last temperature solve and the cached derived quantities.
//!
//! One evaluation runs, per cell:
//! unscale → temperature solve → rate interpolation → RHS or Jacobian → rescale.
//!
//! ```
//! use PrimoChem::Network::network_api::{PrimordialNetwork, ScaleVector};
//! use PrimoChem::settings::NetworkConfig;
//! let network = PrimordialNetwork::from_config(NetworkConfig::default()).unwrap();
//! let mut y = vec![1e-6, 1e-14, 0.76, 1e-4, 1e-12, 0.24, 1e-8, 1e-14, 0.0, 0.0];
//! network.prepare_initial_state(&mut y, 1, &[1000.0]).unwrap();
//! let mut ctx = network.new_context(1, ScaleVector::unit(1)).unwrap();
//! network.set_extra_variables(&mut ctx, &y).unwrap();
//! let mut ydot = vec![0.0; 10];
//! assert_eq!(network.rhs_flag(&y, &mut ydot, &mut ctx), 0);
//! ```
use crate::Network::analytic_tables::AnalyticTables;
use crate::Network::derived_quantities::PerCellDerived;
use crate::Network::jacobian_assembler::{NNZ_PER_CELL, SparseJacobian, cell_jacobian};
use crate::Network::network_error::{ChemistryError, STATUS_OK};
use crate::Network::rate_interpolator::RateInterpolator;
use crate::Network::rate_tables::RateTableStore;
use crate::Network::rhs_assembler::{CellEnvironment, cell_rhs};
use crate::Network::species::{
    MAX_NCELLS, NCHEM, Species, cell_values, check_strip_len, ensure_electron_consistency,
    species_names,
};
use crate::Network::temperature_solver::{
    CellThermal, TemperatureSolver, specific_energy_from_temperature,
};
use crate::Utils::load_from_file::JsonTableFile;
use crate::settings::NetworkConfig;
use log::{debug, info, warn};
use std::sync::Arc;

/// Per-variable scale factors between the integrator's variables and
/// physical amounts: `physical = scaled · scale`.
#[derive(Debug, Clone, PartialEq)]
pub struct ScaleVector {
    scale: Vec<f64>,
    inv_scale: Vec<f64>,
}

impl ScaleVector {
    /// Every factor must be positive and finite.
    pub fn new(scale: Vec<f64>) -> Result<Self, ChemistryError> {
        if let Some(bad) = scale.iter().find(|s| !(**s > 0.0 && s.is_finite())) {
            return Err(ChemistryError::Config(format!(
                "scale factors must be positive and finite, got {}",
                bad
            )));
        }
        let inv_scale = scale.iter().map(|s| 1.0 / s).collect();
        Ok(Self { scale, inv_scale })
    }

    pub fn unit(nstrip: usize) -> Self {
        Self {
            scale: vec![1.0; nstrip * NCHEM],
            inv_scale: vec![1.0; nstrip * NCHEM],
        }
    }

    /// `|y|`, with zero (or non-finite) entries replaced by 1.
    pub fn from_state(y: &[f64]) -> Self {
        let scale: Vec<f64> = y
            .iter()
            .map(|v| {
                let a = v.abs();
                if a > 0.0 && a.is_finite() { a } else { 1.0 }
            })
            .collect();
        let inv_scale = scale.iter().map(|s| 1.0 / s).collect();
        Self { scale, inv_scale }
    }

    pub fn len(&self) -> usize {
        self.scale.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scale.is_empty()
    }

    pub fn scale(&self) -> &[f64] {
        &self.scale
    }

    pub fn inv_scale(&self) -> &[f64] {
        &self.inv_scale
    }

    /// physical -> integrator variables
    pub fn to_scaled(&self, y: &[f64]) -> Vec<f64> {
        y.iter().zip(&self.inv_scale).map(|(v, s)| v * s).collect()
    }

    /// integrator variables -> physical
    pub fn to_physical(&self, y: &[f64]) -> Vec<f64> {
        y.iter().zip(&self.scale).map(|(v, s)| v * s).collect()
    }
}

/// Caller-owned state of one strip of cells.
#[derive(Debug, Clone)]
pub struct StripContext {
    nstrip: usize,
    scale: ScaleVector,
    warm_start: Vec<f64>,
    thermal: Vec<CellThermal>,
    derived: Option<Vec<PerCellDerived>>,
}

impl StripContext {
    pub fn new(
        nstrip: usize,
        scale: ScaleVector,
        initial_temperature: f64,
    ) -> Result<Self, ChemistryError> {
        if nstrip > MAX_NCELLS {
            return Err(ChemistryError::BatchTooLarge {
                requested: nstrip,
                max: MAX_NCELLS,
            });
        }
        check_strip_len("scale vector", scale.len(), nstrip)?;
        Ok(Self {
            nstrip,
            scale,
            warm_start: vec![initial_temperature; nstrip],
            thermal: vec![CellThermal::default(); nstrip],
            derived: None,
        })
    }

    pub fn nstrip(&self) -> usize {
        self.nstrip
    }

    pub fn scale(&self) -> &ScaleVector {
        &self.scale
    }

    pub fn set_scale(&mut self, scale: ScaleVector) -> Result<(), ChemistryError> {
        check_strip_len("scale vector", scale.len(), self.nstrip)?;
        self.scale = scale;
        Ok(())
    }

    /// Temperatures found by the last evaluation (the warm start of the next).
    pub fn temperatures(&self) -> &[f64] {
        &self.warm_start
    }

    pub fn thermal(&self, cell: usize) -> &CellThermal {
        &self.thermal[cell]
    }

    pub fn derived(&self) -> Option<&[PerCellDerived]> {
        self.derived.as_deref()
    }

    /// Recomputes mass density and escape probabilities from physical
    /// species amounts. Must run whenever the densities change.
    pub fn set_extra_variables(
        &mut self,
        y_physical: &[f64],
        check_domain: bool,
    ) -> Result<(), ChemistryError> {
        check_strip_len("state vector", y_physical.len(), self.nstrip)?;
        let mut derived = Vec::with_capacity(self.nstrip);
        for i in 0..self.nstrip {
            let cell_derived = PerCellDerived::from_cell(&cell_values(y_physical, i));
            if check_domain && !(cell_derived.mdensity > 0.0 && cell_derived.mdensity.is_finite()) {
                return Err(ChemistryError::NumericalDomain {
                    cell: i,
                    quantity: "mass density",
                    value: cell_derived.mdensity,
                });
            }
            derived.push(cell_derived);
        }
        self.derived = Some(derived);
        Ok(())
    }
}

/// The primordial chemistry network: shared tables plus configuration.
#[derive(Debug, Clone)]
pub struct PrimordialNetwork {
    store: Arc<RateTableStore>,
    config: NetworkConfig,
}

impl PrimordialNetwork {
    pub fn new(store: Arc<RateTableStore>, config: NetworkConfig) -> Self {
        Self { store, config }
    }

    /// Builds the table store from the configured table file, or from the
    /// analytic fits when no file is configured.
    pub fn from_config(config: NetworkConfig) -> Result<Self, ChemistryError> {
        config.validate()?;
        let grid = config.grid()?;
        let store = match &config.table_file {
            Some(file) => RateTableStore::load(grid, &JsonTableFile::open(file)?)?,
            None => {
                info!("no table file configured, using analytic rate fits");
                AnalyticTables::primordial(grid).build()?
            }
        };
        Ok(Self::new(Arc::new(store), config))
    }

    pub fn store(&self) -> &Arc<RateTableStore> {
        &self.store
    }

    pub fn config(&self) -> &NetworkConfig {
        &self.config
    }

    /// Ordered names of the 10 state variables.
    pub fn species_names(&self) -> Vec<String> {
        species_names()
    }

    pub fn new_context(
        &self,
        nstrip: usize,
        scale: ScaleVector,
    ) -> Result<StripContext, ChemistryError> {
        debug!("new strip context with {} cells", nstrip);
        StripContext::new(nstrip, scale, self.config.initial_temperature)
    }

    pub fn set_extra_variables(
        &self,
        ctx: &mut StripContext,
        y_physical: &[f64],
    ) -> Result<(), ChemistryError> {
        ctx.set_extra_variables(y_physical, self.config.check_domain)
    }

    /// Fills in the charge-neutral electron amount and the internal energy
    /// matching `temperatures` for every cell of a physical state vector.
    pub fn prepare_initial_state(
        &self,
        y: &mut [f64],
        nstrip: usize,
        temperatures: &[f64],
    ) -> Result<(), ChemistryError> {
        if temperatures.len() != nstrip {
            return Err(ChemistryError::ShapeMismatch {
                what: "temperatures",
                expected: nstrip,
                found: temperatures.len(),
            });
        }
        ensure_electron_consistency(y, nstrip)?;
        for (i, t) in temperatures.iter().enumerate() {
            let cell = cell_values(y, i);
            y[i * NCHEM + Species::Energy.index()] =
                specific_energy_from_temperature(&self.store, &cell, *t);
        }
        Ok(())
    }

    /// Unscales each cell, solves for its temperature and interpolates the
    /// rates. Updates the warm start and thermal results of `ctx`.
    fn prepare_cells(
        &self,
        y_scaled: &[f64],
        ctx: &mut StripContext,
    ) -> Result<Vec<([f64; NCHEM], CellEnvironment)>, ChemistryError> {
        check_strip_len("state vector", y_scaled.len(), ctx.nstrip)?;
        let derived = ctx
            .derived
            .as_ref()
            .ok_or(ChemistryError::DerivedNotInitialized)?;
        let solver = TemperatureSolver::new(&self.store, self.config.temperature_iteration);
        let interpolator = RateInterpolator::new(&self.store);
        let physical = ctx.scale.to_physical(y_scaled);
        let mut cells = Vec::with_capacity(ctx.nstrip);
        for i in 0..ctx.nstrip {
            let cell = cell_values(&physical, i);
            let thermal = solver.solve(&cell, ctx.warm_start[i], i)?;
            if self.config.check_domain {
                check_finite(i, "temperature", thermal.temperature)?;
                check_finite(i, "dT/dge", thermal.dt_dge)?;
            }
            // a non-finite iterate must not poison later evaluations of the cell
            if thermal.temperature.is_finite() {
                ctx.warm_start[i] = thermal.temperature;
            }
            ctx.thermal[i] = thermal;
            let env = CellEnvironment {
                thermal,
                rates: interpolator.interpolate(&thermal),
                derived: derived[i],
                redshift: self.config.redshift,
            };
            cells.push((cell, env));
        }
        Ok(cells)
    }

    /// Scaled time derivative of the scaled state `y_scaled`.
    pub fn rhs(
        &self,
        y_scaled: &[f64],
        ydot: &mut [f64],
        ctx: &mut StripContext,
    ) -> Result<(), ChemistryError> {
        check_strip_len("rhs output", ydot.len(), ctx.nstrip)?;
        let cells = self.prepare_cells(y_scaled, ctx)?;
        let inv_scale = ctx.scale.inv_scale();
        for (i, (cell, env)) in cells.iter().enumerate() {
            let out = cell_rhs(cell, env);
            for (s, value) in out.iter().enumerate() {
                if self.config.check_domain {
                    check_finite(i, "rhs", *value)?;
                }
                ydot[i * NCHEM + s] = value * inv_scale[i * NCHEM + s];
            }
        }
        Ok(())
    }

    /// Jacobian of [`PrimordialNetwork::rhs`] in the scaled variables.
    pub fn jacobian(
        &self,
        y_scaled: &[f64],
        jac: &mut SparseJacobian,
        ctx: &mut StripContext,
    ) -> Result<(), ChemistryError> {
        if jac.nstrip != ctx.nstrip {
            return Err(ChemistryError::ShapeMismatch {
                what: "jacobian",
                expected: ctx.nstrip * NNZ_PER_CELL,
                found: jac.nnz(),
            });
        }
        jac.zero();
        let cells = self.prepare_cells(y_scaled, ctx)?;
        for (i, (cell, env)) in cells.iter().enumerate() {
            let block = cell_jacobian(cell, env);
            if self.config.check_domain {
                for value in block.iter() {
                    check_finite(i, "jacobian", *value)?;
                }
            }
            jac.write_cell(i, &block, ctx.scale.scale(), ctx.scale.inv_scale());
        }
        Ok(())
    }

    /// [`PrimordialNetwork::rhs`] with the integer status convention.
    pub fn rhs_flag(&self, y_scaled: &[f64], ydot: &mut [f64], ctx: &mut StripContext) -> i32 {
        match self.rhs(y_scaled, ydot, ctx) {
            Ok(()) => STATUS_OK,
            Err(e) => {
                warn!("rhs evaluation failed: {}", e);
                e.status_code()
            }
        }
    }

    /// [`PrimordialNetwork::jacobian`] with the integer status convention.
    pub fn jacobian_flag(
        &self,
        y_scaled: &[f64],
        jac: &mut SparseJacobian,
        ctx: &mut StripContext,
    ) -> i32 {
        match self.jacobian(y_scaled, jac, ctx) {
            Ok(()) => STATUS_OK,
            Err(e) => {
                warn!("jacobian evaluation failed: {}", e);
                e.status_code()
            }
        }
    }
}

fn check_finite(cell: usize, quantity: &'static str, value: f64) -> Result<(), ChemistryError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ChemistryError::NumericalDomain {
            cell,
            quantity,
            value,
        })
    }
}
