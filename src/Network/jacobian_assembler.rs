//! Analytic Jacobian of [`cell_rhs`](crate::Network::rhs_assembler::cell_rhs)
//! in a fixed compressed-sparse-row layout.
//!
//! Every cell contributes the same 64-entry block on the diagonal of the strip
//! matrix. Derivatives with respect to `ge` go through the temperature:
//! `∂f/∂ge = ∂f/∂T · dT/dge`, using the slopes from the interpolator and
//! `dT/dge` from the temperature solve. Derived quantities (mass density,
//! escape probabilities) are held fixed.
use crate::Network::energy_equation::heating_gradient;
use crate::Network::reaction_terms::REACTIONS;
use crate::Network::rhs_assembler::CellEnvironment;
use crate::Network::species::{NCHEM, Species};
use nalgebra::DMatrix;

/// Nonzeros per cell.
pub const NNZ_PER_CELL: usize = 64;

/// Start of every row inside a cell block.
pub const ROW_OFFSETS: [usize; NCHEM + 1] = [0, 7, 14, 21, 28, 34, 38, 43, 47, 56, 64];

/// Column (species index) of every entry inside a cell block.
#[rustfmt::skip]
pub const COLUMNS: [usize; NNZ_PER_CELL] = [
    0, 1, 2, 3, 4, 8, 9,        // H2_1
    0, 1, 2, 3, 4, 8, 9,        // H2_2
    0, 1, 2, 3, 4, 8, 9,        // H_1
    0, 1, 2, 3, 4, 8, 9,        // H_2
    1, 2, 3, 4, 8, 9,           // H_m0
    5, 6, 8, 9,                 // He_1
    5, 6, 7, 8, 9,              // He_2
    6, 7, 8, 9,                 // He_3
    1, 2, 3, 4, 5, 6, 7, 8, 9,  // de
    0, 2, 3, 5, 6, 7, 8, 9,     // ge
];

/// The per-cell sparsity pattern.
pub struct SparseJacobianLayout;

impl SparseJacobianLayout {
    /// columns of `row`
    pub fn row(row: usize) -> &'static [usize] {
        &COLUMNS[ROW_OFFSETS[row]..ROW_OFFSETS[row + 1]]
    }

    /// position of `(row, col)` inside a cell block
    pub fn position(row: usize, col: usize) -> Option<usize> {
        Self::row(row)
            .iter()
            .position(|c| *c == col)
            .map(|p| ROW_OFFSETS[row] + p)
    }

    /// `(row, col)` of every entry of a cell block, in storage order
    pub fn entries() -> impl Iterator<Item = (usize, usize)> {
        (0..NCHEM).flat_map(|row| Self::row(row).iter().map(move |col| (row, *col)))
    }
}

/// Block-diagonal CSR matrix for a strip of cells.
#[derive(Debug, Clone, PartialEq)]
pub struct SparseJacobian {
    pub nstrip: usize,
    pub row_ptrs: Vec<usize>,
    pub col_idx: Vec<usize>,
    pub values: Vec<f64>,
}

impl SparseJacobian {
    pub fn new(nstrip: usize) -> Self {
        let mut row_ptrs = Vec::with_capacity(nstrip * NCHEM + 1);
        let mut col_idx = Vec::with_capacity(nstrip * NNZ_PER_CELL);
        for cell in 0..nstrip {
            for row in 0..NCHEM {
                row_ptrs.push(cell * NNZ_PER_CELL + ROW_OFFSETS[row]);
            }
            col_idx.extend(COLUMNS.iter().map(|c| cell * NCHEM + c));
        }
        row_ptrs.push(nstrip * NNZ_PER_CELL);
        Self {
            nstrip,
            row_ptrs,
            col_idx,
            values: vec![0.0; nstrip * NNZ_PER_CELL],
        }
    }

    pub fn nnz(&self) -> usize {
        self.values.len()
    }

    pub fn zero(&mut self) {
        self.values.iter_mut().for_each(|v| *v = 0.0);
    }

    /// Entry at global `(row, col)`; structural zeros read as 0.
    pub fn get(&self, row: usize, col: usize) -> f64 {
        if row >= self.nstrip * NCHEM {
            return 0.0;
        }
        (self.row_ptrs[row]..self.row_ptrs[row + 1])
            .find(|k| self.col_idx[*k] == col)
            .map_or(0.0, |k| self.values[k])
    }

    /// Writes one cell block, rescaled to the integrator's variables:
    /// entry `(r, c)` is multiplied by `inv_scale[r] · scale[c]`.
    pub fn write_cell(
        &mut self,
        cell: usize,
        block: &[f64; NNZ_PER_CELL],
        scale: &[f64],
        inv_scale: &[f64],
    ) {
        let base = cell * NCHEM;
        let out = &mut self.values[cell * NNZ_PER_CELL..(cell + 1) * NNZ_PER_CELL];
        for (k, (row, col)) in SparseJacobianLayout::entries().enumerate() {
            out[k] = block[k] * inv_scale[base + row] * scale[base + col];
        }
    }

    pub fn to_dense(&self) -> DMatrix<f64> {
        let n = self.nstrip * NCHEM;
        let mut dense = DMatrix::zeros(n, n);
        for row in 0..n {
            for k in self.row_ptrs[row]..self.row_ptrs[row + 1] {
                dense[(row, self.col_idx[k])] = self.values[k];
            }
        }
        dense
    }
}

/// Dense 10x10 Jacobian of one cell in physical units.
pub fn cell_jacobian_dense(cell: &[f64; NCHEM], env: &CellEnvironment) -> [[f64; NCHEM]; NCHEM] {
    let mut jac = [[0.0; NCHEM]; NCHEM];
    let ge = Species::Energy.index();
    let dt_dge = env.thermal.dt_dge;
    for term in REACTIONS.iter() {
        let k = env.rates.k(term.rate);
        let dk = env.rates.dk(term.rate);
        let flux_per_k = term.mass_action(cell);
        for (s, nu) in term.changes() {
            let row = &mut jac[s.index()];
            for (i, r) in term.reactants.iter().enumerate() {
                if term.reactants[..i].contains(r) {
                    continue;
                }
                row[r.index()] += nu * k * term.mass_action_derivative(cell, *r);
            }
            row[ge] += nu * dk * flux_per_k * dt_dge;
        }
    }
    let grad = heating_gradient(cell, env);
    let inv_rho = env.derived.inv_mdensity;
    for s in 0..Species::Energy.index() {
        jac[ge][s] = grad.d_species[s] * inv_rho;
    }
    jac[ge][ge] = grad.d_temperature * dt_dge * inv_rho;
    jac
}

/// The 64 nonzero entries of one cell in storage order, physical units.
pub fn cell_jacobian(cell: &[f64; NCHEM], env: &CellEnvironment) -> [f64; NNZ_PER_CELL] {
    let dense = cell_jacobian_dense(cell, env);
    let mut block = [0.0; NNZ_PER_CELL];
    for (k, (row, col)) in SparseJacobianLayout::entries().enumerate() {
        block[k] = dense[row][col];
    }
    block
}
