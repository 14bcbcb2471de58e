//! # Primordial Chemistry Network
//!
//! Right-hand side and analytic Jacobian of the stiff ODE system
//!
//! ```text
//! dn_i/dt = Σ_j ν_ij k_j(T) Π_{r ∈ reactants(j)} n_r          i = H2_1 ... de
//! dge/dt  = Λ(n, T) / ρ
//! ```
//!
//! for a gas of H, H2, He, their ions and electrons, with the specific internal
//! energy `ge` as the tenth variable. The system is meant to be handed to an
//! external implicit integrator, which owns time stepping, error control and
//! the linear solves; this module only evaluates `f(y)` and `∂f/∂y`.
//!
//! ## Variables
//!
//! | index | name | meaning |
//! |-------|------|---------|
//! | 0 | `H2_1` | molecular hydrogen |
//! | 1 | `H2_2` | H2+ |
//! | 2 | `H_1` | atomic hydrogen |
//! | 3 | `H_2` | H+ |
//! | 4 | `H_m0` | H- |
//! | 5 | `He_1` | neutral helium |
//! | 6 | `He_2` | He+ |
//! | 7 | `He_3` | He++ |
//! | 8 | `de` | electrons |
//! | 9 | `ge` | specific internal energy, erg/g |
//!
//! A strip of `nstrip` independent cells is stored cell-major, 10 values per
//! cell. Cells never interact, so a strip can be split across threads as long
//! as each part has its own [`network_api::StripContext`].
//!
//! ## Pipeline
//!
//! 1. the scaled state is unscaled with the per-variable scale factors
//! 2. temperature is recovered from `ge` by Newton iteration
//!    ([`temperature_solver`])
//! 3. every rate and cooling coefficient is interpolated in `ln T`
//!    ([`rate_interpolator`])
//! 4. the RHS ([`rhs_assembler`], [`energy_equation`]) or the 64-entry CSR
//!    Jacobian block ([`jacobian_assembler`]) is assembled and rescaled
//!
//! Mass density and the two escape probabilities ([`derived_quantities`]) are
//! computed separately, whenever the densities change, and cached.
//!
//! ## Rate tables
//!
//! Coefficients come from 53 tables of `nbins + 1` values on a log-spaced
//! temperature grid ([`rate_tables`]), supplied once by a table source: a
//! JSON file, an in-memory map or the closed-form fits of [`analytic_tables`].

/// Reaction, cooling and adiabatic-index tables on the temperature grid, plus
/// the [`rate_tables::TableSource`] trait used to fill them.
pub mod rate_tables;
/// Closed-form rate fits used when no table file is available.
pub mod analytic_tables;
/// Species ordering, per-species constants, charge neutrality.
pub mod species;
/// Newton solve of `e(T) = ge` with a selectable iteration policy.
pub mod temperature_solver;
/// Linear interpolation of every coefficient and its temperature slope.
pub mod rate_interpolator;
/// Mass density and escape probabilities.
pub mod derived_quantities;
/// The network as data: reactions and mass-action cooling channels.
pub mod reaction_terms;
/// Net heating rate and its gradient.
pub mod energy_equation;
/// Per-cell right-hand side generated from the reaction table.
pub mod rhs_assembler;
/// Fixed CSR sparsity pattern and the analytic Jacobian.
pub mod jacobian_assembler;
/// Error taxonomy and the integer status convention.
pub mod network_error;
/// `PrimordialNetwork`, `StripContext`, `ScaleVector`: what an integrator calls.
pub mod network_api;
mod temperature_solver_tests;
