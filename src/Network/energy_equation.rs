//! Net heating rate of the gas, erg/cm^3/s, and its analytic gradient.
//!
//! ```text
//! Λ = − 2.01588 · n(H2) · c_cie · P_cie · ρ                         CIE continuum
//!     − n(H2) · P_cie · P_h2 · L_lte / (L_lte/L_ldl + 1)               H2 lines
//!     − P_cie · Σ_j c_j Π n                                            mass-action losses
//!     − P_cie · c_comp · n_e · (1+z)^4 · (T − 2.73 (1+z))              Compton
//!     + ½ (−n(H2) n(H) c_mcool + n(H)^3 c_mheat) · n_d / (n_cr + n_d)   H2 formation
//! ```
//!
//! with `L_ldl = Σ ga_x n_x` over H2, H, H+, He and electrons,
//! `n_d = n(H2) ncrd2 + n(H) ncrd1`, `P_cie`/`P_h2` the escape probabilities and
//! `ρ` the cached mass density. The cached quantities are treated as constants
//! when differentiating; temperature dependence enters only through the
//! coefficient slopes and the explicit `T` of the Compton term.
use crate::Network::rate_interpolator::CellRates;
use crate::Network::rate_tables::Cooling;
use crate::Network::reaction_terms::COOLING_TERMS;
use crate::Network::rhs_assembler::CellEnvironment;
use crate::Network::species::{NCHEM, Species};

/// mass of an H2 molecule in units of mH
const CIE_MASS_FACTOR: f64 = 2.01588;
/// CMB temperature today, K
const T_CMB: f64 = 2.73;

/// Partial derivatives of the heating rate with respect to the species
/// amounts and to temperature.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnergyGradient {
    pub d_species: [f64; NCHEM],
    pub d_temperature: f64,
}

fn n(cell: &[f64; NCHEM], s: Species) -> f64 {
    cell[s.index()]
}

/// (low-density-limit line cooling, its T slope)
fn h2_low_density_limit(cell: &[f64; NCHEM], r: &CellRates) -> (f64, f64) {
    let partners = [
        (Species::H2I, Cooling::GaH2),
        (Species::HI, Cooling::GaHI),
        (Species::HII, Cooling::GaHp),
        (Species::HeI, Cooling::GaHe),
        (Species::Electron, Cooling::GaEl),
    ];
    partners.iter().fold((0.0, 0.0), |(v, dv), (s, c)| {
        (v + n(cell, *s) * r.c(*c), dv + n(cell, *s) * r.dc(*c))
    })
}

fn line_partner_rate(s: Species) -> Option<Cooling> {
    match s {
        Species::H2I => Some(Cooling::GaH2),
        Species::HI => Some(Cooling::GaHI),
        Species::HII => Some(Cooling::GaHp),
        Species::HeI => Some(Cooling::GaHe),
        Species::Electron => Some(Cooling::GaEl),
        _ => None,
    }
}

fn redshift_factors(redshift: f64) -> (f64, f64) {
    let z1 = redshift + 1.0;
    (z1.powi(4), T_CMB * z1)
}

pub fn heating_rate(cell: &[f64; NCHEM], env: &CellEnvironment) -> f64 {
    let r = &env.rates;
    let cie = env.derived.cie_optical_depth;
    let h2 = n(cell, Species::H2I);
    let hi = n(cell, Species::HI);
    let de = n(cell, Species::Electron);

    let continuum = -CIE_MASS_FACTOR * h2 * r.c(Cooling::CieCo) * cie * env.derived.mdensity;

    let lte = r.c(Cooling::H2Lte);
    let (ldl, _) = h2_low_density_limit(cell, r);
    let lines = -h2 * cie * lte * env.derived.h2_optical_depth / (lte / ldl + 1.0);

    let losses: f64 = COOLING_TERMS
        .iter()
        .map(|t| r.c(t.rate) * t.mass_action(cell))
        .sum();

    let (z4, t_cmb) = redshift_factors(env.redshift);
    let compton = -cie * r.c(Cooling::Compton) * de * z4 * (env.thermal.temperature - t_cmb);

    let formation_balance = -h2 * hi * r.c(Cooling::H2mCool) + hi.powi(3) * r.c(Cooling::H2mHeat);
    let nd = h2 * r.c(Cooling::NcrD2) + hi * r.c(Cooling::NcrD1);
    // n_d/(n_cr + n_d) stays finite when there is no H and no H2
    let formation = 0.5 * formation_balance * nd / (r.c(Cooling::NcrN) + nd);

    continuum + lines - cie * losses + compton + formation
}

pub fn heating_gradient(cell: &[f64; NCHEM], env: &CellEnvironment) -> EnergyGradient {
    let r = &env.rates;
    let cie = env.derived.cie_optical_depth;
    let h2_opt = env.derived.h2_optical_depth;
    let mdensity = env.derived.mdensity;
    let t = env.thermal.temperature;
    let h2 = n(cell, Species::H2I);
    let hi = n(cell, Species::HI);
    let de = n(cell, Species::Electron);
    let mut d = [0.0; NCHEM];
    let mut dt = 0.0;

    // CIE continuum
    d[Species::H2I.index()] -= CIE_MASS_FACTOR * r.c(Cooling::CieCo) * cie * mdensity;
    dt -= CIE_MASS_FACTOR * h2 * r.dc(Cooling::CieCo) * cie * mdensity;

    // H2 lines: L = lte·ldl/(lte + ldl)
    let lte = r.c(Cooling::H2Lte);
    let dlte = r.dc(Cooling::H2Lte);
    let (ldl, dldl) = h2_low_density_limit(cell, r);
    let sum = lte + ldl;
    let damping = cie * h2_opt;
    d[Species::H2I.index()] -= damping * lte * ldl / sum;
    let dl_dldl = lte * lte / (sum * sum);
    for s in Species::ALL {
        if let Some(c) = line_partner_rate(s) {
            d[s.index()] -= damping * h2 * dl_dldl * r.c(c);
        }
    }
    dt -= damping * h2 * (ldl * ldl * dlte + lte * lte * dldl) / (sum * sum);

    // mass-action losses
    for term in COOLING_TERMS.iter() {
        let k = r.c(term.rate);
        for (i, s) in term.factors.iter().enumerate() {
            // repeated factors are summed inside the derivative
            if term.factors[..i].contains(s) {
                continue;
            }
            d[s.index()] -= cie * k * term.mass_action_derivative(cell, *s);
        }
        dt -= cie * r.dc(term.rate) * term.mass_action(cell);
    }

    // Compton
    let (z4, t_cmb) = redshift_factors(env.redshift);
    let comp = r.c(Cooling::Compton);
    d[Species::Electron.index()] -= cie * comp * z4 * (t - t_cmb);
    dt -= cie * z4 * de * (r.dc(Cooling::Compton) * (t - t_cmb) + comp);

    // H2 formation: F = ½ P·g, g = nd/(ncrn + nd)
    let mcool = r.c(Cooling::H2mCool);
    let mheat = r.c(Cooling::H2mHeat);
    let ncrn = r.c(Cooling::NcrN);
    let ncrd1 = r.c(Cooling::NcrD1);
    let ncrd2 = r.c(Cooling::NcrD2);
    let p = -h2 * hi * mcool + hi.powi(3) * mheat;
    let nd = h2 * ncrd2 + hi * ncrd1;
    let denom = ncrn + nd;
    let g = nd / denom;
    // dg = (ncrn·dnd − nd·dncrn)/denom²
    let formation = |dp: f64, dnd: f64, dncrn: f64| {
        0.5 * (dp * g + p * (ncrn * dnd - nd * dncrn) / (denom * denom))
    };
    d[Species::H2I.index()] += formation(-hi * mcool, ncrd2, 0.0);
    d[Species::HI.index()] += formation(-h2 * mcool + 3.0 * hi * hi * mheat, ncrd1, 0.0);
    let dp_dt = -h2 * hi * r.dc(Cooling::H2mCool) + hi.powi(3) * r.dc(Cooling::H2mHeat);
    let dnd_dt = h2 * r.dc(Cooling::NcrD2) + hi * r.dc(Cooling::NcrD1);
    dt += formation(dp_dt, dnd_dt, r.dc(Cooling::NcrN));

    EnergyGradient {
        d_species: d,
        d_temperature: dt,
    }
}
