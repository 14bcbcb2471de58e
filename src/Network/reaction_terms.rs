//! The primordial network written down as data.
//!
//! Each reaction is a mass-action term `k(T) · Π reactants`; the net change of
//! a species is its count among the products minus its count among the
//! reactants. Both the right-hand side and every species row of the Jacobian
//! are generated by walking [`REACTIONS`], so adding a channel here is enough
//! to keep the two consistent.
//!
//! | rate | reaction |
//! |------|----------|
//! | k01 | H + e → H+ + 2e |
//! | k02 | H+ + e → H + γ |
//! | k03 | He + e → He+ + 2e |
//! | k04 | He+ + e → He + γ |
//! | k05 | He+ + e → He++ + 2e |
//! | k06 | He++ + e → He+ + γ |
//! | k07 | H + e → H- + γ |
//! | k08 | H + H- → H2 + e |
//! | k09 | H + H+ → H2+ + γ |
//! | k10 | H2+ + H → H2 + H+ |
//! | k11 | H2 + H+ → H2+ + H |
//! | k12 | H2 + e → 2H + e |
//! | k13 | H2 + H → 3H |
//! | k14 | H- + e → H + 2e |
//! | k15 | H- + H → 2H + e |
//! | k16 | H- + H+ → 2H |
//! | k17 | H- + H+ → H2+ + e |
//! | k18 | H2+ + e → 2H |
//! | k19 | H2+ + H- → H2 + H |
//! | k21 | 2H + H2 → 2H2 |
//! | k22 | 3H → H2 + H |
use crate::Network::rate_tables::{Cooling, Reaction};
use crate::Network::species::{NCHEM, Species};

use Species::{Electron as E, H2I, H2II, HI, HII, HM, HeI, HeII, HeIII};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReactionTerm {
    pub rate: Reaction,
    pub reactants: &'static [Species],
    pub products: &'static [Species],
}

impl ReactionTerm {
    /// products minus reactants for `species`
    pub fn net_change(&self, species: Species) -> f64 {
        let made = self.products.iter().filter(|s| **s == species).count();
        let used = self.reactants.iter().filter(|s| **s == species).count();
        made as f64 - used as f64
    }

    /// `(species, net change)` for every species the reaction changes
    pub fn changes(&self) -> impl Iterator<Item = (Species, f64)> + '_ {
        Species::ALL
            .into_iter()
            .map(move |s| (s, self.net_change(s)))
            .filter(|(_, nu)| *nu != 0.0)
    }

    /// Π reactants
    #[inline]
    pub fn mass_action(&self, cell: &[f64; NCHEM]) -> f64 {
        self.reactants.iter().map(|s| cell[s.index()]).product()
    }

    /// ∂(Π reactants)/∂species
    pub fn mass_action_derivative(&self, cell: &[f64; NCHEM], species: Species) -> f64 {
        product_derivative(self.reactants, cell, species)
    }
}

/// Derivative of `Π factors` with respect to one species, allowing repeats.
pub fn product_derivative(factors: &[Species], cell: &[f64; NCHEM], species: Species) -> f64 {
    let mut total = 0.0;
    for (skip, s) in factors.iter().enumerate() {
        if *s != species {
            continue;
        }
        total += factors
            .iter()
            .enumerate()
            .filter(|(j, _)| *j != skip)
            .map(|(_, f)| cell[f.index()])
            .product::<f64>();
    }
    total
}

pub const REACTIONS: [ReactionTerm; Reaction::COUNT] = [
    ReactionTerm { rate: Reaction::K01, reactants: &[HI, E], products: &[HII, E, E] },
    ReactionTerm { rate: Reaction::K02, reactants: &[HII, E], products: &[HI] },
    ReactionTerm { rate: Reaction::K03, reactants: &[HeI, E], products: &[HeII, E, E] },
    ReactionTerm { rate: Reaction::K04, reactants: &[HeII, E], products: &[HeI] },
    ReactionTerm { rate: Reaction::K05, reactants: &[HeII, E], products: &[HeIII, E, E] },
    ReactionTerm { rate: Reaction::K06, reactants: &[HeIII, E], products: &[HeII] },
    ReactionTerm { rate: Reaction::K07, reactants: &[HI, E], products: &[HM] },
    ReactionTerm { rate: Reaction::K08, reactants: &[HI, HM], products: &[H2I, E] },
    ReactionTerm { rate: Reaction::K09, reactants: &[HI, HII], products: &[H2II] },
    ReactionTerm { rate: Reaction::K10, reactants: &[H2II, HI], products: &[H2I, HII] },
    ReactionTerm { rate: Reaction::K11, reactants: &[H2I, HII], products: &[H2II, HI] },
    ReactionTerm { rate: Reaction::K12, reactants: &[H2I, E], products: &[HI, HI, E] },
    ReactionTerm { rate: Reaction::K13, reactants: &[H2I, HI], products: &[HI, HI, HI] },
    ReactionTerm { rate: Reaction::K14, reactants: &[HM, E], products: &[HI, E, E] },
    ReactionTerm { rate: Reaction::K15, reactants: &[HM, HI], products: &[HI, HI, E] },
    ReactionTerm { rate: Reaction::K16, reactants: &[HM, HII], products: &[HI, HI] },
    ReactionTerm { rate: Reaction::K17, reactants: &[HM, HII], products: &[H2II, E] },
    ReactionTerm { rate: Reaction::K18, reactants: &[H2II, E], products: &[HI, HI] },
    ReactionTerm { rate: Reaction::K19, reactants: &[H2II, HM], products: &[H2I, HI] },
    ReactionTerm { rate: Reaction::K21, reactants: &[H2I, HI, HI], products: &[H2I, H2I] },
    ReactionTerm { rate: Reaction::K22, reactants: &[HI, HI, HI], products: &[H2I, HI] },
];

/// Mass-action cooling channel `coefficient · c(T) · Π factors`, erg/cm^3/s.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoolingTerm {
    pub rate: Cooling,
    pub coefficient: f64,
    pub factors: &'static [Species],
}

/// Collisional excitation, collisional ionisation, recombination and
/// bremsstrahlung losses. Every one of them is damped by the CIE escape
/// probability.
pub const COOLING_TERMS: [CoolingTerm; 14] = [
    CoolingTerm { rate: Cooling::CeHI, coefficient: 1.0, factors: &[HI, E] },
    CoolingTerm { rate: Cooling::CiHI, coefficient: 1.0, factors: &[HI, E] },
    CoolingTerm { rate: Cooling::ReHII, coefficient: 1.0, factors: &[HII, E] },
    CoolingTerm { rate: Cooling::CiHeI, coefficient: 1.0, factors: &[HeI, E] },
    CoolingTerm { rate: Cooling::CeHeII, coefficient: 1.0, factors: &[HeII, E] },
    CoolingTerm { rate: Cooling::CiHeII, coefficient: 1.0, factors: &[HeII, E] },
    CoolingTerm { rate: Cooling::ReHeII1, coefficient: 1.0, factors: &[HeII, E] },
    CoolingTerm { rate: Cooling::ReHeII2, coefficient: 1.0, factors: &[HeII, E] },
    // three-body channels from the He triplet
    CoolingTerm { rate: Cooling::CeHeI, coefficient: 1.0, factors: &[HeII, E, E] },
    CoolingTerm { rate: Cooling::CiHeIS, coefficient: 1.0, factors: &[HeII, E, E] },
    CoolingTerm { rate: Cooling::ReHeIII, coefficient: 1.0, factors: &[HeIII, E] },
    CoolingTerm { rate: Cooling::Brem, coefficient: 1.0, factors: &[HII, E] },
    CoolingTerm { rate: Cooling::Brem, coefficient: 1.0, factors: &[HeII, E] },
    CoolingTerm { rate: Cooling::Brem, coefficient: 4.0, factors: &[HeIII, E] },
];

impl CoolingTerm {
    #[inline]
    pub fn mass_action(&self, cell: &[f64; NCHEM]) -> f64 {
        self.coefficient * self.factors.iter().map(|s| cell[s.index()]).product::<f64>()
    }

    pub fn mass_action_derivative(&self, cell: &[f64; NCHEM], species: Species) -> f64 {
        self.coefficient * product_derivative(self.factors, cell, species)
    }
}

/// Species (columns) each species row of the Jacobian depends on, derived
/// from the reaction table. The energy column is not included.
pub fn species_dependencies(row: Species) -> Vec<Species> {
    let mut deps: Vec<Species> = Vec::new();
    for term in REACTIONS.iter().filter(|t| t.net_change(row) != 0.0) {
        for s in term.reactants {
            if !deps.contains(s) {
                deps.push(*s);
            }
        }
    }
    deps.sort_by_key(|s| s.index());
    deps
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_reactions_conserve_charge_and_mass() {
        for term in REACTIONS.iter() {
            let charge: f64 = Species::ALL
                .iter()
                .map(|s| term.net_change(*s) * s.charge())
                .sum();
            // electrons carry -1, which the charge() table leaves at zero
            let electrons = term.net_change(Species::Electron);
            assert_relative_eq!(charge - electrons, 0.0, epsilon = 1e-12);
            let protons: f64 = [H2I, H2II, HI, HII, HM]
                .iter()
                .map(|s| term.net_change(*s) * if s.is_molecular() { 2.0 } else { 1.0 })
                .sum();
            assert_eq!(protons, 0.0, "{:?}", term.rate);
            let helium: f64 = [HeI, HeII, HeIII].iter().map(|s| term.net_change(*s)).sum();
            assert_eq!(helium, 0.0, "{:?}", term.rate);
        }
    }

    #[test]
    fn test_reaction_order_matches_rate_order() {
        for (i, term) in REACTIONS.iter().enumerate() {
            assert_eq!(term.rate.index(), i);
        }
    }

    #[test]
    fn test_three_body_net_changes() {
        let k21 = &REACTIONS[Reaction::K21.index()];
        assert_eq!(k21.net_change(H2I), 1.0);
        assert_eq!(k21.net_change(HI), -2.0);
        let k22 = &REACTIONS[Reaction::K22.index()];
        assert_eq!(k22.net_change(H2I), 1.0);
        assert_eq!(k22.net_change(HI), -2.0);
        let k12 = &REACTIONS[Reaction::K12.index()];
        assert_eq!(k12.net_change(E), 0.0);
    }

    #[test]
    fn test_product_derivative_with_repeats() {
        let mut cell = [0.0; NCHEM];
        cell[HI.index()] = 3.0;
        cell[H2I.index()] = 2.0;
        // d(H2 H H)/dH = 2 H2 H
        assert_eq!(product_derivative(&[H2I, HI, HI], &cell, HI), 12.0);
        // d(H^3)/dH = 3 H^2
        assert_eq!(product_derivative(&[HI, HI, HI], &cell, HI), 27.0);
        assert_eq!(product_derivative(&[HI, HI, HI], &cell, HeI), 0.0);
    }
}
