//! Equilibrium between the product forces applied to a section and the
//! forces carried by its constituents.

use serde::{Deserialize, Serialize};

use crate::details::{ForceIncrement, TimeStepDetail};

/// Relative comparison, scaled by the larger magnitude but never below one
pub fn balanced(a: f64, b: f64, tolerance: f64) -> bool {
    (a - b).abs() <= tolerance * 1.0_f64.max(a.abs()).max(b.abs())
}

/// Applied and resisted force increments of one interval.
///
/// The applied side is the sum of the sustained product increments. The
/// resisted side sums each constituent's axial increment and its moment
/// about the transformed centroid.
pub fn increments(detail: &TimeStepDetail) -> (ForceIncrement, ForceIncrement) {
    let mut external = ForceIncrement::default();
    for (product, force) in detail.product.iter() {
        if product.is_sustained() {
            external.axial += force.axial.incremental;
            external.moment += force.moment.incremental;
        }
    }

    let ytr = detail.section.centroid;
    let mut internal = ForceIncrement::default();
    for concrete in [&detail.girder, &detail.deck] {
        internal.axial += concrete.axial.incremental;
        internal.moment += concrete.moment.incremental + concrete.axial.incremental * (concrete.section.centroid - ytr);
    }
    for rebar in &detail.rebar {
        internal.axial += rebar.axial.incremental;
        internal.moment += rebar.axial.incremental * (rebar.y - ytr);
    }
    for steel in detail.strands.iter().chain(detail.tendons.iter()) {
        internal.axial += steel.axial.incremental;
        internal.moment += steel.axial.incremental * (steel.y - ytr);
    }

    (external, internal)
}

/// Outcome of the equilibrium check at one point and interval
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EquilibriumCheck {
    pub incremental_axial: bool,
    pub incremental_moment: bool,
    pub cumulative_axial: bool,
    pub cumulative_moment: bool,
    /// Cumulative external axial force against the sum of the constituents'
    /// cumulative axial forces
    pub constituent_axial: bool,
}

impl EquilibriumCheck {
    pub fn is_balanced(&self) -> bool {
        self.incremental_axial
            && self.incremental_moment
            && self.cumulative_axial
            && self.cumulative_moment
            && self.constituent_axial
    }
}

/// Check a settled detail
pub fn check(detail: &TimeStepDetail, tolerance: f64) -> EquilibriumCheck {
    let external = &detail.external;
    let internal = &detail.internal;

    let constituents: f64 = detail.girder.axial.cumulative
        + detail.deck.axial.cumulative
        + detail.rebar.iter().map(|r| r.axial.cumulative).sum::<f64>()
        + detail
            .strands
            .iter()
            .chain(detail.tendons.iter())
            .map(|s| s.axial.cumulative)
            .sum::<f64>();

    EquilibriumCheck {
        incremental_axial: balanced(external.axial.incremental, internal.axial.incremental, tolerance),
        incremental_moment: balanced(external.moment.incremental, internal.moment.incremental, tolerance),
        cumulative_axial: balanced(external.axial.cumulative, internal.axial.cumulative, tolerance),
        cumulative_moment: balanced(external.moment.cumulative, internal.moment.cumulative, tolerance),
        constituent_axial: balanced(external.axial.cumulative, constituents, tolerance),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_balanced_is_relative() {
        assert!(balanced(1.0e6, 1.0e6 + 0.5, 1.0e-6));
        assert!(!balanced(1.0e6, 1.0e6 + 5.0, 1.0e-6));
        // Small values compare absolutely
        assert!(balanced(0.0, 5.0e-7, 1.0e-6));
        assert!(!balanced(0.0, 5.0e-6, 1.0e-6));
    }
}
