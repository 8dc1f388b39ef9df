//! # Loss Details
//!
//! Result records produced by the engine.
//!
//! ```text
//! SectionLossRecord (one per analysis point)
//! ├── friction: FrictionLosses (per duct, solved once)
//! └── steps: Vec<TimeStepDetail> (one per interval, append-only)
//!     ├── section: TransformedSection
//!     ├── girder / deck: ConcreteStep
//!     ├── rebar: Vec<RebarStep>
//!     ├── strands / tendons: Vec<PrestressStep>
//!     ├── product: ByProduct<ProductForce>
//!     └── external / internal: EquilibriumTotals
//! ```
//!
//! Every accumulated quantity is a [`Tracked`] pair. Cumulative values are
//! only ever written as `previous.cumulative + incremental`, so
//! `steps[j].cumulative == steps[j - 1].cumulative + steps[j].incremental`
//! holds exactly.

use serde::{Deserialize, Serialize};

use crate::collaborators::{NetSection, PrestressSteel, RebarLocation};
use crate::intervals::{IntervalIndex, IntervalTimes};
use crate::keys::{DuctKey, MemberEnd};
use crate::loads::{ByEffect, ByProduct};
use crate::poi::AnalysisPoint;

// =============================================================================
// TRACKED VALUES
// =============================================================================

/// Incremental value for one interval and its running total
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Tracked {
    pub incremental: f64,
    pub cumulative: f64,
}

impl Tracked {
    pub fn advance(previous: &Tracked, incremental: f64) -> Tracked {
        Tracked {
            incremental,
            cumulative: previous.cumulative + incremental,
        }
    }

    /// Add to the increment; the total is written by [`Tracked::settle`]
    pub fn add(&mut self, delta: f64) {
        self.incremental += delta;
    }

    pub fn settle(&mut self, previous: &Tracked) {
        self.cumulative = previous.cumulative + self.incremental;
    }

    /// Exact causality check against the previous interval
    pub fn follows(&self, previous: &Tracked) -> bool {
        self.cumulative == previous.cumulative + self.incremental
    }
}

/// Axial force and moment increment of one constituent for one product type
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ForceIncrement {
    pub axial: f64,
    pub moment: f64,
}

/// Unrestrained strain and curvature
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FreeDeformation {
    pub strain: f64,
    pub curvature: f64,
}

/// Restraining axial force and moment
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Restraint {
    pub axial: f64,
    pub moment: f64,
}

// =============================================================================
// CONSTITUENTS
// =============================================================================

/// Stress range at the faces of a concrete part under live load
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FaceStressRange {
    pub top_min: f64,
    pub top_max: f64,
    pub bottom_min: f64,
    pub bottom_max: f64,
}

/// Girder or deck concrete at one interval
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ConcreteStep {
    pub active: bool,
    pub modulus: f64,
    pub age_adjusted_modulus: f64,
    pub section: NetSection,
    /// Free creep deformation over the interval from all earlier loading
    pub creep: FreeDeformation,
    /// Free shrinkage deformation over the interval
    pub shrinkage: FreeDeformation,
    /// Own restraining force, about the part's centroid
    pub restraint: ByEffect<Restraint>,
    pub product: ByProduct<ForceIncrement>,
    pub axial: Tracked,
    pub moment: Tracked,
    pub strain: Tracked,
    pub curvature: Tracked,
    pub top_stress: Tracked,
    pub bottom_stress: Tracked,
    pub live_load: Option<FaceStressRange>,
}

impl ConcreteStep {
    pub fn axial_stiffness(&self) -> f64 {
        if self.active {
            self.age_adjusted_modulus * self.section.area
        } else {
            0.0
        }
    }

    pub fn flexural_stiffness(&self) -> f64 {
        if self.active {
            self.age_adjusted_modulus * self.section.inertia
        } else {
            0.0
        }
    }

    fn tracked(&self) -> [(&'static str, &Tracked); 6] {
        [
            ("axial", &self.axial),
            ("moment", &self.moment),
            ("strain", &self.strain),
            ("curvature", &self.curvature),
            ("top_stress", &self.top_stress),
            ("bottom_stress", &self.bottom_stress),
        ]
    }

    fn tracked_mut(&mut self) -> [&mut Tracked; 6] {
        [
            &mut self.axial,
            &mut self.moment,
            &mut self.strain,
            &mut self.curvature,
            &mut self.top_stress,
            &mut self.bottom_stress,
        ]
    }
}

/// A mild reinforcement row at one interval
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RebarStep {
    pub location: RebarLocation,
    pub active: bool,
    pub modulus: f64,
    pub area: f64,
    pub y: f64,
    pub product: ByProduct<ForceIncrement>,
    pub axial: Tracked,
    pub strain: Tracked,
    pub stress: Tracked,
}

impl RebarStep {
    pub fn axial_stiffness(&self) -> f64 {
        if self.active {
            self.modulus * self.area
        } else {
            0.0
        }
    }

    fn tracked(&self) -> [(&'static str, &Tracked); 3] {
        [("axial", &self.axial), ("strain", &self.strain), ("stress", &self.stress)]
    }

    fn tracked_mut(&mut self) -> [&mut Tracked; 3] {
        [&mut self.axial, &mut self.strain, &mut self.stress]
    }
}

/// Live-load elastic effect on prestressing steel
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PrestressLiveLoad {
    pub stress_change_min: f64,
    pub stress_change_max: f64,
    pub fpe_min: f64,
    pub fpe_max: f64,
    pub loss_min: f64,
    pub loss_max: f64,
}

/// A strand constituent or a tendon at one interval
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrestressStep {
    pub steel: PrestressSteel,
    /// Row index for discretized strands, 0 otherwise
    pub row: usize,
    pub y: f64,
    /// Area effective at this point
    pub area: f64,
    pub modulus: f64,
    /// Jacked at or before this interval
    pub stressed: bool,
    /// Part of the transformed section
    pub bonded: bool,
    /// Jacking stress
    pub fpj: f64,
    /// Stress at this point immediately after jacking
    pub initial_stress: f64,
    pub jacking_force: f64,
    /// Intrinsic relaxation over this interval
    pub relaxation: f64,
    /// Restraining force from relaxation
    pub restraint: f64,
    pub product: ByProduct<ForceIncrement>,
    pub axial: Tracked,
    pub strain: Tracked,
    pub loss: Tracked,
    /// Effective prestress
    pub fpe: f64,
    pub effective_force: f64,
    pub live_load: Option<PrestressLiveLoad>,
}

impl PrestressStep {
    pub fn axial_stiffness(&self) -> f64 {
        if self.bonded {
            self.modulus * self.area
        } else {
            0.0
        }
    }

    fn tracked(&self) -> [(&'static str, &Tracked); 3] {
        [("axial", &self.axial), ("strain", &self.strain), ("loss", &self.loss)]
    }

    fn tracked_mut(&mut self) -> [&mut Tracked; 3] {
        [&mut self.axial, &mut self.strain, &mut self.loss]
    }
}

// =============================================================================
// SECTION
// =============================================================================

/// Age-adjusted transformed composite section
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TransformedSection {
    /// Σ E·A
    pub axial_stiffness: f64,
    /// Σ E·(I + A·(y - centroid)²)
    pub flexural_stiffness: f64,
    pub centroid: f64,
    /// Area transformed to girder concrete
    pub area: f64,
    /// Moment of inertia transformed to girder concrete
    pub inertia: f64,
}

/// Incremental and cumulative section force of one product type
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ProductForce {
    pub axial: Tracked,
    pub moment: Tracked,
    pub shear: Tracked,
}

/// Running axial and moment totals for the equilibrium check
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct EquilibriumTotals {
    pub axial: Tracked,
    pub moment: Tracked,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MomentRange {
    pub min: f64,
    pub max: f64,
}

/// State of one analysis point at the end of one interval
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeStepDetail {
    pub interval: IntervalIndex,
    pub times: IntervalTimes,
    /// The section exists (released, or closure made composite)
    pub active: bool,
    pub section: TransformedSection,
    pub girder: ConcreteStep,
    pub deck: ConcreteStep,
    pub rebar: Vec<RebarStep>,
    pub strands: Vec<PrestressStep>,
    pub tendons: Vec<PrestressStep>,
    pub product: ByProduct<ProductForce>,
    /// Restraining force Pr and moment Mr about the composite centroid
    pub restraint: ByEffect<Restraint>,
    /// Restraint over the composite stiffness, Pr/EA and Mr/EI
    pub initial_strain: ByEffect<FreeDeformation>,
    pub external: EquilibriumTotals,
    pub internal: EquilibriumTotals,
    pub equilibrium_ok: bool,
    pub live_load: Option<MomentRange>,
}

impl TimeStepDetail {
    /// Every tracked quantity, labeled, in a fixed order
    pub fn tracked_values(&self) -> Vec<(String, Tracked)> {
        let mut values = Vec::new();
        let mut push = |prefix: String, items: &[(&'static str, &Tracked)]| {
            values.extend(items.iter().map(|(name, t)| (format!("{prefix}.{name}"), **t)));
        };
        push("girder".to_string(), &self.girder.tracked());
        push("deck".to_string(), &self.deck.tracked());
        for (i, rebar) in self.rebar.iter().enumerate() {
            push(format!("rebar[{i}]"), &rebar.tracked());
        }
        for (i, strand) in self.strands.iter().enumerate() {
            push(format!("strands[{i}]"), &strand.tracked());
        }
        for (i, tendon) in self.tendons.iter().enumerate() {
            push(format!("tendons[{i}]"), &tendon.tracked());
        }
        for (product, force) in self.product.iter() {
            push(
                format!("product.{}", product.code()),
                &[("axial", &force.axial), ("moment", &force.moment), ("shear", &force.shear)],
            );
        }
        push(
            "external".to_string(),
            &[("axial", &self.external.axial), ("moment", &self.external.moment)],
        );
        push(
            "internal".to_string(),
            &[("axial", &self.internal.axial), ("moment", &self.internal.moment)],
        );
        values
    }

    /// Mutable view of the same values, in the same order as
    /// [`TimeStepDetail::tracked_values`]
    fn tracked_mut(&mut self) -> Vec<&mut Tracked> {
        let TimeStepDetail {
            girder,
            deck,
            rebar,
            strands,
            tendons,
            product,
            external,
            internal,
            ..
        } = self;
        let mut values: Vec<&mut Tracked> = Vec::new();
        values.extend(girder.tracked_mut());
        values.extend(deck.tracked_mut());
        for r in rebar.iter_mut() {
            values.extend(r.tracked_mut());
        }
        for s in strands.iter_mut() {
            values.extend(s.tracked_mut());
        }
        for t in tendons.iter_mut() {
            values.extend(t.tracked_mut());
        }
        for force in product.0.iter_mut() {
            values.extend([&mut force.axial, &mut force.moment, &mut force.shear]);
        }
        values.extend([&mut external.axial, &mut external.moment]);
        values.extend([&mut internal.axial, &mut internal.moment]);
        values
    }

    /// Write every cumulative value as previous cumulative plus increment
    pub fn settle(&mut self, previous: Option<&TimeStepDetail>) {
        let prior: Vec<Tracked> = previous
            .map(|p| p.tracked_values().into_iter().map(|(_, t)| t).collect())
            .unwrap_or_default();
        for (i, tracked) in self.tracked_mut().into_iter().enumerate() {
            let before = prior.get(i).copied().unwrap_or_default();
            tracked.settle(&before);
        }
    }

    /// Names of tracked values that break causality with `previous`
    pub fn causality_violations(&self, previous: Option<&TimeStepDetail>) -> Vec<String> {
        let prior: Vec<Tracked> = previous
            .map(|p| p.tracked_values().into_iter().map(|(_, t)| t).collect())
            .unwrap_or_default();
        self.tracked_values()
            .into_iter()
            .enumerate()
            .filter(|(i, (_, t))| !t.follows(&prior.get(*i).copied().unwrap_or_default()))
            .map(|(_, (name, _))| name)
            .collect()
    }
}

// =============================================================================
// FRICTION AND ANCHOR SET
// =============================================================================

/// Friction and anchor-set loss of one duct at one analysis point
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FrictionLossDetail {
    pub on_duct: bool,
    /// Member coordinate of the point
    pub position: f64,
    /// Distance from the controlling jacking end
    pub distance: f64,
    /// Angular change from the controlling jacking end
    pub angular_change: f64,
    pub friction_loss: f64,
    pub anchor_set_loss: f64,
}

impl FrictionLossDetail {
    /// Zero-filled placeholder for a point the duct does not reach
    pub fn off_duct(position: f64) -> Self {
        FrictionLossDetail {
            position,
            ..Default::default()
        }
    }

    pub fn total_loss(&self) -> f64 {
        self.friction_loss + self.anchor_set_loss
    }
}

/// Friction details of every duct at an analysis point
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FrictionLosses {
    pub segment: Vec<FrictionLossDetail>,
    pub girder: Vec<FrictionLossDetail>,
}

impl FrictionLosses {
    /// Segment ducts followed by girder ducts
    pub fn all(&self) -> impl Iterator<Item = &FrictionLossDetail> {
        self.segment.iter().chain(self.girder.iter())
    }
}

/// Anchor-set solution at one end of a duct
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AnchorSetEnd {
    pub jacked: bool,
    /// Length of the seating zone, Xset
    pub seating_length: f64,
    /// Loss at the anchorage, dfpAT
    pub anchorage_loss: f64,
    /// Residual loss when the seating zone passes the zero-movement point, dfpS
    pub short_tendon_loss: f64,
    /// Distance from this end to the point of zero movement
    pub zero_movement: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnchorSetDetail {
    pub duct: DuctKey,
    pub ends: [AnchorSetEnd; 2],
}

impl AnchorSetDetail {
    pub fn end(&self, end: MemberEnd) -> &AnchorSetEnd {
        &self.ends[end.index()]
    }
}

// =============================================================================
// RECORDS
// =============================================================================

/// All results at one analysis point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionLossRecord {
    pub point: AnalysisPoint,
    pub friction: FrictionLosses,
    pub steps: Vec<TimeStepDetail>,
}

impl SectionLossRecord {
    pub fn new(point: AnalysisPoint, friction: FrictionLosses) -> Self {
        SectionLossRecord {
            point,
            friction,
            steps: Vec::new(),
        }
    }
}

/// Response of a loss request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LossRecord {
    /// The point that was asked for
    pub requested: AnalysisPoint,
    /// The cataloged point whose results are returned
    pub source: AnalysisPoint,
    /// Results come from the nearest point rather than the requested one
    pub approximated: bool,
    pub interval: IntervalIndex,
    pub friction: FrictionLosses,
    pub detail: TimeStepDetail,
}
