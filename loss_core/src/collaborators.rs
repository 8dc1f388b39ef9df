//! # Collaborator Interfaces
//!
//! The engine computes losses but owns none of the bridge description. It
//! reads topology, section properties, materials, prestressing geometry and
//! the interval schedule through the traits below, and delegates the
//! linear-elastic structural solve to [`StructuralAnalysis`].
//!
//! A [`Collaborators`] bundle borrows one implementation of each trait for
//! the duration of a single engine call. Nothing is retained between calls.
//!
//! ## Sign conventions
//!
//! - `y` is measured downward from the top of the girder for every
//!   constituent; deck constituents have negative `y`
//! - axial force and stress are positive in tension
//! - moment is positive in sagging (bottom fiber in tension)

use serde::{Deserialize, Serialize};

use crate::errors::LossResult;
use crate::intervals::{IntervalIndex, IntervalSchedule};
use crate::keys::{DuctKey, GirderKey, GirderLineKey, JackingEnd, MemberEnd, MemberKey, SegmentKey};
use crate::loads::{ProductForceType, TimeEffect};
use crate::poi::AnalysisPoint;

// =============================================================================
// SECTION DATA
// =============================================================================

/// Which net (non-composite) section is requested
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SectionBasis {
    NetGirder,
    NetDeck,
}

/// Net section properties of a concrete part
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct NetSection {
    pub area: f64,
    pub inertia: f64,
    /// Centroid, measured down from the top of the girder
    pub centroid: f64,
    /// Top face, measured down from the top of the girder
    pub top: f64,
    /// Bottom face, measured down from the top of the girder
    pub bottom: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RebarLocation {
    Girder,
    Deck,
}

/// A row of longitudinal mild reinforcement
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RebarRow {
    pub location: RebarLocation,
    pub area: f64,
    pub y: f64,
}

/// Pretensioned strand types
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum StrandType {
    Straight,
    Harped,
    Temporary,
}

impl StrandType {
    pub const ALL: [StrandType; 3] = [StrandType::Straight, StrandType::Harped, StrandType::Temporary];
}

impl std::fmt::Display for StrandType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StrandType::Straight => write!(f, "Straight"),
            StrandType::Harped => write!(f, "Harped"),
            StrandType::Temporary => write!(f, "Temporary"),
        }
    }
}

/// A row of pretensioned strands at an analysis point
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrandRow {
    pub y: f64,
    /// Nominal area of all strands in the row
    pub area: f64,
    /// Debonding and transfer-length reduction, 0..=1
    pub transfer_factor: f64,
}

impl StrandRow {
    /// Area that is effective in the section at this point
    pub fn effective_area(&self) -> f64 {
        self.area * self.transfer_factor
    }
}

/// Jacking of one strand type or one tendon
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Jacking {
    pub force: f64,
    pub stress: f64,
}

/// Description of a post-tensioning duct and its tendon
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DuctDetail {
    pub strand_count: usize,
    /// Tendon area
    pub area: f64,
    pub jacking: Jacking,
    pub jacking_end: JackingEnd,
    /// Duct start, in member coordinates
    pub start: f64,
    /// Duct end, in member coordinates
    pub end: f64,
}

impl DuctDetail {
    pub fn length(&self) -> f64 {
        self.end - self.start
    }

    pub fn contains(&self, x: f64) -> bool {
        self.start - 1.0e-9 <= x && x <= self.end + 1.0e-9
    }
}

// =============================================================================
// MATERIAL DATA
// =============================================================================

/// A concrete pour with its own age and properties
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConcreteElement {
    Segment(SegmentKey),
    /// Closure joint at the end of the keyed segment
    Closure(SegmentKey),
    Deck,
}

/// Creep coefficients at the start and end of an interval for loading
/// applied at the middle of an earlier interval
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CreepBracket {
    pub start: f64,
    pub end: f64,
}

impl CreepBracket {
    pub fn increment(&self) -> f64 {
        self.end - self.start
    }
}

/// Prestressing steel identity used for relaxation queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PrestressSteel {
    Strand(SegmentKey, StrandType),
    Tendon(DuctKey),
}

// =============================================================================
// STRUCTURAL ANALYSIS DATA
// =============================================================================

/// Section force at a point
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SectionForce {
    pub axial: f64,
    pub moment: f64,
    pub shear: f64,
}

impl SectionForce {
    pub fn new(axial: f64, moment: f64, shear: f64) -> Self {
        SectionForce { axial, moment, shear }
    }
}

/// Initial strain and curvature imposed between two adjacent points
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InitialStrainLoad {
    pub start: AnalysisPoint,
    pub end: AnalysisPoint,
    pub strain: f64,
    pub curvature: f64,
}

// =============================================================================
// TRAITS
// =============================================================================

/// Girder groups, girders and their analysis points
pub trait BridgeTopology {
    fn group_count(&self) -> usize;
    fn girder_count(&self, group: usize) -> usize;
    fn segment_count(&self, girder: GirderKey) -> usize;
    fn girder_length(&self, girder: GirderKey) -> f64;
    /// Analysis points of a girder, in any order
    fn analysis_points(&self, girder: GirderKey) -> LossResult<Vec<AnalysisPoint>>;
}

pub trait SectionProperties {
    fn net_section(&self, basis: SectionBasis, interval: IntervalIndex, point: &AnalysisPoint) -> LossResult<NetSection>;
    fn rebar_rows(&self, point: &AnalysisPoint) -> LossResult<Vec<RebarRow>>;
}

/// Time-dependent and elastic material properties
pub trait Materials {
    /// Modulus at the middle of `interval`
    fn concrete_modulus(&self, element: ConcreteElement, interval: IntervalIndex) -> LossResult<f64>;
    /// Age-adjusted effective modulus for loads applied during `interval`
    fn age_adjusted_modulus(&self, element: ConcreteElement, interval: IntervalIndex) -> LossResult<f64>;
    /// Creep coefficients bracketing `interval` for loading at the middle of `loading`
    fn creep_coefficients(
        &self,
        element: ConcreteElement,
        loading: IntervalIndex,
        interval: IntervalIndex,
    ) -> LossResult<CreepBracket>;
    /// Free shrinkage strain developed over `interval` (negative is shortening)
    fn free_shrinkage_strain(&self, element: ConcreteElement, interval: IntervalIndex) -> LossResult<f64>;
    fn strand_modulus(&self) -> f64;
    fn tendon_modulus(&self) -> f64;
    fn rebar_modulus(&self) -> f64;
    /// Intrinsic relaxation over `interval` of steel stressed in `stressing`,
    /// starting from stress `fpi`
    fn incremental_relaxation(
        &self,
        steel: PrestressSteel,
        stressing: IntervalIndex,
        interval: IntervalIndex,
        fpi: f64,
    ) -> LossResult<f64>;
}

/// Strand and tendon layout
pub trait PrestressGeometry {
    fn strand_rows(&self, point: &AnalysisPoint, strand_type: StrandType) -> LossResult<Vec<StrandRow>>;
    fn strand_jacking(&self, segment: SegmentKey, strand_type: StrandType) -> LossResult<Jacking>;
    fn duct_count(&self, member: MemberKey) -> usize;
    fn duct(&self, duct: DuctKey) -> LossResult<DuctDetail>;
    /// Tendon location at a point on the duct
    fn tendon_offset(&self, duct: DuctKey, point: &AnalysisPoint) -> LossResult<f64>;
    /// Cumulative angular change from `from` to the point
    fn angular_change(&self, duct: DuctKey, point: &AnalysisPoint, from: MemberEnd) -> LossResult<f64>;
}

/// Linear-elastic structural solve for a girder line
pub trait StructuralAnalysis {
    /// Incremental force caused by `product` during `interval`
    fn incremental_product_force(
        &self,
        product: ProductForceType,
        interval: IntervalIndex,
        point: &AnalysisPoint,
    ) -> LossResult<SectionForce>;

    /// Minimum and maximum live-load moment
    fn live_load_moment_envelope(&self, interval: IntervalIndex, point: &AnalysisPoint) -> LossResult<(f64, f64)>;

    /// Remove every initial strain load registered for the key
    fn clear_initial_strain_loads(&mut self, line: GirderLineKey, interval: IntervalIndex, effect: TimeEffect);

    fn add_initial_strain_load(
        &mut self,
        line: GirderLineKey,
        interval: IntervalIndex,
        effect: TimeEffect,
        load: InitialStrainLoad,
    ) -> LossResult<()>;

    /// Force at `point` caused by all initial strain loads of the key
    fn initial_strain_response(
        &mut self,
        line: GirderLineKey,
        interval: IntervalIndex,
        effect: TimeEffect,
        point: &AnalysisPoint,
    ) -> LossResult<SectionForce>;
}

// =============================================================================
// PER-CALL BUNDLE
// =============================================================================

/// Borrowed collaborators for one engine call
pub struct Collaborators<'a> {
    pub topology: &'a dyn BridgeTopology,
    pub sections: &'a dyn SectionProperties,
    pub materials: &'a dyn Materials,
    pub prestress: &'a dyn PrestressGeometry,
    pub intervals: &'a dyn IntervalSchedule,
    pub analysis: &'a mut dyn StructuralAnalysis,
}

impl<'a> Collaborators<'a> {
    /// Bundle a bridge model that implements every read-only interface with
    /// a separate structural analysis
    pub fn new<B>(bridge: &'a B, analysis: &'a mut dyn StructuralAnalysis) -> Self
    where
        B: BridgeTopology + SectionProperties + Materials + PrestressGeometry + IntervalSchedule,
    {
        Collaborators {
            topology: bridge,
            sections: bridge,
            materials: bridge,
            prestress: bridge,
            intervals: bridge,
            analysis,
        }
    }

    /// Girders of a girder line in group order
    pub fn girder_line(&self, line: GirderLineKey) -> Vec<GirderKey> {
        (0..self.topology.group_count())
            .filter(|&group| line.0 < self.topology.girder_count(group))
            .map(|group| GirderKey::new(group, line.0))
            .collect()
    }
}
