//! # Reference Girder-Line Model
//!
//! A JSON-configurable bridge: one girder line of `n` spans, one precast
//! girder (one segment) per span and group. [`ReferenceBridge`] answers the
//! read-only collaborator queries; [`ReferenceAnalysis`] is the structural
//! solve. [`ReferenceModel`] owns both and hands out a
//! [`Collaborators`] bundle.
//!
//! Units: kip, inch, ksi, days. `y` is measured down from the top of the
//! girder.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::collaborators::{
    BridgeTopology, Collaborators, ConcreteElement, CreepBracket, DuctDetail, Jacking, Materials, NetSection,
    PrestressGeometry, PrestressSteel, RebarLocation, RebarRow, SectionBasis, SectionProperties, StrandRow,
    StrandType,
};
use crate::errors::{LossError, LossResult};
use crate::intervals::{Interval, IntervalIndex, IntervalSchedule, Milestones, Timeline};
use crate::keys::{DuctKey, GirderKey, JackingEnd, MemberEnd, MemberKey, SegmentKey};
use crate::loads::ProductForceType;
use crate::poi::{AnalysisPoint, PoiAttributes};
use crate::reference::analysis::ReferenceAnalysis;
use crate::reference::materials::{ConcreteModel, StrandSteel};

// =============================================================================
// CONFIGURATION
// =============================================================================

/// Prismatic precast girder
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GirderSection {
    pub area: f64,
    pub inertia: f64,
    /// Centroid below the top of the girder
    pub centroid: f64,
    pub height: f64,
}

/// Cast-in-place deck sitting on the top of the girder
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DeckSection {
    pub area: f64,
    pub inertia: f64,
    pub thickness: f64,
}

/// One strand row of a strand group
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrandRowLayout {
    /// Nominal area of the row
    pub area: f64,
    /// Location at the girder ends
    pub y_end: f64,
    /// Location between harp points, harped strands only
    #[serde(default)]
    pub y_harp: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrandGroup {
    pub strand_type: StrandType,
    pub jacking_stress: f64,
    pub rows: Vec<StrandRowLayout>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TendonMember {
    Girder,
    Segment,
}

/// A tendon running the full length of one girder, parabolic between
/// `y_end` at the anchorages and `y_mid` at midspan
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TendonLayout {
    pub member: TendonMember,
    /// Span (group) index
    pub span: usize,
    pub strand_count: usize,
    pub strand_area: f64,
    pub jacking_stress: f64,
    pub jacking_end: JackingEnd,
    pub y_end: f64,
    pub y_mid: f64,
    pub stressing_interval: IntervalIndex,
}

/// A uniform load over every span, applied in one interval
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UniformLoad {
    pub product: ProductForceType,
    pub interval: IntervalIndex,
    /// Load per unit length, positive downward
    pub w: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GirderLineModel {
    pub name: String,
    pub spans: Vec<f64>,
    /// Equal divisions per span; points are placed at each division
    pub points_per_span: usize,
    pub girder: GirderSection,
    pub deck: Option<DeckSection>,
    pub rebar: Vec<RebarRow>,
    pub girder_concrete: ConcreteModel,
    pub closure_concrete: ConcreteModel,
    pub deck_concrete: ConcreteModel,
    /// Unit weight of concrete (kip/in³)
    pub unit_weight: f64,
    pub strand: StrandSteel,
    pub tendon: StrandSteel,
    pub rebar_modulus: f64,
    pub strands: Vec<StrandGroup>,
    pub transfer_length: f64,
    /// Harp points as a fraction of the girder length from each end
    pub harp_fraction: f64,
    pub tendons: Vec<TendonLayout>,
    /// Length of the closure joint at the end of every girder but the last
    pub closure_length: f64,
    /// Distance of the storage supports from the girder ends
    pub storage_support_offset: f64,
    pub loads: Vec<UniformLoad>,
    /// Design lane load (kip/in)
    pub lane_load: f64,
    pub timeline: Timeline,
}

impl Default for GirderLineModel {
    fn default() -> Self {
        GirderLineModel {
            name: String::new(),
            spans: vec![1200.0],
            points_per_span: 10,
            girder: GirderSection {
                area: 789.0,
                inertia: 260_741.0,
                centroid: 29.27,
                height: 54.0,
            },
            deck: None,
            rebar: Vec::new(),
            girder_concrete: ConcreteModel::default(),
            closure_concrete: ConcreteModel::default(),
            deck_concrete: ConcreteModel {
                modulus_28: 3600.0,
                ..ConcreteModel::default()
            },
            unit_weight: 0.150 / 1728.0,
            strand: StrandSteel::default(),
            tendon: StrandSteel::default(),
            rebar_modulus: 29000.0,
            strands: Vec::new(),
            transfer_length: 30.0,
            harp_fraction: 0.4,
            tendons: Vec::new(),
            closure_length: 0.0,
            storage_support_offset: 0.0,
            loads: Vec::new(),
            lane_load: 0.64 / 12.0,
            timeline: Timeline::new(vec![Interval::new("Service", 0.0, 0.0)], Milestones::default()),
        }
    }
}

impl GirderLineModel {
    /// A 100 ft pretensioned girder with a composite deck and one
    /// girder tendon jacked from both ends
    pub fn demo() -> Self {
        let timeline = Timeline::new(
            vec![
                Interval::new("Stress strands", 0.0, 1.0),
                Interval::new("Release prestress", 1.0, 1.0),
                Interval::new("Storage", 1.0, 30.0),
                Interval::new("Erect girder, stress tendon", 30.0, 30.0),
                Interval::new("Time to deck casting", 30.0, 60.0),
                Interval::new("Cast deck", 60.0, 60.0),
                Interval::new("Deck curing", 60.0, 67.0),
                Interval::new("Composite deck, barriers", 67.0, 67.0),
                Interval::new("Service", 67.0, 2000.0),
                Interval::new("Final", 2000.0, 27375.0),
            ],
            Milestones::default()
                .with_stress_strands(0)
                .with_release(1)
                .with_storage(2)
                .with_erection(3)
                .with_composite_closure(3)
                .with_deck(5, 7)
                .with_live_load(8),
        );

        GirderLineModel {
            name: "Demo girder line".to_string(),
            deck: Some(DeckSection {
                area: 768.0,
                inertia: 4096.0,
                thickness: 8.0,
            }),
            rebar: vec![
                RebarRow { location: RebarLocation::Girder, area: 1.24, y: 3.0 },
                RebarRow { location: RebarLocation::Deck, area: 4.8, y: -6.0 },
                RebarRow { location: RebarLocation::Deck, area: 4.8, y: -2.0 },
            ],
            strands: vec![
                StrandGroup {
                    strand_type: StrandType::Straight,
                    jacking_stress: 202.5,
                    rows: vec![
                        StrandRowLayout { area: 12.0 * 0.153, y_end: 52.0, y_harp: None },
                        StrandRowLayout { area: 12.0 * 0.153, y_end: 50.0, y_harp: None },
                    ],
                },
                StrandGroup {
                    strand_type: StrandType::Harped,
                    jacking_stress: 202.5,
                    rows: vec![StrandRowLayout { area: 8.0 * 0.153, y_end: 10.0, y_harp: Some(48.0) }],
                },
            ],
            tendons: vec![TendonLayout {
                member: TendonMember::Girder,
                span: 0,
                strand_count: 12,
                strand_area: 0.153,
                jacking_stress: 202.5,
                jacking_end: JackingEnd::Both,
                y_end: 30.0,
                y_mid: 45.0,
                stressing_interval: 3,
            }],
            loads: vec![
                UniformLoad {
                    product: ProductForceType::TrafficBarrier,
                    interval: 7,
                    w: 0.02,
                },
                UniformLoad {
                    product: ProductForceType::Overlay,
                    interval: 7,
                    w: 0.015,
                },
            ],
            timeline,
            ..GirderLineModel::default()
        }
    }

    pub fn validate(&self) -> LossResult<()> {
        if self.spans.is_empty() {
            return Err(LossError::invalid_input("spans", "[]", "At least one span is required"));
        }
        for (i, &length) in self.spans.iter().enumerate() {
            if !(length > 0.0) {
                return Err(LossError::invalid_input(
                    format!("spans[{i}]"),
                    length.to_string(),
                    "Span length must be positive",
                ));
            }
        }
        if self.points_per_span < 2 {
            return Err(LossError::invalid_input(
                "points_per_span",
                self.points_per_span.to_string(),
                "At least two divisions per span are required",
            ));
        }
        if !(self.girder.area > 0.0 && self.girder.inertia > 0.0) {
            return Err(LossError::invalid_input(
                "girder",
                format!("{:?}", self.girder),
                "Girder area and inertia must be positive",
            ));
        }
        self.timeline.validate()?;

        let count = self.timeline.len();
        for (i, tendon) in self.tendons.iter().enumerate() {
            if tendon.span >= self.spans.len() {
                return Err(LossError::invalid_input(
                    format!("tendons[{i}].span"),
                    tendon.span.to_string(),
                    "No such span",
                ));
            }
            if tendon.stressing_interval >= count {
                return Err(LossError::invalid_input(
                    format!("tendons[{i}].stressing_interval"),
                    tendon.stressing_interval.to_string(),
                    "Stressing interval is past the last interval",
                ));
            }
        }
        for (i, load) in self.loads.iter().enumerate() {
            if load.interval >= count {
                return Err(LossError::invalid_input(
                    format!("loads[{i}].interval"),
                    load.interval.to_string(),
                    "Load interval is past the last interval",
                ));
            }
        }
        Ok(())
    }

    pub fn from_json(json: &str) -> LossResult<Self> {
        let model: GirderLineModel = serde_json::from_str(json)?;
        model.validate()?;
        Ok(model)
    }

    pub fn span_length(&self, span: usize) -> f64 {
        self.spans.get(span).copied().unwrap_or(0.0)
    }

    /// Girder self-weight per unit length
    pub fn girder_weight(&self) -> f64 {
        self.unit_weight * self.girder.area
    }

    pub fn deck_weight(&self) -> f64 {
        self.deck.map_or(0.0, |d| self.unit_weight * d.area)
    }

    pub fn deck_net_section(&self) -> NetSection {
        self.deck.map_or(NetSection::default(), |d| NetSection {
            area: d.area,
            inertia: d.inertia,
            centroid: -0.5 * d.thickness,
            top: -d.thickness,
            bottom: 0.0,
        })
    }

    /// Gross moment of inertia, with the deck transformed by `deck_ratio`
    /// when it is composite
    pub fn gross_inertia(&self, deck_ratio: Option<f64>) -> f64 {
        let g = &self.girder;
        let (Some(n), Some(_)) = (deck_ratio, self.deck) else {
            return g.inertia;
        };
        let deck = self.deck_net_section();
        let (a_d, i_d) = (n * deck.area, n * deck.inertia);
        let area = g.area + a_d;
        let centroid = (g.area * g.centroid + a_d * deck.centroid) / area;
        g.inertia + g.area * (g.centroid - centroid).powi(2) + i_d + a_d * (deck.centroid - centroid).powi(2)
    }

    fn concrete(&self, element: ConcreteElement) -> &ConcreteModel {
        match element {
            ConcreteElement::Segment(_) => &self.girder_concrete,
            ConcreteElement::Closure(_) => &self.closure_concrete,
            ConcreteElement::Deck => &self.deck_concrete,
        }
    }

    /// Time at which an element is cast
    pub fn cast_time(&self, element: ConcreteElement) -> f64 {
        let m = &self.timeline.milestones;
        let interval = match element {
            ConcreteElement::Segment(_) => m.stress_strands,
            ConcreteElement::Closure(_) => m.erect_segment,
            ConcreteElement::Deck => m.cast_deck.unwrap_or(0),
        };
        self.timeline.times(interval).start
    }

    /// Modulus of an element at the middle of an interval
    pub fn concrete_modulus(&self, element: ConcreteElement, interval: IntervalIndex) -> f64 {
        let cast = self.cast_time(element);
        self.concrete(element).modulus(self.timeline.times(interval).middle - cast)
    }

    /// Tendon of a duct key
    pub fn tendon(&self, duct: DuctKey) -> Option<&TendonLayout> {
        let (kind, span) = match duct.member {
            MemberKey::Girder(g) => (TendonMember::Girder, g.group),
            MemberKey::Segment(s) => (TendonMember::Segment, s.group),
        };
        self.tendons
            .iter()
            .filter(|t| t.member == kind && t.span == span)
            .nth(duct.duct)
    }

    fn strand_groups(&self, strand_type: StrandType) -> impl Iterator<Item = &StrandGroup> {
        self.strands.iter().filter(move |g| g.strand_type == strand_type)
    }
}

// =============================================================================
// BRIDGE
// =============================================================================

/// Read-only collaborator queries against a [`GirderLineModel`]
#[derive(Debug, Clone)]
pub struct ReferenceBridge {
    model: GirderLineModel,
}

impl ReferenceBridge {
    pub fn new(model: GirderLineModel) -> Self {
        ReferenceBridge { model }
    }

    pub fn model(&self) -> &GirderLineModel {
        &self.model
    }

    fn check_girder(&self, girder: GirderKey) -> LossResult<f64> {
        if girder.girder != 0 || girder.group >= self.model.spans.len() {
            return Err(LossError::collaborator("reference bridge", format!("{girder} does not exist")));
        }
        Ok(self.model.spans[girder.group])
    }

    fn tendon_for(&self, duct: DuctKey) -> LossResult<&TendonLayout> {
        self.model.tendon(duct).ok_or_else(|| LossError::duct_not_found(&duct))
    }
}

impl BridgeTopology for ReferenceBridge {
    fn group_count(&self) -> usize {
        self.model.spans.len()
    }

    fn girder_count(&self, group: usize) -> usize {
        usize::from(group < self.model.spans.len())
    }

    fn segment_count(&self, girder: GirderKey) -> usize {
        usize::from(self.check_girder(girder).is_ok())
    }

    fn girder_length(&self, girder: GirderKey) -> f64 {
        self.check_girder(girder).unwrap_or(0.0)
    }

    fn analysis_points(&self, girder: GirderKey) -> LossResult<Vec<AnalysisPoint>> {
        let length = self.check_girder(girder)?;
        let segment = girder.segment(0);
        let n = self.model.points_per_span;
        let has_closure = self.model.closure_length > 0.0 && girder.group + 1 < self.model.spans.len();
        let closure_start = length - self.model.closure_length;

        let mut points: Vec<AnalysisPoint> = (0..=n)
            .map(|i| {
                let x = length * i as f64 / n as f64;
                let attributes = if has_closure && x > closure_start + 1.0e-9 {
                    PoiAttributes::closure()
                } else {
                    PoiAttributes::segment()
                };
                AnalysisPoint::new(segment, x, x).with_attributes(attributes)
            })
            .collect();

        if self.model.strand_groups(StrandType::Harped).next().is_some() {
            let hf = self.model.harp_fraction;
            for x in [hf * length, (1.0 - hf) * length] {
                match points.iter_mut().find(|p| (p.distance_from_girder_start - x).abs() < 1.0e-6) {
                    Some(point) => point.attributes.harp_point = true,
                    None => points.push(
                        AnalysisPoint::new(segment, x, x).with_attributes(PoiAttributes::segment().with_harp_point()),
                    ),
                }
            }
        }
        Ok(points)
    }
}

impl SectionProperties for ReferenceBridge {
    fn net_section(&self, basis: SectionBasis, _interval: IntervalIndex, _point: &AnalysisPoint) -> LossResult<NetSection> {
        let g = &self.model.girder;
        Ok(match basis {
            SectionBasis::NetGirder => NetSection {
                area: g.area,
                inertia: g.inertia,
                centroid: g.centroid,
                top: 0.0,
                bottom: g.height,
            },
            SectionBasis::NetDeck => self.model.deck_net_section(),
        })
    }

    fn rebar_rows(&self, _point: &AnalysisPoint) -> LossResult<Vec<RebarRow>> {
        let has_deck = self.model.deck.is_some();
        Ok(self
            .model
            .rebar
            .iter()
            .filter(|r| r.location == RebarLocation::Girder || has_deck)
            .copied()
            .collect())
    }
}

impl Materials for ReferenceBridge {
    fn concrete_modulus(&self, element: ConcreteElement, interval: IntervalIndex) -> LossResult<f64> {
        Ok(self.model.concrete_modulus(element, interval))
    }

    fn age_adjusted_modulus(&self, element: ConcreteElement, interval: IntervalIndex) -> LossResult<f64> {
        let cast = self.model.cast_time(element);
        let times = self.model.timeline.times(interval);
        Ok(self
            .model
            .concrete(element)
            .age_adjusted_modulus(times.end - cast, times.middle - cast))
    }

    fn creep_coefficients(
        &self,
        element: ConcreteElement,
        loading: IntervalIndex,
        interval: IntervalIndex,
    ) -> LossResult<CreepBracket> {
        let cast = self.model.cast_time(element);
        let concrete = self.model.concrete(element);
        let loading_age = self.model.timeline.times(loading).middle - cast;
        let times = self.model.timeline.times(interval);
        Ok(CreepBracket {
            start: concrete.creep_coefficient(times.start - cast, loading_age),
            end: concrete.creep_coefficient(times.end - cast, loading_age),
        })
    }

    fn free_shrinkage_strain(&self, element: ConcreteElement, interval: IntervalIndex) -> LossResult<f64> {
        let cast = self.model.cast_time(element);
        let concrete = self.model.concrete(element);
        let times = self.model.timeline.times(interval);
        Ok(concrete.shrinkage_strain(times.end - cast) - concrete.shrinkage_strain(times.start - cast))
    }

    fn strand_modulus(&self) -> f64 {
        self.model.strand.modulus
    }

    fn tendon_modulus(&self) -> f64 {
        self.model.tendon.modulus
    }

    fn rebar_modulus(&self) -> f64 {
        self.model.rebar_modulus
    }

    fn incremental_relaxation(
        &self,
        steel: PrestressSteel,
        stressing: IntervalIndex,
        interval: IntervalIndex,
        fpi: f64,
    ) -> LossResult<f64> {
        let stressed_at = self.model.timeline.times(stressing).start;
        let times = self.model.timeline.times(interval);
        let material = match steel {
            PrestressSteel::Strand(..) => &self.model.strand,
            PrestressSteel::Tendon(_) => &self.model.tendon,
        };
        Ok(material.relaxation(fpi, times.start - stressed_at, times.end - stressed_at))
    }
}

impl PrestressGeometry for ReferenceBridge {
    fn strand_rows(&self, point: &AnalysisPoint, strand_type: StrandType) -> LossResult<Vec<StrandRow>> {
        let length = self.check_girder(point.girder_key())?;
        let x = point.distance_from_segment_start;
        let lt = self.model.transfer_length;
        let transfer_factor = if lt > 0.0 {
            (x.min(length - x) / lt).clamp(0.0, 1.0)
        } else {
            1.0
        };
        let harp = self.model.harp_fraction * length;

        Ok(self
            .model
            .strand_groups(strand_type)
            .flat_map(|group| group.rows.iter())
            .map(|row| {
                let y = match (strand_type, row.y_harp) {
                    (StrandType::Harped, Some(y_harp)) if harp > 0.0 => {
                        let d = x.min(length - x).max(0.0);
                        row.y_end + (y_harp - row.y_end) * (d / harp).min(1.0)
                    }
                    _ => row.y_end,
                };
                StrandRow {
                    y,
                    area: row.area,
                    transfer_factor,
                }
            })
            .collect())
    }

    fn strand_jacking(&self, _segment: SegmentKey, strand_type: StrandType) -> LossResult<Jacking> {
        let (area, force) = self
            .model
            .strand_groups(strand_type)
            .flat_map(|group| group.rows.iter().map(move |row| (row.area, row.area * group.jacking_stress)))
            .fold((0.0, 0.0), |(a, f), (ra, rf)| (a + ra, f + rf));
        Ok(Jacking {
            force,
            stress: if area > 0.0 { force / area } else { 0.0 },
        })
    }

    fn duct_count(&self, member: MemberKey) -> usize {
        let (kind, span) = match member {
            MemberKey::Girder(g) => (TendonMember::Girder, g.group),
            MemberKey::Segment(s) => (TendonMember::Segment, s.group),
        };
        self.model
            .tendons
            .iter()
            .filter(|t| t.member == kind && t.span == span)
            .count()
    }

    fn duct(&self, duct: DuctKey) -> LossResult<DuctDetail> {
        let tendon = self.tendon_for(duct)?;
        let area = tendon.strand_count as f64 * tendon.strand_area;
        Ok(DuctDetail {
            strand_count: tendon.strand_count,
            area,
            jacking: Jacking {
                force: area * tendon.jacking_stress,
                stress: tendon.jacking_stress,
            },
            jacking_end: tendon.jacking_end,
            start: 0.0,
            end: self.model.span_length(tendon.span),
        })
    }

    fn tendon_offset(&self, duct: DuctKey, point: &AnalysisPoint) -> LossResult<f64> {
        let tendon = self.tendon_for(duct)?;
        let l = self.model.span_length(tendon.span);
        let r = point.member_position(&duct.member) / l;
        Ok(tendon.y_end + 4.0 * (tendon.y_mid - tendon.y_end) * r * (1.0 - r))
    }

    fn angular_change(&self, duct: DuctKey, point: &AnalysisPoint, from: MemberEnd) -> LossResult<f64> {
        let tendon = self.tendon_for(duct)?;
        let l = self.model.span_length(tendon.span);
        let x = point.member_position(&duct.member).clamp(0.0, l);
        let s = match from {
            MemberEnd::Start => x,
            MemberEnd::End => l - x,
        };
        Ok(8.0 * (tendon.y_mid - tendon.y_end).abs() * s / (l * l))
    }
}

impl IntervalSchedule for ReferenceBridge {
    fn interval_count(&self) -> usize {
        self.model.timeline.len()
    }

    fn start_time(&self, interval: IntervalIndex) -> f64 {
        self.model.timeline.times(interval).start
    }

    fn middle_time(&self, interval: IntervalIndex) -> f64 {
        self.model.timeline.times(interval).middle
    }

    fn end_time(&self, interval: IntervalIndex) -> f64 {
        self.model.timeline.times(interval).end
    }

    fn description(&self, interval: IntervalIndex) -> String {
        self.model
            .timeline
            .intervals
            .get(interval)
            .map(|i| i.description.clone())
            .unwrap_or_default()
    }

    fn stress_strands_interval(&self, _segment: SegmentKey) -> IntervalIndex {
        self.model.timeline.milestones.stress_strands
    }

    fn release_interval(&self, _segment: SegmentKey) -> IntervalIndex {
        self.model.timeline.milestones.release
    }

    fn storage_interval(&self, _segment: SegmentKey) -> IntervalIndex {
        self.model.timeline.milestones.storage
    }

    fn erect_segment_interval(&self, _segment: SegmentKey) -> IntervalIndex {
        self.model.timeline.milestones.erect_segment
    }

    fn composite_closure_interval(&self, _closure: SegmentKey) -> IntervalIndex {
        self.model.timeline.milestones.composite_closure
    }

    fn cast_deck_interval(&self) -> Option<IntervalIndex> {
        self.model.deck.and(self.model.timeline.milestones.cast_deck)
    }

    fn composite_deck_interval(&self) -> Option<IntervalIndex> {
        self.model.deck.and(self.model.timeline.milestones.composite_deck)
    }

    fn live_load_interval(&self) -> IntervalIndex {
        self.model.timeline.milestones.live_load
    }

    fn stress_tendon_interval(&self, duct: DuctKey) -> IntervalIndex {
        self.model
            .tendon(duct)
            .map_or(usize::MAX, |t| t.stressing_interval)
    }
}

// =============================================================================
// MODEL
// =============================================================================

/// A bridge and its structural analysis, ready to serve an engine call
#[derive(Debug, Clone)]
pub struct ReferenceModel {
    pub bridge: ReferenceBridge,
    pub analysis: ReferenceAnalysis,
}

impl ReferenceModel {
    pub fn new(model: GirderLineModel) -> LossResult<Self> {
        model.validate()?;
        Ok(ReferenceModel {
            analysis: ReferenceAnalysis::new(model.clone()),
            bridge: ReferenceBridge::new(model),
        })
    }

    pub fn demo() -> Self {
        let model = GirderLineModel::demo();
        ReferenceModel {
            analysis: ReferenceAnalysis::new(model.clone()),
            bridge: ReferenceBridge::new(model),
        }
    }

    pub fn from_json(json: &str) -> LossResult<Self> {
        Self::new(GirderLineModel::from_json(json)?)
    }

    /// Read a scenario from a JSON file
    pub fn load(path: impl AsRef<Path>) -> LossResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| LossError::invalid_input("scenario", path.display().to_string(), e.to_string()))?;
        Self::from_json(&json)
    }

    pub fn model(&self) -> &GirderLineModel {
        self.bridge.model()
    }

    /// Borrow the bridge and the analysis for one engine call
    pub fn collaborators(&mut self) -> Collaborators<'_> {
        Collaborators::new(&self.bridge, &mut self.analysis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() < tol
    }

    #[test]
    fn test_demo_is_valid() {
        assert!(GirderLineModel::demo().validate().is_ok());
        let json = serde_json::to_string(&GirderLineModel::demo()).unwrap();
        let back = GirderLineModel::from_json(&json).unwrap();
        assert_eq!(back, GirderLineModel::demo());
    }

    #[test]
    fn test_points_include_harp_points() {
        let bridge = ReferenceBridge::new(GirderLineModel::demo());
        let points = bridge.analysis_points(GirderKey::new(0, 0)).unwrap();
        assert_eq!(points.iter().filter(|p| p.attributes.harp_point).count(), 2);
        assert!(bridge.analysis_points(GirderKey::new(3, 0)).is_err());
    }

    #[test]
    fn test_closure_points() {
        let mut model = GirderLineModel::demo();
        model.spans = vec![1200.0, 1200.0];
        model.closure_length = 24.0;
        let bridge = ReferenceBridge::new(model);
        let first = bridge.analysis_points(GirderKey::new(0, 0)).unwrap();
        let last = bridge.analysis_points(GirderKey::new(1, 0)).unwrap();
        assert!(first.iter().any(|p| p.attributes.in_closure));
        assert!(!last.iter().any(|p| p.attributes.in_closure));
    }

    #[test]
    fn test_harped_profile_and_transfer() {
        let bridge = ReferenceBridge::new(GirderLineModel::demo());
        let segment = GirderKey::new(0, 0).segment(0);
        let end = AnalysisPoint::new(segment, 0.0, 0.0);
        let mid = AnalysisPoint::new(segment, 600.0, 600.0);
        let at_end = bridge.strand_rows(&end, StrandType::Harped).unwrap();
        let at_mid = bridge.strand_rows(&mid, StrandType::Harped).unwrap();
        assert!(approx_eq(at_end[0].y, 10.0, 1e-12));
        assert_eq!(at_end[0].transfer_factor, 0.0);
        assert!(approx_eq(at_mid[0].y, 48.0, 1e-12));
        assert_eq!(at_mid[0].transfer_factor, 1.0);
    }

    #[test]
    fn test_parabolic_tendon() {
        let bridge = ReferenceBridge::new(GirderLineModel::demo());
        let girder = GirderKey::new(0, 0);
        let duct = DuctKey::new(MemberKey::Girder(girder), 0);
        let mid = AnalysisPoint::new(girder.segment(0), 600.0, 600.0);
        assert!(approx_eq(bridge.tendon_offset(duct, &mid).unwrap(), 45.0, 1e-12));
        let alpha = bridge.angular_change(duct, &mid, MemberEnd::Start).unwrap();
        assert!(approx_eq(alpha, 8.0 * 15.0 * 600.0 / (1200.0 * 1200.0), 1e-12));
        let missing = DuctKey::new(MemberKey::Girder(girder), 4);
        assert!(matches!(bridge.duct(missing), Err(LossError::DuctNotFound { .. })));
    }

    #[test]
    fn test_strand_jacking_totals() {
        let bridge = ReferenceBridge::new(GirderLineModel::demo());
        let segment = GirderKey::new(0, 0).segment(0);
        let jacking = bridge.strand_jacking(segment, StrandType::Straight).unwrap();
        assert!(approx_eq(jacking.force, 24.0 * 0.153 * 202.5, 1e-9));
        assert!(approx_eq(jacking.stress, 202.5, 1e-12));
        let none = bridge.strand_jacking(segment, StrandType::Temporary).unwrap();
        assert_eq!(none, Jacking::default());
    }
}
