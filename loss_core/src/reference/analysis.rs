//! # Reference Structural Analysis
//!
//! Linear-elastic line-girder solve for a [`GirderLineModel`]. Each span is
//! a prismatic beam; spans are simply supported until the continuity
//! milestone and continuous over the interior piers afterwards, with the
//! continuity moments found by [`MomentDistribution`].
//!
//! Girder self-weight follows the support history of the precast girder:
//!
//! ```text
//!   stressing bed      storage                erected
//!  ^-------------^   --^---------^--   ^-------------------^
//!  released           supports at d     simple span (before continuity)
//! ```
//!
//! The force reported for an interval is the change from the previous
//! interval, so a girder picked up off the bed and placed on storage blocks
//! produces the difference of the two moment diagrams.
//!
//! Post-tensioning secondary effects are not generated: every tendon in
//! the model is confined to one girder and stressed before continuity.

use std::collections::BTreeMap;

use tracing::warn;

use crate::collaborators::{ConcreteElement, InitialStrainLoad, SectionForce, StructuralAnalysis};
use crate::errors::{LossError, LossResult};
use crate::intervals::IntervalIndex;
use crate::keys::{GirderLineKey, SegmentKey};
use crate::loads::{ProductForceType, TimeEffect};
use crate::poi::AnalysisPoint;
use crate::reference::continuous::MomentDistribution;
use crate::reference::model::GirderLineModel;

type StrainKey = (GirderLineKey, IntervalIndex, TimeEffect);

/// How the precast girder is supported during an interval
#[derive(Debug, Clone, Copy, PartialEq)]
enum Support {
    /// Still in the bed with the strands tensioned, carries nothing
    Unreleased,
    /// Spanning between its ends
    Ends,
    /// On storage blocks at `d` from each end
    Storage(f64),
}

#[derive(Debug, Clone)]
pub struct ReferenceAnalysis {
    model: GirderLineModel,
    initial_strains: BTreeMap<StrainKey, Vec<InitialStrainLoad>>,
    /// Solved end moments per span, dropped when the loads of a key change
    solved: BTreeMap<StrainKey, Vec<(f64, f64)>>,
}

impl ReferenceAnalysis {
    pub fn new(model: GirderLineModel) -> Self {
        ReferenceAnalysis {
            model,
            initial_strains: BTreeMap::new(),
            solved: BTreeMap::new(),
        }
    }

    /// Number of initial strain loads registered for a key
    pub fn initial_strain_load_count(&self, line: GirderLineKey, interval: IntervalIndex, effect: TimeEffect) -> usize {
        self.initial_strains.get(&(line, interval, effect)).map_or(0, Vec::len)
    }

    /// Whether the girder line acts continuously during `interval`
    pub fn is_continuous(&self, interval: IntervalIndex) -> bool {
        self.model.spans.len() > 1
            && self
                .model
                .timeline
                .milestones
                .continuity
                .is_some_and(|c| interval >= c)
    }

    /// Flexural rigidity of the girder line during `interval`
    pub fn flexural_rigidity(&self, interval: IntervalIndex) -> f64 {
        let segment = ConcreteElement::Segment(SegmentKey::new(0, 0, 0));
        let e_girder = self.model.concrete_modulus(segment, interval);
        let composite = self
            .model
            .timeline
            .milestones
            .composite_deck
            .filter(|&c| self.model.deck.is_some() && interval >= c);
        let deck_ratio = composite.and_then(|_| {
            let e_deck = self.model.concrete_modulus(ConcreteElement::Deck, interval);
            (e_girder > 0.0).then(|| e_deck / e_girder)
        });
        e_girder * self.model.gross_inertia(deck_ratio)
    }

    fn support(&self, interval: IntervalIndex) -> Support {
        let m = &self.model.timeline.milestones;
        if interval < m.release {
            Support::Unreleased
        } else if interval >= m.erect_segment {
            Support::Ends
        } else if interval >= m.storage {
            Support::Storage(self.model.storage_support_offset)
        } else {
            Support::Ends
        }
    }

    fn span_of(&self, point: &AnalysisPoint) -> LossResult<(usize, f64, f64)> {
        let girder = point.girder_key();
        if girder.girder != 0 || girder.group >= self.model.spans.len() {
            return Err(LossError::collaborator(
                "reference analysis",
                format!("{girder} is not part of the model"),
            ));
        }
        let length = self.model.spans[girder.group];
        Ok((girder.group, point.distance_from_girder_start.clamp(0.0, length), length))
    }

    /// Continuity end moments of uniform loads, `(span, w)`
    fn continuity_moments(&self, interval: IntervalIndex, loads: &[(usize, f64)]) -> Vec<(f64, f64)> {
        let mut md = MomentDistribution::new(&self.model.spans, 1.0);
        for &(span, w) in loads {
            md.add_uniform_load(span, w);
        }
        if !md.solve() {
            warn!(interval, "moment distribution did not converge");
        }
        md.end_moments()
    }

    /// Force at a point from a uniform load `w` on every span listed in `loads`
    fn uniform_load_force(&self, interval: IntervalIndex, loads: &[(usize, f64)], point: &AnalysisPoint) -> LossResult<SectionForce> {
        let (span, x, l) = self.span_of(point)?;
        let (mut moment, mut shear) = loads
            .iter()
            .filter(|(s, _)| *s == span)
            .fold((0.0, 0.0), |(m, v), (_, w)| (m + 0.5 * w * x * (l - x), v + w * (0.5 * l - x)));

        if self.is_continuous(interval) {
            let (ma, mb) = self.continuity_moments(interval, loads)[span];
            moment += ma * (1.0 - x / l) + mb * x / l;
            shear += (mb - ma) / l;
        }
        Ok(SectionForce::new(0.0, moment, shear))
    }

    /// Self-weight moment and shear of the precast girder on its own supports
    fn girder_weight_force(&self, support: Support, point: &AnalysisPoint) -> LossResult<(f64, f64)> {
        let (_, x, l) = self.span_of(point)?;
        let w = self.model.girder_weight();
        Ok(match support {
            Support::Unreleased => (0.0, 0.0),
            Support::Ends => (0.5 * w * x * (l - x), w * (0.5 * l - x)),
            Support::Storage(d) => {
                let reaction = 0.5 * w * l;
                let mut moment = -0.5 * w * x * x;
                let mut shear = -w * x;
                if x >= d {
                    moment += reaction * (x - d);
                    shear += reaction;
                }
                if x >= l - d {
                    moment += reaction * (x - (l - d));
                    shear += reaction;
                }
                (moment, shear)
            }
        })
    }

    fn all_spans(&self, w: f64) -> Vec<(usize, f64)> {
        (0..self.model.spans.len()).map(|s| (s, w)).collect()
    }

    fn solve_initial_strains(&self, key: StrainKey) -> Vec<(f64, f64)> {
        let interval = key.1;
        let ei = self.flexural_rigidity(interval);
        let mut md = MomentDistribution::new(&self.model.spans, ei);
        let mut integrals = vec![(0.0, 0.0); self.model.spans.len()];
        for load in self.initial_strains.get(&key).into_iter().flatten() {
            let span = load.start.girder_key().group;
            let (a, b) = (load.start.distance_from_girder_start, load.end.distance_from_girder_start);
            if let Some((phi0, phi1)) = integrals.get_mut(span) {
                *phi0 += load.curvature * (b - a);
                *phi1 += 0.5 * load.curvature * (b * b - a * a);
            }
        }
        for (span, (phi0, phi1)) in integrals.into_iter().enumerate() {
            md.add_imposed_curvature(span, ei, phi0, phi1);
        }
        if !md.solve() {
            warn!(interval, effect = %key.2, "moment distribution did not converge");
        }
        md.end_moments()
    }
}

impl StructuralAnalysis for ReferenceAnalysis {
    fn incremental_product_force(
        &self,
        product: ProductForceType,
        interval: IntervalIndex,
        point: &AnalysisPoint,
    ) -> LossResult<SectionForce> {
        match product {
            ProductForceType::Girder => {
                let current = self.girder_weight_force(self.support(interval), point)?;
                let previous = match interval {
                    0 => (0.0, 0.0),
                    i => self.girder_weight_force(self.support(i - 1), point)?,
                };
                Ok(SectionForce::new(0.0, current.0 - previous.0, current.1 - previous.1))
            }
            ProductForceType::Slab if self.model.timeline.milestones.cast_deck == Some(interval) => {
                self.uniform_load_force(interval, &self.all_spans(self.model.deck_weight()), point)
            }
            _ => {
                let w: f64 = self
                    .model
                    .loads
                    .iter()
                    .filter(|l| l.product == product && l.interval == interval)
                    .map(|l| l.w)
                    .sum();
                if w == 0.0 {
                    self.span_of(point)?;
                    return Ok(SectionForce::default());
                }
                self.uniform_load_force(interval, &self.all_spans(w), point)
            }
        }
    }

    fn live_load_moment_envelope(&self, interval: IntervalIndex, point: &AnalysisPoint) -> LossResult<(f64, f64)> {
        let w = self.model.lane_load;
        let (mut min, mut max) = (0.0_f64, 0.0_f64);
        for span in 0..self.model.spans.len() {
            let moment = self.uniform_load_force(interval, &[(span, w)], point)?.moment;
            min += moment.min(0.0);
            max += moment.max(0.0);
        }
        Ok((min, max))
    }

    fn clear_initial_strain_loads(&mut self, line: GirderLineKey, interval: IntervalIndex, effect: TimeEffect) {
        let key = (line, interval, effect);
        self.initial_strains.remove(&key);
        self.solved.remove(&key);
    }

    fn add_initial_strain_load(
        &mut self,
        line: GirderLineKey,
        interval: IntervalIndex,
        effect: TimeEffect,
        load: InitialStrainLoad,
    ) -> LossResult<()> {
        let start = load.start.girder_key();
        if start != load.end.girder_key() {
            return Err(LossError::collaborator(
                "reference analysis",
                format!("initial strain load spans {start} and {}", load.end.girder_key()),
            ));
        }
        self.span_of(&load.start)?;
        let key = (line, interval, effect);
        self.solved.remove(&key);
        self.initial_strains.entry(key).or_default().push(load);
        Ok(())
    }

    fn initial_strain_response(
        &mut self,
        line: GirderLineKey,
        interval: IntervalIndex,
        effect: TimeEffect,
        point: &AnalysisPoint,
    ) -> LossResult<SectionForce> {
        let (span, x, l) = self.span_of(point)?;
        if !self.is_continuous(interval) {
            return Ok(SectionForce::default());
        }
        let key = (line, interval, effect);
        if !self.solved.contains_key(&key) {
            let moments = self.solve_initial_strains(key);
            self.solved.insert(key, moments);
        }
        let (ma, mb) = self.solved.get(&key).and_then(|m| m.get(span).copied()).unwrap_or_default();
        Ok(SectionForce::new(0.0, ma * (1.0 - x / l) + mb * x / l, (mb - ma) / l))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intervals::{Interval, Milestones, Timeline};
    use crate::keys::GirderKey;
    use approx::assert_relative_eq;

    fn timeline() -> Timeline {
        Timeline::new(
            vec![
                Interval::new("Stress", 0.0, 1.0),
                Interval::new("Release", 1.0, 1.0),
                Interval::new("Storage", 1.0, 30.0),
                Interval::new("Erect", 30.0, 30.0),
                Interval::new("Continuity", 30.0, 30.0),
                Interval::new("Service", 30.0, 2000.0),
            ],
            Milestones::default()
                .with_release(1)
                .with_storage(2)
                .with_erection(3)
                .with_composite_closure(3)
                .with_continuity(4)
                .with_live_load(5),
        )
    }

    fn model(spans: Vec<f64>) -> GirderLineModel {
        GirderLineModel {
            spans,
            storage_support_offset: 24.0,
            timeline: timeline(),
            ..GirderLineModel::default()
        }
    }

    fn point(group: usize, x: f64) -> AnalysisPoint {
        AnalysisPoint::new(GirderKey::new(group, 0).segment(0), x, x)
    }

    #[test]
    fn test_girder_weight_follows_supports() {
        let analysis = ReferenceAnalysis::new(model(vec![1200.0]));
        let w = analysis.model.girder_weight();
        let mid = point(0, 600.0);

        let before = analysis.incremental_product_force(ProductForceType::Girder, 0, &mid).unwrap();
        assert_eq!(before.moment, 0.0);

        let release = analysis.incremental_product_force(ProductForceType::Girder, 1, &mid).unwrap();
        assert_relative_eq!(release.moment, w * 1200.0 * 1200.0 / 8.0, max_relative = 1e-12);

        // Moving onto storage blocks at d shortens the effective span
        let storage = analysis.incremental_product_force(ProductForceType::Girder, 2, &mid).unwrap();
        let on_blocks = 0.5 * w * (1200.0 * (600.0 - 24.0) - 600.0 * 600.0);
        assert_relative_eq!(release.moment + storage.moment, on_blocks, max_relative = 1e-12);

        let erected = analysis.incremental_product_force(ProductForceType::Girder, 3, &mid).unwrap();
        assert_relative_eq!(release.moment + storage.moment + erected.moment, release.moment, max_relative = 1e-12);
    }

    #[test]
    fn test_storage_cantilever() {
        let analysis = ReferenceAnalysis::new(model(vec![1200.0]));
        let w = analysis.model.girder_weight();
        let (moment, shear) = analysis.girder_weight_force(Support::Storage(24.0), &point(0, 24.0)).unwrap();
        assert_relative_eq!(moment, -0.5 * w * 24.0 * 24.0, max_relative = 1e-12);
        assert_relative_eq!(shear, w * (600.0 - 24.0), max_relative = 1e-12);
        let (moment, _) = analysis.girder_weight_force(Support::Storage(24.0), &point(0, 1200.0)).unwrap();
        assert!(moment.abs() < 1e-9);
    }

    #[test]
    fn test_user_load_on_continuous_line() {
        let mut m = model(vec![1200.0, 1200.0]);
        m.loads.push(crate::reference::model::UniformLoad {
            product: ProductForceType::TrafficBarrier,
            interval: 5,
            w: 0.02,
        });
        let analysis = ReferenceAnalysis::new(m);
        let pier = analysis
            .incremental_product_force(ProductForceType::TrafficBarrier, 5, &point(0, 1200.0))
            .unwrap();
        assert_relative_eq!(pier.moment, -0.02 * 1200.0 * 1200.0 / 8.0, max_relative = 1e-9);
        let other = analysis
            .incremental_product_force(ProductForceType::TrafficBarrier, 4, &point(0, 1200.0))
            .unwrap();
        assert_eq!(other, SectionForce::default());
    }

    #[test]
    fn test_live_load_envelope() {
        let analysis = ReferenceAnalysis::new(model(vec![1200.0, 1200.0]));
        let w = analysis.model.lane_load;
        let (min, max) = analysis.live_load_moment_envelope(5, &point(0, 1200.0)).unwrap();
        assert_relative_eq!(min, -w * 1200.0 * 1200.0 / 8.0, max_relative = 1e-9);
        assert!(max.abs() < 1e-6);

        let single = ReferenceAnalysis::new(model(vec![1200.0]));
        let (min, max) = single.live_load_moment_envelope(5, &point(0, 600.0)).unwrap();
        assert_eq!(min, 0.0);
        assert_relative_eq!(max, w * 1200.0 * 1200.0 / 8.0, max_relative = 1e-12);
    }

    #[test]
    fn test_initial_strain_needs_continuity() {
        let line = GirderLineKey(0);
        let mut analysis = ReferenceAnalysis::new(model(vec![1200.0, 1200.0]));
        for group in 0..2 {
            let load = InitialStrainLoad {
                start: point(group, 0.0),
                end: point(group, 1200.0),
                strain: 0.0,
                curvature: 1.0e-6,
            };
            for interval in [2, 5] {
                analysis
                    .add_initial_strain_load(line, interval, TimeEffect::Creep, load.clone())
                    .unwrap();
            }
        }
        assert_eq!(analysis.initial_strain_load_count(line, 5, TimeEffect::Creep), 2);

        let pier = point(0, 1200.0);
        let simple = analysis.initial_strain_response(line, 2, TimeEffect::Creep, &pier).unwrap();
        assert_eq!(simple, SectionForce::default());

        let continuous = analysis.initial_strain_response(line, 5, TimeEffect::Creep, &pier).unwrap();
        let ei = analysis.flexural_rigidity(5);
        assert_relative_eq!(continuous.moment, -1.5 * ei * 1.0e-6, max_relative = 1e-9);

        analysis.clear_initial_strain_loads(line, 5, TimeEffect::Creep);
        let cleared = analysis.initial_strain_response(line, 5, TimeEffect::Creep, &pier).unwrap();
        assert_eq!(cleared.moment, 0.0);
    }

    #[test]
    fn test_load_across_girders_rejected() {
        let mut analysis = ReferenceAnalysis::new(model(vec![1200.0, 1200.0]));
        let load = InitialStrainLoad {
            start: point(0, 1200.0),
            end: point(1, 0.0),
            strain: 0.0,
            curvature: 1.0e-6,
        };
        assert!(analysis
            .add_initial_strain_load(GirderLineKey(0), 5, TimeEffect::Shrinkage, load)
            .is_err());
    }
}
