//! # Analysis Points
//!
//! An [`AnalysisPoint`] is an immutable location on a girder where results
//! are evaluated. The [`PoiCatalog`] holds every point of one girder line
//! as a vector sorted by position along the line, so lookups are binary
//! searches and neighbours are just adjacent indices.
//!
//! ## Line coordinates
//!
//! ```text
//!  group 0 girder          group 1 girder
//! |-----------------------|-----------------------|
//! 0                       L0                      L0 + L1
//! ```
//!
//! A point's line position is the length of all preceding girders plus its
//! distance from the start of its own girder.

use std::ops::Range;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{LossError, LossResult};
use crate::keys::{GirderKey, GirderLineKey, MemberKey, SegmentKey};

/// Two positions closer than this are the same point
pub const POSITION_TOLERANCE: f64 = 1.0e-6;

/// Descriptive flags carried by an analysis point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct PoiAttributes {
    pub on_segment: bool,
    pub in_closure: bool,
    pub harp_point: bool,
    pub critical_section_shear: bool,
    pub lifting_point: bool,
    pub hauling_point: bool,
}

impl PoiAttributes {
    pub fn segment() -> Self {
        PoiAttributes {
            on_segment: true,
            ..Default::default()
        }
    }

    pub fn closure() -> Self {
        PoiAttributes {
            in_closure: true,
            ..Default::default()
        }
    }

    pub fn with_harp_point(mut self) -> Self {
        self.harp_point = true;
        self
    }

    pub fn with_critical_section_shear(mut self) -> Self {
        self.critical_section_shear = true;
        self
    }

    pub fn with_lifting_point(mut self) -> Self {
        self.lifting_point = true;
        self
    }

    pub fn with_hauling_point(mut self) -> Self {
        self.hauling_point = true;
        self
    }
}

/// A location along a girder.
///
/// Points produced by the bridge model carry an `id`; points made up on the
/// fly by a consumer have `id == None` and are resolved to the nearest
/// cataloged point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisPoint {
    pub id: Option<Uuid>,
    pub segment: SegmentKey,
    pub distance_from_segment_start: f64,
    pub distance_from_girder_start: f64,
    pub attributes: PoiAttributes,
}

impl AnalysisPoint {
    /// A cataloged point on a precast segment
    pub fn new(segment: SegmentKey, distance_from_segment_start: f64, distance_from_girder_start: f64) -> Self {
        AnalysisPoint {
            id: Some(Uuid::new_v4()),
            segment,
            distance_from_segment_start,
            distance_from_girder_start,
            attributes: PoiAttributes::segment(),
        }
    }

    /// A point created by a consumer, not part of any catalog
    pub fn on_the_fly(segment: SegmentKey, distance_from_segment_start: f64, distance_from_girder_start: f64) -> Self {
        AnalysisPoint {
            id: None,
            ..Self::new(segment, distance_from_segment_start, distance_from_girder_start)
        }
    }

    pub fn with_attributes(mut self, attributes: PoiAttributes) -> Self {
        self.attributes = attributes;
        self
    }

    pub fn girder_key(&self) -> GirderKey {
        self.segment.girder_key()
    }

    pub fn girder_line(&self) -> GirderLineKey {
        self.segment.girder_key().girder_line()
    }

    /// Coordinate of this point in the local system of `member`
    pub fn member_position(&self, member: &MemberKey) -> f64 {
        match member {
            MemberKey::Segment(_) => self.distance_from_segment_start,
            MemberKey::Girder(_) => self.distance_from_girder_start,
        }
    }

    /// Whether this point lies on `member`
    pub fn is_on(&self, member: &MemberKey) -> bool {
        match member {
            MemberKey::Segment(segment) => self.segment == *segment && !self.attributes.in_closure,
            MemberKey::Girder(girder) => self.girder_key() == *girder,
        }
    }
}

/// A cataloged point and its position along the girder line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub point: AnalysisPoint,
    pub line_position: f64,
}

/// Sorted, randomly indexable analysis points of one girder line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoiCatalog {
    line: GirderLineKey,
    /// Girders of the line with their starting line position
    girders: Vec<(GirderKey, f64)>,
    entries: Vec<CatalogEntry>,
}

impl PoiCatalog {
    /// Build the catalog from the points of every girder on the line.
    ///
    /// `girders` must be in group order, each with its length and points.
    pub fn build(line: GirderLineKey, girders: Vec<(GirderKey, f64, Vec<AnalysisPoint>)>) -> LossResult<Self> {
        let mut offsets = Vec::with_capacity(girders.len());
        let mut entries = Vec::new();
        let mut offset = 0.0;
        for (girder, length, points) in girders {
            if !(length > 0.0) {
                return Err(LossError::invalid_input(
                    format!("girder_length[{girder}]"),
                    length.to_string(),
                    "Girder length must be positive",
                ));
            }
            offsets.push((girder, offset));
            entries.extend(points.into_iter().map(|point| CatalogEntry {
                line_position: offset + point.distance_from_girder_start,
                point,
            }));
            offset += length;
        }

        if entries.is_empty() {
            return Err(LossError::NoAnalysisPoints { girder_line: line.0 });
        }

        entries.sort_by(|a, b| {
            a.point
                .girder_key()
                .cmp(&b.point.girder_key())
                .then(a.line_position.total_cmp(&b.line_position))
        });

        Ok(PoiCatalog {
            line,
            girders: offsets,
            entries,
        })
    }

    pub fn line(&self) -> GirderLineKey {
        self.line
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn point(&self, index: usize) -> &AnalysisPoint {
        &self.entries[index].point
    }

    pub fn points(&self) -> impl Iterator<Item = &AnalysisPoint> {
        self.entries.iter().map(|e| &e.point)
    }

    pub fn girders(&self) -> impl Iterator<Item = GirderKey> + '_ {
        self.girders.iter().map(|(g, _)| *g)
    }

    /// Line position of any point on one of this line's girders
    pub fn line_position(&self, point: &AnalysisPoint) -> Option<f64> {
        let girder = point.girder_key();
        self.girders
            .iter()
            .find(|(g, _)| *g == girder)
            .map(|(_, offset)| offset + point.distance_from_girder_start)
    }

    /// Index range of the points on `girder`
    pub fn girder_range(&self, girder: GirderKey) -> Range<usize> {
        let start = self.entries.partition_point(|e| e.point.girder_key() < girder);
        let end = self.entries.partition_point(|e| e.point.girder_key() <= girder);
        start..end
    }

    /// Index of the cataloged point at the same location, if any
    pub fn position_of(&self, point: &AnalysisPoint) -> Option<usize> {
        let position = self.line_position(point)?;
        let range = self.girder_range(point.girder_key());
        let slice = &self.entries[range.clone()];
        let first = slice.partition_point(|e| e.line_position < position - POSITION_TOLERANCE);
        slice[first..]
            .iter()
            .take_while(|e| e.line_position <= position + POSITION_TOLERANCE)
            .position(|e| e.point.segment == point.segment)
            .map(|i| range.start + first + i)
    }

    /// Index of the cataloged point on the same girder closest to `point`.
    ///
    /// Ties go to the point nearer the start of the line.
    pub fn nearest(&self, point: &AnalysisPoint) -> Option<usize> {
        let position = self.line_position(point)?;
        let range = self.girder_range(point.girder_key());
        if range.is_empty() {
            return None;
        }
        let slice = &self.entries[range.clone()];
        let upper = slice.partition_point(|e| e.line_position < position);
        let best = match upper {
            0 => 0,
            n if n == slice.len() => n - 1,
            n => {
                let below = position - slice[n - 1].line_position;
                let above = slice[n].line_position - position;
                if above < below {
                    n
                } else {
                    n - 1
                }
            }
        };
        Some(range.start + best)
    }

    /// Consecutive point pairs that share a girder
    pub fn adjacent_pairs(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        (1..self.entries.len())
            .filter(|&i| self.entries[i - 1].point.girder_key() == self.entries[i].point.girder_key())
            .map(|i| (i - 1, i))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn girder_points(group: usize, length: f64, n: usize) -> (GirderKey, f64, Vec<AnalysisPoint>) {
        let girder = GirderKey::new(group, 0);
        let segment = girder.segment(0);
        let points = (0..=n)
            .rev()
            .map(|i| {
                let x = length * i as f64 / n as f64;
                AnalysisPoint::new(segment, x, x)
            })
            .collect();
        (girder, length, points)
    }

    fn two_span_catalog() -> PoiCatalog {
        PoiCatalog::build(
            GirderLineKey(0),
            vec![girder_points(0, 100.0, 10), girder_points(1, 80.0, 8)],
        )
        .unwrap()
    }

    #[test]
    fn test_sorted_by_line_position() {
        let catalog = two_span_catalog();
        assert_eq!(catalog.len(), 20);
        let positions: Vec<f64> = catalog.entries().iter().map(|e| e.line_position).collect();
        assert!(positions.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(positions[11], 100.0);
        assert_eq!(catalog.point(11).segment.group, 1);
    }

    #[test]
    fn test_empty_catalog_rejected() {
        let err = PoiCatalog::build(GirderLineKey(3), vec![(GirderKey::new(0, 3), 10.0, vec![])]).unwrap_err();
        assert_eq!(err, LossError::NoAnalysisPoints { girder_line: 3 });
    }

    #[test]
    fn test_exact_lookup_distinguishes_girders_at_pier() {
        let catalog = two_span_catalog();
        let seg0 = GirderKey::new(0, 0).segment(0);
        let seg1 = GirderKey::new(1, 0).segment(0);
        let end_of_span_1 = AnalysisPoint::on_the_fly(seg0, 100.0, 100.0);
        let start_of_span_2 = AnalysisPoint::on_the_fly(seg1, 0.0, 0.0);
        assert_eq!(catalog.position_of(&end_of_span_1), Some(10));
        assert_eq!(catalog.position_of(&start_of_span_2), Some(11));
    }

    #[test]
    fn test_nearest_lookup() {
        let catalog = two_span_catalog();
        let seg0 = GirderKey::new(0, 0).segment(0);
        let off_grid = AnalysisPoint::on_the_fly(seg0, 33.0, 33.0);
        assert_eq!(catalog.position_of(&off_grid), None);
        assert_eq!(catalog.nearest(&off_grid), Some(3));

        let midway = AnalysisPoint::on_the_fly(seg0, 35.0, 35.0);
        assert_eq!(catalog.nearest(&midway), Some(3));

        let past_end = AnalysisPoint::on_the_fly(seg0, 120.0, 120.0);
        assert_eq!(catalog.nearest(&past_end), Some(10));
    }

    #[test]
    fn test_adjacent_pairs_stop_at_pier() {
        let catalog = two_span_catalog();
        let pairs: Vec<_> = catalog.adjacent_pairs().collect();
        assert_eq!(pairs.len(), 18);
        assert!(!pairs.contains(&(10, 11)));
    }

    #[test]
    fn test_member_position() {
        let segment = SegmentKey::new(0, 0, 1);
        let point = AnalysisPoint::new(segment, 5.0, 45.0);
        assert_eq!(point.member_position(&MemberKey::Segment(segment)), 5.0);
        assert_eq!(point.member_position(&MemberKey::Girder(segment.girder_key())), 45.0);
        assert!(point.is_on(&MemberKey::Segment(segment)));
        assert!(!point.is_on(&MemberKey::Segment(SegmentKey::new(0, 0, 0))));
    }
}
