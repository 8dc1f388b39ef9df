//! Per girder line result storage owned by the engine.

use std::collections::BTreeMap;

use crate::details::{AnchorSetDetail, SectionLossRecord};
use crate::intervals::IntervalIndex;
use crate::keys::{DuctKey, GirderLineKey, MemberEnd, MemberKey, SegmentKey};
use crate::poi::PoiCatalog;

/// Everything computed for one girder line
#[derive(Debug, Clone)]
pub struct LineLosses {
    pub catalog: PoiCatalog,
    /// One record per cataloged point, in catalog order
    pub records: Vec<SectionLossRecord>,
    pub girder_anchor_sets: Vec<AnchorSetDetail>,
    pub segment_anchor_sets: BTreeMap<SegmentKey, Vec<AnchorSetDetail>>,
    pub elongations: BTreeMap<DuctKey, [f64; 2]>,
}

impl LineLosses {
    pub fn new(catalog: PoiCatalog, records: Vec<SectionLossRecord>) -> Self {
        LineLosses {
            catalog,
            records,
            girder_anchor_sets: Vec::new(),
            segment_anchor_sets: BTreeMap::new(),
            elongations: BTreeMap::new(),
        }
    }

    /// First interval that has not been finalized
    pub fn next_interval(&self) -> IntervalIndex {
        self.records.first().map_or(0, |r| r.steps.len())
    }

    /// Last finalized interval
    pub fn analyzed_through(&self) -> Option<IntervalIndex> {
        self.next_interval().checked_sub(1)
    }

    pub fn anchor_set(&self, duct: &DuctKey) -> Option<&AnchorSetDetail> {
        let details = match duct.member {
            MemberKey::Girder(_) => Some(&self.girder_anchor_sets),
            MemberKey::Segment(segment) => self.segment_anchor_sets.get(&segment),
        }?;
        details.iter().find(|d| d.duct == *duct)
    }

    pub fn elongation(&self, duct: &DuctKey, end: MemberEnd) -> Option<f64> {
        self.elongations.get(duct).map(|e| e[end.index()])
    }
}

/// Results of every analyzed girder line
#[derive(Debug, Clone, Default)]
pub struct LossStore {
    lines: BTreeMap<GirderLineKey, LineLosses>,
}

impl LossStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, line: GirderLineKey) -> bool {
        self.lines.contains_key(&line)
    }

    pub fn get(&self, line: GirderLineKey) -> Option<&LineLosses> {
        self.lines.get(&line)
    }

    pub fn get_mut(&mut self, line: GirderLineKey) -> Option<&mut LineLosses> {
        self.lines.get_mut(&line)
    }

    pub fn insert(&mut self, line: GirderLineKey, losses: LineLosses) {
        self.lines.insert(line, losses);
    }

    pub fn remove(&mut self, line: GirderLineKey) -> Option<LineLosses> {
        self.lines.remove(&line)
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }
}
