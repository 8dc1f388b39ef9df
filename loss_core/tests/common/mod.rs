//! Scenarios shared by the integration tests

#![allow(dead_code)]

use loss_core::collaborators::BridgeTopology;
use loss_core::intervals::{Interval, Milestones, Timeline};
use loss_core::keys::{GirderKey, JackingEnd};
use loss_core::poi::AnalysisPoint;
use loss_core::reference::model::{GirderLineModel, TendonLayout, TendonMember};
use loss_core::reference::ReferenceModel;
use loss_core::{LossRecord, LossSettings, TimeStepLossEngine};

pub const SPAN: f64 = 1200.0;
pub const RELEASE: usize = 2;
pub const ERECTION: usize = 4;
pub const CONTINUITY: usize = 5;
pub const LIVE_LOAD: usize = 7;
pub const LAST: usize = 7;

/// ```text
/// 0 cast [0,0]   1 stress [0,1]   2 release [1,1]   3 storage [1,30]
/// 4 erect [30,30]   5 continuity [30,30]   6 [30,90]   7 service [90,2000]
/// ```
pub fn timeline() -> Timeline {
    Timeline::new(
        vec![
            Interval::new("Cast girder", 0.0, 0.0),
            Interval::new("Stress strands", 0.0, 1.0),
            Interval::new("Release", 1.0, 1.0),
            Interval::new("Storage", 1.0, 30.0),
            Interval::new("Erect girders", 30.0, 30.0),
            Interval::new("Make continuous", 30.0, 30.0),
            Interval::new("Time to service", 30.0, 90.0),
            Interval::new("Service", 90.0, 2000.0),
        ],
        Milestones::default()
            .with_stress_strands(1)
            .with_release(RELEASE)
            .with_storage(3)
            .with_erection(ERECTION)
            .with_composite_closure(ERECTION)
            .with_continuity(CONTINUITY)
            .with_live_load(LIVE_LOAD),
    )
}

/// Pretensioned girders without deck, tendons or superimposed loads
pub fn pretensioned(spans: usize) -> GirderLineModel {
    GirderLineModel {
        name: "Pretensioned".to_string(),
        spans: vec![SPAN; spans],
        deck: None,
        tendons: Vec::new(),
        loads: Vec::new(),
        storage_support_offset: 0.0,
        timeline: timeline(),
        ..GirderLineModel::demo()
    }
}

/// One girder tendon in the first span, stressed at erection
pub fn post_tensioned(jacking_end: JackingEnd, strand_count: usize) -> GirderLineModel {
    let mut model = pretensioned(1);
    model.name = "Post-tensioned".to_string();
    model.tendons = vec![TendonLayout {
        member: TendonMember::Girder,
        span: 0,
        strand_count,
        strand_area: 0.153,
        jacking_stress: 202.5,
        jacking_end,
        y_end: 30.0,
        y_mid: 48.0,
        stressing_interval: ERECTION,
    }];
    model
}

pub fn reference(model: GirderLineModel) -> ReferenceModel {
    ReferenceModel::new(model).expect("scenario is valid")
}

pub fn engine() -> TimeStepLossEngine {
    TimeStepLossEngine::new(LossSettings::default()).expect("default settings are valid")
}

/// Every analysis point of the line, in girder then position order
pub fn line_points(model: &ReferenceModel) -> Vec<AnalysisPoint> {
    let mut points = Vec::new();
    for group in 0..model.bridge.group_count() {
        let mut girder = model.bridge.analysis_points(GirderKey::new(group, 0)).unwrap();
        girder.sort_by(|a, b| a.distance_from_girder_start.total_cmp(&b.distance_from_girder_start));
        points.extend(girder);
    }
    points
}

pub fn point(group: usize, x: f64) -> AnalysisPoint {
    AnalysisPoint::on_the_fly(GirderKey::new(group, 0).segment(0), x, x)
}

/// Records of one point for intervals `0..=through`
pub fn history(
    engine: &mut TimeStepLossEngine,
    model: &mut ReferenceModel,
    point: &AnalysisPoint,
    through: usize,
) -> Vec<LossRecord> {
    (0..=through)
        .map(|i| engine.get_losses(&mut model.collaborators(), point, i).unwrap())
        .collect()
}
