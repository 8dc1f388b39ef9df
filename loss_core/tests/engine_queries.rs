//! Query behavior of the engine: caching, nearest points, invalidation

mod common;

use loss_core::errors::LossError;
use loss_core::keys::GirderLineKey;
use loss_core::settings::LossMethod;
use loss_core::status::{StatusCategory, StatusSeverity};
use loss_core::LossSettings;

use common::*;

#[test]
fn test_repeated_requests_are_identical() {
    let mut model = reference(pretensioned(2));
    let mut engine = engine();
    let midspan = point(1, SPAN / 2.0);

    let first = engine.get_losses(&mut model.collaborators(), &midspan, 3).unwrap();
    let again = engine.get_losses(&mut model.collaborators(), &midspan, 3).unwrap();
    assert_eq!(first, again);

    // Advancing further leaves finalized intervals untouched
    engine.get_losses(&mut model.collaborators(), &midspan, LAST).unwrap();
    let later = engine.get_losses(&mut model.collaborators(), &midspan, 3).unwrap();
    assert_eq!(first, later);
    assert_eq!(engine.analyzed_through(GirderLineKey(0)), Some(LAST));
}

#[test]
fn test_off_catalog_point_uses_nearest() {
    let mut model = reference(pretensioned(1));
    let mut engine = engine();

    let record = engine.get_losses(&mut model.collaborators(), &point(0, 610.0), RELEASE).unwrap();
    assert!(record.approximated);
    assert_eq!(record.requested.distance_from_girder_start, 610.0);
    assert_eq!(record.source.distance_from_girder_start, 600.0);
    assert_eq!(engine.status().count(StatusCategory::Approximation), 1);

    let exact = engine.get_losses(&mut model.collaborators(), &point(0, 600.0), RELEASE).unwrap();
    assert!(!exact.approximated);
    assert_eq!(exact.detail, record.detail);
    assert_eq!(engine.status().count(StatusCategory::Approximation), 1);
}

#[test]
fn test_unsupported_loss_method() {
    let mut model = reference(pretensioned(1));
    let settings = LossSettings::default().with_loss_method(LossMethod::Refined);
    let mut engine = loss_core::TimeStepLossEngine::new(settings).unwrap();

    let err = engine
        .get_losses(&mut model.collaborators(), &point(0, 600.0), 0)
        .unwrap_err();
    assert!(matches!(err, LossError::UnsupportedConfiguration { .. }));

    let items = engine.take_status_items();
    assert_eq!(items.len(), 1);
    assert!(matches!(items[0].severity, StatusSeverity::Error));
    assert_eq!(items[0].category, StatusCategory::Configuration);
    assert!(engine.status().is_empty());
}

#[test]
fn test_interval_out_of_range() {
    let mut model = reference(pretensioned(1));
    let mut engine = engine();
    let count = model.model().timeline.len();

    let err = engine
        .get_losses(&mut model.collaborators(), &point(0, 600.0), count)
        .unwrap_err();
    assert_eq!(err.error_code(), "INTERVAL_OUT_OF_RANGE");
    assert_eq!(engine.analyzed_through(GirderLineKey(0)), None);
}

#[test]
fn test_invalidation_discards_results() {
    let mut model = reference(pretensioned(1));
    let mut engine = engine();
    let midspan = point(0, 600.0);
    let line = GirderLineKey(0);

    engine.get_losses(&mut model.collaborators(), &midspan, 3).unwrap();
    assert_eq!(engine.analyzed_through(line), Some(3));
    engine.invalidate_line(line);
    assert_eq!(engine.analyzed_through(line), None);

    engine.get_losses(&mut model.collaborators(), &midspan, 3).unwrap();
    engine.invalidate();
    assert_eq!(engine.analyzed_through(line), None);

    engine.get_losses(&mut model.collaborators(), &midspan, 3).unwrap();
    engine
        .set_settings(LossSettings::default().with_ignore_relaxation(true))
        .unwrap();
    assert_eq!(engine.analyzed_through(line), None);

    let record = engine.get_losses(&mut model.collaborators(), &midspan, 3).unwrap();
    assert!(record.detail.strands.iter().all(|s| s.relaxation == 0.0));
}
