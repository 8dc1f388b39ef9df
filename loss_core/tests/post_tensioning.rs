//! Friction, anchor set and elongation of girder tendons

mod common;

use approx::assert_relative_eq;
use loss_core::keys::{DuctKey, GirderKey, JackingEnd, MemberEnd, MemberKey};
use loss_core::losses::FrictionCurve;

use common::*;

fn girder_duct() -> DuctKey {
    DuctKey::new(MemberKey::Girder(GirderKey::new(0, 0)), 0)
}

/// (position, friction loss, anchor-set loss) of the girder duct at every point
fn friction_profile(jacking_end: JackingEnd) -> Vec<(f64, f64, f64)> {
    let mut model = reference(post_tensioned(jacking_end, 12));
    let mut engine = engine();
    line_points(&model)
        .iter()
        .map(|p| {
            let losses = engine.friction_losses(&mut model.collaborators(), p).unwrap();
            let d = losses.girder[0];
            (d.position, d.friction_loss, d.anchor_set_loss)
        })
        .collect()
}

#[test]
fn test_friction_grows_away_from_jacking_end() {
    let profile = friction_profile(JackingEnd::Start);
    assert_eq!(profile[0].1, 0.0);
    for pair in profile.windows(2) {
        assert!(pair[1].1 >= pair[0].1, "friction dropped at {}", pair[1].0);
    }

    let reversed = friction_profile(JackingEnd::End);
    for pair in reversed.windows(2) {
        assert!(pair[1].1 <= pair[0].1);
    }
    assert_eq!(reversed.last().unwrap().1, 0.0);
}

#[test]
fn test_anchor_set_matches_draw_in() {
    let profile = friction_profile(JackingEnd::Start);
    let mut model = reference(post_tensioned(JackingEnd::Start, 12));
    let mut engine = engine();
    let detail = engine.anchor_set_details(&mut model.collaborators(), girder_duct()).unwrap();

    let start = detail.end(MemberEnd::Start);
    assert!(start.jacked);
    assert!(start.seating_length > 0.0);
    assert!(!detail.end(MemberEnd::End).jacked);

    let curve = FrictionCurve::new(profile.iter().map(|(x, f, _)| (*x, *f)).collect());
    let modulus = model.model().tendon.modulus;
    let anchor_set = engine.settings().post_tensioning.anchor_set;
    let evaluation = curve.evaluate(start.seating_length, modulus);
    assert_relative_eq!(evaluation.draw_in, anchor_set, max_relative = 1e-6);
    assert_relative_eq!(evaluation.anchorage_loss, start.anchorage_loss, max_relative = 1e-12);

    // The anchor-set loss is largest at the anchorage and never exceeds fpj
    let fpj = 202.5;
    assert!(profile[0].2 > 0.0);
    for (_, friction, anchor) in &profile {
        assert!(friction + anchor <= fpj + 1e-9);
    }
}

#[test]
fn test_both_ends_are_symmetric() {
    let mut model = reference(post_tensioned(JackingEnd::Both, 12));
    let mut engine = engine();
    let duct = girder_duct();

    let detail = engine.anchor_set_details(&mut model.collaborators(), duct).unwrap();
    let (start, end) = (detail.end(MemberEnd::Start), detail.end(MemberEnd::End));
    assert_relative_eq!(start.zero_movement, SPAN / 2.0, max_relative = 1e-9);
    assert_relative_eq!(end.zero_movement, SPAN / 2.0, max_relative = 1e-9);
    assert_relative_eq!(start.seating_length, end.seating_length, max_relative = 1e-4);

    let at_start = engine.elongation(&mut model.collaborators(), duct, MemberEnd::Start).unwrap();
    let at_end = engine.elongation(&mut model.collaborators(), duct, MemberEnd::End).unwrap();
    assert!(at_start > 0.0);
    assert_eq!(at_start, at_end);

    let quarter = engine.friction_losses(&mut model.collaborators(), &point(0, 0.3 * SPAN)).unwrap();
    let three_quarter = engine.friction_losses(&mut model.collaborators(), &point(0, 0.7 * SPAN)).unwrap();
    assert_relative_eq!(
        quarter.girder[0].friction_loss,
        three_quarter.girder[0].friction_loss,
        max_relative = 1e-9
    );
}

#[test]
fn test_tendon_losses_after_stressing() {
    let mut model = reference(post_tensioned(JackingEnd::Start, 12));
    let mut engine = engine();
    let records = history(&mut engine, &mut model, &point(0, SPAN / 2.0), LAST);

    let tendon = |i: usize| &records[i].detail.tendons[0];
    assert!(!tendon(ERECTION - 1).stressed);
    assert_eq!(tendon(ERECTION - 1).loss.cumulative, 0.0);

    // Friction and anchor set land in the stressing interval; the tendon is
    // grouted afterwards
    let stressed = tendon(ERECTION);
    assert!(stressed.stressed && !stressed.bonded);
    let friction = records[ERECTION].friction.girder[0];
    assert_relative_eq!(stressed.loss.incremental, friction.total_loss(), max_relative = 1e-12);
    assert!(tendon(ERECTION + 1).bonded);

    assert!(tendon(LAST).loss.cumulative > tendon(ERECTION).loss.cumulative);
    assert!(records.iter().all(|r| r.detail.equilibrium_ok));
}

#[test]
fn test_duct_without_strands() {
    let mut model = reference(post_tensioned(JackingEnd::Both, 0));
    let mut engine = engine();
    let duct = girder_duct();

    let detail = engine.anchor_set_details(&mut model.collaborators(), duct).unwrap();
    for end in MemberEnd::ALL {
        assert_eq!(detail.end(end).seating_length, 0.0);
        assert_eq!(detail.end(end).anchorage_loss, 0.0);
        assert_eq!(engine.elongation(&mut model.collaborators(), duct, end).unwrap(), 0.0);
    }

    let record = engine
        .get_losses(&mut model.collaborators(), &point(0, SPAN / 2.0), LAST)
        .unwrap();
    let tendon = &record.detail.tendons[0];
    assert!(!tendon.stressed);
    assert_eq!(tendon.loss.cumulative, 0.0);
    assert_eq!(tendon.effective_force, 0.0);
}

#[test]
fn test_unknown_duct() {
    let mut model = reference(post_tensioned(JackingEnd::Start, 12));
    let mut engine = engine();
    let missing = DuctKey::new(MemberKey::Girder(GirderKey::new(0, 0)), 3);
    let err = engine.anchor_set_details(&mut model.collaborators(), missing).unwrap_err();
    assert_eq!(err.error_code(), "DUCT_NOT_FOUND");
    assert!(engine.elongation(&mut model.collaborators(), missing, MemberEnd::Start).is_err());
}
