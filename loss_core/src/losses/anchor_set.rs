//! # Anchor Set
//!
//! When the wedges seat, the tendon slips back by the anchor set `Dset`.
//! Friction reverses over a seating zone of length `Xset`, so the anchor-set
//! loss at a point `x` inside the zone mirrors the friction curve:
//!
//! ```text
//! dfpA(x) = 2 · (dfpF(Xset) - dfpF(x))
//! Dset    = (2 / E) ∫₀^Xset (dfpF(Xset) - dfpF(x)) dx
//! ```
//!
//! `Xset` is found with a false-position search: the bracket is grown
//! geometrically from a first guess, capped at the tendon length, then
//! narrowed with Illinois damping. Beyond the point of zero movement the
//! friction curve is extended with its last rising slope; the part of the
//! loss that develops beyond that point is the short-tendon loss `dfpS`.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::details::{AnchorSetDetail, AnchorSetEnd};
use crate::errors::{LossError, LossResult};
use crate::keys::{DuctKey, JackingEnd, MemberEnd};
use crate::losses::friction::DuctFriction;
use crate::settings::AnchorSetSolverSettings;

/// Two friction losses closer than this are treated as equal
const FLAT_TOLERANCE: f64 = 1.0e-12;

/// Friction loss sampled at increasing distance from a jacking end, up to
/// the point of zero movement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrictionCurve {
    samples: Vec<(f64, f64)>,
}

/// Result of evaluating the anchor set for a trial seating length
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AnchorSetEvaluation {
    pub draw_in: f64,
    pub anchorage_loss: f64,
    pub short_tendon_loss: f64,
}

impl FrictionCurve {
    /// Build from `(distance, loss)` pairs sorted by distance.
    ///
    /// A zero-loss sample is added at the anchorage if the first sample is
    /// not there.
    pub fn new(mut samples: Vec<(f64, f64)>) -> Self {
        if samples.first().map_or(true, |(x, _)| *x > 0.0) {
            samples.insert(0, (0.0, 0.0));
        }
        FrictionCurve { samples }
    }

    /// Distance from the jacking end to the point of zero movement
    pub fn length(&self) -> f64 {
        self.samples.last().map_or(0.0, |(x, _)| *x)
    }

    /// Friction loss at `x`, extrapolated linearly past either end
    pub fn loss_at(&self, x: f64) -> f64 {
        let n = self.samples.len();
        if n == 1 {
            return self.samples[0].1;
        }
        let (x_last, f_last) = self.samples[n - 1];
        if x > x_last {
            return f_last + self.tail_slope() * (x - x_last);
        }
        let i = self.samples.partition_point(|(xi, _)| *xi < x).clamp(1, n - 1);
        let (x0, f0) = self.samples[i - 1];
        let (x1, f1) = self.samples[i];
        if x1 - x0 <= 0.0 {
            return f1;
        }
        f0 + (f1 - f0) * (x - x0) / (x1 - x0)
    }

    /// Slope of the last segment along which the friction loss still changes.
    ///
    /// A plateau at the point of zero movement (two points straddling it with
    /// equal loss) is skipped.
    fn tail_slope(&self) -> f64 {
        self.samples
            .windows(2)
            .rev()
            .find(|pair| pair[1].0 > pair[0].0 && (pair[1].1 - pair[0].1).abs() > FLAT_TOLERANCE)
            .map_or(0.0, |pair| (pair[1].1 - pair[0].1) / (pair[1].0 - pair[0].0))
    }

    /// True when friction is negligible over the whole curve
    pub fn is_flat(&self) -> bool {
        let first = self.samples[0].1;
        self.samples.iter().all(|(_, f)| (f - first).abs() <= FLAT_TOLERANCE)
    }

    /// Draw-in and losses for a trial seating length `x_set`
    pub fn evaluate(&self, x_set: f64, modulus: f64) -> AnchorSetEvaluation {
        let f_set = self.loss_at(x_set);
        let limit = x_set.min(self.length());

        let mut integral = 0.0;
        for pair in self.samples.windows(2) {
            let (xa, fa) = pair[0];
            let (xb, fb) = pair[1];
            if xa >= limit {
                break;
            }
            let (xb, fb) = if xb > limit { (limit, self.loss_at(limit)) } else { (xb, fb) };
            integral += 0.5 * ((f_set - fa) + (f_set - fb)) * (xb - xa);
        }

        let short_tendon_loss = if x_set > self.length() {
            2.0 * (f_set - self.loss_at(self.length()))
        } else {
            0.0
        };

        AnchorSetEvaluation {
            draw_in: 2.0 * integral / modulus,
            anchorage_loss: 2.0 * f_set,
            short_tendon_loss,
        }
    }
}

/// Solve the seating length at one end of a duct.
///
/// A duct without strands returns zeros without iterating. The seating zone
/// never extends past `duct_length`; when friction reversal over the whole
/// tendon cannot develop the draw-in (a flat curve included), the remainder
/// is spread uniformly as the short-tendon loss.
pub fn solve_anchor_set(
    curve: &FrictionCurve,
    modulus: f64,
    anchor_set: f64,
    strand_count: usize,
    duct_length: f64,
    solver: &AnchorSetSolverSettings,
    duct: &DuctKey,
    end: MemberEnd,
) -> LossResult<AnchorSetEnd> {
    let zero_movement = curve.length();
    if strand_count == 0 || anchor_set <= 0.0 || modulus <= 0.0 {
        return Ok(AnchorSetEnd {
            jacked: true,
            zero_movement,
            ..Default::default()
        });
    }

    if curve.is_flat() {
        return Ok(whole_tendon_seating(curve, modulus, anchor_set, duct_length));
    }

    let tolerance = solver.tolerance * anchor_set;
    let residual = |x: f64| curve.evaluate(x, modulus).draw_in - anchor_set;

    // grow the bracket until the draw-in passes the target, capped at the
    // tendon length
    let mut iterations = 0;
    let mut step = solver.initial_fraction * duct_length;
    let (mut a, mut fa) = (0.0, -anchor_set);
    let mut b = step.min(duct_length);
    let mut fb = residual(b);
    while fb < 0.0 {
        if b >= duct_length {
            debug!(%duct, %end, draw_in = fb + anchor_set, "seating zone covers the whole tendon");
            return Ok(whole_tendon_seating(curve, modulus, anchor_set, duct_length));
        }
        iterations += 1;
        if iterations > solver.max_iterations {
            return Err(LossError::anchor_set_non_convergence(duct, end, iterations, fb));
        }
        a = b;
        fa = fb;
        step *= solver.growth;
        b = (a + step).min(duct_length);
        fb = residual(b);
    }

    let x_set = if fb.abs() <= tolerance {
        b
    } else {
        let mut side = 0i8;
        let mut root = None;
        for iteration in 0..solver.max_iterations {
            let c = (a * fb - b * fa) / (fb - fa);
            let fc = residual(c);
            if fc.abs() <= tolerance || (b - a).abs() <= f64::EPSILON * c.abs().max(1.0) {
                debug!(%duct, %end, iterations = iteration + 1, x_set = c, "anchor set converged");
                root = Some(c);
                break;
            }
            if fc > 0.0 {
                b = c;
                fb = fc;
                if side == -1 {
                    fa *= 0.5;
                }
                side = -1;
            } else {
                a = c;
                fa = fc;
                if side == 1 {
                    fb *= 0.5;
                }
                side = 1;
            }
        }
        match root {
            Some(x) => x,
            None => {
                let worst = residual(0.5 * (a + b));
                return Err(LossError::anchor_set_non_convergence(
                    duct,
                    end,
                    solver.max_iterations,
                    worst,
                ));
            }
        }
    };

    let evaluation = curve.evaluate(x_set, modulus);
    Ok(AnchorSetEnd {
        jacked: true,
        seating_length: x_set,
        anchorage_loss: evaluation.anchorage_loss,
        short_tendon_loss: evaluation.short_tendon_loss,
        zero_movement,
    })
}

/// Seating zone equal to the tendon length. The draw-in left over after
/// friction reversal is spread uniformly, `E·(Dset − D(L))/L`, and carried as
/// the short-tendon loss.
fn whole_tendon_seating(
    curve: &FrictionCurve,
    modulus: f64,
    anchor_set: f64,
    duct_length: f64,
) -> AnchorSetEnd {
    if duct_length <= 0.0 {
        return AnchorSetEnd {
            jacked: true,
            zero_movement: curve.length(),
            ..Default::default()
        };
    }
    let evaluation = curve.evaluate(duct_length, modulus);
    let uniform = modulus * (anchor_set - evaluation.draw_in).max(0.0) / duct_length;
    AnchorSetEnd {
        jacked: true,
        seating_length: duct_length,
        anchorage_loss: evaluation.anchorage_loss + uniform,
        short_tendon_loss: evaluation.short_tendon_loss + uniform,
        zero_movement: curve.length(),
    }
}

/// Index of the on-duct point with the largest friction loss, the point of
/// zero movement during seating
fn zero_movement_index(losses: &[(f64, f64)], jacking: JackingEnd) -> usize {
    let last = losses.len().saturating_sub(1);
    match jacking {
        JackingEnd::Start => last,
        JackingEnd::End => 0,
        JackingEnd::Both => (1..losses.len())
            .find(|&i| losses[i].1 < losses[i - 1].1)
            .map_or(last, |i| i - 1),
    }
}

/// Solve both ends of a duct and write the anchor-set loss into every
/// on-duct friction record.
///
/// The combined friction and anchor-set loss is clamped to the jacking
/// stress; the seating length is not re-solved when the clamp applies.
pub fn apply_anchor_set(
    friction: &mut DuctFriction,
    anchor_set: f64,
    solver: &AnchorSetSolverSettings,
) -> LossResult<AnchorSetDetail> {
    let detail = friction.detail;
    let on_duct: Vec<usize> = (0..friction.losses.len())
        .filter(|&i| friction.losses[i].on_duct)
        .collect();
    let samples: Vec<(f64, f64)> = on_duct
        .iter()
        .map(|&i| (friction.losses[i].position, friction.losses[i].friction_loss))
        .collect();

    let mut ends = [AnchorSetEnd::default(); 2];
    if samples.is_empty() {
        return Ok(AnchorSetDetail {
            duct: friction.duct,
            ends,
        });
    }

    let peak = zero_movement_index(&samples, detail.jacking_end);
    let mut curves: [Option<FrictionCurve>; 2] = [None, None];
    if detail.jacking_end.jacks(MemberEnd::Start) {
        curves[0] = Some(FrictionCurve::new(
            samples[..=peak].iter().map(|(x, f)| (x - detail.start, *f)).collect(),
        ));
    }
    if detail.jacking_end.jacks(MemberEnd::End) {
        curves[1] = Some(FrictionCurve::new(
            samples[peak..].iter().rev().map(|(x, f)| (detail.end - x, *f)).collect(),
        ));
    }

    for end in MemberEnd::ALL {
        if let Some(curve) = &curves[end.index()] {
            ends[end.index()] = solve_anchor_set(
                curve,
                friction.modulus,
                anchor_set,
                detail.strand_count,
                detail.length(),
                solver,
                &friction.duct,
                end,
            )?;
        }
    }

    let fpj = detail.jacking.stress;
    for (k, &i) in on_duct.iter().enumerate() {
        let end = match detail.jacking_end {
            JackingEnd::Start => MemberEnd::Start,
            JackingEnd::End => MemberEnd::End,
            JackingEnd::Both if k <= peak => MemberEnd::Start,
            JackingEnd::Both => MemberEnd::End,
        };
        let Some(curve) = &curves[end.index()] else {
            continue;
        };
        let solution = &ends[end.index()];
        let record = &mut friction.losses[i];
        let distance = match end {
            MemberEnd::Start => record.position - detail.start,
            MemberEnd::End => detail.end - record.position,
        };
        // dfpA(x) = dfpAT - 2·dfpF(x) inside the seating zone; dfpAT carries
        // any uniform short-tendon part
        let loss = if distance <= solution.seating_length {
            solution.anchorage_loss - 2.0 * curve.loss_at(distance)
        } else {
            0.0
        };
        record.anchor_set_loss = loss.min(fpj - record.friction_loss).max(0.0);
    }

    Ok(AnchorSetDetail {
        duct: friction.duct,
        ends,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborators::{DuctDetail, Jacking};
    use crate::details::FrictionLossDetail;
    use crate::keys::{GirderKey, MemberKey};
    use crate::losses::friction::friction_loss;
    use crate::settings::PostTensionParameters;
    use approx::assert_relative_eq;

    const E: f64 = 28500.0;

    fn duct() -> DuctKey {
        DuctKey::new(MemberKey::Girder(GirderKey::new(0, 0)), 0)
    }

    /// Loss growing linearly at `slope` ksi per inch over `length`
    fn linear_curve(slope: f64, length: f64) -> FrictionCurve {
        FrictionCurve::new((0..=20).map(|i| {
            let x = length * i as f64 / 20.0;
            (x, slope * x)
        }).collect())
    }

    #[test]
    fn test_linear_curve_closed_form() {
        // For dfpF = p·x, Dset = p·X²/E
        let slope = 0.01;
        let curve = linear_curve(slope, 1200.0);
        let end = solve_anchor_set(&curve, E, 0.375, 12, 1200.0, &AnchorSetSolverSettings::default(), &duct(), MemberEnd::Start)
            .unwrap();
        let expected = (0.375 * E / slope).sqrt();
        assert_relative_eq!(end.seating_length, expected, max_relative = 1e-6);
        assert_relative_eq!(end.anchorage_loss, 2.0 * slope * expected, max_relative = 1e-6);
        assert_eq!(end.short_tendon_loss, 0.0);
    }

    #[test]
    fn test_round_trip() {
        let curve = FrictionCurve::new(vec![(0.0, 0.0), (200.0, 3.0), (500.0, 5.0), (900.0, 9.5), (1200.0, 11.0)]);
        let solver = AnchorSetSolverSettings::default();
        let end = solve_anchor_set(&curve, E, 0.25, 8, 1200.0, &solver, &duct(), MemberEnd::Start).unwrap();
        let evaluation = curve.evaluate(end.seating_length, E);
        assert_relative_eq!(evaluation.draw_in, 0.25, max_relative = 1e-6);
    }

    #[test]
    fn test_short_tendon_loss() {
        // Friction reversal over 100 in develops only p·L²/E of draw-in
        let slope = 0.01;
        let curve = linear_curve(slope, 100.0);
        let end = solve_anchor_set(&curve, E, 0.375, 4, 100.0, &AnchorSetSolverSettings::default(), &duct(), MemberEnd::Start)
            .unwrap();
        assert_eq!(end.seating_length, 100.0);
        let reversal = slope * 100.0 * 100.0 / E;
        let uniform = E * (0.375 - reversal) / 100.0;
        assert_relative_eq!(end.short_tendon_loss, uniform, max_relative = 1e-9);
        assert_relative_eq!(end.anchorage_loss, 2.0 * slope * 100.0 + uniform, max_relative = 1e-9);
    }

    #[test]
    fn test_zero_strands() {
        let curve = linear_curve(0.01, 1200.0);
        let end = solve_anchor_set(&curve, E, 0.375, 0, 1200.0, &AnchorSetSolverSettings::default(), &duct(), MemberEnd::Start)
            .unwrap();
        assert_eq!(end.seating_length, 0.0);
        assert_eq!(end.anchorage_loss, 0.0);
        assert_eq!(end.short_tendon_loss, 0.0);
    }

    #[test]
    fn test_flat_curve_uniform_loss() {
        let curve = linear_curve(0.0, 1200.0);
        let end = solve_anchor_set(&curve, E, 0.375, 4, 1200.0, &AnchorSetSolverSettings::default(), &duct(), MemberEnd::Start)
            .unwrap();
        assert_relative_eq!(end.anchorage_loss, E * 0.375 / 1200.0);
        assert_eq!(end.seating_length, 1200.0);
    }

    #[test]
    fn test_iteration_budget_exhausted() {
        let curve = FrictionCurve::new(vec![(0.0, 0.0), (300.0, 4.0), (700.0, 6.0), (1200.0, 11.0)]);
        let solver = AnchorSetSolverSettings {
            max_iterations: 1,
            tolerance: 1e-15,
            ..Default::default()
        };
        let err = solve_anchor_set(&curve, E, 0.375, 4, 1200.0, &solver, &duct(), MemberEnd::Start).unwrap_err();
        assert_eq!(err.error_code(), "ANCHOR_SET_NON_CONVERGENCE");
    }

    #[test]
    fn test_loss_at_extrapolates() {
        let curve = linear_curve(0.02, 100.0);
        assert_relative_eq!(curve.loss_at(50.0), 1.0, max_relative = 1e-12);
        assert_relative_eq!(curve.loss_at(150.0), 3.0, max_relative = 1e-12);

        // A plateau at the end keeps the last rising slope
        let plateau = FrictionCurve::new(vec![(0.0, 0.0), (60.0, 1.2), (120.0, 2.4), (180.0, 2.4)]);
        assert_relative_eq!(plateau.loss_at(150.0), 2.4, max_relative = 1e-12);
        assert_relative_eq!(plateau.loss_at(240.0), 3.6, max_relative = 1e-12);
    }

    /// Both-ends duct with evenly spaced points and none at midspan
    fn symmetric_duct(length: f64, points: usize) -> DuctFriction {
        let parameters = PostTensionParameters {
            friction_coefficient: 0.25,
            wobble_coefficient: 0.0002,
            anchor_set: 0.375,
        };
        let detail = DuctDetail {
            strand_count: 12,
            area: 1.836,
            jacking: Jacking { force: 1.836 * 202.5, stress: 202.5 },
            jacking_end: JackingEnd::Both,
            start: 0.0,
            end: length,
        };
        let losses = (0..points)
            .map(|i| {
                let x = length * i as f64 / (points - 1) as f64;
                let from_end = x.min(length - x);
                FrictionLossDetail {
                    on_duct: true,
                    position: x,
                    friction_loss: friction_loss(202.5, &parameters, 0.0005 * from_end, from_end),
                    ..Default::default()
                }
            })
            .collect();
        DuctFriction {
            duct: duct(),
            detail,
            modulus: E,
            losses,
            elongation: [0.0; 2],
        }
    }

    #[test]
    fn test_both_ends_without_midspan_point() {
        let mut friction = symmetric_duct(300.0, 6);
        let detail = apply_anchor_set(&mut friction, 0.375, &AnchorSetSolverSettings::default()).unwrap();

        for end in MemberEnd::ALL {
            let solution = detail.end(end);
            assert!(solution.jacked);
            assert!(solution.seating_length <= 300.0);
            assert!(solution.anchorage_loss > 0.0);
        }
        // Short duct: the seating zone spans the tendon and dfpS takes the rest
        let start = detail.end(MemberEnd::Start);
        assert_eq!(start.seating_length, 300.0);
        assert!(start.short_tendon_loss > 0.0);

        for record in &friction.losses {
            assert!(record.anchor_set_loss > 0.0);
            assert!(record.friction_loss + record.anchor_set_loss <= 202.5 + 1e-9);
        }
    }

    #[test]
    fn test_both_ends_long_duct_converges_inside() {
        let mut friction = symmetric_duct(2400.0, 8);
        let detail = apply_anchor_set(&mut friction, 0.375, &AnchorSetSolverSettings::default()).unwrap();
        let start = detail.end(MemberEnd::Start);
        assert!(start.seating_length < 2400.0);
        assert_eq!(start.short_tendon_loss, 0.0);
        let curve = FrictionCurve::new(
            friction.losses[..=3].iter().map(|r| (r.position, r.friction_loss)).collect(),
        );
        assert_relative_eq!(curve.evaluate(start.seating_length, E).draw_in, 0.375, max_relative = 1e-6);
    }

    #[test]
    fn test_zero_movement_index() {
        let samples = vec![(0.0, 0.0), (1.0, 2.0), (2.0, 3.0), (3.0, 2.0), (4.0, 0.0)];
        assert_eq!(zero_movement_index(&samples, JackingEnd::Both), 2);
        assert_eq!(zero_movement_index(&samples, JackingEnd::Start), 4);
        assert_eq!(zero_movement_index(&samples, JackingEnd::End), 0);
    }
}
