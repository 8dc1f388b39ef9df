//! # Tendon Friction Losses
//!
//! Friction loss along a post-tensioning duct:
//!
//! ```text
//! dfpF = fpj · (1 - e^-(μα + κX))
//! ```
//!
//! where `α` is the cumulative angular change and `X` the distance from the
//! jacking end. When a tendon is jacked from both ends the closer end
//! controls, so the smaller of the two losses is kept.
//!
//! Tendon elongation is integrated with the trapezoidal rule over the
//! on-duct points while the friction losses are computed.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::collaborators::{Collaborators, DuctDetail};
use crate::details::FrictionLossDetail;
use crate::errors::LossResult;
use crate::keys::{DuctKey, JackingEnd, MemberEnd, MemberKey};
use crate::poi::AnalysisPoint;
use crate::settings::PostTensionParameters;

/// Friction results for one duct
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DuctFriction {
    pub duct: DuctKey,
    pub detail: DuctDetail,
    pub modulus: f64,
    /// One entry per point passed to [`compute_friction_losses`]
    pub losses: Vec<FrictionLossDetail>,
    /// Elongation at the start and end anchorages
    pub elongation: [f64; 2],
}

impl DuctFriction {
    pub fn elongation(&self, end: MemberEnd) -> f64 {
        self.elongation[end.index()]
    }
}

/// Friction loss at distance `x` and angular change `alpha` from a jacking end
pub fn friction_loss(fpj: f64, parameters: &PostTensionParameters, alpha: f64, x: f64) -> f64 {
    let exponent = parameters.friction_coefficient * alpha + parameters.wobble_coefficient * x;
    fpj * (1.0 - (-exponent).exp())
}

/// Compute friction loss for every duct of `member` at `points`.
///
/// `points` must be sorted by position along the member. Points the duct
/// does not reach get a zero-filled placeholder so every duct's vector has
/// the same length as `points`.
pub fn compute_friction_losses(
    cx: &Collaborators<'_>,
    parameters: &PostTensionParameters,
    member: MemberKey,
    points: &[&AnalysisPoint],
) -> LossResult<Vec<DuctFriction>> {
    let modulus = cx.materials.tendon_modulus();
    let mut results = Vec::new();

    for index in 0..cx.prestress.duct_count(member) {
        let duct = DuctKey::new(member, index);
        let detail = cx.prestress.duct(duct)?;
        let fpj = detail.jacking.stress;

        let mut losses = Vec::with_capacity(points.len());
        for point in points {
            let x = point.member_position(&member);
            if !point.is_on(&member) || !detail.contains(x) {
                losses.push(FrictionLossDetail::off_duct(x));
                continue;
            }

            let mut controlling: Option<FrictionLossDetail> = None;
            for end in MemberEnd::ALL {
                if !detail.jacking_end.jacks(end) {
                    continue;
                }
                let distance = match end {
                    MemberEnd::Start => x - detail.start,
                    MemberEnd::End => detail.end - x,
                }
                .max(0.0);
                let alpha = cx.prestress.angular_change(duct, point, end)?;
                let candidate = FrictionLossDetail {
                    on_duct: true,
                    position: x,
                    distance,
                    angular_change: alpha,
                    friction_loss: friction_loss(fpj, parameters, alpha, distance),
                    anchor_set_loss: 0.0,
                };
                controlling = match controlling {
                    Some(current) if current.friction_loss <= candidate.friction_loss => Some(current),
                    _ => Some(candidate),
                };
            }
            losses.push(controlling.unwrap_or_else(|| FrictionLossDetail::off_duct(x)));
        }

        let elongation = elongation(&detail, modulus, &losses);
        debug!(%duct, start = elongation[0], end = elongation[1], "tendon elongation");

        results.push(DuctFriction {
            duct,
            detail,
            modulus,
            losses,
            elongation,
        });
    }

    Ok(results)
}

/// Trapezoidal integration of the tendon force along the duct, divided by
/// the axial stiffness of the tendon
fn elongation(detail: &DuctDetail, modulus: f64, losses: &[FrictionLossDetail]) -> [f64; 2] {
    let fpj = detail.jacking.stress;
    let area = detail.area;
    let stiffness = area * modulus;
    if stiffness <= 0.0 {
        return [0.0; 2];
    }

    let mut integral = 0.0;
    let mut previous: Option<&FrictionLossDetail> = None;
    for current in losses.iter().filter(|l| l.on_duct) {
        if let Some(prev) = previous {
            let dx = current.position - prev.position;
            integral += area * (fpj - 0.5 * (current.friction_loss + prev.friction_loss)) * dx;
        }
        previous = Some(current);
    }
    let total = integral / stiffness;

    match detail.jacking_end {
        JackingEnd::Start => [total, 0.0],
        JackingEnd::End => [0.0, total],
        JackingEnd::Both => [0.5 * total, 0.5 * total],
    }
}
