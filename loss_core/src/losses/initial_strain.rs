//! Redistribution of the restraint released at every point of a girder line.
//!
//! Releasing the restraint `Pr`/`Mr` of a time-dependent effect leaves the
//! composite section free to strain by `-Pr/EA` and bend by `-Mr/EI`. Over a
//! statically indeterminate girder line those deformations are not free, so
//! they are applied to the structural model as initial strain loads between
//! adjacent points and the resulting secondary forces are read back.

use tracing::debug;

use crate::collaborators::{Collaborators, InitialStrainLoad, SectionForce};
use crate::details::TimeStepDetail;
use crate::errors::{LossError, LossResult};
use crate::intervals::IntervalIndex;
use crate::loads::{ByEffect, TimeEffect};
use crate::poi::PoiCatalog;
use crate::settings::LossSettings;

/// Secondary force at every cataloged point for each time-dependent effect.
///
/// `details` holds the initialized (not yet finalized) detail of every point,
/// in catalog order.
pub fn redistribute(
    cx: &mut Collaborators<'_>,
    settings: &LossSettings,
    catalog: &PoiCatalog,
    interval: IntervalIndex,
    details: &[TimeStepDetail],
) -> LossResult<Vec<ByEffect<SectionForce>>> {
    if details.len() != catalog.len() {
        return Err(LossError::internal(format!(
            "{} details for {} cataloged points",
            details.len(),
            catalog.len()
        )));
    }

    let line = catalog.line();
    let mut responses = vec![ByEffect::<SectionForce>::default(); catalog.len()];

    for effect in TimeEffect::ALL {
        if settings.ignores(effect) {
            continue;
        }
        cx.analysis.clear_initial_strain_loads(line, interval, effect);

        let mut registered = 0;
        for (a, b) in catalog.adjacent_pairs() {
            let (first, second) = (&details[a].initial_strain[effect], &details[b].initial_strain[effect]);
            let strain = -0.5 * (first.strain + second.strain);
            let curvature = -0.5 * (first.curvature + second.curvature);
            if strain == 0.0 && curvature == 0.0 {
                continue;
            }
            cx.analysis.add_initial_strain_load(
                line,
                interval,
                effect,
                InitialStrainLoad {
                    start: catalog.point(a).clone(),
                    end: catalog.point(b).clone(),
                    strain,
                    curvature,
                },
            )?;
            registered += 1;
        }
        debug!(%line, interval, %effect, loads = registered, "initial strain loads");
        if registered == 0 {
            continue;
        }

        for (response, point) in responses.iter_mut().zip(catalog.points()) {
            response[effect] = cx.analysis.initial_strain_response(line, interval, effect, point)?;
        }
    }

    Ok(responses)
}
