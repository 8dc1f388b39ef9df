//! # Section Time-Step Model
//!
//! One analysis point, one interval, two phases (Tadros 1977).
//!
//! **Initialize** builds the age-adjusted transformed section, works out the
//! free creep and shrinkage deformation of each concrete part and the
//! intrinsic relaxation of each stressed strand or tendon, and converts
//! them into restraining forces `Pr`/`Mr`.
//!
//! **Finalize** takes every product force of the interval (applied loads,
//! prestress transfer, and the released restraint plus its secondary
//! effect from the structural solve) and distributes it to the
//! constituents by their share of the transformed stiffness:
//!
//! ```text
//! dε(y) = dP/ΣEA + dM/ΣEI · (y - ytr)
//! dPj   = Ej·Aj·dε(yj)     dMj = Ej·Ij·dM/ΣEI
//! ```
//!
//! Time-dependent constituents keep their own restraining force on top of
//! their share. Only finalized values of the previous interval are read.

use tracing::error;

use crate::collaborators::{
    Collaborators, ConcreteElement, PrestressSteel, RebarLocation, SectionBasis, SectionForce, StrandType,
};
use crate::details::{
    ConcreteStep, FaceStressRange, ForceIncrement, FreeDeformation, MomentRange, PrestressLiveLoad,
    PrestressStep, RebarStep, Restraint, SectionLossRecord, TimeStepDetail, TransformedSection,
};
use crate::errors::{LossError, LossResult};
use crate::intervals::IntervalIndex;
use crate::keys::{DuctKey, MemberKey};
use crate::loads::{ByEffect, ByProduct, ProductForceType, TimeEffect};
use crate::losses::equilibrium;
use crate::poi::AnalysisPoint;
use crate::settings::LossSettings;

// =============================================================================
// INITIALIZE
// =============================================================================

/// Build the detail of `interval` for the point of `record`, up to and
/// including the restraining forces.
pub fn initialize(
    cx: &Collaborators<'_>,
    settings: &LossSettings,
    record: &SectionLossRecord,
    interval: IntervalIndex,
) -> LossResult<TimeStepDetail> {
    let point = &record.point;
    let history = &record.steps;
    if history.len() != interval {
        return Err(LossError::internal(format!(
            "interval {interval} requested with {} intervals finalized",
            history.len()
        )));
    }
    let previous = history.last();

    let schedule = cx.intervals;
    let times = schedule.times(interval);
    let time_dependent = times.duration() > 0.0;
    let segment = point.segment;
    let in_closure = point.attributes.in_closure;
    let element = concrete_element(point);

    let activation = if in_closure {
        schedule.composite_closure_interval(segment)
    } else {
        schedule.release_interval(segment)
    };
    let active = interval >= activation;
    let deck_active = active && schedule.composite_deck_interval().map_or(false, |deck| interval >= deck);

    let mut girder = concrete_step(cx, element, SectionBasis::NetGirder, active, interval, point)?;
    let mut deck = concrete_step(cx, ConcreteElement::Deck, SectionBasis::NetDeck, deck_active, interval, point)?;

    let rebar_modulus = cx.materials.rebar_modulus();
    let rebar: Vec<RebarStep> = cx
        .sections
        .rebar_rows(point)?
        .into_iter()
        .map(|row| RebarStep {
            location: row.location,
            active: match row.location {
                RebarLocation::Girder => active,
                RebarLocation::Deck => deck_active,
            },
            modulus: rebar_modulus,
            area: row.area,
            y: row.y,
            product: ByProduct::default(),
            axial: Default::default(),
            strain: Default::default(),
            stress: Default::default(),
        })
        .collect();

    let mut strands = strand_steps(cx, settings, point, active, interval)?;
    let mut tendons = tendon_steps(cx, record, active, interval)?;

    if time_dependent && !settings.ignore_relaxation_effects {
        apply_relaxation(cx, &mut strands, previous.map(|p| p.strands.as_slice()), interval)?;
        apply_relaxation(cx, &mut tendons, previous.map(|p| p.tendons.as_slice()), interval)?;
    }

    let section = transformed_section(&girder, &deck, &rebar, &strands, &tendons);

    if time_dependent && !settings.ignore_creep_effects {
        if girder.active {
            girder.creep = creep_deformation(cx, element, interval, history, |d| &d.girder)?;
        }
        if deck.active {
            deck.creep = creep_deformation(cx, ConcreteElement::Deck, interval, history, |d| &d.deck)?;
        }
    }
    if time_dependent && !settings.ignore_shrinkage_effects {
        if girder.active {
            girder.shrinkage.strain = cx.materials.free_shrinkage_strain(element, interval)?;
        }
        if deck.active {
            deck.shrinkage.strain = cx.materials.free_shrinkage_strain(ConcreteElement::Deck, interval)?;
        }
    }

    for concrete in [&mut girder, &mut deck] {
        let ea = concrete.axial_stiffness();
        let ei = concrete.flexural_stiffness();
        concrete.restraint[TimeEffect::Creep] = Restraint {
            axial: -ea * concrete.creep.strain,
            moment: -ei * concrete.creep.curvature,
        };
        concrete.restraint[TimeEffect::Shrinkage] = Restraint {
            axial: -ea * concrete.shrinkage.strain,
            moment: -ei * concrete.shrinkage.curvature,
        };
    }

    let mut restraint: ByEffect<Restraint> = ByEffect::default();
    for effect in [TimeEffect::Creep, TimeEffect::Shrinkage] {
        for concrete in [&girder, &deck] {
            if !concrete.active {
                continue;
            }
            let own = concrete.restraint[effect];
            restraint[effect].axial += own.axial;
            restraint[effect].moment += own.moment + own.axial * (concrete.section.centroid - section.centroid);
        }
    }
    for steel in strands.iter().chain(tendons.iter()).filter(|s| s.bonded) {
        restraint[TimeEffect::Relaxation].axial += steel.restraint;
        restraint[TimeEffect::Relaxation].moment += steel.restraint * (steel.y - section.centroid);
    }

    let mut initial_strain: ByEffect<FreeDeformation> = ByEffect::default();
    for effect in TimeEffect::ALL {
        if section.axial_stiffness > 0.0 {
            initial_strain[effect].strain = restraint[effect].axial / section.axial_stiffness;
        }
        if section.flexural_stiffness > 0.0 {
            initial_strain[effect].curvature = restraint[effect].moment / section.flexural_stiffness;
        }
    }

    Ok(TimeStepDetail {
        interval,
        times,
        active,
        section,
        girder,
        deck,
        rebar,
        strands,
        tendons,
        product: ByProduct::default(),
        restraint,
        initial_strain,
        external: Default::default(),
        internal: Default::default(),
        equilibrium_ok: false,
        live_load: None,
    })
}

fn concrete_element(point: &AnalysisPoint) -> ConcreteElement {
    if point.attributes.in_closure {
        ConcreteElement::Closure(point.segment)
    } else {
        ConcreteElement::Segment(point.segment)
    }
}

fn concrete_step(
    cx: &Collaborators<'_>,
    element: ConcreteElement,
    basis: SectionBasis,
    active: bool,
    interval: IntervalIndex,
    point: &AnalysisPoint,
) -> LossResult<ConcreteStep> {
    if !active {
        return Ok(ConcreteStep::default());
    }
    let section = cx.sections.net_section(basis, interval, point)?;
    Ok(ConcreteStep {
        active: section.area > 0.0,
        modulus: cx.materials.concrete_modulus(element, interval)?,
        age_adjusted_modulus: cx.materials.age_adjusted_modulus(element, interval)?,
        section,
        ..Default::default()
    })
}

fn empty_prestress_step(steel: PrestressSteel, row: usize, modulus: f64) -> PrestressStep {
    PrestressStep {
        steel,
        row,
        y: 0.0,
        area: 0.0,
        modulus,
        stressed: false,
        bonded: false,
        fpj: 0.0,
        initial_stress: 0.0,
        jacking_force: 0.0,
        relaxation: 0.0,
        restraint: 0.0,
        product: ByProduct::default(),
        axial: Default::default(),
        strain: Default::default(),
        loss: Default::default(),
        fpe: 0.0,
        effective_force: 0.0,
        live_load: None,
    }
}

fn strand_steps(
    cx: &Collaborators<'_>,
    settings: &LossSettings,
    point: &AnalysisPoint,
    active: bool,
    interval: IntervalIndex,
) -> LossResult<Vec<PrestressStep>> {
    let segment = point.segment;
    let stress_strands = cx.intervals.stress_strands_interval(segment);
    let release = cx.intervals.release_interval(segment);
    let modulus = cx.materials.strand_modulus();

    let mut steps = Vec::new();
    for strand_type in StrandType::ALL {
        let rows = if point.attributes.in_closure {
            Vec::new()
        } else {
            cx.prestress.strand_rows(point, strand_type)?
        };
        let jacking = cx.prestress.strand_jacking(segment, strand_type)?;
        for (row, arranged) in settings.strand_model.arrange(&rows).into_iter().enumerate() {
            let mut step = empty_prestress_step(PrestressSteel::Strand(segment, strand_type), row, modulus);
            let area = arranged.effective_area();
            step.y = arranged.y;
            step.area = area;
            step.fpj = jacking.stress;
            step.initial_stress = jacking.stress;
            step.stressed = arranged.area > 0.0 && jacking.stress > 0.0 && interval >= stress_strands;
            step.bonded = step.stressed && active && interval >= release && area > 0.0;
            if step.stressed {
                step.jacking_force = arranged.area * jacking.stress;
            }
            steps.push(step);
        }
    }
    Ok(steps)
}

/// Tendons in the same order as the point's friction records: segment ducts,
/// then girder ducts
fn tendon_steps(
    cx: &Collaborators<'_>,
    record: &SectionLossRecord,
    active: bool,
    interval: IntervalIndex,
) -> LossResult<Vec<PrestressStep>> {
    let point = &record.point;
    let modulus = cx.materials.tendon_modulus();
    let segment_member = MemberKey::Segment(point.segment);
    let girder_member = MemberKey::Girder(point.girder_key());
    let ducts = (0..record.friction.segment.len())
        .map(|i| DuctKey::new(segment_member, i))
        .chain((0..record.friction.girder.len()).map(|i| DuctKey::new(girder_member, i)));

    let mut steps = Vec::new();
    for (duct, friction) in ducts.zip(record.friction.all()) {
        let mut step = empty_prestress_step(PrestressSteel::Tendon(duct), 0, modulus);
        if friction.on_duct {
            let detail = cx.prestress.duct(duct)?;
            let stressing = cx.intervals.stress_tendon_interval(duct);
            step.y = cx.prestress.tendon_offset(duct, point)?;
            step.area = detail.area;
            step.fpj = detail.jacking.stress;
            step.initial_stress = detail.jacking.stress - friction.total_loss();
            step.stressed = detail.area > 0.0 && detail.jacking.stress > 0.0 && interval >= stressing;
            step.bonded = step.stressed && active && interval > stressing;
            if step.stressed {
                step.jacking_force = detail.jacking.force;
            }
        }
        steps.push(step);
    }
    Ok(steps)
}

/// Intrinsic relaxation over the interval, starting from the previous
/// interval's effective prestress
fn apply_relaxation(
    cx: &Collaborators<'_>,
    steps: &mut [PrestressStep],
    previous: Option<&[PrestressStep]>,
    interval: IntervalIndex,
) -> LossResult<()> {
    for (i, step) in steps.iter_mut().enumerate() {
        if !step.stressed {
            continue;
        }
        let fpi = match previous.and_then(|p| p.get(i)) {
            Some(prior) if prior.stressed => prior.fpe,
            _ => step.initial_stress,
        };
        let stressing = match step.steel {
            PrestressSteel::Strand(segment, _) => cx.intervals.stress_strands_interval(segment),
            PrestressSteel::Tendon(duct) => cx.intervals.stress_tendon_interval(duct),
        };
        step.relaxation = cx
            .materials
            .incremental_relaxation(step.steel, stressing, interval, fpi)?
            .max(0.0);
        if step.bonded {
            step.restraint = -step.area * step.relaxation;
        }
    }
    Ok(())
}

/// Sum of the free creep deformation caused in `interval` by every earlier
/// force increment of one concrete part
fn creep_deformation(
    cx: &Collaborators<'_>,
    element: ConcreteElement,
    interval: IntervalIndex,
    history: &[TimeStepDetail],
    part: impl Fn(&TimeStepDetail) -> &ConcreteStep,
) -> LossResult<FreeDeformation> {
    let mut free = FreeDeformation::default();
    for (loading, step) in history.iter().enumerate() {
        let concrete = part(step);
        if !concrete.active {
            continue;
        }
        let dp = concrete.axial.incremental;
        let dm = concrete.moment.incremental;
        if dp == 0.0 && dm == 0.0 {
            continue;
        }
        let ea = concrete.modulus * concrete.section.area;
        let ei = concrete.modulus * concrete.section.inertia;
        let dc = cx.materials.creep_coefficients(element, loading, interval)?.increment();
        if ea > 0.0 {
            free.strain += dc * dp / ea;
        }
        if ei > 0.0 {
            free.curvature += dc * dm / ei;
        }
    }
    Ok(free)
}

fn transformed_section(
    girder: &ConcreteStep,
    deck: &ConcreteStep,
    rebar: &[RebarStep],
    strands: &[PrestressStep],
    tendons: &[PrestressStep],
) -> TransformedSection {
    // (EA, own EI, y)
    let mut parts: Vec<(f64, f64, f64)> = Vec::new();
    for concrete in [girder, deck] {
        if concrete.active {
            parts.push((concrete.axial_stiffness(), concrete.flexural_stiffness(), concrete.section.centroid));
        }
    }
    parts.extend(rebar.iter().filter(|r| r.active).map(|r| (r.axial_stiffness(), 0.0, r.y)));
    parts.extend(
        strands
            .iter()
            .chain(tendons.iter())
            .filter(|s| s.bonded)
            .map(|s| (s.axial_stiffness(), 0.0, s.y)),
    );

    let axial_stiffness: f64 = parts.iter().map(|(ea, _, _)| ea).sum();
    if axial_stiffness <= 0.0 {
        return TransformedSection::default();
    }
    let centroid = parts.iter().map(|(ea, _, y)| ea * y).sum::<f64>() / axial_stiffness;
    let flexural_stiffness = parts
        .iter()
        .map(|(ea, ei, y)| ei + ea * (y - centroid).powi(2))
        .sum();
    let reference = girder.age_adjusted_modulus;
    let (area, inertia) = if reference > 0.0 {
        (axial_stiffness / reference, flexural_stiffness / reference)
    } else {
        (0.0, 0.0)
    };

    TransformedSection {
        axial_stiffness,
        flexural_stiffness,
        centroid,
        area,
        inertia,
    }
}

// =============================================================================
// FINALIZE
// =============================================================================

/// Distribute every product force of the interval, update losses, and
/// check equilibrium.
///
/// `secondary` holds the structural response to the released restraint of
/// each time-dependent effect at this point.
pub fn finalize(
    cx: &Collaborators<'_>,
    settings: &LossSettings,
    applicable: &[ProductForceType],
    record: &SectionLossRecord,
    detail: &mut TimeStepDetail,
    secondary: &ByEffect<SectionForce>,
) -> LossResult<()> {
    let point = &record.point;
    let previous = record.steps.last();
    let interval = detail.interval;
    let time_dependent = detail.times.duration() > 0.0;

    for &product in applicable {
        if !product.is_sustained() {
            continue;
        }
        let external = if !detail.active {
            SectionForce::default()
        } else if let Some(effect) = product.time_effect() {
            if time_dependent {
                secondary[effect]
            } else {
                SectionForce::default()
            }
        } else {
            match product {
                ProductForceType::Pretension => transfer_force(detail, previous.map(|p| p.strands.as_slice()), true),
                ProductForceType::PostTension => transfer_force(detail, previous.map(|p| p.tendons.as_slice()), false),
                _ => cx.analysis.incremental_product_force(product, interval, point)?,
            }
        };

        let force = &mut detail.product[product];
        force.axial.add(external.axial);
        force.moment.add(external.moment);
        force.shear.add(external.shear);

        if detail.active {
            let (axial, moment) = match product.time_effect() {
                Some(effect) => (
                    external.axial - detail.restraint[effect].axial,
                    external.moment - detail.restraint[effect].moment,
                ),
                None => (external.axial, external.moment),
            };
            distribute(detail, product, axial, moment);
        }
    }

    update_losses(&mut detail.strands, previous.map(|p| p.strands.as_slice()), false);
    update_losses(&mut detail.tendons, previous.map(|p| p.tendons.as_slice()), true);

    let (external, internal) = equilibrium::increments(detail);
    detail.external.axial.add(external.axial);
    detail.external.moment.add(external.moment);
    detail.internal.axial.add(internal.axial);
    detail.internal.moment.add(internal.moment);

    detail.settle(previous);

    for steel in detail.strands.iter_mut().chain(detail.tendons.iter_mut()) {
        if steel.stressed {
            steel.fpe = steel.fpj - steel.loss.cumulative;
            steel.effective_force = steel.area * steel.fpe;
        }
    }

    detail.equilibrium_ok = equilibrium::check(detail, settings.equilibrium_tolerance).is_balanced();

    if detail.active && interval >= cx.intervals.live_load_interval() {
        let (min, max) = cx.analysis.live_load_moment_envelope(interval, point)?;
        apply_live_load(detail, min, max);
    }

    if cfg!(debug_assertions) {
        let violations = detail.causality_violations(previous);
        if !violations.is_empty() {
            error!(interval, ?violations, "cumulative values do not follow the previous interval");
        }
    }

    Ok(())
}

/// External force of strands released or tendons stressed in this interval.
///
/// The force is applied to the section as a compression at the steel, so
/// the concrete resists the jacking force rather than adding to it.
fn transfer_force(detail: &TimeStepDetail, previous: Option<&[PrestressStep]>, pretension: bool) -> SectionForce {
    let ytr = detail.section.centroid;
    let steps = if pretension { &detail.strands } else { &detail.tendons };
    let mut force = SectionForce::default();
    for (i, step) in steps.iter().enumerate() {
        let prior = previous.and_then(|p| p.get(i));
        let p = if pretension {
            let newly_bonded = step.bonded && !prior.map_or(false, |s| s.bonded);
            if !newly_bonded {
                continue;
            }
            let fpe = match prior {
                Some(s) if s.stressed => s.fpe,
                _ => step.initial_stress,
            };
            -step.area * fpe
        } else {
            let newly_stressed = step.stressed && !prior.map_or(false, |s| s.stressed);
            if !newly_stressed {
                continue;
            }
            -step.area * step.initial_stress
        };
        force.axial += p;
        force.moment += p * (step.y - ytr);
    }
    force
}

/// Share one section force increment among the constituents.
///
/// For time-dependent products each constituent also carries its own
/// restraining force.
fn distribute(detail: &mut TimeStepDetail, product: ProductForceType, axial: f64, moment: f64) {
    let section = detail.section;
    if section.axial_stiffness <= 0.0 {
        return;
    }
    let der = axial / section.axial_stiffness;
    let drr = if section.flexural_stiffness > 0.0 {
        moment / section.flexural_stiffness
    } else {
        0.0
    };
    let effect = product.time_effect();

    for concrete in [&mut detail.girder, &mut detail.deck] {
        if !concrete.active {
            continue;
        }
        let e = concrete.age_adjusted_modulus;
        let net = concrete.section;
        let strain = der + drr * (net.centroid - section.centroid);
        let mut dp = e * net.area * strain;
        let mut dm = e * net.inertia * drr;
        if let Some(effect) = effect {
            dp += concrete.restraint[effect].axial;
            dm += concrete.restraint[effect].moment;
        }
        concrete.product[product] = ForceIncrement { axial: dp, moment: dm };
        concrete.axial.add(dp);
        concrete.moment.add(dm);
        concrete.strain.add(strain);
        concrete.curvature.add(drr);
        if net.area > 0.0 && net.inertia > 0.0 {
            concrete.top_stress.add(dp / net.area + dm * (net.top - net.centroid) / net.inertia);
            concrete.bottom_stress.add(dp / net.area + dm * (net.bottom - net.centroid) / net.inertia);
        }
    }

    for rebar in detail.rebar.iter_mut().filter(|r| r.active) {
        let strain = der + drr * (rebar.y - section.centroid);
        let dp = rebar.modulus * rebar.area * strain;
        rebar.product[product] = ForceIncrement { axial: dp, moment: 0.0 };
        rebar.axial.add(dp);
        rebar.strain.add(strain);
        rebar.stress.add(rebar.modulus * strain);
    }

    for steel in detail.strands.iter_mut().chain(detail.tendons.iter_mut()) {
        if !steel.bonded {
            continue;
        }
        let strain = der + drr * (steel.y - section.centroid);
        let mut dp = steel.modulus * steel.area * strain;
        if effect == Some(TimeEffect::Relaxation) {
            dp += steel.restraint;
        }
        steel.product[product] = ForceIncrement { axial: dp, moment: 0.0 };
        steel.axial.add(dp);
        steel.strain.add(strain);
    }
}

/// Loss increment of each strand or tendon.
///
/// Bonded steel loses what its force dropped; unbonded stressed steel only
/// relaxes. Tendons also take their friction and anchor-set loss in the
/// stressing interval.
fn update_losses(steps: &mut [PrestressStep], previous: Option<&[PrestressStep]>, tendons: bool) {
    for (i, step) in steps.iter_mut().enumerate() {
        if !step.stressed {
            continue;
        }
        let newly_stressed = !previous.and_then(|p| p.get(i)).map_or(false, |s| s.stressed);
        let mut loss = 0.0;
        if tendons && newly_stressed {
            loss += step.fpj - step.initial_stress;
        }
        if step.bonded && step.area > 0.0 {
            loss -= step.axial.incremental / step.area;
        } else {
            loss += step.relaxation;
        }
        step.loss.add(loss);
    }
}

fn apply_live_load(detail: &mut TimeStepDetail, min: f64, max: f64) {
    detail.live_load = Some(MomentRange { min, max });
    let section = detail.section;
    if section.flexural_stiffness <= 0.0 {
        return;
    }
    let curvature = |m: f64| m / section.flexural_stiffness;

    for concrete in [&mut detail.girder, &mut detail.deck] {
        if !concrete.active {
            continue;
        }
        let e = concrete.age_adjusted_modulus;
        let face = |y: f64, m: f64| e * curvature(m) * (y - section.centroid);
        let (top_a, top_b) = (face(concrete.section.top, min), face(concrete.section.top, max));
        let (bot_a, bot_b) = (face(concrete.section.bottom, min), face(concrete.section.bottom, max));
        concrete.live_load = Some(FaceStressRange {
            top_min: top_a.min(top_b),
            top_max: top_a.max(top_b),
            bottom_min: bot_a.min(bot_b),
            bottom_max: bot_a.max(bot_b),
        });
    }

    for steel in detail.strands.iter_mut().chain(detail.tendons.iter_mut()) {
        if !steel.bonded {
            continue;
        }
        let a = steel.modulus * curvature(min) * (steel.y - section.centroid);
        let b = steel.modulus * curvature(max) * (steel.y - section.centroid);
        let (low, high) = (a.min(b), a.max(b));
        steel.live_load = Some(PrestressLiveLoad {
            stress_change_min: low,
            stress_change_max: high,
            fpe_min: steel.fpe + low,
            fpe_max: steel.fpe + high,
            loss_min: steel.loss.cumulative - high,
            loss_max: steel.loss.cumulative - low,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborators::NetSection;
    use crate::details::Tracked;
    use crate::intervals::IntervalTimes;
    use crate::keys::SegmentKey;
    use approx::assert_relative_eq;

    fn girder_concrete() -> ConcreteStep {
        ConcreteStep {
            active: true,
            modulus: 4000.0,
            age_adjusted_modulus: 3000.0,
            section: NetSection {
                area: 800.0,
                inertia: 250_000.0,
                centroid: 30.0,
                top: 0.0,
                bottom: 60.0,
            },
            ..Default::default()
        }
    }

    fn strand(y: f64, area: f64) -> PrestressStep {
        let mut step = empty_prestress_step(
            PrestressSteel::Strand(SegmentKey::new(0, 0, 0), StrandType::Straight),
            0,
            28500.0,
        );
        step.y = y;
        step.area = area;
        step.stressed = true;
        step.bonded = true;
        step.fpj = 202.5;
        step.initial_stress = 202.5;
        step
    }

    fn detail() -> TimeStepDetail {
        let girder = girder_concrete();
        let strands = vec![strand(55.0, 4.0)];
        let section = transformed_section(&girder, &ConcreteStep::default(), &[], &strands, &[]);
        TimeStepDetail {
            interval: 1,
            times: IntervalTimes { start: 1.0, middle: 1.0, end: 1.0 },
            active: true,
            section,
            girder,
            deck: ConcreteStep::default(),
            rebar: vec![],
            strands,
            tendons: vec![],
            product: ByProduct::default(),
            restraint: ByEffect::default(),
            initial_strain: ByEffect::default(),
            external: Default::default(),
            internal: Default::default(),
            equilibrium_ok: false,
            live_load: None,
        }
    }

    #[test]
    fn test_transformed_section() {
        let d = detail();
        let ea = 3000.0 * 800.0 + 28500.0 * 4.0;
        let ytr = (3000.0 * 800.0 * 30.0 + 28500.0 * 4.0 * 55.0) / ea;
        assert_relative_eq!(d.section.axial_stiffness, ea);
        assert_relative_eq!(d.section.centroid, ytr, max_relative = 1e-12);
        let ei = 3000.0 * 250_000.0 + 3000.0 * 800.0 * (30.0 - ytr).powi(2) + 28500.0 * 4.0 * (55.0 - ytr).powi(2);
        assert_relative_eq!(d.section.flexural_stiffness, ei, max_relative = 1e-12);
        assert_relative_eq!(d.section.area, ea / 3000.0, max_relative = 1e-12);
    }

    #[test]
    fn test_unbalanced_detail_is_flagged() {
        let mut d = detail();
        let pushed = Tracked { incremental: -500.0, cumulative: -500.0 };
        d.external.axial = pushed;
        d.internal.axial = pushed;
        d.strands[0].axial = pushed;
        assert!(equilibrium::check(&d, 1.0e-6).is_balanced());

        // The constituents carry less than the product forces applied
        d.internal.axial = Tracked { incremental: -400.0, cumulative: -400.0 };
        let check = equilibrium::check(&d, 1.0e-6);
        assert!(!check.incremental_axial);
        assert!(!check.cumulative_axial);
        assert!(check.incremental_moment && check.constituent_axial);
        assert!(!check.is_balanced());
    }

    #[test]
    fn test_distribution_balances() {
        let mut d = detail();
        distribute(&mut d, ProductForceType::Girder, -150.0, 4000.0);
        let ytr = d.section.centroid;
        let axial = d.girder.axial.incremental + d.strands[0].axial.incremental;
        let moment = d.girder.moment.incremental
            + d.girder.axial.incremental * (d.girder.section.centroid - ytr)
            + d.strands[0].axial.incremental * (d.strands[0].y - ytr);
        assert_relative_eq!(axial, -150.0, max_relative = 1e-10);
        assert_relative_eq!(moment, 4000.0, max_relative = 1e-10);
        // Sagging moment stretches the strand below the centroid
        assert!(d.girder.bottom_stress.incremental > d.girder.top_stress.incremental);
    }

    #[test]
    fn test_transfer_force_compresses_section() {
        let d = detail();
        let force = transfer_force(&d, None, true);
        assert_relative_eq!(force.axial, -4.0 * 202.5);
        assert_relative_eq!(force.moment, -4.0 * 202.5 * (55.0 - d.section.centroid), max_relative = 1e-12);
        // Already bonded in the previous interval: nothing more to transfer
        let again = transfer_force(&d, Some(d.strands.as_slice()), true);
        assert_eq!(again, SectionForce::default());
    }

    #[test]
    fn test_elastic_shortening_loss() {
        let mut d = detail();
        let transfer = transfer_force(&d, None, true);
        distribute(&mut d, ProductForceType::Pretension, transfer.axial, transfer.moment);
        update_losses(&mut d.strands, None, false);
        let loss = d.strands[0].loss.incremental;
        let strain = -d.strands[0].axial.incremental / (28500.0 * 4.0);
        assert!(loss > 0.0);
        assert_relative_eq!(loss, 28500.0 * strain, max_relative = 1e-12);
    }

    #[test]
    fn test_unbonded_strand_only_relaxes() {
        let mut steps = vec![strand(55.0, 4.0)];
        steps[0].bonded = false;
        steps[0].relaxation = 1.25;
        update_losses(&mut steps, None, false);
        assert_eq!(steps[0].loss.incremental, 1.25);
    }

    #[test]
    fn test_tendon_takes_friction_at_stressing() {
        let mut tendon = strand(50.0, 2.0);
        tendon.bonded = false;
        tendon.initial_stress = 190.0;
        let mut steps = vec![tendon];
        update_losses(&mut steps, None, true);
        assert_relative_eq!(steps[0].loss.incremental, 12.5);
    }

    #[test]
    fn test_live_load_on_strand() {
        let mut d = detail();
        d.strands[0].fpe = 180.0;
        apply_live_load(&mut d, 0.0, 10_000.0);
        let ll = d.strands[0].live_load.unwrap();
        assert_eq!(ll.stress_change_min, 0.0);
        assert!(ll.stress_change_max > 0.0);
        assert_relative_eq!(ll.fpe_max, 180.0 + ll.stress_change_max);
        let girder = d.girder.live_load.unwrap();
        assert!(girder.top_min < 0.0);
        assert!(girder.bottom_max > 0.0);
    }
}
