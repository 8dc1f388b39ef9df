//! # Time-Step Loss Engine
//!
//! Owns the [`LossStore`] and drives the analysis of each girder line.
//!
//! A request for interval `n` at any point of a girder line advances every
//! girder of that line together, one interval at a time, until interval `n`
//! has been finalized. Intervals already finalized are never recomputed,
//! so repeated requests return identical records.
//!
//! ```text
//! get_losses(point, n)
//!   └── analyze_through(line, n)
//!         ├── initialize_line   (catalog, friction, anchor set; once)
//!         └── for i in next..=n
//!               ├── time_step::initialize   every point
//!               ├── initial_strain::redistribute
//!               └── time_step::finalize     every point
//! ```

use std::collections::BTreeMap;

use tracing::{debug, error, info, info_span, warn};

use crate::collaborators::{Collaborators, SectionForce};
use crate::details::{AnchorSetDetail, FrictionLosses, LossRecord, SectionLossRecord};
use crate::errors::{LossError, LossResult};
use crate::intervals::IntervalIndex;
use crate::keys::{DuctKey, GirderLineKey, MemberEnd, MemberKey};
use crate::loads::{applicable_product_loads, ByEffect, ProductForceType};
use crate::losses::anchor_set::apply_anchor_set;
use crate::losses::friction::compute_friction_losses;
use crate::losses::store::{LineLosses, LossStore};
use crate::losses::{initial_strain, time_step};
use crate::poi::{AnalysisPoint, PoiCatalog};
use crate::settings::{LossMethod, LossSettings};
use crate::status::{StatusCategory, StatusItem, StatusLog, StatusSeverity};

/// Time-step prestress loss engine
#[derive(Debug, Clone)]
pub struct TimeStepLossEngine {
    settings: LossSettings,
    store: LossStore,
    status: StatusLog,
}

impl TimeStepLossEngine {
    pub fn new(settings: LossSettings) -> LossResult<Self> {
        settings.validate()?;
        Ok(TimeStepLossEngine {
            settings,
            store: LossStore::new(),
            status: StatusLog::new(),
        })
    }

    pub fn settings(&self) -> &LossSettings {
        &self.settings
    }

    /// Replace the settings and discard every result computed under the old ones
    pub fn set_settings(&mut self, settings: LossSettings) -> LossResult<()> {
        settings.validate()?;
        self.settings = settings;
        self.invalidate();
        Ok(())
    }

    /// Product force types that take part in the analysis
    pub fn applicable_product_loads(&self) -> Vec<ProductForceType> {
        applicable_product_loads(&self.settings)
    }

    pub fn status(&self) -> &StatusLog {
        &self.status
    }

    pub fn take_status_items(&mut self) -> Vec<StatusItem> {
        self.status.take()
    }

    /// Discard all results, e.g. after the bridge model changed
    pub fn invalidate(&mut self) {
        self.store.clear();
    }

    pub fn invalidate_line(&mut self, line: GirderLineKey) {
        self.store.remove(line);
    }

    /// Last finalized interval of a girder line
    pub fn analyzed_through(&self, line: GirderLineKey) -> Option<IntervalIndex> {
        self.store.get(line).and_then(LineLosses::analyzed_through)
    }

    // =========================================================================
    // QUERIES
    // =========================================================================

    /// Losses and section forces at `point` at the end of `interval`.
    ///
    /// A point that is not in the catalog is answered with the nearest
    /// cataloged point on the same girder; the record is flagged
    /// `approximated` and a status item is posted.
    pub fn get_losses(
        &mut self,
        cx: &mut Collaborators<'_>,
        point: &AnalysisPoint,
        interval: IntervalIndex,
    ) -> LossResult<LossRecord> {
        let line_key = point.girder_line();
        self.analyze_through(cx, line_key, interval)?;

        let line = self
            .store
            .get(line_key)
            .ok_or_else(|| LossError::internal(format!("{line_key} was not analyzed")))?;
        let index = locate(&line.catalog, point)?;
        let record = &line.records[index];
        let approximated = line.catalog.position_of(point) != Some(index);

        if approximated {
            let message = format!(
                "Losses at {} ({:.3} from girder start) taken from the nearest point at {:.3}",
                point.segment, point.distance_from_girder_start, record.point.distance_from_girder_start
            );
            warn!(%line_key, interval, "{message}");
            self.status
                .post(StatusSeverity::Warning, StatusCategory::Approximation, message);
        }

        let detail = record
            .steps
            .get(interval)
            .cloned()
            .ok_or_else(|| LossError::internal(format!("interval {interval} missing after analysis")))?;

        Ok(LossRecord {
            requested: point.clone(),
            source: record.point.clone(),
            approximated,
            interval,
            friction: record.friction.clone(),
            detail,
        })
    }

    /// Friction and anchor-set losses of every duct at `point`.
    ///
    /// Does not advance the time-step analysis.
    pub fn friction_losses(&mut self, cx: &mut Collaborators<'_>, point: &AnalysisPoint) -> LossResult<FrictionLosses> {
        let line_key = point.girder_line();
        self.ensure_line(cx, line_key)?;
        let line = self
            .store
            .get(line_key)
            .ok_or_else(|| LossError::internal(format!("{line_key} was not initialized")))?;
        let index = locate(&line.catalog, point)?;
        Ok(line.records[index].friction.clone())
    }

    /// Seating length and anchorage losses at both ends of a duct
    pub fn anchor_set_details(&mut self, cx: &mut Collaborators<'_>, duct: DuctKey) -> LossResult<AnchorSetDetail> {
        let line_key = duct.member.girder_key().girder_line();
        self.ensure_line(cx, line_key)?;
        self.store
            .get(line_key)
            .and_then(|line| line.anchor_set(&duct))
            .copied()
            .ok_or_else(|| LossError::duct_not_found(&duct))
    }

    /// Tendon elongation at one end of a duct
    pub fn elongation(&mut self, cx: &mut Collaborators<'_>, duct: DuctKey, end: MemberEnd) -> LossResult<f64> {
        let line_key = duct.member.girder_key().girder_line();
        self.ensure_line(cx, line_key)?;
        self.store
            .get(line_key)
            .and_then(|line| line.elongation(&duct, end))
            .ok_or_else(|| LossError::duct_not_found(&duct))
    }

    // =========================================================================
    // ANALYSIS
    // =========================================================================

    /// Finalize every interval of a girder line up to and including `interval`
    pub fn analyze_through(
        &mut self,
        cx: &mut Collaborators<'_>,
        line_key: GirderLineKey,
        interval: IntervalIndex,
    ) -> LossResult<()> {
        cx.intervals.check_interval(interval)?;
        self.ensure_line(cx, line_key)?;

        let next = self.store.get(line_key).map_or(0, LineLosses::next_interval);
        if next > interval {
            return Ok(());
        }

        let span = info_span!("girder_line", line = line_key.0);
        let _enter = span.enter();
        info!(from = next, through = interval, "advancing girder line");

        for i in next..=interval {
            self.advance(cx, line_key, i)?;
        }

        info!(through = interval, "girder line analyzed");
        Ok(())
    }

    fn check_configuration(&mut self) -> LossResult<()> {
        if self.settings.loss_method == LossMethod::TimeStep {
            return Ok(());
        }
        let err = LossError::unsupported(
            "loss method",
            format!(
                "{} losses are selected; this engine computes time-step losses only",
                self.settings.loss_method.display_name()
            ),
        );
        error!(code = err.error_code(), "{err}");
        self.status
            .post(StatusSeverity::Error, StatusCategory::Configuration, err.to_string());
        Err(err)
    }

    /// Build the catalog and solve friction and anchor set for a line not yet in the store
    fn ensure_line(&mut self, cx: &mut Collaborators<'_>, line_key: GirderLineKey) -> LossResult<()> {
        self.check_configuration()?;
        if self.store.contains(line_key) {
            return Ok(());
        }
        let line = initialize_line(cx, &self.settings, line_key)?;
        self.store.insert(line_key, line);
        Ok(())
    }

    fn advance(&mut self, cx: &mut Collaborators<'_>, line_key: GirderLineKey, interval: IntervalIndex) -> LossResult<()> {
        let settings = &self.settings;
        let applicable = applicable_product_loads(settings);
        let line = self
            .store
            .get_mut(line_key)
            .ok_or_else(|| LossError::internal(format!("{line_key} was not initialized")))?;

        debug!(interval, description = %cx.intervals.description(interval), "interval");

        let mut details = Vec::with_capacity(line.records.len());
        for record in &line.records {
            details.push(time_step::initialize(cx, settings, record, interval)?);
        }

        let secondary = if cx.intervals.duration(interval) > 0.0 {
            initial_strain::redistribute(cx, settings, &line.catalog, interval, &details)?
        } else {
            vec![ByEffect::<SectionForce>::default(); details.len()]
        };

        for ((record, detail), secondary) in line.records.iter().zip(details.iter_mut()).zip(&secondary) {
            time_step::finalize(cx, settings, &applicable, record, detail, secondary)?;
        }

        let unbalanced: Vec<&AnalysisPoint> = line
            .records
            .iter()
            .zip(&details)
            .filter(|(_, d)| !d.equilibrium_ok)
            .map(|(record, _)| &record.point)
            .collect();
        report_unbalanced(&mut self.status, interval, &unbalanced);

        for (record, detail) in line.records.iter_mut().zip(details) {
            record.steps.push(detail);
        }
        Ok(())
    }
}

/// Warn once per interval about the points that failed the equilibrium check.
/// The analysis carries on; each record keeps `equilibrium_ok = false`.
fn report_unbalanced(status: &mut StatusLog, interval: IntervalIndex, points: &[&AnalysisPoint]) {
    let Some(first) = points.first() else {
        return;
    };
    let message = format!(
        "Equilibrium not satisfied at {} point(s) in interval {}, first at {} ({:.3} from girder start)",
        points.len(),
        interval,
        first.segment,
        first.distance_from_girder_start
    );
    warn!(interval, points = points.len(), "{message}");
    status.post(StatusSeverity::Warning, StatusCategory::Equilibrium, message);
}

/// Cataloged point for a request: the exact match, or the nearest one
fn locate(catalog: &PoiCatalog, point: &AnalysisPoint) -> LossResult<usize> {
    catalog
        .position_of(point)
        .or_else(|| catalog.nearest(point))
        .ok_or_else(|| {
            LossError::invalid_input(
                "point",
                point.segment.to_string(),
                format!("The point is not on {}", catalog.line()),
            )
        })
}

/// Catalog the points of a girder line and solve friction and anchor set
/// for every duct on it
fn initialize_line(cx: &mut Collaborators<'_>, settings: &LossSettings, line_key: GirderLineKey) -> LossResult<LineLosses> {
    let girders = cx.girder_line(line_key);
    let mut inputs = Vec::with_capacity(girders.len());
    for girder in &girders {
        inputs.push((
            *girder,
            cx.topology.girder_length(*girder),
            cx.topology.analysis_points(*girder)?,
        ));
    }
    let catalog = PoiCatalog::build(line_key, inputs)?;
    info!(%line_key, girders = girders.len(), points = catalog.len(), "cataloged analysis points");

    let mut friction = vec![FrictionLosses::default(); catalog.len()];
    let mut girder_anchor_sets = Vec::new();
    let mut segment_anchor_sets = BTreeMap::new();
    let mut elongations = BTreeMap::new();
    let pt = &settings.post_tensioning;

    for girder in catalog.girders() {
        let range = catalog.girder_range(girder);

        let mut members: Vec<(MemberKey, Vec<usize>)> = (0..cx.topology.segment_count(girder))
            .map(|s| {
                let segment = girder.segment(s);
                let indices = range.clone().filter(|&i| catalog.point(i).segment == segment).collect();
                (MemberKey::Segment(segment), indices)
            })
            .collect();
        members.push((MemberKey::Girder(girder), range.clone().collect()));

        for (member, indices) in members {
            let points: Vec<&AnalysisPoint> = indices.iter().map(|&i| catalog.point(i)).collect();
            let mut anchor_sets = Vec::new();
            for mut duct in compute_friction_losses(cx, pt, member, &points)? {
                anchor_sets.push(apply_anchor_set(&mut duct, pt.anchor_set, &settings.anchor_set_solver)?);
                elongations.insert(duct.duct, duct.elongation);
                for (&i, loss) in indices.iter().zip(duct.losses) {
                    match member {
                        MemberKey::Segment(_) => friction[i].segment.push(loss),
                        MemberKey::Girder(_) => friction[i].girder.push(loss),
                    }
                }
            }
            match member {
                MemberKey::Segment(segment) => {
                    segment_anchor_sets.insert(segment, anchor_sets);
                }
                MemberKey::Girder(_) => girder_anchor_sets.extend(anchor_sets),
            }
        }
    }

    let records = catalog
        .points()
        .cloned()
        .zip(friction)
        .map(|(point, friction)| SectionLossRecord::new(point, friction))
        .collect();

    let mut line = LineLosses::new(catalog, records);
    line.girder_anchor_sets = girder_anchor_sets;
    line.segment_anchor_sets = segment_anchor_sets;
    line.elongations = elongations;
    Ok(line)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::GirderKey;

    #[test]
    fn test_unbalanced_points_are_reported() {
        let segment = GirderKey::new(1, 0).segment(0);
        let first = AnalysisPoint::on_the_fly(segment, 360.0, 360.0);
        let second = AnalysisPoint::on_the_fly(segment, 600.0, 600.0);
        let mut status = StatusLog::new();

        report_unbalanced(&mut status, 6, &[]);
        assert!(status.is_empty());

        report_unbalanced(&mut status, 6, &[&first, &second]);
        let items = status.take();
        assert_eq!(items.len(), 1);
        assert!(matches!(items[0].severity, StatusSeverity::Warning));
        assert_eq!(items[0].category, StatusCategory::Equilibrium);
        assert!(items[0].message.contains("2 point(s) in interval 6"));
        assert!(items[0].message.contains("360.000"));
    }
}
