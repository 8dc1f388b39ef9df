//! # Analysis Intervals
//!
//! The construction and service life of a bridge is cut into intervals,
//! globally indexed and increasing in time. Events such as strand release,
//! tendon stressing and erection are zero-duration intervals; creep,
//! shrinkage and relaxation only develop over intervals with a duration.
//!
//! [`IntervalSchedule`] is the query interface the engine uses;
//! [`Timeline`] is a serializable schedule with one set of milestones for
//! every segment, used by the reference bridge model.
//!
//! ## Example
//!
//! ```rust
//! use loss_core::intervals::{Interval, Milestones, Timeline};
//!
//! let timeline = Timeline::new(
//!     vec![
//!         Interval::new("Stress strands", 0.0, 1.0),
//!         Interval::new("Release", 1.0, 1.0),
//!         Interval::new("Storage", 1.0, 60.0),
//!     ],
//!     Milestones::default().with_release(1).with_storage(2),
//! );
//! assert!(timeline.validate().is_ok());
//! assert_eq!(timeline.duration(1), 0.0);
//! ```

use serde::{Deserialize, Serialize};

use crate::errors::{LossError, LossResult};
use crate::keys::{DuctKey, SegmentKey};

/// Global interval index
pub type IntervalIndex = usize;

/// Start, middle and end time of an interval (days)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct IntervalTimes {
    pub start: f64,
    pub middle: f64,
    pub end: f64,
}

impl IntervalTimes {
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

/// Interval queries and named milestones
pub trait IntervalSchedule {
    fn interval_count(&self) -> usize;
    fn start_time(&self, interval: IntervalIndex) -> f64;
    fn middle_time(&self, interval: IntervalIndex) -> f64;
    fn end_time(&self, interval: IntervalIndex) -> f64;

    fn duration(&self, interval: IntervalIndex) -> f64 {
        self.end_time(interval) - self.start_time(interval)
    }

    fn times(&self, interval: IntervalIndex) -> IntervalTimes {
        IntervalTimes {
            start: self.start_time(interval),
            middle: self.middle_time(interval),
            end: self.end_time(interval),
        }
    }

    fn description(&self, interval: IntervalIndex) -> String;

    fn stress_strands_interval(&self, segment: SegmentKey) -> IntervalIndex;
    fn release_interval(&self, segment: SegmentKey) -> IntervalIndex;
    fn storage_interval(&self, segment: SegmentKey) -> IntervalIndex;
    fn erect_segment_interval(&self, segment: SegmentKey) -> IntervalIndex;
    /// Interval in which the closure joint at the end of `closure` becomes composite
    fn composite_closure_interval(&self, closure: SegmentKey) -> IntervalIndex;
    fn cast_deck_interval(&self) -> Option<IntervalIndex>;
    fn composite_deck_interval(&self) -> Option<IntervalIndex>;
    fn live_load_interval(&self) -> IntervalIndex;
    fn stress_tendon_interval(&self, duct: DuctKey) -> IntervalIndex;

    /// Fails when `interval` is past the end of the schedule
    fn check_interval(&self, interval: IntervalIndex) -> LossResult<()> {
        let count = self.interval_count();
        if interval >= count {
            return Err(LossError::IntervalOutOfRange { interval, count });
        }
        Ok(())
    }
}

/// One period of the timeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interval {
    pub description: String,
    pub start: f64,
    pub end: f64,
}

impl Interval {
    pub fn new(description: impl Into<String>, start: f64, end: f64) -> Self {
        Interval {
            description: description.into(),
            start,
            end,
        }
    }
}

/// Milestone intervals shared by every segment
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Milestones {
    pub stress_strands: IntervalIndex,
    pub release: IntervalIndex,
    pub storage: IntervalIndex,
    pub erect_segment: IntervalIndex,
    pub composite_closure: IntervalIndex,
    pub cast_deck: Option<IntervalIndex>,
    pub composite_deck: Option<IntervalIndex>,
    /// Continuity over interior piers, `None` for simple spans throughout
    pub continuity: Option<IntervalIndex>,
    pub live_load: IntervalIndex,
}

impl Milestones {
    pub fn with_stress_strands(mut self, interval: IntervalIndex) -> Self {
        self.stress_strands = interval;
        self
    }

    pub fn with_release(mut self, interval: IntervalIndex) -> Self {
        self.release = interval;
        self
    }

    pub fn with_storage(mut self, interval: IntervalIndex) -> Self {
        self.storage = interval;
        self
    }

    pub fn with_erection(mut self, interval: IntervalIndex) -> Self {
        self.erect_segment = interval;
        self
    }

    pub fn with_composite_closure(mut self, interval: IntervalIndex) -> Self {
        self.composite_closure = interval;
        self
    }

    pub fn with_deck(mut self, cast: IntervalIndex, composite: IntervalIndex) -> Self {
        self.cast_deck = Some(cast);
        self.composite_deck = Some(composite);
        self
    }

    pub fn with_continuity(mut self, interval: IntervalIndex) -> Self {
        self.continuity = Some(interval);
        self
    }

    pub fn with_live_load(mut self, interval: IntervalIndex) -> Self {
        self.live_load = interval;
        self
    }
}

/// Ordered list of intervals plus milestones
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Timeline {
    pub intervals: Vec<Interval>,
    pub milestones: Milestones,
}

impl Timeline {
    pub fn new(intervals: Vec<Interval>, milestones: Milestones) -> Self {
        Timeline { intervals, milestones }
    }

    pub fn len(&self) -> usize {
        self.intervals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    pub fn times(&self, interval: IntervalIndex) -> IntervalTimes {
        self.intervals
            .get(interval)
            .map(|i| IntervalTimes {
                start: i.start,
                middle: 0.5 * (i.start + i.end),
                end: i.end,
            })
            .unwrap_or_default()
    }

    pub fn duration(&self, interval: IntervalIndex) -> f64 {
        self.times(interval).duration()
    }

    /// Intervals must be contiguous, non-negative in length, and every
    /// milestone must name an existing interval
    pub fn validate(&self) -> LossResult<()> {
        if self.intervals.is_empty() {
            return Err(LossError::invalid_input("timeline.intervals", "[]", "Timeline has no intervals"));
        }
        for (i, interval) in self.intervals.iter().enumerate() {
            if interval.end < interval.start {
                return Err(LossError::invalid_input(
                    format!("timeline.intervals[{i}]"),
                    format!("[{}, {}]", interval.start, interval.end),
                    "Interval ends before it starts",
                ));
            }
            if i > 0 && (interval.start - self.intervals[i - 1].end).abs() > 1.0e-9 {
                return Err(LossError::invalid_input(
                    format!("timeline.intervals[{i}].start"),
                    interval.start.to_string(),
                    "Interval must start where the previous one ends",
                ));
            }
        }

        let m = &self.milestones;
        let named = [
            ("stress_strands", Some(m.stress_strands)),
            ("release", Some(m.release)),
            ("storage", Some(m.storage)),
            ("erect_segment", Some(m.erect_segment)),
            ("composite_closure", Some(m.composite_closure)),
            ("cast_deck", m.cast_deck),
            ("composite_deck", m.composite_deck),
            ("continuity", m.continuity),
            ("live_load", Some(m.live_load)),
        ];
        for (name, interval) in named {
            if let Some(interval) = interval {
                if interval >= self.intervals.len() {
                    return Err(LossError::invalid_input(
                        format!("timeline.milestones.{name}"),
                        interval.to_string(),
                        "Milestone is past the last interval",
                    ));
                }
            }
        }
        if m.release < m.stress_strands {
            return Err(LossError::invalid_input(
                "timeline.milestones.release",
                m.release.to_string(),
                "Strands cannot be released before they are stressed",
            ));
        }
        if let (Some(cast), Some(composite)) = (m.cast_deck, m.composite_deck) {
            if composite < cast {
                return Err(LossError::invalid_input(
                    "timeline.milestones.composite_deck",
                    composite.to_string(),
                    "Deck cannot be composite before it is cast",
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn timeline() -> Timeline {
        Timeline::new(
            vec![
                Interval::new("Stress strands", 0.0, 1.0),
                Interval::new("Release", 1.0, 1.0),
                Interval::new("Storage", 1.0, 30.0),
            ],
            Milestones::default().with_release(1).with_storage(2),
        )
    }

    #[test]
    fn test_times() {
        let t = timeline();
        let storage = t.times(2);
        assert_eq!(storage.start, 1.0);
        assert_eq!(storage.middle, 15.5);
        assert_eq!(storage.duration(), 29.0);
        assert_eq!(t.duration(1), 0.0);
    }

    #[test]
    fn test_gap_rejected() {
        let mut t = timeline();
        t.intervals[2].start = 2.0;
        assert!(t.validate().is_err());
        assert!(timeline().validate().is_ok());
    }

    #[test]
    fn test_milestone_out_of_range() {
        let mut t = timeline();
        t.milestones.live_load = 7;
        let err = t.validate().unwrap_err();
        assert!(err.to_string().contains("live_load"));
    }

    #[test]
    fn test_serialization() {
        let t = timeline();
        let json = serde_json::to_string(&t).unwrap();
        let parsed: Timeline = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, t);
    }
}
