//! # Status Log
//!
//! User-visible diagnostics raised while computing losses. Configuration
//! errors are recorded here *and* returned as errors; approximations and
//! equilibrium mismatches are recorded here only, so callers can audit
//! them after the fact.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatusSeverity {
    Information,
    Warning,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatusCategory {
    /// Project settings do not match what the engine supports
    Configuration,
    /// A result was taken from the nearest analysis point
    Approximation,
    /// Internal and external forces disagree
    Equilibrium,
}

/// A single diagnostic message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusItem {
    pub severity: StatusSeverity,
    pub category: StatusCategory,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

/// Append-only collection of diagnostics, drained by the caller
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatusLog {
    items: Vec<StatusItem>,
}

impl StatusLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn post(&mut self, severity: StatusSeverity, category: StatusCategory, message: impl Into<String>) {
        self.items.push(StatusItem {
            severity,
            category,
            message: message.into(),
            timestamp: Utc::now(),
        });
    }

    pub fn items(&self) -> &[StatusItem] {
        &self.items
    }

    pub fn count(&self, category: StatusCategory) -> usize {
        self.items.iter().filter(|i| i.category == category).count()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Remove and return every item posted so far
    pub fn take(&mut self) -> Vec<StatusItem> {
        std::mem::take(&mut self.items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_post_and_take() {
        let mut log = StatusLog::new();
        log.post(StatusSeverity::Error, StatusCategory::Configuration, "wrong loss method");
        log.post(StatusSeverity::Warning, StatusCategory::Approximation, "nearest point used");
        assert_eq!(log.count(StatusCategory::Approximation), 1);

        let items = log.take();
        assert_eq!(items.len(), 2);
        assert!(items[0].timestamp <= items[1].timestamp);
        assert!(log.is_empty());
    }
}
