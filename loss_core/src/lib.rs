//! # loss_core - Time-Step Prestress Loss Engine
//!
//! `loss_core` computes prestress losses and time-dependent section forces
//! for pretensioned and post-tensioned concrete girders. Every analysis
//! point of a girder line is tracked through the construction and service
//! intervals with an age-adjusted transformed section; creep, shrinkage and
//! relaxation are released interval by interval and redistributed through
//! the structure.
//!
//! ## Design Philosophy
//!
//! - **Collaborator-driven**: bridge geometry, materials, intervals and the
//!   structural solve come in through traits, borrowed per call
//! - **Incremental**: intervals are finalized once, in order, and cached
//! - **JSON-First**: settings, records and errors implement Serialize/Deserialize
//! - **Rich Errors**: structured error types, not just strings
//!
//! ## Quick Start
//!
//! ```rust
//! use loss_core::keys::GirderKey;
//! use loss_core::poi::AnalysisPoint;
//! use loss_core::reference::ReferenceModel;
//! use loss_core::{LossSettings, TimeStepLossEngine};
//!
//! let mut model = ReferenceModel::demo();
//! let mut engine = TimeStepLossEngine::new(LossSettings::default()).unwrap();
//!
//! let point = AnalysisPoint::on_the_fly(GirderKey::new(0, 0).segment(0), 600.0, 600.0);
//! let last = model.model().timeline.len() - 1;
//! let record = engine.get_losses(&mut model.collaborators(), &point, last).unwrap();
//!
//! for strand in &record.detail.strands {
//!     println!("{:?}: loss {:.2} ksi", strand.steel, strand.loss.cumulative);
//! }
//! ```
//!
//! ## Modules
//!
//! - [`losses`] - the engine: friction, anchor set, time step, redistribution
//! - [`details`] - per-interval records returned to callers
//! - [`collaborators`] - the traits the engine reads the bridge through
//! - [`intervals`] - interval schedule and timeline
//! - [`poi`] - analysis points and the per-line catalog
//! - [`loads`] - product force types
//! - [`settings`] - loss settings
//! - [`status`] - status log for warnings the caller should see
//! - [`reference`] - a complete girder-line model implementing every trait
//! - [`errors`] - structured error types

pub mod collaborators;
pub mod details;
pub mod errors;
pub mod intervals;
pub mod keys;
pub mod loads;
pub mod losses;
pub mod poi;
pub mod reference;
pub mod settings;
pub mod status;

// Re-export commonly used types at crate root for convenience
pub use collaborators::Collaborators;
pub use details::{LossRecord, TimeStepDetail};
pub use errors::{LossError, LossResult};
pub use losses::TimeStepLossEngine;
pub use settings::LossSettings;
pub use status::{StatusItem, StatusLog};
