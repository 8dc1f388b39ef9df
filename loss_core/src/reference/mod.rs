//! # Reference Bridge
//!
//! A self-contained implementation of every collaborator interface, used
//! by the command line tool and the integration tests. It models a line of
//! prismatic pretensioned girders, optionally post-tensioned, with a
//! composite deck and continuity over the piers.
//!
//! ## Modules
//!
//! - [`materials`] - ACI 209R-92 concrete and strand relaxation
//! - [`continuous`] - moment distribution for continuous spans
//! - [`model`] - the JSON scenario and the read-only collaborators
//! - [`analysis`] - the structural solve
//!
//! ## Example
//!
//! ```rust
//! use loss_core::keys::GirderKey;
//! use loss_core::poi::AnalysisPoint;
//! use loss_core::reference::ReferenceModel;
//! use loss_core::settings::LossSettings;
//! use loss_core::TimeStepLossEngine;
//!
//! let mut model = ReferenceModel::demo();
//! let mut engine = TimeStepLossEngine::new(LossSettings::default()).unwrap();
//! let midspan = AnalysisPoint::on_the_fly(GirderKey::new(0, 0).segment(0), 600.0, 600.0);
//!
//! let record = engine.get_losses(&mut model.collaborators(), &midspan, 2).unwrap();
//! assert!(!record.approximated);
//! assert!(record.detail.active);
//! ```

pub mod analysis;
pub mod continuous;
pub mod materials;
pub mod model;

pub use analysis::ReferenceAnalysis;
pub use continuous::MomentDistribution;
pub use materials::{ConcreteModel, StrandSteel};
pub use model::{GirderLineModel, ReferenceBridge, ReferenceModel};
