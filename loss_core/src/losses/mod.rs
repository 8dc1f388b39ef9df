//! # Prestress Losses
//!
//! The time-step loss analysis, from tendon friction through the interval
//! by interval section model.
//!
//! ## Modules
//!
//! - [`friction`] - friction loss and elongation along a duct
//! - [`anchor_set`] - seating zone solve and anchor-set loss per point
//! - [`time_step`] - initialize/finalize of one point in one interval
//! - [`initial_strain`] - redistribution of released restraint over the line
//! - [`equilibrium`] - applied against resisted force check
//! - [`store`] - per girder line results
//! - [`engine`] - [`TimeStepLossEngine`], the entry point

pub mod anchor_set;
pub mod engine;
pub mod equilibrium;
pub mod friction;
pub mod initial_strain;
pub mod store;
pub mod time_step;

pub use anchor_set::{apply_anchor_set, solve_anchor_set, FrictionCurve};
pub use engine::TimeStepLossEngine;
pub use friction::{compute_friction_losses, friction_loss, DuctFriction};
pub use store::{LineLosses, LossStore};
