//! Product loads tracked through the time-step analysis
//!
//! # Overview
//!
//! - [`ProductForceType`] - closed enumeration of product force causes
//! - [`TimeEffect`] - creep, shrinkage and relaxation
//! - [`ByProduct`] / [`ByEffect`] - fixed arrays indexed by those enums
//!
//! # Example
//!
//! ```
//! use loss_core::loads::{applicable_product_loads, ProductForceType};
//! use loss_core::settings::LossSettings;
//!
//! let settings = LossSettings::default().with_ignore_shrinkage(true);
//! let loads = applicable_product_loads(&settings);
//! assert!(!loads.contains(&ProductForceType::Shrinkage));
//! assert!(loads.contains(&ProductForceType::Creep));
//! ```

pub mod product_types;

pub use product_types::{ByEffect, ByProduct, ProductForceType, TimeEffect};

use crate::settings::LossSettings;

/// Product force types that take part in the analysis under `settings`.
///
/// Time-dependent types switched off for a sensitivity study are left out.
pub fn applicable_product_loads(settings: &LossSettings) -> Vec<ProductForceType> {
    ProductForceType::ALL
        .into_iter()
        .filter(|p| p.time_effect().map_or(true, |effect| !settings.ignores(effect)))
        .collect()
}
