//! Product force type definitions
//!
//! A product force is the section force produced by one physical cause:
//! a dead-load component, prestressing, or one of the time-dependent
//! material effects. The set is closed so results can be stored in fixed
//! arrays indexed by type.

use std::ops::{Index, IndexMut};

use serde::{Deserialize, Serialize};

/// Product force categories tracked through the time-step analysis
///
/// # Example
/// ```
/// use loss_core::loads::ProductForceType;
///
/// let creep = ProductForceType::Creep;
/// assert_eq!(creep.code(), "CR");
/// assert!(creep.is_time_dependent());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ProductForceType {
    /// Girder self-weight
    Girder,
    /// Cast-in-place deck slab
    Slab,
    /// Haunch (slab pad) over the girder
    SlabPad,
    /// Stay-in-place deck panels
    SlabPanel,
    /// Intermediate and end diaphragms
    Diaphragm,
    /// Wearing surface overlay
    Overlay,
    /// Sidewalk
    Sidewalk,
    /// Traffic barriers and railing
    TrafficBarrier,
    /// Shear key grout between adjacent beams
    ShearKey,
    /// User-defined component dead load
    UserDC,
    /// User-defined wearing surface and utilities
    UserDW,
    /// User-defined live load with impact
    UserLLIM,
    /// Pretensioned strand transfer
    Pretension,
    /// Post-tensioning primary effect
    PostTension,
    /// Post-tensioning secondary (hyperstatic) effect
    SecondaryEffects,
    /// Concrete creep
    Creep,
    /// Concrete shrinkage
    Shrinkage,
    /// Prestressing steel relaxation
    Relaxation,
}

impl ProductForceType {
    /// Number of product force types
    pub const COUNT: usize = 18;

    /// All product force types in storage order
    pub const ALL: [ProductForceType; Self::COUNT] = [
        ProductForceType::Girder,
        ProductForceType::Slab,
        ProductForceType::SlabPad,
        ProductForceType::SlabPanel,
        ProductForceType::Diaphragm,
        ProductForceType::Overlay,
        ProductForceType::Sidewalk,
        ProductForceType::TrafficBarrier,
        ProductForceType::ShearKey,
        ProductForceType::UserDC,
        ProductForceType::UserDW,
        ProductForceType::UserLLIM,
        ProductForceType::Pretension,
        ProductForceType::PostTension,
        ProductForceType::SecondaryEffects,
        ProductForceType::Creep,
        ProductForceType::Shrinkage,
        ProductForceType::Relaxation,
    ];

    /// Storage index, position in [`ProductForceType::ALL`]
    pub fn index(&self) -> usize {
        *self as usize
    }

    /// Short label used in tables
    pub fn code(&self) -> &'static str {
        match self {
            ProductForceType::Girder => "GDR",
            ProductForceType::Slab => "SLAB",
            ProductForceType::SlabPad => "PAD",
            ProductForceType::SlabPanel => "PNL",
            ProductForceType::Diaphragm => "DIA",
            ProductForceType::Overlay => "OVL",
            ProductForceType::Sidewalk => "SW",
            ProductForceType::TrafficBarrier => "TB",
            ProductForceType::ShearKey => "SK",
            ProductForceType::UserDC => "DC",
            ProductForceType::UserDW => "DW",
            ProductForceType::UserLLIM => "LLIM",
            ProductForceType::Pretension => "PS",
            ProductForceType::PostTension => "PT",
            ProductForceType::SecondaryEffects => "SEC",
            ProductForceType::Creep => "CR",
            ProductForceType::Shrinkage => "SH",
            ProductForceType::Relaxation => "RE",
        }
    }

    /// Human-readable description
    pub fn description(&self) -> &'static str {
        match self {
            ProductForceType::Girder => "Girder self-weight",
            ProductForceType::Slab => "Deck slab",
            ProductForceType::SlabPad => "Slab haunch",
            ProductForceType::SlabPanel => "Deck panels",
            ProductForceType::Diaphragm => "Diaphragms",
            ProductForceType::Overlay => "Overlay",
            ProductForceType::Sidewalk => "Sidewalk",
            ProductForceType::TrafficBarrier => "Traffic barrier",
            ProductForceType::ShearKey => "Shear key",
            ProductForceType::UserDC => "User defined DC",
            ProductForceType::UserDW => "User defined DW",
            ProductForceType::UserLLIM => "User defined live load",
            ProductForceType::Pretension => "Pretensioning",
            ProductForceType::PostTension => "Post-tensioning",
            ProductForceType::SecondaryEffects => "Post-tensioning secondary effects",
            ProductForceType::Creep => "Creep",
            ProductForceType::Shrinkage => "Shrinkage",
            ProductForceType::Relaxation => "Relaxation",
        }
    }

    /// The time-dependent effect behind this product force, if any
    pub fn time_effect(&self) -> Option<TimeEffect> {
        match self {
            ProductForceType::Creep => Some(TimeEffect::Creep),
            ProductForceType::Shrinkage => Some(TimeEffect::Shrinkage),
            ProductForceType::Relaxation => Some(TimeEffect::Relaxation),
            _ => None,
        }
    }

    /// Creep, shrinkage and relaxation
    pub fn is_time_dependent(&self) -> bool {
        self.time_effect().is_some()
    }

    /// Forces produced by the prestressing itself
    pub fn is_prestress(&self) -> bool {
        matches!(self, ProductForceType::Pretension | ProductForceType::PostTension)
    }

    /// Sustained loads accumulate in the section history; transient live
    /// load does not
    pub fn is_sustained(&self) -> bool {
        !matches!(self, ProductForceType::UserLLIM)
    }

    /// Forces obtained from the external structural analysis
    pub fn is_external_load(&self) -> bool {
        !self.is_time_dependent() && !self.is_prestress()
    }
}

impl std::fmt::Display for ProductForceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.description())
    }
}

/// Time-dependent material effects that produce restraining forces
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TimeEffect {
    Creep,
    Shrinkage,
    Relaxation,
}

impl TimeEffect {
    pub const ALL: [TimeEffect; 3] = [TimeEffect::Creep, TimeEffect::Shrinkage, TimeEffect::Relaxation];

    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn product_force(&self) -> ProductForceType {
        match self {
            TimeEffect::Creep => ProductForceType::Creep,
            TimeEffect::Shrinkage => ProductForceType::Shrinkage,
            TimeEffect::Relaxation => ProductForceType::Relaxation,
        }
    }
}

impl std::fmt::Display for TimeEffect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.product_force().description())
    }
}

/// One value per product force type
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ByProduct<T>(pub [T; ProductForceType::COUNT]);

impl<T> ByProduct<T> {
    pub fn iter(&self) -> impl Iterator<Item = (ProductForceType, &T)> {
        ProductForceType::ALL.into_iter().zip(self.0.iter())
    }
}

impl<T> Index<ProductForceType> for ByProduct<T> {
    type Output = T;
    fn index(&self, product: ProductForceType) -> &T {
        &self.0[product.index()]
    }
}

impl<T> IndexMut<ProductForceType> for ByProduct<T> {
    fn index_mut(&mut self, product: ProductForceType) -> &mut T {
        &mut self.0[product.index()]
    }
}

/// One value per time-dependent effect
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ByEffect<T>(pub [T; 3]);

impl<T> ByEffect<T> {
    pub fn iter(&self) -> impl Iterator<Item = (TimeEffect, &T)> {
        TimeEffect::ALL.into_iter().zip(self.0.iter())
    }
}

impl<T> Index<TimeEffect> for ByEffect<T> {
    type Output = T;
    fn index(&self, effect: TimeEffect) -> &T {
        &self.0[effect.index()]
    }
}

impl<T> IndexMut<TimeEffect> for ByEffect<T> {
    fn index_mut(&mut self, effect: TimeEffect) -> &mut T {
        &mut self.0[effect.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_matches_all_order() {
        for (i, product) in ProductForceType::ALL.iter().enumerate() {
            assert_eq!(product.index(), i);
        }
        for (i, effect) in TimeEffect::ALL.iter().enumerate() {
            assert_eq!(effect.index(), i);
        }
    }

    #[test]
    fn test_classification() {
        let time_dependent: Vec<_> = ProductForceType::ALL.iter().filter(|p| p.is_time_dependent()).collect();
        assert_eq!(time_dependent.len(), 3);
        assert!(ProductForceType::Girder.is_external_load());
        assert!(ProductForceType::SecondaryEffects.is_external_load());
        assert!(!ProductForceType::Pretension.is_external_load());
        assert!(!ProductForceType::UserLLIM.is_sustained());
        assert_eq!(TimeEffect::Shrinkage.product_force(), ProductForceType::Shrinkage);
    }

    #[test]
    fn test_by_product_indexing() {
        let mut values: ByProduct<f64> = ByProduct::default();
        values[ProductForceType::Relaxation] = 2.5;
        assert_eq!(values.0[17], 2.5);
        let sum: f64 = values.iter().map(|(_, v)| *v).sum();
        assert_eq!(sum, 2.5);
    }

    #[test]
    fn test_serialization() {
        let json = serde_json::to_string(&ProductForceType::TrafficBarrier).unwrap();
        assert_eq!(json, "\"TrafficBarrier\"");
        let mut values: ByEffect<f64> = ByEffect::default();
        values[TimeEffect::Creep] = -1.0;
        let json = serde_json::to_string(&values).unwrap();
        let parsed: ByEffect<f64> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, values);
    }
}
