//! # Time-Dependent Material Models
//!
//! Concrete per ACI 209R-92 and intrinsic strand relaxation per Magura,
//! Sozen and Siess. Times are in days, stresses in ksi.
//!
//! ## ACI 209R-92
//!
//! ```text
//! E(t)   = E28 · sqrt(t / (a + b·t))
//! φ(t,ti) = φu · γla · (t-ti)^0.6 / (10 + (t-ti)^0.6)     γla = 1.25 · ti^-0.118
//! εsh(t) = -εu · t / (f + t)
//! ```
//!
//! ## Relaxation
//!
//! ```text
//! Δfr = fpi · (log(24·t2 + 1) - log(24·t1 + 1)) / 45 · (fpi/fpy - 0.55)
//! ```

use serde::{Deserialize, Serialize};

/// ACI 209R-92 concrete parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConcreteModel {
    /// 28-day modulus (ksi)
    pub modulus_28: f64,
    /// Strength-gain constant `a` (days)
    pub a: f64,
    /// Strength-gain constant `b`
    pub b: f64,
    /// Ultimate creep coefficient
    pub ultimate_creep: f64,
    /// Ultimate shrinkage strain magnitude
    pub ultimate_shrinkage: f64,
    /// Shrinkage time constant `f` (days)
    pub shrinkage_time: f64,
    /// Aging coefficient χ for the age-adjusted modulus
    pub aging_coefficient: f64,
}

impl Default for ConcreteModel {
    fn default() -> Self {
        ConcreteModel {
            modulus_28: 4200.0,
            a: 4.0,
            b: 0.85,
            ultimate_creep: 2.35,
            ultimate_shrinkage: 780.0e-6,
            shrinkage_time: 35.0,
            aging_coefficient: 0.7,
        }
    }
}

impl ConcreteModel {
    /// Modulus at concrete age `age`
    pub fn modulus(&self, age: f64) -> f64 {
        if age <= 0.0 {
            return 0.0;
        }
        self.modulus_28 * (age / (self.a + self.b * age)).sqrt()
    }

    /// Creep coefficient at age `age` for loading at age `loading_age`
    pub fn creep_coefficient(&self, age: f64, loading_age: f64) -> f64 {
        let duration = age - loading_age;
        if duration <= 0.0 {
            return 0.0;
        }
        let loading_factor = 1.25 * loading_age.max(1.0).powf(-0.118);
        let d = duration.powf(0.6);
        self.ultimate_creep * loading_factor * d / (10.0 + d)
    }

    /// Shrinkage strain at age `age`, negative
    pub fn shrinkage_strain(&self, age: f64) -> f64 {
        if age <= 0.0 {
            return 0.0;
        }
        -self.ultimate_shrinkage * age / (self.shrinkage_time + age)
    }

    /// Age-adjusted effective modulus for a load applied at `loading_age`
    /// and sustained to `age`
    pub fn age_adjusted_modulus(&self, age: f64, loading_age: f64) -> f64 {
        self.modulus(loading_age) / (1.0 + self.aging_coefficient * self.creep_coefficient(age, loading_age))
    }
}

/// Low-relaxation strand properties
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrandSteel {
    /// Modulus (ksi)
    pub modulus: f64,
    /// Yield strength (ksi)
    pub yield_strength: f64,
    /// Relaxation constant, 45 for low-relaxation strand
    pub relaxation_constant: f64,
}

impl Default for StrandSteel {
    fn default() -> Self {
        StrandSteel {
            modulus: 28500.0,
            yield_strength: 243.0,
            relaxation_constant: 45.0,
        }
    }
}

impl StrandSteel {
    /// Intrinsic relaxation between `t1` and `t2` days after stressing,
    /// starting from stress `fpi`
    pub fn relaxation(&self, fpi: f64, t1: f64, t2: f64) -> f64 {
        if fpi <= 0.0 || t2 <= t1 {
            return 0.0;
        }
        let ratio = fpi / self.yield_strength - 0.55;
        if ratio <= 0.0 {
            return 0.0;
        }
        let hours = |t: f64| (24.0 * t.max(0.0) + 1.0).log10();
        (fpi * (hours(t2) - hours(t1)) / self.relaxation_constant * ratio).max(0.0)
    }
}
