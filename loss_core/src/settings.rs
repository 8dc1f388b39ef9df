//! # Loss Settings
//!
//! Project-level criteria that control the loss computation: which loss
//! method the project uses, the post-tensioning friction and anchor-set
//! parameters, the sensitivity flags that switch off creep, shrinkage or
//! relaxation, and how strands are represented in the transformed section.
//!
//! Settings are plain JSON so they can live in a project file next to the
//! bridge description.
//!
//! ## Example
//!
//! ```rust
//! use loss_core::settings::{LossSettings, StrandModel};
//!
//! let settings = LossSettings::default()
//!     .with_strand_model(StrandModel::Discretized)
//!     .with_ignore_relaxation(true);
//!
//! assert!(settings.validate().is_ok());
//! let json = settings.to_json().unwrap();
//! let parsed = LossSettings::from_json(&json).unwrap();
//! assert_eq!(parsed, settings);
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::collaborators::StrandRow;
use crate::errors::{LossError, LossResult};
use crate::loads::TimeEffect;

/// Loss method selected for the project.
///
/// Only [`LossMethod::TimeStep`] can be serviced by the time-step engine;
/// anything else is a configuration error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum LossMethod {
    /// Incremental Tadros time-step analysis
    #[default]
    TimeStep,
    /// AASHTO refined estimate
    Refined,
    /// AASHTO approximate estimate
    Approximate,
    /// Lump-sum loss
    LumpSum,
}

impl LossMethod {
    pub fn display_name(&self) -> &'static str {
        match self {
            LossMethod::TimeStep => "Time-step analysis",
            LossMethod::Refined => "Refined estimate",
            LossMethod::Approximate => "Approximate estimate",
            LossMethod::LumpSum => "Lump sum",
        }
    }
}

impl std::fmt::Display for LossMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// How pretensioned strands appear in the transformed section
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum StrandModel {
    /// One constituent per strand type, located at the strand-type centroid
    #[default]
    Lumped,
    /// One constituent per strand row
    Discretized,
}

impl StrandModel {
    /// Arrange the strand rows of one strand type into section constituents.
    ///
    /// Lumped always yields exactly one row (possibly with zero area) so the
    /// constituent count is independent of the interval.
    pub fn arrange(&self, rows: &[StrandRow]) -> Vec<StrandRow> {
        match self {
            StrandModel::Discretized => rows.to_vec(),
            StrandModel::Lumped => {
                let area: f64 = rows.iter().map(|r| r.effective_area()).sum();
                let nominal: f64 = rows.iter().map(|r| r.area).sum();
                let y = if area > 0.0 {
                    rows.iter().map(|r| r.effective_area() * r.y).sum::<f64>() / area
                } else if nominal > 0.0 {
                    rows.iter().map(|r| r.area * r.y).sum::<f64>() / nominal
                } else {
                    0.0
                };
                let transfer_factor = if nominal > 0.0 { area / nominal } else { 0.0 };
                vec![StrandRow {
                    y,
                    area: nominal,
                    transfer_factor,
                }]
            }
        }
    }
}

/// Friction and anchor-set criteria for post-tensioning
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PostTensionParameters {
    /// Curvature friction coefficient μ (1/radian)
    pub friction_coefficient: f64,
    /// Wobble coefficient κ (1/length)
    pub wobble_coefficient: f64,
    /// Anchor set (wedge draw-in) length
    pub anchor_set: f64,
}

impl Default for PostTensionParameters {
    fn default() -> Self {
        PostTensionParameters {
            friction_coefficient: 0.25,
            wobble_coefficient: 0.0002 / 12.0,
            anchor_set: 0.375,
        }
    }
}

/// Controls for the anchor-set root finder
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnchorSetSolverSettings {
    pub max_iterations: usize,
    /// Convergence tolerance relative to the anchor set
    pub tolerance: f64,
    /// First trial seating length as a fraction of the zero-movement distance
    pub initial_fraction: f64,
    /// Bracket search step multiplier
    pub growth: f64,
}

impl Default for AnchorSetSolverSettings {
    fn default() -> Self {
        AnchorSetSolverSettings {
            max_iterations: 100,
            tolerance: 1.0e-9,
            initial_fraction: 0.1,
            growth: 1.5,
        }
    }
}

/// Principal tensile stress in webs criteria.
///
/// Carried for consumers of the loss results; the loss computation itself
/// does not read it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PrincipalWebStressSettings {
    pub enabled: bool,
    /// Fraction of the duct diameter removed from the web width
    pub duct_diameter_factor: f64,
}

impl Default for PrincipalWebStressSettings {
    fn default() -> Self {
        PrincipalWebStressSettings {
            enabled: false,
            duct_diameter_factor: 0.5,
        }
    }
}

/// All settings consumed by the loss engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LossSettings {
    pub loss_method: LossMethod,
    pub post_tensioning: PostTensionParameters,
    pub ignore_creep_effects: bool,
    pub ignore_shrinkage_effects: bool,
    pub ignore_relaxation_effects: bool,
    pub strand_model: StrandModel,
    /// Relative tolerance for the equilibrium check
    pub equilibrium_tolerance: f64,
    pub anchor_set_solver: AnchorSetSolverSettings,
    pub principal_web_stress: PrincipalWebStressSettings,
}

impl Default for LossSettings {
    fn default() -> Self {
        LossSettings {
            loss_method: LossMethod::TimeStep,
            post_tensioning: PostTensionParameters::default(),
            ignore_creep_effects: false,
            ignore_shrinkage_effects: false,
            ignore_relaxation_effects: false,
            strand_model: StrandModel::Lumped,
            equilibrium_tolerance: 1.0e-6,
            anchor_set_solver: AnchorSetSolverSettings::default(),
            principal_web_stress: PrincipalWebStressSettings::default(),
        }
    }
}

impl LossSettings {
    pub fn with_loss_method(mut self, method: LossMethod) -> Self {
        self.loss_method = method;
        self
    }

    pub fn with_post_tensioning(mut self, parameters: PostTensionParameters) -> Self {
        self.post_tensioning = parameters;
        self
    }

    pub fn with_strand_model(mut self, model: StrandModel) -> Self {
        self.strand_model = model;
        self
    }

    pub fn with_ignore_creep(mut self, ignore: bool) -> Self {
        self.ignore_creep_effects = ignore;
        self
    }

    pub fn with_ignore_shrinkage(mut self, ignore: bool) -> Self {
        self.ignore_shrinkage_effects = ignore;
        self
    }

    pub fn with_ignore_relaxation(mut self, ignore: bool) -> Self {
        self.ignore_relaxation_effects = ignore;
        self
    }

    /// Whether a time-dependent effect is switched off for sensitivity studies
    pub fn ignores(&self, effect: TimeEffect) -> bool {
        match effect {
            TimeEffect::Creep => self.ignore_creep_effects,
            TimeEffect::Shrinkage => self.ignore_shrinkage_effects,
            TimeEffect::Relaxation => self.ignore_relaxation_effects,
        }
    }

    /// Validate ranges of all numeric criteria
    pub fn validate(&self) -> LossResult<()> {
        let pt = &self.post_tensioning;
        non_negative("post_tensioning.friction_coefficient", pt.friction_coefficient)?;
        non_negative("post_tensioning.wobble_coefficient", pt.wobble_coefficient)?;
        non_negative("post_tensioning.anchor_set", pt.anchor_set)?;

        if !(self.equilibrium_tolerance > 0.0) {
            return Err(LossError::invalid_input(
                "equilibrium_tolerance",
                self.equilibrium_tolerance.to_string(),
                "Tolerance must be positive",
            ));
        }

        let solver = &self.anchor_set_solver;
        if solver.max_iterations == 0 {
            return Err(LossError::invalid_input(
                "anchor_set_solver.max_iterations",
                "0",
                "At least one iteration is required",
            ));
        }
        if !(solver.tolerance > 0.0) {
            return Err(LossError::invalid_input(
                "anchor_set_solver.tolerance",
                solver.tolerance.to_string(),
                "Tolerance must be positive",
            ));
        }
        if !(solver.initial_fraction > 0.0 && solver.initial_fraction <= 1.0) {
            return Err(LossError::invalid_input(
                "anchor_set_solver.initial_fraction",
                solver.initial_fraction.to_string(),
                "Initial fraction must be in (0, 1]",
            ));
        }
        if !(solver.growth > 1.0) {
            return Err(LossError::invalid_input(
                "anchor_set_solver.growth",
                solver.growth.to_string(),
                "Growth factor must exceed 1.0",
            ));
        }
        Ok(())
    }

    pub fn from_json(json: &str) -> LossResult<Self> {
        let settings: LossSettings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn to_json(&self) -> LossResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Read settings from a JSON file
    pub fn load(path: impl AsRef<Path>) -> LossResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| LossError::settings(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&json)
    }
}

fn non_negative(field: &str, value: f64) -> LossResult<()> {
    if value < 0.0 || !value.is_finite() {
        return Err(LossError::invalid_input(field, value.to_string(), "Value must be non-negative"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() < tol
    }

    #[test]
    fn test_defaults_validate() {
        let settings = LossSettings::default();
        assert_eq!(settings.loss_method, LossMethod::TimeStep);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_negative_friction_rejected() {
        let mut settings = LossSettings::default();
        settings.post_tensioning.friction_coefficient = -0.1;
        let err = settings.validate().unwrap_err();
        assert_eq!(err.error_code(), "INVALID_INPUT");
    }

    #[test]
    fn test_bad_growth_rejected() {
        let mut settings = LossSettings::default();
        settings.anchor_set_solver.growth = 1.0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let settings = LossSettings::from_json(r#"{ "ignore_creep_effects": true }"#).unwrap();
        assert!(settings.ignore_creep_effects);
        assert!(!settings.ignore_shrinkage_effects);
        assert_eq!(settings.anchor_set_solver.max_iterations, 100);
    }

    #[test]
    fn test_json_round_trip_is_exact() {
        let mut settings = LossSettings::default();
        settings.post_tensioning.anchor_set = 0.1 + 0.2;
        let back = LossSettings::from_json(&settings.to_json().unwrap()).unwrap();
        assert_eq!(back, settings);
        assert_eq!(back.post_tensioning.wobble_coefficient, 0.0002 / 12.0);
    }

    #[test]
    fn test_malformed_json() {
        let err = LossSettings::from_json("{ not json").unwrap_err();
        assert_eq!(err.error_code(), "SETTINGS_ERROR");
    }

    #[test]
    fn test_lumped_arrangement() {
        let rows = vec![
            StrandRow { y: 60.0, area: 1.53, transfer_factor: 1.0 },
            StrandRow { y: 56.0, area: 0.918, transfer_factor: 0.5 },
        ];
        let lumped = StrandModel::Lumped.arrange(&rows);
        assert_eq!(lumped.len(), 1);
        let area = 1.53 + 0.459;
        assert!(approx_eq(lumped[0].effective_area(), area, 1e-12));
        assert!(approx_eq(lumped[0].y, (1.53 * 60.0 + 0.459 * 56.0) / area, 1e-12));

        let discrete = StrandModel::Discretized.arrange(&rows);
        assert_eq!(discrete, rows);
    }

    #[test]
    fn test_lumped_arrangement_without_strands() {
        let lumped = StrandModel::Lumped.arrange(&[]);
        assert_eq!(lumped.len(), 1);
        assert_eq!(lumped[0].effective_area(), 0.0);
    }
}
