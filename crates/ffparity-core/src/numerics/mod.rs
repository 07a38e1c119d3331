use serde::{Deserialize, Serialize};

pub const DEFAULT_FORCE_CONSTANT_TOLERANCE: f64 = 0.05;
pub const DEFAULT_ENERGY_TOLERANCE: f64 = 0.025;

/// Values below this magnitude are treated as zero when filtering reference
/// torsions.
pub const ZERO_EPSILON: f64 = 1.0e-10;

/// Absolute-difference bounds shared by every category for a whole run.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct ToleranceConfig {
    #[serde(rename = "forceConstant", default = "default_force_constant")]
    pub force_constant: f64,
    #[serde(rename = "energy", default = "default_energy")]
    pub energy: f64,
}

impl Default for ToleranceConfig {
    fn default() -> Self {
        Self {
            force_constant: DEFAULT_FORCE_CONSTANT_TOLERANCE,
            energy: DEFAULT_ENERGY_TOLERANCE,
        }
    }
}

impl ToleranceConfig {
    pub fn validate(&self) -> Result<(), String> {
        for (name, value) in [
            ("forceConstant", self.force_constant),
            ("energy", self.energy),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(format!(
                    "tolerance '{}' must be a finite non-negative number, got {}",
                    name, value
                ));
            }
        }
        Ok(())
    }
}

fn default_force_constant() -> f64 {
    DEFAULT_FORCE_CONSTANT_TOLERANCE
}

fn default_energy() -> f64 {
    DEFAULT_ENERGY_TOLERANCE
}

/// A difference of exactly `tolerance` is accepted.
///
/// Report values are short decimals, so the bound is widened by the binary
/// rounding of the operands: `1.0500 - 1.0000` must pass a `0.05` bound.
pub fn within_abs_tolerance(lhs: f64, rhs: f64, tolerance: f64) -> bool {
    let scale = lhs.abs().max(rhs.abs()).max(tolerance);
    (lhs - rhs).abs() <= tolerance + ROUNDING_SLACK * scale
}

const ROUNDING_SLACK: f64 = 4.0 * f64::EPSILON;

pub fn is_zero(value: f64) -> bool {
    value.abs() < ZERO_EPSILON
}
