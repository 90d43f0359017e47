//! Fan speed presets for the EK Loop Connect.
//!
//! The controller holds no speed curves of its own; a preset is a set of
//! per-channel duty targets applied in one pass.

use crate::error::{EkLoopError, Result};
use crate::protocol::NUM_FANS;

// =============================================================================
// Fan Presets
// =============================================================================

/// Pre-defined fan speed preset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FanPreset {
    /// Low noise - conservative duty on every channel.
    Silent,
    /// Aggressive airflow on every channel.
    Performance,
    /// The same fixed duty for all channels.
    Fixed(u8),
    /// Explicit per-channel duty targets, F1 first.
    Custom([u8; NUM_FANS]),
}

impl FanPreset {
    /// Resolve this preset to per-channel duty percentages.
    ///
    /// # Errors
    /// Returns `InvalidDuty` if any target is above 100.
    pub fn duties(&self) -> Result<[u8; NUM_FANS]> {
        let duties = match self {
            FanPreset::Silent => PRESET_SILENT,
            FanPreset::Performance => PRESET_PERFORMANCE,
            FanPreset::Fixed(duty) => [*duty; NUM_FANS],
            FanPreset::Custom(targets) => *targets,
        };

        for &duty in &duties {
            if duty > 100 {
                return Err(EkLoopError::InvalidDuty(duty));
            }
        }

        Ok(duties)
    }

    /// Get preset name for display.
    pub fn name(&self) -> &'static str {
        match self {
            FanPreset::Silent => "Silent",
            FanPreset::Performance => "Performance",
            FanPreset::Fixed(_) => "Fixed",
            FanPreset::Custom(_) => "Custom",
        }
    }
}

impl std::fmt::Display for FanPreset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FanPreset::Fixed(duty) => write!(f, "Fixed ({}%)", duty),
            _ => write!(f, "{}", self.name()),
        }
    }
}

// =============================================================================
// Pre-defined Duty Tables
// =============================================================================

/// Silent preset - quiet baseline across the loop.
pub const PRESET_SILENT: [u8; NUM_FANS] = [30, 30, 30, 30, 30, 30];

/// Performance preset - aggressive airflow.
pub const PRESET_PERFORMANCE: [u8; NUM_FANS] = [75, 75, 75, 75, 75, 75];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_presets_resolve() {
        assert_eq!(FanPreset::Silent.duties().unwrap(), PRESET_SILENT);
        assert_eq!(
            FanPreset::Performance.duties().unwrap(),
            PRESET_PERFORMANCE
        );
    }

    #[test]
    fn test_fixed_preset() {
        assert_eq!(FanPreset::Fixed(60).duties().unwrap(), [60; NUM_FANS]);
    }

    #[test]
    fn test_out_of_range_duty_rejected() {
        assert!(matches!(
            FanPreset::Fixed(101).duties(),
            Err(EkLoopError::InvalidDuty(101))
        ));
        assert!(matches!(
            FanPreset::Custom([0, 0, 0, 0, 0, 120]).duties(),
            Err(EkLoopError::InvalidDuty(120))
        ));
    }
}
