//! Parsing utilities for CLI arguments.
//!
//! Reusable parsing functions for channel and preset inputs.

use crate::config::FanPreset;
use crate::error::{EkLoopError, Result};
use crate::protocol::{FanChannel, NUM_FANS};

// =============================================================================
// Channel Parsing
// =============================================================================

/// Parse a fan channel from user input.
///
/// Accepts `f1`..`f6` (case-insensitive) or a bare 1-based number.
///
/// # Example
/// ```
/// use ek_loop_connect::utils::parsing::parse_fan_channel;
/// use ek_loop_connect::protocol::FanChannel;
///
/// assert_eq!(parse_fan_channel("f3").unwrap(), FanChannel::Fan3);
/// assert_eq!(parse_fan_channel("6").unwrap(), FanChannel::Fan6);
/// ```
pub fn parse_fan_channel(name: &str) -> Result<FanChannel> {
    let lower = name.to_lowercase();
    let digits = lower.strip_prefix('f').unwrap_or(&lower);

    let number: usize = digits.parse().map_err(|_| {
        EkLoopError::InvalidInput(format!("Unknown fan channel '{}'. Use: f1-f6", name))
    })?;
    if number < 1 || number > NUM_FANS {
        return Err(EkLoopError::InvalidInput(format!(
            "Unknown fan channel '{}'. Use: f1-f6",
            name
        )));
    }

    FanChannel::from_index(number - 1)
}

// =============================================================================
// Preset Parsing
// =============================================================================

/// Parse a preset name into a [`FanPreset`].
///
/// Accepts `silent`, `performance`, `fixed:XX` (duty 0-100), or
/// `custom:a,b,c,d,e,f` (one duty per channel, F1 first).
pub fn parse_preset(name: &str) -> Result<FanPreset> {
    let lower = name.to_lowercase();

    if lower == "silent" {
        return Ok(FanPreset::Silent);
    }

    if lower == "performance" {
        return Ok(FanPreset::Performance);
    }

    if let Some(rest) = lower.strip_prefix("fixed:") {
        let duty: u8 = rest.parse().map_err(|_| {
            EkLoopError::InvalidInput(
                "Invalid duty value. Use 'fixed:XX' where XX is 0-100".into(),
            )
        })?;
        if duty > 100 {
            return Err(EkLoopError::InvalidDuty(duty));
        }
        return Ok(FanPreset::Fixed(duty));
    }

    if let Some(rest) = lower.strip_prefix("custom:") {
        let values: Vec<u8> = rest
            .split(',')
            .map(|value| value.trim().parse::<u8>())
            .collect::<std::result::Result<_, _>>()
            .map_err(|_| {
                EkLoopError::InvalidInput(
                    "Invalid custom preset. Use 'custom:a,b,c,d,e,f' with duties 0-100".into(),
                )
            })?;
        let duties: [u8; NUM_FANS] = values.try_into().map_err(|_| {
            EkLoopError::InvalidInput(format!(
                "Custom preset needs exactly {} duty values",
                NUM_FANS
            ))
        })?;
        return Ok(FanPreset::Custom(duties));
    }

    Err(EkLoopError::InvalidInput(format!(
        "Unknown preset '{}'. Use: silent, performance, fixed:XX, or custom:a,b,c,d,e,f",
        name
    )))
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_fan_channel() {
        assert_eq!(parse_fan_channel("f1").unwrap(), FanChannel::Fan1);
        assert_eq!(parse_fan_channel("F4").unwrap(), FanChannel::Fan4);
        assert_eq!(parse_fan_channel("6").unwrap(), FanChannel::Fan6);
        assert!(parse_fan_channel("f0").is_err());
        assert!(parse_fan_channel("f7").is_err());
        assert!(parse_fan_channel("pump").is_err());
    }

    #[test]
    fn test_parse_builtin_presets() {
        assert!(matches!(parse_preset("silent").unwrap(), FanPreset::Silent));
        assert!(matches!(
            parse_preset("PERFORMANCE").unwrap(),
            FanPreset::Performance
        ));
    }

    #[test]
    fn test_parse_fixed_preset() {
        assert!(matches!(
            parse_preset("fixed:40").unwrap(),
            FanPreset::Fixed(40)
        ));
        assert!(parse_preset("fixed:101").is_err());
        assert!(parse_preset("fixed:abc").is_err());
    }

    #[test]
    fn test_parse_custom_preset() {
        assert_eq!(
            parse_preset("custom:10,20,30,40,50,60").unwrap(),
            FanPreset::Custom([10, 20, 30, 40, 50, 60])
        );
        assert!(parse_preset("custom:10,20").is_err());
    }

    #[test]
    fn test_parse_unknown_preset() {
        assert!(parse_preset("turbo").is_err());
    }
}
