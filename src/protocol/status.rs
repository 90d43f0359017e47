//! Response decoding for the EK Loop Connect.
//!
//! Parses received 63-byte frames into structured readings. Values here
//! stay in wire units; conversions to external units (0-255 PWM,
//! milli-degrees, l/h) happen at the device facade.

use byteorder::{BigEndian, ByteOrder};

use crate::protocol::commands::{FRAME_LENGTH, NUM_TEMP_SENSORS, TEMP_LABELS};
use crate::utils::units;

// =============================================================================
// Response Offsets
// =============================================================================

/// Offset of the big-endian RPM value in a fan read response.
const FAN_RPM_OFFSET: usize = 12;
/// Offset of the PWM percent byte in a fan read response.
const FAN_PWM_OFFSET: usize = 21;
/// Offsets of the three thermistor bytes in a sensor read response.
const TEMP_OFFSETS: [usize; NUM_TEMP_SENSORS] = [11, 15, 19];
/// Offset of the big-endian raw flow value in a sensor read response.
const FLOW_OFFSET: usize = 22;
/// Offset of the coolant level byte in a sensor read response.
const LEVEL_OFFSET: usize = 27;

/// Wire value reported for an absent or unused thermistor.
pub const TEMP_ABSENT: u8 = 0xe7;

// =============================================================================
// Status Structures
// =============================================================================

/// Fan channel state as reported by the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FanStatus {
    /// Fan speed in RPM.
    pub rpm: u16,
    /// Duty cycle on the controller's native 0-100 scale.
    pub pwm_percent: u8,
}

impl FanStatus {
    /// Decode a fan read response.
    ///
    /// The controller is the authority on frame contents; values are
    /// trusted as-is.
    pub fn parse(frame: &[u8; FRAME_LENGTH]) -> Self {
        Self {
            rpm: BigEndian::read_u16(&frame[FAN_RPM_OFFSET..FAN_RPM_OFFSET + 2]),
            pwm_percent: frame[FAN_PWM_OFFSET],
        }
    }
}

impl std::fmt::Display for FanStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:>5} RPM at {:>3}%", self.rpm, self.pwm_percent)
    }
}

/// Combined sensor state as reported by the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SensorStatus {
    /// Thermistor readings in whole degrees Celsius; `None` when the
    /// probe is absent or unused.
    pub temps: [Option<u8>; NUM_TEMP_SENSORS],
    /// Coolant flow in raw controller units.
    pub flow_raw: u16,
    /// Coolant level switch state, `true` when the level is ok.
    pub level_ok: bool,
}

impl SensorStatus {
    /// Decode a sensor read response.
    ///
    /// Temperatures are decoded as unsigned whole degrees; the wire
    /// encoding for sub-zero readings is unconfirmed, so negative values
    /// are never produced here.
    pub fn parse(frame: &[u8; FRAME_LENGTH]) -> Self {
        let mut temps = [None; NUM_TEMP_SENSORS];
        for (slot, &offset) in temps.iter_mut().zip(TEMP_OFFSETS.iter()) {
            let raw = frame[offset];
            if raw != TEMP_ABSENT {
                *slot = Some(raw);
            }
        }

        Self {
            temps,
            flow_raw: BigEndian::read_u16(&frame[FLOW_OFFSET..FLOW_OFFSET + 2]),
            level_ok: frame[LEVEL_OFFSET] != 0,
        }
    }
}

impl std::fmt::Display for SensorStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (label, temp) in TEMP_LABELS.iter().zip(self.temps) {
            match temp {
                Some(deg) => writeln!(f, "  {}: {:>3} C", label, deg)?,
                None => writeln!(f, "  {}: absent", label)?,
            }
        }
        writeln!(f, "  flow: {} l/h", units::flow_to_lph(self.flow_raw))?;
        write!(
            f,
            "  coolant level: {}",
            if self.level_ok { "ok" } else { "LOW" }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_fan_status() {
        let mut frame = [0u8; FRAME_LENGTH];
        // RPM 1320 (big-endian)
        frame[12] = 0x05;
        frame[13] = 0x28;
        // Duty 50%
        frame[21] = 50;

        let status = FanStatus::parse(&frame);
        assert_eq!(status.rpm, 1320);
        assert_eq!(status.pwm_percent, 50);
    }

    #[test]
    fn test_parse_sensor_status() {
        let mut frame = [0u8; FRAME_LENGTH];
        frame[11] = 28;
        frame[15] = 35;
        frame[19] = 22;
        // Flow raw 150 (big-endian)
        frame[22] = 0x00;
        frame[23] = 0x96;
        frame[27] = 0x64;

        let status = SensorStatus::parse(&frame);
        assert_eq!(status.temps, [Some(28), Some(35), Some(22)]);
        assert_eq!(status.flow_raw, 150);
        assert!(status.level_ok);
    }

    #[test]
    fn test_absent_temperature_sentinel() {
        let mut frame = [0u8; FRAME_LENGTH];
        frame[11] = 30;
        frame[15] = TEMP_ABSENT;
        frame[19] = TEMP_ABSENT;

        let status = SensorStatus::parse(&frame);
        // 0xe7 must never surface as 231 degrees
        assert_eq!(status.temps, [Some(30), None, None]);
    }

    #[test]
    fn test_level_alarm() {
        let mut frame = [0u8; FRAME_LENGTH];
        frame[27] = 0x00;
        assert!(!SensorStatus::parse(&frame).level_ok);

        frame[27] = 0x01;
        assert!(SensorStatus::parse(&frame).level_ok);
    }
}
