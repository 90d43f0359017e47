//! Wire format definitions and request builders for the EK Loop Connect.
//!
//! The controller speaks fixed 63-byte request/response frames with no HID
//! report ids. A few bytes look like checksums, but the firmware accepts
//! fixed values; the templates keep them at the constants seen in captures.

use crate::error::{EkLoopError, Result};

// =============================================================================
// Constants
// =============================================================================

/// Length of every request and response frame.
pub const FRAME_LENGTH: usize = 63;

/// EK vendor id.
pub const EK_VID: u16 = 0x0483;

/// EK Loop Connect product id.
pub const EK_LOOP_CONNECT_PID: u16 = 0x5750;

/// Number of PWM fan channels.
pub const NUM_FANS: usize = 6;

/// Number of thermistor inputs.
pub const NUM_TEMP_SENSORS: usize = 3;

/// Byte offset of the 2-byte channel id in channel-addressed requests.
pub const CHANNEL_OFFSET: usize = 6;

/// Byte offset of the PWM percent payload in a fan-set request.
pub const FAN_SET_PWM_OFFSET: usize = 24;

/// Byte offset of the optional big-endian RPM hint in a fan-set request.
/// The templates leave it zeroed; the controller does not require it.
pub const FAN_SET_RPM_HINT_OFFSET: usize = 15;

// =============================================================================
// Request Templates
// =============================================================================

/// Fan state read request. Bytes 6-7 are the channel id placeholder,
/// bytes 10-12 a checksum-like field the firmware does not verify.
pub const FAN_READ_REQUEST: [u8; FRAME_LENGTH] = [
    0x10, 0x12, 0x08, 0xaa, 0x01, 0x03, 0xff, 0xff, // header, channel id
    0x00, 0x20, 0x66, 0xff, 0xff, 0xed, 0x00, 0x00, // constant, checksum?, trailer
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, // padding
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
];

/// Combined sensor read request. Same shape as a fan read with the
/// channel id fixed to the sensor block.
pub const SENSOR_READ_REQUEST: [u8; FRAME_LENGTH] = [
    0x10, 0x12, 0x08, 0xaa, 0x01, 0x03, 0xa2, 0x20, // header, sensor channel
    0x00, 0x20, 0x66, 0x60, 0xfe, 0xed, 0x00, 0x00, // constant, checksum?, trailer
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, // padding
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
];

/// Fan PWM set request. Byte 24 is the duty percentage, bytes 15-16 an
/// optional RPM hint, byte 46 the trailer.
pub const FAN_SET_REQUEST: [u8; FRAME_LENGTH] = [
    0x10, 0x12, 0x29, 0xaa, 0x01, 0x10, 0xff, 0xff, // header, channel id
    0x00, 0x10, 0x20, 0x00, 0x00, 0x00, 0x00, 0x00, // constant, RPM hint high (15)
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, // RPM hint low (16), padding
    0xff, 0xff, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, // PWM percent (24), checksum? (25)
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, // padding
    0x00, 0x00, 0x00, 0x00, 0x00, 0xff, 0xed, 0x00, // checksum? (45), trailer (46)
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, // padding
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
];

// =============================================================================
// Labels
// =============================================================================

/// Labels for the thermistor inputs.
pub const TEMP_LABELS: [&str; NUM_TEMP_SENSORS] = ["T1", "T2", "T3"];

/// Label for the coolant flow meter.
pub const FLOW_LABEL: &str = "coolant flow (l/h)";

/// Label for the coolant level switch.
pub const LEVEL_LABEL: &str = "coolant level";

// =============================================================================
// Fan Channels
// =============================================================================

/// Addressable fan channel on the controller.
///
/// Each channel maps 1:1 to a 2-byte wire identifier; the mapping never
/// changes for a running controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FanChannel {
    Fan1,
    Fan2,
    Fan3,
    Fan4,
    Fan5,
    Fan6,
}

impl FanChannel {
    /// All fan channels in wire order.
    pub const ALL: [FanChannel; NUM_FANS] = [
        FanChannel::Fan1,
        FanChannel::Fan2,
        FanChannel::Fan3,
        FanChannel::Fan4,
        FanChannel::Fan5,
        FanChannel::Fan6,
    ];

    /// Get the 2-byte wire channel identifier.
    pub const fn id(&self) -> [u8; 2] {
        match self {
            FanChannel::Fan1 => [0xa0, 0xa0],
            FanChannel::Fan2 => [0xa0, 0xc0],
            FanChannel::Fan3 => [0xa0, 0xe0],
            FanChannel::Fan4 => [0xa1, 0x00],
            FanChannel::Fan5 => [0xa1, 0x20],
            FanChannel::Fan6 => [0xa1, 0xe0],
        }
    }

    /// Zero-based channel index (F1 is 0).
    pub const fn index(&self) -> usize {
        *self as usize
    }

    /// Look up a channel by zero-based index.
    ///
    /// # Errors
    /// Returns `InvalidChannel` if `index` is outside 0-5.
    pub fn from_index(index: usize) -> Result<Self> {
        FanChannel::ALL
            .get(index)
            .copied()
            .ok_or(EkLoopError::InvalidChannel(index))
    }

    /// hwmon-style channel label.
    pub const fn label(&self) -> &'static str {
        match self {
            FanChannel::Fan1 => "F1",
            FanChannel::Fan2 => "F2",
            FanChannel::Fan3 => "F3",
            FanChannel::Fan4 => "F4",
            FanChannel::Fan5 => "F5",
            FanChannel::Fan6 => "F6",
        }
    }
}

impl std::fmt::Display for FanChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

// =============================================================================
// Request Builders
// =============================================================================

/// Build a fan state read request for one channel.
pub fn build_fan_read_request(channel: FanChannel) -> [u8; FRAME_LENGTH] {
    let mut frame = FAN_READ_REQUEST;
    frame[CHANNEL_OFFSET..CHANNEL_OFFSET + 2].copy_from_slice(&channel.id());
    frame
}

/// Build a fan PWM set request.
///
/// `pwm_percent` is the controller's native 0-100 scale; scaling from the
/// external 0-255 range happens at the facade boundary, not here.
pub fn build_fan_set_request(channel: FanChannel, pwm_percent: u8) -> [u8; FRAME_LENGTH] {
    debug_assert!(pwm_percent <= 100);

    let mut frame = FAN_SET_REQUEST;
    frame[CHANNEL_OFFSET..CHANNEL_OFFSET + 2].copy_from_slice(&channel.id());
    frame[FAN_SET_PWM_OFFSET] = pwm_percent;
    frame
}

/// Build the combined sensor read request (temperatures, flow, level).
pub fn build_sensor_read_request() -> [u8; FRAME_LENGTH] {
    SENSOR_READ_REQUEST
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_ids() {
        assert_eq!(FanChannel::Fan1.id(), [0xa0, 0xa0]);
        assert_eq!(FanChannel::Fan2.id(), [0xa0, 0xc0]);
        assert_eq!(FanChannel::Fan3.id(), [0xa0, 0xe0]);
        assert_eq!(FanChannel::Fan4.id(), [0xa1, 0x00]);
        assert_eq!(FanChannel::Fan5.id(), [0xa1, 0x20]);
        assert_eq!(FanChannel::Fan6.id(), [0xa1, 0xe0]);
    }

    #[test]
    fn test_from_index() {
        for index in 0..NUM_FANS {
            assert_eq!(FanChannel::from_index(index).unwrap().index(), index);
        }
        assert!(matches!(
            FanChannel::from_index(6),
            Err(EkLoopError::InvalidChannel(6))
        ));
    }

    #[test]
    fn test_fan_read_request_stamps_channel() {
        for channel in FanChannel::ALL {
            let frame = build_fan_read_request(channel);
            assert_eq!(frame[CHANNEL_OFFSET..CHANNEL_OFFSET + 2], channel.id());
            // Header and trailer stay untouched
            assert_eq!(frame[0..6], [0x10, 0x12, 0x08, 0xaa, 0x01, 0x03]);
            assert_eq!(frame[13], 0xed);
        }
    }

    #[test]
    fn test_fan_set_request_stamps_channel_and_duty() {
        for channel in FanChannel::ALL {
            let frame = build_fan_set_request(channel, 75);
            assert_eq!(frame[CHANNEL_OFFSET..CHANNEL_OFFSET + 2], channel.id());
            assert_eq!(frame[FAN_SET_PWM_OFFSET], 75);
            assert_eq!(frame[0..6], [0x10, 0x12, 0x29, 0xaa, 0x01, 0x10]);
            assert_eq!(frame[46], 0xed);
        }
    }

    #[test]
    fn test_sensor_request_uses_fixed_channel() {
        let frame = build_sensor_read_request();
        assert_eq!(frame[CHANNEL_OFFSET..CHANNEL_OFFSET + 2], [0xa2, 0x20]);
        assert_eq!(frame[13], 0xed);
    }
}
