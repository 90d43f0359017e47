//! Unit conversions between wire values and externally presented units.
//!
//! The controller reports PWM as a 0-100 percentage, coolant flow in raw
//! pulse units, and temperatures in whole degrees Celsius. The external
//! surface follows hwmon conventions: PWM on a 0-255 scale, flow in l/h,
//! temperatures in milli-degrees.

/// Scale a wire PWM percentage (0-100) to the external 0-255 range,
/// rounding to nearest.
pub fn pwm_to_external(percent: u8) -> u16 {
    ((u32::from(percent) * 255 + 50) / 100) as u16
}

/// Scale an external PWM target (0-255) to the controller's 0-100
/// percentage, rounding to nearest.
pub fn pwm_to_wire(target: u16) -> u8 {
    ((u32::from(target) * 100 + 127) / 255) as u8
}

/// Convert a raw flow reading to liters per hour.
///
/// The meter has a conversion factor of 0.8 l/h per raw unit; the result
/// truncates toward zero.
pub fn flow_to_lph(raw: u16) -> u16 {
    (u32::from(raw) * 8 / 10) as u16
}

/// Convert a whole-degrees Celsius reading to milli-degrees.
pub fn celsius_to_millidegrees(deg: u8) -> i32 {
    i32::from(deg) * 1000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pwm_to_external() {
        assert_eq!(pwm_to_external(0), 0);
        assert_eq!(pwm_to_external(50), 128);
        assert_eq!(pwm_to_external(100), 255);
    }

    #[test]
    fn test_pwm_to_wire() {
        assert_eq!(pwm_to_wire(0), 0);
        assert_eq!(pwm_to_wire(128), 50);
        assert_eq!(pwm_to_wire(255), 100);
    }

    #[test]
    fn test_flow_to_lph_truncates() {
        assert_eq!(flow_to_lph(0), 0);
        assert_eq!(flow_to_lph(100), 80);
        assert_eq!(flow_to_lph(101), 80);
        assert_eq!(flow_to_lph(102), 81);
    }

    #[test]
    fn test_celsius_to_millidegrees() {
        assert_eq!(celsius_to_millidegrees(0), 0);
        assert_eq!(celsius_to_millidegrees(34), 34000);
    }
}
