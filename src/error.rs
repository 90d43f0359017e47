//! Custom error types for the EK Loop Connect driver.
//!
//! This module provides fine-grained error handling for device
//! communication, wire decoding, and preset validation.

use thiserror::Error;

/// Main error type for EK Loop Connect operations.
#[derive(Error, Debug)]
pub enum EkLoopError {
    /// Device not found during enumeration.
    #[error("EK Loop Connect not found. Check USB connection and permissions.")]
    DeviceNotFound,

    /// Multiple devices found when expecting one.
    #[error("Multiple EK Loop Connect controllers found. Use open_path() to select one.")]
    MultipleDevicesFound,

    /// HID communication error.
    #[error("HID communication error: {0}")]
    HidError(#[from] hidapi::HidError),

    /// Fan channel index outside F1-F6.
    #[error("Invalid fan channel index {0}. Valid range: 0-5")]
    InvalidChannel(usize),

    /// Temperature sensor index outside T1-T3.
    #[error("Invalid temperature sensor index {0}. Valid range: 0-2")]
    InvalidSensor(usize),

    /// PWM target outside the external 0-255 scale.
    #[error("Invalid PWM target {0}. Valid range: 0-255")]
    InvalidPwmTarget(u16),

    /// Duty cycle outside the controller's 0-100 percent scale.
    #[error("Invalid duty cycle {0}%. Valid range: 0-100")]
    InvalidDuty(u8),

    /// Preset has invalid format or could not be stored.
    #[error("Invalid preset: {0}")]
    InvalidPreset(String),

    /// Timeout waiting for the controller to answer a request.
    #[error("Timeout waiting for controller response")]
    Timeout,

    /// Generic invalid input error.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type alias for EK Loop Connect operations.
pub type Result<T> = std::result::Result<T, EkLoopError>;
