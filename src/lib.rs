//! EK Loop Connect Driver Library
//!
//! A Rust driver for the EK Loop Connect fan and sensor controller.
//!
//! # Features
//!
//! - Read fan state (RPM, duty) on six PWM channels
//! - Read coolant temperatures, flow, and level
//! - Set per-channel PWM targets (native 0-100 or external 0-255 scale)
//! - Apply named fan presets
//!
//! # Example
//!
//! ```no_run
//! use ek_loop_connect::device::EkLoopConnect;
//! use ek_loop_connect::protocol::FanChannel;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Open the controller
//!     let device = EkLoopConnect::open()?;
//!
//!     // Read one fan channel and the shared sensor block
//!     let fan = device.fan_status(FanChannel::Fan1)?;
//!     println!("F1: {} RPM at {}%", fan.rpm, fan.pwm_percent);
//!
//!     let sensors = device.sensor_status()?;
//!     println!("{}", sensors);
//!
//!     // Half speed on the external 0-255 scale
//!     device.set_fan_pwm(FanChannel::Fan1, 128)?;
//!
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod device;
pub mod error;
pub mod protocol;
pub mod storage;
pub mod utils;

// Re-exports for convenience
pub use config::FanPreset;
pub use device::EkLoopConnect;
pub use error::{EkLoopError, Result};
pub use protocol::{FanChannel, FanStatus, SensorStatus};
