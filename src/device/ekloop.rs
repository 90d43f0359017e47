//! EK Loop Connect device implementation.
//!
//! High-level read/write surface over the transaction engine, in both the
//! controller's wire units and hwmon-style external units.

use std::sync::Arc;

use hidapi::{HidApi, HidDevice};
use tracing::debug;

use crate::config::FanPreset;
use crate::device::transaction::{Inbox, TransactionEngine};
use crate::device::transport::{HidTransport, Transport};
use crate::error::{EkLoopError, Result};
use crate::protocol::{
    EK_LOOP_CONNECT_PID, EK_VID, FRAME_LENGTH, FanChannel, FanStatus, NUM_TEMP_SENSORS,
    SensorStatus, TEMP_LABELS, build_fan_read_request, build_fan_set_request,
    build_sensor_read_request,
};
use crate::utils::units;

// =============================================================================
// EkLoopConnect
// =============================================================================

/// EK Loop Connect device handle.
///
/// One handle owns one transaction engine and therefore one shared
/// request/response buffer; open a separate handle per attached
/// controller. All methods take `&self` and may be called from any number
/// of threads; transactions are executed strictly one at a time.
///
/// # Example
///
/// ```no_run
/// use ek_loop_connect::device::EkLoopConnect;
/// use ek_loop_connect::protocol::FanChannel;
///
/// let device = EkLoopConnect::open()?;
///
/// let fan = device.fan_status(FanChannel::Fan1)?;
/// println!("F1: {}", fan);
///
/// // Half speed on the external 0-255 scale
/// device.set_fan_pwm(FanChannel::Fan1, 128)?;
/// # Ok::<(), ek_loop_connect::error::EkLoopError>(())
/// ```
pub struct EkLoopConnect<T: Transport = HidTransport> {
    engine: TransactionEngine<T>,
}

impl EkLoopConnect<HidTransport> {
    /// Open the first available EK Loop Connect.
    ///
    /// # Errors
    /// Returns `DeviceNotFound` if no controller is connected.
    pub fn open() -> Result<Self> {
        let api = HidApi::new()?;

        for info in api.device_list() {
            if info.vendor_id() == EK_VID && info.product_id() == EK_LOOP_CONNECT_PID {
                let device = info.open_device(&api)?;
                return Ok(Self::from_hid_device(device));
            }
        }

        Err(EkLoopError::DeviceNotFound)
    }

    /// Open an EK Loop Connect by path.
    ///
    /// Useful when multiple controllers are connected.
    pub fn open_path(path: &std::ffi::CStr) -> Result<Self> {
        let api = HidApi::new()?;
        let device = api.open_path(path)?;
        Ok(Self::from_hid_device(device))
    }

    /// List all connected EK Loop Connect controllers.
    ///
    /// Returns a vector of (path, serial_number) tuples.
    pub fn list_devices() -> Result<Vec<(String, Option<String>)>> {
        let api = HidApi::new()?;

        let devices: Vec<_> = api
            .device_list()
            .filter(|info| {
                info.vendor_id() == EK_VID && info.product_id() == EK_LOOP_CONNECT_PID
            })
            .map(|info| {
                (
                    info.path().to_string_lossy().into_owned(),
                    info.serial_number().map(String::from),
                )
            })
            .collect();

        Ok(devices)
    }

    fn from_hid_device(device: HidDevice) -> Self {
        let inbox = Arc::new(Inbox::new());
        let transport = HidTransport::start(device, Arc::clone(&inbox));
        Self {
            engine: TransactionEngine::new(transport, inbox),
        }
    }
}

impl<T: Transport> EkLoopConnect<T> {
    /// Build a device handle over a custom transport.
    ///
    /// The transport must deliver its inbound reports to `inbox`.
    pub fn with_transport(transport: T, inbox: Arc<Inbox>) -> Self {
        Self {
            engine: TransactionEngine::new(transport, inbox),
        }
    }

    // =========================================================================
    // Wire-unit readings
    // =========================================================================

    /// Read one fan channel's state in controller units.
    pub fn fan_status(&self, channel: FanChannel) -> Result<FanStatus> {
        let response = self.engine.execute(&build_fan_read_request(channel))?;
        Ok(FanStatus::parse(&response))
    }

    /// Read the shared sensor block (temperatures, flow, coolant level).
    pub fn sensor_status(&self) -> Result<SensorStatus> {
        let response = self.engine.execute(&build_sensor_read_request())?;
        Ok(SensorStatus::parse(&response))
    }

    /// Execute a sensor read and return the raw response frame.
    ///
    /// Useful for protocol work; the offsets decoded by
    /// [`SensorStatus::parse`] index into this frame.
    pub fn raw_sensor_frame(&self) -> Result<[u8; FRAME_LENGTH]> {
        self.engine.execute(&build_sensor_read_request())
    }

    // =========================================================================
    // External-unit surface
    // =========================================================================

    /// Fan speed in RPM.
    pub fn fan_rpm(&self, channel: FanChannel) -> Result<u16> {
        Ok(self.fan_status(channel)?.rpm)
    }

    /// Fan duty on the external 0-255 scale.
    pub fn fan_pwm(&self, channel: FanChannel) -> Result<u16> {
        Ok(units::pwm_to_external(self.fan_status(channel)?.pwm_percent))
    }

    /// Set a fan duty from the external 0-255 scale.
    ///
    /// # Errors
    /// Returns `InvalidPwmTarget` for targets above 255, before any I/O.
    pub fn set_fan_pwm(&self, channel: FanChannel, target: u16) -> Result<()> {
        if target > 255 {
            return Err(EkLoopError::InvalidPwmTarget(target));
        }
        self.set_fan_percent(channel, units::pwm_to_wire(target))
    }

    /// Set a fan duty on the controller's native 0-100 scale.
    ///
    /// The set response carries no useful payload and is discarded after
    /// a successful transaction.
    pub fn set_fan_percent(&self, channel: FanChannel, duty: u8) -> Result<()> {
        if duty > 100 {
            return Err(EkLoopError::InvalidDuty(duty));
        }

        debug!(%channel, duty, "setting fan duty");
        self.engine
            .execute(&build_fan_set_request(channel, duty))?;
        Ok(())
    }

    /// Coolant flow in liters per hour.
    pub fn flow_lph(&self) -> Result<u16> {
        Ok(units::flow_to_lph(self.sensor_status()?.flow_raw))
    }

    /// One thermistor reading in milli-degrees Celsius, `None` when the
    /// probe is absent or unused.
    pub fn temperature_millidegrees(&self, sensor: usize) -> Result<Option<i32>> {
        if sensor >= NUM_TEMP_SENSORS {
            return Err(EkLoopError::InvalidSensor(sensor));
        }
        Ok(self.sensor_status()?.temps[sensor].map(units::celsius_to_millidegrees))
    }

    /// Coolant level switch state; `false` signals the level alarm.
    pub fn coolant_level_ok(&self) -> Result<bool> {
        Ok(self.sensor_status()?.level_ok)
    }

    /// Apply per-channel duty targets from a preset, F1 through F6.
    pub fn apply_preset(&self, preset: &FanPreset) -> Result<()> {
        let duties = preset.duties()?;
        for (channel, duty) in FanChannel::ALL.iter().zip(duties) {
            self.set_fan_percent(*channel, duty)?;
        }
        Ok(())
    }

    // =========================================================================
    // Labels
    // =========================================================================

    /// hwmon-style label for a fan channel.
    pub fn fan_label(&self, channel: FanChannel) -> &'static str {
        channel.label()
    }

    /// hwmon-style label for a temperature sensor.
    pub fn temp_label(&self, sensor: usize) -> Result<&'static str> {
        TEMP_LABELS
            .get(sensor)
            .copied()
            .ok_or(EkLoopError::InvalidSensor(sensor))
    }
}

impl<T: Transport> std::fmt::Debug for EkLoopConnect<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EkLoopConnect").finish_non_exhaustive()
    }
}
