//! HID transport for the EK Loop Connect.
//!
//! The wire protocol is pure request/response, but the HID layer delivers
//! input reports on its own schedule. [`HidTransport`] owns a background
//! reader thread that forwards every inbound report to the transaction
//! engine's [`Inbox`], standing in for the platform's interrupt callback.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use hidapi::HidDevice;
use tracing::warn;

use crate::device::transaction::Inbox;
use crate::error::Result;
use crate::protocol::FRAME_LENGTH;

/// Poll granularity of the reader thread, in milliseconds. A write can be
/// delayed by at most one poll interval while the reader holds the device.
const READ_POLL_MS: i32 = 20;

/// Fire-and-forget frame output toward the controller.
///
/// Implementations deliver inbound reports out-of-band to the engine's
/// [`Inbox`]; `send` never waits for a response.
pub trait Transport: Send + Sync {
    /// Write one frame to the controller.
    fn send(&self, frame: &[u8; FRAME_LENGTH]) -> Result<()>;
}

// =============================================================================
// HidTransport
// =============================================================================

/// Production transport over a hidapi device handle.
pub struct HidTransport {
    device: Arc<Mutex<HidDevice>>,
    running: Arc<AtomicBool>,
    reader: Option<JoinHandle<()>>,
}

impl HidTransport {
    /// Take ownership of an open device and start the reader thread.
    ///
    /// Every report read from the device is handed to `inbox`; the inbox
    /// decides whether a transaction is waiting for it.
    pub fn start(device: HidDevice, inbox: Arc<Inbox>) -> Self {
        let device = Arc::new(Mutex::new(device));
        let running = Arc::new(AtomicBool::new(true));

        let reader = {
            let device = Arc::clone(&device);
            let running = Arc::clone(&running);
            thread::spawn(move || {
                // One spare byte in case the platform prepends a report id.
                let mut buf = [0u8; FRAME_LENGTH + 1];
                while running.load(Ordering::Relaxed) {
                    let read = {
                        let device = device.lock().unwrap_or_else(PoisonError::into_inner);
                        device.read_timeout(&mut buf, READ_POLL_MS)
                    };
                    match read {
                        Ok(0) => {}
                        Ok(n) => inbox.deliver(&buf[..n]),
                        Err(err) => {
                            warn!("HID read failed: {}", err);
                            // Keep a dead device from spinning the thread.
                            thread::sleep(Duration::from_millis(100));
                        }
                    }
                }
            })
        };

        Self {
            device,
            running,
            reader: Some(reader),
        }
    }
}

impl Transport for HidTransport {
    fn send(&self, frame: &[u8; FRAME_LENGTH]) -> Result<()> {
        // The controller uses no report ids; hidapi still expects the id
        // byte (0x00) in front of the payload.
        let mut report = [0u8; FRAME_LENGTH + 1];
        report[1..].copy_from_slice(frame);

        let device = self.device.lock().unwrap_or_else(PoisonError::into_inner);
        device.write(&report)?;
        Ok(())
    }
}

impl Drop for HidTransport {
    fn drop(&mut self) {
        self.running.store(false, Ordering::Relaxed);
        if let Some(reader) = self.reader.take() {
            let _ = reader.join();
        }
    }
}
