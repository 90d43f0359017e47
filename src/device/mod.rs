//! Device abstraction layer for the EK Loop Connect.
//!
//! Provides device discovery, the HID transport, and the synchronous
//! transaction engine.

pub mod ekloop;
pub mod transaction;
pub mod transport;

pub use ekloop::EkLoopConnect;

pub use transaction::{Inbox, REQUEST_TIMEOUT, TransactionEngine};
pub use transport::{HidTransport, Transport};
