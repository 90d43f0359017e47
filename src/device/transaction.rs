//! Synchronous transaction engine over the asynchronous HID transport.
//!
//! The protocol carries no sequence numbers, so a response can only be
//! matched to its request by keeping exactly one transaction in flight.
//! A mutex totally orders callers; a one-shot mailbox hands the inbound
//! frame from the transport's reader context to the blocked caller.

use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tracing::{trace, warn};

use crate::device::transport::Transport;
use crate::error::{EkLoopError, Result};
use crate::protocol::FRAME_LENGTH;

/// How long a caller waits for the controller to answer one request.
pub const REQUEST_TIMEOUT: Duration = Duration::from_millis(500);

// =============================================================================
// Inbox
// =============================================================================

/// One-shot mailbox between the transport's inbound context and the
/// transaction currently waiting for a response.
///
/// The buffer inside is the single shared request/response buffer for the
/// device. Every transaction reuses it; while a transaction is in flight
/// it belongs exclusively to the caller holding the engine's lock.
pub struct Inbox {
    slot: Mutex<Slot>,
    ready: Condvar,
}

struct Slot {
    buffer: [u8; FRAME_LENGTH],
    /// A transaction is waiting for an inbound frame.
    armed: bool,
    /// An inbound frame has been captured and not yet consumed.
    filled: bool,
}

impl Inbox {
    pub fn new() -> Self {
        Self {
            slot: Mutex::new(Slot {
                buffer: [0; FRAME_LENGTH],
                armed: false,
                filled: false,
            }),
            ready: Condvar::new(),
        }
    }

    /// Deliver an inbound report from the transport.
    ///
    /// Safe to call at any time from any thread. Frames arriving while no
    /// transaction is waiting, or after a response has already been
    /// captured, are dropped so they cannot corrupt a later transaction.
    pub fn deliver(&self, data: &[u8]) {
        let mut slot = self.lock_slot();
        if !slot.armed || slot.filled {
            trace!(len = data.len(), "dropping unsolicited report");
            return;
        }

        let len = data.len().min(FRAME_LENGTH);
        slot.buffer[..len].copy_from_slice(&data[..len]);
        slot.filled = true;
        self.ready.notify_one();
    }

    /// Stage a request in the shared buffer and clear the signaled state.
    fn arm(&self, request: &[u8; FRAME_LENGTH]) {
        let mut slot = self.lock_slot();
        slot.buffer = *request;
        slot.armed = true;
        slot.filled = false;
    }

    /// Block until a response is captured or the timeout elapses.
    ///
    /// The mailbox is disarmed on both paths, so a frame arriving after a
    /// timeout is discarded instead of lingering for the next caller.
    fn wait(&self, timeout: Duration) -> Option<[u8; FRAME_LENGTH]> {
        let slot = self.lock_slot();
        let (mut slot, _) = self
            .ready
            .wait_timeout_while(slot, timeout, |slot| !slot.filled)
            .unwrap_or_else(PoisonError::into_inner);

        slot.armed = false;
        if slot.filled {
            slot.filled = false;
            Some(slot.buffer)
        } else {
            None
        }
    }

    /// Abandon a staged request after a transport failure.
    fn disarm(&self) {
        let mut slot = self.lock_slot();
        slot.armed = false;
        slot.filled = false;
    }

    fn lock_slot(&self) -> MutexGuard<'_, Slot> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for Inbox {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Transaction Engine
// =============================================================================

/// Serialized request/response execution against one controller.
///
/// At most one transaction is in flight at any time, across all callers
/// and all channels; the transaction lock is the only substitute the
/// protocol leaves for request/response correlation.
pub struct TransactionEngine<T: Transport> {
    transport: T,
    inbox: Arc<Inbox>,
    transaction: Mutex<()>,
}

impl<T: Transport> TransactionEngine<T> {
    /// Create an engine over a transport that delivers its inbound
    /// reports to `inbox`.
    pub fn new(transport: T, inbox: Arc<Inbox>) -> Self {
        Self {
            transport,
            inbox,
            transaction: Mutex::new(()),
        }
    }

    /// Send a request and block until the matching response arrives.
    ///
    /// Callers first block while another transaction is in flight, then
    /// for up to [`REQUEST_TIMEOUT`] waiting for the controller. A
    /// timed-out transaction releases the engine for the next caller; no
    /// retry is attempted here.
    pub fn execute(&self, request: &[u8; FRAME_LENGTH]) -> Result<[u8; FRAME_LENGTH]> {
        let _transaction = self
            .transaction
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        self.inbox.arm(request);
        trace!(kind = request[2], "sending request");
        if let Err(err) = self.transport.send(request) {
            self.inbox.disarm();
            return Err(err);
        }

        match self.inbox.wait(REQUEST_TIMEOUT) {
            Some(response) => Ok(response),
            None => {
                warn!("controller did not answer within {:?}", REQUEST_TIMEOUT);
                Err(EkLoopError::Timeout)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::thread;
    use std::time::Instant;

    /// Transport that records send instants and answers after a delay.
    struct ScriptedTransport {
        inbox: Arc<Inbox>,
        reply: Mutex<Option<[u8; FRAME_LENGTH]>>,
        delay: Duration,
        sends: Arc<Mutex<Vec<Instant>>>,
    }

    impl ScriptedTransport {
        fn new(inbox: Arc<Inbox>, reply: Option<[u8; FRAME_LENGTH]>, delay: Duration) -> Self {
            Self {
                inbox,
                reply: Mutex::new(reply),
                delay,
                sends: Arc::new(Mutex::new(Vec::new())),
            }
        }
    }

    impl Transport for ScriptedTransport {
        fn send(&self, _frame: &[u8; FRAME_LENGTH]) -> Result<()> {
            self.sends.lock().unwrap().push(Instant::now());
            if let Some(reply) = *self.reply.lock().unwrap() {
                let inbox = Arc::clone(&self.inbox);
                let delay = self.delay;
                thread::spawn(move || {
                    thread::sleep(delay);
                    inbox.deliver(&reply);
                });
            }
            Ok(())
        }
    }

    /// Transport whose send always fails.
    struct BrokenTransport;

    impl Transport for BrokenTransport {
        fn send(&self, _frame: &[u8; FRAME_LENGTH]) -> Result<()> {
            Err(EkLoopError::HidError(hidapi::HidError::HidApiError {
                message: "device gone".into(),
            }))
        }
    }

    fn frame_with_marker(marker: u8) -> [u8; FRAME_LENGTH] {
        let mut frame = [0u8; FRAME_LENGTH];
        frame[0] = marker;
        frame
    }

    #[test]
    fn test_execute_returns_response() {
        let inbox = Arc::new(Inbox::new());
        let transport = ScriptedTransport::new(
            Arc::clone(&inbox),
            Some(frame_with_marker(0x42)),
            Duration::from_millis(10),
        );
        let engine = TransactionEngine::new(transport, inbox);

        let response = engine.execute(&frame_with_marker(0x01)).unwrap();
        assert_eq!(response[0], 0x42);
    }

    #[test]
    fn test_timeout_then_engine_stays_usable() {
        let inbox = Arc::new(Inbox::new());
        let transport =
            ScriptedTransport::new(Arc::clone(&inbox), None, Duration::from_millis(0));
        let engine = TransactionEngine::new(transport, inbox);

        let started = Instant::now();
        let err = engine.execute(&frame_with_marker(0x01)).unwrap_err();
        let elapsed = started.elapsed();

        assert!(matches!(err, EkLoopError::Timeout));
        assert!(elapsed >= Duration::from_millis(450), "returned too early: {elapsed:?}");
        assert!(elapsed < Duration::from_secs(2), "returned too late: {elapsed:?}");

        // The lock was released; the next transaction goes through.
        *engine.transport.reply.lock().unwrap() = Some(frame_with_marker(0x42));
        let response = engine.execute(&frame_with_marker(0x02)).unwrap();
        assert_eq!(response[0], 0x42);
    }

    #[test]
    fn test_concurrent_transactions_never_interleave() {
        let reply_delay = Duration::from_millis(50);
        let inbox = Arc::new(Inbox::new());
        let transport =
            ScriptedTransport::new(Arc::clone(&inbox), Some(frame_with_marker(0x42)), reply_delay);
        let sends = Arc::clone(&transport.sends);
        let engine = Arc::new(TransactionEngine::new(transport, inbox));

        let workers: Vec<_> = (0..2)
            .map(|_| {
                let engine = Arc::clone(&engine);
                thread::spawn(move || engine.execute(&frame_with_marker(0x01)).unwrap())
            })
            .collect();
        for worker in workers {
            worker.join().unwrap();
        }

        let sends = sends.lock().unwrap();
        assert_eq!(sends.len(), 2);
        // The second request must not hit the wire before the first
        // transaction's response was captured.
        assert!(sends[1].duration_since(sends[0]) >= reply_delay);
    }

    #[test]
    fn test_unsolicited_report_is_dropped() {
        let inbox = Arc::new(Inbox::new());
        // Nothing is waiting; this report must vanish.
        inbox.deliver(&frame_with_marker(0x99));

        let transport = ScriptedTransport::new(
            Arc::clone(&inbox),
            Some(frame_with_marker(0x42)),
            Duration::from_millis(5),
        );
        let engine = TransactionEngine::new(transport, inbox);

        let response = engine.execute(&frame_with_marker(0x01)).unwrap();
        assert_eq!(response[0], 0x42);
    }

    #[test]
    fn test_duplicate_report_is_dropped() {
        let inbox = Inbox::new();
        inbox.arm(&frame_with_marker(0x01));

        inbox.deliver(&frame_with_marker(0x42));
        // Second report before the first was consumed: dropped.
        inbox.deliver(&frame_with_marker(0x99));

        let captured = inbox.wait(Duration::from_millis(10)).unwrap();
        assert_eq!(captured[0], 0x42);
    }

    #[test]
    fn test_send_failure_disarms_mailbox() {
        let inbox = Arc::new(Inbox::new());
        let engine = TransactionEngine::new(BrokenTransport, Arc::clone(&inbox));

        let err = engine.execute(&frame_with_marker(0x01)).unwrap_err();
        assert!(matches!(err, EkLoopError::HidError(_)));

        // A frame arriving after the failed send must be discarded.
        inbox.deliver(&frame_with_marker(0x99));
        let slot = inbox.lock_slot();
        assert!(!slot.filled);
    }
}
