//! Scripted console port for tests.
//!
//! `MockSerialPort` replays console output queued ahead of time, optionally
//! in small fragments, so line assembly and timeout handling can be exercised
//! without a DUT attached.

use super::error::PortError;
use super::traits::SerialPortAdapter;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::io;
use std::sync::Arc;
use std::time::Duration;

/// Upper bound on how long an empty read sleeps, so tests stay fast even when
/// a caller sets a long timeout.
const MAX_IDLE_SLEEP: Duration = Duration::from_millis(50);

#[derive(Debug)]
struct MockPortState {
    /// Bytes still to be delivered by read operations.
    read_queue: VecDeque<u8>,
    /// Largest number of bytes a single read returns.
    chunk_size: usize,
    /// Configured read timeout.
    timeout: Duration,
    /// Error kind to return from the next read, if any.
    fail_next: Option<io::ErrorKind>,
    resets: usize,
    buffers_cleared: bool,
}

/// Mock console port.
///
/// Clones share state, so a test can keep a handle while the console reader
/// owns the boxed adapter.
///
/// # Example
/// ```
/// use dut_probe::port::{MockSerialPort, SerialPortAdapter};
///
/// let mut port = MockSerialPort::new("MOCK0");
/// port.enqueue_line("I (312) WEBSERVER: Starting HTTP Server on port: '80'");
///
/// let mut buffer = [0u8; 128];
/// let n = port.read_bytes(&mut buffer).unwrap();
/// assert!(buffer[..n].ends_with(b"\r\n"));
/// ```
#[derive(Clone)]
pub struct MockSerialPort {
    name: String,
    state: Arc<Mutex<MockPortState>>,
}

impl MockSerialPort {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state: Arc::new(Mutex::new(MockPortState {
                read_queue: VecDeque::new(),
                chunk_size: usize::MAX,
                timeout: Duration::from_millis(100),
                fail_next: None,
                resets: 0,
                buffers_cleared: false,
            })),
        }
    }

    /// Create a mock that will print `lines` in order.
    pub fn with_lines<I, S>(name: impl Into<String>, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut port = Self::new(name);
        for line in lines {
            port.enqueue_line(line.as_ref());
        }
        port
    }

    /// Queue raw bytes exactly as given.
    pub fn enqueue_read(&mut self, data: &[u8]) {
        self.state.lock().read_queue.extend(data);
    }

    /// Queue one console line terminated the way ESP-IDF terminates it.
    pub fn enqueue_line(&mut self, line: &str) {
        let mut state = self.state.lock();
        state.read_queue.extend(line.as_bytes());
        state.read_queue.extend(b"\r\n");
    }

    /// Deliver at most `size` bytes per read.
    pub fn set_chunk_size(&mut self, size: usize) {
        self.state.lock().chunk_size = size.max(1);
    }

    /// Make the next read fail with an I/O error of the given kind.
    pub fn fail_next_read(&mut self, kind: io::ErrorKind) {
        self.state.lock().fail_next = Some(kind);
    }

    /// Number of reset pulses requested so far.
    pub fn reset_count(&self) -> usize {
        self.state.lock().resets
    }

    pub fn was_cleared(&self) -> bool {
        self.state.lock().buffers_cleared
    }

    pub fn available_bytes(&self) -> usize {
        self.state.lock().read_queue.len()
    }
}

impl SerialPortAdapter for MockSerialPort {
    fn read_bytes(&mut self, buffer: &mut [u8]) -> Result<usize, PortError> {
        let mut state = self.state.lock();

        if let Some(kind) = state.fail_next.take() {
            return Err(PortError::Io(io::Error::new(kind, "injected fault")));
        }

        if state.read_queue.is_empty() {
            // Behave like a real port: block for the read window, then time out.
            let idle = state.timeout.min(MAX_IDLE_SLEEP);
            drop(state);
            std::thread::sleep(idle);
            return Err(PortError::Io(io::Error::new(
                io::ErrorKind::TimedOut,
                "No data available",
            )));
        }

        let limit = buffer.len().min(state.chunk_size);
        let mut bytes_read = 0;
        for byte in buffer.iter_mut().take(limit) {
            match state.read_queue.pop_front() {
                Some(queued) => {
                    *byte = queued;
                    bytes_read += 1;
                }
                None => break,
            }
        }
        Ok(bytes_read)
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn set_timeout(&mut self, timeout: Duration) -> Result<(), PortError> {
        self.state.lock().timeout = timeout;
        Ok(())
    }

    fn clear_buffers(&mut self) -> Result<(), PortError> {
        let mut state = self.state.lock();
        state.read_queue.clear();
        state.buffers_cleared = true;
        Ok(())
    }

    fn pulse_reset(&mut self) -> Result<(), PortError> {
        self.state.lock().resets += 1;
        Ok(())
    }
}

impl std::fmt::Debug for MockSerialPort {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockSerialPort")
            .field("name", &self.name)
            .field("available_bytes", &self.available_bytes())
            .finish()
    }
}
