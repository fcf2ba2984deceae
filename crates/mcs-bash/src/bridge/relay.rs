//! One-directional relay task

use std::fmt;
use std::io::{self, Read, Write};
use std::sync::Arc;
use std::time::Duration;

use mcs_core::config::MAX_CHUNK_SIZE;
use mcs_core::endpoint::{ByteSink, ByteSource};
use tokio_util::sync::CancellationToken;

use super::gate::CompletionGate;

/// Bytes requested per read unless configured otherwise
pub const DEFAULT_CHUNK_SIZE: usize = 4096;

/// Pause after a source reports `WouldBlock`
const IDLE_BACKOFF: Duration = Duration::from_millis(10);

/// Which way a relay copies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// User terminal to subprocess
    Forward,
    /// Subprocess to user terminal
    Reverse,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Forward => write!(f, "forward"),
            Direction::Reverse => write!(f, "reverse"),
        }
    }
}

/// Lifecycle of a relay task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayState {
    /// Copying
    Running,
    /// Source reached end-of-stream
    Draining,
    /// Cancellation observed between reads
    Cancelled,
    /// Read or write failed
    Failed,
    /// Terminal state
    Stopped,
}

impl RelayState {
    /// Whether `self -> next` is a legal transition
    pub fn can_transition_to(self, next: RelayState) -> bool {
        use RelayState::*;
        matches!(
            (self, next),
            (Running, Draining | Cancelled | Failed) | (Draining | Cancelled | Failed, Stopped)
        )
    }
}

/// How a relay task ended
#[derive(Debug)]
pub enum RelayOutcome {
    /// Source reached end-of-stream
    Drained,
    /// Stopped by cancellation
    Cancelled,
    /// Stopped by an I/O failure on the source or sink
    Failed(io::Error),
}

impl RelayOutcome {
    /// Whether the task stopped because of an I/O failure
    pub fn is_failure(&self) -> bool {
        matches!(self, RelayOutcome::Failed(_))
    }
}

/// Summary of a finished relay task
#[derive(Debug)]
pub struct RelayReport {
    /// Direction relayed
    pub direction: Direction,
    /// Why the task stopped
    pub outcome: RelayOutcome,
    /// Bytes written to the sink
    pub bytes: u64,
    /// States passed through, from `Running` to `Stopped`
    pub states: Vec<RelayState>,
}

/// Copies bytes from a source to a sink until end-of-stream, failure, or
/// cancellation.
///
/// The task signals its [`CompletionGate`] exactly once when it stops,
/// whichever way it stops.
pub struct RelayTask {
    direction: Direction,
    source: ByteSource,
    sink: ByteSink,
    cancel: CancellationToken,
    gate: Arc<CompletionGate>,
    chunk_size: usize,
    states: Vec<RelayState>,
}

impl RelayTask {
    /// Create a relay task in the `Running` state
    pub fn new(
        direction: Direction,
        source: ByteSource,
        sink: ByteSink,
        cancel: CancellationToken,
        gate: Arc<CompletionGate>,
    ) -> Self {
        Self {
            direction,
            source,
            sink,
            cancel,
            gate,
            chunk_size: DEFAULT_CHUNK_SIZE,
            states: vec![RelayState::Running],
        }
    }

    /// Set the maximum number of bytes taken per read, clamped to
    /// `1..=MAX_CHUNK_SIZE`
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.clamp(1, MAX_CHUNK_SIZE);
        self
    }

    /// Run the copy loop on the current thread until the task stops.
    ///
    /// Blocks inside source reads. Meant for a blocking-pool thread.
    pub fn run(mut self) -> RelayReport {
        let _signal = GateSignal(Arc::clone(&self.gate));
        let mut buf = vec![0u8; self.chunk_size];
        let mut bytes: u64 = 0;

        tracing::debug!("Relay {} started", self.direction);

        let outcome = loop {
            if self.cancel.is_cancelled() {
                self.transition(RelayState::Cancelled);
                break RelayOutcome::Cancelled;
            }

            match self.source.read(&mut buf) {
                Ok(0) => {
                    self.transition(RelayState::Draining);
                    break RelayOutcome::Drained;
                }
                Ok(n) => {
                    if let Err(e) = write_chunk(&mut self.sink, &buf[..n]) {
                        self.fail("write", &e);
                        break RelayOutcome::Failed(e);
                    }
                    bytes += n as u64;
                    tracing::trace!("Relay {} forwarded {} bytes", self.direction, n);
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) if e.kind() == io::ErrorKind::TimedOut => {}
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => {
                    std::thread::sleep(IDLE_BACKOFF);
                }
                Err(e) => {
                    self.fail("read", &e);
                    break RelayOutcome::Failed(e);
                }
            }
        };

        self.transition(RelayState::Stopped);
        tracing::debug!(
            "Relay {} stopped after {} bytes ({:?})",
            self.direction,
            bytes,
            outcome
        );

        RelayReport {
            direction: self.direction,
            outcome,
            bytes,
            states: std::mem::take(&mut self.states),
        }
    }

    fn transition(&mut self, next: RelayState) {
        let current = self.state();
        debug_assert!(
            current.can_transition_to(next),
            "illegal relay transition {:?} -> {:?}",
            current,
            next
        );
        self.states.push(next);
    }

    fn state(&self) -> RelayState {
        self.states.last().copied().unwrap_or(RelayState::Running)
    }

    fn fail(&mut self, op: &str, e: &io::Error) {
        self.transition(RelayState::Failed);
        if is_hangup(e) {
            tracing::debug!("Relay {} peer closed during {}: {}", self.direction, op, e);
        } else {
            tracing::error!("Relay {} {} error: {}", self.direction, op, e);
        }
    }
}

impl fmt::Debug for RelayTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RelayTask")
            .field("direction", &self.direction)
            .field("state", &self.state())
            .field("chunk_size", &self.chunk_size)
            .finish()
    }
}

/// Counts the gate down when dropped, so an unwinding panic still releases
/// the bridge
struct GateSignal(Arc<CompletionGate>);

impl Drop for GateSignal {
    fn drop(&mut self) {
        self.0.count_down();
    }
}

fn write_chunk(sink: &mut ByteSink, data: &[u8]) -> io::Result<()> {
    sink.write_all(data)?;
    sink.flush()
}

/// Errors a PTY master reports once the other side has gone away
fn is_hangup(e: &io::Error) -> bool {
    if matches!(
        e.kind(),
        io::ErrorKind::BrokenPipe | io::ErrorKind::ConnectionReset | io::ErrorKind::UnexpectedEof
    ) {
        return true;
    }
    #[cfg(unix)]
    if e.raw_os_error() == Some(libc::EIO) {
        return true;
    }
    false
}
