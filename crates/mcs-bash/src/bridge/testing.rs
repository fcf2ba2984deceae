//! In-memory endpoints for relay and bridge tests

use std::collections::VecDeque;
use std::io::{self, Read, Write};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Shared call counter
#[derive(Debug, Clone, Default)]
pub struct Counter(Arc<AtomicUsize>);

impl Counter {
    pub fn get(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }

    fn bump(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

/// Sink whose contents stay readable after it is handed to a relay
#[derive(Debug, Clone, Default)]
pub struct SharedSink(Arc<Mutex<Vec<u8>>>);

impl SharedSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> Vec<u8> {
        self.0.lock().unwrap().clone()
    }
}

impl Write for SharedSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Source yielding one scripted chunk per read, then end-of-stream
#[derive(Debug)]
pub struct ScriptedSource {
    chunks: VecDeque<Vec<u8>>,
    reads: Counter,
    time_out_when_empty: bool,
}

impl ScriptedSource {
    pub fn new(chunks: Vec<Vec<u8>>) -> Self {
        Self {
            chunks: chunks.into(),
            reads: Counter::default(),
            time_out_when_empty: false,
        }
    }

    /// Report `TimedOut` instead of end-of-stream once the script is spent
    pub fn then_time_out(mut self) -> Self {
        self.time_out_when_empty = true;
        self
    }

    pub fn read_count(&self) -> Counter {
        self.reads.clone()
    }
}

impl Read for ScriptedSource {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.reads.bump();
        let Some(mut chunk) = self.chunks.pop_front() else {
            if self.time_out_when_empty {
                std::thread::sleep(Duration::from_millis(1));
                return Err(io::ErrorKind::TimedOut.into());
            }
            return Ok(0);
        };
        let n = chunk.len().min(buf.len());
        buf[..n].copy_from_slice(&chunk[..n]);
        if n < chunk.len() {
            self.chunks.push_front(chunk.split_off(n));
        }
        Ok(n)
    }
}

/// Source that fails every read
#[derive(Debug)]
pub struct FailingSource {
    kind: io::ErrorKind,
    reads: Counter,
}

impl FailingSource {
    pub fn new(kind: io::ErrorKind) -> Self {
        Self {
            kind,
            reads: Counter::default(),
        }
    }

    pub fn read_count(&self) -> Counter {
        self.reads.clone()
    }
}

impl Read for FailingSource {
    fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
        self.reads.bump();
        Err(io::Error::new(self.kind, "simulated read failure"))
    }
}

/// Sink that fails every write with `BrokenPipe`
#[derive(Debug, Default)]
pub struct FailingSink {
    writes: Counter,
}

impl FailingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn write_count(&self) -> Counter {
        self.writes.clone()
    }
}

impl Write for FailingSink {
    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        self.writes.bump();
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "simulated write failure"))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Source that blocks until data arrives on a channel; dropping the
/// sender ends the stream
#[derive(Debug)]
pub struct ChannelSource {
    rx: mpsc::Receiver<Vec<u8>>,
    pending: Vec<u8>,
}

impl ChannelSource {
    pub fn new() -> (mpsc::Sender<Vec<u8>>, Self) {
        let (tx, rx) = mpsc::channel();
        (
            tx,
            Self {
                rx,
                pending: Vec::new(),
            },
        )
    }
}

impl Read for ChannelSource {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.pending.is_empty() {
            match self.rx.recv() {
                Ok(data) => self.pending = data,
                Err(_) => return Ok(0),
            }
        }
        let n = self.pending.len().min(buf.len());
        buf[..n].copy_from_slice(&self.pending[..n]);
        self.pending.drain(..n);
        Ok(n)
    }
}
