//! Byte-stream endpoints

use std::fmt;
use std::io::{Read, Write};

/// Readable source half of an endpoint
pub type ByteSource = Box<dyn Read + Send>;
/// Writable sink half of an endpoint
pub type ByteSink = Box<dyn Write + Send>;

/// An interactive I/O handle: a byte source and a byte sink.
///
/// Endpoints are lent to a bridge for the duration of a relay. Whoever
/// constructed an endpoint is responsible for closing what sits behind it.
pub struct Endpoint {
    name: String,
    source: ByteSource,
    sink: ByteSink,
}

impl Endpoint {
    /// Create an endpoint from its two halves
    pub fn new(name: impl Into<String>, source: ByteSource, sink: ByteSink) -> Self {
        Self {
            name: name.into(),
            source,
            sink,
        }
    }

    /// Label used in log output
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Mutable access to the sink
    pub fn sink_mut(&mut self) -> &mut (dyn Write + Send) {
        self.sink.as_mut()
    }

    /// Split into name, source and sink
    pub fn into_parts(self) -> (String, ByteSource, ByteSink) {
        (self.name, self.source, self.sink)
    }
}

impl fmt::Debug for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Endpoint").field("name", &self.name).finish()
    }
}
