//! Byte sources and sinks.
//!
//! The engines talk to their counterpart through one of two tagged ports,
//! resolved once at construction: an in-memory buffer, or a stream-like object
//! ([`std::io::Read`] / [`std::io::Write`]).

use std::io::{ErrorKind, Read, Write};

use crate::buffer::{Output, OutputBuffer};
use crate::constants::INPUT_CHUNK_SIZE;
use crate::error::{Error, Result};

/// Pull side of the adapter.
pub trait Source {
    /// Next chunk of at most `max_len` bytes, or `None` at end of stream.
    fn next_chunk(&mut self, max_len: usize) -> Result<Option<&[u8]>>;
}

/// Push side of the adapter.
pub trait Sink {
    fn accept_chunk(&mut self, bytes: &[u8]) -> Result<&mut Self>;
}

fn source_error(e: std::io::Error) -> Error {
    match e.kind() {
        ErrorKind::Unsupported => Error::UnsupportedSource(e),
        _ => Error::Io(e),
    }
}

fn sink_error(e: std::io::Error) -> Error {
    match e.kind() {
        ErrorKind::Unsupported => Error::UnsupportedSink(e),
        _ => Error::Io(e),
    }
}

/// Zero-copy source over an in-memory buffer.
#[derive(Debug, Clone)]
pub struct SliceSource<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> SliceSource<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn buffered(&self) -> &[u8] {
        &self.data[self.pos..]
    }

    fn consume(&mut self, n: usize) {
        self.pos = (self.pos + n).min(self.data.len());
    }
}

impl Source for SliceSource<'_> {
    fn next_chunk(&mut self, max_len: usize) -> Result<Option<&[u8]>> {
        let n = max_len.min(self.data.len() - self.pos);
        if n == 0 {
            return Ok(None);
        }

        let data = self.data;
        let chunk = &data[self.pos..self.pos + n];
        self.pos += n;
        Ok(Some(chunk))
    }
}

/// Source pulling from a reader through a staging buffer.
pub struct StreamSource<'a> {
    reader: &'a mut (dyn Read + 'a),
    staging: Vec<u8>,
    start: usize,
    end: usize,
    eof: bool,
}

impl<'a> StreamSource<'a> {
    pub fn new(reader: &'a mut (dyn Read + 'a)) -> Self {
        Self {
            reader,
            staging: Vec::new(),
            start: 0,
            end: 0,
            eof: false,
        }
    }

    fn buffered(&self) -> &[u8] {
        &self.staging[self.start..self.end]
    }

    fn consume(&mut self, n: usize) {
        self.start = (self.start + n).min(self.end);
    }

    /// Refill an empty staging buffer. Returns false at end of stream.
    fn fill(&mut self, max_len: usize) -> Result<bool> {
        if self.start < self.end {
            return Ok(true);
        }
        self.start = 0;
        self.end = 0;
        if self.eof {
            return Ok(false);
        }

        let want = max_len.clamp(1, INPUT_CHUNK_SIZE);
        if self.staging.len() < want {
            self.staging.resize(want, 0);
        }

        loop {
            match self.reader.read(&mut self.staging[..want]) {
                Ok(0) => {
                    tracing::trace!("stream source reached end of stream");
                    self.eof = true;
                    return Ok(false);
                }
                Ok(n) => {
                    self.end = n;
                    return Ok(true);
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(source_error(e)),
            }
        }
    }
}

impl Source for StreamSource<'_> {
    fn next_chunk(&mut self, max_len: usize) -> Result<Option<&[u8]>> {
        if max_len == 0 || !self.fill(max_len)? {
            return Ok(None);
        }

        let start = self.start;
        let n = max_len.min(self.end - start);
        self.start += n;
        Ok(Some(&self.staging[start..start + n]))
    }
}

/// The input side of a decoder.
pub enum SourcePort<'a> {
    Buffer(SliceSource<'a>),
    Stream(StreamSource<'a>),
}

impl<'a> SourcePort<'a> {
    pub fn buffer(data: &'a [u8]) -> Self {
        SourcePort::Buffer(SliceSource::new(data))
    }

    pub fn stream(reader: &'a mut (dyn Read + 'a)) -> Self {
        SourcePort::Stream(StreamSource::new(reader))
    }

    /// Bytes pulled but not yet consumed.
    pub(crate) fn buffered(&self) -> &[u8] {
        match self {
            SourcePort::Buffer(s) => s.buffered(),
            SourcePort::Stream(s) => s.buffered(),
        }
    }

    /// Make sure something is buffered. Returns false at end of stream.
    pub(crate) fn fill(&mut self) -> Result<bool> {
        match self {
            SourcePort::Buffer(s) => Ok(!s.buffered().is_empty()),
            SourcePort::Stream(s) => s.fill(INPUT_CHUNK_SIZE),
        }
    }

    pub(crate) fn consume(&mut self, n: usize) {
        match self {
            SourcePort::Buffer(s) => s.consume(n),
            SourcePort::Stream(s) => s.consume(n),
        }
    }
}

impl Source for SourcePort<'_> {
    fn next_chunk(&mut self, max_len: usize) -> Result<Option<&[u8]>> {
        match self {
            SourcePort::Buffer(s) => s.next_chunk(max_len),
            SourcePort::Stream(s) => s.next_chunk(max_len),
        }
    }
}

/// Sink pushing into a writer.
pub struct StreamSink<'a> {
    writer: &'a mut (dyn Write + 'a),
}

impl<'a> StreamSink<'a> {
    pub fn new(writer: &'a mut (dyn Write + 'a)) -> Self {
        Self { writer }
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush().map_err(sink_error)
    }
}

impl Sink for StreamSink<'_> {
    fn accept_chunk(&mut self, bytes: &[u8]) -> Result<&mut Self> {
        self.writer.write_all(bytes).map_err(sink_error)?;
        Ok(self)
    }
}

impl Sink for OutputBuffer<'_> {
    fn accept_chunk(&mut self, bytes: &[u8]) -> Result<&mut Self> {
        self.append(bytes)?;
        Ok(self)
    }
}

/// The output side of an encoder.
pub enum SinkPort<'a> {
    Buffer(OutputBuffer<'a>),
    Stream(StreamSink<'a>),
}

impl<'a> SinkPort<'a> {
    pub fn stream(writer: &'a mut (dyn Write + 'a)) -> Self {
        SinkPort::Stream(StreamSink::new(writer))
    }

    pub fn flush(&mut self) -> Result<()> {
        match self {
            SinkPort::Buffer(_) => Ok(()),
            SinkPort::Stream(s) => s.flush(),
        }
    }

    /// The bytes collected so far, for a buffer sink.
    pub fn as_slice(&self) -> Option<&[u8]> {
        match self {
            SinkPort::Buffer(b) => Some(b.as_slice()),
            SinkPort::Stream(_) => None,
        }
    }

    pub fn into_output(self) -> Option<Output<'a>> {
        match self {
            SinkPort::Buffer(b) => Some(b.into_output()),
            SinkPort::Stream(_) => None,
        }
    }
}

impl<'a> From<OutputBuffer<'a>> for SinkPort<'a> {
    fn from(buf: OutputBuffer<'a>) -> Self {
        SinkPort::Buffer(buf)
    }
}

impl Sink for SinkPort<'_> {
    fn accept_chunk(&mut self, bytes: &[u8]) -> Result<&mut Self> {
        match self {
            SinkPort::Buffer(b) => {
                b.accept_chunk(bytes)?;
            }
            SinkPort::Stream(s) => {
                s.accept_chunk(bytes)?;
            }
        }
        Ok(self)
    }
}
