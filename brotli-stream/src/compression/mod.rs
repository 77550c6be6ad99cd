//! The Brotli primitive behind the engines.
//!
//! This module provides streaming state machines (sans-IO) for Brotli:
//! [`brotli::BrotliCompressor`] and [`brotli::BrotliDecompressor`]. They work
//! with raw byte buffers and report progress through [`StreamStatus`]; the
//! engines in [`crate::encoder`] and [`crate::decoder`] supply the I/O.
//!
//! The [`Compress`] and [`Decompress`] traits are the seam between the engines
//! and the primitive.

use std::io::Result;

use crate::error::Error;

pub mod brotli;

// ============================================================================
// STREAMING STATUS (Sans-IO)
// ============================================================================

/// Status returned by one step of a compression or decompression primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamStatus {
    /// All input was taken; call again with more input.
    Progress {
        bytes_consumed: usize,
        bytes_produced: usize,
    },
    /// The output buffer ran out before the primitive did. Call again with
    /// fresh output space.
    OutputFull {
        bytes_consumed: usize,
        bytes_produced: usize,
    },
    /// Stream finished successfully.
    Done {
        bytes_consumed: usize,
        bytes_produced: usize,
    },
}

impl StreamStatus {
    /// Returns true if the stream is finished.
    pub fn is_done(&self) -> bool {
        matches!(self, StreamStatus::Done { .. })
    }

    /// Returns true if the primitive holds output it could not emit.
    pub fn has_more_output(&self) -> bool {
        matches!(self, StreamStatus::OutputFull { .. })
    }

    /// Returns the number of bytes consumed from the input buffer.
    pub fn bytes_consumed(&self) -> usize {
        match self {
            StreamStatus::Progress { bytes_consumed, .. }
            | StreamStatus::OutputFull { bytes_consumed, .. }
            | StreamStatus::Done { bytes_consumed, .. } => *bytes_consumed,
        }
    }

    /// Returns the number of bytes produced to the output buffer.
    pub fn bytes_produced(&self) -> usize {
        match self {
            StreamStatus::Progress { bytes_produced, .. }
            | StreamStatus::OutputFull { bytes_produced, .. }
            | StreamStatus::Done { bytes_produced, .. } => *bytes_produced,
        }
    }
}

/// What a compression step should do with buffered state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Consume input; emit output only when a block fills up.
    Process,
    /// Emit everything consumed so far as a decodable prefix.
    Flush,
    /// Consume the remaining input and close the stream.
    Finish,
}

/// An incremental compressor.
pub trait Compress {
    fn compress(&mut self, input: &[u8], output: &mut [u8], op: Operation) -> Result<StreamStatus>;
}

/// An incremental decompressor.
///
/// Errors of kind [`std::io::ErrorKind::InvalidData`] mean the compressed
/// stream is malformed.
pub trait Decompress {
    fn decompress(&mut self, input: &[u8], output: &mut [u8]) -> Result<StreamStatus>;
}

impl<C: Compress + ?Sized> Compress for Box<C> {
    fn compress(&mut self, input: &[u8], output: &mut [u8], op: Operation) -> Result<StreamStatus> {
        (**self).compress(input, output, op)
    }
}

impl<D: Decompress + ?Sized> Decompress for Box<D> {
    fn decompress(&mut self, input: &[u8], output: &mut [u8]) -> Result<StreamStatus> {
        (**self).decompress(input, output)
    }
}

/// Exclusive ownership of a primitive, released at most once.
///
/// Using the primitive after [`release`](Self::release) is an
/// [`Error::InvalidState`].
#[derive(Debug)]
pub(crate) struct PrimitiveHandle<T> {
    inner: Option<T>,
}

impl<T> PrimitiveHandle<T> {
    pub fn new(primitive: T) -> Self {
        Self {
            inner: Some(primitive),
        }
    }

    pub fn get_mut(&mut self) -> crate::Result<&mut T> {
        self.inner
            .as_mut()
            .ok_or(Error::InvalidState("primitive already released"))
    }

    /// Drop the primitive. Returns false if it was already gone.
    pub fn release(&mut self) -> bool {
        self.inner.take().is_some()
    }
}
