//! Incremental decompression.
//!
//! A [`Decoder`] pulls compressed bytes from its source only when the
//! primitive asks for more, so output can be read in pieces of any size.
//! It reports [`is_finished`](Decoder::is_finished) once the compressed stream
//! is complete and all of its output has been handed out.

use std::io;

use crate::buffer::{Bound, Output, OutputBuffer, Target};
use crate::compression::brotli::BrotliDecompressor;
use crate::compression::{Decompress, PrimitiveHandle, StreamStatus};
use crate::constants::OUTPUT_CHUNK_SIZE;
use crate::error::{Error, Result};
use crate::io::SourcePort;
use crate::scope::{Finishable, scoped};

/// Why [`Decoder::pump`] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stop {
    /// The output slice is full.
    Full,
    /// The primitive wants input and some output was produced.
    Boundary,
    /// The compressed stream is complete.
    Finished,
    /// The source ran dry before the stream was complete.
    SourceEnded,
}

/// A streaming decompressor bound to a source.
pub struct Decoder<'a, D: Decompress = BrotliDecompressor> {
    primitive: PrimitiveHandle<D>,
    source: SourcePort<'a>,
    needs_input: bool,
    total_in: u64,
    total_out: u64,
    /// The compressed stream is complete.
    finished: bool,
    /// `finish` was called.
    closed: bool,
    /// The source ended mid-stream. Sticky.
    truncated: bool,
}

impl<'a> Decoder<'a> {
    /// A decoder over a complete in-memory stream.
    pub fn new(input: &'a [u8]) -> Self {
        Decoder::with_primitive(BrotliDecompressor::new(), SourcePort::buffer(input))
    }

    /// A decoder pulling compressed bytes from `reader`.
    pub fn from_reader<R: io::Read>(reader: &'a mut R) -> Self {
        Decoder::with_primitive(BrotliDecompressor::new(), SourcePort::stream(reader))
    }

    /// Decompress from `reader` within `f`, finishing the decoder afterwards.
    pub fn wrap<R, F, T, E>(reader: &'a mut R, f: F) -> std::result::Result<T, E>
    where
        R: io::Read,
        F: FnOnce(&mut Decoder<'a>) -> std::result::Result<T, E>,
        E: From<Error>,
    {
        scoped(Decoder::from_reader(reader), f)
    }

    /// Decompress a complete in-memory stream in one go.
    ///
    /// With `max_output_size`, decoding stops after that many bytes. If the
    /// stream holds more than that, or ends early, the result depends on
    /// `partial`: the bytes produced so far are returned, or the call fails
    /// with [`Error::TruncatedStream`].
    pub fn decode_all<'t>(
        input: &[u8],
        max_output_size: Option<usize>,
        target: Option<Target<'t>>,
        partial: bool,
    ) -> Result<Output<'t>> {
        let bound = max_output_size.map_or(Bound::Unbounded, Bound::Truncate);
        let hint = max_output_size.map(|n| n.min(OUTPUT_CHUNK_SIZE));
        let mut buffer = OutputBuffer::acquire(hint, target)?.with_bound(bound);

        if input.is_empty() {
            return Err(Error::CorruptStream(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "empty compressed input",
            )));
        }

        let mut decoder = Decoder::new(input);
        let complete = loop {
            let want = buffer
                .remaining()
                .map_or(OUTPUT_CHUNK_SIZE, |n| n.min(OUTPUT_CHUNK_SIZE));
            if want == 0 {
                break partial || decoder.probe_end()?;
            }

            let start = buffer.len();
            let result = decoder.pump(buffer.extend_zeroed(want), false);
            match result {
                Ok((got, stop)) => {
                    buffer.truncate_to(start + got);
                    match stop {
                        Stop::Full | Stop::Boundary => continue,
                        Stop::Finished => break true,
                        Stop::SourceEnded => break false,
                    }
                }
                Err(Error::TruncatedStream) => {
                    buffer.truncate_to(start);
                    break false;
                }
                Err(e) => {
                    buffer.truncate_to(start);
                    return Err(e);
                }
            }
        };

        if !complete && !partial {
            return Err(Error::TruncatedStream);
        }

        tracing::debug!(
            input = decoder.total_in,
            output = buffer.len(),
            complete,
            "one-shot decode complete"
        );

        decoder.finish()?;
        Ok(buffer.into_output())
    }
}

impl<'a, D: Decompress> Decoder<'a, D> {
    /// A decoder driving a custom primitive.
    pub fn with_primitive(primitive: D, source: SourcePort<'a>) -> Self {
        tracing::debug!(
            streaming = matches!(source, SourcePort::Stream(_)),
            "creating decoder"
        );
        Self {
            primitive: PrimitiveHandle::new(primitive),
            source,
            needs_input: true,
            total_in: 0,
            total_out: 0,
            finished: false,
            closed: false,
            truncated: false,
        }
    }

    /// Decompress up to `max_len` bytes, or with `None`, whatever the next
    /// block of input yields.
    ///
    /// Returns `None` once the stream is complete. `Some` with fewer bytes
    /// than asked for means the stream or the source ended within this call.
    /// After the source ended mid-stream, every call fails with
    /// [`Error::TruncatedStream`].
    pub fn read(&mut self, max_len: Option<usize>) -> Result<Option<Vec<u8>>> {
        if self.finished {
            return Ok(None);
        }
        self.check_readable()?;

        let limit = max_len.unwrap_or(usize::MAX);
        let mut out = Vec::new();
        while out.len() < limit {
            let start = out.len();
            let want = (limit - start).min(OUTPUT_CHUNK_SIZE);
            out.resize(start + want, 0);

            match self.pump(&mut out[start..], max_len.is_none()) {
                Ok((got, stop)) => {
                    out.truncate(start + got);
                    if stop != Stop::Full {
                        break;
                    }
                }
                // Hand out what earlier steps produced; the next call fails.
                Err(Error::TruncatedStream) if start > 0 => {
                    out.truncate(start);
                    break;
                }
                Err(e) => return Err(e),
            }
        }

        if out.is_empty() && self.finished {
            return Ok(None);
        }
        Ok(Some(out))
    }

    /// Decompress into `buf`, returning after the next block of input at the
    /// latest. `Ok(0)` for a non-empty `buf` means end of stream.
    pub fn read_into(&mut self, buf: &mut [u8]) -> Result<usize> {
        if self.finished {
            return Ok(0);
        }
        self.check_readable()?;
        let (got, _) = self.pump(buf, true)?;
        Ok(got)
    }

    /// Stop decoding and release the primitive. Returns the number of
    /// decompressed bytes produced in total.
    pub fn finish(&mut self) -> Result<u64> {
        if self.closed {
            return Err(Error::InvalidState("decoder already finished"));
        }
        if !self.finished {
            tracing::debug!(
                total_out = self.total_out,
                truncated = self.truncated,
                "decoder finished before the end of the stream"
            );
        }
        self.primitive.release();
        self.closed = true;
        Ok(self.total_out)
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Compressed bytes consumed by the primitive so far.
    pub fn total_in(&self) -> u64 {
        self.total_in
    }

    /// Decompressed bytes produced so far.
    pub fn total_out(&self) -> u64 {
        self.total_out
    }

    fn check_readable(&self) -> Result<()> {
        if self.truncated {
            return Err(Error::TruncatedStream);
        }
        if self.closed {
            return Err(Error::InvalidState("decoder finished before the end of the stream"));
        }
        Ok(())
    }

    /// After output stopped at a size limit: is the stream complete?
    fn probe_end(&mut self) -> Result<bool> {
        if self.finished {
            return Ok(true);
        }
        let mut probe = [0u8; 1];
        match self.pump(&mut probe, false) {
            Ok((0, Stop::Finished)) => Ok(true),
            Ok(_) | Err(Error::TruncatedStream) => Ok(false),
            Err(e) => Err(e),
        }
    }

    fn pump(&mut self, out: &mut [u8], stop_at_boundary: bool) -> Result<(usize, Stop)> {
        if self.truncated {
            return Err(Error::TruncatedStream);
        }

        let mut produced = 0;
        loop {
            if self.finished {
                return Ok((produced, Stop::Finished));
            }
            if produced == out.len() {
                return Ok((produced, Stop::Full));
            }

            if self.needs_input && self.source.buffered().is_empty() && !self.source.fill()? {
                tracing::debug!(total_in = self.total_in, "source ended mid-stream");
                self.truncated = true;
                self.primitive.release();
                if produced == 0 {
                    return Err(Error::TruncatedStream);
                }
                return Ok((produced, Stop::SourceEnded));
            }

            let primitive = self.primitive.get_mut()?;
            let status = match primitive.decompress(self.source.buffered(), &mut out[produced..]) {
                Ok(status) => status,
                Err(e) => {
                    self.primitive.release();
                    return Err(match e.kind() {
                        io::ErrorKind::InvalidData => Error::CorruptStream(e),
                        _ => Error::Io(e),
                    });
                }
            };

            let consumed = status.bytes_consumed();
            let step = status.bytes_produced();
            self.source.consume(consumed);
            self.total_in += consumed as u64;
            self.total_out += step as u64;
            produced += step;

            tracing::trace!(consumed, produced = step, "decoder step");

            match status {
                StreamStatus::Done { .. } => {
                    tracing::debug!(
                        total_in = self.total_in,
                        total_out = self.total_out,
                        "compressed stream complete"
                    );
                    self.finished = true;
                    self.primitive.release();
                }
                StreamStatus::OutputFull { .. } => self.needs_input = false,
                StreamStatus::Progress { .. } => {
                    self.needs_input = true;
                    if stop_at_boundary && produced > 0 {
                        return Ok((produced, Stop::Boundary));
                    }
                }
            }
        }
    }
}

impl<D: Decompress> io::Read for Decoder<'_, D> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        Ok(self.read_into(buf)?)
    }
}

impl<D: Decompress> Finishable for Decoder<'_, D> {
    fn needs_finish(&self) -> bool {
        !self.closed
    }

    fn finish_scope(&mut self) -> Result<()> {
        self.finish().map(|_| ())
    }
}
