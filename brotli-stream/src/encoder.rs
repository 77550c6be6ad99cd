//! Incremental compression.
//!
//! An [`Encoder`] feeds written chunks through the primitive and pushes every
//! compressed byte it gets back into its sink: an [`OutputBuffer`] for
//! buffer-to-buffer use, or any [`std::io::Write`] for streaming.

use std::io;

use crate::buffer::{Bound, Output, OutputBuffer, Target};
use crate::compression::brotli::{BrotliCompressor, max_compressed_size};
use crate::compression::{Compress, Operation, PrimitiveHandle, StreamStatus};
use crate::constants::{EMPTY_STREAM, ENCODER_SCRATCH_SIZE};
use crate::error::{Error, Result};
use crate::io::{Sink, SinkPort};
use crate::options::CompressionOptions;
use crate::scope::{Finishable, scoped};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Open,
    Finishing,
    Finished,
}

/// A streaming compressor bound to a sink.
///
/// Call [`finish`](Self::finish) to complete the stream. Dropping an encoder
/// before that leaves the sink holding an incomplete stream.
pub struct Encoder<'a, C: Compress = BrotliCompressor> {
    primitive: PrimitiveHandle<C>,
    sink: SinkPort<'a>,
    scratch: Vec<u8>,
    total_in: u64,
    total_out: u64,
    state: State,
}

impl<C: Compress> Drop for Encoder<'_, C> {
    fn drop(&mut self) {
        if self.state != State::Finished {
            tracing::warn!(
                "Encoder dropped without calling finish(). \
                 Compressed stream is incomplete after {} input bytes.",
                self.total_in
            );
        }
    }
}

impl Encoder<'static> {
    /// An encoder collecting its output in a fresh buffer.
    pub fn new(options: &CompressionOptions) -> Self {
        Encoder::with_primitive(
            BrotliCompressor::new(&options.resolve()),
            SinkPort::Buffer(OutputBuffer::new()),
        )
    }
}

impl<'a> Encoder<'a> {
    /// An encoder refilling the caller's buffer.
    pub fn with_target(target: impl Into<Target<'a>>, options: &CompressionOptions) -> Result<Self> {
        let buffer = OutputBuffer::acquire(None, Some(target.into()))?;
        Ok(Encoder::with_primitive(
            BrotliCompressor::new(&options.resolve()),
            SinkPort::Buffer(buffer),
        ))
    }

    /// An encoder writing to `writer` as output becomes available.
    pub fn with_sink<W: io::Write>(writer: &'a mut W, options: &CompressionOptions) -> Self {
        Encoder::with_primitive(
            BrotliCompressor::new(&options.resolve()),
            SinkPort::stream(writer),
        )
    }

    /// Compress into `writer` within `f`, finishing the stream afterwards.
    ///
    /// The stream is finished on every exit from `f`. If `f` fails, its error
    /// is returned and a failure to finish is only logged.
    pub fn wrap<W, F, R, E>(writer: &'a mut W, options: &CompressionOptions, f: F) -> std::result::Result<R, E>
    where
        W: io::Write,
        F: FnOnce(&mut Encoder<'a>) -> std::result::Result<R, E>,
        E: From<Error>,
    {
        scoped(Encoder::with_sink(writer, options), f)
    }

    /// Compress all of `input` in one go.
    ///
    /// With `max_output_size`, a stream that would not fit fails with
    /// [`Error::BufferTooSmall`]. Output lands in `target` when given.
    pub fn encode_all<'t>(
        input: &[u8],
        max_output_size: Option<usize>,
        target: Option<Target<'t>>,
        options: &CompressionOptions,
    ) -> Result<Output<'t>> {
        let bound = max_output_size.map_or(Bound::Unbounded, Bound::Strict);
        let hint = max_compressed_size(input.len())
            .map(|worst| max_output_size.map_or(worst, |max| max.min(worst)));
        let mut buffer = OutputBuffer::acquire(hint, target)?.with_bound(bound);

        if input.is_empty() {
            buffer.append(&EMPTY_STREAM)?;
            return Ok(buffer.into_output());
        }

        let options = match options.size_hint() {
            Some(_) => *options,
            None => options.with_size_hint(input.len()),
        };

        let mut encoder = Encoder::with_primitive(
            BrotliCompressor::new(&options.resolve()),
            SinkPort::Buffer(buffer),
        );
        encoder.write(input)?;
        encoder.finish()?;

        tracing::debug!(
            input = encoder.total_in,
            output = encoder.total_out,
            "one-shot encode complete"
        );

        encoder
            .into_output()
            .ok_or(Error::InvalidState("one-shot encoder lost its buffer"))
    }
}

impl<'a, C: Compress> Encoder<'a, C> {
    /// An encoder driving a custom primitive.
    pub fn with_primitive(primitive: C, sink: SinkPort<'a>) -> Self {
        tracing::debug!(
            streaming = matches!(sink, SinkPort::Stream(_)),
            "creating encoder"
        );
        Self {
            primitive: PrimitiveHandle::new(primitive),
            sink,
            scratch: Vec::new(),
            total_in: 0,
            total_out: 0,
            state: State::Open,
        }
    }

    fn check_open(&self) -> Result<()> {
        match self.state {
            State::Open => Ok(()),
            State::Finishing | State::Finished => Err(Error::InvalidState("encoder is finished")),
        }
    }

    /// Feed `chunk` to the encoder. Any output it yields goes to the sink.
    pub fn write(&mut self, chunk: &[u8]) -> Result<&mut Self> {
        self.check_open()?;
        self.pump(chunk, Operation::Process)?;
        self.total_in += chunk.len() as u64;
        Ok(self)
    }

    /// Emit everything written so far as a decodable prefix, keeping the
    /// stream open.
    pub fn flush(&mut self) -> Result<&mut Self> {
        self.check_open()?;
        self.pump(&[], Operation::Flush)?;
        self.sink.flush()?;
        Ok(self)
    }

    /// Complete the stream and release the primitive. Returns the number of
    /// compressed bytes produced in total.
    pub fn finish(&mut self) -> Result<u64> {
        self.check_open()?;
        self.state = State::Finishing;
        self.pump(&[], Operation::Finish)?;
        self.primitive.release();
        self.state = State::Finished;
        self.sink.flush()?;

        tracing::debug!(
            total_in = self.total_in,
            total_out = self.total_out,
            "encoder finished"
        );
        Ok(self.total_out)
    }

    pub fn is_finished(&self) -> bool {
        self.state == State::Finished
    }

    /// Uncompressed bytes accepted so far.
    pub fn total_in(&self) -> u64 {
        self.total_in
    }

    /// Compressed bytes handed to the sink so far.
    pub fn total_out(&self) -> u64 {
        self.total_out
    }

    /// Compressed bytes collected so far, for a buffer sink.
    pub fn output(&self) -> Option<&[u8]> {
        self.sink.as_slice()
    }

    /// Take the collected output of a buffer sink.
    pub fn into_output(mut self) -> Option<Output<'a>> {
        let sink = std::mem::replace(&mut self.sink, SinkPort::Buffer(OutputBuffer::new()));
        sink.into_output()
    }

    fn pump(&mut self, input: &[u8], op: Operation) -> Result<()> {
        let result = self.pump_inner(input, op);
        if result.is_err() {
            // The primitive state is unknown after a failed step.
            self.primitive.release();
            self.state = State::Finished;
        }
        result
    }

    fn pump_inner(&mut self, mut input: &[u8], op: Operation) -> Result<()> {
        if self.scratch.is_empty() {
            self.scratch.resize(ENCODER_SCRATCH_SIZE, 0);
        }

        let mut stalled = false;
        loop {
            let primitive = self.primitive.get_mut()?;
            let status = primitive
                .compress(input, &mut self.scratch, op)
                .map_err(Error::EncodeFailure)?;

            let consumed = status.bytes_consumed();
            let produced = status.bytes_produced();
            input = &input[consumed..];

            tracing::trace!(?op, consumed, produced, "encoder step");

            if produced > 0 {
                self.sink.accept_chunk(&self.scratch[..produced])?;
                self.total_out += produced as u64;
            }

            match status {
                StreamStatus::Done { .. } => return Ok(()),
                StreamStatus::Progress { .. } if input.is_empty() && op != Operation::Finish => {
                    return Ok(())
                }
                _ => {}
            }

            if consumed == 0 && produced == 0 {
                if stalled {
                    return Err(Error::EncodeFailure(io::Error::other(
                        "encoder made no progress",
                    )));
                }
                stalled = true;
            } else {
                stalled = false;
            }
        }
    }
}

impl<C: Compress> io::Write for Encoder<'_, C> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        Encoder::write(self, buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Encoder::flush(self)?;
        Ok(())
    }
}

impl<C: Compress> Finishable for Encoder<'_, C> {
    fn needs_finish(&self) -> bool {
        self.state != State::Finished
    }

    fn finish_scope(&mut self) -> Result<()> {
        self.finish().map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compression::Decompress;
    use crate::compression::brotli::BrotliDecompressor;
    use crate::options::Quality;

    fn fast() -> CompressionOptions {
        CompressionOptions::new().with_quality(Quality::Min)
    }

    fn inflate(data: &[u8]) -> Vec<u8> {
        let mut d = BrotliDecompressor::new();
        let mut out = vec![0u8; 1 << 16];
        let status = d.decompress(data, &mut out).unwrap();
        assert!(status.is_done());
        out.truncate(status.bytes_produced());
        out
    }

    struct Broken;

    impl Compress for Broken {
        fn compress(&mut self, _: &[u8], _: &mut [u8], _: Operation) -> io::Result<StreamStatus> {
            Err(io::Error::other("broken primitive"))
        }
    }

    #[test]
    fn test_write_and_finish() {
        let mut enc = Encoder::new(&fast());
        enc.write(b"Hello, ").unwrap().write(b"World!").unwrap();
        assert_eq!(enc.total_in(), 13);
        assert!(!enc.is_finished());

        let produced = enc.finish().unwrap();
        assert!(enc.is_finished());
        assert_eq!(produced, enc.total_out());

        let out = enc.into_output().unwrap();
        assert_eq!(out.len() as u64, produced);
        assert_eq!(inflate(&out), b"Hello, World!");
    }

    #[test]
    fn test_finish_twice_is_invalid() {
        let mut enc = Encoder::new(&fast());
        enc.finish().unwrap();
        assert!(matches!(enc.finish(), Err(Error::InvalidState(_))));
        assert!(matches!(enc.write(b"x"), Err(Error::InvalidState(_))));
        assert!(matches!(enc.flush(), Err(Error::InvalidState(_))));
    }

    #[test]
    fn test_flush_makes_prefix_decodable() {
        let mut sink = Vec::new();
        let mut enc = Encoder::with_sink(&mut sink, &fast());
        enc.write(b"abcabcabc").unwrap();
        enc.flush().unwrap();
        let flushed = enc.total_out();
        assert!(flushed > 0);
        enc.finish().unwrap();
        drop(enc);

        let mut d = BrotliDecompressor::new();
        let mut out = vec![0u8; 64];
        let status = d.decompress(&sink[..flushed as usize], &mut out).unwrap();
        assert_eq!(&out[..status.bytes_produced()], b"abcabcabc");
    }

    #[test]
    fn test_primitive_failure_poisons() {
        let mut enc = Encoder::with_primitive(Broken, SinkPort::Buffer(OutputBuffer::new()));
        assert!(matches!(enc.write(b"data"), Err(Error::EncodeFailure(_))));
        assert!(enc.is_finished());
        assert_eq!(enc.total_in(), 0);
        assert!(matches!(enc.write(b"data"), Err(Error::InvalidState(_))));
        assert!(matches!(enc.finish(), Err(Error::InvalidState(_))));
    }

    #[test]
    fn test_encode_all_empty_input() {
        let out = Encoder::encode_all(b"", None, None, &CompressionOptions::default()).unwrap();
        assert_eq!(&*out, &EMPTY_STREAM[..]);

        let err = Encoder::encode_all(b"", Some(0), None, &CompressionOptions::default()).unwrap_err();
        assert!(matches!(err, Error::BufferTooSmall { limit: 0, .. }));
    }

    #[test]
    fn test_encode_all_too_small() {
        let data = b"some data that will not fit in four bytes".repeat(4);
        let err = Encoder::encode_all(&data, Some(4), None, &fast()).unwrap_err();
        assert!(matches!(err, Error::BufferTooSmall { limit: 4, .. }));
    }

    #[test]
    fn test_io_write() {
        use std::io::Write;

        let mut sink = Vec::new();
        {
            let mut enc = Encoder::with_sink(&mut sink, &fast());
            enc.write_all(b"through std::io").unwrap();
            Write::flush(&mut enc).unwrap();
            enc.finish().unwrap();
        }
        assert_eq!(inflate(&sink), b"through std::io");
    }

    #[test]
    fn test_wrap_finishes() {
        let mut sink = Vec::new();
        let n = Encoder::wrap(&mut sink, &fast(), |enc| -> Result<u64> {
            enc.write(b"wrapped")?;
            Ok(enc.total_in())
        })
        .unwrap();
        assert_eq!(n, 7);
        assert_eq!(inflate(&sink), b"wrapped");
    }

    #[test]
    fn test_wrap_finishes_after_error() {
        let mut sink = Vec::new();
        let err = Encoder::wrap(&mut sink, &fast(), |enc| -> Result<()> {
            enc.write(b"partial")?;
            Err(Error::InvalidState("caller gave up"))
        })
        .unwrap_err();
        assert!(matches!(err, Error::InvalidState("caller gave up")));
        assert_eq!(inflate(&sink), b"partial");
    }
}
