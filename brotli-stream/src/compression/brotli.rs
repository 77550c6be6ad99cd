//! Brotli compression state machines using the `brotli` crate.
//!
//! These are pure buffer-to-buffer operations with no I/O traits.

use std::io::{Error, ErrorKind, Result};

use brotli::enc::StandardAlloc;
use brotli::enc::backward_references::{BrotliEncoderMode, BrotliEncoderParams};
use brotli::enc::encode::{BrotliEncoderOperation, BrotliEncoderStateStruct};
use brotli::{BrotliDecompressStream, BrotliResult, BrotliState};

use super::{Compress, Decompress, Operation, StreamStatus};
use crate::constants::*;
use crate::options::ResolvedParams;

fn encoder_mode(mode: i32) -> BrotliEncoderMode {
    match mode {
        MODE_TEXT => BrotliEncoderMode::BROTLI_MODE_TEXT,
        MODE_FONT => BrotliEncoderMode::BROTLI_MODE_FONT,
        _ => BrotliEncoderMode::BROTLI_MODE_GENERIC,
    }
}

/// Upper bound of the compressed size of `input_size` bytes, or `None` if it
/// does not fit in `usize`.
pub fn max_compressed_size(input_size: usize) -> Option<usize> {
    if input_size == 0 {
        return Some(2);
    }

    let num_large_blocks = input_size >> 14;
    let overhead = 2 + 4 * num_large_blocks + 3 + 1;
    input_size.checked_add(overhead)
}

/// Streaming Brotli compressor.
pub struct BrotliCompressor {
    state: Box<BrotliEncoderStateStruct<StandardAlloc>>,
}

impl BrotliCompressor {
    /// Create a compressor. Out-of-range parameters are clamped.
    pub fn new(params: &ResolvedParams) -> Self {
        let mut p = BrotliEncoderParams::default();
        p.quality = params.quality.clamp(MIN_QUALITY, MAX_QUALITY);
        p.lgwin = params.lgwin.clamp(MIN_WINDOW_BITS, MAX_WINDOW_BITS);
        p.mode = encoder_mode(params.mode);
        if let Some(hint) = params.size_hint {
            p.size_hint = hint;
        }

        tracing::trace!(
            quality = p.quality,
            lgwin = p.lgwin,
            mode = params.mode,
            "creating brotli compressor"
        );

        let mut state = BrotliEncoderStateStruct::new(StandardAlloc::default());
        state.params = p;
        Self {
            state: Box::new(state),
        }
    }

    pub fn is_finished(&self) -> bool {
        self.state.is_finished()
    }
}

impl Default for BrotliCompressor {
    fn default() -> Self {
        Self::new(&ResolvedParams::default())
    }
}

impl Compress for BrotliCompressor {
    fn compress(&mut self, input: &[u8], output: &mut [u8], op: Operation) -> Result<StreamStatus> {
        let op = match op {
            Operation::Process => BrotliEncoderOperation::BROTLI_OPERATION_PROCESS,
            Operation::Flush => BrotliEncoderOperation::BROTLI_OPERATION_FLUSH,
            Operation::Finish => BrotliEncoderOperation::BROTLI_OPERATION_FINISH,
        };

        let mut consumed = 0;
        let mut produced = 0;

        let ok = self.state.compress_stream(
            op,
            &mut input.len(),
            input,
            &mut consumed,
            &mut output.len(),
            output,
            &mut produced,
            &mut None,
            &mut |_, _, _, _| (),
        );

        if !ok {
            return Err(Error::new(ErrorKind::Other, "brotli encoder rejected the stream"));
        }

        let bytes_consumed = consumed;
        let bytes_produced = produced;

        if self.state.is_finished() {
            Ok(StreamStatus::Done {
                bytes_consumed,
                bytes_produced,
            })
        } else if self.state.has_more_output() || consumed < input.len() {
            Ok(StreamStatus::OutputFull {
                bytes_consumed,
                bytes_produced,
            })
        } else {
            Ok(StreamStatus::Progress {
                bytes_consumed,
                bytes_produced,
            })
        }
    }
}

/// Streaming Brotli decompressor.
pub struct BrotliDecompressor {
    state: Box<BrotliState<StandardAlloc, StandardAlloc, StandardAlloc>>,
    total_out: usize,
}

impl BrotliDecompressor {
    pub fn new() -> Self {
        Self {
            state: Box::new(BrotliState::new(
                StandardAlloc::default(),
                StandardAlloc::default(),
                StandardAlloc::default(),
            )),
            total_out: 0,
        }
    }
}

impl Default for BrotliDecompressor {
    fn default() -> Self {
        Self::new()
    }
}

impl Decompress for BrotliDecompressor {
    fn decompress(&mut self, input: &[u8], output: &mut [u8]) -> Result<StreamStatus> {
        let mut consumed = 0;
        let mut produced = 0;

        let result = BrotliDecompressStream(
            &mut input.len(),
            &mut consumed,
            input,
            &mut output.len(),
            &mut produced,
            output,
            &mut self.total_out,
            &mut *self.state,
        );

        let bytes_consumed = consumed;
        let bytes_produced = produced;

        match result {
            BrotliResult::ResultSuccess => Ok(StreamStatus::Done {
                bytes_consumed,
                bytes_produced,
            }),
            BrotliResult::NeedsMoreInput => Ok(StreamStatus::Progress {
                bytes_consumed,
                bytes_produced,
            }),
            BrotliResult::NeedsMoreOutput => Ok(StreamStatus::OutputFull {
                bytes_consumed,
                bytes_produced,
            }),
            BrotliResult::ResultFailure => Err(Error::new(
                ErrorKind::InvalidData,
                "malformed brotli stream",
            )),
        }
    }
}
