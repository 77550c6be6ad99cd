//! Streaming Brotli encoder and decoder engines.
//!
//! Use [`encode`] / [`decode`] for whole buffers, or [`Encoder`] and
//! [`Decoder`] to compress and decompress incrementally against a buffer or
//! any [`std::io::Write`] / [`std::io::Read`].
//!
//! ```
//! let compressed = brotli_stream::encode(b"hello, hello, hello").unwrap();
//! let plain = brotli_stream::decode(&compressed).unwrap();
//! assert_eq!(plain, b"hello, hello, hello");
//! ```

pub mod buffer;
pub mod compression;
pub mod constants;
mod decoder;
mod encoder;
mod error;
pub mod io;
mod oneshot;
pub mod options;
mod scope;

pub use buffer::{Bound, Output, OutputBuffer, Target};
pub use compression::brotli::{BrotliCompressor, BrotliDecompressor};
pub use compression::{Compress, Decompress, Operation, StreamStatus};
pub use decoder::Decoder;
pub use encoder::Encoder;
pub use error::{Error, Result};
pub use io::{Sink, SinkPort, Source, SourcePort};
pub use oneshot::{
    DecodeOptions, decode, decode_into, decode_stream, decode_with, decoder, encode, encode_into,
    encode_stream, encode_with, encoder,
};
pub use options::{CompressionOptions, Mode, Quality, RawOptions, ResolvedParams, Window};
