//! One-shot helpers over the engines.
//!
//! The `*_into` forms refill a caller's `Vec` and hand back that same `Vec`.
//! The stream forms bind an engine to a reader or writer instead.

use std::io;

use crate::buffer::Target;
use crate::decoder::Decoder;
use crate::encoder::Encoder;
use crate::error::{Error, Result};
use crate::options::CompressionOptions;

/// Limits for a one-shot decode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Stop once this many bytes are produced.
    pub max_output_size: Option<usize>,
    /// Return what was produced instead of failing on an incomplete stream.
    pub partial: bool,
}

impl DecodeOptions {
    pub fn with_max_output_size(self, max_output_size: usize) -> Self {
        Self {
            max_output_size: Some(max_output_size),
            ..self
        }
    }

    pub fn with_partial(self, partial: bool) -> Self {
        Self { partial, ..self }
    }
}

/// Compress `input` with default options.
pub fn encode(input: &[u8]) -> Result<Vec<u8>> {
    encode_with(input, None, &CompressionOptions::default())
}

/// Compress `input`, failing with [`Error::BufferTooSmall`] if the result
/// would exceed `max_output_size`.
pub fn encode_with(
    input: &[u8],
    max_output_size: Option<usize>,
    options: &CompressionOptions,
) -> Result<Vec<u8>> {
    Ok(Encoder::encode_all(input, max_output_size, None, options)?.into_vec())
}

/// Compress `input` into `target`, returning `target` itself.
pub fn encode_into<'t>(
    input: &[u8],
    target: impl Into<Target<'t>>,
    max_output_size: Option<usize>,
    options: &CompressionOptions,
) -> Result<&'t mut Vec<u8>> {
    Encoder::encode_all(input, max_output_size, Some(target.into()), options)?
        .adopted()
        .ok_or(Error::InvalidState("caller buffer was not adopted"))
}

/// Decompress a complete stream.
pub fn decode(input: &[u8]) -> Result<Vec<u8>> {
    decode_with(input, &DecodeOptions::default())
}

pub fn decode_with(input: &[u8], options: &DecodeOptions) -> Result<Vec<u8>> {
    Ok(Decoder::decode_all(input, options.max_output_size, None, options.partial)?.into_vec())
}

/// Decompress into `target`, returning `target` itself.
pub fn decode_into<'t>(
    input: &[u8],
    target: impl Into<Target<'t>>,
    options: &DecodeOptions,
) -> Result<&'t mut Vec<u8>> {
    Decoder::decode_all(
        input,
        options.max_output_size,
        Some(target.into()),
        options.partial,
    )?
    .adopted()
    .ok_or(Error::InvalidState("caller buffer was not adopted"))
}

/// A live encoder writing to `writer`.
pub fn encoder<'a, W: io::Write>(writer: &'a mut W, options: &CompressionOptions) -> Encoder<'a> {
    Encoder::with_sink(writer, options)
}

/// A live decoder reading from `reader`.
pub fn decoder<'a, R: io::Read>(reader: &'a mut R) -> Decoder<'a> {
    Decoder::from_reader(reader)
}

/// Run `f` with an encoder on `writer`; the stream is finished afterwards.
pub fn encode_stream<'a, W, F, T, E>(writer: &'a mut W, options: &CompressionOptions, f: F) -> std::result::Result<T, E>
where
    W: io::Write,
    F: FnOnce(&mut Encoder<'a>) -> std::result::Result<T, E>,
    E: From<Error>,
{
    Encoder::wrap(writer, options, f)
}

/// Run `f` with a decoder on `reader`; the decoder is finished afterwards.
pub fn decode_stream<'a, R, F, T, E>(reader: &'a mut R, f: F) -> std::result::Result<T, E>
where
    R: io::Read,
    F: FnOnce(&mut Decoder<'a>) -> std::result::Result<T, E>,
    E: From<Error>,
{
    Decoder::wrap(reader, f)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::EMPTY_STREAM;
    use crate::options::Quality;

    #[test]
    fn test_encode_decode() {
        assert_eq!(encode(b"").unwrap(), EMPTY_STREAM);
        assert_eq!(decode(&encode(b"").unwrap()).unwrap(), b"");
        assert_eq!(decode(&encode(b"a").unwrap()).unwrap(), b"a");
    }

    #[test]
    fn test_into_preserves_identity() {
        let options = CompressionOptions::new().with_quality(Quality::Min);
        let mut buf = b"leftovers".to_vec();
        let addr: *const Vec<u8> = &buf;

        let out = encode_into(b"hello hello", &mut buf, None, &options).unwrap();
        assert!(std::ptr::eq(out as *const Vec<u8>, addr));
        let compressed = out.clone();
        assert_eq!(decode(&compressed).unwrap(), b"hello hello");

        let mut plain = Vec::new();
        let addr: *const Vec<u8> = &plain;
        let out = decode_into(&compressed, &mut plain, &DecodeOptions::default()).unwrap();
        assert!(std::ptr::eq(out as *const Vec<u8>, addr));
        assert_eq!(plain, b"hello hello");
    }

    #[test]
    fn test_partial_policy() {
        let a20 = encode(&b"a".repeat(20)).unwrap();
        let strict = DecodeOptions::default().with_max_output_size(10);
        assert!(matches!(decode_with(&a20, &strict), Err(Error::TruncatedStream)));

        let partial = strict.with_partial(true);
        assert_eq!(decode_with(&a20, &partial).unwrap(), b"a".repeat(10));
    }

    #[test]
    fn test_stream_forms() {
        let mut compressed = Vec::new();
        encode_stream(&mut compressed, &CompressionOptions::default(), |enc| -> Result<()> {
            enc.write(b"stream ")?.write(b"forms")?;
            Ok(())
        })
        .unwrap();

        let mut reader = io::Cursor::new(compressed);
        let plain = decode_stream(&mut reader, |dec| -> Result<Vec<u8>> {
            let mut out = Vec::new();
            while let Some(chunk) = dec.read(Some(4))? {
                out.extend_from_slice(&chunk);
            }
            Ok(out)
        })
        .unwrap();
        assert_eq!(plain, b"stream forms");
    }
}
