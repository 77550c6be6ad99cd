use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom, Write};

use brotli_stream::{
    Compress, CompressionOptions, Decoder, Encoder, Error, Operation, OutputBuffer, Quality,
    SinkPort, StreamStatus, decode, encode, encode_with,
};

fn fast() -> CompressionOptions {
    CompressionOptions::new().with_quality(Quality::Min)
}

fn sample(len: usize) -> Vec<u8> {
    let words: &[&[u8]] = &[b"alpha ", b"beta ", b"gamma ", b"delta\n", b"\x00\xff"];
    let mut out = Vec::with_capacity(len);
    let mut i = 0usize;
    while out.len() < len {
        out.extend_from_slice(words[i * 31 % words.len()]);
        i += 1;
    }
    out.truncate(len);
    out
}

/// Reader handing out at most `step` bytes per call.
struct Dribble<R> {
    inner: R,
    step: usize,
}

impl<R: Read> Read for Dribble<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = buf.len().min(self.step);
        self.inner.read(&mut buf[..n])
    }
}

/// Writer that refuses everything.
struct Refusing;

impl Write for Refusing {
    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn test_chunked_write_matches_oneshot() {
    let slicesize = 4000;
    let src = sample(slicesize * 3 + 4);

    let mut sink = Vec::new();
    let mut enc = Encoder::with_sink(&mut sink, &fast());
    let mut off = 0;
    while off < src.len() {
        let end = (off + slicesize).min(src.len());
        enc.write(&src[off..end]).unwrap();
        off = end;
    }
    assert_eq!(enc.total_in(), src.len() as u64);
    enc.finish().unwrap();
    assert!(enc.is_finished());
    let total_out = enc.total_out();
    drop(enc);

    assert_eq!(sink.len() as u64, total_out);
    assert_eq!(decode(&sink).unwrap(), src);
    assert_eq!(decode(&encode(&src).unwrap()).unwrap(), src);
}

#[test]
fn test_streaming_decode_in_slices() {
    let slicesize = 3000;
    let src = sample(slicesize * 2 + 3);
    let compressed = encode(&src).unwrap();

    let mut reader = Dribble {
        inner: io::Cursor::new(compressed.clone()),
        step: 17,
    };
    let mut dec = Decoder::from_reader(&mut reader);
    let mut out = Vec::new();
    let mut last_out = 0;
    while let Some(chunk) = dec.read(Some(slicesize)).unwrap() {
        assert!(chunk.len() <= slicesize);
        out.extend_from_slice(&chunk);
        assert!(dec.total_out() >= last_out);
        last_out = dec.total_out();
    }

    assert!(dec.is_finished());
    assert_eq!(dec.total_in(), compressed.len() as u64);
    assert_eq!(dec.total_out(), src.len() as u64);
    assert_eq!(dec.read(None).unwrap(), None);
    assert_eq!(dec.read(Some(1)).unwrap(), None);
    assert_eq!(out, src);
}

#[test]
fn test_stream_source_ends_early() {
    let src = sample(50_000);
    let compressed = encode_with(&src, None, &fast()).unwrap();
    let mut cut = io::Cursor::new(compressed[..compressed.len() - 4].to_vec());

    let mut dec = Decoder::from_reader(&mut cut);
    let mut out = Vec::new();
    let err = loop {
        match dec.read(None) {
            Ok(Some(chunk)) => out.extend_from_slice(&chunk),
            Ok(None) => panic!("truncated stream reported as complete"),
            Err(e) => break e,
        }
    };
    assert!(matches!(err, Error::TruncatedStream));
    assert_eq!(&src[..out.len()], &out[..]);
    assert!(!dec.is_finished());
    assert!(matches!(dec.read(None), Err(Error::TruncatedStream)));
}

#[test]
fn test_streaming_into_caller_buffer() {
    let src = sample(10_000);
    let mut buf = b"stale bytes".to_vec();
    let buf_ptr: *const Vec<u8> = &buf;

    let mut enc = Encoder::with_target(&mut buf, &fast()).unwrap();
    assert_eq!(enc.output(), Some(&[][..]));
    for piece in src.chunks(777) {
        enc.write(piece).unwrap();
    }
    enc.finish().unwrap();
    let total_out = enc.total_out();

    let out = enc.into_output().unwrap().adopted().unwrap();
    assert!(std::ptr::eq(out, buf_ptr));
    assert_eq!(out.len() as u64, total_out);
    assert_eq!(decode(out).unwrap(), src);
}

#[test]
fn test_streaming_into_frozen_buffer() {
    let frozen = b"keep me".to_vec();
    assert!(matches!(
        Encoder::with_target(&frozen, &fast()),
        Err(Error::ImmutableTarget)
    ));
    assert_eq!(frozen, b"keep me");
}

#[test]
fn test_truncated_stream_never_reads_as_eof() {
    let src = sample(64 * 1024);
    let compressed = encode_with(&src, None, &fast()).unwrap();
    let mut half = io::Cursor::new(compressed[..compressed.len() / 2].to_vec());

    let mut dec = Decoder::from_reader(&mut half);
    while !dec.is_finished() {
        match dec.read(Some(1000)) {
            Ok(_) => continue,
            Err(e) => {
                assert!(matches!(e, Error::TruncatedStream));
                break;
            }
        }
    }
    assert!(!dec.is_finished());
    for _ in 0..3 {
        assert!(matches!(dec.read(Some(1000)), Err(Error::TruncatedStream)));
    }

    let err = dec.read_to_end(&mut Vec::new()).unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
}

#[test]
fn test_file_roundtrip() {
    let src = sample(300_000);

    let mut file = tempfile::tempfile().unwrap();
    let written = Encoder::wrap(&mut file, &fast(), |enc| -> Result<u64, Error> {
        for piece in src.chunks(65_536) {
            enc.write(piece)?;
        }
        Ok(enc.total_in())
    })
    .unwrap();
    assert_eq!(written, src.len() as u64);

    file.seek(SeekFrom::Start(0)).unwrap();
    let plain = Decoder::wrap(&mut file, |dec| -> io::Result<Vec<u8>> {
        let mut out = Vec::new();
        dec.read_to_end(&mut out)?;
        Ok(out)
    })
    .unwrap();
    assert_eq!(plain, src);
}

#[test]
fn test_named_file_through_std_io() {
    let src = sample(10_000);
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sample.br");

    {
        let mut file = File::create(&path).unwrap();
        let mut enc = Encoder::with_sink(&mut file, &fast());
        io::copy(&mut &src[..], &mut enc).unwrap();
        enc.finish().unwrap();
    }

    let mut file = File::open(&path).unwrap();
    let mut dec = Decoder::from_reader(&mut file);
    let mut plain = Vec::new();
    io::copy(&mut dec, &mut plain).unwrap();
    assert_eq!(plain, src);
}

#[test]
fn test_wrap_finishes_on_error() {
    let mut sink = Vec::new();
    let err = Encoder::wrap(&mut sink, &fast(), |enc| -> Result<(), Error> {
        enc.write(b"kept")?;
        Err(Error::InvalidState("stop"))
    })
    .unwrap_err();
    assert!(matches!(err, Error::InvalidState("stop")));
    assert_eq!(decode(&sink).unwrap(), b"kept");
}

#[test]
fn test_wrap_finishes_on_panic() {
    let mut sink = Vec::new();
    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        let _: Result<(), Error> = Encoder::wrap(&mut sink, &fast(), |enc| {
            enc.write(b"before the panic").unwrap();
            panic!("callback aborted");
        });
    }));
    assert!(result.is_err());
    assert_eq!(decode(&sink).unwrap(), b"before the panic");
}

#[test]
fn test_sink_failure_surfaces() {
    let mut sink = Refusing;
    let mut enc = Encoder::with_sink(&mut sink, &fast());
    let result = match enc.write(b"buffered inside the primitive") {
        Ok(enc) => enc.finish().map(|_| ()),
        Err(e) => Err(e),
    };
    let err = result.unwrap_err();
    assert!(matches!(err, Error::Io(ref e) if e.kind() == io::ErrorKind::BrokenPipe));
    assert!(enc.is_finished());
}

#[test]
fn test_dropped_encoder_sends_nothing_more() {
    let mut sink = Vec::new();
    {
        let mut enc = Encoder::with_sink(&mut sink, &fast());
        enc.write(b"never finished").unwrap();
    }
    assert!(matches!(decode(&sink), Err(Error::TruncatedStream) | Err(Error::CorruptStream(_))));
}

struct Failing;

impl Compress for Failing {
    fn compress(&mut self, _: &[u8], _: &mut [u8], _: Operation) -> io::Result<StreamStatus> {
        Err(io::Error::other("primitive fault"))
    }
}

#[test]
fn test_encode_failure_is_terminal() {
    let mut enc = Encoder::with_primitive(Failing, SinkPort::Buffer(OutputBuffer::new()));
    assert!(matches!(enc.write(b"x"), Err(Error::EncodeFailure(_))));
    assert!(enc.is_finished());
    assert!(matches!(enc.write(b"x"), Err(Error::InvalidState(_))));
    assert!(matches!(enc.finish(), Err(Error::InvalidState(_))));
    assert_eq!(enc.output(), Some(&[][..]));
}
