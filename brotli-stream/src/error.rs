use std::io;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid option `{key}` = {value:?} (expected {expected}).")]
    InvalidOption {
        key: String,
        value: String,
        expected: &'static str,
    },

    #[error("Output buffer is not writable.")]
    ImmutableTarget,

    #[error("Input is neither an in-memory buffer nor a readable stream.")]
    UnsupportedSource(#[source] io::Error),

    #[error("Output is neither an in-memory buffer nor a writable stream.")]
    UnsupportedSink(#[source] io::Error),

    #[error("Invalid state: {0}.")]
    InvalidState(&'static str),

    #[error("Output buffer too small. Limit: {limit} bytes, needed at least {required}.")]
    BufferTooSmall { limit: usize, required: usize },

    #[error("Corrupt compressed stream.")]
    CorruptStream(#[source] io::Error),

    #[error("Compressed stream ended before it was complete.")]
    TruncatedStream,

    #[error("Encoding failed.")]
    EncodeFailure(#[source] io::Error),

    #[error("I/O on the stream counterpart failed.")]
    Io(#[source] io::Error),
}

impl Error {
    pub(crate) fn invalid_option(
        key: impl Into<String>,
        value: impl Into<String>,
        expected: &'static str,
    ) -> Self {
        Error::InvalidOption {
            key: key.into(),
            value: value.into(),
            expected,
        }
    }
}

impl From<Error> for io::Error {
    fn from(e: Error) -> Self {
        match e {
            Error::Io(inner) => inner,
            Error::TruncatedStream => io::Error::new(io::ErrorKind::UnexpectedEof, e),
            Error::CorruptStream(_) => io::Error::new(io::ErrorKind::InvalidData, e),
            Error::InvalidOption { .. } | Error::ImmutableTarget => {
                io::Error::new(io::ErrorKind::InvalidInput, e)
            }
            Error::UnsupportedSource(_) | Error::UnsupportedSink(_) => {
                io::Error::new(io::ErrorKind::Unsupported, e)
            }
            Error::BufferTooSmall { .. } => io::Error::new(io::ErrorKind::WriteZero, e),
            Error::InvalidState(_) | Error::EncodeFailure(_) => io::Error::other(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_conversion_keeps_kind() {
        let e: io::Error = Error::TruncatedStream.into();
        assert_eq!(e.kind(), io::ErrorKind::UnexpectedEof);

        let e: io::Error = Error::CorruptStream(io::Error::other("bad")).into();
        assert_eq!(e.kind(), io::ErrorKind::InvalidData);

        let inner = io::Error::new(io::ErrorKind::BrokenPipe, "pipe");
        let e: io::Error = Error::Io(inner).into();
        assert_eq!(e.kind(), io::ErrorKind::BrokenPipe);
    }

    #[test]
    fn messages_name_the_option() {
        let e = Error::invalid_option("quality", "wrong", "an integer");
        let msg = e.to_string();
        assert!(msg.contains("quality"));
        assert!(msg.contains("wrong"));
    }
}
