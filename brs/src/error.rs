use std::path::PathBuf;

use miette::Diagnostic;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error, Diagnostic)]
pub enum Error {
    #[error("Cannot open input `{}`", .path.display())]
    OpenInput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot read input `{}`", .path.display())]
    ReadInput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot create output `{}`", .path.display())]
    CreateOutput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot write output `{}`", .path.display())]
    WriteOutput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Output already exists: `{}`", path.display())]
    #[diagnostic(help("Use -f/--force to overwrite"))]
    OutputExists { path: PathBuf },

    #[error("Cannot read from `{}`", .path.display())]
    #[diagnostic(help("Pass a regular file, a pipe, or `-` for stdin"))]
    UnsupportedInput {
        path: PathBuf,
        #[source]
        source: brotli_stream::Error,
    },

    #[error("Cannot write to `{}`", .path.display())]
    #[diagnostic(help("Pass a file path, or `-` for stdout"))]
    UnsupportedOutput {
        path: PathBuf,
        #[source]
        source: brotli_stream::Error,
    },

    #[error("Invalid compression option")]
    #[diagnostic(help("Known options: quality, lgwin, mode, size_hint"))]
    Options {
        #[source]
        source: brotli_stream::Error,
    },

    #[error("Cannot compress `{}`", .path.display())]
    Compress {
        path: PathBuf,
        #[source]
        source: brotli_stream::Error,
    },

    #[error("Cannot decompress `{}`", .path.display())]
    #[diagnostic(help("Use --partial to keep the output decoded before the failure"))]
    Decompress {
        path: PathBuf,
        #[source]
        source: brotli_stream::Error,
    },

    #[error("Stream could not be finished")]
    Finish(#[from] brotli_stream::Error),
}
