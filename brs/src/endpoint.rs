//! Resolution of the input and output arguments to readers and writers.

use std::fs::File;
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

fn is_stdio(path: Option<&Path>) -> bool {
    path.map_or(true, |p| p.as_os_str() == "-")
}

fn not_a_stream(what: &str) -> io::Error {
    io::Error::new(io::ErrorKind::Unsupported, format!("path is {}", what))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Stdin,
    File(PathBuf),
}

impl Input {
    pub fn from_arg(path: Option<&Path>) -> Self {
        match path {
            p if is_stdio(p) => Input::Stdin,
            Some(p) => Input::File(p.to_path_buf()),
            None => Input::Stdin,
        }
    }

    /// Path used in messages.
    pub fn path(&self) -> PathBuf {
        match self {
            Input::Stdin => PathBuf::from("<stdin>"),
            Input::File(p) => p.clone(),
        }
    }

    pub fn open(&self) -> Result<Box<dyn Read>> {
        let path = match self {
            Input::Stdin => return Ok(Box::new(io::stdin().lock())),
            Input::File(path) => path,
        };

        if path.is_dir() {
            return Err(Error::UnsupportedInput {
                path: path.clone(),
                source: brotli_stream::Error::UnsupportedSource(not_a_stream("a directory")),
            });
        }

        let file = File::open(path).map_err(|source| Error::OpenInput {
            path: path.clone(),
            source,
        })?;

        tracing::debug!(path = %path.display(), "opened input");
        Ok(Box::new(file))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Output {
    Stdout,
    File(PathBuf),
}

impl Output {
    pub fn from_arg(path: Option<&Path>) -> Self {
        match path {
            p if is_stdio(p) => Output::Stdout,
            Some(p) => Output::File(p.to_path_buf()),
            None => Output::Stdout,
        }
    }

    /// Path used in messages.
    pub fn path(&self) -> PathBuf {
        match self {
            Output::Stdout => PathBuf::from("<stdout>"),
            Output::File(p) => p.clone(),
        }
    }

    pub fn create(&self, force: bool) -> Result<Box<dyn Write>> {
        let path = match self {
            Output::Stdout => return Ok(Box::new(BufWriter::new(io::stdout().lock()))),
            Output::File(path) => path,
        };

        if path.is_dir() {
            return Err(Error::UnsupportedOutput {
                path: path.clone(),
                source: brotli_stream::Error::UnsupportedSink(not_a_stream("a directory")),
            });
        }
        if path.exists() && !force {
            return Err(Error::OutputExists { path: path.clone() });
        }

        let file = File::create(path).map_err(|source| Error::CreateOutput {
            path: path.clone(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "created output");
        Ok(Box::new(BufWriter::new(file)))
    }
}
