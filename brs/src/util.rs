use brotli_stream::{CompressionOptions, RawOptions};

use crate::cli::CompressArgs;
use crate::error::{Error, Result};

/// Collect `-O key=value` pairs, then the dedicated flags on top of them.
pub fn compression_options(args: &CompressArgs) -> Result<CompressionOptions> {
    let mut raw = RawOptions::new();
    for pair in &args.options {
        raw.parse_pair(pair)
            .map_err(|source| Error::Options { source })?;
    }

    if let Some(quality) = &args.quality {
        raw.set_option("quality", quality.as_str());
    }
    if let Some(window) = &args.window {
        raw.set_option("lgwin", window.as_str());
    }
    if let Some(mode) = &args.mode {
        raw.set_option("mode", mode.as_str());
    }

    raw.normalize().map_err(|source| Error::Options { source })
}

pub fn format_size(bytes: u64) -> String {
    use humansize::{BINARY, FormatSize};
    bytes.format_size(BINARY)
}

/// One-line summary of a transfer, for stderr.
pub fn summary(verb: &str, from: u64, to: u64) -> String {
    let ratio = if from == 0 {
        0.0
    } else {
        to as f64 * 100.0 / from as f64
    };
    format!(
        "{} {} -> {} ({:.1}%)",
        verb,
        format_size(from),
        format_size(to),
        ratio
    )
}
