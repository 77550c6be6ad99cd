use std::io::{Read, Write};

use brotli_stream::constants::OUTPUT_CHUNK_SIZE;
use brotli_stream::{DecodeOptions, Decoder};

use crate::cli::DecompressArgs;
use crate::endpoint::{Input, Output};
use crate::error::{Error, Result};
use crate::util;

pub fn run(args: DecompressArgs) -> Result<()> {
    let input = Input::from_arg(args.input.as_deref());
    let output = Output::from_arg(args.output.as_deref());

    let mut reader = input.open()?;
    let mut writer = output.create(args.force)?;

    let (total_in, total_out) = match args.max_size {
        Some(max) => bounded(&input, &output, &mut reader, &mut writer, max, args.partial)?,
        None => streaming(&input, &output, &mut reader, &mut writer, args.partial)?,
    };

    writer.flush().map_err(|source| Error::WriteOutput {
        path: output.path(),
        source,
    })?;

    if !args.quiet {
        eprintln!("{}", util::summary("decompressed", total_in, total_out));
    }
    Ok(())
}

/// Whole-buffer decode capped at `max` bytes of output.
fn bounded(
    input: &Input,
    output: &Output,
    reader: &mut dyn Read,
    writer: &mut dyn Write,
    max: usize,
    partial: bool,
) -> Result<(u64, u64)> {
    let mut compressed = Vec::new();
    reader
        .read_to_end(&mut compressed)
        .map_err(|source| Error::ReadInput {
            path: input.path(),
            source,
        })?;

    let options = DecodeOptions::default()
        .with_max_output_size(max)
        .with_partial(partial);
    let plain = brotli_stream::decode_with(&compressed, &options).map_err(|source| {
        Error::Decompress {
            path: input.path(),
            source,
        }
    })?;

    writer.write_all(&plain).map_err(|source| Error::WriteOutput {
        path: output.path(),
        source,
    })?;
    Ok((compressed.len() as u64, plain.len() as u64))
}

fn streaming(
    input: &Input,
    output: &Output,
    reader: &mut dyn Read,
    writer: &mut dyn Write,
    partial: bool,
) -> Result<(u64, u64)> {
    let mut reader = reader;
    Decoder::wrap(&mut reader, |decoder| {
        let mut buf = vec![0u8; OUTPUT_CHUNK_SIZE];
        loop {
            let n = match decoder.read_into(&mut buf) {
                Ok(0) if decoder.is_finished() => break,
                Ok(n) => n,
                Err(brotli_stream::Error::TruncatedStream) if partial => {
                    tracing::warn!(
                        produced = decoder.total_out(),
                        "compressed stream ended early, keeping partial output"
                    );
                    break;
                }
                Err(source) => {
                    return Err(Error::Decompress {
                        path: input.path(),
                        source,
                    });
                }
            };

            writer.write_all(&buf[..n]).map_err(|source| Error::WriteOutput {
                path: output.path(),
                source,
            })?;
        }
        Ok((decoder.total_in(), decoder.total_out()))
    })
}
