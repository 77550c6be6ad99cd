use std::io::{self, Read, Write};

use brotli_stream::Encoder;
use brotli_stream::constants::INPUT_CHUNK_SIZE;

use crate::cli::CompressArgs;
use crate::endpoint::{Input, Output};
use crate::error::{Error, Result};
use crate::util;

pub fn run(args: CompressArgs) -> Result<()> {
    let options = util::compression_options(&args)?;
    let input = Input::from_arg(args.input.as_deref());
    let output = Output::from_arg(args.output.as_deref());

    let mut reader = input.open()?;
    let mut writer = output.create(args.force)?;

    tracing::debug!(?options, "compressing");

    let (total_in, total_out) = Encoder::wrap(&mut writer, &options, |encoder| {
        let mut buf = vec![0u8; INPUT_CHUNK_SIZE];
        loop {
            let n = match reader.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(source) => {
                    return Err(Error::ReadInput {
                        path: input.path(),
                        source,
                    });
                }
            };

            encoder.write(&buf[..n]).map_err(|source| Error::Compress {
                path: input.path(),
                source,
            })?;
        }

        encoder.finish().map_err(|source| Error::Compress {
            path: input.path(),
            source,
        })?;
        Ok((encoder.total_in(), encoder.total_out()))
    })?;

    writer.flush().map_err(|source| Error::WriteOutput {
        path: output.path(),
        source,
    })?;

    if !args.quiet {
        eprintln!("{}", util::summary("compressed", total_in, total_out));
    }
    Ok(())
}
