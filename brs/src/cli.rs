use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "brs",
    about = "Compress and decompress Brotli streams.",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    #[command(visible_alias = "c", about = "Compress a file or stdin")]
    Compress(CompressArgs),

    #[command(visible_aliases = ["d", "x"], about = "Decompress a file or stdin")]
    Decompress(DecompressArgs),
}

#[derive(Debug, clap::Args)]
#[command(after_help = "\
\x1b[1m\x1b[4mCompression Options:\x1b[0m
  \x1b[1m-O quality=N\x1b[0m     0-11, or min, max, fast, best, default
  \x1b[1m-O lgwin=N\x1b[0m       Window size as power of 2 (10-24), or min, max, default
  \x1b[1m-O mode=NAME\x1b[0m     generic, text, font or default
  \x1b[1m-O size_hint=N\x1b[0m   Expected input size in bytes

\x1b[1m\x1b[4mExamples:\x1b[0m
  brs compress notes.txt -o notes.txt.br
  brs compress -q best -m text < page.html > page.html.br
  brs compress -O lgwin=24 -O size_hint=1048576 big.bin -o big.bin.br")]
pub struct CompressArgs {
    /// Input file (`-` or absent for stdin)
    pub input: Option<PathBuf>,

    /// Output file (`-` or absent for stdout)
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Compression quality
    #[arg(short = 'q', long)]
    pub quality: Option<String>,

    /// Window size as power of 2
    #[arg(short = 'w', long = "lgwin")]
    pub window: Option<String>,

    /// Input hint: generic, text or font
    #[arg(short = 'm', long)]
    pub mode: Option<String>,

    /// Compression option as key=value
    #[arg(short = 'O', value_name = "KEY=VALUE")]
    pub options: Vec<String>,

    /// Suppress the summary line
    #[arg(long)]
    pub quiet: bool,

    /// Overwrite an existing output file
    #[arg(short = 'f', long)]
    pub force: bool,
}

#[derive(Debug, clap::Args)]
pub struct DecompressArgs {
    /// Input file (`-` or absent for stdin)
    pub input: Option<PathBuf>,

    /// Output file (`-` or absent for stdout)
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Stop after this many decompressed bytes
    #[arg(long, value_name = "BYTES")]
    pub max_size: Option<usize>,

    /// Keep what was decoded from an incomplete stream instead of failing
    #[arg(long)]
    pub partial: bool,

    /// Suppress the summary line
    #[arg(long)]
    pub quiet: bool,

    /// Overwrite an existing output file
    #[arg(short = 'f', long)]
    pub force: bool,
}
