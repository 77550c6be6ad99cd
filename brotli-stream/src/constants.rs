//! Parameter limits of the Brotli primitive and engine tuning values.

pub const MIN_WINDOW_BITS: i32 = 10;
pub const MAX_WINDOW_BITS: i32 = 24;
pub const MIN_INPUT_BLOCK_BITS: i32 = 16;
pub const MAX_INPUT_BLOCK_BITS: i32 = 24;
pub const MIN_QUALITY: i32 = 0;
pub const MAX_QUALITY: i32 = 11;

pub const MODE_GENERIC: i32 = 0;
pub const MODE_TEXT: i32 = 1;
pub const MODE_FONT: i32 = 2;

pub const DEFAULT_QUALITY: i32 = 11;
pub const DEFAULT_WINDOW: i32 = 22;
pub const DEFAULT_MODE: i32 = MODE_GENERIC;

/// Bytes pulled from a stream source per read: 1MB.
pub const INPUT_CHUNK_SIZE: usize = 1 << 20;

/// Output grown per decode step when no size was requested: 256KB.
pub const OUTPUT_CHUNK_SIZE: usize = 256 << 10;

/// Scratch space for one encoder step: 256KB.
pub const ENCODER_SCRATCH_SIZE: usize = 256 << 10;

/// The complete stream for empty input: a 16-bit window header with
/// ISLAST and ISEMPTY set.
pub const EMPTY_STREAM: [u8; 1] = [0x06];
