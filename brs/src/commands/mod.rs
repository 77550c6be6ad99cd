mod compress;
mod decompress;

pub use compress::run as compress;
pub use decompress::run as decompress;
