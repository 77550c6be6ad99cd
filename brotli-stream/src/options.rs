//! Encoder configuration.
//!
//! Options come in two shapes: the typed [`CompressionOptions`], and the
//! keyword bag [`RawOptions`] (string keys, optional string values) used by
//! command lines and other loosely typed callers. Both resolve to the numeric
//! [`ResolvedParams`] handed to the primitive.
//!
//! Integer values are passed through untouched; the primitive clamps them.
//! Symbolic names are matched case-insensitively and anything else is
//! rejected with [`Error::InvalidOption`].

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::constants::*;
use crate::error::{Error, Result};

const QUALITY_EXPECTED: &str = "\"min\", \"max\", \"fast\", \"best\", \"default\" or an integer";
const WINDOW_EXPECTED: &str = "\"min\", \"max\", \"default\" or an integer";
const MODE_EXPECTED: &str = "\"generic\", \"text\", \"font\", \"default\" or an integer";
const SIZE_HINT_EXPECTED: &str = "a non-negative integer";

/// Compression quality. `fast` is an alias of `min`, `best` of `max`.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Quality {
    Min,
    Max,
    #[default]
    Default,
    Level(i32),
}

impl Quality {
    pub const fn level(self) -> i32 {
        match self {
            Quality::Min => MIN_QUALITY,
            Quality::Max => MAX_QUALITY,
            Quality::Default => DEFAULT_QUALITY,
            Quality::Level(n) => n,
        }
    }
}

impl From<i32> for Quality {
    fn from(n: i32) -> Self {
        Quality::Level(n)
    }
}

impl FromStr for Quality {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        if let Ok(n) = s.trim().parse::<i32>() {
            return Ok(Quality::Level(n));
        }

        let q = match_alias(
            s,
            &[
                ("min", Quality::Min),
                ("fast", Quality::Min),
                ("max", Quality::Max),
                ("best", Quality::Max),
                ("default", Quality::Default),
            ],
        );

        q.ok_or_else(|| Error::invalid_option("quality", s, QUALITY_EXPECTED))
    }
}

/// Sliding window size, as log2 of the window in bytes.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Window {
    Min,
    Max,
    #[default]
    Default,
    Bits(i32),
}

impl Window {
    pub const fn bits(self) -> i32 {
        match self {
            Window::Min => MIN_WINDOW_BITS,
            Window::Max => MAX_WINDOW_BITS,
            Window::Default => DEFAULT_WINDOW,
            Window::Bits(n) => n,
        }
    }
}

impl From<i32> for Window {
    fn from(n: i32) -> Self {
        Window::Bits(n)
    }
}

impl FromStr for Window {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        if let Ok(n) = s.trim().parse::<i32>() {
            return Ok(Window::Bits(n));
        }

        let w = match_alias(
            s,
            &[
                ("min", Window::Min),
                ("max", Window::Max),
                ("default", Window::Default),
            ],
        );

        w.ok_or_else(|| Error::invalid_option("lgwin", s, WINDOW_EXPECTED))
    }
}

/// Input hint for the encoder. `default` is an alias of `generic`.
///
/// Integers outside the known modes are kept as [`Mode::Raw`]; the primitive
/// treats them as generic input.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Mode {
    #[default]
    Generic,
    Text,
    Font,
    Raw(i32),
}

impl Mode {
    pub const fn id(self) -> i32 {
        match self {
            Mode::Generic => MODE_GENERIC,
            Mode::Text => MODE_TEXT,
            Mode::Font => MODE_FONT,
            Mode::Raw(n) => n,
        }
    }
}

impl From<i32> for Mode {
    fn from(n: i32) -> Self {
        match n {
            MODE_GENERIC => Mode::Generic,
            MODE_TEXT => Mode::Text,
            MODE_FONT => Mode::Font,
            n => Mode::Raw(n),
        }
    }
}

impl FromStr for Mode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        if let Ok(n) = s.trim().parse::<i32>() {
            return Ok(Mode::from(n));
        }

        let m = match_alias(
            s,
            &[
                ("generic", Mode::Generic),
                ("text", Mode::Text),
                ("font", Mode::Font),
                ("default", Mode::Generic),
            ],
        );

        m.ok_or_else(|| Error::invalid_option("mode", s, MODE_EXPECTED))
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Generic => write!(f, "generic"),
            Mode::Text => write!(f, "text"),
            Mode::Font => write!(f, "font"),
            Mode::Raw(n) => write!(f, "{}", n),
        }
    }
}

fn match_alias<T: Copy>(s: &str, aliases: &[(&str, T)]) -> Option<T> {
    aliases
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(s))
        .map(|(_, value)| *value)
}

/// Validated encoder configuration. Immutable once built.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct CompressionOptions {
    quality: Quality,
    window: Window,
    mode: Mode,
    size_hint: Option<usize>,
}

impl CompressionOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quality(self, quality: impl Into<Quality>) -> Self {
        Self {
            quality: quality.into(),
            ..self
        }
    }

    pub fn with_window(self, window: impl Into<Window>) -> Self {
        Self {
            window: window.into(),
            ..self
        }
    }

    pub fn with_mode(self, mode: impl Into<Mode>) -> Self {
        Self {
            mode: mode.into(),
            ..self
        }
    }

    /// Expected total input length, used by the encoder to size its window.
    pub fn with_size_hint(self, size_hint: usize) -> Self {
        Self {
            size_hint: Some(size_hint),
            ..self
        }
    }

    pub fn quality(&self) -> Quality {
        self.quality
    }

    pub fn window(&self) -> Window {
        self.window
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn size_hint(&self) -> Option<usize> {
        self.size_hint
    }

    pub fn resolve(&self) -> ResolvedParams {
        ResolvedParams {
            quality: self.quality.level(),
            lgwin: self.window.bits(),
            mode: self.mode.id(),
            size_hint: self.size_hint,
        }
    }
}

/// Numeric parameters as handed to the primitive, before clamping.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ResolvedParams {
    pub quality: i32,
    pub lgwin: i32,
    pub mode: i32,
    pub size_hint: Option<usize>,
}

impl Default for ResolvedParams {
    fn default() -> Self {
        CompressionOptions::default().resolve()
    }
}

/// Loosely typed option bag. A `None` value stands for "use the default".
#[derive(Clone, Debug, Default)]
pub struct RawOptions {
    options: BTreeMap<String, Option<String>>,
}

impl RawOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `key` to `value`. `window` and `lgwin` name the same option; the
    /// last one set wins.
    pub fn set_option(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.options.insert(canonical_key(key.into()), Some(value.into()));
        self
    }

    /// Record `key` with no value, falling back to its default.
    pub fn set_default(&mut self, key: impl Into<String>) -> &mut Self {
        self.options.insert(canonical_key(key.into()), None);
        self
    }

    /// Parse a `key=value` pair. An empty value means "default".
    pub fn parse_pair(&mut self, pair: &str) -> Result<&mut Self> {
        let (key, value) = pair
            .split_once('=')
            .ok_or_else(|| Error::invalid_option(pair, "", "a key=value pair"))?;

        let key = key.trim();
        let value = value.trim();
        if value.is_empty() {
            Ok(self.set_default(key))
        } else {
            Ok(self.set_option(key, value))
        }
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    pub fn normalize(&self) -> Result<CompressionOptions> {
        let mut out = CompressionOptions::default();

        for (key, value) in &self.options {
            let value = match value {
                Some(v) => v.as_str(),
                None => {
                    check_key(key)?;
                    continue;
                }
            };

            match key.as_str() {
                "quality" => out.quality = value.parse()?,
                "lgwin" => out.window = value.parse()?,
                "mode" => out.mode = value.parse()?,
                "size_hint" => {
                    let hint = value
                        .trim()
                        .parse::<usize>()
                        .map_err(|_| Error::invalid_option(key.as_str(), value, SIZE_HINT_EXPECTED))?;
                    out.size_hint = Some(hint);
                }
                _ => return Err(unknown_key(key)),
            }
        }

        tracing::trace!(?out, "normalized compression options");
        Ok(out)
    }
}

fn canonical_key(key: String) -> String {
    match key.as_str() {
        "window" => "lgwin".to_string(),
        _ => key,
    }
}

fn check_key(key: &str) -> Result<()> {
    match key {
        "quality" | "lgwin" | "mode" | "size_hint" => Ok(()),
        _ => Err(unknown_key(key)),
    }
}

fn unknown_key(key: &str) -> Error {
    Error::invalid_option(key, "", "one of quality, lgwin, mode, size_hint")
}

impl TryFrom<&RawOptions> for CompressionOptions {
    type Error = Error;

    fn try_from(raw: &RawOptions) -> Result<Self> {
        raw.normalize()
    }
}
