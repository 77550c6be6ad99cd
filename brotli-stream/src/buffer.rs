//! Growable output buffers.
//!
//! An [`OutputBuffer`] either owns a fresh `Vec<u8>` or adopts the caller's,
//! in which case the very same `Vec` is handed back in the [`Output`] so the
//! caller observes the bytes in place.

use std::ops::Deref;

use crate::error::{Error, Result};

/// Where one-shot output should land.
#[derive(Debug)]
pub enum Target<'a> {
    /// A caller buffer that may be cleared and refilled.
    Growable(&'a mut Vec<u8>),
    /// A caller buffer that must not change. Acquiring it fails.
    Frozen(&'a [u8]),
}

impl<'a> From<&'a mut Vec<u8>> for Target<'a> {
    fn from(buf: &'a mut Vec<u8>) -> Self {
        Target::Growable(buf)
    }
}

impl<'a> From<&'a Vec<u8>> for Target<'a> {
    fn from(buf: &'a Vec<u8>) -> Self {
        Target::Frozen(buf)
    }
}

impl<'a> From<&'a [u8]> for Target<'a> {
    fn from(buf: &'a [u8]) -> Self {
        Target::Frozen(buf)
    }
}

/// How an [`OutputBuffer`] reacts to output beyond a size limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    Unbounded,
    /// Overflow fails with [`Error::BufferTooSmall`].
    Strict(usize),
    /// Overflow is dropped; the buffer keeps exactly the first `n` bytes.
    Truncate(usize),
}

impl Bound {
    pub fn limit(self) -> Option<usize> {
        match self {
            Bound::Unbounded => None,
            Bound::Strict(n) | Bound::Truncate(n) => Some(n),
        }
    }
}

#[derive(Debug)]
enum Storage<'a> {
    Owned(Vec<u8>),
    Adopted(&'a mut Vec<u8>),
}

/// An append-only byte buffer, owned or borrowed from the caller.
#[derive(Debug)]
pub struct OutputBuffer<'a> {
    storage: Storage<'a>,
    bound: Bound,
}

impl Default for OutputBuffer<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> OutputBuffer<'a> {
    /// A fresh, empty, unbounded buffer.
    pub fn new() -> Self {
        Self {
            storage: Storage::Owned(Vec::new()),
            bound: Bound::Unbounded,
        }
    }

    /// Acquire a buffer for one operation.
    ///
    /// A caller buffer is cleared and reused; a frozen one is rejected
    /// untouched. A positive `hint` reserves capacity up front.
    pub fn acquire(hint: Option<usize>, target: Option<Target<'a>>) -> Result<Self> {
        let mut storage = match target {
            None => Storage::Owned(Vec::new()),
            Some(Target::Frozen(_)) => return Err(Error::ImmutableTarget),
            Some(Target::Growable(buf)) => {
                buf.clear();
                Storage::Adopted(buf)
            }
        };

        if let Some(hint) = hint.filter(|n| *n > 0) {
            storage.vec_mut().reserve(hint);
        }

        Ok(Self {
            storage,
            bound: Bound::Unbounded,
        })
    }

    pub fn with_bound(mut self, bound: Bound) -> Self {
        self.bound = bound;
        self
    }

    pub fn bound(&self) -> Bound {
        self.bound
    }

    pub fn len(&self) -> usize {
        self.as_slice().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Bytes that still fit under the bound.
    pub fn remaining(&self) -> Option<usize> {
        self.bound.limit().map(|n| n.saturating_sub(self.len()))
    }

    pub fn is_full(&self) -> bool {
        self.remaining() == Some(0)
    }

    pub fn as_slice(&self) -> &[u8] {
        match &self.storage {
            Storage::Owned(v) => v,
            Storage::Adopted(v) => v,
        }
    }

    /// Append `bytes`, honouring the bound. Returns how many were kept.
    pub fn append(&mut self, bytes: &[u8]) -> Result<usize> {
        let keep = match self.bound {
            Bound::Unbounded => bytes.len(),
            Bound::Strict(limit) => {
                let required = self.len() + bytes.len();
                if required > limit {
                    return Err(Error::BufferTooSmall { limit, required });
                }
                bytes.len()
            }
            Bound::Truncate(limit) => bytes.len().min(limit.saturating_sub(self.len())),
        };

        self.storage.vec_mut().extend_from_slice(&bytes[..keep]);
        Ok(keep)
    }

    /// Grow by `n` zeroed bytes and return them for direct writing.
    ///
    /// The bound is not checked; callers size `n` with [`remaining`](Self::remaining)
    /// and give back what they did not fill with [`truncate_to`](Self::truncate_to).
    pub fn extend_zeroed(&mut self, n: usize) -> &mut [u8] {
        let vec = self.storage.vec_mut();
        let start = vec.len();
        vec.resize(start + n, 0);
        &mut vec[start..]
    }

    /// Cut the buffer down to `n` bytes. Longer lengths are a no-op.
    pub fn truncate_to(&mut self, n: usize) {
        self.storage.vec_mut().truncate(n);
    }

    pub fn into_output(self) -> Output<'a> {
        match self.storage {
            Storage::Owned(v) => Output::Owned(v),
            Storage::Adopted(v) => Output::Adopted(v),
        }
    }
}

impl Storage<'_> {
    fn vec_mut(&mut self) -> &mut Vec<u8> {
        match self {
            Storage::Owned(v) => v,
            Storage::Adopted(v) => v,
        }
    }
}

/// The result of a one-shot operation: a fresh `Vec`, or the caller's own.
#[derive(Debug)]
pub enum Output<'a> {
    Owned(Vec<u8>),
    Adopted(&'a mut Vec<u8>),
}

impl<'a> Output<'a> {
    /// Returns the caller's buffer if one was supplied.
    pub fn adopted(self) -> Option<&'a mut Vec<u8>> {
        match self {
            Output::Owned(_) => None,
            Output::Adopted(v) => Some(v),
        }
    }

    /// Copies out of an adopted buffer; moves an owned one.
    pub fn into_vec(self) -> Vec<u8> {
        match self {
            Output::Owned(v) => v,
            Output::Adopted(v) => v.clone(),
        }
    }
}

impl Deref for Output<'_> {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        match self {
            Output::Owned(v) => v,
            Output::Adopted(v) => v,
        }
    }
}

impl AsRef<[u8]> for Output<'_> {
    fn as_ref(&self) -> &[u8] {
        self
    }
}

impl PartialEq<[u8]> for Output<'_> {
    fn eq(&self, other: &[u8]) -> bool {
        **self == *other
    }
}
