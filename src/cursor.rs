//! Forward-only read cursor over a flat input buffer.

use crate::error::CodecError;

/// Checked, advancing view over the bytes being decoded.
///
/// `read` is the only extraction primitive; every higher-level decode step is
/// built on it, so truncated or corrupt input is caught at the first short
/// read rather than crashing.
pub struct ReadCursor<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> ReadCursor<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Bytes not yet consumed.
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    pub fn is_empty(&self) -> bool {
        self.pos == self.buf.len()
    }

    /// Returns the next `n` bytes and advances past them.
    pub fn read(&mut self, n: usize) -> Result<&'a [u8], CodecError> {
        let remaining = self.remaining();
        if remaining < n {
            return Err(CodecError::Truncated {
                needed: n,
                remaining,
            });
        }
        let view = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(view)
    }
}
