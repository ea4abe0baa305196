//! Append-only write buffer backed by a chain of fixed-size blocks.
//!
//! Encoding does not know its output size in advance. Rather than growing one
//! contiguous allocation and copying already-written bytes on every resize,
//! the buffer appends into fixed 128-byte blocks and flattens the chain once,
//! when encoding completes.

use bytes::{BufMut, Bytes, BytesMut};

/// Capacity of each block in the chain.
pub(crate) const BLOCK_SIZE: usize = 128;

/// Growable byte sink used while packing.
pub struct WriteBuffer {
    full: Vec<Box<[u8; BLOCK_SIZE]>>,
    current: Box<[u8; BLOCK_SIZE]>,
    used: usize,
    len: usize,
}

impl WriteBuffer {
    pub fn new() -> Self {
        Self {
            full: Vec::new(),
            current: Box::new([0u8; BLOCK_SIZE]),
            used: 0,
            len: 0,
        }
    }

    /// Total bytes written so far.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Appends `bytes`, splitting the copy across block boundaries as needed.
    pub fn push(&mut self, mut bytes: &[u8]) {
        while !bytes.is_empty() {
            if self.used == BLOCK_SIZE {
                let filled =
                    std::mem::replace(&mut self.current, Box::new([0u8; BLOCK_SIZE]));
                self.full.push(filled);
                self.used = 0;
            }
            let n = bytes.len().min(BLOCK_SIZE - self.used);
            self.current[self.used..self.used + n].copy_from_slice(&bytes[..n]);
            self.used += n;
            self.len += n;
            bytes = &bytes[n..];
        }
    }

    /// Materializes the chain into one contiguous buffer of exactly `len` bytes.
    pub fn finish(self) -> Bytes {
        let mut out = BytesMut::with_capacity(self.len);
        for block in &self.full {
            out.put_slice(&block[..]);
        }
        out.put_slice(&self.current[..self.used]);
        out.freeze()
    }
}

impl Default for WriteBuffer {
    fn default() -> Self {
        Self::new()
    }
}
