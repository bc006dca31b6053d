use alloc::boxed::Box;
use core::fmt;

use crate::error::{Ext2Error, Result};
use crate::layout::BLOCK_SIZE;
use crate::layout::field::{Field, LeValue};

/// One 1024-byte block read from the image.
///
/// Fields are little-endian. The block carries its own read cursor for
/// sequential consumers; indexed accessors never touch it.
#[derive(Clone, PartialEq, Eq)]
pub struct Block {
    number: u32,
    data: Box<[u8; BLOCK_SIZE]>,
    cursor: usize,
}

impl Block {
    pub fn new(number: u32, data: Box<[u8; BLOCK_SIZE]>) -> Self {
        Self {
            number,
            data,
            cursor: 0,
        }
    }

    /// 1-based block number this block was read from.
    pub fn number(&self) -> u32 {
        self.number
    }

    pub fn as_bytes(&self) -> &[u8; BLOCK_SIZE] {
        &self.data
    }

    pub fn into_bytes(self) -> Box<[u8; BLOCK_SIZE]> {
        self.data
    }

    /// Read one byte at the cursor and advance it.
    pub fn next_u8(&mut self) -> Option<u8> {
        let byte = self.data.get(self.cursor).copied()?;
        self.cursor += 1;
        Some(byte)
    }

    /// Current cursor position.
    pub fn position(&self) -> usize {
        self.cursor
    }

    /// Bytes left between the cursor and the end of the block.
    pub fn remaining(&self) -> usize {
        BLOCK_SIZE - self.cursor
    }

    pub fn rewind(&mut self) {
        self.cursor = 0;
    }

    pub fn u8_at(&self, index: usize) -> Result<u8> {
        self.value_at(index)
    }

    pub fn u16_at(&self, index: usize) -> Result<u16> {
        self.value_at(index)
    }

    pub fn u32_at(&self, index: usize) -> Result<u32> {
        self.value_at(index)
    }

    /// `len` raw bytes starting at `index`.
    pub fn bytes_at(&self, index: usize, len: usize) -> Result<&[u8]> {
        self.data
            .get(index..index + len)
            .ok_or(Ext2Error::OutOfRange("byte span crosses block end"))
    }

    fn value_at<T: LeValue>(&self, index: usize) -> Result<T> {
        Field::<T>::new("block offset", index).read(&self.data[..])
    }
}

impl fmt::Debug for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Block")
            .field("number", &self.number)
            .field("cursor", &self.cursor)
            .finish_non_exhaustive()
    }
}

impl AsRef<[u8]> for Block {
    fn as_ref(&self) -> &[u8] {
        &self.data[..]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Block {
        let mut data = Box::new([0u8; BLOCK_SIZE]);
        data[0..4].copy_from_slice(&0xDEAD_BEEFu32.to_le_bytes());
        data[BLOCK_SIZE - 2..].copy_from_slice(&0x0102u16.to_le_bytes());
        Block::new(7, data)
    }

    #[test]
    fn test_indexed_reads_are_little_endian() {
        let block = sample();
        assert_eq!(block.number(), 7);
        assert_eq!(block.u32_at(0).unwrap(), 0xDEAD_BEEF);
        assert_eq!(block.u16_at(0).unwrap(), 0xBEEF);
        assert_eq!(block.u8_at(3).unwrap(), 0xDE);
        assert_eq!(block.u16_at(BLOCK_SIZE - 2).unwrap(), 0x0102);
    }

    #[test]
    fn test_reads_past_end_fail() {
        let block = sample();
        assert!(block.u32_at(BLOCK_SIZE - 3).is_err());
        assert!(block.bytes_at(BLOCK_SIZE - 1, 2).is_err());
        assert_eq!(block.bytes_at(BLOCK_SIZE - 2, 2).unwrap(), &[0x02, 0x01]);
    }

    #[test]
    fn test_cursor_is_independent_of_indexed_reads() {
        let mut block = sample();
        assert_eq!(block.next_u8(), Some(0xEF));
        assert_eq!(block.next_u8(), Some(0xBE));
        let _ = block.u32_at(100).unwrap();
        assert_eq!(block.position(), 2);
        assert_eq!(block.remaining(), BLOCK_SIZE - 2);

        block.rewind();
        assert_eq!(block.next_u8(), Some(0xEF));
    }

    #[test]
    fn test_cursor_stops_at_block_end() {
        let mut block = sample();
        for _ in 0..BLOCK_SIZE {
            assert!(block.next_u8().is_some());
        }
        assert_eq!(block.next_u8(), None);
    }
}
