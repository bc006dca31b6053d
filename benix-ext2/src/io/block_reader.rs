use alloc::boxed::Box;
use alloc::vec::Vec;

use log::trace;

use crate::error::Result;
use crate::io::block::Block;
use crate::layout::BLOCK_SIZE;
use crate::traits::block_device::BlockDevice;

/// Block reader wrapping a [`BlockDevice`] with higher-level read operations.
///
/// Every call goes to the device; nothing is cached.
pub struct BlockReader<D: BlockDevice> {
    device: D,
}

impl<D: BlockDevice> BlockReader<D> {
    /// Create a new reader wrapping the given block device.
    pub fn new(device: D) -> Self {
        Self { device }
    }

    /// Read block `block_no` as an owned [`Block`].
    pub fn read_block(&self, block_no: u32) -> Result<Block> {
        let mut data = Box::new([0u8; BLOCK_SIZE]);
        self.device.read_block(block_no, &mut data)?;
        trace!("block {} loaded", block_no);
        Ok(Block::new(block_no, data))
    }

    /// Read block `block_no` into a caller-provided buffer.
    pub fn read_into(&self, block_no: u32, buf: &mut [u8; BLOCK_SIZE]) -> Result<()> {
        self.device.read_block(block_no, buf)
    }

    /// Read each listed block, in order.
    pub fn read_blocks(&self, block_numbers: &[u32]) -> Result<Vec<Block>> {
        block_numbers.iter().map(|&b| self.read_block(b)).collect()
    }

    /// Number of whole blocks the device can serve.
    pub fn total_blocks(&self) -> u64 {
        self.device.total_blocks()
    }

    /// Borrow the underlying device.
    pub fn device(&self) -> &D {
        &self.device
    }

    pub fn into_device(self) -> D {
        self.device
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::*;
    use crate::error::Ext2Error;
    use crate::io::image::{ImageOrigin, MemoryImage};

    #[test]
    fn test_read_block_matches_raw_image() {
        let raw: Vec<u8> = (0..3 * BLOCK_SIZE).map(|i| (i * 7 % 256) as u8).collect();
        let reader = BlockReader::new(MemoryImage::new(raw.clone(), ImageOrigin::Volume));

        for b in 1..=3u32 {
            let block = reader.read_block(b).unwrap();
            assert_eq!(block.number(), b);
            assert_eq!(block.as_bytes().len(), BLOCK_SIZE);
            for i in 0..BLOCK_SIZE {
                assert_eq!(block.as_bytes()[i], raw[(b as usize - 1) * BLOCK_SIZE + i]);
            }
        }
    }

    #[test]
    fn test_read_blocks_keeps_order_and_fails_fast() {
        let mut raw = vec![0u8; 3 * BLOCK_SIZE];
        raw[0] = 1;
        raw[BLOCK_SIZE] = 2;
        raw[2 * BLOCK_SIZE] = 3;
        let reader = BlockReader::new(MemoryImage::new(raw, ImageOrigin::Volume));

        let blocks = reader.read_blocks(&[3, 1]).unwrap();
        assert_eq!(blocks[0].as_bytes()[0], 3);
        assert_eq!(blocks[1].as_bytes()[0], 1);

        assert_eq!(reader.read_blocks(&[1, 9]).unwrap_err(), Ext2Error::Io);
    }
}
