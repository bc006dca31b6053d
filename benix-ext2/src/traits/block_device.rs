use crate::error::Result;
use crate::layout::BLOCK_SIZE;

/// Read-only block device: the I/O foundation of the volume reader.
///
/// Blocks are numbered from 1. Implementations may back onto a file, a
/// memory image, or anything else that can serve 1024-byte blocks.
pub trait BlockDevice {
    /// Read block `block_no` into `buf`.
    ///
    /// Block 0 does not exist. A block that is not fully inside the image
    /// fails with `Ext2Error::Io`.
    fn read_block(&self, block_no: u32, buf: &mut [u8; BLOCK_SIZE]) -> Result<()>;

    /// Number of whole blocks the image can serve.
    fn total_blocks(&self) -> u64;
}

impl<T: BlockDevice + ?Sized> BlockDevice for &T {
    fn read_block(&self, block_no: u32, buf: &mut [u8; BLOCK_SIZE]) -> Result<()> {
        (**self).read_block(block_no, buf)
    }

    fn total_blocks(&self) -> u64 {
        (**self).total_blocks()
    }
}

impl<T: BlockDevice + ?Sized> BlockDevice for alloc::boxed::Box<T> {
    fn read_block(&self, block_no: u32, buf: &mut [u8; BLOCK_SIZE]) -> Result<()> {
        (**self).read_block(block_no, buf)
    }

    fn total_blocks(&self) -> u64 {
        (**self).total_blocks()
    }
}
