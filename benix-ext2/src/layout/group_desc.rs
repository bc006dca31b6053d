use super::field::Field;
use crate::error::{Ext2Error, Result};

/// On-disk size of one group descriptor.
pub const GROUP_DESC_SIZE: usize = 32;

/// The descriptor table starts in the block right after the super block.
pub const GROUP_DESC_TABLE_BLOCK: u32 = 2;

pub const BLOCK_BITMAP: Field<u32> = Field::new("bg_block_bitmap", 0);
pub const INODE_BITMAP: Field<u32> = Field::new("bg_inode_bitmap", 4);
pub const INODE_TABLE: Field<u32> = Field::new("bg_inode_table", 8);
pub const FREE_BLOCKS_COUNT: Field<u16> = Field::new("bg_free_blocks_count", 12);
pub const FREE_INODES_COUNT: Field<u16> = Field::new("bg_free_inodes_count", 14);
pub const USED_DIRS_COUNT: Field<u16> = Field::new("bg_used_dirs_count", 16);

/// Parsed ext2 block group descriptor.
///
/// Bridges from the super block to per-group metadata. Only the inode
/// table pointer is consumed by the reader; the rest is decoded for
/// inspection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupDescriptor {
    pub bg_block_bitmap: u32,
    pub bg_inode_bitmap: u32,
    pub bg_inode_table: u32,
    pub bg_free_blocks_count: u16,
    pub bg_free_inodes_count: u16,
    pub bg_used_dirs_count: u16,
}

impl GroupDescriptor {
    /// Parse a descriptor from the start of `raw`.
    pub fn parse(raw: &[u8]) -> Result<GroupDescriptor> {
        if raw.len() < GROUP_DESC_SIZE {
            return Err(Ext2Error::OutOfRange("group descriptor buffer < 32 bytes"));
        }

        Ok(GroupDescriptor {
            bg_block_bitmap: BLOCK_BITMAP.read(raw)?,
            bg_inode_bitmap: INODE_BITMAP.read(raw)?,
            bg_inode_table: INODE_TABLE.read(raw)?,
            bg_free_blocks_count: FREE_BLOCKS_COUNT.read(raw)?,
            bg_free_inodes_count: FREE_INODES_COUNT.read(raw)?,
            bg_used_dirs_count: USED_DIRS_COUNT.read(raw)?,
        })
    }

    /// First block of this group's inode table.
    pub fn inode_table_pointer(&self) -> u32 {
        self.bg_inode_table
    }
}
