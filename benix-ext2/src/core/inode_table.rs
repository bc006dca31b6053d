use log::trace;

use crate::error::{Ext2Error, Result};
use crate::io::block_reader::BlockReader;
use crate::layout::group_desc::GroupDescriptor;
use crate::layout::inode::Inode;
use crate::layout::superblock::SuperBlock;
use crate::layout::{INODE_SIZE, INODES_PER_BLOCK};
use crate::traits::block_device::BlockDevice;

/// Where an inode record lives on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InodeLocation {
    /// Absolute block number holding the record.
    pub block: u32,
    /// 0-based block index inside the group's inode table.
    pub table_block: u32,
    /// Byte offset of the record inside `block`.
    pub byte_offset: usize,
}

/// Inode table of one block group.
///
/// Holds only the table's location; every lookup reads the block again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InodeTable {
    group: u32,
    first_block: u32,
    table_blocks: u32,
    inodes_per_group: u32,
    inodes_count: u32,
}

impl InodeTable {
    pub fn new(super_block: &SuperBlock, group: u32, desc: &GroupDescriptor) -> Self {
        Self {
            group,
            first_block: desc.inode_table_pointer(),
            table_blocks: super_block.inode_table_blocks(),
            inodes_per_group: super_block.s_inodes_per_group,
            inodes_count: super_block.s_inodes_count,
        }
    }

    pub fn group(&self) -> u32 {
        self.group
    }

    /// First block of the table.
    pub fn first_block(&self) -> u32 {
        self.first_block
    }

    /// Table length in blocks.
    pub fn table_blocks(&self) -> u32 {
        self.table_blocks
    }

    /// Locate inode `ino` (1-based, volume-wide) inside this table.
    ///
    /// With 8 records per block, the group-local index `i` (1-based) sits in
    /// table block `(i - 1) / 8` at byte `128 * ((i - 1) % 8)`: inodes 1..=8
    /// fill the first block and inode 9 opens the second.
    pub fn locate(&self, ino: u32) -> Result<InodeLocation> {
        if ino == 0 || ino > self.inodes_count {
            return Err(Ext2Error::OutOfRange("inode number out of range"));
        }
        if self.inodes_per_group == 0 {
            return Err(Ext2Error::CorruptedFs("inodes_per_group is zero"));
        }
        if (ino - 1) / self.inodes_per_group != self.group {
            return Err(Ext2Error::OutOfRange("inode belongs to another block group"));
        }

        let local = (ino - 1) % self.inodes_per_group;
        let table_block = local / INODES_PER_BLOCK as u32;
        if table_block >= self.table_blocks {
            return Err(Ext2Error::OutOfRange("inode table block offset"));
        }
        let block = self
            .first_block
            .checked_add(table_block)
            .ok_or(Ext2Error::OutOfRange("inode table block number"))?;

        Ok(InodeLocation {
            block,
            table_block,
            byte_offset: (local as usize % INODES_PER_BLOCK) * INODE_SIZE,
        })
    }

    /// Read and decode inode `ino`.
    pub fn get_inode<D: BlockDevice>(&self, reader: &BlockReader<D>, ino: u32) -> Result<Inode> {
        let location = self.locate(ino)?;
        trace!(
            "inode {} -> block {} (+{})",
            ino, location.block, location.byte_offset
        );
        let block = reader.read_block(location.block)?;
        Inode::parse_at(block.as_bytes(), location.byte_offset)
    }
}
