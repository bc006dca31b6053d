use alloc::vec::Vec;

use log::debug;

use crate::error::{Ext2Error, Result};
use crate::io::block_reader::BlockReader;
use crate::layout::BLOCK_SIZE;
use crate::layout::group_desc::{GROUP_DESC_SIZE, GROUP_DESC_TABLE_BLOCK, GroupDescriptor};
use crate::layout::superblock::SuperBlock;
use crate::traits::block_device::BlockDevice;

/// Block group descriptor table.
///
/// Loaded in two steps: the group count comes from the already parsed
/// super block, then exactly that many descriptors are read.
#[derive(Debug, Clone)]
pub struct GroupTable {
    descriptors: Vec<GroupDescriptor>,
}

impl GroupTable {
    /// Load `super_block.group_count()` descriptors starting at block 2.
    pub fn load<D: BlockDevice>(reader: &BlockReader<D>, super_block: &SuperBlock) -> Result<Self> {
        let group_count = super_block.group_count() as usize;
        if group_count == 0 {
            return Err(Ext2Error::CorruptedFs("volume has no block groups"));
        }

        // Every group owns at least one block, and the descriptor table
        // itself has to end inside the image.
        let per_block = BLOCK_SIZE / GROUP_DESC_SIZE;
        let blocks_needed = group_count.div_ceil(per_block);
        let total_blocks = reader.total_blocks();
        let table_end = GROUP_DESC_TABLE_BLOCK as u64 - 1 + blocks_needed as u64;
        if group_count as u64 > total_blocks || table_end > total_blocks {
            return Err(Ext2Error::CorruptedFs("group count exceeds image"));
        }
        let mut descriptors = Vec::with_capacity(group_count);

        for block_idx in 0..blocks_needed as u32 {
            let block = reader.read_block(GROUP_DESC_TABLE_BLOCK + block_idx)?;
            let raw = block.as_bytes();

            let mut offset = 0;
            while offset + GROUP_DESC_SIZE <= BLOCK_SIZE && descriptors.len() < group_count {
                descriptors.push(GroupDescriptor::parse(&raw[offset..])?);
                offset += GROUP_DESC_SIZE;
            }
        }

        debug!(
            "loaded {} group descriptor(s) from {} block(s)",
            descriptors.len(),
            blocks_needed
        );

        Ok(GroupTable { descriptors })
    }

    /// Descriptor of `group_no`.
    pub fn get(&self, group_no: u32) -> Result<&GroupDescriptor> {
        self.descriptors
            .get(group_no as usize)
            .ok_or(Ext2Error::OutOfRange("block group number"))
    }

    /// First descriptor; the one that describes the root directory's group.
    pub fn first(&self) -> Result<&GroupDescriptor> {
        self.get(0)
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &GroupDescriptor> {
        self.descriptors.iter()
    }
}
