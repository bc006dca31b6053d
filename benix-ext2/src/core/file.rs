use alloc::vec::Vec;

use crate::io::block::Block;
use crate::layout::inode::Inode;

/// A regular file's inode together with its data blocks.
#[derive(Debug, Clone)]
pub struct Ext2File {
    ino: u32,
    inode: Inode,
    blocks: Vec<Block>,
}

impl Ext2File {
    pub fn new(ino: u32, inode: Inode, blocks: Vec<Block>) -> Self {
        Self { ino, inode, blocks }
    }

    pub fn ino(&self) -> u32 {
        self.ino
    }

    pub fn inode(&self) -> &Inode {
        &self.inode
    }

    /// Size recorded in the inode.
    pub fn size(&self) -> u64 {
        self.inode.size()
    }

    /// Data blocks in direct-pointer order, each a full 1024 bytes.
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn into_blocks(self) -> Vec<Block> {
        self.blocks
    }

    /// File content: the blocks concatenated and cut to the inode size.
    pub fn contents(&self) -> Vec<u8> {
        let total: usize = self.blocks.len() * crate::layout::BLOCK_SIZE;
        let len = usize::try_from(self.size()).map_or(total, |size| size.min(total));

        let mut out = Vec::with_capacity(len);
        for block in &self.blocks {
            let take = (len - out.len()).min(block.as_bytes().len());
            out.extend_from_slice(&block.as_bytes()[..take]);
        }
        out
    }
}
