use alloc::vec::Vec;

use log::{debug, warn};

use super::dir_reader::{DirectoryReader, ListingEntry};
use super::file::Ext2File;
use super::group_table::GroupTable;
use super::inode_table::InodeTable;
use crate::error::{Ext2Error, Result};
use crate::io::block::Block;
use crate::io::block_reader::BlockReader;
use crate::layout::ROOT_INO;
use crate::layout::inode::Inode;
use crate::layout::superblock::{SUPER_BLOCK_NO, SuperBlock};
use crate::traits::block_device::BlockDevice;

/// A mounted, read-only ext2 volume.
///
/// Mounting decodes the super block and the group descriptor table once.
/// Everything else is read from the device on each call.
pub struct Volume<D: BlockDevice> {
    reader: BlockReader<D>,
    super_block: SuperBlock,
    groups: GroupTable,
}

impl<D: BlockDevice> Volume<D> {
    /// Read block 1 as the super block, check it, then load the
    /// descriptor table that follows it.
    pub fn mount(device: D) -> Result<Self> {
        let reader = BlockReader::new(device);

        let raw = reader.read_block(SUPER_BLOCK_NO)?;
        let super_block = SuperBlock::parse(raw.as_bytes())?;
        super_block.validate()?;
        if super_block.s_inode_size == 0 {
            warn!("super block has no inode size, assuming 128-byte inodes");
        }

        let groups = GroupTable::load(&reader, &super_block)?;

        debug!(
            "mounted ext2: {} blocks, {} inodes, {} group(s), {} blocks/group, {} inodes/group",
            super_block.s_blocks_count,
            super_block.s_inodes_count,
            groups.len(),
            super_block.s_blocks_per_group,
            super_block.s_inodes_per_group
        );

        Ok(Self {
            reader,
            super_block,
            groups,
        })
    }

    pub fn super_block(&self) -> &SuperBlock {
        &self.super_block
    }

    pub fn groups(&self) -> &GroupTable {
        &self.groups
    }

    pub fn group_count(&self) -> u32 {
        self.super_block.group_count()
    }

    pub fn reader(&self) -> &BlockReader<D> {
        &self.reader
    }

    pub fn read_block(&self, block_no: u32) -> Result<Block> {
        self.reader.read_block(block_no)
    }

    /// Zero-based block group holding inode `ino`.
    pub fn inode_group(&self, ino: u32) -> Result<u32> {
        if ino == 0 || ino > self.super_block.s_inodes_count {
            return Err(Ext2Error::OutOfRange("inode number out of range"));
        }
        Ok((ino - 1) / self.super_block.s_inodes_per_group)
    }

    /// Inode table of block group `group`.
    pub fn inode_table(&self, group: u32) -> Result<InodeTable> {
        let desc = self.groups.get(group)?;
        Ok(InodeTable::new(&self.super_block, group, desc))
    }

    pub fn inode(&self, ino: u32) -> Result<Inode> {
        let group = self.inode_group(ino)?;
        self.inode_table(group)?.get_inode(&self.reader, ino)
    }

    pub fn root_inode(&self) -> Result<Inode> {
        self.inode(ROOT_INO)
    }

    /// Read every non-zero direct block of `inode`, in pointer order.
    ///
    /// Files that need indirect blocks are refused rather than truncated.
    pub fn data_blocks(&self, inode: &Inode) -> Result<Vec<Block>> {
        inode.check_direct_only()?;

        let mut blocks = Vec::new();
        for pointer in inode.direct_blocks() {
            if pointer > self.super_block.s_blocks_count {
                return Err(Ext2Error::OutOfRange("block pointer beyond volume"));
            }
            blocks.push(self.reader.read_block(pointer)?);
        }
        Ok(blocks)
    }

    /// Directory reader over the data blocks of directory inode `ino`.
    pub fn directory(&self, ino: u32) -> Result<DirectoryReader> {
        let inode = self.inode(ino)?;
        if !inode.is_dir() {
            return Err(Ext2Error::NotDirectory);
        }
        Ok(DirectoryReader::new(self.data_blocks(&inode)?))
    }

    pub fn root_directory(&self) -> Result<DirectoryReader> {
        self.directory(ROOT_INO)
    }

    /// One row per entry of the root directory, in on-disk order.
    pub fn list_root(&self) -> Result<Vec<ListingEntry>> {
        self.root_directory()?.listing()
    }

    /// Inode number of the root directory entry named exactly `name`.
    pub fn find_inode_pointer(&self, name: &str) -> Result<u32> {
        let ino = self.root_directory()?.lookup(name)?;
        debug!("{} -> inode {}", name, ino);
        Ok(ino)
    }

    /// Data blocks of the root-level entry `name`.
    ///
    /// Each block is a full 1024 bytes; the tail of the last one is not
    /// cut to the file size.
    pub fn get_file(&self, name: &str) -> Result<Vec<Block>> {
        let ino = self.find_inode_pointer(name)?;
        let inode = self.inode(ino)?;
        self.data_blocks(&inode)
    }

    pub fn open_file(&self, name: &str) -> Result<Ext2File> {
        let ino = self.find_inode_pointer(name)?;
        let inode = self.inode(ino)?;
        let blocks = self.data_blocks(&inode)?;
        Ok(Ext2File::new(ino, inode, blocks))
    }

    /// Directory reader for the root-level subdirectory `name`.
    pub fn open_directory(&self, name: &str) -> Result<DirectoryReader> {
        let ino = self.find_inode_pointer(name)?;
        self.directory(ino)
    }

    pub fn list_dir(&self, name: &str) -> Result<Vec<ListingEntry>> {
        self.open_directory(name)?.listing()
    }

    pub fn into_device(self) -> D {
        self.reader.into_device()
    }
}
