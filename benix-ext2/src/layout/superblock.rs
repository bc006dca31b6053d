use alloc::string::String;

use super::field::{ByteField, Field};
use super::{BLOCK_SIZE, INODE_SIZE};
use crate::error::{Ext2Error, Result};

// ─── Constants ──────────────────────────────────────────────────────────────

/// ext2 super block magic number (at offset 56).
pub const EXT2_SUPER_MAGIC: u16 = 0xEF53;

/// The super block lives in block 1.
pub const SUPER_BLOCK_NO: u32 = 1;

/// Volume label length in bytes.
pub const VOLUME_LABEL_LEN: usize = 16;

// ─── Field layout ───────────────────────────────────────────────────────────

pub const INODES_COUNT: Field<u32> = Field::new("s_inodes_count", 0);
pub const BLOCKS_COUNT: Field<u32> = Field::new("s_blocks_count", 4);
pub const FREE_BLOCKS_COUNT: Field<u32> = Field::new("s_free_blocks_count", 12);
pub const FREE_INODES_COUNT: Field<u32> = Field::new("s_free_inodes_count", 16);
pub const FIRST_DATA_BLOCK: Field<u32> = Field::new("s_first_data_block", 20);
pub const LOG_BLOCK_SIZE: Field<u32> = Field::new("s_log_block_size", 24);
pub const BLOCKS_PER_GROUP: Field<u32> = Field::new("s_blocks_per_group", 32);
pub const INODES_PER_GROUP: Field<u32> = Field::new("s_inodes_per_group", 40);
pub const MAGIC: Field<u16> = Field::new("s_magic", 56);
pub const REV_LEVEL: Field<u32> = Field::new("s_rev_level", 76);
pub const INODE_SIZE_FIELD: Field<u32> = Field::new("s_inode_size", 88);
pub const VOLUME_NAME: ByteField = ByteField::new("s_volume_name", 120, VOLUME_LABEL_LEN);

// SuperBlock struct

/// Parsed ext2 super block.
///
/// Parsed from the raw 1024-byte block 1 via [`SuperBlock::parse()`].
/// Decoding never fails on field values; [`SuperBlock::validate()`] does
/// the sanity checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuperBlock {
    // basic counts
    pub s_inodes_count: u32,
    pub s_blocks_count: u32,
    pub s_free_blocks_count: u32,
    pub s_free_inodes_count: u32,

    // geometry
    pub s_first_data_block: u32,
    pub s_log_block_size: u32,
    pub s_blocks_per_group: u32,
    pub s_inodes_per_group: u32,

    // identifiers
    pub s_magic: u16,
    pub s_rev_level: u32,
    pub s_inode_size: u32,
    pub s_volume_name: [u8; VOLUME_LABEL_LEN],
}

impl SuperBlock {
    /// Parse a super block from the raw bytes of block 1.
    pub fn parse(raw: &[u8]) -> Result<SuperBlock> {
        if raw.len() < BLOCK_SIZE {
            return Err(Ext2Error::OutOfRange("super block buffer < 1024 bytes"));
        }

        let mut s_volume_name = [0u8; VOLUME_LABEL_LEN];
        s_volume_name.copy_from_slice(VOLUME_NAME.read(raw)?);

        Ok(SuperBlock {
            s_inodes_count: INODES_COUNT.read(raw)?,
            s_blocks_count: BLOCKS_COUNT.read(raw)?,
            s_free_blocks_count: FREE_BLOCKS_COUNT.read(raw)?,
            s_free_inodes_count: FREE_INODES_COUNT.read(raw)?,
            s_first_data_block: FIRST_DATA_BLOCK.read(raw)?,
            s_log_block_size: LOG_BLOCK_SIZE.read(raw)?,
            s_blocks_per_group: BLOCKS_PER_GROUP.read(raw)?,
            s_inodes_per_group: INODES_PER_GROUP.read(raw)?,
            s_magic: MAGIC.read(raw)?,
            s_rev_level: REV_LEVEL.read(raw)?,
            s_inode_size: INODE_SIZE_FIELD.read(raw)?,
            s_volume_name,
        })
    }

    /// Validate basic super block sanity.
    pub fn validate(&self) -> Result<()> {
        if self.s_magic != EXT2_SUPER_MAGIC {
            return Err(Ext2Error::CorruptedFs("bad super block magic"));
        }

        if self.s_blocks_per_group == 0 {
            return Err(Ext2Error::CorruptedFs("blocks_per_group is zero"));
        }

        if self.s_inodes_per_group == 0 {
            return Err(Ext2Error::CorruptedFs("inodes_per_group is zero"));
        }

        if self.s_log_block_size != 0 {
            return Err(Ext2Error::UnsupportedLayout("block size is not 1024"));
        }

        if self.inode_size() != INODE_SIZE {
            return Err(Ext2Error::UnsupportedLayout("inode size is not 128"));
        }

        Ok(())
    }

    // Convenience accessors

    /// Inode record size in bytes.
    ///
    /// Revision 0 images leave the field zero and always use 128.
    pub fn inode_size(&self) -> usize {
        if self.s_inode_size == 0 {
            INODE_SIZE
        } else {
            self.s_inode_size as usize
        }
    }

    /// Number of block groups: `ceil(block_count / blocks_per_group)`.
    ///
    /// Returns 0 when `blocks_per_group` is zero; `validate` rejects that.
    pub fn group_count(&self) -> u32 {
        if self.s_blocks_per_group == 0 {
            return 0;
        }
        self.s_blocks_count.div_ceil(self.s_blocks_per_group)
    }

    /// Group count with the remainder dropped, as older tools computed it.
    ///
    /// Undercounts whenever the last group is partial; kept for comparison
    /// only.
    pub fn truncated_group_count(&self) -> u32 {
        if self.s_blocks_per_group == 0 {
            return 0;
        }
        self.s_blocks_count / self.s_blocks_per_group
    }

    /// Volume size in bytes.
    pub fn volume_size(&self) -> u64 {
        self.s_blocks_count as u64 * BLOCK_SIZE as u64
    }

    /// Inode table length of one group, in blocks.
    pub fn inode_table_blocks(&self) -> u32 {
        let bytes = self.s_inodes_per_group as u64 * self.inode_size() as u64;
        bytes.div_ceil(BLOCK_SIZE as u64) as u32
    }

    /// Volume label with every byte taken literally, trailing NULs included.
    pub fn volume_label(&self) -> String {
        self.s_volume_name.iter().map(|&b| b as char).collect()
    }

    /// Volume label up to the first NUL.
    pub fn volume_label_trimmed(&self) -> String {
        self.s_volume_name
            .iter()
            .take_while(|&&b| b != 0)
            .map(|&b| b as char)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;
    use alloc::vec::Vec;

    use super::*;

    fn raw_super_block(inodes: u32, blocks: u32, blocks_per_group: u32) -> Vec<u8> {
        let mut raw = vec![0u8; BLOCK_SIZE];
        raw[0..4].copy_from_slice(&inodes.to_le_bytes());
        raw[4..8].copy_from_slice(&blocks.to_le_bytes());
        raw[32..36].copy_from_slice(&blocks_per_group.to_le_bytes());
        raw[40..44].copy_from_slice(&64u32.to_le_bytes());
        raw[56..58].copy_from_slice(&EXT2_SUPER_MAGIC.to_le_bytes());
        raw[88..92].copy_from_slice(&128u32.to_le_bytes());
        raw[120..136].copy_from_slice(b"benix-volume\0\0ab");
        raw
    }

    #[test]
    fn test_parse_round_trip() {
        let sb = SuperBlock::parse(&raw_super_block(184, 1000, 8192)).unwrap();
        assert_eq!(sb.s_inodes_count, 184);
        assert_eq!(sb.s_blocks_count, 1000);
        assert_eq!(sb.s_blocks_per_group, 8192);
        assert_eq!(sb.s_inodes_per_group, 64);
        assert_eq!(sb.inode_size(), 128);
        assert!(sb.validate().is_ok());
    }

    #[test]
    fn test_group_count_rounds_up_without_truncating() {
        let sb = SuperBlock::parse(&raw_super_block(64, 20000, 8192)).unwrap();
        assert_eq!(sb.group_count(), 3);
        // 20000 / 8192 truncates to 2 before any rounding could happen.
        assert_eq!(sb.truncated_group_count(), 2);

        let exact = SuperBlock::parse(&raw_super_block(64, 16384, 8192)).unwrap();
        assert_eq!(exact.group_count(), 2);
        assert_eq!(exact.truncated_group_count(), 2);

        let small = SuperBlock::parse(&raw_super_block(64, 100, 8192)).unwrap();
        assert_eq!(small.group_count(), 1);
        assert_eq!(small.truncated_group_count(), 0);
    }

    #[test]
    fn test_volume_label_is_taken_literally() {
        let sb = SuperBlock::parse(&raw_super_block(1, 1, 1)).unwrap();
        let label = sb.volume_label();
        assert_eq!(label.chars().count(), 16);
        assert_eq!(label, "benix-volume\0\0ab");
        assert_eq!(sb.volume_label_trimmed(), "benix-volume");
    }

    #[test]
    fn test_validate_rejects_bad_geometry() {
        let mut raw = raw_super_block(64, 100, 0);
        let sb = SuperBlock::parse(&raw).unwrap();
        assert_eq!(
            sb.validate(),
            Err(Ext2Error::CorruptedFs("blocks_per_group is zero"))
        );
        assert_eq!(sb.group_count(), 0);

        raw[32..36].copy_from_slice(&8192u32.to_le_bytes());
        raw[56] = 0;
        let sb = SuperBlock::parse(&raw).unwrap();
        assert_eq!(
            sb.validate(),
            Err(Ext2Error::CorruptedFs("bad super block magic"))
        );

        let mut raw = raw_super_block(64, 100, 8192);
        raw[88..92].copy_from_slice(&256u32.to_le_bytes());
        let sb = SuperBlock::parse(&raw).unwrap();
        assert_eq!(
            sb.validate(),
            Err(Ext2Error::UnsupportedLayout("inode size is not 128"))
        );

        let mut raw = raw_super_block(64, 100, 8192);
        raw[24] = 2;
        let sb = SuperBlock::parse(&raw).unwrap();
        assert_eq!(
            sb.validate(),
            Err(Ext2Error::UnsupportedLayout("block size is not 1024"))
        );
    }

    #[test]
    fn test_revision_zero_inode_size() {
        let mut raw = raw_super_block(64, 100, 8192);
        raw[88..92].copy_from_slice(&0u32.to_le_bytes());
        let sb = SuperBlock::parse(&raw).unwrap();
        assert_eq!(sb.inode_size(), 128);
        assert!(sb.validate().is_ok());
        assert_eq!(sb.inode_table_blocks(), 8);
    }

    #[test]
    fn test_short_buffer() {
        assert!(SuperBlock::parse(&[0u8; 512]).is_err());
    }
}
