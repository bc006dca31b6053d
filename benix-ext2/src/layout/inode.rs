use super::field::Field;
use super::{BLOCK_SIZE, INODE_SIZE};
use crate::error::{Ext2Error, Result};

// Mode constants (i_mode & S_IFMT)
pub const S_IFMT: u16 = 0xF000;
pub const S_IFSOCK: u16 = 0xC000;
pub const S_IFLNK: u16 = 0xA000;
pub const S_IFREG: u16 = 0x8000;
pub const S_IFBLK: u16 = 0x6000;
pub const S_IFDIR: u16 = 0x4000;
pub const S_IFCHR: u16 = 0x2000;
pub const S_IFIFO: u16 = 0x1000;

/// Number of direct block pointers in an inode.
pub const DIRECT_BLOCKS: usize = 12;

/// Largest file the direct pointers can address.
pub const MAX_DIRECT_SIZE: u64 = (DIRECT_BLOCKS * BLOCK_SIZE) as u64;

// ─── Field layout ───────────────────────────────────────────────────────────

pub const MODE: Field<u16> = Field::new("i_mode", 0);
pub const UID: Field<u16> = Field::new("i_uid", 2);
pub const SIZE_LO: Field<u32> = Field::new("i_size", 4);
pub const ATIME: Field<u32> = Field::new("i_atime", 8);
pub const CTIME: Field<u32> = Field::new("i_ctime", 12);
pub const MTIME: Field<u32> = Field::new("i_mtime", 16);
pub const DTIME: Field<u32> = Field::new("i_dtime", 20);
pub const GID: Field<u16> = Field::new("i_gid", 24);
pub const LINKS_COUNT: Field<u16> = Field::new("i_links_count", 26);
pub const BLOCKS: Field<u32> = Field::new("i_blocks", 28);
pub const FLAGS: Field<u32> = Field::new("i_flags", 32);
/// First of the 12 direct pointers; the rest follow every 4 bytes.
pub const BLOCK_POINTERS: Field<u32> = Field::new("i_block", 40);
pub const INDIRECT: Field<u32> = Field::new("i_block[IND]", 88);
pub const DOUBLE_INDIRECT: Field<u32> = Field::new("i_block[DIND]", 92);
pub const TRIPLE_INDIRECT: Field<u32> = Field::new("i_block[TIND]", 96);
pub const SIZE_HI: Field<u32> = Field::new("i_size_high", 108);

// FileType enum
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    Unknown,
    RegularFile,
    Directory,
    CharDevice,
    BlockDevice,
    Fifo,
    Socket,
    Symlink,
}

// Inode struct

/// Parsed ext2 inode.
///
/// Timestamps are raw POSIX seconds. The indirect pointers are decoded but
/// never followed by this crate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inode {
    pub i_mode: u16,
    pub i_uid: u16,
    pub i_gid: u16,
    pub i_size_lo: u32,
    pub i_size_hi: u32,
    pub i_atime: u32,
    pub i_ctime: u32,
    pub i_mtime: u32,
    /// Zero means the inode is not deleted.
    pub i_dtime: u32,
    pub i_links_count: u16,
    /// In 512-byte units.
    pub i_blocks: u32,
    pub i_flags: u32,
    pub i_block: [u32; DIRECT_BLOCKS],
    pub i_indirect: u32,
    pub i_double_indirect: u32,
    pub i_triple_indirect: u32,
}

impl Inode {
    /// Parse an inode from the start of `raw`.
    ///
    /// `raw.len()` must be >= 128.
    pub fn parse(raw: &[u8]) -> Result<Inode> {
        Self::parse_at(raw, 0)
    }

    /// Parse the inode record starting at `raw[offset]`.
    pub fn parse_at(raw: &[u8], offset: usize) -> Result<Inode> {
        if raw.len() < offset + INODE_SIZE {
            return Err(Ext2Error::OutOfRange("inode record crosses block end"));
        }

        let mut i_block = [0u32; DIRECT_BLOCKS];
        for (i, ptr) in i_block.iter_mut().enumerate() {
            *ptr = BLOCK_POINTERS.read_at(raw, offset + i * 4)?;
        }

        Ok(Inode {
            i_mode: MODE.read_at(raw, offset)?,
            i_uid: UID.read_at(raw, offset)?,
            i_gid: GID.read_at(raw, offset)?,
            i_size_lo: SIZE_LO.read_at(raw, offset)?,
            i_size_hi: SIZE_HI.read_at(raw, offset)?,
            i_atime: ATIME.read_at(raw, offset)?,
            i_ctime: CTIME.read_at(raw, offset)?,
            i_mtime: MTIME.read_at(raw, offset)?,
            i_dtime: DTIME.read_at(raw, offset)?,
            i_links_count: LINKS_COUNT.read_at(raw, offset)?,
            i_blocks: BLOCKS.read_at(raw, offset)?,
            i_flags: FLAGS.read_at(raw, offset)?,
            i_block,
            i_indirect: INDIRECT.read_at(raw, offset)?,
            i_double_indirect: DOUBLE_INDIRECT.read_at(raw, offset)?,
            i_triple_indirect: TRIPLE_INDIRECT.read_at(raw, offset)?,
        })
    }

    /// Combined 64-bit size: `(size_hi << 32) | size_lo`.
    pub fn size(&self) -> u64 {
        ((self.i_size_hi as u64) << 32) | (self.i_size_lo as u64)
    }

    /// Deletion time, or `None` for a live inode.
    pub fn deletion_time(&self) -> Option<u32> {
        match self.i_dtime {
            0 => None,
            t => Some(t),
        }
    }

    pub fn is_deleted(&self) -> bool {
        self.i_dtime != 0
    }

    /// Direct block pointer `index` (0-based).
    pub fn block_pointer(&self, index: usize) -> Result<u32> {
        self.i_block
            .get(index)
            .copied()
            .ok_or(Ext2Error::OutOfRange("direct pointer index >= 12"))
    }

    /// Non-zero direct pointers in array order.
    pub fn direct_blocks(&self) -> impl Iterator<Item = u32> + '_ {
        self.i_block.iter().copied().filter(|&b| b != 0)
    }

    /// Whether any indirect pointer is set.
    pub fn has_indirect_blocks(&self) -> bool {
        self.i_indirect != 0 || self.i_double_indirect != 0 || self.i_triple_indirect != 0
    }

    /// Fail unless every data block is reachable through the direct pointers.
    pub fn check_direct_only(&self) -> Result<()> {
        if self.has_indirect_blocks() {
            return Err(Ext2Error::UnsupportedLayout("file uses indirect blocks"));
        }
        if self.size() > MAX_DIRECT_SIZE {
            return Err(Ext2Error::UnsupportedLayout(
                "file is larger than 12 direct blocks",
            ));
        }
        Ok(())
    }

    // File type helpers

    /// Determine the file type from `i_mode & S_IFMT`.
    pub fn file_type(&self) -> FileType {
        match self.i_mode & S_IFMT {
            S_IFREG => FileType::RegularFile,
            S_IFDIR => FileType::Directory,
            S_IFLNK => FileType::Symlink,
            S_IFCHR => FileType::CharDevice,
            S_IFBLK => FileType::BlockDevice,
            S_IFIFO => FileType::Fifo,
            S_IFSOCK => FileType::Socket,
            _ => FileType::Unknown,
        }
    }

    pub fn is_dir(&self) -> bool {
        self.i_mode & S_IFMT == S_IFDIR
    }

    pub fn is_file(&self) -> bool {
        self.i_mode & S_IFMT == S_IFREG
    }

    /// Permission bits (`i_mode & 0o7777`).
    pub fn permissions(&self) -> u16 {
        self.i_mode & 0o7777
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn put_u16(raw: &mut [u8], at: usize, v: u16) {
        raw[at..at + 2].copy_from_slice(&v.to_le_bytes());
    }

    fn put_u32(raw: &mut [u8], at: usize, v: u32) {
        raw[at..at + 4].copy_from_slice(&v.to_le_bytes());
    }

    fn sample_record() -> [u8; INODE_SIZE] {
        let mut raw = [0u8; INODE_SIZE];
        put_u16(&mut raw, 0, S_IFREG | 0o644);
        put_u16(&mut raw, 2, 1000);
        put_u32(&mut raw, 4, 1500);
        put_u32(&mut raw, 8, 1_400_000_000);
        put_u32(&mut raw, 12, 1_400_000_001);
        put_u32(&mut raw, 16, 1_400_000_002);
        put_u16(&mut raw, 24, 100);
        put_u16(&mut raw, 26, 1);
        put_u32(&mut raw, 28, 4);
        put_u32(&mut raw, 40, 40);
        put_u32(&mut raw, 44, 41);
        put_u32(&mut raw, 84, 99);
        raw
    }

    #[test]
    fn test_parse_fields() {
        let inode = Inode::parse(&sample_record()).unwrap();
        assert!(inode.is_file());
        assert_eq!(inode.file_type(), FileType::RegularFile);
        assert_eq!(inode.permissions(), 0o644);
        assert_eq!(inode.i_uid, 1000);
        assert_eq!(inode.i_gid, 100);
        assert_eq!(inode.size(), 1500);
        assert_eq!(inode.i_atime, 1_400_000_000);
        assert_eq!(inode.i_ctime, 1_400_000_001);
        assert_eq!(inode.i_mtime, 1_400_000_002);
        assert_eq!(inode.deletion_time(), None);
        assert_eq!(inode.i_links_count, 1);
        assert_eq!(inode.i_blocks, 4);
        assert_eq!(inode.block_pointer(0).unwrap(), 40);
        assert_eq!(inode.block_pointer(1).unwrap(), 41);
        assert_eq!(inode.block_pointer(11).unwrap(), 99);
        assert!(inode.block_pointer(12).is_err());
        assert_eq!(inode.direct_blocks().collect::<alloc::vec::Vec<_>>(), [40, 41, 99]);
    }

    #[test]
    fn test_parse_at_offset_and_upper_size() {
        let mut raw = [0u8; 2 * INODE_SIZE];
        raw[INODE_SIZE..].copy_from_slice(&sample_record());
        put_u32(&mut raw, INODE_SIZE + 20, 1_500_000_000);
        put_u32(&mut raw, INODE_SIZE + 108, 1);

        let inode = Inode::parse_at(&raw, INODE_SIZE).unwrap();
        assert_eq!(inode.size(), (1u64 << 32) | 1500);
        assert_eq!(inode.deletion_time(), Some(1_500_000_000));
        assert!(inode.is_deleted());
        assert!(Inode::parse_at(&raw, INODE_SIZE + 1).is_err());
    }

    #[test]
    fn test_direct_only_limit() {
        let mut raw = sample_record();
        assert!(Inode::parse(&raw).unwrap().check_direct_only().is_ok());

        put_u32(&mut raw, 88, 77);
        let inode = Inode::parse(&raw).unwrap();
        assert_eq!(inode.i_indirect, 77);
        assert_eq!(
            inode.check_direct_only(),
            Err(Ext2Error::UnsupportedLayout("file uses indirect blocks"))
        );

        let mut raw = sample_record();
        put_u32(&mut raw, 4, MAX_DIRECT_SIZE as u32 + 1);
        assert!(Inode::parse(&raw).unwrap().check_direct_only().is_err());

        put_u32(&mut raw, 92, 5);
        put_u32(&mut raw, 96, 6);
        let inode = Inode::parse(&raw).unwrap();
        assert_eq!((inode.i_double_indirect, inode.i_triple_indirect), (5, 6));
    }
}
