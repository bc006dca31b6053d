use alloc::string::String;
use alloc::vec::Vec;

use super::field::Field;
use crate::error::{Ext2Error, Result};

/// Size of the fixed part of a directory entry (before the name).
pub const DIR_ENTRY_HEADER_SIZE: usize = 8;

pub const INODE: Field<u32> = Field::new("inode", 0);
pub const REC_LEN: Field<u16> = Field::new("rec_len", 4);
pub const NAME_LEN: Field<u8> = Field::new("name_len", 6);
pub const FILE_TYPE: Field<u8> = Field::new("file_type", 7);
/// Offset of the name bytes inside the entry.
pub const NAME_OFFSET: usize = 8;

/// ext2 directory entry file type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    Unknown = 0,
    RegularFile = 1,
    Directory = 2,
    CharDevice = 3,
    BlockDevice = 4,
    Fifo = 5,
    Socket = 6,
    Symlink = 7,
}

impl FileType {
    pub fn from_u8(v: u8) -> Self {
        match v {
            1 => FileType::RegularFile,
            2 => FileType::Directory,
            3 => FileType::CharDevice,
            4 => FileType::BlockDevice,
            5 => FileType::Fifo,
            6 => FileType::Socket,
            7 => FileType::Symlink,
            _ => FileType::Unknown,
        }
    }
}

/// Listing character for a raw type indicator: `-` file, `d` directory.
pub fn type_char(indicator: u8) -> char {
    match indicator {
        1 => '-',
        2 => 'd',
        _ => ' ',
    }
}

/// Parsed ext2 directory entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub inode: u32,
    pub rec_len: u16,
    pub name_len: u8,
    pub type_indicator: u8,
    /// Exactly `name_len` raw bytes.
    pub name: Vec<u8>,
}

impl DirEntry {
    /// Parse the entry starting at `raw[offset]`.
    ///
    /// The header and the name must both end inside `raw`. The returned
    /// `rec_len` tells the caller how far to advance.
    pub fn parse_at(raw: &[u8], offset: usize) -> Result<Self> {
        if offset + DIR_ENTRY_HEADER_SIZE > raw.len() {
            return Err(Ext2Error::OutOfRange("dir entry header crosses block end"));
        }

        let inode = INODE.read_at(raw, offset)?;
        let rec_len = REC_LEN.read_at(raw, offset)?;
        let name_len = NAME_LEN.read_at(raw, offset)?;
        let type_indicator = FILE_TYPE.read_at(raw, offset)?;

        let name_start = offset + NAME_OFFSET;
        let name = raw
            .get(name_start..name_start + name_len as usize)
            .ok_or(Ext2Error::OutOfRange("dir entry name crosses block end"))?
            .to_vec();

        Ok(DirEntry {
            inode,
            rec_len,
            name_len,
            type_indicator,
            name,
        })
    }

    pub fn file_type(&self) -> FileType {
        FileType::from_u8(self.type_indicator)
    }

    /// `-`, `d` or a blank.
    pub fn type_char(&self) -> char {
        type_char(self.type_indicator)
    }

    /// Name as text, one `char` per on-disk byte.
    ///
    /// Decoded the same way as the volume label, so no byte is ever
    /// replaced and `name_string().chars().count() == name_len`.
    pub fn name_string(&self) -> String {
        self.name.iter().map(|&b| b as char).collect()
    }

    pub fn name_matches(&self, name: &str) -> bool {
        self.name == name.as_bytes()
    }

    pub fn is_unused(&self) -> bool {
        self.inode == 0
    }

    pub fn is_dot_or_dotdot(&self) -> bool {
        self.name == b"." || self.name == b".."
    }
}
