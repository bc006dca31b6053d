use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use crate::error::{Ext2Error, Result};
use crate::io::block::Block;
use crate::layout::BLOCK_SIZE;
use crate::layout::dir_entry::{self, DIR_ENTRY_HEADER_SIZE, DirEntry, REC_LEN};

/// One row of a directory listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingEntry {
    pub type_char: char,
    pub rec_len: u16,
    pub name_len: u8,
    pub type_indicator: u8,
    pub name: String,
}

impl From<&DirEntry> for ListingEntry {
    fn from(entry: &DirEntry) -> Self {
        Self {
            type_char: entry.type_char(),
            rec_len: entry.rec_len,
            name_len: entry.name_len,
            type_indicator: entry.type_indicator,
            name: entry.name_string(),
        }
    }
}

/// Tab separated: type, record length, name length, type indicator, name.
impl fmt::Display for ListingEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}\t{}\t{}\t{}\t{}",
            self.type_char, self.rec_len, self.name_len, self.type_indicator, self.name
        )
    }
}

/// Directory reader over a directory's data blocks.
///
/// All data blocks are kept, but only the first one is scanned for entries.
/// Entries are numbered from 1 in on-disk order.
#[derive(Debug, Clone)]
pub struct DirectoryReader {
    blocks: Vec<Block>,
}

impl DirectoryReader {
    pub fn new(blocks: Vec<Block>) -> Self {
        Self { blocks }
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Number of data blocks loaded for the directory.
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Byte offsets of every entry in the scanned block.
    ///
    /// The walk stops when the offset reaches the block end or a record
    /// length of zero would leave it where it is.
    fn entry_offsets(&self) -> Result<Vec<usize>> {
        let mut offsets = Vec::new();
        let Some(block) = self.blocks.first() else {
            return Ok(offsets);
        };
        let raw = block.as_bytes();

        let mut offset = 0usize;
        while offset < BLOCK_SIZE {
            if offset + DIR_ENTRY_HEADER_SIZE > BLOCK_SIZE {
                return Err(Ext2Error::OutOfRange("dir entry header crosses block end"));
            }
            let rec_len = REC_LEN.read_at(raw, offset)? as usize;
            if rec_len == 0 {
                break;
            }
            if rec_len < DIR_ENTRY_HEADER_SIZE {
                return Err(Ext2Error::CorruptedFs("dir entry rec_len < 8"));
            }
            if offset + rec_len > BLOCK_SIZE {
                return Err(Ext2Error::OutOfRange("dir entry record runs past block end"));
            }
            offsets.push(offset);
            offset += rec_len;
        }

        Ok(offsets)
    }

    /// Number of entries in the scanned block.
    pub fn entry_count(&self) -> Result<usize> {
        Ok(self.entry_offsets()?.len())
    }

    /// Byte offset of entry `n`: the sum of the record lengths before it.
    pub fn offset(&self, n: usize) -> Result<usize> {
        if n == 0 {
            return Err(Ext2Error::OutOfRange("directory entries are numbered from 1"));
        }
        self.entry_offsets()?
            .get(n - 1)
            .copied()
            .ok_or(Ext2Error::OutOfRange("directory entry index past end"))
    }

    fn scanned_block(&self) -> Result<&[u8; BLOCK_SIZE]> {
        self.blocks
            .first()
            .map(Block::as_bytes)
            .ok_or(Ext2Error::OutOfRange("directory has no data blocks"))
    }

    /// Decode entry `n`.
    pub fn entry(&self, n: usize) -> Result<DirEntry> {
        let offset = self.offset(n)?;
        DirEntry::parse_at(self.scanned_block()?, offset)
    }

    pub fn inode_pointer(&self, n: usize) -> Result<u32> {
        Ok(self.entry(n)?.inode)
    }

    /// Record length of entry `n`.
    pub fn length(&self, n: usize) -> Result<u16> {
        Ok(self.entry(n)?.rec_len)
    }

    pub fn name_length(&self, n: usize) -> Result<u8> {
        Ok(self.entry(n)?.name_len)
    }

    pub fn type_indicator(&self, n: usize) -> Result<u8> {
        Ok(self.entry(n)?.type_indicator)
    }

    pub fn type_char(&self, n: usize) -> Result<char> {
        Ok(dir_entry::type_char(self.type_indicator(n)?))
    }

    /// Name of entry `n`, one `char` for each of its `name_length(n)` bytes.
    pub fn name(&self, n: usize) -> Result<String> {
        Ok(self.entry(n)?.name_string())
    }

    /// Raw name bytes of entry `n`.
    pub fn name_bytes(&self, n: usize) -> Result<Vec<u8>> {
        Ok(self.entry(n)?.name)
    }

    /// All entries in on-disk order.
    pub fn entries(&self) -> Result<Vec<DirEntry>> {
        let raw = match self.blocks.first() {
            Some(block) => block.as_bytes(),
            None => return Ok(Vec::new()),
        };
        self.entry_offsets()?
            .into_iter()
            .map(|offset| DirEntry::parse_at(raw, offset))
            .collect()
    }

    /// 1-based index of the live entry named exactly `name`.
    pub fn find(&self, name: &str) -> Result<Option<usize>> {
        Ok(self
            .entries()?
            .iter()
            .position(|e| !e.is_unused() && e.name_matches(name))
            .map(|idx| idx + 1))
    }

    /// Inode number of the live entry named exactly `name`.
    pub fn lookup(&self, name: &str) -> Result<u32> {
        self.entries()?
            .iter()
            .find(|e| !e.is_unused() && e.name_matches(name))
            .map(|e| e.inode)
            .ok_or(Ext2Error::NotFound)
    }

    pub fn listing(&self) -> Result<Vec<ListingEntry>> {
        Ok(self.entries()?.iter().map(ListingEntry::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use alloc::boxed::Box;
    use alloc::string::ToString;
    use alloc::vec;

    use super::*;

    fn put_entry(raw: &mut [u8], offset: usize, inode: u32, rec_len: u16, kind: u8, name: &[u8]) {
        raw[offset..offset + 4].copy_from_slice(&inode.to_le_bytes());
        raw[offset + 4..offset + 6].copy_from_slice(&rec_len.to_le_bytes());
        raw[offset + 6] = name.len() as u8;
        raw[offset + 7] = kind;
        raw[offset + 8..offset + 8 + name.len()].copy_from_slice(name);
    }

    fn reader_with(fill: impl FnOnce(&mut [u8])) -> DirectoryReader {
        let mut data = Box::new([0u8; BLOCK_SIZE]);
        fill(&mut data[..]);
        DirectoryReader::new(vec![Block::new(30, data)])
    }

    fn three_entries() -> DirectoryReader {
        reader_with(|raw| {
            put_entry(raw, 0, 2, 12, 2, b".");
            put_entry(raw, 12, 2, 16, 2, b"..");
            put_entry(raw, 28, 12, (BLOCK_SIZE - 28) as u16, 1, b"two-cities");
        })
    }

    #[test]
    fn test_three_entries_counted() {
        let dir = three_entries();
        assert_eq!(dir.entry_count().unwrap(), 3);
        assert_eq!(dir.name(2).unwrap(), "..");
        assert_eq!(dir.name(3).unwrap(), "two-cities");
    }

    #[test]
    fn test_offsets_are_cumulative_record_lengths() {
        let dir = three_entries();
        assert_eq!(dir.offset(1).unwrap(), 0);
        assert_eq!(dir.offset(2).unwrap(), 12);
        assert_eq!(dir.offset(3).unwrap(), 28);
        assert!(dir.offset(0).is_err());
        assert_eq!(
            dir.offset(4),
            Err(Ext2Error::OutOfRange("directory entry index past end"))
        );
    }

    #[test]
    fn test_field_accessors() {
        let dir = three_entries();
        assert_eq!(dir.inode_pointer(3).unwrap(), 12);
        assert_eq!(dir.length(3).unwrap() as usize, BLOCK_SIZE - 28);
        assert_eq!(dir.name_length(3).unwrap(), 10);
        assert_eq!(dir.type_indicator(3).unwrap(), 1);
        assert_eq!(dir.type_char(3).unwrap(), '-');
        assert_eq!(dir.type_char(1).unwrap(), 'd');
    }

    // Stepping once per entry, once past the last entry and once more on
    // exit, then subtracting two, gives the plain number of entries.
    #[test]
    fn test_count_matches_stepping_loop_minus_two() {
        let dir = three_entries();
        let mut num = 1;
        loop {
            let end = dir.offset(num).is_err();
            num += 1;
            if end {
                break;
            }
        }
        assert_eq!(num - 2, dir.entry_count().unwrap());
    }

    #[test]
    fn test_non_utf8_name_is_byte_exact() {
        let dir = reader_with(|raw| {
            put_entry(raw, 0, 2, 12, 2, b".");
            put_entry(raw, 12, 15, (BLOCK_SIZE - 12) as u16, 1, &[b'a', 0xC3, 0x28]);
        });
        assert_eq!(dir.name_bytes(2).unwrap(), [b'a', 0xC3, 0x28]);
        assert_eq!(dir.name(2).unwrap(), "a\u{c3}(");
        assert_eq!(dir.name(2).unwrap().chars().count(), dir.name_length(2).unwrap() as usize);

        let rows = dir.listing().unwrap();
        assert_eq!(rows[1].name, dir.name(2).unwrap());
        assert_eq!(rows[1].to_string(), "-\t1012\t3\t1\ta\u{c3}(");
    }

    #[test]
    fn test_zero_record_length_ends_directory() {
        let dir = reader_with(|raw| {
            put_entry(raw, 0, 2, 12, 2, b".");
            put_entry(raw, 12, 2, 12, 2, b"..");
        });
        assert_eq!(dir.entry_count().unwrap(), 2);
        assert_eq!(dir.name(2).unwrap(), "..");
    }

    #[test]
    fn test_record_shorter_than_header_is_corrupt() {
        let dir = reader_with(|raw| {
            put_entry(raw, 0, 2, 12, 2, b".");
            raw[12 + 4..12 + 6].copy_from_slice(&4u16.to_le_bytes());
        });
        assert_eq!(
            dir.entry_count(),
            Err(Ext2Error::CorruptedFs("dir entry rec_len < 8"))
        );
        assert!(dir.name(1).is_err());
    }

    #[test]
    fn test_record_past_block_end() {
        let dir = reader_with(|raw| {
            put_entry(raw, 0, 2, 12, 2, b".");
            put_entry(raw, 12, 2, BLOCK_SIZE as u16, 2, b"..");
        });
        assert_eq!(
            dir.entry_count(),
            Err(Ext2Error::OutOfRange("dir entry record runs past block end"))
        );
    }

    #[test]
    fn test_name_past_block_end() {
        let dir = reader_with(|raw| {
            put_entry(raw, 0, 2, (BLOCK_SIZE - 12) as u16, 2, b".");
            put_entry(raw, BLOCK_SIZE - 12, 11, 12, 1, b"abcd");
            raw[BLOCK_SIZE - 12 + 6] = 5;
        });
        assert_eq!(dir.entry_count().unwrap(), 2);
        assert_eq!(
            dir.name(2),
            Err(Ext2Error::OutOfRange("dir entry name crosses block end"))
        );
    }

    #[test]
    fn test_lookup_skips_unused_entries() {
        let dir = reader_with(|raw| {
            put_entry(raw, 0, 0, 20, 1, b"ghost");
            put_entry(raw, 20, 14, (BLOCK_SIZE - 20) as u16, 1, b"ghost");
        });
        assert_eq!(dir.find("ghost").unwrap(), Some(2));
        assert_eq!(dir.lookup("ghost").unwrap(), 14);
        assert_eq!(dir.lookup("missing"), Err(Ext2Error::NotFound));
        assert_eq!(dir.find("gho").unwrap(), None);
    }

    #[test]
    fn test_listing_rows() {
        let rows = three_entries().listing().unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].to_string(), "d\t12\t1\t2\t.");
        assert_eq!(rows[2].to_string(), "-\t996\t10\t1\ttwo-cities");
    }

    #[test]
    fn test_only_first_block_is_scanned() {
        let mut first = Box::new([0u8; BLOCK_SIZE]);
        put_entry(&mut first[..], 0, 2, BLOCK_SIZE as u16, 2, b".");
        let mut second = Box::new([0u8; BLOCK_SIZE]);
        put_entry(&mut second[..], 0, 20, BLOCK_SIZE as u16, 1, b"later");

        let dir = DirectoryReader::new(vec![Block::new(30, first), Block::new(31, second)]);
        assert_eq!(dir.block_count(), 2);
        assert_eq!(dir.blocks()[1].number(), 31);
        assert_eq!(dir.entry_count().unwrap(), 1);
        assert_eq!(dir.lookup("later"), Err(Ext2Error::NotFound));
    }

    #[test]
    fn test_empty_directory() {
        let dir = DirectoryReader::new(Vec::new());
        assert_eq!(dir.entry_count().unwrap(), 0);
        assert!(dir.entries().unwrap().is_empty());
        assert!(dir.entry(1).is_err());
    }
}
