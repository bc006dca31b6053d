pub mod dir_entry;
pub mod field;
pub mod group_desc;
pub mod inode;
pub mod superblock;

/// Block size in bytes. Fixed for this layout.
pub const BLOCK_SIZE: usize = 1024;

/// On-disk inode record size in bytes.
pub const INODE_SIZE: usize = 128;

/// Inode records packed into one inode-table block.
pub const INODES_PER_BLOCK: usize = BLOCK_SIZE / INODE_SIZE;

/// Root directory inode number.
pub const ROOT_INO: u32 = 2;
