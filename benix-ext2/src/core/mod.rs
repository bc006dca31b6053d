pub mod dir_reader;
pub mod file;
pub mod group_table;
pub mod inode_table;
pub mod volume;
