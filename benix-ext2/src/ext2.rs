#![cfg_attr(not(any(test, feature = "std")), no_std)]

extern crate alloc;

pub mod error;
pub mod io;
pub mod layout;
pub mod traits;

// `core/` would shadow the `core` crate as a module name.
#[path = "core/mod.rs"]
pub mod fs_core;

#[cfg(test)]
mod tests;

// Re-exports
pub use error::{Ext2Error, Result};
pub use fs_core::dir_reader::{DirectoryReader, ListingEntry};
pub use fs_core::file::Ext2File;
pub use fs_core::group_table::GroupTable;
pub use fs_core::inode_table::{InodeLocation, InodeTable};
pub use fs_core::volume::Volume;
pub use io::block::Block;
pub use io::block_reader::BlockReader;
#[cfg(feature = "std")]
pub use io::image::StreamImage;
pub use io::image::{ImageOrigin, MemoryImage};
pub use layout::dir_entry::{DirEntry, FileType as DirEntryFileType};
pub use layout::group_desc::GroupDescriptor;
pub use layout::inode::{FileType, Inode};
pub use layout::superblock::SuperBlock;
pub use layout::{BLOCK_SIZE, ROOT_INO};
pub use traits::block_device::BlockDevice;
