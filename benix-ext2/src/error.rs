use core::fmt;

/// Unified error type for benix-ext2.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ext2Error {
    /// Backing image is missing or cannot be opened
    ImageNotFound,
    /// Short read, or a read past the end of the image
    Io,
    /// Decoded offset or pointer falls outside a block, record or inode table
    OutOfRange(&'static str),
    /// Name lookup miss
    NotFound,
    /// Expected a directory inode but got another type
    NotDirectory,
    /// The on-disk layout needs something this reader does not do
    UnsupportedLayout(&'static str),
    /// Corrupted filesystem metadata
    CorruptedFs(&'static str),
}

impl fmt::Display for Ext2Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ext2Error::ImageNotFound => f.write_str("image not found or unreadable"),
            Ext2Error::Io => f.write_str("short read or read past end of image"),
            Ext2Error::OutOfRange(what) => write!(f, "out of range: {what}"),
            Ext2Error::NotFound => f.write_str("no such file"),
            Ext2Error::NotDirectory => f.write_str("not a directory"),
            Ext2Error::UnsupportedLayout(what) => write!(f, "unsupported layout: {what}"),
            Ext2Error::CorruptedFs(what) => write!(f, "corrupted filesystem: {what}"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Ext2Error {}

/// Convenience Result type alias.
pub type Result<T> = ::core::result::Result<T, Ext2Error>;
