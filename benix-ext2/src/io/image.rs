use alloc::vec::Vec;

use crate::error::{Ext2Error, Result};
use crate::layout::BLOCK_SIZE;
use crate::traits::block_device::BlockDevice;

/// Size of the boot area that precedes the superblock on a whole-disk dump.
pub const BOOT_AREA_SIZE: u64 = 1024;

/// Where block 1 begins inside the backing image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImageOrigin {
    /// Block 1 is the first 1024 bytes of the image.
    #[default]
    Volume,
    /// The image starts with a 1024-byte boot area, so block `n` sits at
    /// byte `n * 1024` like on a standard ext2 dump.
    Disk,
    /// Block 1 starts at an arbitrary byte offset.
    Offset(u64),
}

impl ImageOrigin {
    /// Byte offset of block 1.
    pub fn byte_offset(self) -> u64 {
        match self {
            ImageOrigin::Volume => 0,
            ImageOrigin::Disk => BOOT_AREA_SIZE,
            ImageOrigin::Offset(offset) => offset,
        }
    }

    /// Byte offset of `block_no`: `origin + (block_no - 1) * 1024`.
    ///
    /// An offset that does not fit in a `u64` lies past any image end and
    /// reads as [`Ext2Error::Io`].
    pub fn block_offset(self, block_no: u32) -> Result<u64> {
        if block_no == 0 {
            return Err(Ext2Error::OutOfRange("block 0 is reserved"));
        }
        (block_no as u64 - 1)
            .checked_mul(BLOCK_SIZE as u64)
            .and_then(|rel| self.byte_offset().checked_add(rel))
            .ok_or(Ext2Error::Io)
    }

    /// Whole blocks available in an image of `len` bytes.
    pub fn blocks_in(self, len: u64) -> u64 {
        len.saturating_sub(self.byte_offset()) / BLOCK_SIZE as u64
    }
}

/// Image held entirely in memory.
#[derive(Debug, Clone)]
pub struct MemoryImage {
    bytes: Vec<u8>,
    origin: ImageOrigin,
}

impl MemoryImage {
    pub fn new(bytes: Vec<u8>, origin: ImageOrigin) -> Self {
        Self { bytes, origin }
    }

    pub fn origin(&self) -> ImageOrigin {
        self.origin
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl BlockDevice for MemoryImage {
    fn read_block(&self, block_no: u32, buf: &mut [u8; BLOCK_SIZE]) -> Result<()> {
        let start = usize::try_from(self.origin.block_offset(block_no)?)
            .map_err(|_| Ext2Error::Io)?;
        let end = start.checked_add(BLOCK_SIZE).ok_or(Ext2Error::Io)?;
        let src = self.bytes.get(start..end).ok_or(Ext2Error::Io)?;
        buf.copy_from_slice(src);
        Ok(())
    }

    fn total_blocks(&self) -> u64 {
        self.origin.blocks_in(self.bytes.len() as u64)
    }
}

#[cfg(feature = "std")]
pub use stream::StreamImage;

#[cfg(feature = "std")]
mod stream {
    use std::cell::RefCell;
    use std::fs::File;
    use std::io::{Read, Seek, SeekFrom};
    use std::path::Path;

    use log::{debug, error, trace};

    use super::ImageOrigin;
    use crate::error::{Ext2Error, Result};
    use crate::layout::BLOCK_SIZE;
    use crate::traits::block_device::BlockDevice;

    /// Image served from any seekable byte stream, usually a [`File`].
    ///
    /// Every read seeks explicitly, so the stream position left behind by a
    /// previous read never matters.
    pub struct StreamImage<R: Read + Seek> {
        inner: RefCell<R>,
        len: u64,
        origin: ImageOrigin,
    }

    impl StreamImage<File> {
        /// Open an image file read-only.
        pub fn open<P: AsRef<Path>>(path: P, origin: ImageOrigin) -> Result<Self> {
            let path = path.as_ref();
            let file = File::open(path).map_err(|err| {
                error!("cannot open image {}: {}", path.display(), err);
                Ext2Error::ImageNotFound
            })?;
            debug!("opened image {}", path.display());
            Self::new(file, origin)
        }
    }

    impl<R: Read + Seek> StreamImage<R> {
        pub fn new(mut inner: R, origin: ImageOrigin) -> Result<Self> {
            let len = inner.seek(SeekFrom::End(0)).map_err(|_| Ext2Error::Io)?;
            Ok(Self {
                inner: RefCell::new(inner),
                len,
                origin,
            })
        }

        /// Image length in bytes.
        pub fn len(&self) -> u64 {
            self.len
        }

        pub fn is_empty(&self) -> bool {
            self.len == 0
        }

        pub fn origin(&self) -> ImageOrigin {
            self.origin
        }

        pub fn into_inner(self) -> R {
            self.inner.into_inner()
        }
    }

    impl<R: Read + Seek> BlockDevice for StreamImage<R> {
        fn read_block(&self, block_no: u32, buf: &mut [u8; BLOCK_SIZE]) -> Result<()> {
            let start = self.origin.block_offset(block_no)?;
            let end = start
                .checked_add(BLOCK_SIZE as u64)
                .ok_or(Ext2Error::Io)?;
            if end > self.len {
                return Err(Ext2Error::Io);
            }
            trace!("read block {} at byte {}", block_no, start);

            let mut inner = self.inner.borrow_mut();
            inner
                .seek(SeekFrom::Start(start))
                .map_err(|_| Ext2Error::Io)?;
            inner.read_exact(buf).map_err(|_| Ext2Error::Io)
        }

        fn total_blocks(&self) -> u64 {
            self.origin.blocks_in(self.len)
        }
    }
}
