use benix_ext2::ImageOrigin;

/// Image opened when `--image` is not given
pub const DEFAULT_IMAGE_PATH: &str = "../ext2fs";

/// Image files on disk are whole-volume dumps with the boot area in front
pub const DEFAULT_ORIGIN: ImageOrigin = ImageOrigin::Disk;

// Default run: list the root, read a file, list a subdirectory

/// File read by the default run
pub const DEMO_FILE: &str = "two-cities";

/// Directory listed by the default run
pub const DEMO_DIR: &str = "lost+found";

/// Bytes per hex dump line
pub const DUMP_LINE_BYTES: usize = 16;
