pub mod block;
pub mod block_reader;
pub mod image;
