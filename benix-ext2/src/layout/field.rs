use core::marker::PhantomData;

use crate::error::{Ext2Error, Result};

/// A little-endian integer that can be stored in a fixed-width on-disk field.
pub trait LeValue: Sized + Copy {
    /// Width of the field in bytes.
    const WIDTH: usize;

    /// Decode from exactly `WIDTH` bytes.
    fn from_le(bytes: &[u8]) -> Self;
}

impl LeValue for u8 {
    const WIDTH: usize = 1;

    fn from_le(bytes: &[u8]) -> Self {
        bytes[0]
    }
}

impl LeValue for u16 {
    const WIDTH: usize = 2;

    fn from_le(bytes: &[u8]) -> Self {
        u16::from_le_bytes([bytes[0], bytes[1]])
    }
}

impl LeValue for u32 {
    const WIDTH: usize = 4;

    fn from_le(bytes: &[u8]) -> Self {
        u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
    }
}

/// Fixed-offset integer field inside an on-disk record.
///
/// Layouts are declared as tables of `Field` constants, and every decoder
/// goes through [`Field::read`] / [`Field::read_at`], so an out-of-bounds
/// offset is an error instead of a panic.
#[derive(Debug)]
pub struct Field<T> {
    pub name: &'static str,
    pub offset: usize,
    _value: PhantomData<T>,
}

impl<T> Clone for Field<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Field<T> {}

impl<T: LeValue> Field<T> {
    pub const fn new(name: &'static str, offset: usize) -> Self {
        Self {
            name,
            offset,
            _value: PhantomData,
        }
    }

    /// Width of the field in bytes.
    pub const fn width(&self) -> usize {
        T::WIDTH
    }

    /// One past the last byte of the field.
    pub const fn end(&self) -> usize {
        self.offset + T::WIDTH
    }

    /// Read the field from a record starting at `raw[0]`.
    pub fn read(&self, raw: &[u8]) -> Result<T> {
        self.read_at(raw, 0)
    }

    /// Read the field from a record starting at `raw[base]`.
    pub fn read_at(&self, raw: &[u8], base: usize) -> Result<T> {
        let start = base + self.offset;
        raw.get(start..start + T::WIDTH)
            .map(T::from_le)
            .ok_or(Ext2Error::OutOfRange(self.name))
    }
}

/// Fixed-offset raw byte span inside an on-disk record.
#[derive(Debug, Clone, Copy)]
pub struct ByteField {
    pub name: &'static str,
    pub offset: usize,
    pub len: usize,
}

impl ByteField {
    pub const fn new(name: &'static str, offset: usize, len: usize) -> Self {
        Self { name, offset, len }
    }

    pub fn read<'a>(&self, raw: &'a [u8]) -> Result<&'a [u8]> {
        self.read_at(raw, 0)
    }

    pub fn read_at<'a>(&self, raw: &'a [u8], base: usize) -> Result<&'a [u8]> {
        let start = base + self.offset;
        raw.get(start..start + self.len)
            .ok_or(Ext2Error::OutOfRange(self.name))
    }
}
