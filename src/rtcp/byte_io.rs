//! Big-endian fixed-width reads and writes at an offset.
//!
//! Thin layer over `byteorder` so every codec reads the wire the same way.
//! Callers are expected to have checked lengths; out-of-range offsets panic
//! like any slice index would.

use byteorder::{BigEndian, ByteOrder};

#[inline]
pub fn read_u8(buf: &[u8], at: usize) -> u8 {
    buf[at]
}

#[inline]
pub fn read_u16(buf: &[u8], at: usize) -> u16 {
    BigEndian::read_u16(&buf[at..at + 2])
}

/// Reads a 3-byte big-endian value into the low 24 bits of a `u32`.
#[inline]
pub fn read_u24(buf: &[u8], at: usize) -> u32 {
    BigEndian::read_u24(&buf[at..at + 3])
}

#[inline]
pub fn read_u32(buf: &[u8], at: usize) -> u32 {
    BigEndian::read_u32(&buf[at..at + 4])
}

#[inline]
pub fn write_u8(buf: &mut [u8], at: usize, value: u8) {
    buf[at] = value;
}

#[inline]
pub fn write_u16(buf: &mut [u8], at: usize, value: u16) {
    BigEndian::write_u16(&mut buf[at..at + 2], value);
}

/// Writes the low 24 bits of `value`. Higher bits must be zero.
#[inline]
pub fn write_u24(buf: &mut [u8], at: usize, value: u32) {
    debug_assert!(value <= 0x00FF_FFFF, "value does not fit in 24 bits");
    BigEndian::write_u24(&mut buf[at..at + 3], value);
}

#[inline]
pub fn write_u32(buf: &mut [u8], at: usize, value: u32) {
    BigEndian::write_u32(&mut buf[at..at + 4], value);
}
