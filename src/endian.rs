//! Bounds-checked little-endian readers
//!
//! QQWry stores every multi-byte integer in little-endian order, either as
//! a full 4-byte value (IP addresses, header offsets) or as a 3-byte
//! pointer into the file. Each byte is treated as unsigned and the value is
//! assembled with shifts, so a 3-byte read never sign-extends its top byte.
//!
//! All readers return `None` when the read would run past the end of the
//! buffer; callers turn that into the error that fits their context.
//!
//! ```rust
//! use qqwry::endian::{read_u24_le, read_u32_le};
//!
//! let buffer = [0x78, 0x56, 0x34, 0x12, 0xff];
//! assert_eq!(read_u32_le(&buffer, 0), Some(0x12345678));
//! assert_eq!(read_u24_le(&buffer, 2), Some(0xff1234));
//! assert_eq!(read_u32_le(&buffer, 2), None);
//! ```

/// Read a u32 in little-endian format from buffer
#[inline(always)]
pub fn read_u32_le(buffer: &[u8], offset: usize) -> Option<u32> {
    let end = offset.checked_add(4)?;
    let bytes: [u8; 4] = buffer.get(offset..end)?.try_into().ok()?;
    Some(u32::from_le_bytes(bytes))
}

/// Read a 3-byte little-endian pointer from buffer
#[inline(always)]
pub fn read_u24_le(buffer: &[u8], offset: usize) -> Option<u32> {
    let end = offset.checked_add(3)?;
    let bytes = buffer.get(offset..end)?;
    Some(u24_from_le_bytes([bytes[0], bytes[1], bytes[2]]))
}

/// Combine three little-endian bytes into a u32 without sign extension
#[inline(always)]
pub const fn u24_from_le_bytes(bytes: [u8; 3]) -> u32 {
    (bytes[0] as u32) | ((bytes[1] as u32) << 8) | ((bytes[2] as u32) << 16)
}
