//! QQWry Binary Format
//!
//! ```text
//! ┌───────────────────────────────────────────┐
//! │ Header (8 bytes)                          │
//! │   index_begin: u32 LE                     │
//! │   index_end:   u32 LE (last entry offset) │
//! ├───────────────────────────────────────────┤
//! │ Record area                               │
//! │   ip_end: u32 LE                          │
//! │   mode-tagged country/region strings      │
//! ├───────────────────────────────────────────┤
//! │ Index table (7 bytes per entry)           │
//! │   ip_start:       u32 LE                  │
//! │   record_pointer: u24 LE                  │
//! └───────────────────────────────────────────┘
//! ```
//!
//! The header points at the first and the last index entry, so the table
//! holds `(index_end - index_begin) / 7 + 1` entries. Entries are sorted by
//! `ip_start`. Each record pointer targets a record block whose first four
//! bytes are the inclusive end of the range.

use crate::endian::u24_from_le_bytes;
use crate::error::{QqwryError, Result};
use std::mem;
use zerocopy::{FromBytes, Immutable, KnownLayout};

/// Size of the file header in bytes
pub const HEADER_SIZE: usize = 8;

/// Size of one index entry in bytes
pub const INDEX_ENTRY_SIZE: usize = 7;

/// Size of the `ip_end` field at the start of each record block
pub const RECORD_IP_END_SIZE: usize = 4;

/// On-disk header layout
#[repr(C)]
#[derive(Debug, Clone, Copy, FromBytes, Immutable, KnownLayout)]
pub struct RawHeader {
    /// Offset of the first index entry (LE)
    pub index_begin: [u8; 4],
    /// Offset of the last index entry (LE)
    pub index_end: [u8; 4],
}

/// On-disk index entry layout
#[repr(C)]
#[derive(Debug, Clone, Copy, FromBytes, Immutable, KnownLayout)]
pub struct RawIndexEntry {
    /// First address of the range (LE)
    pub ip_start: [u8; 4],
    /// Offset of the record block (LE, 3 bytes)
    pub record_pointer: [u8; 3],
}

impl RawIndexEntry {
    /// First address covered by this entry
    #[inline]
    pub fn ip_start(&self) -> u32 {
        u32::from_le_bytes(self.ip_start)
    }

    /// Offset of the record block this entry points to
    #[inline]
    pub fn record_pointer(&self) -> u32 {
        u24_from_le_bytes(self.record_pointer)
    }
}

/// Parsed and validated file header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    /// Offset of the first index entry
    pub index_begin: u32,
    /// Offset of the last index entry
    pub index_end: u32,
}

impl Header {
    /// Parse the header and check that the index table fits the buffer
    ///
    /// Checks, in order:
    /// 1. the buffer holds at least the 8-byte header
    /// 2. `index_begin <= index_end`
    /// 3. the index span is a whole number of 7-byte entries
    /// 4. the last entry ends within the buffer
    pub fn parse(data: &[u8]) -> Result<Self> {
        if data.len() < mem::size_of::<RawHeader>() {
            return Err(QqwryError::Format(format!(
                "File too small: {} bytes, need at least {}",
                data.len(),
                HEADER_SIZE
            )));
        }

        let (raw, _) = RawHeader::read_from_prefix(data)
            .map_err(|_| QqwryError::Format("Failed to read header".to_string()))?;
        let header = Header {
            index_begin: u32::from_le_bytes(raw.index_begin),
            index_end: u32::from_le_bytes(raw.index_end),
        };

        if header.index_begin > header.index_end {
            return Err(QqwryError::Format(format!(
                "Index begin {:#x} is past index end {:#x}",
                header.index_begin, header.index_end
            )));
        }

        let span = (header.index_end - header.index_begin) as usize;
        if span % INDEX_ENTRY_SIZE != 0 {
            return Err(QqwryError::Format(format!(
                "Index span {} is not a multiple of {}",
                span, INDEX_ENTRY_SIZE
            )));
        }

        if header.index_end as u64 + INDEX_ENTRY_SIZE as u64 > data.len() as u64 {
            return Err(QqwryError::Format(format!(
                "Index end {:#x} exceeds file size {}",
                header.index_end,
                data.len()
            )));
        }

        Ok(header)
    }

    /// Number of entries in the index table
    #[inline]
    pub fn index_count(&self) -> usize {
        (self.index_end - self.index_begin) as usize / INDEX_ENTRY_SIZE + 1
    }

    /// Byte range of the whole index table
    #[inline]
    pub fn index_range(&self) -> std::ops::Range<usize> {
        self.index_begin as usize..self.index_end as usize + INDEX_ENTRY_SIZE
    }
}

/// View the index table as a slice of raw entries
pub fn index_entries<'a>(data: &'a [u8], header: &Header) -> Result<&'a [RawIndexEntry]> {
    let bytes = data
        .get(header.index_range())
        .ok_or_else(|| QqwryError::Format("Index table out of bounds".to_string()))?;
    <[RawIndexEntry]>::ref_from_bytes(bytes)
        .map_err(|_| QqwryError::Format("Failed to read index table".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header_bytes(begin: u32, end: u32, len: usize) -> Vec<u8> {
        let mut data = vec![0u8; len];
        data[0..4].copy_from_slice(&begin.to_le_bytes());
        data[4..8].copy_from_slice(&end.to_le_bytes());
        data
    }

    #[test]
    fn test_raw_layout_sizes() {
        assert_eq!(mem::size_of::<RawHeader>(), HEADER_SIZE);
        assert_eq!(mem::size_of::<RawIndexEntry>(), INDEX_ENTRY_SIZE);
    }

    #[test]
    fn test_parse_valid_header() {
        let data = header_bytes(8, 15, 22);
        let header = Header::parse(&data).unwrap();
        assert_eq!(header.index_begin, 8);
        assert_eq!(header.index_end, 15);
        assert_eq!(header.index_count(), 2);
        assert_eq!(header.index_range(), 8..22);
    }

    #[test]
    fn test_too_small() {
        assert!(matches!(
            Header::parse(&[0u8; 7]),
            Err(QqwryError::Format(_))
        ));
    }

    #[test]
    fn test_begin_after_end() {
        let data = header_bytes(15, 8, 64);
        assert!(matches!(Header::parse(&data), Err(QqwryError::Format(_))));
    }

    #[test]
    fn test_span_not_multiple_of_entry_size() {
        let data = header_bytes(8, 16, 64);
        assert!(matches!(Header::parse(&data), Err(QqwryError::Format(_))));
    }

    #[test]
    fn test_index_past_end_of_file() {
        // Last entry would need bytes 15..22 but the buffer has 21
        let data = header_bytes(8, 15, 21);
        assert!(matches!(Header::parse(&data), Err(QqwryError::Format(_))));
    }

    #[test]
    fn test_index_entries_view() {
        let mut data = header_bytes(8, 15, 22);
        data[8..12].copy_from_slice(&0x0a00_0000u32.to_le_bytes());
        data[12..15].copy_from_slice(&[0x34, 0x12, 0xff]);
        let header = Header::parse(&data).unwrap();

        let entries = index_entries(&data, &header).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].ip_start(), 0x0a00_0000);
        assert_eq!(entries[0].record_pointer(), 0xff1234);
    }
}
