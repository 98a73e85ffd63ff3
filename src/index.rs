//! Sorted Range Index
//!
//! The index table is decoded once at load time into three parallel arrays:
//! range starts, range ends, and record offsets. Lookups are a binary search
//! over the starts followed by a bounds check against the matching end, so a
//! query never touches the raw index bytes again.

use crate::endian::read_u32_le;
use crate::error::{QqwryError, Result};
use crate::format::{index_entries, Header, RECORD_IP_END_SIZE};
use serde::Serialize;
use std::net::Ipv4Addr;

/// Inclusive IPv4 address range covered by one index entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IpRange {
    /// First address in the range
    pub start: Ipv4Addr,
    /// Last address in the range
    pub end: Ipv4Addr,
}

impl IpRange {
    /// Check whether the range contains an address
    pub fn contains(&self, addr: Ipv4Addr) -> bool {
        self.start <= addr && addr <= self.end
    }
}

/// Decoded index table
///
/// All three vectors have the same length and are aligned by position.
#[derive(Debug, Clone)]
pub struct IndexTable {
    starts: Vec<u32>,
    ends: Vec<u32>,
    record_offsets: Vec<u32>,
}

impl IndexTable {
    /// Decode every index entry in file order
    ///
    /// Each entry's record pointer is dereferenced to read the range end.
    /// A pointer whose end field lies outside the buffer fails the whole
    /// build.
    pub fn build(data: &[u8], header: &Header) -> Result<Self> {
        let entries = index_entries(data, header)?;
        let count = entries.len();

        let mut starts = Vec::with_capacity(count);
        let mut ends = Vec::with_capacity(count);
        let mut record_offsets = Vec::with_capacity(count);

        for (i, entry) in entries.iter().enumerate() {
            let pointer = entry.record_pointer();
            let ip_end = read_u32_le(data, pointer as usize).ok_or_else(|| {
                QqwryError::Format(format!(
                    "Index entry {} points to {:#x}, past end of file ({} bytes)",
                    i,
                    pointer,
                    data.len()
                ))
            })?;

            starts.push(entry.ip_start());
            ends.push(ip_end);
            record_offsets.push(pointer + RECORD_IP_END_SIZE as u32);
        }

        Ok(Self {
            starts,
            ends,
            record_offsets,
        })
    }

    /// Find the entry whose range contains `addr`
    ///
    /// Takes the last entry whose start is `<= addr` (one before the first
    /// start greater than `addr`) and accepts it only if `addr` is also
    /// within its end. Addresses in gaps between ranges return `None`.
    pub fn search(&self, addr: u32) -> Option<usize> {
        let candidate = self.starts.partition_point(|&start| start <= addr);
        let candidate = candidate.checked_sub(1)?;

        if self.starts[candidate] <= addr && addr <= self.ends[candidate] {
            Some(candidate)
        } else {
            None
        }
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.starts.len()
    }

    /// True if the table has no entries
    pub fn is_empty(&self) -> bool {
        self.starts.is_empty()
    }

    /// Range of entry `i`
    pub fn range(&self, i: usize) -> Option<IpRange> {
        Some(IpRange {
            start: Ipv4Addr::from(*self.starts.get(i)?),
            end: Ipv4Addr::from(*self.ends.get(i)?),
        })
    }

    /// Record payload offset of entry `i` (just past its end field)
    pub fn record_offset(&self, i: usize) -> Option<usize> {
        self.record_offsets.get(i).map(|&o| o as usize)
    }

    /// Raw start value of entry `i`
    pub fn start(&self, i: usize) -> Option<u32> {
        self.starts.get(i).copied()
    }

    /// Raw end value of entry `i`
    pub fn end(&self, i: usize) -> Option<u32> {
        self.ends.get(i).copied()
    }
}
