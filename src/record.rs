//! Record Decoding
//!
//! A record is two null-terminated strings, country then region, stored
//! behind a one-byte mode tag:
//!
//! ```text
//! 0x01 ptr24          redirect: the whole record lives at ptr24
//! 0x02 ptr24 <region> country is the string at ptr24, region follows
//! <country>\0<region> country inline, region follows its terminator
//! ```
//!
//! The region field is either `0x02 ptr24` (string at ptr24) or an inline
//! string. Redirects are followed once; a redirect target that starts with
//! another `0x01` is read as an inline string.
//!
//! Every tag, pointer and string scan is bounds-checked and reports
//! [`QqwryError::TruncatedRecord`] when it runs off the buffer.

use crate::endian::read_u24_le;
use crate::error::{QqwryError, Result};

/// Mode tag: the record continues at a 3-byte pointer
pub const MODE_REDIRECT: u8 = 0x01;

/// Mode tag: the string is stored at a 3-byte pointer
pub const MODE_INDIRECT: u8 = 0x02;

/// Layout of a record's country field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordLayout {
    /// Whole record moved to another offset
    Redirect(u32),
    /// Country string stored at another offset; region follows the pointer
    IndirectCountry(u32),
    /// Country string stored in place
    Inline,
}

impl RecordLayout {
    /// Read the mode tag at `offset`
    pub fn at(data: &[u8], offset: usize) -> Result<Self> {
        match tag_at(data, offset)? {
            MODE_REDIRECT => Ok(RecordLayout::Redirect(pointer_at(data, offset + 1)?)),
            MODE_INDIRECT => Ok(RecordLayout::IndirectCountry(pointer_at(data, offset + 1)?)),
            _ => Ok(RecordLayout::Inline),
        }
    }
}

/// Layout of a record's region field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionLayout {
    /// Region string stored at another offset
    Indirect(u32),
    /// Region string stored in place
    Inline,
}

impl RegionLayout {
    /// Read the region tag at `offset`
    pub fn at(data: &[u8], offset: usize) -> Result<Self> {
        match tag_at(data, offset)? {
            MODE_INDIRECT => Ok(RegionLayout::Indirect(pointer_at(data, offset + 1)?)),
            _ => Ok(RegionLayout::Inline),
        }
    }
}

/// Undecoded country/region bytes of one record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawRecord<'a> {
    /// Country bytes, without terminator
    pub country: &'a [u8],
    /// Region bytes, without terminator
    pub region: &'a [u8],
    /// The record was reached through a redirect
    pub redirected: bool,
    /// The country string was read through a pointer
    pub indirect_country: bool,
    /// The region string was read through a pointer
    pub indirect_region: bool,
}

/// Decoder over the raw database bytes
#[derive(Debug, Clone, Copy)]
pub struct RecordDecoder<'a> {
    data: &'a [u8],
}

impl<'a> RecordDecoder<'a> {
    /// Create a decoder over the full file buffer
    pub fn new(data: &'a [u8]) -> Self {
        Self { data }
    }

    /// Decode the record whose mode tag is at `offset`
    pub fn decode(&self, offset: usize) -> Result<RawRecord<'a>> {
        let mut offset = offset;
        let mut layout = RecordLayout::at(self.data, offset)?;
        let mut redirected = false;

        if let RecordLayout::Redirect(target) = layout {
            offset = target as usize;
            layout = RecordLayout::at(self.data, offset)?;
            redirected = true;
        }

        let (country, region_offset, indirect_country) = match layout {
            RecordLayout::IndirectCountry(pointer) => {
                (self.c_string(pointer as usize)?, offset + 4, true)
            }
            RecordLayout::Inline | RecordLayout::Redirect(_) => {
                let country = self.c_string(offset)?;
                (country, offset + country.len() + 1, false)
            }
        };

        let (region, indirect_region) = match RegionLayout::at(self.data, region_offset)? {
            RegionLayout::Indirect(pointer) => (self.c_string(pointer as usize)?, true),
            RegionLayout::Inline => (self.c_string(region_offset)?, false),
        };

        Ok(RawRecord {
            country,
            region,
            redirected,
            indirect_country,
            indirect_region,
        })
    }

    /// Bytes from `start` up to, not including, the next zero byte
    pub fn c_string(&self, start: usize) -> Result<&'a [u8]> {
        let tail = self
            .data
            .get(start..)
            .ok_or(QqwryError::TruncatedRecord { offset: start })?;
        let len = memchr::memchr(0, tail).ok_or(QqwryError::TruncatedRecord { offset: start })?;
        Ok(&tail[..len])
    }
}

fn tag_at(data: &[u8], offset: usize) -> Result<u8> {
    data.get(offset)
        .copied()
        .ok_or(QqwryError::TruncatedRecord { offset })
}

fn pointer_at(data: &[u8], offset: usize) -> Result<u32> {
    read_u24_le(data, offset).ok_or(QqwryError::TruncatedRecord { offset })
}
