//! Synthetic QQWry buffers for tests
//!
//! Layout produced by [`FixtureBuilder::build`]:
//! header, then every string/record/range block in insertion order, then
//! the index table in the order ranges were added.

#![allow(dead_code)]

use std::net::Ipv4Addr;

/// GBK bytes for "中国"
pub const GBK_CHINA: &[u8] = &[0xD6, 0xD0, 0xB9, 0xFA];

/// GBK bytes for "北京"
pub const GBK_BEIJING: &[u8] = &[0xB1, 0xB1, 0xBE, 0xA9];

/// Region field of a record
#[derive(Debug, Clone, Copy)]
pub enum Region<'a> {
    /// Null-terminated string stored in place
    Inline(&'a [u8]),
    /// `0x02` + pointer to a string
    Indirect(u32),
}

/// Record body, starting at its mode tag
#[derive(Debug, Clone, Copy)]
pub enum Record<'a> {
    /// Country string in place, then the region field
    Inline(&'a [u8], Region<'a>),
    /// `0x02` + pointer to the country string, then the region field
    IndirectCountry(u32, Region<'a>),
    /// `0x01` + pointer to another record body
    Redirect(u32),
}

/// Parse a dotted-decimal address into its packed value
pub fn ip(s: &str) -> u32 {
    u32::from(s.parse::<Ipv4Addr>().unwrap())
}

#[derive(Debug)]
pub struct FixtureBuilder {
    data: Vec<u8>,
    index: Vec<(u32, u32)>,
}

impl FixtureBuilder {
    pub fn new() -> Self {
        Self {
            data: vec![0u8; 8],
            index: Vec::new(),
        }
    }

    /// Append raw bytes, returning their offset
    pub fn raw(&mut self, bytes: &[u8]) -> u32 {
        let offset = self.data.len() as u32;
        self.data.extend_from_slice(bytes);
        offset
    }

    /// Append a null-terminated string, returning its offset
    pub fn string(&mut self, s: &[u8]) -> u32 {
        let offset = self.raw(s);
        self.data.push(0);
        offset
    }

    /// Append a record body without a range, returning the offset of its tag
    pub fn record(&mut self, record: Record<'_>) -> u32 {
        let offset = self.data.len() as u32;
        match record {
            Record::Inline(country, region) => {
                self.string(country);
                self.region(region);
            }
            Record::IndirectCountry(pointer, region) => {
                self.tagged(0x02, pointer);
                self.region(region);
            }
            Record::Redirect(pointer) => self.tagged(0x01, pointer),
        }
        offset
    }

    /// Append a record block for `start..=end` and its index entry
    pub fn range(&mut self, start: u32, end: u32, record: Record<'_>) -> &mut Self {
        let pointer = self.raw(&end.to_le_bytes());
        self.record(record);
        self.index.push((start, pointer));
        self
    }

    /// Shorthand for a range with inline country and region
    pub fn inline_range(
        &mut self,
        start: u32,
        end: u32,
        country: &str,
        region: &str,
    ) -> &mut Self {
        self.range(
            start,
            end,
            Record::Inline(country.as_bytes(), Region::Inline(region.as_bytes())),
        )
    }

    /// Write the index table and header
    pub fn build(&self) -> Vec<u8> {
        assert!(!self.index.is_empty(), "a QQWry file needs at least one entry");

        let mut data = self.data.clone();
        let index_begin = data.len() as u32;
        for (start, pointer) in &self.index {
            data.extend_from_slice(&start.to_le_bytes());
            data.extend_from_slice(&pointer.to_le_bytes()[..3]);
        }
        let index_end = index_begin + 7 * (self.index.len() as u32 - 1);

        data[0..4].copy_from_slice(&index_begin.to_le_bytes());
        data[4..8].copy_from_slice(&index_end.to_le_bytes());
        data
    }

    fn region(&mut self, region: Region<'_>) {
        match region {
            Region::Inline(s) => {
                self.string(s);
            }
            Region::Indirect(pointer) => self.tagged(0x02, pointer),
        }
    }

    fn tagged(&mut self, tag: u8, pointer: u32) {
        assert!(pointer <= 0x00ff_ffff, "pointer does not fit in 3 bytes");
        self.data.push(tag);
        self.data.extend_from_slice(&pointer.to_le_bytes()[..3]);
    }
}

/// Ranges covering the whole IPv4 space with inline ASCII records
pub fn contiguous_fixture() -> Vec<u8> {
    let mut b = FixtureBuilder::new();
    b.inline_range(ip("0.0.0.0"), ip("0.255.255.255"), "IANA", "reserved")
        .inline_range(ip("1.0.0.0"), ip("9.255.255.255"), "APNIC", "")
        .inline_range(ip("10.0.0.0"), ip("10.255.255.255"), "LAN", "private")
        .inline_range(ip("11.0.0.0"), ip("255.255.255.254"), "WORLD", "public")
        .inline_range(ip("255.255.255.255"), ip("255.255.255.255"), "BCAST", "");
    b.build()
}
