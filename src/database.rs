//! QQWry Database API
//!
//! Loads a QQWry file from bytes or a memory map, validates the header,
//! decodes the index table once, and then answers IPv4 lookups with the
//! country and region strings of the matching range.
//!
//! The database is immutable after construction. Every lookup takes `&self`
//! and the type is `Send + Sync`, so a single instance can be shared across
//! threads behind an `Arc`.

use crate::address::parse_ipv4;
use crate::error::{QqwryError, Result};
use crate::format::Header;
use crate::index::{IndexTable, IpRange};
use crate::record::{RawRecord, RecordDecoder};
use crate::transcode::{Gbk, Transcoder};
use memmap2::Mmap;
use serde::Serialize;
use std::fmt;
use std::fs::File;
use std::net::Ipv4Addr;
use std::path::Path;

/// Country and region text of a record
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Location {
    /// Country (or top-level area) text
    pub country: String,
    /// Region (or ISP/area detail) text
    pub region: String,
}

impl Location {
    /// Split into a `(country, region)` tuple
    pub fn into_pair(self) -> (String, String) {
        (self.country, self.region)
    }
}

/// A matched index entry together with its decoded record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LookupResult {
    /// Position of the entry in the index table
    pub index: usize,
    /// Address range covered by the entry
    pub range: IpRange,
    /// Decoded record text
    pub location: Location,
}

/// Storage for database data - either owned or memory-mapped
enum DatabaseStorage {
    Owned(Vec<u8>),
    Mmap(Mmap),
}

impl DatabaseStorage {
    fn as_slice(&self) -> &[u8] {
        match self {
            DatabaseStorage::Owned(v) => v.as_slice(),
            DatabaseStorage::Mmap(m) => &m[..],
        }
    }
}

/// Read-only QQWry database
///
/// # Examples
///
/// ```no_run
/// use qqwry::Database;
///
/// let db = Database::open("qqwry.dat")?;
///
/// let (country, region) = db.find("8.8.8.8")?;
/// println!("{} {}", country, region);
///
/// if let Some(result) = db.lookup("1.1.1.1")? {
///     println!("{} - {}: {:?}", result.range.start, result.range.end, result.location);
/// }
/// # Ok::<(), qqwry::QqwryError>(())
/// ```
pub struct Database {
    data: DatabaseStorage,
    header: Header,
    index: IndexTable,
    transcoder: Box<dyn Transcoder>,
}

impl Database {
    /// Open a database file using memory mapping
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .map_err(|e| QqwryError::Io(format!("Failed to open {}: {}", path.display(), e)))?;

        // SAFETY: the map is read-only and never handed out mutably
        let mmap = unsafe { Mmap::map(&file) }
            .map_err(|e| QqwryError::Io(format!("Failed to mmap {}: {}", path.display(), e)))?;

        Self::from_storage(DatabaseStorage::Mmap(mmap))
    }

    /// Create a database from raw bytes
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        Self::from_storage(DatabaseStorage::Owned(data))
    }

    fn from_storage(storage: DatabaseStorage) -> Result<Self> {
        let data = storage.as_slice();
        let header = Header::parse(data)?;
        let index = IndexTable::build(data, &header)?;

        log::info!(
            "Loaded QQWry database: {} bytes, {} segments",
            data.len(),
            index.len()
        );

        Ok(Self {
            data: storage,
            header,
            index,
            transcoder: Box::new(Gbk),
        })
    }

    /// Replace the text transcoder (GBK by default)
    pub fn with_transcoder<T: Transcoder + 'static>(mut self, transcoder: T) -> Self {
        self.transcoder = Box::new(transcoder);
        self
    }

    /// Look up a dotted-decimal address and return `(country, region)`
    ///
    /// Addresses outside every range return two empty strings.
    pub fn find(&self, addr: &str) -> Result<(String, String)> {
        self.find_u32(parse_ipv4(addr)?)
    }

    /// Look up an [`Ipv4Addr`] and return `(country, region)`
    pub fn find_ip(&self, addr: Ipv4Addr) -> Result<(String, String)> {
        self.find_u32(u32::from(addr))
    }

    /// Look up a packed address and return `(country, region)`
    pub fn find_u32(&self, addr: u32) -> Result<(String, String)> {
        Ok(self
            .lookup_u32(addr)?
            .map(|r| r.location.into_pair())
            .unwrap_or_default())
    }

    /// Look up a dotted-decimal address
    ///
    /// Returns `Ok(Some(result))` if found, `Ok(None)` if not found.
    pub fn lookup(&self, addr: &str) -> Result<Option<LookupResult>> {
        self.lookup_u32(parse_ipv4(addr)?)
    }

    /// Look up an [`Ipv4Addr`]
    pub fn lookup_ip(&self, addr: Ipv4Addr) -> Result<Option<LookupResult>> {
        self.lookup_u32(u32::from(addr))
    }

    /// Look up a packed address
    pub fn lookup_u32(&self, addr: u32) -> Result<Option<LookupResult>> {
        match self.index.search(addr) {
            Some(i) => self.entry(i),
            None => Ok(None),
        }
    }

    /// Index of the range containing `addr`, if any
    pub fn search(&self, addr: u32) -> Option<usize> {
        self.index.search(addr)
    }

    /// Decode index entry `i`
    ///
    /// Returns `Ok(None)` when `i` is out of range.
    pub fn entry(&self, i: usize) -> Result<Option<LookupResult>> {
        let (range, offset) = match (self.index.range(i), self.index.record_offset(i)) {
            (Some(range), Some(offset)) => (range, offset),
            _ => return Ok(None),
        };

        let raw = self.decode_record(offset)?;
        Ok(Some(LookupResult {
            index: i,
            range,
            location: self.transcode(&raw),
        }))
    }

    /// Iterate over all index entries in file order
    pub fn entries(&self) -> impl Iterator<Item = Result<LookupResult>> + '_ {
        (0..self.index.len()).filter_map(move |i| self.entry(i).transpose())
    }

    /// Decode the raw record bytes at a record payload offset
    pub fn decode_record(&self, offset: usize) -> Result<RawRecord<'_>> {
        RecordDecoder::new(self.data.as_slice()).decode(offset)
    }

    fn transcode(&self, raw: &RawRecord<'_>) -> Location {
        Location {
            country: self.transcoder.transcode(raw.country),
            region: self.transcoder.transcode(raw.region),
        }
    }

    /// Number of index entries
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// True if the database holds no entries (never true for a parsed file)
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Parsed file header
    pub fn header(&self) -> &Header {
        &self.header
    }

    /// Offsets of the first and last index entries, as stored in the header
    pub fn index_bounds(&self) -> (u32, u32) {
        (self.header.index_begin, self.header.index_end)
    }

    /// Decoded index table
    pub fn index(&self) -> &IndexTable {
        &self.index
    }

    /// Size of the underlying buffer in bytes
    pub fn size(&self) -> usize {
        self.data.as_slice().len()
    }

    /// Underlying bytes
    pub fn as_bytes(&self) -> &[u8] {
        self.data.as_slice()
    }

    /// Name of the active transcoder
    pub fn encoding(&self) -> &'static str {
        self.transcoder.name()
    }

    /// Whether the database is backed by a memory map
    pub fn is_mmap(&self) -> bool {
        matches!(self.data, DatabaseStorage::Mmap(_))
    }
}

impl fmt::Debug for Database {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Database")
            .field("size", &self.size())
            .field("header", &self.header)
            .field("entries", &self.index.len())
            .field("encoding", &self.transcoder.name())
            .field("mmap", &self.is_mmap())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcode::Utf8Lossy;
    use std::io::Write;

    /// One entry: 10.0.0.0 - 10.255.255.255 -> ("US", "CA")
    fn single_entry_db() -> Vec<u8> {
        let mut data = Vec::new();
        data.extend_from_slice(&8u32.to_le_bytes()); // index_begin
        data.extend_from_slice(&8u32.to_le_bytes()); // index_end
        data.extend_from_slice(&0x0a00_0000u32.to_le_bytes());
        data.extend_from_slice(&[15, 0, 0]);
        data.extend_from_slice(&0x0aff_ffffu32.to_le_bytes());
        data.extend_from_slice(b"US\0CA\0");
        data
    }

    #[test]
    fn test_find_single_entry() {
        let db = Database::from_bytes(single_entry_db()).unwrap();
        assert_eq!(db.len(), 1);
        assert_eq!(db.index_bounds(), (8, 8));
        assert_eq!(
            db.find("10.0.0.5").unwrap(),
            ("US".to_string(), "CA".to_string())
        );
        assert_eq!(db.find("11.0.0.1").unwrap(), (String::new(), String::new()));
    }

    #[test]
    fn test_lookup_reports_range() {
        let db = Database::from_bytes(single_entry_db()).unwrap();
        let result = db.lookup("10.20.30.40").unwrap().unwrap();
        assert_eq!(result.index, 0);
        assert_eq!(result.range.start, Ipv4Addr::new(10, 0, 0, 0));
        assert_eq!(result.range.end, Ipv4Addr::new(10, 255, 255, 255));
        assert_eq!(result.location.country, "US");

        assert!(db.lookup("9.255.255.255").unwrap().is_none());
        assert!(db.lookup_ip(Ipv4Addr::new(11, 0, 0, 0)).unwrap().is_none());
    }

    #[test]
    fn test_address_extremes() {
        let db = Database::from_bytes(single_entry_db()).unwrap();
        let none = (String::new(), String::new());
        assert_eq!(db.find("0.0.0.0").unwrap(), none);
        assert_eq!(db.find("255.255.255.255").unwrap(), none);
        assert_eq!(db.find_u32(0).unwrap(), none);
        assert_eq!(db.find_u32(u32::MAX).unwrap(), none);
    }

    #[test]
    fn test_invalid_address_leaves_db_usable() {
        let db = Database::from_bytes(single_entry_db()).unwrap();
        assert!(matches!(
            db.find("10.0.0"),
            Err(QqwryError::InvalidAddress(_))
        ));
        assert_eq!(db.find("10.0.0.1").unwrap().0, "US");
    }

    #[test]
    fn test_malformed_header_rejected() {
        let mut data = single_entry_db();
        data[0..4].copy_from_slice(&15u32.to_le_bytes());
        assert!(matches!(
            Database::from_bytes(data),
            Err(QqwryError::Format(_))
        ));

        assert!(matches!(
            Database::from_bytes(vec![0; 4]),
            Err(QqwryError::Format(_))
        ));
    }

    #[test]
    fn test_truncated_record_is_per_query() {
        let mut data = single_entry_db();
        // Drop the region terminator
        data.pop();
        let db = Database::from_bytes(data).unwrap();
        assert!(matches!(
            db.find("10.0.0.1"),
            Err(QqwryError::TruncatedRecord { .. })
        ));
        assert_eq!(db.find("12.0.0.1").unwrap(), (String::new(), String::new()));
    }

    #[test]
    fn test_with_transcoder() {
        let mut data = single_entry_db();
        data.truncate(data.len() - 6);
        data.extend_from_slice("美国\0加州\0".as_bytes());

        let db = Database::from_bytes(data).unwrap().with_transcoder(Utf8Lossy);
        assert_eq!(db.encoding(), "utf-8");
        assert_eq!(
            db.find("10.1.1.1").unwrap(),
            ("美国".to_string(), "加州".to_string())
        );
    }

    #[test]
    fn test_entries_and_out_of_range_entry() {
        let db = Database::from_bytes(single_entry_db()).unwrap();
        let entries: Vec<_> = db.entries().collect::<Result<_>>().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].location.region, "CA");
        assert!(db.entry(1).unwrap().is_none());
    }

    #[test]
    fn test_open_mmap() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&single_entry_db()).unwrap();
        file.flush().unwrap();

        let db = Database::open(file.path()).unwrap();
        assert!(db.is_mmap());
        assert_eq!(db.size(), single_entry_db().len());
        assert_eq!(db.find("10.0.0.5").unwrap().1, "CA");
    }

    #[test]
    fn test_open_missing_file() {
        assert!(matches!(
            Database::open("/nonexistent/qqwry.dat"),
            Err(QqwryError::Io(_))
        ));
    }

    #[test]
    fn test_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Database>();
    }
}
