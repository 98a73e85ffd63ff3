//! qqwry - Reader for QQWry IPv4 Geolocation Databases
//!
//! QQWry is a compact legacy file format that maps IPv4 address ranges to
//! a pair of GBK-encoded strings, usually a country (or province/city) and
//! a region (or ISP). This crate loads such a file, validates its layout,
//! and answers lookups with UTF-8 text.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use qqwry::Database;
//!
//! let db = Database::open("qqwry.dat")?;
//!
//! let (country, region) = db.find("1.2.3.4")?;
//! println!("{} / {}", country, region);
//!
//! // Not found is Ok(None), not an error
//! match db.lookup("8.8.8.8")? {
//!     Some(hit) => println!("{} - {}: {}", hit.range.start, hit.range.end, hit.location.country),
//!     None => println!("not found"),
//! }
//! # Ok::<(), qqwry::QqwryError>(())
//! ```
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────┐
//! │  bytes (Vec<u8> or mmap)             │
//! └──────────────────────────────────────┘
//!          ↓ Header::parse (bounds checks)
//!          ↓ IndexTable::build (starts, ends, record offsets)
//! ┌──────────────────────────────────────┐
//! │  Database (immutable, Send + Sync)   │
//! │   search: binary search over starts  │
//! │   decode: mode-tagged record strings │
//! │   transcode: GBK -> UTF-8            │
//! └──────────────────────────────────────┘
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

/// Strict dotted-decimal address parsing
pub mod address;
/// Unified database API
pub mod database;
pub mod endian;
/// Error types for loading and lookups
pub mod error;
pub mod format;
pub mod index;
pub mod record;
pub mod transcode;
pub mod validation;

/// Read-only QQWry database
pub use crate::database::{Database, Location, LookupResult};

pub use crate::error::{QqwryError, Result};
pub use crate::index::IpRange;
pub use crate::transcode::{Gbk, Transcoder, Utf8Lossy};

/// Library version string
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
