//! Database validation for untrusted QQWry files
//!
//! Loading a database only checks the header and that every index pointer
//! lands inside the file. Lookups then assume the rest: ranges sorted by
//! start, no overlaps, every record decodable. This module checks those
//! assumptions up front and reports what it finds.
//!
//! # Usage
//!
//! ```rust,no_run
//! use qqwry::validation::{validate_database, ValidationLevel};
//! use std::path::Path;
//!
//! let report = validate_database(Path::new("qqwry.dat"), ValidationLevel::Strict)?;
//!
//! if report.is_valid() {
//!     println!("✓ Database is safe to use");
//! } else {
//!     println!("✗ Validation failed:");
//!     for error in &report.errors {
//!         println!("  - {}", error);
//!     }
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use crate::endian::read_u32_le;
use crate::error::{QqwryError, Result};
use crate::format::{index_entries, Header, RECORD_IP_END_SIZE};
use crate::record::RecordDecoder;
use encoding_rs::GBK;
use serde::Serialize;
use std::net::Ipv4Addr;
use std::path::Path;
use std::str::FromStr;

/// Findings reported per category before further ones are only counted
const MAX_REPORTED: usize = 20;

/// Validation strictness level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationLevel {
    /// Header, index pointers, range ordering, overlaps and gaps
    Standard,
    /// Standard plus decoding of every record (default)
    Strict,
}

impl ValidationLevel {
    /// Lowercase name, as accepted by [`str::parse`]
    pub fn as_str(&self) -> &'static str {
        match self {
            ValidationLevel::Standard => "standard",
            ValidationLevel::Strict => "strict",
        }
    }
}

impl FromStr for ValidationLevel {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "standard" => Ok(ValidationLevel::Standard),
            "strict" => Ok(ValidationLevel::Strict),
            _ => Err(format!(
                "Invalid validation level '{}', expected standard or strict",
                s
            )),
        }
    }
}

/// Validation report with detailed findings
#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationReport {
    /// Critical errors that make lookups unreliable
    pub errors: Vec<String>,
    /// Warnings about potential issues (non-fatal)
    pub warnings: Vec<String>,
    /// Informational messages about database properties
    pub info: Vec<String>,
    /// Database statistics
    pub stats: DatabaseStats,
    #[serde(skip)]
    suppressed_errors: usize,
    #[serde(skip)]
    suppressed_warnings: usize,
}

/// Database statistics gathered during validation
#[derive(Debug, Clone, Default, Serialize)]
pub struct DatabaseStats {
    /// File size in bytes
    pub file_size: usize,
    /// Offset of the first index entry
    pub index_begin: u32,
    /// Offset of the last index entry
    pub index_end: u32,
    /// Number of index entries
    pub entry_count: usize,
    /// Number of gaps between consecutive ranges
    pub gap_count: usize,
    /// Number of addresses covered by some range
    pub covered_addresses: u64,
    /// Records reached through a redirect
    pub redirect_records: usize,
    /// Country strings read through a pointer
    pub indirect_countries: usize,
    /// Region strings read through a pointer
    pub indirect_regions: usize,
    /// Records that failed to decode
    pub undecodable_records: usize,
    /// Strings that are not valid GBK
    pub invalid_text: usize,
}

impl ValidationReport {
    fn new() -> Self {
        Self::default()
    }

    /// Check if database passed all validations (no errors)
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty() && self.suppressed_errors == 0
    }

    /// Total number of errors, including ones not listed individually
    pub fn error_count(&self) -> usize {
        self.errors.len() + self.suppressed_errors
    }

    /// Total number of warnings, including ones not listed individually
    pub fn warning_count(&self) -> usize {
        self.warnings.len() + self.suppressed_warnings
    }

    fn error(&mut self, msg: impl Into<String>) {
        if self.errors.len() < MAX_REPORTED {
            self.errors.push(msg.into());
        } else {
            self.suppressed_errors += 1;
        }
    }

    fn warning(&mut self, msg: impl Into<String>) {
        if self.warnings.len() < MAX_REPORTED {
            self.warnings.push(msg.into());
        } else {
            self.suppressed_warnings += 1;
        }
    }

    fn info(&mut self, msg: impl Into<String>) {
        self.info.push(msg.into());
    }

    fn finish(mut self) -> Self {
        if self.suppressed_errors > 0 {
            let msg = format!("{} more error(s) not listed", self.suppressed_errors);
            self.info(msg);
        }
        if self.suppressed_warnings > 0 {
            let msg = format!("{} more warning(s) not listed", self.suppressed_warnings);
            self.info(msg);
        }
        self
    }
}

/// Validate a database file
///
/// I/O failures are returned as errors; problems with the file contents
/// are recorded in the report.
pub fn validate_database(path: &Path, level: ValidationLevel) -> Result<ValidationReport> {
    let buffer = std::fs::read(path)
        .map_err(|e| QqwryError::Io(format!("Failed to read {}: {}", path.display(), e)))?;
    Ok(validate_bytes(&buffer, level))
}

/// Validate an in-memory database
pub fn validate_bytes(buffer: &[u8], level: ValidationLevel) -> ValidationReport {
    let mut report = ValidationReport::new();
    report.stats.file_size = buffer.len();
    report.info(format!(
        "File size: {} bytes ({} KB)",
        buffer.len(),
        buffer.len() / 1024
    ));

    let header = match Header::parse(buffer) {
        Ok(h) => h,
        Err(e) => {
            report.error(format!("Invalid header: {}", e));
            return report.finish();
        }
    };
    report.stats.index_begin = header.index_begin;
    report.stats.index_end = header.index_end;
    report.stats.entry_count = header.index_count();
    report.info(format!(
        "Index table: {:#x}..={:#x} ({} entries)",
        header.index_begin,
        header.index_end,
        header.index_count()
    ));

    validate_ranges(buffer, &header, level, &mut report);
    report.finish()
}

fn validate_ranges(
    buffer: &[u8],
    header: &Header,
    level: ValidationLevel,
    report: &mut ValidationReport,
) {
    let entries = match index_entries(buffer, header) {
        Ok(entries) => entries,
        Err(e) => {
            report.error(format!("Invalid index table: {}", e));
            return;
        }
    };

    let decoder = RecordDecoder::new(buffer);
    let mut previous: Option<(u32, u32)> = None;

    for (i, entry) in entries.iter().enumerate() {
        let start = entry.ip_start();
        let pointer = entry.record_pointer() as usize;

        let end = match read_u32_le(buffer, pointer) {
            Some(end) => end,
            None => {
                report.error(format!(
                    "Entry {}: record pointer {:#x} is past end of file",
                    i, pointer
                ));
                continue;
            }
        };

        if start > end {
            report.error(format!(
                "Entry {}: start {} is after end {}",
                i,
                Ipv4Addr::from(start),
                Ipv4Addr::from(end)
            ));
        } else {
            report.stats.covered_addresses += (end - start) as u64 + 1;
        }

        if let Some((prev_start, prev_end)) = previous {
            if start <= prev_start {
                report.error(format!(
                    "Entry {}: start {} is not above previous start {}",
                    i,
                    Ipv4Addr::from(start),
                    Ipv4Addr::from(prev_start)
                ));
            } else if start <= prev_end {
                report.error(format!(
                    "Entry {}: range starting at {} overlaps previous range ending at {}",
                    i,
                    Ipv4Addr::from(start),
                    Ipv4Addr::from(prev_end)
                ));
            } else if start - prev_end > 1 {
                report.stats.gap_count += 1;
                report.warning(format!(
                    "Gap between {} and {} is not covered by any range",
                    Ipv4Addr::from(prev_end.saturating_add(1)),
                    Ipv4Addr::from(start - 1)
                ));
            }
        }
        previous = Some((start, end));

        if level == ValidationLevel::Strict {
            check_record(&decoder, i, pointer + RECORD_IP_END_SIZE, report);
        }
    }

    if report.stats.gap_count == 0 && report.errors.is_empty() {
        report.info("Ranges are sorted and contiguous");
    }
    if level == ValidationLevel::Strict {
        report.info(format!(
            "Records: {} redirected, {} indirect countries, {} indirect regions",
            report.stats.redirect_records,
            report.stats.indirect_countries,
            report.stats.indirect_regions
        ));
    }
}

fn check_record(
    decoder: &RecordDecoder<'_>,
    i: usize,
    offset: usize,
    report: &mut ValidationReport,
) {
    let record = match decoder.decode(offset) {
        Ok(record) => record,
        Err(e) => {
            report.stats.undecodable_records += 1;
            report.error(format!("Entry {}: {}", i, e));
            return;
        }
    };

    report.stats.redirect_records += record.redirected as usize;
    report.stats.indirect_countries += record.indirect_country as usize;
    report.stats.indirect_regions += record.indirect_region as usize;

    for text in [record.country, record.region] {
        let (_, had_errors) = GBK.decode_without_bom_handling(text);
        if had_errors {
            report.stats.invalid_text += 1;
            report.warning(format!(
                "Entry {}: string at record {:#x} is not valid GBK",
                i, offset
            ));
        }
    }
}
