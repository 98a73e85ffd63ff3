use anyhow::{Context, Result};
use qqwry::{Database, IpRange, Utf8Lossy};
use std::path::Path;

/// Open a database, optionally reading its strings as UTF-8
pub fn open_database(path: &Path, utf8: bool) -> Result<Database> {
    let db = Database::open(path)
        .with_context(|| format!("Failed to load database: {}", path.display()))?;
    Ok(if utf8 { db.with_transcoder(Utf8Lossy) } else { db })
}

/// Format a range as "start - end"
pub fn format_range(range: &IpRange) -> String {
    format!("{} - {}", range.start, range.end)
}

/// Human-readable byte count
pub fn format_size(bytes: usize) -> String {
    let mut value = bytes as f64;
    let mut unit = "bytes";
    for next in ["KB", "MB", "GB"] {
        if value < 1024.0 {
            break;
        }
        value /= 1024.0;
        unit = next;
    }
    if unit == "bytes" {
        format!("{} bytes", bytes)
    } else {
        format!("{:.2} {}", value, unit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(512), "512 bytes");
        assert_eq!(format_size(2048), "2.00 KB");
        assert_eq!(format_size(10 * 1024 * 1024), "10.00 MB");
    }
}
