use anyhow::{Context, Result};
use qqwry::{Database, LookupResult};
use serde_json::json;
use std::path::PathBuf;

use crate::cli_utils::{format_range, format_size, open_database};

pub fn cmd_inspect(database: PathBuf, json_output: bool, utf8: bool) -> Result<()> {
    let db = open_database(&database, utf8)?;

    let (index_begin, index_end) = db.index_bounds();
    let first = edge_entry(&db, 0)?;
    // QQWry keeps its data version string in the last record
    let last = edge_entry(&db, db.len().saturating_sub(1))?;

    if json_output {
        let output = json!({
            "file": database.display().to_string(),
            "size": db.size(),
            "encoding": db.encoding(),
            "index_begin": index_begin,
            "index_end": index_end,
            "entry_count": db.len(),
            "first_entry": first,
            "last_entry": last,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("Database: {}", database.display());
        println!("Size:     {}", format_size(db.size()));
        println!("Encoding: {}", db.encoding());
        println!();
        println!("Index:");
        println!(
            "  Offsets:       {:#010x} ..= {:#010x}",
            index_begin, index_end
        );
        println!("  Entries:       {}", db.len());

        if let Some(first) = &first {
            println!();
            println!("First range:     {}", format_range(&first.range));
            println!(
                "  Location:      {} {}",
                first.location.country, first.location.region
            );
        }
        if let Some(last) = &last {
            println!("Last range:      {}", format_range(&last.range));
            println!(
                "  Location:      {} {}",
                last.location.country, last.location.region
            );
        }
    }

    Ok(())
}

fn edge_entry(db: &Database, i: usize) -> Result<Option<LookupResult>> {
    db.entry(i)
        .with_context(|| format!("Failed to decode index entry {}", i))
}
