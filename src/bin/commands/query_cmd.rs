use anyhow::Result;
use serde_json::json;
use std::path::PathBuf;

use crate::cli_utils::open_database;

pub fn cmd_query(
    database: PathBuf,
    addresses: Vec<String>,
    json_output: bool,
    quiet: bool,
    utf8: bool,
) -> Result<()> {
    let db = open_database(&database, utf8)?;

    let mut all_found = true;
    let mut results = Vec::with_capacity(addresses.len());

    for address in &addresses {
        match db.lookup(address) {
            Ok(Some(hit)) => {
                if !quiet && !json_output {
                    println!(
                        "{}\t{}\t{}",
                        address, hit.location.country, hit.location.region
                    );
                }
                results.push(json!({
                    "ip": address,
                    "found": true,
                    "start": hit.range.start.to_string(),
                    "end": hit.range.end.to_string(),
                    "country": hit.location.country,
                    "region": hit.location.region,
                }));
            }
            Ok(None) => {
                all_found = false;
                if !quiet && !json_output {
                    println!("{}\t(not found)", address);
                }
                results.push(json!({ "ip": address, "found": false }));
            }
            Err(e) => {
                // Per-address failures don't stop the remaining lookups
                all_found = false;
                if !quiet && !json_output {
                    eprintln!("Error: {}: {}", address, e);
                }
                results.push(json!({
                    "ip": address,
                    "found": false,
                    "error": e.to_string(),
                }));
            }
        }
    }

    if json_output && !quiet {
        println!("{}", serde_json::to_string_pretty(&results)?);
    }

    // Exit with appropriate code
    std::process::exit(if all_found { 0 } else { 1 });
}
