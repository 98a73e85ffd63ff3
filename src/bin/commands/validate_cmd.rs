use anyhow::{Context, Result};
use qqwry::validation::{validate_database, DatabaseStats, ValidationLevel, ValidationReport};
use serde_json::json;
use std::path::{Path, PathBuf};
use std::time::Instant;

pub fn cmd_validate(
    database: PathBuf,
    level: String,
    json_output: bool,
    verbose: bool,
) -> Result<()> {
    let level: ValidationLevel = level.parse().map_err(anyhow::Error::msg)?;

    let started = Instant::now();
    let report = validate_database(&database, level)
        .with_context(|| format!("Validation failed: {}", database.display()))?;
    let elapsed_ms = started.elapsed().as_millis();

    if json_output {
        let output = json!({
            "database": database.display().to_string(),
            "validation_level": level.as_str(),
            "is_valid": report.is_valid(),
            "duration_ms": elapsed_ms,
            "error_count": report.error_count(),
            "warning_count": report.warning_count(),
            "errors": report.errors,
            "warnings": report.warnings,
            "info": report.info,
            "stats": report.stats,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        print_report(&database, level, &report, verbose);
        println!("Checked in {}ms", elapsed_ms);
    }

    if !report.is_valid() {
        std::process::exit(1);
    }
    Ok(())
}

fn print_report(
    database: &Path,
    level: ValidationLevel,
    report: &ValidationReport,
    verbose: bool,
) {
    println!("Database: {} ({} checks)", database.display(), level.as_str());
    print_stats(&report.stats, level);
    println!();

    print_list("Errors", &report.errors, report.error_count());
    if verbose {
        print_list("Warnings", &report.warnings, report.warning_count());
        print_list("Info", &report.info, report.info.len());
    } else if report.warning_count() > 0 {
        println!(
            "{} warning(s), rerun with --verbose to list them",
            report.warning_count()
        );
        println!();
    }

    if report.is_valid() {
        println!("VALIDATION PASSED");
    } else {
        println!("VALIDATION FAILED: {} error(s)", report.error_count());
    }
}

fn print_stats(stats: &DatabaseStats, level: ValidationLevel) {
    println!(
        "  Index:     {:#010x} ..= {:#010x}, {} entries",
        stats.index_begin, stats.index_end, stats.entry_count
    );
    println!(
        "  Coverage:  {} addresses, {} gap(s)",
        stats.covered_addresses, stats.gap_count
    );
    if level == ValidationLevel::Strict {
        println!(
            "  Records:   {} redirected, {} indirect countries, {} indirect regions",
            stats.redirect_records, stats.indirect_countries, stats.indirect_regions
        );
        println!(
            "  Damage:    {} undecodable, {} not valid GBK",
            stats.undecodable_records, stats.invalid_text
        );
    }
}

fn print_list(title: &str, items: &[String], total: usize) {
    if total == 0 {
        return;
    }
    println!("{} ({}):", title, total);
    for item in items {
        println!("  - {}", item);
    }
    println!();
}
