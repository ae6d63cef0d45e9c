//! Config command handler.
//!
//! Contains the implementation of the `config` CLI command.

use anyhow::Result;
use cousins::CousinsConfig;
use cousins::observability::LogFormat;

/// Config command.
pub fn cmd_config(config: &CousinsConfig, show: bool) -> Result<()> {
    if !show {
        println!("Use --show to display the current configuration");
        return Ok(());
    }

    println!("Current Configuration");
    println!("=====================");
    println!();
    println!("Rules Path: {}", config.rules_path.display());
    println!();

    println!("Matching:");
    println!("  Min Length: {}", config.matching.min_length);
    println!(
        "  Min Contained Length: {}",
        config.matching.min_contained_length
    );
    println!(
        "  Similarity Candidates: {}",
        config.matching.similarity_candidates
    );
    println!();

    println!("Logging:");
    let format = config
        .logging
        .format
        .as_deref()
        .map(LogFormat::parse)
        .unwrap_or_default();
    println!("  Format: {format:?}");
    println!(
        "  Filter: {}",
        config.logging.filter.as_deref().unwrap_or("(RUST_LOG or warn)")
    );
    println!(
        "  File: {}",
        config
            .logging
            .file
            .as_ref()
            .map_or_else(|| "(stderr)".to_string(), |p| p.display().to_string())
    );

    Ok(())
}
