use anyhow::{bail, Result};
use std::path::Path;

use crate::catalog::Catalog;
use crate::config::Config;
use crate::extractor::Extractor;
use crate::fs::RealFileSystem;
use crate::logging;
use crate::po;

pub fn run(config: &Config, output: Option<String>, fail_on_skipped: bool) -> Result<()> {
    logging::info("=== gettext-turbo extract ===\n");

    let output_path = output.as_ref().unwrap_or(&config.output);

    logging::info("Configuration:");
    logging::info(format_args!("  Input patterns: {:?}", config.input));
    logging::info(format_args!("  Ignore patterns: {:?}", config.ignore));
    logging::info(format_args!("  Output: {}", output_path));
    logging::info(format_args!("  Functions: {:?}", config.functions));
    logging::info("");

    let roles = config.function_roles()?;
    if roles.is_empty() {
        logging::warn("No translation functions configured; only markup attributes will be extracted");
    }
    let extractor = Extractor::new(roles, config.markup_extensions.clone());
    let fs = RealFileSystem;
    let extraction = extractor.extract_from_glob(&config.input, &config.ignore, &fs)?;

    // Report any errors encountered during extraction
    if !extraction.errors.is_empty() {
        logging::error("Extraction errors:");
        for error in &extraction.errors {
            logging::error(format_args!("  {}: {}", error.file_path, error.message));
        }
    }
    for skipped in &extraction.skipped {
        logging::warn(format_args!(
            "Parse error in {}:{}",
            skipped.file_path, skipped.failure
        ));
    }

    let mut catalog = Catalog::new();
    let mut total_units = 0;
    for (file_path, units) in &extraction.files {
        total_units += units.len();
        catalog.merge_unit(file_path, units);
    }

    if catalog.is_empty() {
        logging::info("No translatable strings found.");
    }
    po::write(&catalog, Path::new(output_path), &fs)?;

    logging::info("Extraction Summary:");
    logging::info(format_args!(
        "  Files processed: {}",
        extraction.files.len()
    ));
    logging::info(format_args!("  Calls found: {}", total_units));
    logging::info(format_args!("  Unique messages: {}", catalog.len()));
    if extraction.skip_count() > 0 {
        logging::info(format_args!("  Skipped: {}", extraction.skip_count()));
    }
    if !extraction.errors.is_empty() {
        logging::info(format_args!("  Errors: {}", extraction.errors.len()));
    }
    logging::info(format_args!("\nWrote {}", output_path));

    let failures = extraction.skip_count() + extraction.errors.len();
    if fail_on_skipped && failures > 0 {
        bail!(
            "{} file(s) skipped or unreadable (--fail-on-skipped enabled)",
            failures
        );
    }

    Ok(())
}
