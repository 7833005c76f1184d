use library_scraper_lib::{config, delay_manager, enricher, logger, Config, GeocodeClient, RecordTable};

use std::error::Error;
use std::path::Path;
use log::info;

fn main() -> Result<(), Box<dyn Error>> {
    logger::init();
    info!("Starting coordinate enrichment...");

    let config = Config::from_env()?;

    // Resume from our own checkpoint when a previous run left one behind;
    // otherwise start from the crawler's output.
    let input = if Path::new(config::ENRICHED_CSV).exists() {
        info!("Resuming from existing {}.", config::ENRICHED_CSV);
        config::ENRICHED_CSV
    } else {
        config::LIBRARIES_CSV
    };
    let mut table = RecordTable::load(input)?;
    let geocoder = GeocodeClient::new(config.api_key)?;

    let stats = enricher::enrich(
        &mut table,
        &geocoder,
        Path::new(config::ENRICHED_CSV),
        delay_manager::GEOCODE_DELAY,
    )?;

    info!(
        "Enrichment complete. {} geocoded, {} skipped, {} no match, {} failed. Saved to {}.",
        stats.geocoded, stats.skipped, stats.no_match, stats.failed, config::ENRICHED_CSV
    );
    Ok(())
}
