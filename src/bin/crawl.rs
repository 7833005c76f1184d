use library_scraper_lib::{config, logger, DirectoryCrawler};

use std::error::Error;
use std::path::Path;
use log::info;

fn main() -> Result<(), Box<dyn Error>> {
    logger::init();
    info!("Starting library directory crawl...");

    let crawler = DirectoryCrawler::new()?;

    // Session cookies are required for the paginated POSTs; a failure here
    // is the one condition that aborts the whole run.
    crawler.establish_session()?;

    let table = crawler.crawl(Path::new(config::LIBRARIES_CSV))?;
    info!(
        "Crawl complete. {} libraries written to {}.",
        table.rows.len(),
        config::LIBRARIES_CSV
    );
    Ok(())
}
