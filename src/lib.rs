pub mod config;
pub mod crawler;
pub mod delay_manager;
pub mod enricher;
pub mod geocoder;
pub mod logger;
pub mod parser;
pub mod table;

// Exporting types for convenience
pub use config::Config;
pub use crawler::{CrawlError, DirectoryCrawler};
pub use enricher::{EnrichError, EnrichStats};
pub use geocoder::{Geocode, GeocodeClient, GeocodeHit};
pub use table::RecordTable;
