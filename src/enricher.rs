use std::path::Path;
use std::thread;
use std::time::Duration;
use log::{info, warn};
use thiserror::Error;

use crate::geocoder::Geocode;
use crate::table::RecordTable;

pub const LATITUDE: &str = "Latitude";
pub const LONGITUDE: &str = "Longitude";
pub const DISPLAY_NAME: &str = "Geocoder Display Name";

#[derive(Debug, Error)]
pub enum EnrichError {
    #[error("input table has no Address column")]
    MissingAddressColumn,
    #[error("failed to write checkpoint: {0}")]
    Save(#[from] csv::Error),
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct EnrichStats {
    pub geocoded: usize,
    pub skipped: usize,
    pub no_match: usize,
    pub failed: usize,
}

/// Fill Latitude/Longitude/Geocoder Display Name for every row that lacks
/// them, checkpointing the full table to `output` after each processed row.
///
/// A row with a non-empty Latitude counts as already processed and is never
/// looked up again, so an interrupted run can simply be restarted. Provider
/// misses and request failures leave the row's fields empty and move on.
pub fn enrich<G: Geocode>(
    table: &mut RecordTable,
    geocoder: &G,
    output: &Path,
    delay: Duration,
) -> Result<EnrichStats, EnrichError> {
    let addr_idx = table
        .column_index("Address")
        .ok_or(EnrichError::MissingAddressColumn)?;
    let lat_idx = table.ensure_column(LATITUDE);
    let lon_idx = table.ensure_column(LONGITUDE);
    let name_idx = table.ensure_column(DISPLAY_NAME);

    let total = table.rows.len();
    let mut stats = EnrichStats::default();

    for idx in 0..total {
        if !table.cell(idx, lat_idx).is_empty() {
            info!("Skipping already processed address: {}", table.cell(idx, addr_idx));
            stats.skipped += 1;
            continue;
        }

        let address = table.cell(idx, addr_idx).to_string();
        info!("Geocoding {} / {}: {}", idx + 1, total, address);

        match geocoder.lookup(&address) {
            Ok(Some(hit)) => {
                table.set_cell(idx, lat_idx, hit.lat);
                table.set_cell(idx, lon_idx, hit.lon);
                table.set_cell(idx, name_idx, hit.display_name);
                stats.geocoded += 1;
            }
            Ok(None) => {
                info!("No geocode result for address: {}", address);
                stats.no_match += 1;
            }
            Err(e) => {
                warn!("Error geocoding address {:?}: {}", address, e);
                stats.failed += 1;
            }
        }

        table.save(output)?;
        thread::sleep(delay);
    }
    Ok(stats)
}
