use std::time::Duration;
use std::thread;
use log::info;

/// Pause between paginated search requests.
pub const PAGE_DELAY: Duration = Duration::from_millis(1500);

/// Short pause before each per-library detail fetch.
pub const DETAIL_DELAY: Duration = Duration::from_millis(100);

/// Pause after each geocoding request, per the provider's rate limit.
pub const GEOCODE_DELAY: Duration = Duration::from_millis(1100);

/// Fixed backoff between retry attempts on a failed page request.
pub const RETRY_BACKOFF: Duration = Duration::from_secs(2);

pub fn page_delay() {
    info!("Waiting {:.1}s (page delay)...", PAGE_DELAY.as_secs_f32());
    thread::sleep(PAGE_DELAY);
}

pub fn detail_delay() {
    thread::sleep(DETAIL_DELAY);
}

pub fn retry_backoff() {
    thread::sleep(RETRY_BACKOFF);
}
