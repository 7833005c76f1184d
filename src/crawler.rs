use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, REFERER, USER_AGENT};
use reqwest::StatusCode;
use scraper::Html;
use std::path::Path;
use std::time::Duration;
use log::{info, warn};
use thiserror::Error;
use url::Url;

use crate::delay_manager;
use crate::parser;
use crate::table::RecordTable;

pub const BASE_URL: &str = "https://www.nla.gov.au/apps/libraries/";
pub const PAGE_SIZE: u32 = 100;
const MAX_RETRIES: u32 = 3;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Directory columns not carried into the output CSV.
pub const DROPPED_COLUMNS: [&str; 4] = ["Location", "Details", "Web catalogue", "Telnet catalogue"];

#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("invalid base url: {0}")]
    BadBaseUrl(#[from] url::ParseError),
    #[error("session setup request failed: {0}")]
    Session(#[from] reqwest::Error),
    #[error("session setup returned status {0}")]
    SessionStatus(StatusCode),
    #[error("failed to write output csv: {0}")]
    Save(#[from] csv::Error),
}

pub struct DirectoryCrawler {
    client: Client,
    base_url: Url,
}

impl DirectoryCrawler {
    pub fn new() -> Result<Self, CrawlError> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(
            "Mozilla/5.0 (Macintosh; Intel Mac OS X 10.15; rv:137.0) Gecko/20100101 Firefox/137.0",
        ));
        headers.insert(ACCEPT, HeaderValue::from_static(
            "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
        ));
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.5"));
        headers.insert(REFERER, HeaderValue::from_static(BASE_URL));

        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .default_headers(headers)
            .cookie_store(true)
            .build()?;

        Ok(DirectoryCrawler {
            client,
            base_url: Url::parse(BASE_URL)?,
        })
    }

    /// Initial GET then POST against the search endpoint. The site hands out
    /// session cookies here; paginated POSTs fail without them, so any
    /// failure is fatal to the whole crawl.
    pub fn establish_session(&self) -> Result<(), CrawlError> {
        let resp = self.client.get(self.base_url.clone()).send()?;
        if resp.status() != StatusCode::OK {
            return Err(CrawlError::SessionStatus(resp.status()));
        }

        let resp = self
            .client
            .post(self.base_url.clone())
            .form(&search_payload(None))
            .send()?;
        if resp.status() != StatusCode::OK {
            return Err(CrawlError::SessionStatus(resp.status()));
        }
        info!("Session established with {}", BASE_URL);
        Ok(())
    }

    /// Crawl every result page, accumulating one record per directory row and
    /// overwriting `output` with the full set after each page.
    ///
    /// Terminates when a page has no results table (end of data) or when a
    /// page request exhausts its retries; either way the collected records
    /// are preserved.
    pub fn crawl(&self, output: &Path) -> Result<RecordTable, CrawlError> {
        let mut table = RecordTable::default();
        let mut page: u32 = 1;

        loop {
            info!("Scraping page {}...", page);
            let body = match self.fetch_page(page) {
                Some(body) => body,
                None => {
                    warn!("Failed to retrieve page {} after {} attempts. Stopping.", page, MAX_RETRIES);
                    break;
                }
            };

            let more = append_page(&mut table, page, &body, &mut |href| {
                delay_manager::detail_delay();
                self.fetch_address(href)
            });
            if !more {
                info!("No results table on page {}. End of data.", page);
                break;
            }

            table.without_columns(&DROPPED_COLUMNS).save(output)?;
            page += 1;
            delay_manager::page_delay();
        }

        if !table.rows.is_empty() {
            table.without_columns(&DROPPED_COLUMNS).save(output)?;
        }
        Ok(table)
    }

    fn fetch_page(&self, page: u32) -> Option<String> {
        for attempt in 1..=MAX_RETRIES {
            match self
                .client
                .post(self.base_url.clone())
                .form(&search_payload(Some(page)))
                .send()
            {
                Ok(resp) if resp.status() == StatusCode::OK => match resp.text() {
                    Ok(text) => return Some(text),
                    Err(e) => warn!("Failed to read page {} body: {} (attempt {})", page, e, attempt),
                },
                Ok(resp) => {
                    warn!("Status {} for page {} (attempt {})", resp.status(), page, attempt)
                }
                Err(e) => warn!("Request for page {} failed: {} (attempt {})", page, e, attempt),
            }
            delay_manager::retry_backoff();
        }
        None
    }

    // Detail-page failures degrade to an empty address; one bad detail page
    // must not disturb the rest of the crawl.
    fn fetch_address(&self, href: &str) -> String {
        let url = match self.base_url.join(href) {
            Ok(u) => u,
            Err(e) => {
                warn!("Bad details href {:?}: {}", href, e);
                return String::new();
            }
        };
        let body = match self.client.get(url.clone()).send() {
            Ok(resp) if resp.status() == StatusCode::OK => match resp.text() {
                Ok(text) => text,
                Err(e) => {
                    warn!("Failed to read detail page {}: {}", url, e);
                    return String::new();
                }
            },
            Ok(resp) => {
                warn!("Status {} for detail page {}", resp.status(), url);
                return String::new();
            }
            Err(e) => {
                warn!("Failed to fetch detail page {}: {}", url, e);
                return String::new();
            }
        };
        let doc = Html::parse_document(&body);
        parser::extract_address(&doc).unwrap_or_default()
    }
}

/// Append one result page's rows to the accumulated table, one record per
/// directory row, each extended with OrgID and the address produced by
/// `fetch_address` for its details href. Headers are taken from the first
/// page only. Returns false when the page has no results table (end of
/// data); the table is left untouched in that case.
fn append_page<F>(table: &mut RecordTable, page: u32, body: &str, fetch_address: &mut F) -> bool
where
    F: FnMut(&str) -> String,
{
    let doc = Html::parse_document(body);
    let results = match parser::results_table(&doc) {
        Some(t) => t,
        None => return false,
    };

    if page == 1 {
        table.columns = parser::parse_headers(results);
    }

    let rows = parser::parse_rows(results);
    info!("Page {}: {} rows.", page, rows.len());

    for row in rows {
        let mut cells = row.cells;
        let mut org_id = String::new();
        let mut address = String::new();
        if let Some(href) = row.details_href {
            org_id = parser::org_id_from_href(&href);
            address = fetch_address(&href);
            if address.is_empty() {
                info!("Address not found for OrgID {}.", org_id);
            }
        }
        cells.push(org_id);
        cells.push(address);
        table.push_row(cells);
    }
    true
}

/// Form payload for the organisation-wide search. The session-setup POST
/// sends the page size in `chunk` and no `mode`; paginated requests follow
/// the directory's convention of substituting the page index into `chunk`
/// with `mode=display`.
fn search_payload(page: Option<u32>) -> Vec<(&'static str, String)> {
    let mut payload = vec![
        ("libtype", "All".to_string()),
        ("termtype", "Keyword".to_string()),
        ("dosearch", "Search".to_string()),
        ("action", "LibSearch".to_string()),
        ("libname", String::new()),
        ("libstate", "Australia-wide".to_string()),
    ];
    match page {
        Some(p) => {
            payload.push(("chunk", p.to_string()));
            payload.push(("mode", "display".to_string()));
        }
        None => payload.push(("chunk", PAGE_SIZE.to_string())),
    }
    payload
}
