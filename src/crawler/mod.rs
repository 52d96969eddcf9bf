//! Crawler module for page fetching and endpoint discovery
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with bounded retry
//! - HTML parsing for links and script sources
//! - Endpoint extraction from markup and JavaScript
//! - Script collection
//! - Overall crawl coordination

mod coordinator;
mod extractor;
mod fetcher;
mod parser;
mod scripts;

pub use coordinator::{run_crawl, Coordinator, CrawlReport, CrawlTask, PageOutcome};
pub use extractor::{extract_endpoints, resolve_match};
pub use fetcher::{build_http_client, fetch_url, FetchResult, Fetcher};
pub use parser::{parse_html, ParsedPage};
pub use scripts::{ScriptBundle, ScriptCollector};
