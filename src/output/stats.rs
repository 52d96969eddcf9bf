//! Statistics gathered during a crawl run
//!
//! This module provides the per-run counters and their console rendering.

use crate::state::PageStatus;
use std::collections::BTreeMap;
use std::fmt::Write as _;

/// Crawl statistics summary
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlStatistics {
    /// Count of pages by final status
    pub pages_by_status: BTreeMap<PageStatus, u64>,

    /// Count of scripts by final status
    pub scripts_by_status: BTreeMap<PageStatus, u64>,

    /// Scripts referenced again after an earlier page already fetched them
    pub scripts_skipped: u64,

    /// Internal links dropped because the page cap was reached
    pub links_over_limit: u64,

    /// Number of unique endpoints in the final result
    pub endpoints_found: u64,

    /// Deepest link-following level that was fetched (seed = 0)
    pub deepest_level: u32,
}

impl CrawlStatistics {
    /// Records the outcome of a page and of the scripts it loaded
    pub fn record_page<'a>(
        &mut self,
        status: PageStatus,
        script_statuses: impl IntoIterator<Item = &'a PageStatus>,
        scripts_skipped: usize,
    ) {
        *self.pages_by_status.entry(status).or_insert(0) += 1;

        for script_status in script_statuses {
            *self.scripts_by_status.entry(*script_status).or_insert(0) += 1;
        }

        self.scripts_skipped += scripts_skipped as u64;
    }

    /// Total pages fetched (successfully or not)
    pub fn total_pages(&self) -> u64 {
        self.pages_by_status.values().sum()
    }

    /// Pages whose fetch failed
    pub fn failed_pages(&self) -> u64 {
        self.pages_by_status
            .iter()
            .filter(|(status, _)| status.is_error())
            .map(|(_, count)| count)
            .sum()
    }

    /// Total scripts fetched (successfully or not)
    pub fn total_scripts(&self) -> u64 {
        self.scripts_by_status.values().sum()
    }

    /// Scripts whose fetch failed
    pub fn failed_scripts(&self) -> u64 {
        self.scripts_by_status
            .iter()
            .filter(|(status, _)| status.is_error())
            .map(|(_, count)| count)
            .sum()
    }
}

/// Renders statistics as the human-readable block printed after a crawl
pub fn format_statistics(stats: &CrawlStatistics) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "=== Crawl Statistics ===");
    let _ = writeln!(
        out,
        "  Pages fetched: {} ({} failed, deepest level {})",
        stats.total_pages(),
        stats.failed_pages(),
        stats.deepest_level
    );
    let _ = writeln!(
        out,
        "  Scripts fetched: {} ({} failed, {} repeats skipped)",
        stats.total_scripts(),
        stats.failed_scripts(),
        stats.scripts_skipped
    );

    if stats.failed_pages() > 0 || stats.failed_scripts() > 0 {
        let _ = writeln!(out, "  Errors:");
        for status in PageStatus::all().iter().filter(|s| s.is_error()) {
            let pages = stats.pages_by_status.get(status).copied().unwrap_or(0);
            let scripts = stats.scripts_by_status.get(status).copied().unwrap_or(0);
            if pages + scripts > 0 {
                let _ = writeln!(out, "    {}: {} pages, {} scripts", status, pages, scripts);
            }
        }
    }

    if stats.links_over_limit > 0 {
        let _ = writeln!(
            out,
            "  Links skipped by page cap: {}",
            stats.links_over_limit
        );
    }

    let _ = writeln!(out, "  Unique endpoints: {}", stats.endpoints_found);
    out
}
