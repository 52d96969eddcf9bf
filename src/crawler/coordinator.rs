//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the crawl loop that ties together:
//! - Claiming URLs in the run's visited set
//! - Fetching pages and their scripts
//! - Extracting endpoints from markup and script text
//! - Following same-origin links until the depth budget runs out
//!
//! The traversal is a level-by-level work queue. All pages of one level are
//! fetched concurrently, then the coordinator claims their children one at a
//! time. A page is therefore always claimed at the largest remaining depth
//! from which it is reachable, and the result does not depend on the order in
//! which sibling fetches complete.

use crate::config::{validate, Config};
use crate::crawler::extractor::extract_endpoints;
use crate::crawler::fetcher::{FetchResult, Fetcher};
use crate::crawler::parser::parse_html;
use crate::crawler::scripts::{ScriptBundle, ScriptCollector};
use crate::output::CrawlStatistics;
use crate::state::{Claim, EndpointSet, PageStatus, VisitedSet};
use crate::url::{parse_seed_url, same_origin, visit_key};
use crate::RippleError;
use futures::stream::{self, StreamExt};
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use url::Url;

/// A unit of work: one page and the depth budget left when it is fetched
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlTask {
    pub url: Url,
    pub remaining_depth: i64,
}

impl CrawlTask {
    pub fn new(url: Url, remaining_depth: i64) -> Self {
        Self {
            url,
            remaining_depth,
        }
    }
}

/// Everything learned from processing one page
#[derive(Debug, Clone)]
pub struct PageOutcome {
    /// The task that produced this outcome
    pub task: CrawlTask,

    /// Final status of the page fetch
    pub status: PageStatus,

    /// Endpoints found in the page and its scripts
    pub endpoints: EndpointSet,

    /// Unique same-origin links, in document order
    pub internal_links: Vec<Url>,

    /// Scripts fetched for this page
    pub scripts: ScriptBundle,
}

impl PageOutcome {
    fn failed(task: CrawlTask, status: PageStatus) -> Self {
        Self {
            task,
            status,
            endpoints: EndpointSet::new(),
            internal_links: Vec::new(),
            scripts: ScriptBundle::default(),
        }
    }
}

/// Result of a complete crawl run
#[derive(Debug, Clone, Default)]
pub struct CrawlReport {
    /// Deduplicated endpoints from every page and script visited
    pub endpoints: EndpointSet,

    /// Every page URL claimed during the run, sorted
    pub visited: Vec<String>,

    /// Counters for the run
    pub statistics: CrawlStatistics,

    /// True if the run was interrupted before the frontier was exhausted
    pub cancelled: bool,
}

/// Main crawler coordinator structure
///
/// One coordinator drives one crawl run: its visited sets are never cleared,
/// so a second `crawl` call on the same coordinator will not refetch pages.
pub struct Coordinator {
    config: Arc<Config>,
    fetcher: Fetcher,
    visited: VisitedSet,
    scripts_seen: VisitedSet,
    cancelled: Arc<AtomicBool>,
}

impl Coordinator {
    /// Creates a new coordinator instance
    ///
    /// # Arguments
    ///
    /// * `config` - The crawler configuration
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Configuration valid and HTTP client built
    /// * `Err(RippleError)` - Invalid configuration or client setup failure
    pub fn new(config: Config) -> Result<Self, RippleError> {
        validate(&config)?;

        let fetcher = Fetcher::new(&config)?;
        let visited = VisitedSet::with_limit(config.crawler.max_pages);

        Ok(Self {
            config: Arc::new(config),
            fetcher,
            visited,
            scripts_seen: VisitedSet::new(),
            cancelled: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Returns the configuration this coordinator runs with
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns the run's visited set
    pub fn visited(&self) -> &VisitedSet {
        &self.visited
    }

    /// Returns a flag that stops the crawl before its next level when set
    pub fn cancel_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancelled)
    }

    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Crawls from `seed` with the given depth budget
    ///
    /// # Flow
    ///
    /// 1. A depth of zero or less yields an empty report without any fetch
    /// 2. The seed is claimed and becomes the first level
    /// 3. Each level's pages are processed concurrently
    /// 4. Endpoints are merged; internal links of pages with budget left are
    ///    claimed and form the next level with `remaining_depth - 1`
    /// 5. Stops when a level produces no new pages or the run is cancelled
    pub async fn crawl(&self, seed: &Url, depth: i64) -> CrawlReport {
        let mut report = CrawlReport::default();

        if depth <= 0 {
            tracing::info!("Depth {} leaves nothing to crawl", depth);
            return report;
        }

        let mut frontier = match self.visited.claim(seed) {
            Claim::New => vec![CrawlTask::new(seed.clone(), depth)],
            claim => {
                tracing::debug!("Seed {} not claimed: {:?}", seed, claim);
                Vec::new()
            }
        };

        let concurrency = self.config.crawler.max_concurrent_fetches;
        let mut level: u32 = 0;
        let mut limit_warned = false;

        while !frontier.is_empty() {
            if self.is_cancelled() {
                tracing::warn!(
                    "Crawl cancelled with {} pages left at level {}",
                    frontier.len(),
                    level
                );
                report.cancelled = true;
                break;
            }

            tracing::debug!("Level {}: {} pages", level, frontier.len());
            report.statistics.deepest_level = level;

            let outcomes: Vec<PageOutcome> = stream::iter(std::mem::take(&mut frontier))
                .map(|task| self.process_page(task))
                .buffered(concurrency)
                .collect()
                .await;

            for outcome in outcomes {
                report.statistics.record_page(
                    outcome.status,
                    outcome.scripts.outcomes.iter().map(|(_, status)| status),
                    outcome.scripts.skipped,
                );
                report.endpoints.merge(outcome.endpoints);

                let child_depth = outcome.task.remaining_depth - 1;
                if child_depth <= 0 {
                    continue;
                }

                for link in outcome.internal_links {
                    match self.visited.claim(&link) {
                        Claim::New => frontier.push(CrawlTask::new(link, child_depth)),
                        Claim::AlreadyVisited => {}
                        Claim::LimitReached => {
                            if !limit_warned {
                                tracing::warn!(
                                    "Page limit of {} reached; further links are ignored",
                                    self.config.crawler.max_pages
                                );
                                limit_warned = true;
                            }
                            report.statistics.links_over_limit += 1;
                        }
                    }
                }
            }

            level += 1;
        }

        report.statistics.endpoints_found = report.endpoints.len() as u64;
        report.visited = self.visited.snapshot();

        tracing::info!(
            "Crawl finished: {} pages, {} endpoints",
            report.statistics.total_pages(),
            report.endpoints.len()
        );

        report
    }

    /// Processes a single claimed page
    ///
    /// This method:
    /// 1. Fetches the page
    /// 2. Extracts endpoints from the HTML
    /// 3. Collects and scans the page's external scripts
    /// 4. Gathers unique same-origin links
    ///
    /// A fetch failure is local: the outcome carries the failure status and
    /// nothing else.
    pub async fn process_page(&self, task: CrawlTask) -> PageOutcome {
        tracing::info!("Scraping: {}", task.url);

        let body = match self.fetcher.fetch(&task.url).await {
            FetchResult::Success { body, final_url, .. } => {
                if final_url != task.url.as_str() {
                    tracing::debug!("{} redirected to {}", task.url, final_url);
                }
                body
            }
            failure => {
                tracing::warn!("Error fetching URL {}: {}", task.url, failure.describe());
                let status = failure.status();
                return PageOutcome::failed(task, status);
            }
        };

        let parsed = parse_html(&body, &task.url);
        let mut endpoints = extract_endpoints(&body, &task.url);

        let collector = ScriptCollector::new(
            &self.fetcher,
            &self.scripts_seen,
            self.config.crawler.max_concurrent_fetches,
        );
        let scripts = collector.collect_sources(&parsed.scripts, &task.url).await;
        if !scripts.content.is_empty() {
            endpoints.merge(extract_endpoints(&scripts.content, &task.url));
        }

        let mut seen = HashSet::new();
        let internal_links: Vec<Url> = parsed
            .links
            .into_iter()
            .filter(|link| same_origin(link, &task.url))
            .filter(|link| seen.insert(visit_key(link)))
            .collect();

        tracing::debug!(
            "{}: {} endpoints, {} internal links, {} scripts ({} failed, {} skipped)",
            task.url,
            endpoints.len(),
            internal_links.len(),
            scripts.fetched(),
            scripts.failed(),
            scripts.skipped
        );

        PageOutcome {
            task,
            status: PageStatus::Processed,
            endpoints,
            internal_links,
            scripts,
        }
    }
}

/// Runs a complete crawl from a seed URL
///
/// Validates the seed and configuration before any request is made, then
/// crawls with `config.crawler.max_depth` as the depth budget.
///
/// # Returns
///
/// * `Ok(CrawlReport)` - Crawl finished (individual fetch failures are not errors)
/// * `Err(RippleError)` - Invalid seed URL or configuration
///
/// # Example
///
/// ```no_run
/// use endpoint_ripple::config::Config;
/// use endpoint_ripple::crawler::run_crawl;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let report = run_crawl(Config::default(), "https://site.test/").await?;
/// for endpoint in report.endpoints.iter() {
///     println!("{}", endpoint);
/// }
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(config: Config, seed: &str) -> Result<CrawlReport, RippleError> {
    let seed = parse_seed_url(seed)?;
    let coordinator = Coordinator::new(config)?;
    let depth = coordinator.config().crawler.max_depth;
    Ok(coordinator.crawl(&seed, depth).await)
}
