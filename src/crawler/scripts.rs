//! Script collector
//!
//! Fetches the external scripts referenced by a page and concatenates their
//! bodies so the endpoint extractor can scan them in one pass.

use crate::crawler::fetcher::{FetchResult, Fetcher};
use crate::state::{PageStatus, VisitedSet};
use crate::url::visit_key;
use futures::stream::{self, StreamExt};
use url::Url;

/// Concatenated script text plus per-script outcomes
#[derive(Debug, Clone, Default)]
pub struct ScriptBundle {
    /// Bodies of every successfully fetched script, each followed by `\n`,
    /// in the order the scripts appear in the markup
    pub content: String,

    /// Outcome of each script fetched for this page, in markup order
    pub outcomes: Vec<(Url, PageStatus)>,

    /// Scripts not fetched because an earlier page of the same scheme already did
    pub skipped: usize,
}

impl ScriptBundle {
    /// Number of scripts that were fetched successfully
    pub fn fetched(&self) -> usize {
        self.outcomes.iter().filter(|(_, s)| s.is_success()).count()
    }

    /// Number of scripts whose fetch failed
    pub fn failed(&self) -> usize {
        self.outcomes.iter().filter(|(_, s)| s.is_error()).count()
    }
}

/// Collects script content for pages of one crawl run
///
/// Each script URL is fetched at most once per run and page scheme. Crawled
/// pages share one network location, so root-relative paths inside a script
/// resolve the same way for every page of that scheme and skipping a repeat
/// loses nothing.
pub struct ScriptCollector<'a> {
    fetcher: &'a Fetcher,
    seen: &'a VisitedSet,
    concurrency: usize,
}

impl<'a> ScriptCollector<'a> {
    pub fn new(fetcher: &'a Fetcher, seen: &'a VisitedSet, concurrency: usize) -> Self {
        Self {
            fetcher,
            seen,
            concurrency: concurrency.max(1),
        }
    }

    /// Fetches the scripts of `page_url` and concatenates the bodies
    ///
    /// Scripts are fetched concurrently but concatenated in the given order. A
    /// failed script is logged and contributes nothing.
    pub async fn collect_sources(&self, sources: &[Url], page_url: &Url) -> ScriptBundle {
        let mut bundle = ScriptBundle::default();

        let claimed: Vec<&Url> = sources
            .iter()
            .filter(|url| self.seen.claim_key(claim_key(page_url, url)).is_new())
            .collect();
        bundle.skipped = sources.len() - claimed.len();

        let results: Vec<(&Url, FetchResult)> = stream::iter(claimed)
            .map(|url| async move {
                tracing::info!("Fetching JavaScript file: {}", url);
                (url, self.fetcher.fetch(url).await)
            })
            .buffered(self.concurrency)
            .collect()
            .await;

        for (url, result) in results {
            let status = result.status();

            match result {
                FetchResult::Success { body, .. } => {
                    bundle.content.push_str(&body);
                    bundle.content.push('\n');
                }
                failure => {
                    tracing::warn!(
                        "Error fetching JavaScript file {}: {}",
                        url,
                        failure.describe()
                    );
                }
            }

            bundle.outcomes.push((url.clone(), status));
        }

        bundle
    }
}

/// Key for the script visited set: page scheme plus the script's visit key
fn claim_key(page_url: &Url, script_url: &Url) -> String {
    format!("{} {}", page_url.scheme(), visit_key(script_url))
}
