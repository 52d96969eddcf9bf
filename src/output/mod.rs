//! Output module for reporting crawl results
//!
//! This module handles:
//! - Rendering the endpoint list (one absolute URL per line)
//! - Writing the list to the output file
//! - Printing the console report (endpoints on stdout, statistics on stderr)
//! - Recording crawl statistics

pub mod stats;

pub use stats::{format_statistics, CrawlStatistics};

use crate::state::EndpointSet;
use crate::RippleError;
use std::io::{self, Write};
use std::path::Path;

/// Renders endpoints as newline-separated text, one URL per line
///
/// # Example
///
/// ```
/// use endpoint_ripple::output::render_endpoints;
/// use endpoint_ripple::EndpointSet;
///
/// let mut set = EndpointSet::new();
/// set.insert("https://site.test/b");
/// set.insert("https://site.test/a");
/// assert_eq!(render_endpoints(&set), "https://site.test/a\nhttps://site.test/b\n");
/// ```
pub fn render_endpoints(endpoints: &EndpointSet) -> String {
    let mut out = String::new();
    for endpoint in endpoints.iter() {
        out.push_str(endpoint);
        out.push('\n');
    }
    out
}

/// Writes the endpoint list to a file, replacing any previous content
///
/// # Returns
///
/// * `Ok(())` - File written
/// * `Err(RippleError::OutputWrite)` - The file could not be written
pub fn write_endpoints(endpoints: &EndpointSet, path: &Path) -> Result<(), RippleError> {
    std::fs::write(path, render_endpoints(endpoints)).map_err(|source| RippleError::OutputWrite {
        path: path.display().to_string(),
        source,
    })?;

    tracing::info!("Endpoints saved to {}", path.display());
    Ok(())
}

/// Writes the console report
///
/// The endpoint list goes to `out`; the statistics block, when given, goes to
/// `err` so `out` can be piped on its own.
pub fn write_report(
    out: &mut impl Write,
    err: &mut impl Write,
    endpoints: &EndpointSet,
    statistics: Option<&CrawlStatistics>,
) -> io::Result<()> {
    if endpoints.is_empty() {
        writeln!(out, "No endpoints found.")?;
    } else {
        writeln!(out, "\nFound {} endpoints:", endpoints.len())?;
        for endpoint in endpoints.iter() {
            writeln!(out, "  {}", endpoint)?;
        }
    }

    if let Some(statistics) = statistics {
        writeln!(err)?;
        write!(err, "{}", format_statistics(statistics))?;
    }

    Ok(())
}

/// Prints the console report to stdout and stderr
pub fn print_report(endpoints: &EndpointSet, statistics: Option<&CrawlStatistics>) {
    let mut out = io::stdout().lock();
    let mut err = io::stderr().lock();
    if let Err(e) = write_report(&mut out, &mut err, endpoints, statistics) {
        tracing::warn!("Failed to print report: {}", e);
    }
}
