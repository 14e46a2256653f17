use colored::Colorize;
use deepsite_scanner::{CrawlSession, Crawler, ProgressCallback};
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Extract the path component from a URL
pub fn extract_url_path(url: &str) -> String {
    Url::parse(url)
        .ok()
        .map(|u| {
            let path = u.path().to_string();
            if path.is_empty() || path == "/" {
                "/".to_string()
            } else {
                path
            }
        })
        .unwrap_or_else(|| url.to_string())
}

/// Spinner that follows a crawl, or `None` when progress output is off.
pub fn crawl_spinner(show_progress_bars: bool) -> Option<Arc<ProgressBar>> {
    if !show_progress_bars {
        return None;
    }
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
        pb.set_style(style);
    }
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message("Starting crawl...");
    Some(Arc::new(pb))
}

/// Attach a spinner to a crawler so it follows each fetch.
pub fn with_progress(crawler: Crawler, spinner: Option<Arc<ProgressBar>>) -> Crawler {
    let Some(pb) = spinner else {
        return crawler;
    };

    let callback: ProgressCallback = Arc::new(move |pages: usize, url: String| {
        pb.set_message(format!(
            "Crawling... {} pages kept, fetching {}",
            pages,
            extract_url_path(&url)
        ));
    });
    crawler.with_progress_callback(callback)
}

/// Generate a crawl report from a session
pub fn generate_crawl_report(session: &CrawlSession) -> String {
    let mut report = String::new();
    report.push_str("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n\n");
    report.push_str("# Summary:\n");
    report.push_str(&format!("  Site: {}\n", session.root));
    report.push_str(&format!("  Pages kept: {}\n", session.pages.len()));
    report.push_str(&format!("  URLs visited: {}\n", session.visited.len()));
    report.push_str(&format!("  Links indexed: {}\n", session.link_index.len()));
    report.push_str(&format!("  Corpus size: {} chars\n", session.corpus_len()));

    let stats = &session.stats;
    report.push_str(&format!(
        "  Fetches: {} ({} failed), {} queued entries discarded\n",
        stats.fetched, stats.failed, stats.discarded
    ));
    if stats.queue_overflowed {
        report.push_str(&format!(
            "  {}\n",
            "Frontier filled up, some links were never queued".yellow()
        ));
    }

    report.push_str("\n━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n\n");

    for page in &session.pages {
        let path = extract_url_path(&page.url);
        let title = if page.title.is_empty() {
            "(untitled)".dimmed().to_string()
        } else {
            page.title.bright_white().to_string()
        };

        report.push_str(&format!(
            "  {} {} {}\n",
            path.green(),
            title,
            format!("{} chars", page.text_len()).bright_black()
        ));
    }
    report.push('\n');

    report
}
