use crate::error::{Result, ScanError};
use crate::fetcher::{PageFetcher, build_client};
use crate::frontier::Frontier;
use crate::normalize::{is_same_domain, normalize, should_skip};
use crate::session::CrawlSession;
use crate::sitemap::fetch_sitemap_links;
use futures::StreamExt;
use futures::stream::FuturesUnordered;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Called with the number of accepted pages so far and the URL about to be fetched.
pub type ProgressCallback = Arc<dyn Fn(usize, String) + Send + Sync>;

/// How many of the most recently indexed links are considered for the
/// frontier after each fetch.
pub const RECENT_LINK_WINDOW: usize = 30;

#[derive(Debug, Clone)]
pub struct CrawlConfig {
    /// Accepted pages after which the crawl stops
    pub max_pages: usize,
    /// Corpus length (characters) after which fetching stops
    pub max_chars: usize,
    pub timeout: Duration,
    pub max_depth: usize,
    pub max_queue: usize,
    /// Candidates fetched by a focused crawl
    pub focused_pages: usize,
    pub min_text_len: usize,
    pub parallel_fetches: usize,
    pub link_window: usize,
    pub use_sitemap: bool,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            max_pages: 12,
            max_chars: 30_000,
            timeout: Duration::from_secs(8),
            max_depth: 3,
            max_queue: 100,
            focused_pages: 4,
            min_text_len: 200,
            parallel_fetches: 4,
            link_window: RECENT_LINK_WINDOW,
            use_sitemap: true,
        }
    }
}

/// Breadth-first, budget-bounded crawler for a single site.
pub struct Crawler {
    pub(crate) fetcher: PageFetcher,
    pub(crate) config: CrawlConfig,
    progress_callback: Option<ProgressCallback>,
}

impl Crawler {
    pub fn new(config: CrawlConfig) -> Result<Self> {
        let client = build_client(config.timeout)?;
        Ok(Self::with_client(client, config))
    }

    /// Reuse an existing connection pool.
    pub fn with_client(client: Client, config: CrawlConfig) -> Self {
        let fetcher = PageFetcher::with_client(client, config.timeout, config.min_text_len);
        Self {
            fetcher,
            config,
            progress_callback: None,
        }
    }

    pub fn with_progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    pub fn config(&self) -> &CrawlConfig {
        &self.config
    }

    pub fn fetcher(&self) -> &PageFetcher {
        &self.fetcher
    }

    /// Frontier holding the root at depth 0 followed by same-domain sitemap
    /// entries at depth 1.
    pub async fn seed_frontier(&self, root_url: &str) -> Frontier {
        let mut frontier = Frontier::new(self.config.max_queue);
        frontier.push(normalize(root_url), 0);

        if self.config.use_sitemap {
            let links =
                fetch_sitemap_links(self.fetcher.client(), root_url, self.config.timeout).await;
            for link in links {
                if !is_same_domain(root_url, &link) || frontier.contains(&link) {
                    continue;
                }
                if !frontier.push(link, 1) {
                    debug!("Sitemap exceeds frontier capacity, dropping remaining entries");
                    break;
                }
            }
        }

        frontier
    }

    /// Crawl `root_url` and fail if no page produced readable text.
    pub async fn crawl_site(&self, root_url: &str) -> Result<CrawlSession> {
        let session = self.crawl(root_url).await;
        if session.pages.iter().all(|page| page.text.is_empty()) {
            return Err(ScanError::NoReadableContent(root_url.to_string()));
        }
        Ok(session)
    }

    /// Crawl `root_url` until the frontier drains or a budget runs out.
    /// Individual page failures are absorbed, so this always returns a
    /// session, possibly with no pages.
    pub async fn crawl(&self, root_url: &str) -> CrawlSession {
        info!(
            "Starting crawl of {} ({} pages, depth {}, {} parallel)",
            root_url, self.config.max_pages, self.config.max_depth, self.config.parallel_fetches
        );

        let mut session = CrawlSession::new(root_url);
        let mut frontier = self.seed_frontier(root_url).await;
        session.stats.seeded = frontier.len();

        let parallel = self.config.parallel_fetches.max(1);
        let mut in_flight = FuturesUnordered::new();
        let mut saturated = false;

        loop {
            // Fill up to the concurrency limit without overshooting the page budget
            while !saturated
                && in_flight.len() < parallel
                && session.pages.len() + in_flight.len() < self.config.max_pages
            {
                let Some(entry) = frontier.pop() else {
                    break;
                };
                session.stats.dequeued += 1;

                if session.is_visited(&entry.url)
                    || entry.depth > self.config.max_depth
                    || should_skip(&entry.url)
                {
                    session.stats.discarded += 1;
                    continue;
                }

                // Visited before the fetch so the URL cannot be queued again meanwhile
                session.mark_visited(&entry.url);
                session.stats.fetched += 1;

                if let Some(ref callback) = self.progress_callback {
                    callback(session.pages.len(), entry.url.clone());
                }

                let fetcher = &self.fetcher;
                let root = session.root.clone();
                in_flight.push(async move {
                    let outcome = fetcher.process_page(&entry.url, &root).await;
                    (entry.depth, outcome)
                });
            }

            let Some((depth, outcome)) = in_flight.next().await else {
                break;
            };

            if session.absorb(outcome) {
                debug!(
                    "Accepted page {}/{}",
                    session.pages.len(),
                    self.config.max_pages
                );
            }

            if session.pages.len() < self.config.max_pages
                && !self.enqueue_recent_links(&session, &mut frontier, depth + 1)
            {
                info!(
                    "Frontier reached its limit of {} entries, finishing in-flight fetches",
                    frontier.capacity()
                );
                saturated = true;
            }

            if session.corpus_len() >= self.config.max_chars {
                info!(
                    "Character budget of {} reached, stopping crawl",
                    self.config.max_chars
                );
                // Dropping `in_flight` cancels whatever is still outstanding
                break;
            }
        }

        if !frontier.is_empty() {
            debug!("{} frontier entries left unvisited", frontier.len());
        }
        session.stats.remaining_queue_len = frontier.len();
        session.stats.peak_queue_len = frontier.peak_len();
        session.stats.queue_overflowed = frontier.overflowed();

        info!(
            "Crawl complete. {} pages accepted, {} URLs visited, {} links indexed",
            session.pages.len(),
            session.visited.len(),
            session.link_index.len()
        );
        session
    }

    /// Queue unvisited links from the recent window of the link index.
    /// Returns false if the frontier refused an entry for lack of room.
    fn enqueue_recent_links(
        &self,
        session: &CrawlSession,
        frontier: &mut Frontier,
        depth: usize,
    ) -> bool {
        for link in session.recent_links(self.config.link_window) {
            if session.is_visited(&link.target)
                || should_skip(&link.target)
                || frontier.contains(&link.target)
            {
                continue;
            }
            if !frontier.push(link.target.clone(), depth) {
                return false;
            }
        }
        true
    }
}
