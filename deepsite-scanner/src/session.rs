use crate::normalize::is_same_domain;
use crate::result::{Link, Page, PageOutcome};
use std::collections::HashSet;

/// Counters collected while a session is being crawled.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlStats {
    /// Entries placed on the frontier before the first dequeue
    pub seeded: usize,
    pub dequeued: usize,
    /// Dequeued entries dropped as visited, too deep, or skip-filtered
    pub discarded: usize,
    pub fetched: usize,
    /// Fetches that errored or returned non-HTML content
    pub failed: usize,
    /// Largest frontier length observed at any point of the crawl
    pub peak_queue_len: usize,
    /// Frontier length when the crawl stopped
    pub remaining_queue_len: usize,
    pub queue_overflowed: bool,
}

/// Everything learned about one site: accepted pages, visited URLs and the
/// index of same-domain links seen so far.
#[derive(Debug, Clone)]
pub struct CrawlSession {
    pub root: String,
    pub pages: Vec<Page>,
    pub visited: HashSet<String>,
    pub link_index: Vec<Link>,
    pub stats: CrawlStats,
}

impl CrawlSession {
    pub fn new(root: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            pages: Vec::new(),
            visited: HashSet::new(),
            link_index: Vec::new(),
            stats: CrawlStats::default(),
        }
    }

    /// Page texts in fetch order, separated by a blank line.
    pub fn corpus(&self) -> String {
        self.pages
            .iter()
            .map(|page| page.text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Character length of [`Self::corpus`] without building the string.
    pub fn corpus_len(&self) -> usize {
        let text: usize = self.pages.iter().map(Page::text_len).sum();
        text + 2 * self.pages.len().saturating_sub(1)
    }

    /// The corpus cut to at most `max_chars` characters.
    pub fn truncated_corpus(&self, max_chars: usize) -> String {
        self.corpus().chars().take(max_chars).collect()
    }

    pub fn is_visited(&self, url: &str) -> bool {
        self.visited.contains(url)
    }

    /// Returns false if the URL was already visited.
    pub fn mark_visited(&mut self, url: &str) -> bool {
        self.visited.insert(url.to_string())
    }

    /// Append links to the index, dropping any that leave the root's domain.
    pub fn record_links(&mut self, links: impl IntoIterator<Item = Link>) {
        let root = self.root.clone();
        self.link_index
            .extend(links.into_iter().filter(|link| is_same_domain(&root, &link.target)));
    }

    /// Merge a fetch result: its links go into the index whether or not the
    /// page itself was accepted. Returns true if a page was appended.
    pub fn absorb(&mut self, outcome: PageOutcome) -> bool {
        if outcome.error.is_some() {
            self.stats.failed += 1;
        }
        self.record_links(outcome.links);
        match outcome.page {
            Some(page) => {
                self.pages.push(page);
                true
            }
            None => false,
        }
    }

    /// The last `window` entries of the link index.
    pub fn recent_links(&self, window: usize) -> &[Link] {
        let start = self.link_index.len().saturating_sub(window);
        &self.link_index[start..]
    }

    /// Whether the question text already appears verbatim (ignoring case)
    /// in the corpus.
    pub fn contains_literally(&self, question: &str) -> bool {
        self.corpus()
            .to_lowercase()
            .contains(&question.to_lowercase())
    }
}
