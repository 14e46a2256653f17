//! Keyword-directed follow-up crawl.
//!
//! When a question cannot be answered from the text collected so far, the
//! links already sitting in the session's index are ranked against the
//! question's keywords and the best few unvisited ones are fetched.

use crate::crawler::Crawler;
use crate::result::Link;
use crate::session::CrawlSession;
use std::collections::{BTreeSet, HashSet};
use tracing::{debug, info};

/// Lowercase word tokens longer than three characters.
pub fn extract_keywords(question: &str) -> BTreeSet<String> {
    question
        .split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|word| word.chars().count() > 3)
        .map(str::to_lowercase)
        .collect()
}

/// +2 for each keyword in the URL, +1 for each keyword in the anchor text.
pub fn score_link(link: &Link, keywords: &BTreeSet<String>) -> u32 {
    let target = link.target.to_lowercase();
    let label = link.label.to_lowercase();

    keywords
        .iter()
        .map(|keyword| {
            let mut score = 0;
            if target.contains(keyword.as_str()) {
                score += 2;
            }
            if label.contains(keyword.as_str()) {
                score += 1;
            }
            score
        })
        .sum()
}

/// Unvisited link targets ordered by score, best first. Ties keep index
/// order, links that match no keyword are left out, and each target
/// appears once.
pub fn rank_candidates(
    session: &CrawlSession,
    keywords: &BTreeSet<String>,
    limit: usize,
) -> Vec<String> {
    let mut scored: Vec<(u32, &Link)> = session
        .link_index
        .iter()
        .map(|link| (score_link(link, keywords), link))
        .filter(|(score, _)| *score > 0)
        .collect();
    // sort_by is stable, so equal scores stay in discovery order
    scored.sort_by(|a, b| b.0.cmp(&a.0));

    let mut seen = HashSet::new();
    scored
        .into_iter()
        .map(|(_, link)| link.target.as_str())
        .filter(|target| !session.is_visited(target) && seen.insert(*target))
        .take(limit)
        .map(str::to_string)
        .collect()
}

impl Crawler {
    /// Extend `session` with pages likely to answer `question`. Candidates
    /// are fetched one after another; never fails, and does nothing when the
    /// question has no usable keywords or no link matches them.
    pub async fn focused_crawl(&self, session: &mut CrawlSession, question: &str) {
        let keywords = extract_keywords(question);
        if keywords.is_empty() {
            debug!("No keywords in question, skipping focused crawl");
            return;
        }

        let candidates = rank_candidates(session, &keywords, self.config.focused_pages);
        if candidates.is_empty() {
            debug!("No indexed link matches {:?}", keywords);
            return;
        }
        info!(
            "Focused crawl over {} candidates for {:?}",
            candidates.len(),
            keywords
        );

        let root = session.root.clone();
        for url in candidates {
            if session.corpus_len() >= self.config.max_chars {
                info!("Character budget reached, ending focused crawl");
                break;
            }

            session.mark_visited(&url);
            session.stats.fetched += 1;
            let outcome = self.fetcher.process_page(&url, &root).await;
            if session.absorb(outcome) {
                debug!("Focused crawl accepted {}", url);
            }
        }
    }
}
