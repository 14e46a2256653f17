// Crawl a site, summarize it, and answer follow-up questions against the
// stored session.

use crate::engine::{AnswerEngine, Instruction};
use crate::error::{CoreError, Result};
use crate::store::SessionStore;
use deepsite_scanner::{CrawlSession, Crawler, ScanError};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};
use url::Url;

#[derive(Debug, Clone, Serialize)]
pub struct SummaryReport {
    pub session_id: String,
    pub summary: String,
    pub pages_crawled: usize,
}

pub struct Assistant {
    crawler: Crawler,
    store: Arc<dyn SessionStore>,
    engine: Arc<dyn AnswerEngine>,
}

impl Assistant {
    pub fn new(
        crawler: Crawler,
        store: Arc<dyn SessionStore>,
        engine: Arc<dyn AnswerEngine>,
    ) -> Self {
        Self {
            crawler,
            store,
            engine,
        }
    }

    pub fn store(&self) -> &Arc<dyn SessionStore> {
        &self.store
    }

    /// Crawl `url` without storing or summarizing anything.
    pub async fn learn(&self, url: &str) -> Result<CrawlSession> {
        let root = canonical_root(url)?;
        match self.crawler.crawl_site(&root).await {
            Ok(session) => Ok(session),
            Err(ScanError::NoReadableContent(url)) => Err(CoreError::NoReadableContent(url)),
            Err(e) => Err(e.into()),
        }
    }

    /// Crawl and summarize a site, then keep the session for questions.
    pub async fn summarize(&self, url: &str) -> Result<SummaryReport> {
        let session = self.learn(url).await?;
        let corpus = session.truncated_corpus(self.crawler.config().max_chars);

        let summary = self
            .engine
            .generate(&corpus, &summary_instruction(&session.root))
            .await?;

        let pages_crawled = session.pages.len();
        let session_id = self.store.create(session);
        info!("Stored session {} ({} pages)", session_id, pages_crawled);

        Ok(SummaryReport {
            session_id,
            summary,
            pages_crawled,
        })
    }

    /// Answer a question about a stored session, running a focused crawl
    /// first when the question's text is not already in the corpus.
    pub async fn ask(&self, session_id: &str, question: &str) -> Result<String> {
        let handle = self
            .store
            .get(session_id)
            .ok_or_else(|| CoreError::UnknownSession(session_id.to_string()))?;

        let mut session = handle.lock().await;
        if session.contains_literally(question) {
            debug!("Question text already present in corpus");
        } else {
            let before = session.pages.len();
            self.crawler.focused_crawl(&mut session, question).await;
            info!(
                "Focused crawl added {} pages",
                session.pages.len().saturating_sub(before)
            );
        }

        let corpus = session.truncated_corpus(self.crawler.config().max_chars);
        let instruction = question_instruction(&session.root, question);
        // The answer engine does not touch the session
        drop(session);

        self.engine.generate(&corpus, &instruction).await
    }
}

/// Parse and re-serialize the root so it matches the spelling of links
/// resolved during the crawl (lowercased host, explicit path).
pub fn canonical_root(url: &str) -> Result<String> {
    let parsed =
        Url::parse(url.trim()).map_err(|e| ScanError::InvalidUrl(format!("{}: {}", url, e)))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        let reason = format!("{}: only http(s) sites can be crawled", url);
        return Err(ScanError::InvalidUrl(reason).into());
    }
    Ok(parsed.to_string())
}

pub fn summary_instruction(site_url: &str) -> Instruction {
    let preamble = format!(
        "You are a helpful assistant summarizing a website for a user. \
         Respond in a structured format with headings.\n\n\
         Format:\n\
         Overview: <2-3 sentences>\n\
         Key Sections:\n\
         - Bullet list of major sections or services.\n\
         Important Details:\n\
         - Bullet list of policies, contacts, hours, or deadlines.\n\
         Suggested Questions:\n\
         - Bullet list of 3 follow-up questions.\n\n\
         Website URL: {}",
        site_url
    );
    Instruction::new(preamble, "Summary:")
}

pub fn question_instruction(site_url: &str, question: &str) -> Instruction {
    let preamble = format!(
        "You are a helpful assistant answering questions about a website. \
         Use the provided content. If the answer is not in the content, say you are not sure. \
         Respond in a structured format with headings.\n\n\
         Format:\n\
         Answer: <clear response>\n\
         Evidence:\n\
         - Bullet list of supporting details from the site content.\n\
         Confidence: <High/Medium/Low>\n\n\
         Website URL: {}",
        site_url
    );
    Instruction::new(preamble, format!("Question: {}\nAnswer:", question))
}
