// Tests for the crawl / summarize / ask workflow

use async_trait::async_trait;
use deepsite_core::{
    AnswerEngine, Assistant, CoreError, InMemorySessionStore, Instruction, SessionStore,
};
use deepsite_scanner::{CrawlConfig, Crawler};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path},
};

/// Records every prompt and answers with a fixed string.
#[derive(Default)]
struct RecordingEngine {
    prompts: Mutex<Vec<String>>,
}

impl RecordingEngine {
    fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl AnswerEngine for RecordingEngine {
    async fn generate(
        &self,
        corpus: &str,
        instruction: &Instruction,
    ) -> deepsite_core::Result<String> {
        self.prompts.lock().unwrap().push(instruction.render(corpus));
        Ok("stub answer".to_string())
    }
}

struct FailingEngine;

#[async_trait]
impl AnswerEngine for FailingEngine {
    async fn generate(
        &self,
        _corpus: &str,
        _instruction: &Instruction,
    ) -> deepsite_core::Result<String> {
        Err(CoreError::Engine("model not loaded".to_string()))
    }
}

fn long_text(label: &str) -> String {
    format!("{} {}", label, "lorem ipsum dolor sit amet ".repeat(10))
}

fn html_page(body: &str, links: &[(&str, &str)]) -> String {
    let anchors: String = links
        .iter()
        .map(|(href, label)| format!(r#"<a href="{href}">{label}</a>"#))
        .collect();
    format!("<html><head><title>t</title></head><body><p>{body}</p>{anchors}</body></html>")
}

async fn mount_html(server: &MockServer, route: &str, html: String, expected: u64) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(html, "text/html"),
        )
        .expect(expected)
        .mount(server)
        .await;
}

fn crawler(max_pages: usize) -> Crawler {
    Crawler::new(CrawlConfig {
        max_pages,
        timeout: Duration::from_secs(5),
        use_sitemap: false,
        ..CrawlConfig::default()
    })
    .unwrap()
}

fn assistant(max_pages: usize, engine: Arc<dyn AnswerEngine>) -> Assistant {
    let store: Arc<dyn SessionStore> = Arc::new(InMemorySessionStore::new());
    Assistant::new(crawler(max_pages), store, engine)
}

#[tokio::test]
async fn test_summarize_stores_session() {
    let mock_server = MockServer::start().await;
    mount_html(
        &mock_server,
        "/",
        html_page(&long_text("welcome home"), &[("/about", "About us")]),
        1,
    )
    .await;
    mount_html(&mock_server, "/about", html_page(&long_text("about page"), &[]), 1).await;

    let engine = Arc::new(RecordingEngine::default());
    let assistant = assistant(12, engine.clone());

    // No trailing slash: the root is canonicalized before crawling
    let report = assistant.summarize(&mock_server.uri()).await.unwrap();

    assert_eq!(report.summary, "stub answer");
    assert_eq!(report.pages_crawled, 2);
    assert_eq!(assistant.store().len(), 1);
    assert!(assistant.store().get(&report.session_id).is_some());

    let prompts = engine.prompts();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains("welcome home"));
    assert!(prompts[0].contains("about page"));
    assert!(prompts[0].contains(&format!("Website URL: {}/", mock_server.uri())));
    assert!(prompts[0].ends_with("Summary:"));
}

#[tokio::test]
async fn test_summarize_truncates_corpus() {
    let mock_server = MockServer::start().await;
    mount_html(&mock_server, "/", html_page(&long_text("home"), &[]), 1).await;

    let engine = Arc::new(RecordingEngine::default());
    let store: Arc<dyn SessionStore> = Arc::new(InMemorySessionStore::new());
    let crawler = Crawler::new(CrawlConfig {
        max_chars: 40,
        timeout: Duration::from_secs(5),
        use_sitemap: false,
        ..CrawlConfig::default()
    })
    .unwrap();
    let assistant = Assistant::new(crawler, store, engine.clone());

    assistant.summarize(&mock_server.uri()).await.unwrap();

    let prompt = &engine.prompts()[0];
    let corpus = prompt
        .split("Content:\n")
        .nth(1)
        .and_then(|rest| rest.split("\n\nSummary:").next())
        .unwrap();
    assert_eq!(corpus.chars().count(), 40);
}

#[tokio::test]
async fn test_summarize_no_readable_content() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw("{}", "application/json"),
        )
        .mount(&mock_server)
        .await;

    let engine = Arc::new(RecordingEngine::default());
    let assistant = assistant(12, engine.clone());

    let err = assistant.summarize(&mock_server.uri()).await.unwrap_err();

    assert!(matches!(err, CoreError::NoReadableContent(_)));
    assert!(engine.prompts().is_empty());
    assert!(assistant.store().is_empty());
}

#[tokio::test]
async fn test_summarize_rejects_invalid_url() {
    let assistant = assistant(12, Arc::new(RecordingEngine::default()));

    assert!(matches!(
        assistant.summarize("mailto:someone@example.com").await,
        Err(CoreError::Scan(_))
    ));
}

#[tokio::test]
async fn test_summarize_engine_failure_stores_nothing() {
    let mock_server = MockServer::start().await;
    mount_html(&mock_server, "/", html_page(&long_text("home"), &[]), 1).await;

    let assistant = assistant(12, Arc::new(FailingEngine));

    let err = assistant.summarize(&mock_server.uri()).await.unwrap_err();
    assert!(err.to_string().contains("model not loaded"));
    assert!(assistant.store().is_empty());
}

#[tokio::test]
async fn test_ask_unknown_session() {
    let engine = Arc::new(RecordingEngine::default());
    let assistant = assistant(12, engine.clone());

    let err = assistant.ask("missing", "What are your hours?").await.unwrap_err();

    assert!(matches!(err, CoreError::UnknownSession(ref id) if id == "missing"));
    assert!(engine.prompts().is_empty());
}

#[tokio::test]
async fn test_ask_runs_focused_crawl() {
    let mock_server = MockServer::start().await;
    mount_html(
        &mock_server,
        "/",
        html_page(
            &long_text("welcome home"),
            &[("/about", "About us"), ("/refund-policy", "Refunds")],
        ),
        1,
    )
    .await;
    mount_html(
        &mock_server,
        "/refund-policy",
        html_page(&long_text("refunds within thirty days"), &[]),
        1,
    )
    .await;
    mount_html(&mock_server, "/about", html_page(&long_text("about"), &[]), 0).await;

    let engine = Arc::new(RecordingEngine::default());
    // One page budget: the main crawl only reaches the root
    let assistant = assistant(1, engine.clone());
    let report = assistant.summarize(&mock_server.uri()).await.unwrap();
    assert_eq!(report.pages_crawled, 1);

    let answer = assistant
        .ask(&report.session_id, "What is the refund policy?")
        .await
        .unwrap();
    assert_eq!(answer, "stub answer");

    let prompts = engine.prompts();
    assert_eq!(prompts.len(), 2);
    assert!(prompts[1].contains("refunds within thirty days"));
    assert!(prompts[1].ends_with("Question: What is the refund policy?\nAnswer:"));

    let handle = assistant.store().get(&report.session_id).unwrap();
    let session = handle.lock().await;
    assert_eq!(session.pages.len(), 2);
}

#[tokio::test]
async fn test_ask_skips_focused_crawl_when_text_present() {
    let mock_server = MockServer::start().await;
    mount_html(
        &mock_server,
        "/",
        html_page(
            &format!("{} opening hours", long_text("home")),
            &[("/opening-hours", "Opening hours")],
        ),
        1,
    )
    .await;
    mount_html(&mock_server, "/opening-hours", html_page(&long_text("hours"), &[]), 0).await;

    let engine = Arc::new(RecordingEngine::default());
    let assistant = assistant(1, engine.clone());
    let report = assistant.summarize(&mock_server.uri()).await.unwrap();

    assistant.ask(&report.session_id, "Opening Hours").await.unwrap();

    let handle = assistant.store().get(&report.session_id).unwrap();
    assert_eq!(handle.lock().await.pages.len(), 1);
}

#[tokio::test]
async fn test_learn_returns_session_without_storing() {
    let mock_server = MockServer::start().await;
    mount_html(&mock_server, "/", html_page(&long_text("home"), &[]), 1).await;

    let engine = Arc::new(RecordingEngine::default());
    let assistant = assistant(12, engine.clone());

    let session = assistant.learn(&mock_server.uri()).await.unwrap();

    assert_eq!(session.pages.len(), 1);
    assert_eq!(session.root, format!("{}/", mock_server.uri()));
    assert!(assistant.store().is_empty());
    assert!(engine.prompts().is_empty());
}
