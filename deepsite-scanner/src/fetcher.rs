use crate::error::Result;
use crate::normalize::{is_same_domain, normalize};
use crate::result::{Link, Page, PageOutcome};
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use scraper::{ElementRef, Html, Node, Selector};
use std::sync::LazyLock;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

pub const USER_AGENT: &str = "deepsite/0.1";

/// Subtrees whose text never makes it into a page's corpus text.
const EXCLUDED_ELEMENTS: &[&str] = &[
    "script", "style", "noscript", "header", "footer", "nav", "aside",
];

static TITLE_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("title").expect("valid title selector"));
static LINK_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href]").expect("valid link selector"));

/// Build the HTTP client shared by every phase of a session.
pub fn build_client(timeout: Duration) -> Result<Client> {
    let client = Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .connect_timeout(timeout / 2)
        .pool_max_idle_per_host(16)
        .pool_idle_timeout(Duration::from_secs(90))
        .redirect(reqwest::redirect::Policy::limited(10))
        .build()?;
    Ok(client)
}

/// Fetches one page at a time and turns it into a [`PageOutcome`].
#[derive(Debug, Clone)]
pub struct PageFetcher {
    client: Client,
    timeout: Duration,
    min_text_len: usize,
}

impl PageFetcher {
    pub fn new(timeout: Duration, min_text_len: usize) -> Result<Self> {
        Ok(Self::with_client(build_client(timeout)?, timeout, min_text_len))
    }

    pub fn with_client(client: Client, timeout: Duration, min_text_len: usize) -> Self {
        Self {
            client,
            timeout,
            min_text_len,
        }
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    /// GET `url`, returning the body only when the server says it is HTML.
    /// Transport errors and 4xx/5xx statuses are errors; other content types
    /// are `Ok(None)`.
    pub async fn fetch_html(&self, url: &str) -> Result<Option<String>> {
        let response = self
            .client
            .get(url)
            .timeout(self.timeout)
            .send()
            .await?
            .error_for_status()?;

        let is_html = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|ct| ct.contains("text/html"))
            .unwrap_or(false);

        if !is_html {
            return Ok(None);
        }
        Ok(Some(response.text().await?))
    }

    /// Fetch and extract a page. Never fails: fetch errors come back as an
    /// outcome with `error` set and no page.
    pub async fn process_page(&self, url: &str, root: &str) -> PageOutcome {
        debug!("Fetching {}", url);

        let html = match self.fetch_html(url).await {
            Ok(Some(html)) => html,
            Ok(None) => {
                debug!("Skipping non-HTML response from {}", url);
                return PageOutcome::with_error(url.to_string(), "non-HTML content".to_string());
            }
            Err(e) => {
                warn!("Fetch failed for {}: {}", url, e);
                return PageOutcome::with_error(url.to_string(), e.to_string());
            }
        };

        let (page, links) = extract_page(url, &html, root, self.min_text_len);
        PageOutcome {
            url: url.to_string(),
            page,
            links,
            error: None,
        }
    }
}

/// Parse `html` and pull out the page (if its text is long enough) and the
/// links that stay on `root`'s domain.
pub fn extract_page(
    url: &str,
    html: &str,
    root: &str,
    min_text_len: usize,
) -> (Option<Page>, Vec<Link>) {
    let document = Html::parse_document(html);

    let links: Vec<Link> = extract_links(url, &document)
        .into_iter()
        .filter(|link| is_same_domain(root, &link.target))
        .collect();

    let (title, text) = extract_main_text(&document);
    let text_len = text.chars().count();
    if text_len < min_text_len {
        debug!(
            "Discarding {}: {} chars of text (minimum {})",
            url, text_len, min_text_len
        );
        return (None, links);
    }

    let page = Page {
        url: url.to_string(),
        title,
        text,
    };
    (Some(page), links)
}

/// Collapse whitespace runs to single spaces and trim.
pub fn clean_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Returns `(title, text)` with boilerplate subtrees left out of `text`.
pub fn extract_main_text(document: &Html) -> (String, String) {
    let title = document
        .select(&TITLE_SELECTOR)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
        .unwrap_or_default();

    let mut fragments = Vec::new();
    collect_visible_text(document.root_element(), &mut fragments);

    (title, clean_text(&fragments.join(" ")))
}

fn collect_visible_text<'a>(element: ElementRef<'a>, out: &mut Vec<&'a str>) {
    for child in element.children() {
        if let Some(child_element) = ElementRef::wrap(child) {
            if !EXCLUDED_ELEMENTS.contains(&child_element.value().name()) {
                collect_visible_text(child_element, out);
            }
        } else if let Node::Text(text) = child.value() {
            out.push(text);
        }
    }
}

/// Every `<a href>` that resolves to an http(s) URL, normalized and paired
/// with its anchor text.
pub fn extract_links(base_url: &str, document: &Html) -> Vec<Link> {
    let Ok(base) = Url::parse(base_url) else {
        debug!("Cannot resolve links against {}", base_url);
        return Vec::new();
    };

    document
        .select(&LINK_SELECTOR)
        .filter_map(|element| {
            let href = element.value().attr("href")?;
            let resolved = base.join(href).ok()?;
            if !resolved.as_str().starts_with("http") {
                return None;
            }
            let label = clean_text(&element.text().collect::<Vec<_>>().join(" "));
            Some(Link::new(normalize(resolved.as_str()), label))
        })
        .collect()
}
