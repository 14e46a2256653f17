// Seed the frontier from /sitemap.xml

use crate::error::{Result, ScanError};
use crate::normalize::canonicalize;
use quick_xml::events::Event;
use quick_xml::reader::Reader;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

pub fn sitemap_url(root_url: &str) -> Result<String> {
    let root = Url::parse(root_url)
        .map_err(|e| ScanError::InvalidUrl(format!("{}: {}", root_url, e)))?;
    let sitemap = root
        .join("/sitemap.xml")
        .map_err(|e| ScanError::InvalidUrl(format!("{}: {}", root_url, e)))?;
    Ok(sitemap.to_string())
}

/// Canonicalized `<loc>` values from the site's sitemap. A missing or broken
/// sitemap is common and yields an empty list rather than an error.
pub async fn fetch_sitemap_links(
    client: &Client,
    root_url: &str,
    timeout: Duration,
) -> Vec<String> {
    let url = match sitemap_url(root_url) {
        Ok(url) => url,
        Err(e) => {
            debug!("No sitemap lookup: {}", e);
            return Vec::new();
        }
    };

    let body = match fetch_body(client, &url, timeout).await {
        Ok(body) => body,
        Err(e) => {
            debug!("No sitemap at {}: {}", url, e);
            return Vec::new();
        }
    };

    let mut links = Vec::new();
    if let Err(e) = parse_locs(&body, &mut links) {
        warn!("Malformed sitemap {}, keeping {} entries: {}", url, links.len(), e);
    }
    info!("Sitemap {} listed {} URLs", url, links.len());
    links
}

async fn fetch_body(client: &Client, url: &str, timeout: Duration) -> Result<String> {
    let response = client
        .get(url)
        .timeout(timeout)
        .send()
        .await?
        .error_for_status()?;
    Ok(response.text().await?)
}

/// Push every `<loc>` that parses as an absolute URL into `out`,
/// canonicalized. Entries read before a parse error stay in `out`.
pub fn parse_locs(xml: &str, out: &mut Vec<String>) -> Result<()> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut in_loc = false;
    let mut current = String::new();

    loop {
        match reader.read_event()? {
            Event::Start(e) if e.local_name().as_ref() == b"loc" => {
                in_loc = true;
                current.clear();
            }
            Event::Text(t) if in_loc => {
                current.push_str(&t.unescape()?);
            }
            Event::CData(c) if in_loc => {
                current.push_str(&String::from_utf8_lossy(&c));
            }
            Event::End(e) if e.local_name().as_ref() == b"loc" => {
                in_loc = false;
                let loc = current.trim();
                if loc.is_empty() {
                    continue;
                }
                match canonicalize(loc) {
                    Some(url) => out.push(url),
                    None => debug!("Skipping sitemap entry {}", loc),
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(())
}
