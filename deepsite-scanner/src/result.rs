use serde::{Deserialize, Serialize};

/// A hyperlink harvested from a page. `target` is already normalized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub target: String,
    pub label: String,
}

impl Link {
    pub fn new(target: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            label: label.into(),
        }
    }
}

/// A page whose extracted text passed the minimum length check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub url: String,
    pub title: String,
    pub text: String,
}

impl Page {
    /// Length of the extracted text in characters.
    pub fn text_len(&self) -> usize {
        self.text.chars().count()
    }
}

/// What a single fetch produced. Workers hand this back to the crawl
/// coordinator, which is the only place session state gets mutated.
#[derive(Debug, Clone, Default)]
pub struct PageOutcome {
    pub url: String,
    pub page: Option<Page>,
    /// Same-domain links found on the page, kept even when `page` is `None`
    /// because the text was too short.
    pub links: Vec<Link>,
    pub error: Option<String>,
}

impl PageOutcome {
    pub fn new(url: String) -> Self {
        Self {
            url,
            ..Default::default()
        }
    }

    pub fn with_error(url: String, error: String) -> Self {
        Self {
            url,
            error: Some(error),
            ..Default::default()
        }
    }
}
