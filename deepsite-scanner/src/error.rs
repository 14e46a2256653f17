use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Sitemap parse error: {0}")]
    XmlError(#[from] quick_xml::Error),

    #[error("No readable content found for {0}")]
    NoReadableContent(String),
}

pub type Result<T> = std::result::Result<T, ScanError>;
