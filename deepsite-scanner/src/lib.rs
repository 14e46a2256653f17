pub mod crawler;
pub mod error;
pub mod fetcher;
pub mod focused;
pub mod frontier;
pub mod normalize;
pub mod result;
pub mod session;
pub mod sitemap;

pub use crawler::{CrawlConfig, Crawler, ProgressCallback};
pub use error::ScanError;
pub use fetcher::PageFetcher;
pub use frontier::{Frontier, FrontierEntry};
pub use result::{Link, Page, PageOutcome};
pub use session::{CrawlSession, CrawlStats};
