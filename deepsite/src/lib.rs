// Include handlers module directly from handlers.rs
#[path = "handlers.rs"]
pub mod handlers;

// Re-export commonly used handler functions for convenience
pub use handlers::{CrawlOverrides, load_questions_from_file, parse_url_line, render_summary};

// Re-export crawl reporting from deepsite-core
pub use deepsite_core::crawl::{extract_url_path, generate_crawl_report};
