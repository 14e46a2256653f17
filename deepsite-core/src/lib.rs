pub mod assistant;
pub mod config;
pub mod crawl;
pub mod engine;
pub mod error;
pub mod store;

pub use assistant::{Assistant, SummaryReport};
pub use config::{OllamaConfig, Settings};
pub use engine::{AnswerEngine, Instruction, OllamaEngine};
pub use error::{CoreError, Result};
pub use store::{InMemorySessionStore, SessionHandle, SessionStore};
