//! learnquest-providers: question generator and storage integrations.
//!
//! Implements the `QuestionGenerator` trait over HTTP (plus an offline
//! generator that always defers to the fallback bank), a JSON-file history
//! store for the CLI, and mocks for tests.

pub mod config;
pub mod error;
pub mod http;
pub mod mock;
pub mod offline;
pub mod store;

pub use config::{create_generator, load_config, GeneratorConfig, LearnquestConfig};
pub use error::ProviderError;
pub use http::HttpQuestionGenerator;
pub use offline::OfflineGenerator;
pub use store::FileStore;
