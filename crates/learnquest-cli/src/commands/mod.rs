//! Subcommand implementations and the engine wiring they share.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::debug;

use learnquest_core::config::{load_engine_config, EngineConfig};
use learnquest_core::AssessmentEngine;
use learnquest_providers::config::{find_config_path, load_config_from};
use learnquest_providers::{create_generator, GeneratorConfig};

pub mod badges;
pub mod init;
pub mod quiz;
pub mod recommend;
pub mod validate;

/// Learner id used when none is given.
pub const DEFAULT_USER: &str = "local";

/// Build the engine from the config file at `config_path`, or from the
/// default search locations, or from built-in defaults.
pub fn load_engine(config_path: Option<&Path>) -> Result<AssessmentEngine> {
    let path = find_config_path(config_path)?;

    let engine_config = match &path {
        Some(p) => load_engine_config(p)?,
        None => EngineConfig::default(),
    };
    let provider_config = load_config_from(path.as_deref())?;

    let generator = create_generator(&provider_config.generator)?;
    debug!(
        config = ?path,
        generator = generator.name(),
        "engine configured"
    );
    let mut engine = AssessmentEngine::new(engine_config, Arc::from(generator))
        .context("invalid engine configuration")?;
    if let GeneratorConfig::Http { timeout_secs, .. } = provider_config.generator {
        engine = engine.with_fetch_timeout(Duration::from_secs(timeout_secs));
    }

    Ok(engine)
}
