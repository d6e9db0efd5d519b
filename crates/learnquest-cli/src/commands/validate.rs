//! The `learnquest validate` command.

use std::path::PathBuf;

use anyhow::Result;

use learnquest_providers::config::{find_config_path, load_config_from};

use super::load_engine;

pub fn execute(config_path: Option<PathBuf>) -> Result<()> {
    let Some(path) = find_config_path(config_path.as_deref())? else {
        println!("No config file found; built-in defaults are in use.");
        println!("Run `learnquest init` to create learnquest.toml.");
        return Ok(());
    };

    let engine = load_engine(Some(&path))?;
    let provider = load_config_from(Some(&path))?;
    let config = engine.config();

    println!("Config: {}", path.display());
    println!("  generator:  {:?}", provider.generator);
    println!(
        "  thresholds: booster below {}, easy below {}",
        config.thresholds.remediation, config.thresholds.easy
    );
    for profile in config.exams.iter() {
        println!(
            "  exam {:<10} {} ({}), {} x {} marks ({} max), {} offline question(s)",
            profile.test_type.to_string(),
            profile.name,
            profile.topic,
            profile.questions_needed,
            profile.marks_per_question,
            profile.max_marks(),
            config.fallback.len(profile.test_type),
        );
    }
    println!("  badges:     {}", config.badges.len());

    println!("Config valid.");

    Ok(())
}
