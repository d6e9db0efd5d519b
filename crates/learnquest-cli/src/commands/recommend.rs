//! The `learnquest recommend` command.

use std::path::PathBuf;

use anyhow::Result;

use learnquest_core::model::RecommendationSpec;
use learnquest_providers::FileStore;

use super::load_engine;

pub async fn execute(
    snapshot: Option<PathBuf>,
    user: String,
    json: bool,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let engine = load_engine(config_path.as_deref())?;
    let store = FileStore::new(snapshot, None);

    let spec = engine.recommend(&store, &user).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&spec)?);
        return Ok(());
    }

    match spec {
        Some(spec) => print_spec(&spec),
        None => {
            println!("No recommendation yet. Take a prediction test first, or pick a quiz with:");
            println!("  learnquest quiz --test-type math --difficulty medium");
        }
    }

    Ok(())
}

pub(crate) fn print_spec(spec: &RecommendationSpec) {
    println!("Recommended: {} ({})", spec.subject_label, spec.difficulty);
    println!("  test type:  {}", spec.test_type);
    println!("  topic:      {}", spec.learning_context);
    println!("  why:        {}", spec.rationale);
}
