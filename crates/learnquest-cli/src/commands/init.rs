//! The `learnquest init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    // Create learnquest.toml
    if std::path::Path::new("learnquest.toml").exists() {
        println!("learnquest.toml already exists, skipping.");
    } else {
        std::fs::write("learnquest.toml", SAMPLE_CONFIG)?;
        println!("Created learnquest.toml");
    }

    // Create a sample snapshot
    let snapshot_path = std::path::Path::new("snapshot.json");
    if snapshot_path.exists() {
        println!("snapshot.json already exists, skipping.");
    } else {
        std::fs::write(snapshot_path, SAMPLE_SNAPSHOT)?;
        println!("Created snapshot.json");
    }

    println!("\nNext steps:");
    println!("  1. Point [generator] in learnquest.toml at your question service");
    println!("  2. Run: learnquest validate");
    println!("  3. Run: learnquest recommend --snapshot snapshot.json");
    println!("  4. Run: learnquest quiz --snapshot snapshot.json --history history.json");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# learnquest configuration

[generator]
type = "http"
base_url = "http://localhost:8000"
api_key = "${LEARNQUEST_API_KEY}"
timeout_secs = 30

# Use this instead to always serve the offline question bank:
# [generator]
# type = "offline"

[thresholds]
# A weakest subject below this score gets a booster test.
remediation = 65.0
# Below this the booster test is easy instead of medium.
easy = 40.0

# Exam profiles override the built-in ones per test type.
# [[exams]]
# test_type = "internal1"
# name = "Internal Test 1"
# topic = "General Science"
# questions_needed = 10
# marks_per_question = 4.0

# Offline questions replace the built-in bank for their test type.
# [[fallback]]
# test_type = "math"
# question = "What is 7 x 8?"
# options = ["54", "56", "58", "64"]
# correct_answer = "56"

# A [[badges]] list replaces the whole built-in catalog.
# [[badges]]
# id = "first-step"
# icon = "🌱"
# label = "First Step"
# metric = "total_tests"
# threshold = 1
"#;

const SAMPLE_SNAPSHOT: &str = r#"{
  "risk_level": "Medium",
  "math_score": 58.0,
  "reading_score": 72.0,
  "writing_score": 69.0,
  "predicted_marks": 66.0,
  "pass_probability": 0.62,
  "taken_at": "2025-01-01T00:00:00Z"
}
"#;
