//! CLI integration tests using assert_cmd.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const OFFLINE_CONFIG: &str = "[generator]\ntype = \"offline\"\n";

/// Correct options (1-based) for the built-in offline math questions.
const MATH_ANSWERS: &str = "2\n2\n3\n";

/// A command isolated from the user's real config and environment.
fn learnquest(dir: &TempDir) -> Command {
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("learnquest").unwrap();
    cmd.current_dir(dir.path())
        .env("HOME", dir.path())
        .env_remove("LEARNQUEST_GENERATOR_URL")
        .env_remove("RUST_LOG");
    cmd
}

fn offline_dir() -> TempDir {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("learnquest.toml"), OFFLINE_CONFIG).unwrap();
    dir
}

fn write_snapshot(dir: &TempDir, risk: &str, math: f64, reading: f64, writing: f64) {
    let json = format!(
        r#"{{"risk_level":"{risk}","math_score":{math},"reading_score":{reading},
            "writing_score":{writing},"predicted_marks":60,"pass_probability":0.55,
            "taken_at":"2025-01-01T00:00:00Z"}}"#
    );
    std::fs::write(dir.path().join("snapshot.json"), json).unwrap();
}

#[test]
fn help_output() {
    let dir = TempDir::new().unwrap();
    learnquest(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Adaptive quizzes and achievement badges"));
}

#[test]
fn version_output() {
    let dir = TempDir::new().unwrap();
    learnquest(&dir)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("learnquest"));
}

#[test]
fn init_creates_files() {
    let dir = TempDir::new().unwrap();

    learnquest(&dir)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Created learnquest.toml"))
        .stdout(predicate::str::contains("Created snapshot.json"));

    assert!(dir.path().join("learnquest.toml").exists());
    assert!(dir.path().join("snapshot.json").exists());
}

#[test]
fn init_skips_existing() {
    let dir = TempDir::new().unwrap();

    learnquest(&dir).arg("init").assert().success();

    learnquest(&dir)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));
}

#[test]
fn validate_generated_config() {
    let dir = TempDir::new().unwrap();
    learnquest(&dir).arg("init").assert().success();

    learnquest(&dir)
        .arg("validate")
        .assert()
        .success()
        .stdout(predicate::str::contains("Config valid."))
        .stdout(predicate::str::contains("10 x 10 marks (100 max)"))
        .stdout(predicate::str::contains("badges:     20"));
}

#[test]
fn validate_without_config_uses_defaults() {
    let dir = TempDir::new().unwrap();
    learnquest(&dir)
        .arg("validate")
        .assert()
        .success()
        .stdout(predicate::str::contains("built-in defaults"));
}

#[test]
fn validate_rejects_bad_thresholds() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bad.toml");
    std::fs::write(&path, "[thresholds]\nremediation = 30.0\neasy = 50.0\n").unwrap();

    learnquest(&dir)
        .arg("validate")
        .arg("--config")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"))
        .stderr(predicate::str::contains("invalid planner thresholds"));
}

#[test]
fn validate_nonexistent_file() {
    let dir = TempDir::new().unwrap();
    learnquest(&dir)
        .arg("validate")
        .arg("--config")
        .arg("nonexistent.toml")
        .assert()
        .failure()
        .stderr(predicate::str::contains("config file not found"));
}

#[test]
fn recommend_booster_for_weak_subject() {
    let dir = offline_dir();
    write_snapshot(&dir, "High", 30.0, 70.0, 80.0);

    learnquest(&dir)
        .args(["recommend", "--snapshot", "snapshot.json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Recommended: Math Score (easy)"))
        .stdout(predicate::str::contains("Booster test"));
}

#[test]
fn recommend_without_history() {
    let dir = offline_dir();
    learnquest(&dir)
        .args(["recommend", "--snapshot", "missing.json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No recommendation yet"));
}

#[test]
fn recommend_json_for_high_performer() {
    let dir = offline_dir();
    write_snapshot(&dir, "Low", 90.0, 88.0, 92.0);

    let output = learnquest(&dir)
        .args(["recommend", "--snapshot", "snapshot.json", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let spec: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(spec["test_type"], "internal2");
    assert_eq!(spec["difficulty"], "very_hard");
}

#[test]
fn quiz_offline_records_history() {
    let dir = offline_dir();

    learnquest(&dir)
        .args([
            "quiz",
            "--test-type",
            "math",
            "--difficulty",
            "easy",
            "--history",
            "history.json",
        ])
        .write_stdin(MATH_ANSWERS)
        .assert()
        .success()
        .stderr(predicate::str::contains("using offline questions"))
        .stdout(predicate::str::contains("Score: 30/30 (3/3 correct) PASSED"));

    let history: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(dir.path().join("history.json")).unwrap())
            .unwrap();
    assert_eq!(history.as_array().unwrap().len(), 1);
    assert_eq!(history[0]["total_marks"], 30.0);

    learnquest(&dir)
        .args(["badges", "--history", "history.json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Level 1: 1 test(s) taken, best score 30"))
        .stdout(predicate::str::contains("1/20 badges unlocked"));
}

#[test]
fn quiz_retries_invalid_answers() {
    let dir = offline_dir();

    learnquest(&dir)
        .args(["quiz", "--test-type", "math"])
        .write_stdin("9\n96\n1\n1\n")
        .assert()
        .success()
        .stderr(predicate::str::contains("'9' is not one of the options"))
        .stdout(predicate::str::contains("Score: 10/30 (1/3 correct) FAILED"));
}

#[test]
fn quiz_incomplete_answers_fail() {
    let dir = offline_dir();

    learnquest(&dir)
        .args(["quiz", "--test-type", "math"])
        .write_stdin("2\n")
        .assert()
        .failure()
        .stderr(predicate::str::contains("please answer all questions"));
}

#[test]
fn quiz_from_snapshot_recommendation() {
    let dir = offline_dir();
    write_snapshot(&dir, "Medium", 80.0, 75.0, 50.0);

    let output = learnquest(&dir)
        .args(["quiz", "--snapshot", "snapshot.json", "--json"])
        .write_stdin("2\n3\n3\n")
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["spec"]["test_type"], "writing");
    assert_eq!(report["spec"]["difficulty"], "medium");
    assert_eq!(report["offline_questions"], true);
    assert_eq!(report["result"]["raw_correct"], 3);
    assert_eq!(report["passed"], true);
}

#[test]
fn quiz_needs_test_type_or_snapshot() {
    let dir = offline_dir();
    learnquest(&dir)
        .arg("quiz")
        .assert()
        .failure()
        .stderr(predicate::str::contains("no recommendation available"));
}

#[test]
fn quiz_unknown_test_type() {
    let dir = offline_dir();
    learnquest(&dir)
        .args(["quiz", "--test-type", "chemistry"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown test type"));
}

#[test]
fn quiz_falls_back_when_generator_unreachable() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("learnquest.toml"),
        "[generator]\ntype = \"http\"\nbase_url = \"http://127.0.0.1:1\"\ntimeout_secs = 5\n",
    )
    .unwrap();

    learnquest(&dir)
        .args(["quiz", "--test-type", "math"])
        .write_stdin(MATH_ANSWERS)
        .assert()
        .success()
        .stderr(predicate::str::contains("using offline questions"))
        .stdout(predicate::str::contains("PASSED"));
}

#[test]
fn badges_from_explicit_stats() {
    let dir = offline_dir();

    let output = learnquest(&dir)
        .args([
            "badges",
            "--total-tests",
            "5",
            "--best-score",
            "100",
            "--favorite-subject",
            "Science",
            "--json",
        ])
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["stats"]["level"], 3);
    assert_eq!(report["unlocked"], 12);
    assert_eq!(report["badges"].as_array().unwrap().len(), 20);
}

#[test]
fn badges_table_without_history() {
    let dir = offline_dir();
    learnquest(&dir)
        .arg("badges")
        .assert()
        .success()
        .stdout(predicate::str::contains("First Step"))
        .stdout(predicate::str::contains("0/20 badges unlocked"));
}
