//! The `learnquest quiz` command.

use std::io::BufRead;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Serialize;

use learnquest_core::model::{Difficulty, QuizQuestion, RecommendationSpec, TestType};
use learnquest_core::scoring::ScoreResult;
use learnquest_core::session::ReviewItem;
use learnquest_core::{FetchOutcome, QuizSession};
use learnquest_providers::FileStore;

use super::load_engine;
use super::recommend::print_spec;

#[derive(Serialize)]
struct QuizReport<'a> {
    spec: &'a RecommendationSpec,
    offline_questions: bool,
    result: ScoreResult,
    passed: bool,
    review: Vec<ReviewItem>,
}

#[allow(clippy::too_many_arguments)]
pub async fn execute(
    test_type: Option<String>,
    difficulty: Option<String>,
    snapshot: Option<PathBuf>,
    history: Option<PathBuf>,
    user: String,
    json: bool,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let engine = load_engine(config_path.as_deref())?;
    let store = FileStore::new(snapshot, history);

    let spec = match test_type {
        Some(tt) => {
            let test_type: TestType = tt.parse()?;
            let difficulty: Difficulty = match difficulty {
                Some(d) => d.parse()?,
                None => Difficulty::Medium,
            };
            engine.manual_spec(test_type, difficulty)
        }
        None => {
            anyhow::ensure!(
                difficulty.is_none(),
                "--difficulty requires --test-type"
            );
            engine.recommend(&store, &user).await.context(
                "no recommendation available; pass --test-type or a --snapshot file",
            )?
        }
    };

    if !json {
        print_spec(&spec);
    }

    let mut session = QuizSession::new();
    let outcome = engine.begin_quiz(&mut session, spec.clone()).await?;
    if let FetchOutcome::Fallback { reason, .. } = &outcome {
        eprintln!("Question generator unavailable ({reason}); using offline questions.");
    }

    let stdin = std::io::stdin();
    let mut lines = stdin.lock().lines();
    let total = session.questions().len();

    'questions: for index in 0..total {
        let Some(question) = session.questions().get(index).cloned() else {
            break;
        };
        if !json {
            print_question(index, total, &question);
        }
        loop {
            let Some(line) = lines.next() else {
                break 'questions;
            };
            let line = line.context("failed to read answer from stdin")?;
            match resolve_choice(&question, line.trim()) {
                Some(choice) => {
                    session.select_answer(index, choice)?;
                    session.next_question();
                    break;
                }
                None => eprintln!("  '{}' is not one of the options, try again", line.trim()),
            }
        }
    }

    let result = engine.finish_quiz(&mut session, &store, &user).await?;
    let review = session.review()?;

    if json {
        let report = QuizReport {
            spec: &spec,
            offline_questions: outcome.is_fallback(),
            result,
            passed: result.passed(),
            review,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_result(&result, &review);
    }

    Ok(())
}

fn print_question(index: usize, total: usize, question: &QuizQuestion) {
    println!("\nQuestion {}/{}: {}", index + 1, total, question.prompt);
    for (i, option) in question.options.iter().enumerate() {
        println!("  {}) {option}", i + 1);
    }
}

/// Map learner input to an option: exact option text first, then a 1-based
/// option number.
fn resolve_choice(question: &QuizQuestion, input: &str) -> Option<String> {
    if input.is_empty() {
        return None;
    }
    if question.has_option(input) {
        return Some(input.to_string());
    }
    if let Some(option) = question
        .options
        .iter()
        .find(|o| o.eq_ignore_ascii_case(input))
    {
        return Some(option.clone());
    }
    input
        .parse::<usize>()
        .ok()
        .filter(|n| (1..=question.options.len()).contains(n))
        .map(|n| question.options[n - 1].clone())
}

fn print_result(result: &ScoreResult, review: &[ReviewItem]) {
    use comfy_table::{Cell, Table};

    let mut table = Table::new();
    table.set_header(vec!["#", "Your answer", "Correct answer", "Result"]);
    for item in review {
        table.add_row(vec![
            Cell::new(item.index + 1),
            Cell::new(&item.selected),
            Cell::new(&item.correct_answer),
            Cell::new(if item.is_correct { "OK" } else { "WRONG" }),
        ]);
    }
    println!("\n{table}");

    println!(
        "\nScore: {}/{} ({}/{} correct) {}",
        result.score,
        result.max_score,
        result.raw_correct,
        result.total,
        if result.passed() { "PASSED" } else { "FAILED" }
    );
}
