//! The `learnquest badges` command.

use std::path::PathBuf;

use anyhow::Result;
use serde::Serialize;

use learnquest_core::achievements::{unlocked_count, BadgeStatus, ProfileFacts};
use learnquest_core::stats::CumulativeStats;
use learnquest_providers::FileStore;

use super::load_engine;

#[derive(Serialize)]
struct BadgeReport<'a> {
    stats: &'a CumulativeStats,
    unlocked: usize,
    badges: &'a [BadgeStatus],
}

#[allow(clippy::too_many_arguments)]
pub async fn execute(
    history: Option<PathBuf>,
    total_tests: Option<u32>,
    best_score: Option<f64>,
    favorite_subject: Option<String>,
    dream_job: Option<String>,
    user: String,
    json: bool,
    config_path: Option<PathBuf>,
) -> Result<()> {
    if let Some(best) = best_score {
        anyhow::ensure!(best.is_finite(), "best score must be a finite number");
    }

    let engine = load_engine(config_path.as_deref())?;
    let facts = ProfileFacts {
        favorite_subject,
        dream_job,
    };

    let (stats, statuses) = if total_tests.is_some() || best_score.is_some() {
        let stats = CumulativeStats::new(total_tests.unwrap_or(0), best_score.unwrap_or(0.0));
        (stats, engine.achievements(&stats, &facts))
    } else {
        let store = FileStore::new(None, history);
        engine.achievements_for(&store, &user, &facts).await
    };

    let unlocked = unlocked_count(&statuses);

    if json {
        let report = BadgeReport {
            stats: &stats,
            unlocked,
            badges: &statuses,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!(
        "Level {}: {} test(s) taken, best score {}",
        stats.level(),
        stats.total_tests(),
        stats.best_score()
    );
    print_badges(&statuses);
    println!("\n{unlocked}/{} badges unlocked", statuses.len());

    Ok(())
}

fn print_badges(statuses: &[BadgeStatus]) {
    use comfy_table::{Cell, Table};

    let mut table = Table::new();
    table.set_header(vec!["Badge", "Name", "Status", "Progress"]);
    for status in statuses {
        table.add_row(vec![
            Cell::new(&status.badge.icon),
            Cell::new(&status.badge.label),
            Cell::new(if status.unlocked { "unlocked" } else { "locked" }),
            Cell::new(format!("{:.0}%", status.progress)),
        ]);
    }
    println!("{table}");
}
