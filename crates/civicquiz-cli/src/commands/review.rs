//! The `civicquiz review` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use civicquiz_core::report::QuizReport;

pub fn execute(report_path: PathBuf) -> Result<()> {
    let report = QuizReport::load_json(&report_path)?;

    println!(
        "{} — {} ({})",
        report.bank.name,
        report.created_at.format("%Y-%m-%d %H:%M"),
        report.user_id.as_deref().unwrap_or("guest")
    );

    let mut table = Table::new();
    table.set_header(vec!["#", "Question", "Your answer", "Correct answer", "Result", "Points", "Time"]);
    for (i, entry) in report.review.iter().enumerate() {
        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(&entry.prompt),
            Cell::new(entry.selected.as_deref().unwrap_or("-")),
            Cell::new(&entry.correct),
            Cell::new(entry.outcome),
            Cell::new(entry.points),
            Cell::new(format!("{}s", entry.time_spent)),
        ]);
    }
    println!("{table}");

    let summary = &report.summary;
    println!(
        "\nScore {} | {}/{} correct | best streak {} | {}s",
        summary.score,
        summary.correct_answers,
        summary.total_questions,
        summary.best_streak,
        summary.time_spent
    );
    println!("{}", report.stats.grade.message());

    let explained: Vec<_> = report
        .review
        .iter()
        .filter(|e| !e.explanation.is_empty())
        .collect();
    if !explained.is_empty() {
        println!("\nExplanations:");
        for entry in explained {
            println!("  [{}] {}", entry.question_id, entry.explanation);
        }
    }

    match &report.remote {
        Some(remote) => println!("\nSynced: +{} points earned.", remote.points_earned),
        None => println!("\nNot synced with the gamification service."),
    }

    Ok(())
}
