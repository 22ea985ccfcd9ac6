//! The `civicquiz play` command.

use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::sync::mpsc;

use civicquiz_core::bank;
use civicquiz_core::engine::{PlayerInput, QuizObserver, QuizOutcome, QuizRunner, QuizRunnerConfig};
use civicquiz_core::model::{AnswerRecord, Question, QuestionBank, QuizSummary};
use civicquiz_core::report::QuizReport;
use civicquiz_core::scoring::{compute_stats, max_possible_score};
use civicquiz_core::traits::SubmissionResponse;
use civicquiz_core::{QuizError, QuizSession};
use civicquiz_gamification::config::load_config_from;
use civicquiz_gamification::create_scoring_service;

/// Console renderer for a running quiz.
struct ConsoleObserver;

impl QuizObserver for ConsoleObserver {
    fn on_question(&self, index: usize, total: usize, question: &Question, time_left: u32) {
        println!(
            "\nQuestion {}/{} [{}, {} pts] ({}s)",
            index + 1,
            total,
            question.difficulty,
            question.points,
            time_left
        );
        println!("{}", question.prompt);
        for (i, option) in question.options.iter().enumerate() {
            println!("  {}) {}", i + 1, option);
        }
        print!("Your answer (1-{}, r to reset): ", question.options.len());
        let _ = std::io::stdout().flush();
    }

    fn on_tick(&self, time_left: u32) {
        if time_left <= 5 || time_left % 10 == 0 {
            eprintln!("  {time_left}s left");
        }
    }

    fn on_reveal(&self, question: &Question, record: &AnswerRecord, streak: u32) {
        let answer = question.correct_option().unwrap_or_default();
        if record.is_correct {
            println!("\nCorrect! +{} pts (streak {streak})", record.points);
        } else if record.timed_out() {
            println!("\nTime's up! The answer was: {answer}");
        } else {
            println!("\nWrong. The answer was: {answer}");
        }
        if !question.explanation.is_empty() {
            println!("  {}", question.explanation);
        }
    }

    fn on_invalid_input(&self, error: &QuizError) {
        match error {
            QuizError::OptionOutOfRange { options, .. } => {
                eprintln!("  Choose a number between 1 and {options}.")
            }
            other => eprintln!("  {other}"),
        }
    }

    fn on_complete(&self, summary: &QuizSummary) {
        println!(
            "\nQuiz complete: {}/{} correct.",
            summary.correct_answers, summary.total_questions
        );
    }

    fn on_reset(&self) {
        println!("\nQuiz reset.");
    }
}

/// Parse one line of player input. Options are numbered from 1.
fn parse_input(line: &str) -> Option<PlayerInput> {
    let line = line.trim();
    if line.eq_ignore_ascii_case("r") || line.eq_ignore_ascii_case("reset") {
        return Some(PlayerInput::Reset);
    }
    match line.parse::<usize>() {
        Ok(n) if n >= 1 => Some(PlayerInput::Select(n - 1)),
        _ => None,
    }
}

/// Forward stdin lines to the runner. The sender is dropped at EOF, which
/// closes the channel.
fn spawn_stdin_reader(tx: mpsc::UnboundedSender<PlayerInput>) {
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            if line.trim().is_empty() {
                continue;
            }
            match parse_input(&line) {
                Some(input) => {
                    if tx.send(input).is_err() {
                        break;
                    }
                }
                None => eprintln!("  Enter an option number, or r to reset."),
            }
        }
    });
}

pub async fn execute(
    bank_path: Option<PathBuf>,
    config_path: Option<PathBuf>,
    time_limit: Option<u32>,
    reveal_delay_ms: Option<u64>,
    output: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;

    let bank = match bank_path.or_else(|| config.quiz.question_bank.clone()) {
        Some(path) => bank::parse_bank(&path)?,
        None => bank::builtin()?,
    };
    let warnings = bank::validate_bank(&bank);
    anyhow::ensure!(
        warnings.is_empty(),
        "question bank '{}' has {} problem(s), run `civicquiz validate` for details",
        bank.id,
        warnings.len()
    );
    let bank = Arc::new(bank);

    let time_limit = time_limit
        .or(config.quiz.time_limit_secs)
        .unwrap_or(bank.time_limit_secs);
    anyhow::ensure!(time_limit >= 1, "time limit must be at least 1 second");

    let runner_config = QuizRunnerConfig {
        reveal_delay: Duration::from_millis(reveal_delay_ms.unwrap_or(config.quiz.reveal_delay_ms)),
        submit_timeout: Duration::from_secs(
            config.gamification.as_ref().map_or(10, |g| g.timeout_secs),
        ),
        ..Default::default()
    };
    let identity = config.identity();
    let mut runner = QuizRunner::new(runner_config).with_identity(identity.clone());
    if let Some(service) = create_scoring_service(&config)? {
        runner = runner.with_scoring(service);
    }

    println!(
        "{} ({} questions, {}s each)",
        bank.name,
        bank.len(),
        time_limit
    );

    let (tx, mut rx) = mpsc::unbounded_channel();
    spawn_stdin_reader(tx);

    let mut session = QuizSession::new(Arc::clone(&bank)).with_time_limit(time_limit);
    let outcome = runner.run(&mut session, &mut rx, &ConsoleObserver).await?;

    let (summary, submission) = match outcome {
        QuizOutcome::Abandoned { answered } => {
            println!("Abandoned after {answered} answer(s). Nothing was recorded.");
            return Ok(());
        }
        QuizOutcome::Completed {
            summary,
            submission,
        } => (summary, submission),
    };

    print_results(&summary, &bank);

    let remote = match submission {
        Some(pending) => {
            println!("Syncing results...");
            let remote = pending.outcome().await;
            match &remote {
                Some(response) => print_remote(response),
                None => println!("Could not sync results. Your local score is shown above."),
            }
            remote
        }
        None => None,
    };

    if let Some(dir) = output {
        let report = QuizReport::new(&bank, summary, identity.map(|u| u.id), remote);
        let timestamp = chrono::Utc::now().format("%Y-%m-%dT%H%M%S");
        let path = dir.join(format!("report-{timestamp}.json"));
        report.save_json(&path)?;
        println!("Report saved to: {}", path.display());
    }

    Ok(())
}

fn print_results(summary: &QuizSummary, bank: &QuestionBank) {
    use comfy_table::{Cell, Table};

    let stats = compute_stats(summary, bank);

    let mut table = Table::new();
    table.set_header(vec!["Score", "Correct", "Accuracy", "Best streak", "Time", "Timeouts"]);
    table.add_row(vec![
        Cell::new(format!("{}/{}", summary.score, max_possible_score(bank))),
        Cell::new(format!(
            "{}/{}",
            summary.correct_answers, summary.total_questions
        )),
        Cell::new(format!("{:.0}%", stats.accuracy * 100.0)),
        Cell::new(summary.best_streak),
        Cell::new(format!("{}s", summary.time_spent)),
        Cell::new(stats.timeouts),
    ]);

    println!("\n{table}");
    println!("{}", stats.grade.message());
}

fn print_remote(response: &SubmissionResponse) {
    println!("Synced: +{} points earned.", response.points_earned);
    if response.level_up {
        match response.new_level {
            Some(level) => println!("Level up! You reached level {level}."),
            None => println!("Level up!"),
        }
    }
    for achievement in &response.new_achievements {
        println!("Achievement unlocked: {}", achievement.name);
    }
}
