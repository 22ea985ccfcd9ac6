//! The `civicquiz init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    if std::path::Path::new("civicquiz.toml").exists() {
        println!("civicquiz.toml already exists, skipping.");
    } else {
        std::fs::write("civicquiz.toml", SAMPLE_CONFIG)?;
        println!("Created civicquiz.toml");
    }

    std::fs::create_dir_all("question-banks")?;
    let example_path = std::path::Path::new("question-banks/example.toml");
    if example_path.exists() {
        println!("question-banks/example.toml already exists, skipping.");
    } else {
        std::fs::write(example_path, EXAMPLE_BANK)?;
        println!("Created question-banks/example.toml");
    }

    println!("\nNext steps:");
    println!("  1. Edit civicquiz.toml with your gamification endpoint and user");
    println!("  2. Run: civicquiz validate --bank question-banks/example.toml");
    println!("  3. Run: civicquiz play --bank question-banks/example.toml");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# civicquiz configuration

[quiz]
# time_limit_secs = 30
reveal_delay_ms = 2000
# question_bank = "question-banks/example.toml"

# Results are only synced when both sections below are filled in.
# [gamification]
# base_url = "https://your-project.supabase.co"
# endpoint = "/functions/v1/gamification-quiz"
# api_key = "${CIVICQUIZ_API_KEY}"
# timeout_secs = 10

# [user]
# id = "${CIVICQUIZ_USER_ID}"
# access_token = "${CIVICQUIZ_ACCESS_TOKEN}"
"#;

const EXAMPLE_BANK: &str = r#"[bank]
id = "example"
name = "Example Bank"
quiz_type = "politics"
description = "A short bank to get started"
time_limit_secs = 30

[[questions]]
id = 1
prompt = "How many branches of government does Brazil have?"
options = ["Two", "Three", "Four", "Five"]
correct = 1
explanation = "Executive, Legislative and Judiciary."
difficulty = "easy"
points = 10

[[questions]]
id = 2
prompt = "Which body judges the President for crimes of responsibility?"
options = ["The Supreme Court", "The Chamber of Deputies", "The Federal Senate", "The TSE"]
correct = 2
explanation = "The Chamber authorizes the process and the Senate judges it."
difficulty = "hard"
points = 20
"#;
