//! TOML question bank parser.
//!
//! Loads question banks from TOML files and directories, and validates them.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::model::{default_time_limit, Difficulty, Question, QuestionBank};
use crate::scoring::checked_max_score;

/// The civics bank shipped with the binary.
const BUILTIN_BANK: &str = include_str!("../../../question-banks/civics.toml");

/// Intermediate TOML structure for parsing bank files.
#[derive(Debug, Deserialize)]
struct TomlBankFile {
    bank: TomlBankHeader,
    #[serde(default)]
    questions: Vec<TomlQuestion>,
}

#[derive(Debug, Deserialize)]
struct TomlBankHeader {
    id: String,
    name: String,
    #[serde(default = "default_quiz_type")]
    quiz_type: String,
    #[serde(default)]
    description: String,
    #[serde(default = "default_time_limit")]
    time_limit_secs: u32,
}

fn default_quiz_type() -> String {
    "general".to_string()
}

#[derive(Debug, Deserialize)]
struct TomlQuestion {
    id: u32,
    prompt: String,
    options: Vec<String>,
    correct: usize,
    #[serde(default)]
    explanation: String,
    #[serde(default)]
    difficulty: Option<String>,
    #[serde(default = "default_points")]
    points: u32,
}

fn default_points() -> u32 {
    10
}

/// Parse a single TOML file into a `QuestionBank`.
pub fn parse_bank(path: &Path) -> Result<QuestionBank> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read question bank: {}", path.display()))?;

    parse_bank_str(&content, path)
}

/// Parse a TOML string into a `QuestionBank`.
pub fn parse_bank_str(content: &str, source_path: &Path) -> Result<QuestionBank> {
    let parsed: TomlBankFile = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;

    let questions = parsed
        .questions
        .into_iter()
        .map(|q| {
            let difficulty = q
                .difficulty
                .map(|d| d.parse().map_err(|e: String| anyhow::anyhow!("{}", e)))
                .transpose()
                .with_context(|| format!("question {} in {}", q.id, source_path.display()))?
                .unwrap_or_default();

            Ok(Question {
                id: q.id,
                prompt: q.prompt,
                options: q.options,
                correct: q.correct,
                explanation: q.explanation,
                difficulty,
                points: q.points,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(QuestionBank {
        id: parsed.bank.id,
        name: parsed.bank.name,
        quiz_type: parsed.bank.quiz_type,
        description: parsed.bank.description,
        time_limit_secs: parsed.bank.time_limit_secs,
        questions,
    })
}

/// The bundled civics bank.
pub fn builtin() -> Result<QuestionBank> {
    parse_bank_str(BUILTIN_BANK, Path::new("<builtin civics.toml>"))
}

/// Recursively load all `.toml` question banks from a directory.
pub fn load_bank_directory(dir: &Path) -> Result<Vec<QuestionBank>> {
    let mut banks = Vec::new();

    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    for entry in std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
    {
        let entry = entry?;
        let path = entry.path();

        if path.is_dir() {
            banks.extend(load_bank_directory(&path)?);
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            match parse_bank(&path) {
                Ok(bank) => banks.push(bank),
                Err(e) => {
                    tracing::warn!("skipping {}: {:#}", path.display(), e);
                }
            }
        }
    }

    banks.sort_by(|a, b| a.id.cmp(&b.id));
    Ok(banks)
}

/// A warning from bank validation.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// The question id (if applicable).
    pub question_id: Option<u32>,
    /// Warning message.
    pub message: String,
}

/// Validate a question bank for common authoring mistakes.
pub fn validate_bank(bank: &QuestionBank) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();
    let warn = |id: u32, message: String| ValidationWarning {
        question_id: Some(id),
        message,
    };

    if bank.is_empty() {
        warnings.push(ValidationWarning {
            question_id: None,
            message: "bank has no questions".into(),
        });
    }

    let mut seen_ids = HashSet::new();
    for q in &bank.questions {
        if !seen_ids.insert(q.id) {
            warnings.push(warn(q.id, format!("duplicate question ID: {}", q.id)));
        }

        if q.prompt.trim().is_empty() {
            warnings.push(warn(q.id, "prompt is empty".into()));
        }

        if q.options.len() < 2 {
            warnings.push(warn(
                q.id,
                format!("needs at least 2 options, found {}", q.options.len()),
            ));
        }

        if q.correct >= q.options.len() {
            warnings.push(warn(
                q.id,
                format!(
                    "correct index {} out of range ({} options)",
                    q.correct,
                    q.options.len()
                ),
            ));
        }

        let mut seen_options = HashSet::new();
        if q.options.iter().any(|o| !seen_options.insert(o.trim())) {
            warnings.push(warn(q.id, "duplicate options".into()));
        }

        if q.points == 0 {
            warnings.push(warn(q.id, "question is worth 0 points".into()));
        }
    }

    if checked_max_score(bank).is_none() {
        warnings.push(ValidationWarning {
            question_id: None,
            message: "total points overflow the maximum score".into(),
        });
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    const VALID_TOML: &str = r#"
[bank]
id = "test-bank"
name = "Test Bank"
quiz_type = "politics"
description = "A test bank"
time_limit_secs = 20

[[questions]]
id = 1
prompt = "In which year was the current Brazilian Constitution promulgated?"
options = ["1946", "1967", "1988", "1992"]
correct = 2
explanation = "The Constitution was promulgated on 5 October 1988."
difficulty = "easy"
points = 10

[[questions]]
id = 2
prompt = "How many senators does each state elect?"
options = ["1", "2", "3", "4"]
correct = 2
difficulty = "médio"
"#;

    #[test]
    fn parse_valid_toml() {
        let bank = parse_bank_str(VALID_TOML, &PathBuf::from("test.toml")).unwrap();
        assert_eq!(bank.id, "test-bank");
        assert_eq!(bank.quiz_type, "politics");
        assert_eq!(bank.time_limit_secs, 20);
        assert_eq!(bank.len(), 2);
        assert_eq!(bank.questions[0].difficulty, Difficulty::Easy);
        assert_eq!(bank.questions[1].difficulty, Difficulty::Medium);
        assert_eq!(bank.questions[1].points, 10);
        assert!(validate_bank(&bank).is_empty());
    }

    #[test]
    fn parse_missing_optional_fields() {
        let toml = r#"
[bank]
id = "minimal"
name = "Minimal"

[[questions]]
id = 1
prompt = "Yes or no?"
options = ["yes", "no"]
correct = 0
"#;
        let bank = parse_bank_str(toml, &PathBuf::from("test.toml")).unwrap();
        assert_eq!(bank.quiz_type, "general");
        assert_eq!(bank.time_limit_secs, 30);
        assert_eq!(bank.questions[0].difficulty, Difficulty::Medium);
        assert!(bank.questions[0].explanation.is_empty());
    }

    #[test]
    fn parse_unknown_difficulty_fails() {
        let toml = r#"
[bank]
id = "bad"
name = "Bad"

[[questions]]
id = 7
prompt = "?"
options = ["a", "b"]
correct = 0
difficulty = "legendary"
"#;
        let err = parse_bank_str(toml, &PathBuf::from("bad.toml")).unwrap_err();
        assert!(format!("{err:#}").contains("legendary"));
    }

    #[test]
    fn parse_malformed_toml() {
        let bad = "this is not [valid toml }{";
        assert!(parse_bank_str(bad, &PathBuf::from("bad.toml")).is_err());
    }

    #[test]
    fn validate_catches_authoring_mistakes() {
        let toml = r#"
[bank]
id = "broken"
name = "Broken"

[[questions]]
id = 1
prompt = "   "
options = ["only"]
correct = 3
points = 0

[[questions]]
id = 1
prompt = "Pick one"
options = ["same", "same "]
correct = 0
"#;
        let bank = parse_bank_str(toml, &PathBuf::from("test.toml")).unwrap();
        let warnings = validate_bank(&bank);
        let has = |needle: &str| warnings.iter().any(|w| w.message.contains(needle));
        assert!(has("duplicate question ID"));
        assert!(has("prompt is empty"));
        assert!(has("at least 2 options"));
        assert!(has("out of range"));
        assert!(has("duplicate options"));
        assert!(has("0 points"));
    }

    #[test]
    fn validate_empty_bank() {
        let toml = "[bank]\nid = \"empty\"\nname = \"Empty\"\n";
        let bank = parse_bank_str(toml, &PathBuf::from("empty.toml")).unwrap();
        let warnings = validate_bank(&bank);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].question_id.is_none());
    }

    #[test]
    fn validate_rejects_overflowing_points() {
        let toml = r#"
[bank]
id = "huge"
name = "Huge"

[[questions]]
id = 1
prompt = "First?"
options = ["a", "b"]
correct = 0
points = 3000000000

[[questions]]
id = 2
prompt = "Second?"
options = ["a", "b"]
correct = 0
points = 3000000000
"#;
        let bank = parse_bank_str(toml, &PathBuf::from("huge.toml")).unwrap();
        let warnings = validate_bank(&bank);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].question_id.is_none());
        assert!(warnings[0].message.contains("overflow"));
    }

    #[test]
    fn builtin_bank_is_valid() {
        let bank = builtin().unwrap();
        assert_eq!(bank.len(), 10);
        assert_eq!(bank.time_limit_secs, 30);
        assert!(validate_bank(&bank).is_empty());
    }

    #[test]
    fn load_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("test.toml"), VALID_TOML).unwrap();
        std::fs::write(dir.path().join("broken.toml"), "not = [toml").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let banks = load_bank_directory(dir.path()).unwrap();
        assert_eq!(banks.len(), 1);
        assert_eq!(banks[0].id, "test-bank");
    }
}
