//! TOML exam file parser.
//!
//! Loads exam papers from TOML files and directories for offline practice
//! and fixtures, and validates them for common authoring issues.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::model::{Choice, Exam, ExamPaper, Question, QuestionKind};

/// Intermediate TOML structure for parsing exam files.
#[derive(Debug, Deserialize)]
struct TomlExamFile {
    exam: TomlExamHeader,
    #[serde(default)]
    questions: Vec<TomlQuestion>,
}

#[derive(Debug, Deserialize)]
struct TomlExamHeader {
    id: u64,
    title: String,
    #[serde(default = "default_duration")]
    duration_minutes: u32,
    #[serde(default)]
    grade: Option<String>,
    #[serde(default)]
    topic: Option<String>,
}

fn default_duration() -> u32 {
    45
}

#[derive(Debug, Deserialize)]
struct TomlQuestion {
    id: u64,
    #[serde(rename = "type")]
    kind: String,
    content: String,
    #[serde(default)]
    choices: Vec<TomlChoice>,
    /// Correct short-answer value; TOML authors may write either a string
    /// or a number.
    #[serde(default)]
    answer: Option<toml::Value>,
}

#[derive(Debug, Deserialize)]
struct TomlChoice {
    id: u64,
    #[serde(default)]
    label: Option<String>,
    content: String,
    #[serde(default)]
    correct: bool,
}

/// Parse a single TOML file into an `ExamPaper`.
pub fn parse_exam_file(path: &Path) -> Result<ExamPaper> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read exam file: {}", path.display()))?;

    parse_exam_str(&content, path)
}

/// Parse a TOML string into an `ExamPaper` (useful for testing).
pub fn parse_exam_str(content: &str, source_path: &Path) -> Result<ExamPaper> {
    let parsed: TomlExamFile = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;

    let questions = parsed
        .questions
        .into_iter()
        .map(|q| {
            let kind: QuestionKind = q
                .kind
                .parse()
                .map_err(|e: String| anyhow::anyhow!("question {}: {}", q.id, e))?;

            let choices = q
                .choices
                .into_iter()
                .enumerate()
                .map(|(index, c)| Choice {
                    id: c.id,
                    label: c.label.unwrap_or_else(|| crate::shuffle::choice_label(index)),
                    content: c.content,
                    correct: c.correct,
                })
                .collect();

            let short_answer = q.answer.map(|value| match value {
                toml::Value::String(s) => s,
                other => other.to_string(),
            });

            Ok(Question {
                id: q.id,
                kind,
                content: q.content,
                choices,
                short_answer,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(ExamPaper {
        exam: Exam {
            id: parsed.exam.id,
            title: parsed.exam.title,
            duration_minutes: parsed.exam.duration_minutes,
            grade: parsed.exam.grade,
            topic: parsed.exam.topic,
        },
        questions,
    })
}

/// Recursively load all `.toml` exam files from a directory.
pub fn load_exam_directory(dir: &Path) -> Result<Vec<ExamPaper>> {
    let mut papers = Vec::new();

    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    for entry in std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
    {
        let entry = entry?;
        let path = entry.path();

        if path.is_dir() {
            papers.extend(load_exam_directory(&path)?);
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            match parse_exam_file(&path) {
                Ok(paper) => papers.push(paper),
                Err(e) => {
                    tracing::warn!("skipping {}: {}", path.display(), e);
                }
            }
        }
    }

    Ok(papers)
}

/// A warning from exam validation.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// The question id (if applicable).
    pub question_id: Option<u64>,
    /// Warning message.
    pub message: String,
}

/// Validate an exam paper for common authoring issues.
pub fn validate_exam(paper: &ExamPaper) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    // Duplicate question ids break the answer map.
    let mut seen_ids = std::collections::HashSet::new();
    for question in &paper.questions {
        if !seen_ids.insert(question.id) {
            warnings.push(ValidationWarning {
                question_id: Some(question.id),
                message: format!("duplicate question id: {}", question.id),
            });
        }
    }

    for question in &paper.questions {
        match question.kind {
            QuestionKind::SingleChoice => {
                let correct = question.choices.iter().filter(|c| c.correct).count();
                if question.choices.is_empty() {
                    warnings.push(ValidationWarning {
                        question_id: Some(question.id),
                        message: "single-choice question has no choices".into(),
                    });
                } else if correct != 1 {
                    warnings.push(ValidationWarning {
                        question_id: Some(question.id),
                        message: format!(
                            "single-choice question has {correct} correct choices, expected exactly 1"
                        ),
                    });
                }
            }
            QuestionKind::TrueFalse => {
                // The scoring step table is defined for 4 propositions.
                if question.choices.len() != 4 {
                    warnings.push(ValidationWarning {
                        question_id: Some(question.id),
                        message: format!(
                            "true/false question has {} propositions, the score table expects 4",
                            question.choices.len()
                        ),
                    });
                }
            }
            QuestionKind::ShortAnswer => {
                match question.short_answer.as_deref() {
                    None => warnings.push(ValidationWarning {
                        question_id: Some(question.id),
                        message: "short-answer question has no correct value".into(),
                    }),
                    Some(value) if crate::scoring::parse_decimal(value).is_none() => {
                        warnings.push(ValidationWarning {
                            question_id: Some(question.id),
                            message: format!("correct value {value:?} is not numeric"),
                        })
                    }
                    Some(_) => {}
                }
            }
        }
    }

    if paper.exam.duration_minutes == 0 {
        warnings.push(ValidationWarning {
            question_id: None,
            message: "exam duration is zero minutes".into(),
        });
    }

    warnings
}
