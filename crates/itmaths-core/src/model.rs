//! Core data model types for itmaths.
//!
//! These are the fundamental types the entire itmaths system uses to
//! represent exams, questions, choices, and recorded answers.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// The three question types of an exam paper.
///
/// Part I of a paper is single-choice, part II is true/false, part III is
/// short-answer; the shuffle engine always emits questions in that order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionKind {
    SingleChoice,
    TrueFalse,
    ShortAnswer,
}

impl fmt::Display for QuestionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuestionKind::SingleChoice => write!(f, "single_choice"),
            QuestionKind::TrueFalse => write!(f, "true_false"),
            QuestionKind::ShortAnswer => write!(f, "short_answer"),
        }
    }
}

impl FromStr for QuestionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "single_choice" | "single" | "mcq" => Ok(QuestionKind::SingleChoice),
            "true_false" | "tf" => Ok(QuestionKind::TrueFalse),
            "short_answer" | "short" => Ok(QuestionKind::ShortAnswer),
            other => Err(format!("unknown question type: {other}")),
        }
    }
}

/// One selectable option of a question.
///
/// For single-choice questions exactly one choice should carry
/// `correct = true`; that is trusted from the exam source and surfaced by
/// `parser::validate_exam`, never enforced at scoring time. For true/false
/// questions every choice is an independent proposition with its own flag.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Choice {
    /// Stable choice identifier from the exam source.
    pub id: u64,
    /// Display label (`A`–`D`…). Reassigned positionally by the shuffle
    /// engine for single-choice questions; purely a display artifact.
    pub label: String,
    /// The choice text. Single-choice answers are compared by content, not
    /// id, because shuffling reassigns labels.
    pub content: String,
    /// Correctness flag from the exam source.
    #[serde(default)]
    pub correct: bool,
}

/// A single exam question. Immutable once loaded for an attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    pub id: u64,
    #[serde(rename = "type")]
    pub kind: QuestionKind,
    /// The question text.
    pub content: String,
    /// Choices for single-choice and true/false questions; empty for
    /// short-answer.
    #[serde(default)]
    pub choices: Vec<Choice>,
    /// Correct value for short-answer questions, kept as its raw string
    /// (`"3.5"` or `"3,5"`); parsed only at scoring time.
    #[serde(default)]
    pub short_answer: Option<String>,
}

/// A recorded answer, discriminated by question type.
///
/// One variant per question kind so an answer can never hold the wrong
/// shape for its question silently; a mismatched variant simply scores zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Answer {
    /// The selected choice's content for a single-choice question.
    Choice(String),
    /// Choice id → judgement, one entry per proposition the user touched.
    TrueFalse(HashMap<u64, bool>),
    /// Raw short-answer input; parsed as a locale-tolerant float at scoring.
    Text(String),
}

/// Accumulated answers for an attempt, keyed by question id.
///
/// Missing keys score zero; they are never an error.
pub type AnswerMap = HashMap<u64, Answer>;

/// Exam metadata as served by the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Exam {
    pub id: u64,
    pub title: String,
    /// Attempt duration; the deadline is `start + duration_minutes * 60_000`
    /// milliseconds.
    pub duration_minutes: u32,
    #[serde(default)]
    pub grade: Option<String>,
    #[serde(default)]
    pub topic: Option<String>,
}

/// An exam plus its question set, in attempt (post-shuffle) order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExamPaper {
    pub exam: Exam,
    pub questions: Vec<Question>,
}

impl ExamPaper {
    /// Look up a question by id.
    pub fn question(&self, id: u64) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == id)
    }

    /// Number of questions of the given kind.
    pub fn count_of(&self, kind: QuestionKind) -> usize {
        self.questions.iter().filter(|q| q.kind == kind).count()
    }
}

/// Points earned per paper part.
///
/// `part1`/`part2`/`part3` are the single-choice, true/false, and
/// short-answer partitions respectively; `total` is their exact sum with no
/// rounding applied. Display layers may round to two decimals.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub part1: f64,
    pub part2: f64,
    pub part3: f64,
    pub total: f64,
}

impl ScoreBreakdown {
    pub fn new(part1: f64, part2: f64, part3: f64) -> Self {
        Self {
            part1,
            part2,
            part3,
            total: part1 + part2 + part3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn question_kind_display_and_parse() {
        assert_eq!(QuestionKind::SingleChoice.to_string(), "single_choice");
        assert_eq!(QuestionKind::TrueFalse.to_string(), "true_false");
        assert_eq!(
            "single".parse::<QuestionKind>().unwrap(),
            QuestionKind::SingleChoice
        );
        assert_eq!("tf".parse::<QuestionKind>().unwrap(), QuestionKind::TrueFalse);
        assert_eq!(
            "Short_Answer".parse::<QuestionKind>().unwrap(),
            QuestionKind::ShortAnswer
        );
        assert!("essay".parse::<QuestionKind>().is_err());
    }

    #[test]
    fn answer_serde_roundtrip() {
        let mut judgements = HashMap::new();
        judgements.insert(21u64, true);
        judgements.insert(22u64, false);

        for answer in [
            Answer::Choice("4".into()),
            Answer::TrueFalse(judgements),
            Answer::Text("3,5".into()),
        ] {
            let json = serde_json::to_string(&answer).unwrap();
            let back: Answer = serde_json::from_str(&json).unwrap();
            assert_eq!(back, answer);
        }
    }

    #[test]
    fn question_deserializes_without_optional_fields() {
        let json = r#"{"id": 7, "type": "short_answer", "content": "2+2?"}"#;
        let q: Question = serde_json::from_str(json).unwrap();
        assert_eq!(q.kind, QuestionKind::ShortAnswer);
        assert!(q.choices.is_empty());
        assert!(q.short_answer.is_none());
    }

    #[test]
    fn score_breakdown_totals() {
        let score = ScoreBreakdown::new(0.25, 0.5, 0.5);
        assert!((score.total - 1.25).abs() < f64::EPSILON);
    }

    #[test]
    fn paper_lookup() {
        let paper = ExamPaper {
            exam: Exam {
                id: 1,
                title: "Algebra".into(),
                duration_minutes: 45,
                grade: None,
                topic: None,
            },
            questions: vec![Question {
                id: 10,
                kind: QuestionKind::SingleChoice,
                content: "2+2?".into(),
                choices: vec![],
                short_answer: None,
            }],
        };
        assert!(paper.question(10).is_some());
        assert!(paper.question(11).is_none());
        assert_eq!(paper.count_of(QuestionKind::SingleChoice), 1);
        assert_eq!(paper.count_of(QuestionKind::TrueFalse), 0);
    }
}
