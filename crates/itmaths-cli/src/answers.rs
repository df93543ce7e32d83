//! TOML answers file parser.
//!
//! An answers file pairs question ids with one answer each, matching the
//! question type: `choice` for single-choice (the option's content),
//! `judgements` for true/false (choice id → bool), `text` for short
//! answers.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use itmaths_core::model::{Answer, AnswerMap};

#[derive(Debug, Deserialize)]
struct TomlAnswersFile {
    #[serde(default)]
    answers: Vec<TomlAnswerEntry>,
}

#[derive(Debug, Deserialize)]
struct TomlAnswerEntry {
    question: u64,
    #[serde(default)]
    choice: Option<String>,
    /// TOML table keys are strings; choice ids are parsed out of them.
    #[serde(default)]
    judgements: Option<HashMap<String, bool>>,
    #[serde(default)]
    text: Option<toml::Value>,
}

/// Parse an answers file into (question id, answer) pairs, in file order.
pub fn parse_answers_file(path: &Path) -> Result<Vec<(u64, Answer)>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read answers file: {}", path.display()))?;
    parse_answers_str(&content, path)
}

/// Parse an answers TOML string (useful for testing).
pub fn parse_answers_str(content: &str, source_path: &Path) -> Result<Vec<(u64, Answer)>> {
    let parsed: TomlAnswersFile = toml::from_str(content)
        .with_context(|| format!("failed to parse answers file: {}", source_path.display()))?;

    parsed
        .answers
        .into_iter()
        .map(|entry| {
            let question = entry.question;
            let answer = match (entry.choice, entry.judgements, entry.text) {
                (Some(choice), None, None) => Answer::Choice(choice),
                (None, Some(judgements), None) => {
                    let judgements = judgements
                        .into_iter()
                        .map(|(key, value)| {
                            let id: u64 = key.parse().with_context(|| {
                                format!("question {question}: choice id {key:?} is not a number")
                            })?;
                            Ok((id, value))
                        })
                        .collect::<Result<HashMap<u64, bool>>>()?;
                    Answer::TrueFalse(judgements)
                }
                (None, None, Some(text)) => Answer::Text(match text {
                    toml::Value::String(s) => s,
                    other => other.to_string(),
                }),
                _ => anyhow::bail!(
                    "question {question}: exactly one of `choice`, `judgements`, `text` must be set"
                ),
            };
            Ok((question, answer))
        })
        .collect()
}

/// Collapse parsed pairs into an answer map (later entries win).
pub fn to_answer_map(pairs: Vec<(u64, Answer)>) -> AnswerMap {
    pairs.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    const VALID: &str = r#"
[[answers]]
question = 1
choice = "4"

[[answers]]
question = 2

[answers.judgements]
21 = true
22 = false
23 = true
24 = true

[[answers]]
question = 3
text = "3,5"
"#;

    #[test]
    fn parse_all_three_shapes() {
        let pairs = parse_answers_str(VALID, &PathBuf::from("answers.toml")).unwrap();
        assert_eq!(pairs.len(), 3);
        assert_eq!(pairs[0], (1, Answer::Choice("4".into())));
        match &pairs[1].1 {
            Answer::TrueFalse(judgements) => {
                assert_eq!(judgements.len(), 4);
                assert_eq!(judgements.get(&21), Some(&true));
                assert_eq!(judgements.get(&22), Some(&false));
            }
            other => panic!("expected TrueFalse, got {other:?}"),
        }
        assert_eq!(pairs[2], (3, Answer::Text("3,5".into())));
    }

    #[test]
    fn numeric_text_value_accepted() {
        let toml = "[[answers]]\nquestion = 3\ntext = 3.5\n";
        let pairs = parse_answers_str(toml, &PathBuf::from("answers.toml")).unwrap();
        assert_eq!(pairs[0], (3, Answer::Text("3.5".into())));
    }

    #[test]
    fn ambiguous_entry_rejected() {
        let toml = "[[answers]]\nquestion = 1\nchoice = \"4\"\ntext = \"4\"\n";
        let err = parse_answers_str(toml, &PathBuf::from("answers.toml")).unwrap_err();
        assert!(err.to_string().contains("exactly one"));
    }

    #[test]
    fn empty_entry_rejected() {
        let toml = "[[answers]]\nquestion = 1\n";
        assert!(parse_answers_str(toml, &PathBuf::from("answers.toml")).is_err());
    }

    #[test]
    fn bad_judgement_key_rejected() {
        let toml = "[[answers]]\nquestion = 2\n\n[answers.judgements]\nfirst = true\n";
        let err = parse_answers_str(toml, &PathBuf::from("answers.toml")).unwrap_err();
        assert!(err.to_string().contains("not a number"));
    }

    #[test]
    fn later_entries_win_in_the_map() {
        let toml = r#"
[[answers]]
question = 1
choice = "3"

[[answers]]
question = 1
choice = "4"
"#;
        let map = to_answer_map(parse_answers_str(toml, &PathBuf::from("a.toml")).unwrap());
        assert_eq!(map.get(&1), Some(&Answer::Choice("4".into())));
    }
}
