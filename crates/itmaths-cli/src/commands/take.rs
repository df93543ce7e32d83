//! The `itmaths take` command.

use std::io::Write as _;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

use itmaths_api::{load_config_from, MockBackend, RestBackend};
use itmaths_core::engine::{AttemptEngine, AttemptEngineConfig, AttemptObserver};
use itmaths_core::model::{Answer, ExamPaper, QuestionKind};
use itmaths_core::parser;
use itmaths_core::report::AttemptReport;
use itmaths_core::session::format_countdown;
use itmaths_core::traits::{AnswerSource, AttemptEvent, AttemptStore, ExamBackend, ScriptedSource};
use itmaths_store::FileAttemptStore;

use crate::answers::parse_answers_file;

/// Console progress reporter: live countdown on stderr, result on stdout.
struct ConsoleObserver;

impl AttemptObserver for ConsoleObserver {
    fn on_attempt_start(&self, paper: &ExamPaper, seconds_left: i64) {
        eprintln!(
            "{} — {} questions, {} on the clock",
            paper.exam.title,
            paper.questions.len(),
            format_countdown(seconds_left),
        );
    }

    fn on_tick(&self, seconds_left: i64, warning: bool) {
        let marker = if warning { " (!)" } else { "" };
        eprint!("\r  {}{marker} ", format_countdown(seconds_left));
        let _ = std::io::stderr().flush();
    }

    fn on_time_expired(&self) {
        eprintln!("\nTime's up — submitting your answers.");
    }

    fn on_submitted(&self, report: &AttemptReport) {
        eprintln!();
        println!("{}", super::breakdown_table(report));
    }
}

/// Prompts on stdout and reads answers line by line from stdin.
struct InteractiveSource {
    lines: Lines<BufReader<Stdin>>,
    cursor: usize,
}

impl InteractiveSource {
    fn new() -> Self {
        Self {
            lines: BufReader::new(tokio::io::stdin()).lines(),
            cursor: 0,
        }
    }

    /// Next input line, trimmed. EOF reads as a submit request so piped
    /// input finishes cleanly.
    async fn read_line(&mut self) -> Result<Option<String>> {
        Ok(self
            .lines
            .next_line()
            .await
            .context("failed to read stdin")?
            .map(|line| line.trim().to_string()))
    }

    fn print_question(&self, paper: &ExamPaper) {
        let question = &paper.questions[self.cursor];
        println!(
            "\n[{}/{}] {}",
            self.cursor + 1,
            paper.questions.len(),
            question.content
        );
        match question.kind {
            QuestionKind::SingleChoice => {
                for choice in &question.choices {
                    println!("  {}. {}", choice.label, choice.content);
                }
                println!("Answer with a letter, Enter to skip, q to quit:");
            }
            QuestionKind::TrueFalse => {
                for choice in &question.choices {
                    println!("  {}. {}", choice.label, choice.content);
                }
                println!(
                    "Judge each with t/f (e.g. tfft), Enter to skip, q to quit:"
                );
            }
            QuestionKind::ShortAnswer => {
                println!("Type your answer, Enter to skip, q to quit:");
            }
        }
    }

    /// Parse one input line against the current question. `None` means the
    /// input was invalid and the user should retry.
    fn parse_input(&self, paper: &ExamPaper, input: &str) -> Option<Answer> {
        let question = &paper.questions[self.cursor];
        match question.kind {
            QuestionKind::SingleChoice => question
                .choices
                .iter()
                .find(|c| c.label.eq_ignore_ascii_case(input))
                .map(|c| Answer::Choice(c.content.clone())),
            QuestionKind::TrueFalse => {
                let flags: Option<Vec<bool>> = input
                    .chars()
                    .filter(|c| !c.is_whitespace())
                    .map(|c| match c.to_ascii_lowercase() {
                        't' => Some(true),
                        'f' => Some(false),
                        _ => None,
                    })
                    .collect();
                let flags = flags?;
                if flags.len() != question.choices.len() {
                    return None;
                }
                let judgements = question
                    .choices
                    .iter()
                    .zip(flags)
                    .map(|(choice, flag)| (choice.id, flag))
                    .collect();
                Some(Answer::TrueFalse(judgements))
            }
            QuestionKind::ShortAnswer => Some(Answer::Text(input.to_string())),
        }
    }
}

#[async_trait]
impl AnswerSource for InteractiveSource {
    async fn next_event(&mut self, paper: &ExamPaper) -> Result<AttemptEvent> {
        loop {
            if self.cursor >= paper.questions.len() {
                println!("\nEnd of paper. Submit now? [y to submit, q to quit]");
                let Some(input) = self.read_line().await? else {
                    return Ok(AttemptEvent::Submit);
                };
                match input.as_str() {
                    "y" | "yes" => return Ok(AttemptEvent::Submit),
                    "q" | "quit" => return Ok(AttemptEvent::Abandon),
                    _ => continue,
                }
            }

            self.print_question(paper);
            let Some(input) = self.read_line().await? else {
                return Ok(AttemptEvent::Submit);
            };
            if input == "q" || input == "quit" {
                return Ok(AttemptEvent::Abandon);
            }
            if input.is_empty() {
                self.cursor += 1;
                continue;
            }

            match self.parse_input(paper, &input) {
                Some(answer) => {
                    let question_id = paper.questions[self.cursor].id;
                    self.cursor += 1;
                    return Ok(AttemptEvent::Answer {
                        question_id,
                        answer,
                    });
                }
                None => println!("Didn't understand {input:?}, try again."),
            }
        }
    }
}

pub async fn execute(
    exam: Option<u64>,
    offline: Option<PathBuf>,
    answers: Option<PathBuf>,
    output: Option<PathBuf>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;

    let (backend, exam_id): (Arc<dyn ExamBackend>, u64) = match &offline {
        Some(path) => {
            let paper = parser::parse_exam_file(path)?;
            let exam_id = paper.exam.id;
            (Arc::new(MockBackend::from_paper(paper)), exam_id)
        }
        None => {
            let exam_id =
                exam.ok_or_else(|| anyhow::anyhow!("either --exam or --offline is required"))?;
            (
                Arc::new(RestBackend::new(
                    &config.backend.base_url,
                    config.backend.api_token.clone(),
                )),
                exam_id,
            )
        }
    };

    let store: Arc<dyn AttemptStore> = Arc::new(FileAttemptStore::new(&config.store_dir));
    let engine = AttemptEngine::new(
        backend,
        store,
        AttemptEngineConfig {
            user: config.user.clone(),
            ..Default::default()
        },
    );

    let report = match &answers {
        Some(path) => {
            let mut source = ScriptedSource::answering(parse_answers_file(path)?);
            engine.run(exam_id, &mut source, &ConsoleObserver).await?
        }
        None => {
            let mut source = InteractiveSource::new();
            engine.run(exam_id, &mut source, &ConsoleObserver).await?
        }
    };

    if let Some(path) = output {
        report.save_json(&path)?;
        eprintln!("Report saved to: {}", path.display());
    }

    Ok(())
}
