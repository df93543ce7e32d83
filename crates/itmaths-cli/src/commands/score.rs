//! The `itmaths score` command: offline scoring, no timer, no network.

use std::path::PathBuf;

use anyhow::Result;

use itmaths_core::parser;
use itmaths_core::scoring::score_attempt;

use crate::answers::{parse_answers_file, to_answer_map};

pub fn execute(exam: PathBuf, answers: PathBuf, output: Option<PathBuf>) -> Result<()> {
    let paper = parser::parse_exam_file(&exam)?;

    for warning in parser::validate_exam(&paper) {
        match warning.question_id {
            Some(id) => eprintln!("Warning: question {id}: {}", warning.message),
            None => eprintln!("Warning: {}", warning.message),
        }
    }

    let answer_map = to_answer_map(parse_answers_file(&answers)?);
    let score = score_attempt(&paper.questions, &answer_map);

    println!("{} — {} questions", paper.exam.title, paper.questions.len());
    println!(
        "{}",
        super::score_table(&score.breakdown, score.correct_count, score.total_questions)
    );

    if let Some(path) = output {
        let json = serde_json::json!({
            "exam_id": paper.exam.id,
            "part1": score.breakdown.part1,
            "part2": score.breakdown.part2,
            "part3": score.breakdown.part3,
            "total": score.breakdown.total,
            "correct_count": score.correct_count,
            "total_questions": score.total_questions,
        });
        std::fs::write(&path, serde_json::to_string_pretty(&json)?)?;
        eprintln!("Breakdown saved to: {}", path.display());
    }

    Ok(())
}
