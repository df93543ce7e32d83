//! The `itmaths validate` command.

use std::path::PathBuf;

use anyhow::Result;

use itmaths_core::model::ExamPaper;
use itmaths_core::parser;

pub fn execute(path: PathBuf) -> Result<()> {
    let papers: Vec<ExamPaper> = if path.is_dir() {
        parser::load_exam_directory(&path)?
    } else {
        vec![parser::parse_exam_file(&path)?]
    };

    if papers.is_empty() {
        anyhow::bail!("no exam files found in {}", path.display());
    }

    let mut total_warnings = 0usize;
    for paper in &papers {
        println!(
            "{} (exam {}): {} questions",
            paper.exam.title,
            paper.exam.id,
            paper.questions.len()
        );

        for warning in parser::validate_exam(paper) {
            total_warnings += 1;
            match warning.question_id {
                Some(id) => println!("  warning: question {id}: {}", warning.message),
                None => println!("  warning: {}", warning.message),
            }
        }
    }

    if total_warnings == 0 {
        println!("All exam files valid.");
    } else {
        println!("{total_warnings} warning(s).");
    }

    Ok(())
}
