pub mod exams;
pub mod history;
pub mod init;
pub mod score;
pub mod take;
pub mod validate;

use comfy_table::Table;

use itmaths_core::model::ScoreBreakdown;
use itmaths_core::report::AttemptReport;
use itmaths_core::session::format_countdown;

/// Score breakdown as a printable table.
pub(crate) fn score_table(
    score: &ScoreBreakdown,
    correct_count: u32,
    total_questions: u32,
) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["Part", "Points"]);
    table.add_row(vec!["I — single choice".to_string(), format!("{:.2}", score.part1)]);
    table.add_row(vec!["II — true/false".to_string(), format!("{:.2}", score.part2)]);
    table.add_row(vec!["III — short answer".to_string(), format!("{:.2}", score.part3)]);
    table.add_row(vec!["Total".to_string(), format!("{:.2}", score.total)]);
    table.add_row(vec![
        "Fully correct".to_string(),
        format!("{correct_count} / {total_questions}"),
    ]);
    table
}

/// Full attempt summary, including timing.
pub(crate) fn breakdown_table(report: &AttemptReport) -> Table {
    let mut table = score_table(&report.score, report.correct_count, report.total_questions);
    table.add_row(vec![
        "Time used".to_string(),
        format_countdown(report.elapsed_ms() / 1000),
    ]);
    if report.forced {
        table.add_row(vec!["Submitted".to_string(), "by timer expiry".to_string()]);
    }
    table
}
