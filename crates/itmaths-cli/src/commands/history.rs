//! The `itmaths history` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::Table;

use itmaths_api::{load_config_from, RestBackend};
use itmaths_core::traits::ExamBackend;

pub async fn execute(
    clear: bool,
    user: Option<String>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let backend = RestBackend::new(&config.backend.base_url, config.backend.api_token.clone());
    let user = user.unwrap_or_else(|| config.user.clone());

    if clear {
        backend.delete_history(&user).await?;
        println!("History cleared for {user}.");
        return Ok(());
    }

    let history = backend.fetch_history(&user).await?;
    if history.is_empty() {
        println!("No attempts yet.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["When", "Exam", "Score", "Correct"]);
    for entry in history.iter().take(config.history_limit) {
        table.add_row(vec![
            entry.submitted_at.format("%Y-%m-%d %H:%M").to_string(),
            entry.exam_title.clone(),
            format!("{:.2}", entry.score),
            format!("{} / {}", entry.correct_count, entry.total_questions),
        ]);
    }
    println!("{table}");

    if history.len() > config.history_limit {
        eprintln!(
            "Showing {} of {} attempts.",
            config.history_limit,
            history.len()
        );
    }

    Ok(())
}
