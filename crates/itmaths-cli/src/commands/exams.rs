//! The `itmaths exams` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::Table;

use itmaths_api::{load_config_from, RestBackend};
use itmaths_core::traits::ExamBackend;

pub async fn execute(config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let backend = RestBackend::new(&config.backend.base_url, config.backend.api_token.clone());

    let exams = backend.list_exams().await?;
    if exams.is_empty() {
        println!("No exams available.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["Id", "Title", "Duration", "Grade", "Topic"]);
    for exam in &exams {
        table.add_row(vec![
            exam.id.to_string(),
            exam.title.clone(),
            format!("{} min", exam.duration_minutes),
            exam.grade.clone().unwrap_or_default(),
            exam.topic.clone().unwrap_or_default(),
        ]);
    }
    println!("{table}");

    Ok(())
}
