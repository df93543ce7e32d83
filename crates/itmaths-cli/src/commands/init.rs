//! The `itmaths init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    // Create itmaths.toml
    if std::path::Path::new("itmaths.toml").exists() {
        println!("itmaths.toml already exists, skipping.");
    } else {
        std::fs::write("itmaths.toml", SAMPLE_CONFIG)?;
        println!("Created itmaths.toml");
    }

    // Create example exam file
    std::fs::create_dir_all("exams")?;
    let example_path = std::path::Path::new("exams/example.toml");
    if example_path.exists() {
        println!("exams/example.toml already exists, skipping.");
    } else {
        std::fs::write(example_path, EXAMPLE_EXAM)?;
        println!("Created exams/example.toml");
    }

    println!("\nNext steps:");
    println!("  1. Edit itmaths.toml with your platform URL and token");
    println!("  2. Run: itmaths validate --exam exams/example.toml");
    println!("  3. Run: itmaths take --offline exams/example.toml");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# itmaths configuration

user = "student"

[backend]
base_url = "https://api.itmaths.app"
api_token = "${ITMATHS_API_TOKEN}"
"#;

const EXAMPLE_EXAM: &str = r#"[exam]
id = 1
title = "Example: fractions and decimals"
duration_minutes = 10
grade = "7"
topic = "arithmetic"

[[questions]]
id = 1
type = "single_choice"
content = "What is 1/2 + 1/4?"

  [[questions.choices]]
  id = 11
  content = "1/6"

  [[questions.choices]]
  id = 12
  content = "3/4"
  correct = true

  [[questions.choices]]
  id = 13
  content = "2/6"

  [[questions.choices]]
  id = 14
  content = "1/8"

[[questions]]
id = 2
type = "true_false"
content = "Judge each statement."

  [[questions.choices]]
  id = 21
  content = "1/2 = 0.5"
  correct = true

  [[questions.choices]]
  id = 22
  content = "1/3 = 0.3"

  [[questions.choices]]
  id = 23
  content = "1/4 = 0.25"
  correct = true

  [[questions.choices]]
  id = 24
  content = "1/5 = 0.2"
  correct = true

[[questions]]
id = 3
type = "short_answer"
content = "Write 7/2 as a decimal."
answer = "3.5"
"#;
