//! The `lessonscope init` command.

use std::path::Path;

use anyhow::Result;

use lessonscope_providers::config::LOCAL_CONFIG_FILE;

const SAMPLE_INPUT_FILE: &str = "assessment-input.txt";

pub fn execute() -> Result<()> {
    write_if_missing(Path::new(LOCAL_CONFIG_FILE), SAMPLE_CONFIG)?;
    write_if_missing(Path::new(SAMPLE_INPUT_FILE), SAMPLE_INPUT)?;

    println!("\nNext steps:");
    println!("  1. Export GEMINI_API_KEY or edit {LOCAL_CONFIG_FILE}");
    println!("  2. Run: lessonscope check");
    println!("  3. Fill in {SAMPLE_INPUT_FILE} with your unit, lesson, and items");
    println!("  4. Run: lessonscope analyze --input {SAMPLE_INPUT_FILE}");

    Ok(())
}

fn write_if_missing(path: &Path, content: &str) -> Result<()> {
    if path.exists() {
        println!("{} already exists, skipping.", path.display());
    } else {
        std::fs::write(path, content)?;
        println!("Created {}", path.display());
    }
    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# lessonscope configuration

# Model to request; falls back to model_preferences when unavailable.
# default_model = "gemini-1.5-flash"
model_preferences = ["gemini-1.5-flash", "gemini-1.5-pro", "text-bison", "chat-bison"]
output_dir = "."

[provider]
type = "gemini"
api_key = "${GEMINI_API_KEY}"
timeout_secs = 120

[generation]
temperature = 0.7
top_p = 0.95
top_k = 64
max_output_tokens = 8192
"#;

const SAMPLE_INPUT: &str = r#"Unit Title: [Your Unit Title]
Lesson Title: [Your Lesson Title]
Learning Objective: [Your Learning Objective]
Associated Standard Code: [Standard Code]
Associated Standard Text: [Standard Text]
DOK Low MC Item 1: [Item 1]
DOK Low MC Item 2: [Item 2]
DOK Low MC Item 3: [Item 3]
DOK Medium MC Item 1: [Item 1]
DOK Medium MC Item 2: [Item 2]
DOK Medium MC Item 3: [Item 3]
DOK Medium MC Item 4: [Item 4]
DOK Medium MC Item 5: [Item 5]
DOK High MC Item 1: [Item 1]
DOK High MC Item 2: [Item 2]
DOK High MC Item 3: [Item 3]
Constructed Response Prompt: [Prompt]
Constructed Response Sample Answer: [Sample Answer]
"#;
