//! The `quizmark init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    if std::path::Path::new("quizmark.toml").exists() {
        println!("quizmark.toml already exists, skipping.");
    } else {
        std::fs::write("quizmark.toml", SAMPLE_CONFIG)?;
        println!("Created quizmark.toml");
    }

    std::fs::create_dir_all("quizzes")?;
    let example_path = std::path::Path::new("quizzes/example.toml");
    if example_path.exists() {
        println!("quizzes/example.toml already exists, skipping.");
    } else {
        std::fs::write(example_path, EXAMPLE_QUIZ)?;
        println!("Created quizzes/example.toml");
    }

    println!("\nNext steps:");
    println!("  1. Edit quizzes/example.toml or add your own quiz files");
    println!("  2. Run: quizmark validate --quiz quizzes");
    println!("  3. Run: quizmark take --quiz quizzes/example.toml");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# quizmark configuration

# Pass mark (percent) for quizzes that do not set passing_score
default_passing_score = 70

# Shuffle question order on every attempt
shuffle_questions = false

# Fixed seed for shuffles and bank draws (omit for a fresh order each time)
# seed = 42

# Where attempt reports are saved
output_dir = "./quizmark-results"
"#;

const EXAMPLE_QUIZ: &str = r#"[quiz]
id = "example"
title = "Example Knowledge Check"
description = "A short quiz to get started"
passing_score = 70

[[questions]]
id = 1
prompt = "Which keyword declares an immutable binding in Rust?"
options = ["var", "let", "const mut", "static mut"]
correct_index = 1
explanation = "`let` introduces a binding that is immutable unless marked `mut`."
category = "Basics"

[[questions]]
id = 2
prompt = "What does the `?` operator do on an `Err` value?"
options = [
    "Panics with the error",
    "Ignores the error",
    "Returns the error from the enclosing function",
    "Converts it to `None`",
]
correct_index = 2
explanation = "`?` returns early with the error, converting it with `From` if needed."
category = "Error handling"

[[questions]]
id = 3
prompt = "Which type is a growable, heap-allocated string?"
options = ["&str", "String", "char", "[u8; 16]"]
correct_index = 1
explanation = "`String` owns its UTF-8 buffer; `&str` is a borrowed slice."
category = "Basics"
"#;
