//! Yes/no confirmation, kept behind a trait so the provisioning logic never
//! touches the terminal directly.

use std::io::{self, BufRead, Write};

/// Answers yes/no questions.
pub trait Prompter: Send + Sync {
    /// Ask `question`; `default` is taken on empty input.
    fn confirm(&self, question: &str, default: bool) -> bool;
}

/// Answers every question with its default.
pub struct NonInteractive;

impl Prompter for NonInteractive {
    fn confirm(&self, question: &str, default: bool) -> bool {
        log::debug!("[prompt] {question} -> {default} (non-interactive)");
        default
    }
}

/// Reads answers from standard input, printing questions to standard error.
pub struct StdinPrompter;

impl Prompter for StdinPrompter {
    fn confirm(&self, question: &str, default: bool) -> bool {
        let hint = if default { "[Y/n]" } else { "[y/N]" };
        eprint!("{question} {hint} ");
        let _ = io::stderr().flush();

        let mut line = String::new();
        match io::stdin().lock().read_line(&mut line) {
            Ok(0) | Err(_) => parse_answer(None, default),
            Ok(_) => parse_answer(Some(&line), default),
        }
    }
}

/// Interpret a typed answer.
///
/// `y`/`yes` is affirmative and `n`/`no` negative (case-insensitive). Empty
/// input or EOF (`None`) takes `default`. Anything else counts as "no".
pub fn parse_answer(input: Option<&str>, default: bool) -> bool {
    let Some(input) = input else {
        return default;
    };
    match input.trim().to_ascii_lowercase().as_str() {
        "" => default,
        "y" | "yes" => true,
        _ => false,
    }
}
