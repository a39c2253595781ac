//! Interactive prompt primitives.
//!
//! Input is read through the [`LineReader`] capability so whole sessions can
//! be scripted in tests with [`ScriptedInput`].
use std::collections::VecDeque;
use std::io::{self, BufRead as _, Write as _};
use std::sync::Mutex;

use crate::error::PromptError;
use crate::logging;

/// Source of answer lines.
pub trait LineReader: Send + Sync + std::fmt::Debug {
    /// Read one line without its terminator, or `None` at end of input.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying input cannot be read.
    fn read_line(&self) -> io::Result<Option<String>>;
}

/// Reads answers from the process's standard input.
#[derive(Debug, Default)]
pub struct StdinReader;

impl LineReader for StdinReader {
    fn read_line(&self) -> io::Result<Option<String>> {
        let mut line = String::new();
        let n = io::stdin().lock().read_line(&mut line)?;
        if n == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }
}

/// Replays a fixed list of answers, then reports end of input.
#[derive(Debug, Default)]
pub struct ScriptedInput {
    lines: Mutex<VecDeque<String>>,
}

impl ScriptedInput {
    /// Create a reader that returns `lines` in order.
    #[must_use]
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: Mutex::new(lines.into_iter().map(Into::into).collect()),
        }
    }
}

impl LineReader for ScriptedInput {
    fn read_line(&self) -> io::Result<Option<String>> {
        Ok(self
            .lines
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .pop_front())
    }
}

/// Asks questions and resolves answers against their defaults.
#[derive(Debug)]
pub struct Prompter {
    reader: Box<dyn LineReader>,
    assume_defaults: bool,
}

impl Prompter {
    /// Create a prompter reading answers from `reader`.
    #[must_use]
    pub fn new(reader: Box<dyn LineReader>) -> Self {
        Self {
            reader,
            assume_defaults: false,
        }
    }

    /// Accept every default without reading input (`--yes`).
    #[must_use]
    pub const fn assume_defaults(mut self, yes: bool) -> Self {
        self.assume_defaults = yes;
        self
    }

    #[allow(clippy::print_stdout)]
    fn ask(&self, question: &str) -> Result<String, PromptError> {
        print!("{question}");
        io::stdout().flush().ok();
        if self.assume_defaults {
            println!();
            return Ok(String::new());
        }
        let line = self.reader.read_line().map_err(|source| PromptError::Read {
            prompt: question.trim_end().to_string(),
            source,
        })?;
        if line.is_none() {
            println!();
        }
        Ok(line.unwrap_or_default().trim().to_string())
    }

    /// Ask for a value, showing `default` inline.
    ///
    /// Empty input (or end of input) returns `default`.  The resolved answer
    /// is recorded in the log file.
    ///
    /// # Errors
    ///
    /// Returns [`PromptError`] if the answer cannot be read.
    pub fn prompt_with_default(&self, text: &str, default: &str) -> Result<String, PromptError> {
        let answer = self.ask(&format!("{text} [{default}]: "))?;
        let value = resolve_with_default(&answer, default);
        logging::record_answer(text, &value);
        Ok(value)
    }

    /// Ask a yes/no question.
    ///
    /// # Errors
    ///
    /// Returns [`PromptError`] if the answer cannot be read.
    pub fn prompt_yes_no(&self, text: &str, default_is_yes: bool) -> Result<bool, PromptError> {
        let hint = if default_is_yes { "(Y/n)" } else { "(y/N)" };
        let answer = self.ask(&format!("{text} {hint}: "))?;
        let yes = resolve_yes_no(&answer, default_is_yes);
        logging::record_answer(text, if yes { "yes" } else { "no" });
        Ok(yes)
    }
}

/// Substitute `default` for an empty answer.
#[must_use]
pub fn resolve_with_default(answer: &str, default: &str) -> String {
    let answer = answer.trim();
    if answer.is_empty() {
        default.to_string()
    } else {
        answer.to_string()
    }
}

/// Resolve a yes/no answer.
///
/// The default's literal (`y` or `n`) is substituted for an empty answer
/// before matching, so accepting the default and typing it are identical.
/// Unrecognised answers resolve to the default.
#[must_use]
pub fn resolve_yes_no(answer: &str, default_is_yes: bool) -> bool {
    let literal = if default_is_yes { "y" } else { "n" };
    let answer = resolve_with_default(answer, literal).to_ascii_lowercase();
    match answer.as_str() {
        "y" | "yes" => true,
        "n" | "no" => false,
        _ => default_is_yes,
    }
}
