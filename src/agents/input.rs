//! User input channels for the interactive agents.
//!
//! Agents never read the console directly; they ask an [`InputSource`] for the next user
//! turn, so tests can drive them with [`ScriptedInput`].

use crate::error::Result;
use std::collections::VecDeque;
use std::io::{self, BufRead, Write};

/// Provider of user turns
pub trait InputSource: Send {
    /// Show `prompt` and return the next line, or `None` when input is exhausted
    fn next_line(&mut self, prompt: &str) -> Result<Option<String>>;
}

/// `exit` or `quit`, ignoring case and surrounding whitespace
pub fn is_exit_command(input: &str) -> bool {
    let input = input.trim();
    input.eq_ignore_ascii_case("exit") || input.eq_ignore_ascii_case("quit")
}

/// Reads user turns from standard input
#[derive(Debug, Default)]
pub struct StdinInput;

impl StdinInput {
    pub fn new() -> Self {
        Self
    }
}

impl InputSource for StdinInput {
    fn next_line(&mut self, prompt: &str) -> Result<Option<String>> {
        print!("{}", prompt);
        io::stdout().flush()?;

        let mut line = String::new();
        if io::stdin().lock().read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }
}

/// Replays a fixed list of user turns and records the prompts it was shown
#[derive(Debug, Default)]
pub struct ScriptedInput {
    lines: VecDeque<String>,
    prompts: Vec<String>,
}

impl ScriptedInput {
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
            prompts: Vec::new(),
        }
    }

    pub fn prompts(&self) -> &[String] {
        &self.prompts
    }

    pub fn remaining(&self) -> usize {
        self.lines.len()
    }
}

impl InputSource for ScriptedInput {
    fn next_line(&mut self, prompt: &str) -> Result<Option<String>> {
        self.prompts.push(prompt.to_string());
        Ok(self.lines.pop_front())
    }
}
