//! Answer providers for guided mode.
//!
//! The reconciler only sees the [`Prompter`] trait; the binary wires it to
//! stdin and tests feed scripted answers.
use crate::error::BuildError;
use anyhow::{Context, Result};
use regex::Regex;
use std::io::{self, BufRead, Write};

const QUOTES: &[char] = &['"', '\'', '\u{201C}', '\u{201D}', '\u{2018}', '\u{2019}'];

pub trait Prompter {
    /// Show `prompt` and return the raw line entered, without its newline.
    fn answer(&mut self, prompt: &str) -> Result<String>;
}

/// Reads answers from stdin, printing prompts on stderr.
pub struct StdinPrompter;

impl StdinPrompter {
    /// Set up the Ctrl+C handler so an interrupt during a prompt exits with
    /// status 1 before anything is written.
    pub fn install() -> Result<Self> {
        ctrlc::set_handler(|| {
            eprintln!("\n{}", BuildError::Interrupted);
            std::process::exit(1);
        })
        .context("install Ctrl+C handler")?;
        Ok(Self)
    }
}

impl Prompter for StdinPrompter {
    fn answer(&mut self, prompt: &str) -> Result<String> {
        let mut stderr = io::stderr().lock();
        write!(stderr, "{prompt}").context("write prompt")?;
        stderr.flush().context("flush prompt")?;

        let mut line = String::new();
        let read = io::stdin()
            .lock()
            .read_line(&mut line)
            .context("read answer")?;
        if read == 0 {
            return Err(BuildError::Interrupted.into());
        }
        Ok(line.trim_end_matches(&['\r', '\n'][..]).to_string())
    }
}

/// Ask `question` and clean up the answer; one character or less falls back
/// to the bracketed default in the question.
pub fn ask(prompter: &mut dyn Prompter, question: &str) -> Result<String> {
    let raw = prompter.answer(question)?;
    let answer = strip_quotes(raw.trim()).trim();
    if answer.chars().count() > 1 {
        return Ok(answer.to_string());
    }
    Ok(bracketed_default(question))
}

/// Text between the last `[` and `]` of a prompt, or empty.
pub fn bracketed_default(question: &str) -> String {
    let pattern = Regex::new(r".*\[(.*)\].*").expect("regex for bracketed default");
    pattern
        .captures(question)
        .and_then(|cap| cap.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_default()
}

fn strip_quotes(text: &str) -> &str {
    let text = text.strip_prefix(QUOTES).unwrap_or(text);
    text.strip_suffix(QUOTES).unwrap_or(text)
}

/// Replays canned answers and records the prompts it was shown.
#[cfg(test)]
pub(crate) struct ScriptedPrompter {
    answers: std::collections::VecDeque<String>,
    pub(crate) prompts: Vec<String>,
}

#[cfg(test)]
impl ScriptedPrompter {
    pub(crate) fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: answers.into_iter().map(Into::into).collect(),
            prompts: Vec::new(),
        }
    }
}

#[cfg(test)]
impl Prompter for ScriptedPrompter {
    fn answer(&mut self, prompt: &str) -> Result<String> {
        self.prompts.push(prompt.to_string());
        self.answers
            .pop_front()
            .ok_or_else(|| BuildError::Interrupted.into())
    }
}
