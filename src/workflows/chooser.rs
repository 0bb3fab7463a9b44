use anyhow::{bail, Result};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use super::console::Console;
use crate::domain::error::FetchError;

pub trait Chooser {
    /// Shows a numbered list and returns the 0-based index of the pick.
    fn choose(&mut self, options: &[String]) -> Result<usize>;
}

pub struct PromptChooser {
    console: Console,
    editor: DefaultEditor,
}

impl PromptChooser {
    pub fn new(console: Console) -> Result<Self> {
        Ok(Self {
            console,
            editor: DefaultEditor::new()?,
        })
    }
}

impl Chooser for PromptChooser {
    fn choose(&mut self, options: &[String]) -> Result<usize> {
        if options.is_empty() {
            bail!("nothing to choose from");
        }
        for (i, option) in options.iter().enumerate() {
            self.console.line(format!("{:>3})  {}", i + 1, option));
        }

        loop {
            self.console.blank();
            let prompt = format!("{}  choose subtitle: ", self.console.prefix);
            let input = match self.editor.readline(&prompt) {
                Ok(line) => line,
                Err(ReadlineError::Interrupted) => bail!("Interrupted"),
                Err(ReadlineError::Eof) => bail!("EOF"),
                Err(err) => return Err(err.into()),
            };
            match parse_choice(&input, options.len()) {
                Ok(index) => return Ok(index),
                Err(err) => self.console.line(format!("  Error: {err}")),
            }
        }
    }
}

/// Parses a 1-based answer into a 0-based index.
pub fn parse_choice(input: &str, len: usize) -> Result<usize, FetchError> {
    let choice: usize = input
        .trim()
        .parse()
        .map_err(|_| FetchError::InvalidUserChoice("only numbers accepted".to_string()))?;
    if choice < 1 || choice > len {
        return Err(FetchError::InvalidUserChoice(format!(
            "{choice} is not within 1-{len}"
        )));
    }
    Ok(choice - 1)
}
