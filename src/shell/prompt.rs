use anyhow::Result;
use dialoguer::{theme::ColorfulTheme, Confirm, Input};

/// Where the shell gets its answers from.
pub trait Prompter {
    /// Asks for a number between 0 and `max`, inclusive.
    fn number(&mut self, prompt: &str, max: usize, default: usize) -> Result<usize>;

    fn text(&mut self, prompt: &str) -> Result<String>;

    fn confirm(&mut self, prompt: &str, default: bool) -> Result<bool>;
}

/// Interactive prompts on the controlling terminal.
pub struct TerminalPrompter {
    theme: ColorfulTheme,
}

impl TerminalPrompter {
    pub fn new() -> Self {
        Self {
            theme: ColorfulTheme::default(),
        }
    }
}

impl Default for TerminalPrompter {
    fn default() -> Self {
        Self::new()
    }
}

impl Prompter for TerminalPrompter {
    fn number(&mut self, prompt: &str, max: usize, default: usize) -> Result<usize> {
        let choice = Input::<usize>::with_theme(&self.theme)
            .with_prompt(prompt)
            .default(default)
            .validate_with(move |choice: &usize| -> Result<(), String> {
                if *choice <= max {
                    Ok(())
                } else {
                    Err(format!("Choose a number between 0 and {max}"))
                }
            })
            .interact_text()?;
        Ok(choice)
    }

    fn text(&mut self, prompt: &str) -> Result<String> {
        let text = Input::<String>::with_theme(&self.theme)
            .with_prompt(prompt)
            .allow_empty(true)
            .interact_text()?;
        Ok(text)
    }

    fn confirm(&mut self, prompt: &str, default: bool) -> Result<bool> {
        let answer = Confirm::with_theme(&self.theme)
            .with_prompt(prompt)
            .default(default)
            .interact()?;
        Ok(answer)
    }
}

#[cfg(test)]
pub(crate) mod scripted {
    use super::Prompter;
    use anyhow::{anyhow, Result};
    use std::collections::VecDeque;

    #[derive(Debug)]
    pub enum Answer {
        Number(usize),
        Text(&'static str),
        Yes,
        No,
    }

    /// Replays a fixed list of answers, then fails like a closed stdin.
    pub struct ScriptedPrompter {
        answers: VecDeque<Answer>,
    }

    impl ScriptedPrompter {
        pub fn new(answers: Vec<Answer>) -> Self {
            Self {
                answers: answers.into(),
            }
        }

        fn next(&mut self, prompt: &str) -> Result<Answer> {
            self.answers
                .pop_front()
                .ok_or_else(|| anyhow!("no answer scripted for {prompt:?}"))
        }
    }

    impl Prompter for ScriptedPrompter {
        fn number(&mut self, prompt: &str, max: usize, _default: usize) -> Result<usize> {
            match self.next(prompt)? {
                Answer::Number(n) if n <= max => Ok(n),
                other => panic!("{prompt:?} expected a number up to {max}, got {other:?}"),
            }
        }

        fn text(&mut self, prompt: &str) -> Result<String> {
            match self.next(prompt)? {
                Answer::Text(text) => Ok(text.to_string()),
                other => panic!("{prompt:?} expected text, got {other:?}"),
            }
        }

        fn confirm(&mut self, prompt: &str, _default: bool) -> Result<bool> {
            match self.next(prompt)? {
                Answer::Yes => Ok(true),
                Answer::No => Ok(false),
                other => panic!("{prompt:?} expected yes or no, got {other:?}"),
            }
        }
    }
}
