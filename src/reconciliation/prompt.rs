//! Operator interaction.
//!
//! The resolver never reads the terminal directly; it talks to a [`Prompt`].
//! [`ConsolePrompt`] drives a real terminal, [`ScriptedPrompt`] replays
//! canned answers.

use crate::diff::ContentDiff;
use crate::roots::{Side, SyncRoots};
use async_trait::async_trait;
use console::style;
use dialoguer::{Confirm, Select};
use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PromptError {
    #[error("Terminal prompt failed: {0}")]
    DialogError(#[from] dialoguer::Error),

    #[error("Prompt interrupted")]
    Interrupted,

    #[error("No scripted answer left for: {0}")]
    Exhausted(String),
}

/// Capability used by the resolver to ask the operator
#[async_trait]
pub trait Prompt: Send + Sync {
    /// Ask a yes/no question
    async fn confirm(&self, message: &str) -> Result<bool, PromptError>;

    /// Ask which side is authoritative when timestamps cannot decide
    async fn choose_side(&self, message: &str, roots: &SyncRoots) -> Result<Side, PromptError>;

    /// Show what differs between the two copies of `relative_path`
    async fn present_diff(&self, relative_path: &str, diff: &ContentDiff);
}

/// Interactive terminal prompt
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsolePrompt;

#[async_trait]
impl Prompt for ConsolePrompt {
    async fn confirm(&self, message: &str) -> Result<bool, PromptError> {
        let message = message.to_string();
        tokio::task::spawn_blocking(move || {
            Confirm::new()
                .with_prompt(message)
                .default(false)
                .interact()
        })
        .await
        .map_err(|_| PromptError::Interrupted)?
        .map_err(PromptError::from)
    }

    async fn choose_side(&self, message: &str, roots: &SyncRoots) -> Result<Side, PromptError> {
        let message = message.to_string();
        let items = vec![
            roots.label(Side::Left).to_string(),
            roots.label(Side::Right).to_string(),
        ];
        let index = tokio::task::spawn_blocking(move || {
            Select::new()
                .with_prompt(message)
                .items(&items)
                .default(0)
                .interact()
        })
        .await
        .map_err(|_| PromptError::Interrupted)??;

        Ok(if index == 0 { Side::Left } else { Side::Right })
    }

    async fn present_diff(&self, relative_path: &str, diff: &ContentDiff) {
        match diff {
            ContentDiff::Binary => {
                println!("{}", style(format!("Contents of '{}' differ.", relative_path)).dim());
            }
            ContentDiff::SameText => {
                println!("The text of '{}' is the same on both sides.", relative_path);
                println!("Copying is recommended to synchronize the modified date.");
            }
            ContentDiff::Unavailable(reason) => {
                println!("{}", style(format!("Diff unavailable: {}", reason)).yellow());
            }
            ContentDiff::Paragraphs(lines) => {
                println!();
                println!("Showing diff:");
                for line in lines {
                    if line.starts_with("---") || line.starts_with("+++") {
                        println!("{}", style(line).bold());
                    } else if line.starts_with("@@") {
                        println!("{}", style(line).cyan());
                    } else if line.starts_with('-') {
                        println!("{}", style(line).red());
                    } else if line.starts_with('+') {
                        println!("{}", style(line).green());
                    } else {
                        println!("{}", line);
                    }
                }
                println!();
            }
        }
    }
}

/// Prompt that answers from pre-recorded queues.
///
/// Every question and presented diff is recorded for later inspection.
#[derive(Debug, Default)]
pub struct ScriptedPrompt {
    confirmations: Mutex<VecDeque<bool>>,
    sides: Mutex<VecDeque<Side>>,
    fallback: Option<bool>,
    questions: Mutex<Vec<String>>,
    diffs: Mutex<Vec<(String, ContentDiff)>>,
}

impl ScriptedPrompt {
    /// A prompt that fails if it is ever asked anything
    pub fn new() -> Self {
        Self::default()
    }

    /// A prompt that gives the same answer to every confirmation
    pub fn always(answer: bool) -> Self {
        Self {
            fallback: Some(answer),
            ..Self::default()
        }
    }

    /// Answer confirmations in order
    pub fn with_confirmations(answers: impl IntoIterator<Item = bool>) -> Self {
        Self {
            confirmations: Mutex::new(answers.into_iter().collect()),
            ..Self::default()
        }
    }

    /// Answer side choices in order
    pub fn with_sides(self, sides: impl IntoIterator<Item = Side>) -> Self {
        Self {
            sides: Mutex::new(sides.into_iter().collect()),
            ..self
        }
    }

    /// Every confirmation and side question asked so far
    pub fn questions(&self) -> Vec<String> {
        self.questions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Every diff presented so far, with its relative path
    pub fn presented_diffs(&self) -> Vec<(String, ContentDiff)> {
        self.diffs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn ask(&self, message: &str) {
        self.questions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(message.to_string());
    }
}

#[async_trait]
impl Prompt for ScriptedPrompt {
    async fn confirm(&self, message: &str) -> Result<bool, PromptError> {
        self.ask(message);
        let next = self
            .confirmations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front();
        next.or(self.fallback)
            .ok_or_else(|| PromptError::Exhausted(message.to_string()))
    }

    async fn choose_side(&self, message: &str, _roots: &SyncRoots) -> Result<Side, PromptError> {
        self.ask(message);
        self.sides
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
            .ok_or_else(|| PromptError::Exhausted(message.to_string()))
    }

    async fn present_diff(&self, relative_path: &str, diff: &ContentDiff) {
        self.diffs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((relative_path.to_string(), diff.clone()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_scripted_answers_in_order_then_fails() {
        let prompt = ScriptedPrompt::with_confirmations([true, false]);
        assert!(prompt.confirm("first?").await.unwrap());
        assert!(!prompt.confirm("second?").await.unwrap());
        assert!(matches!(
            prompt.confirm("third?").await,
            Err(PromptError::Exhausted(_))
        ));
        assert_eq!(prompt.questions(), vec!["first?", "second?", "third?"]);
    }

    #[tokio::test]
    async fn test_scripted_fallback_answer() {
        let prompt = ScriptedPrompt::always(true);
        for _ in 0..3 {
            assert!(prompt.confirm("copy?").await.unwrap());
        }
    }

    #[tokio::test]
    async fn test_scripted_sides() {
        let roots = SyncRoots::unlabelled("/l", "/r");
        let prompt = ScriptedPrompt::new().with_sides([Side::Right]);
        assert_eq!(prompt.choose_side("which?", &roots).await.unwrap(), Side::Right);
        assert!(prompt.choose_side("again?", &roots).await.is_err());
    }
}
