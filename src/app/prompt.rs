//! Isolates all interactive prompts behind one trait (spec §9), so tests can
//! inject a scripted responder instead of touching stdin.

use std::collections::VecDeque;

/// A yes/no question with an optional default, or a free-form line.
pub trait Prompter: Send + Sync {
    /// Asks a yes/no question. `default` is what a bare Enter answers, if
    /// anything. Returns the answer; implementations that can't prompt
    /// (non-TTY, CI) fall back to `default.unwrap_or(false)`.
    fn confirm(&self, message: &str, default: Option<bool>) -> bool;

    /// Asks for a free-form line (spec §4.7's commit-resolution loop).
    /// Returns `None` if the user aborted (e.g. EOF).
    fn ask_line(&self, message: &str) -> Option<String>;
}

/// Production implementation: `dialoguer`, matching the teacher's
/// `Confirm::new().with_prompt(..).default(..).interact()` usage, gated on
/// TTY/CI detection the same way.
pub struct DialoguerPrompter;

impl Prompter for DialoguerPrompter {
    fn confirm(&self, message: &str, default: Option<bool>) -> bool {
        if !crate::tools::supports_interactive_prompts() {
            return default.unwrap_or(false);
        }

        let mut confirm = dialoguer::Confirm::new().with_prompt(message);
        if let Some(default) = default {
            confirm = confirm.default(default);
        }
        confirm.interact().unwrap_or_else(|_| default.unwrap_or(false))
    }

    fn ask_line(&self, message: &str) -> Option<String> {
        if !crate::tools::supports_interactive_prompts() {
            return None;
        }
        dialoguer::Input::<String>::new().with_prompt(message).interact_text().ok()
    }
}

/// Test double: replays a fixed script of answers in order, panicking if
/// more prompts are asked than scripted (spec §9: "tests inject a scripted
/// responder").
#[derive(Default)]
pub struct ScriptedPrompter {
    answers: std::sync::Mutex<VecDeque<Answer>>,
}

#[derive(Debug, Clone)]
pub enum Answer {
    Confirm(bool),
    Line(String),
    Eof,
}

impl ScriptedPrompter {
    pub fn new(answers: impl IntoIterator<Item = Answer>) -> Self {
        ScriptedPrompter { answers: std::sync::Mutex::new(answers.into_iter().collect()) }
    }
}

impl Prompter for ScriptedPrompter {
    fn confirm(&self, _message: &str, default: Option<bool>) -> bool {
        match self.answers.lock().unwrap().pop_front() {
            Some(Answer::Confirm(b)) => b,
            Some(other) => panic!("expected a Confirm answer, found {other:?}"),
            None => default.unwrap_or(false),
        }
    }

    fn ask_line(&self, _message: &str) -> Option<String> {
        match self.answers.lock().unwrap().pop_front() {
            Some(Answer::Line(s)) => Some(s),
            Some(Answer::Eof) => None,
            Some(other) => panic!("expected a Line answer, found {other:?}"),
            None => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scripted_prompter_replays_in_order() {
        let prompter = ScriptedPrompter::new([
            Answer::Confirm(true),
            Answer::Line("master".to_string()),
            Answer::Eof,
        ]);
        assert!(prompter.confirm("rebuild?", Some(false)));
        assert_eq!(prompter.ask_line("commit?"), Some("master".to_string()));
        assert_eq!(prompter.ask_line("commit?"), None);
    }

    #[test]
    fn unscripted_confirm_falls_back_to_default() {
        let prompter = ScriptedPrompter::default();
        assert!(!prompter.confirm("proceed?", Some(false)));
        assert!(prompter.confirm("proceed?", Some(true)));
    }
}
