//! Recording host.

use std::collections::{HashMap, VecDeque};

use serde_json::Value;

use crate::host::Host;

/// Host that answers prompts from a script and records what it was shown.
#[derive(Debug, Clone, Default)]
pub struct RecordingHost {
    variables: HashMap<String, Value>,
    answers: VecDeque<bool>,
    /// Answer once the script runs out.
    default_answer: bool,
    messages: Vec<String>,
    prompts: Vec<String>,
}

impl RecordingHost {
    /// Host that declines every prompt and has no variables set.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_variable(mut self, name: &str, value: Value) -> Self {
        self.variables.insert(name.to_string(), value);
        self
    }

    /// Answer every prompt with `answer`.
    pub fn answering(mut self, answer: bool) -> Self {
        self.default_answer = answer;
        self
    }

    /// Answer prompts in order, then fall back to the default answer.
    pub fn with_answers(mut self, answers: impl IntoIterator<Item = bool>) -> Self {
        self.answers.extend(answers);
        self
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    pub fn prompts(&self) -> &[String] {
        &self.prompts
    }
}

impl Host for RecordingHost {
    fn variable(&self, name: &str) -> Option<Value> {
        self.variables.get(name).cloned()
    }

    fn post_message(&mut self, message: &str) {
        self.messages.push(message.to_string());
    }

    fn confirm(&mut self, message: &str) -> bool {
        self.prompts.push(message.to_string());
        self.answers.pop_front().unwrap_or(self.default_answer)
    }
}
