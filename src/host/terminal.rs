//! Terminal-backed host.

use std::io::{self, BufRead, Write};

use serde_json::Value;

use super::Host;
use crate::config::EffectiveConfig;

/// Host backed by the effective configuration and the controlling terminal.
///
/// Messages and prompts go to stderr; answers are read from stdin.
#[derive(Debug, Clone)]
pub struct TerminalHost {
    config: EffectiveConfig,
}

impl TerminalHost {
    pub fn new(config: EffectiveConfig) -> Self {
        Self { config }
    }
}

impl Host for TerminalHost {
    fn variable(&self, name: &str) -> Option<Value> {
        self.config.get(name).cloned()
    }

    fn post_message(&mut self, message: &str) {
        eprintln!("{}", message);
    }

    fn confirm(&mut self, message: &str) -> bool {
        let stdin = io::stdin();
        let mut input = stdin.lock();
        match prompt_yes_no(message, &mut input, &mut io::stderr()) {
            Ok(answer) => answer,
            Err(e) => {
                tracing::warn!(error = %e, "confirmation prompt failed, declining");
                false
            }
        }
    }
}

/// Prompt with `[y/N]` and read one line. Anything but y/yes declines,
/// including end of input.
pub fn prompt_yes_no<R: BufRead, W: Write>(
    message: &str,
    input: &mut R,
    output: &mut W,
) -> io::Result<bool> {
    write!(output, "{} [y/N] ", message)?;
    output.flush()?;

    let mut answer = String::new();
    input.read_line(&mut answer)?;

    let answer = answer.trim().to_lowercase();
    Ok(answer == "y" || answer == "yes")
}
