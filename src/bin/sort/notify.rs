//! Optional fire-and-forget status notifications.
//!
//! Delivery is delegated to a user-configured external command which
//! receives the plain status line as its only argument. The child process
//! is never awaited and failures are ignored: a notifier must not be able
//! to affect the sorting run.

use std::process::{Command, Stdio};

/// Runs the configured command once per status line.
#[derive(Debug)]
pub struct Notifier {
    command: String,
}

impl Notifier {
    pub const fn new(command: String) -> Self {
        Self { command }
    }

    /// Send one message, ignoring all errors.
    pub fn notify(&self, message: &str) {
        let _ = Command::new(&self.command)
            .arg(message)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn();
    }
}
