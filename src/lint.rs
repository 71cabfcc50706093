//! Advisory linting after a committed edit.
//!
//! A linter's verdict is reported to the caller but never causes a revert.

use serde::Serialize;
use std::path::Path;
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use crate::config::LintConfig;

/// Maximum diagnostic lines kept from linter output
const MAX_ISSUES: usize = 50;

/// Result of an advisory lint run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LintReport {
    pub passed: bool,
    pub issues: Vec<String>,
}

impl LintReport {
    pub fn pass() -> Self {
        Self {
            passed: true,
            issues: Vec::new(),
        }
    }

    pub fn fail(issues: Vec<String>) -> Self {
        Self {
            passed: false,
            issues,
        }
    }
}

/// An advisory checker run against a file after a committed edit
pub trait Linter {
    fn lint(&self, path: &Path) -> LintReport;
}

/// Linter backed by an external process with a timeout
#[derive(Debug, Clone)]
pub struct CommandLinter {
    command: String,
    args: Vec<String>,
    timeout: Duration,
}

impl CommandLinter {
    pub fn new(command: impl Into<String>, args: Vec<String>, timeout: Duration) -> Self {
        Self {
            command: command.into(),
            args,
            timeout,
        }
    }

    pub fn from_config(config: &LintConfig) -> Self {
        Self::new(
            config.command.clone(),
            config.args.clone(),
            Duration::from_secs(config.timeout_secs),
        )
    }

    fn build_args(&self, path: &Path) -> Vec<String> {
        let file = path.display().to_string();
        let mut substituted = false;
        let mut args: Vec<String> = self
            .args
            .iter()
            .map(|arg| {
                if arg.contains("{file}") {
                    substituted = true;
                    arg.replace("{file}", &file)
                } else {
                    arg.clone()
                }
            })
            .collect();

        if !substituted {
            args.push(file);
        }
        args
    }
}

impl Linter for CommandLinter {
    fn lint(&self, path: &Path) -> LintReport {
        let args = self.build_args(path);
        debug!(command = %self.command, ?args, "running advisory linter");

        let mut child = match Command::new(&self.command)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
        {
            Ok(child) => child,
            Err(e) => {
                warn!(command = %self.command, error = %e, "failed to start linter");
                return LintReport::fail(vec![format!(
                    "failed to run linter '{}': {e}",
                    self.command
                )]);
            }
        };

        let start = Instant::now();
        loop {
            match child.try_wait() {
                Ok(Some(_)) => break,
                Ok(None) => {
                    if start.elapsed() > self.timeout {
                        let _ = child.kill();
                        let _ = child.wait();
                        warn!(command = %self.command, "linter timed out");
                        return LintReport::fail(vec![format!(
                            "linter '{}' timed out after {:.1}s",
                            self.command,
                            self.timeout.as_secs_f64()
                        )]);
                    }
                    thread::sleep(Duration::from_millis(20));
                }
                Err(e) => {
                    return LintReport::fail(vec![format!("failed waiting for linter: {e}")]);
                }
            }
        }

        let output = match child.wait_with_output() {
            Ok(output) => output,
            Err(e) => return LintReport::fail(vec![format!("failed reading linter output: {e}")]),
        };

        if output.status.success() {
            return LintReport::pass();
        }

        let mut issues: Vec<String> = String::from_utf8_lossy(&output.stdout)
            .lines()
            .chain(String::from_utf8_lossy(&output.stderr).lines())
            .map(str::trim_end)
            .filter(|line| !line.trim().is_empty())
            .map(str::to_string)
            .take(MAX_ISSUES)
            .collect();

        if issues.is_empty() {
            issues.push(format!("linter exited with {}", output.status));
        }
        LintReport::fail(issues)
    }
}
