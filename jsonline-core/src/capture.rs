//! Run a tool and keep what it printed.
//!
//! A non-zero exit is not an error here: tools in this family report failures
//! as an inline JSON payload, so the caller inspects both the status and the
//! extracted line.

use crate::error::{Error, Result};
use crate::json_extract::extract_inline_json;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamPreference {
    #[default]
    Stdout,
    Stderr,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
        }
    }

    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedOutput {
    pub status: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CapturedOutput {
    pub fn success(&self) -> bool {
        self.status == Some(0)
    }

    /// Inline JSON from the preferred stream, falling back to the other one.
    pub fn inline_json(&self, prefer: StreamPreference) -> Option<&str> {
        let (first, second) = match prefer {
            StreamPreference::Stdout => (&self.stdout, &self.stderr),
            StreamPreference::Stderr => (&self.stderr, &self.stdout),
        };
        extract_inline_json(first).or_else(|| extract_inline_json(second))
    }
}

pub async fn capture(spec: &CommandSpec, timeout: Duration) -> Result<CapturedOutput> {
    let mut cmd = tokio::process::Command::new(&spec.program);
    cmd.args(&spec.args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    if let Some(cwd) = &spec.cwd {
        cmd.current_dir(cwd);
    }

    tracing::debug!(program = %spec.program, args = ?spec.args, "spawning");
    let child = cmd.spawn().map_err(|e| Error::Spawn {
        program: spec.program.clone(),
        source: e,
    })?;

    let out = match tokio::time::timeout(timeout, child.wait_with_output()).await {
        Ok(res) => res?,
        Err(_) => {
            let timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
            tracing::warn!(program = %spec.program, timeout_ms, "capture timed out");
            return Err(Error::Timeout {
                program: spec.program.clone(),
                timeout_ms,
            });
        }
    };

    let captured = CapturedOutput {
        status: out.status.code(),
        stdout: String::from_utf8_lossy(&out.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&out.stderr).into_owned(),
    };
    tracing::debug!(
        program = %spec.program,
        status = ?captured.status,
        stdout_len = captured.stdout.len(),
        stderr_len = captured.stderr.len(),
        "captured"
    );
    Ok(captured)
}
