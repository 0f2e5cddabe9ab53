//! OpenClaw CLI session source
//!
//! Runs `openclaw sessions list --json` with a bounded timeout. Any failure
//! is logged and collapses to an empty session list so a poll always completes.

use super::state::parse_sessions;
use crate::data::Session;
use async_trait::async_trait;
use std::process::Stdio;
use std::time::Duration;
use thiserror::Error;

/// Default CLI binary name
pub const DEFAULT_PROGRAM: &str = "openclaw";

/// Default bound on a single listing call
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Why a session listing produced nothing usable
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} timed out after {}s", .timeout.as_secs())]
    Timeout { program: String, timeout: Duration },

    #[error("{program} exited with {status}: {stderr}")]
    Exit {
        program: String,
        status: std::process::ExitStatus,
        stderr: String,
    },

    #[error("could not decode session list: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Anything that can list the live sessions for one poll.
#[async_trait]
pub trait SessionSource: Send + Sync {
    /// Current sessions, or an empty list if the provider is unavailable
    async fn list_sessions(&self) -> Vec<Session>;
}

/// Session source backed by the `openclaw` CLI
#[derive(Debug, Clone)]
pub struct OpenClawCli {
    program: String,
    timeout: Duration,
}

impl Default for OpenClawCli {
    fn default() -> Self {
        Self::new(DEFAULT_PROGRAM)
    }
}

impl OpenClawCli {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Run the listing once, surfacing the failure class.
    pub async fn fetch(&self) -> Result<Vec<Session>, SourceError> {
        let child = tokio::process::Command::new(&self.program)
            .args(["sessions", "list", "--json"])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| SourceError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        let output = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(result) => result.map_err(|source| SourceError::Spawn {
                program: self.program.clone(),
                source,
            })?,
            Err(_) => {
                return Err(SourceError::Timeout {
                    program: self.program.clone(),
                    timeout: self.timeout,
                })
            }
        };

        let stdout = String::from_utf8_lossy(&output.stdout);

        // Some CLI versions print valid JSON and still exit non-zero
        match parse_sessions(&stdout) {
            Ok(sessions) => Ok(sessions),
            Err(_) if !output.status.success() => Err(SourceError::Exit {
                program: self.program.clone(),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            }),
            Err(e) => Err(SourceError::Decode(e)),
        }
    }
}

#[async_trait]
impl SessionSource for OpenClawCli {
    async fn list_sessions(&self) -> Vec<Session> {
        match self.fetch().await {
            Ok(sessions) => {
                tracing::debug!("{} returned {} sessions", self.program, sessions.len());
                sessions
            }
            Err(e) => {
                tracing::warn!("Could not get sessions: {}", e);
                Vec::new()
            }
        }
    }
}
