//! Test utilities and fixtures for office-status tests

#![allow(dead_code)]

use async_trait::async_trait;
use office_status::data::Session;
use office_status::integrations::openclaw::SessionSource;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Session source that returns a fixed list and counts calls
pub struct FakeSource {
    sessions: Vec<Session>,
    calls: AtomicUsize,
}

impl FakeSource {
    pub fn new(sessions: Vec<Session>) -> Self {
        Self {
            sessions,
            calls: AtomicUsize::new(0),
        }
    }

    /// Build from raw CLI JSON, the same shape `openclaw sessions list --json` prints
    pub fn from_json(json: &str) -> Self {
        Self::new(office_status::integrations::openclaw::state::parse_sessions(json).unwrap())
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SessionSource for FakeSource {
    async fn list_sessions(&self) -> Vec<Session> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.sessions.clone()
    }
}

pub fn write_config(dir: &Path, content: &str) -> PathBuf {
    let path = dir.join("config.json");
    fs::write(&path, content).unwrap();
    path
}

/// Write an executable shell script standing in for the openclaw CLI
#[cfg(unix)]
pub fn fake_cli(dir: &Path, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join("openclaw");
    fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
}
