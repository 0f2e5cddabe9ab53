//! Snapshot assembly and the poll driver
//!
//! One poll = load config, list sessions, build a [`Snapshot`] against a
//! single `now`, write it out, print a summary line. Nothing carries over
//! between polls except the status file on disk.

pub mod writer;

use crate::agents::{extract_task, match_session};
use crate::config::{self, OfficeConfig};
use crate::data::{
    AgentConfig, AgentStatus, AgentStatusRecord, Session, Snapshot, NO_SESSION_AGE,
    NO_SESSION_TASK,
};
use crate::integrations::openclaw::status::{age_minutes, classify_age};
use crate::integrations::openclaw::SessionSource;
use anyhow::Result;
use chrono::{Local, Utc};
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::watch;

/// Interval used when `--loop` is given without a usable value
pub const DEFAULT_INTERVAL_SECS: u64 = 30;

/// Where a poll reads its config and writes its status file
#[derive(Debug, Clone)]
pub struct PollPaths {
    pub config: PathBuf,
    pub output: PathBuf,
}

impl Default for PollPaths {
    fn default() -> Self {
        Self {
            config: config::default_config_path(),
            output: config::default_status_path(),
        }
    }
}

/// Build the snapshot for one poll. Pure; every age is relative to `now_ms`.
pub fn build_snapshot(config: &OfficeConfig, sessions: &[Session], now_ms: i64) -> Snapshot {
    let agents = config
        .agents
        .iter()
        .map(|agent| match match_session(agent, sessions) {
            Some(session) => matched_record(agent, session, now_ms),
            None => unmatched_record(agent),
        })
        .collect();

    Snapshot {
        title: config.title.clone(),
        timestamp: now_ms,
        agents,
    }
}

fn matched_record(agent: &AgentConfig, session: &Session, now_ms: i64) -> AgentStatusRecord {
    let age_min = age_minutes(session.updated_at, now_ms);

    AgentStatusRecord {
        id: agent.id.clone(),
        name: agent.name.clone(),
        sprite: agent.sprite.clone(),
        role: agent.role.clone(),
        status: classify_age(age_min),
        task: extract_task(session),
        last_active: age_min,
        session: Some(session.key.clone()),
        tokens: session.total_tokens.unwrap_or(0),
    }
}

fn unmatched_record(agent: &AgentConfig) -> AgentStatusRecord {
    AgentStatusRecord {
        id: agent.id.clone(),
        name: agent.name.clone(),
        sprite: agent.sprite.clone(),
        role: agent.role.clone(),
        status: AgentStatus::Offline,
        task: NO_SESSION_TASK.to_string(),
        last_active: NO_SESSION_AGE,
        session: None,
        tokens: 0,
    }
}

/// `[HH:MM:SS] N/M agents active`
pub fn summary_line(snapshot: &Snapshot, clock_label: &str) -> String {
    format!(
        "[{}] {}/{} agents active",
        clock_label,
        snapshot.active_count(),
        snapshot.agents.len()
    )
}

/// Agents whose record differs from the previous snapshot (or are new).
pub fn changed_agents<'a>(previous: &Snapshot, current: &'a Snapshot) -> Vec<&'a str> {
    current
        .agents
        .iter()
        .filter(|record| {
            previous
                .agents
                .iter()
                .find(|p| p.id == record.id)
                .map_or(true, |p| p != *record)
        })
        .map(|record| record.id.as_str())
        .collect()
}

/// Run a single poll and write the status file.
///
/// Only a config failure is returned as an error; an unavailable session
/// source produces an all-offline snapshot.
pub async fn refresh(paths: &PollPaths, source: &dyn SessionSource) -> Result<Snapshot> {
    let config = config::load(&paths.config)?;
    let sessions = source.list_sessions().await;
    let now_ms = Utc::now().timestamp_millis();

    let snapshot = build_snapshot(&config, &sessions, now_ms);

    if let Some(previous) = writer::read_snapshot(&paths.output) {
        let changed = changed_agents(&previous, &snapshot);
        if !changed.is_empty() {
            tracing::debug!("Status changed for: {}", changed.join(", "));
        }
    }

    writer::write_snapshot(&paths.output, &snapshot)?;

    println!(
        "{}",
        summary_line(&snapshot, &Local::now().format("%H:%M:%S").to_string())
    );

    Ok(snapshot)
}

/// Parse a `--loop` value, falling back to the default when malformed.
pub fn parse_interval(raw: Option<&str>) -> Duration {
    let secs = match raw.map(str::trim) {
        Some(value) => value.parse::<u64>().unwrap_or_else(|_| {
            tracing::warn!(
                "Invalid loop interval {:?}, using {}s",
                value,
                DEFAULT_INTERVAL_SECS
            );
            DEFAULT_INTERVAL_SECS
        }),
        None => DEFAULT_INTERVAL_SECS,
    };
    Duration::from_secs(secs)
}

/// Poll on `interval` until `shutdown` flips to true.
///
/// Shutdown is only observed between polls; a poll in flight always finishes.
pub async fn run_loop(
    paths: &PollPaths,
    source: &dyn SessionSource,
    interval: Duration,
    mut shutdown: watch::Receiver<bool>,
) -> Result<()> {
    println!(
        "Refreshing every {}s. Press Ctrl+C to stop.",
        interval.as_secs()
    );

    loop {
        refresh(paths, source).await?;

        if *shutdown.borrow() {
            break;
        }

        tokio::select! {
            _ = tokio::time::sleep(interval) => {}
            changed = shutdown.changed() => {
                // A dropped sender also means nobody can stop us later
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
            }
        }
    }

    tracing::info!("Stopped refreshing");
    Ok(())
}
