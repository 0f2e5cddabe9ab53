//! OpenClaw session listing response parsing
//!
//! `openclaw sessions list --json` prints either a bare array or an object
//! wrapping the array under `sessions`.
//!
//! # Formats
//!
//! ```json
//! [{ "key": "agent:main:ann", "displayName": "Ann", "updatedAt": 1706745600000 }]
//! ```
//!
//! ```json
//! { "sessions": [{ "key": "agent:main:ann", "totalTokens": 4700 }] }
//! ```

use crate::data::Session;
use serde::Deserialize;

/// Top-level shape of the listing output, resolved once at the boundary.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum SessionsResponse {
    Wrapped {
        #[serde(default)]
        sessions: Vec<serde_json::Value>,
    },
    Bare(Vec<serde_json::Value>),
}

impl SessionsResponse {
    /// Decode each entry, skipping any that are not session-shaped.
    pub fn into_sessions(self) -> Vec<Session> {
        let entries = match self {
            Self::Wrapped { sessions } => sessions,
            Self::Bare(sessions) => sessions,
        };

        entries
            .into_iter()
            .enumerate()
            .filter_map(|(idx, entry)| match serde_json::from_value(entry) {
                Ok(session) => Some(session),
                Err(e) => {
                    tracing::debug!("Skipping malformed session entry {}: {}", idx, e);
                    None
                }
            })
            .collect()
    }
}

/// Parse raw CLI stdout into sessions.
pub fn parse_sessions(stdout: &str) -> serde_json::Result<Vec<Session>> {
    let response: SessionsResponse = serde_json::from_str(stdout)?;
    Ok(response.into_sessions())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bare_array() {
        let sessions = parse_sessions(r#"[{"key":"a"},{"key":"b"}]"#).unwrap();
        assert_eq!(sessions.len(), 2);
        assert_eq!(sessions[1].key, "b");
    }

    #[test]
    fn parses_wrapped_object() {
        let sessions = parse_sessions(r#"{"count":1,"sessions":[{"key":"a"}]}"#).unwrap();
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].key, "a");
    }

    #[test]
    fn wrapper_without_sessions_is_empty() {
        let sessions = parse_sessions(r#"{"ok":true}"#).unwrap();
        assert!(sessions.is_empty());
    }

    #[test]
    fn skips_entries_that_are_not_objects() {
        let sessions = parse_sessions(r#"[{"key":"a"}, 7, "junk", {"key":"b"}]"#).unwrap();
        let keys: Vec<_> = sessions.iter().map(|s| s.key.as_str()).collect();
        assert_eq!(keys, vec!["a", "b"]);
    }

    #[test]
    fn rejects_non_json() {
        assert!(parse_sessions("error: gateway not running").is_err());
    }

    #[test]
    fn rejects_scalar_json() {
        assert!(parse_sessions("42").is_err());
    }
}
