//! Agent-to-session correlation
//!
//! Pure lookup: an agent claims the first session whose `key|displayName`
//! contains its `sessionMatch` pattern. Source order breaks ties.

use crate::data::{AgentConfig, Session};

/// Separator between session key and display name in the match haystack
const HAYSTACK_SEPARATOR: char = '|';

/// Find the session belonging to `agent`, if any.
///
/// Agents without a pattern never match. Matching is case-sensitive.
pub fn match_session<'a>(agent: &AgentConfig, sessions: &'a [Session]) -> Option<&'a Session> {
    let pattern = agent.session_match.as_deref().filter(|p| !p.is_empty())?;

    sessions.iter().find(|s| {
        let haystack = format!("{}{}{}", s.key, HAYSTACK_SEPARATOR, s.display_name);
        haystack.contains(pattern)
    })
}
