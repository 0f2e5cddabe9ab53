//! Per-agent correlation and summarization
//!
//! ```text
//! AgentConfig ──┐
//!               ├── match_session ──► Session ──► extract_task ──► task string
//! Vec<Session> ─┘
//! ```
//!
//! Both steps are pure and stateless; the snapshot builder calls them once
//! per configured agent on every poll.

pub mod matcher;
pub mod task;

pub use matcher::match_session;
pub use task::extract_task;
