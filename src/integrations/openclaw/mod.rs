//! OpenClaw integration
//!
//! Lists live sessions through the `openclaw` CLI:
//! - `openclaw sessions list --json` for keys, display names, timestamps,
//!   token counts and message history

pub mod client;
pub mod state;
pub mod status;

pub use client::{OpenClawCli, SessionSource, SourceError};

/// Get the OpenClaw CLI binary (respects $OPENCLAW_BIN)
pub fn program() -> String {
    std::env::var("OPENCLAW_BIN").unwrap_or_else(|_| client::DEFAULT_PROGRAM.to_string())
}
