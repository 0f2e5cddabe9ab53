//! External session providers.

pub mod openclaw;
