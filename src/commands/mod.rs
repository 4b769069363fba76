//! CLI command implementations
//!
//! - `reset`   drops the cached username before startup
//! - `monitor` resolves the account and runs the refresh loop

pub mod monitor;
pub mod reset;
