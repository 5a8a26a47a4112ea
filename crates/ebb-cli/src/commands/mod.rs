//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `core` - Shared utilities (config, ledger loading, sinks, publishing)
//! - `stats` - Category statistics command
//! - `balances` - Account balances command
//! - `earmarks` - Earmarked savings transfers command
//! - `weights` - Decay weight table command
//! - `config` - Effective configuration command

pub mod balances;
pub mod config;
pub mod core;
pub mod earmarks;
pub mod stats;
pub mod weights;

// Re-export command functions for main.rs
pub use balances::*;
pub use config::*;
pub use core::*;
pub use earmarks::*;
pub use stats::*;
pub use weights::*;

/// Truncate a string to a maximum length, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
