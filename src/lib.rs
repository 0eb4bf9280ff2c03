//! typespy - keystroke timing recorder
//!
//! Pairs key-down and key-up events into keystrokes and computes hold and
//! key pair latency statistics from them. Events come from a terminal UI or
//! from recorded JSON event logs.

pub mod analysis;
pub mod config;
pub mod keyboard;
pub mod report;
pub mod ui;
pub mod utils;

pub use config::Config;
