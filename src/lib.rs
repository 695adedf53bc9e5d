//! inofs: In-Memory Inode Filesystem Simulator
//!
//! A hierarchical filesystem simulated entirely in memory, driven by a
//! line-oriented shell and persisted to a single binary snapshot file
//! between sessions.

pub mod config;
pub mod error;
pub mod logging;
pub mod session;
pub mod shell;
pub mod store;
pub mod types;
