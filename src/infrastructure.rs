//! Infrastructure layer
//!
//! Process-level concerns of the shell binary:
//! - Layered configuration
//! - CLI argument processing

pub mod cli;
pub mod config;
