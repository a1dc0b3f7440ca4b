//! Persistence modules.

pub mod config;
