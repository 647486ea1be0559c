//! Codex Runner - supervised Codex CLI runs with session capture.

pub mod cli;
pub mod config;
pub mod display;
pub mod supervisor;
