//! Cao - a terminal chat companion for OpenAI-compatible and local models.
//!
//! This library exposes the core modules for testing and reuse.

pub mod cli;
pub mod config;
pub mod llm;
pub mod logging;
pub mod message;
pub mod persona;
pub mod session;
pub mod ui;
