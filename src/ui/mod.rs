//! Terminal output helpers.
//!
//! - Text measuring and wrapping
//! - Bordered and chat-style reply blocks
//! - The model table

pub mod render;
pub mod text;

pub use render::{print_bordered, print_reply};
