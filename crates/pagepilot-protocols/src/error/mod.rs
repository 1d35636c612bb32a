//! Error types for the PagePilot protocol layer.

mod action;
mod tool;

pub use action::*;
pub use tool::*;
