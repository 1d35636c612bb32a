//! Common types used across PagePilot crates.

mod common;

pub use common::*;
