//! Command-line front-end for the patient registry.
//!
//! The binary in `main.rs` parses [`args::Args`], opens a collection and
//! dispatches to the core view-models. Everything that can be tested without
//! a terminal lives here.

pub mod args;
pub mod browse;
pub mod render;
pub mod seed;

pub use args::*;
pub use browse::*;
pub use render::*;
pub use seed::*;
