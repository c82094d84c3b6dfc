//! Library wrapper around the `state-scan` CLI implementation.
//!
//! The CLI is primarily exercised via its binary (`src/main.rs`), but test
//! harnesses typecheck the crate with `cargo test --lib`. Compiling the
//! binary crate root as a module keeps that workflow working and lets the
//! integration tests drive the discovery and rendering helpers directly.
//!
//! Note: `fn main()` inside `main.rs` is just another function when
//! compiled as a module.

#[allow(dead_code)]
#[path = "main.rs"]
mod main_bin;

pub use main_bin::{output, project};
