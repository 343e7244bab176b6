//! Internal library crate for l.
//!
//! The shipped application is the `l` binary (`src/main.rs`).
//!
//! This library exists to share code between targets (binary, tests) and to keep modules organized.
//! This API is only used to build the `l` binary and is not considered a library for external use.

pub mod config;
pub mod core;
pub mod dispatch;
pub mod handlers;
pub mod utils;
