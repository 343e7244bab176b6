//! Miscellaneous utility functions for l.
//!
//! This module holds:
//! - [cli]: argument parsing, version and help text
//! - [logging]: tracing subscriber setup
//! - [helpers]: path suffix matching, stderr truncation and small formatters

pub mod cli;
pub mod helpers;
pub mod logging;

pub use helpers::{format_clock, get_home, has_any_suffix, truncate_lossy};
