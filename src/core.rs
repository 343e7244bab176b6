//! Core engine pieces of l.
//!
//! Everything the handlers build on, leaves first:
//! - [limits]: size ceilings, sniff length and timeout bounds.
//! - [sniff]: bounded prefix reads and content heuristics.
//! - [probe]: memoized lookup of external tools on `PATH`.
//! - [terminal]: terminal height and the direct/paged decision.
//! - [subject]: the path (or stdin) being viewed, with cached facts.
//! - [proc]: timeout bounded execution of external tools.
//! - [pager]: presenting captured output directly or through `less`.

pub mod limits;
pub mod pager;
pub mod probe;
pub mod proc;
pub mod sniff;
pub mod subject;
pub mod terminal;

pub use probe::{FixedProbe, MaskedProbe, SystemProbe, ToolProbe};
pub use proc::{Captured, Invocation, TimeoutClass, Timeouts, ToolError};
pub use subject::{PathSubject, Subject};
pub use terminal::{OutputMode, TerminalSize};
