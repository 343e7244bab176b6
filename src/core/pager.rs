//! Presenting captured output.
//!
//! Output that fits the terminal is written straight to stdout. Anything longer goes through
//! `less -R` so color escapes survive. Without a terminal on stdout everything is written
//! directly.

use crate::core::probe::ToolProbe;
use crate::core::proc::{self, Invocation, TimeoutClass, ToolError};
use crate::core::sniff::count_lines;
use crate::core::terminal::{OutputMode, TerminalSize};

use std::io::{self, Write};

/// The paging tool.
pub const PAGER: &str = "less";

/// Pager reading captured output from its stdin, keeping color escapes.
pub fn pipe_pager() -> Invocation {
    Invocation::new(PAGER, TimeoutClass::Rendering).arg("-R")
}

/// Pager opened on a file. Quits right away when the file fits one screen.
pub fn file_pager(path: &std::path::Path) -> Invocation {
    Invocation::new(PAGER, TimeoutClass::Rendering)
        .arg("-RFX")
        .arg(path)
}

/// Shows `output` directly or through the pager, depending on its line count.
pub fn present(
    output: &[u8],
    terminal: &TerminalSize,
    probe: &dyn ToolProbe,
) -> Result<i32, ToolError> {
    match terminal.mode_for(count_lines(output)) {
        OutputMode::Paged if probe.has(PAGER) => proc::page(output, &pipe_pager()),
        _ => write_direct(output)
            .map(|_| 0)
            .map_err(|source| ToolError::Io {
                tool: "stdout".to_string(),
                source,
            }),
    }
}

/// Prints a short notice such as `(Empty JSON file)`.
pub fn notice(text: &str) -> Result<i32, ToolError> {
    write_direct(format!("{}\n", text).as_bytes())
        .map(|_| 0)
        .map_err(|source| ToolError::Io {
            tool: "stdout".to_string(),
            source,
        })
}

/// Writes to stdout. A closed reader (`l file | head`) is not an error.
fn write_direct(bytes: &[u8]) -> io::Result<()> {
    let mut out = io::stdout().lock();
    match out.write_all(bytes).and_then(|_| out.flush()) {
        Err(e) if e.kind() == io::ErrorKind::BrokenPipe => Ok(()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::probe::FixedProbe;

    #[test]
    fn test_pager_argv() {
        let argv = file_pager(std::path::Path::new("a b.txt")).argv();
        assert_eq!(argv, ["less", "-RFX", "a b.txt"]);
        assert_eq!(pipe_pager().argv(), ["less", "-R"]);
    }

    #[test]
    fn test_short_output_is_written_directly() {
        let term = TerminalSize::fixed(10, 80);
        // no pager available, must still succeed
        let code = present(b"one\ntwo\n", &term, &FixedProbe::none());
        assert_eq!(code.ok(), Some(0));
    }

    #[test]
    fn test_long_output_without_pager_is_direct() {
        let term = TerminalSize::fixed(1, 80);
        let code = present(b"one\ntwo\nthree\n", &term, &FixedProbe::none());
        assert_eq!(code.ok(), Some(0));
    }
}
