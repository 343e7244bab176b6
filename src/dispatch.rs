//! Entry point of a single view.
//!
//! [dispatch] takes the [Subject], checks the path exists, asks the registry for the first
//! handler that claims it and runs exactly that handler (plus at most one Default fallback).
//! Standard input is passed straight to the pager.

use crate::core::pager::{self, PAGER};
use crate::core::proc::{self, Invocation, TimeoutClass};
use crate::core::{PathSubject, Subject};
use crate::handlers::{self, Context, Registry};

/// Exit code for a path that does not exist or that no handler accepts.
pub const EXIT_NOT_FOUND: i32 = 1;

/// Shows `subject` and returns the process exit code.
pub fn dispatch(subject: &Subject, registry: &Registry, ctx: &Context) -> i32 {
    match subject {
        Subject::Stdin => view_stdin(ctx),
        Subject::Path(path) => view_path(path, registry, ctx),
    }
}

/// Shows a filesystem path. Nothing is spawned for a path that does not exist.
pub fn view_path(subject: &PathSubject, registry: &Registry, ctx: &Context) -> i32 {
    if !subject.exists() {
        eprintln!("Error: Path not found: {}", subject.path().display());
        return EXIT_NOT_FOUND;
    }

    let Some(kind) = registry.select(subject, ctx) else {
        eprintln!("Error: Unsupported path: {}", subject.path().display());
        return EXIT_NOT_FOUND;
    };

    tracing::debug!(handler = kind.name(), path = %subject.path().display(), "selected handler");
    handlers::run(kind, subject, ctx)
}

/// Piped input goes to `less -R` on a terminal and through `cat` otherwise.
///
/// Not time bounded, the writing end of the pipe may stay open for as long as it likes.
fn view_stdin(ctx: &Context) -> i32 {
    let inv = if ctx.terminal().attached() && ctx.has(PAGER) {
        pager::pipe_pager()
    } else {
        Invocation::new("cat", TimeoutClass::Rendering)
    };

    match proc::interactive(&inv) {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("{}", e);
            e.exit_code()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{FixedProbe, TerminalSize};

    use std::error;
    use tempfile::tempdir;

    #[test]
    fn test_missing_path_exits_one() -> Result<(), Box<dyn error::Error>> {
        let dir = tempdir()?;
        let subject = Subject::Path(PathSubject::new(dir.path().join("missing.json")));
        // no tool may be used at all
        let ctx = Context::new(TerminalSize::detached()).with_probe(FixedProbe::none());
        assert_eq!(dispatch(&subject, &Registry::builtin(), &ctx), EXIT_NOT_FOUND);
        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn test_fifo_is_unsupported() -> Result<(), Box<dyn error::Error>> {
        if which::which("mkfifo").is_err() {
            return Ok(());
        }
        let dir = tempdir()?;
        let fifo = dir.path().join("pipe");
        let status = std::process::Command::new("mkfifo").arg(&fifo).status()?;
        if !status.success() {
            return Ok(());
        }
        let ctx = Context::new(TerminalSize::detached()).with_probe(FixedProbe::none());
        let code = view_path(&PathSubject::new(&fifo), &Registry::builtin(), &ctx);
        assert_eq!(code, EXIT_NOT_FOUND);
        Ok(())
    }
}
