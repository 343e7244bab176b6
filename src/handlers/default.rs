//! Plain text, the handler of last resort.
//!
//! Claims every regular file. Short files are copied to the terminal with `cat`, long ones
//! are opened in `less -RFX`. This handler never falls back any further: its own failure
//! becomes the exit code.

use crate::core::pager::{self, PAGER};
use crate::core::proc::{self, Invocation, TimeoutClass};
use crate::core::{OutputMode, PathSubject};
use crate::handlers::{Context, HandleError, require};

pub(crate) fn can_handle(subject: &PathSubject) -> bool {
    subject.is_file()
}

pub(crate) fn handle(subject: &PathSubject, ctx: &Context) -> Result<i32, HandleError> {
    let mode = ctx.terminal().mode_for(subject.line_count());
    if mode == OutputMode::Paged && ctx.has(PAGER) {
        return Ok(proc::interactive(&pager::file_pager(subject.path()))?);
    }

    require(ctx, "cat")?;
    let inv = Invocation::new("cat", TimeoutClass::Rendering).arg(subject.path());
    Ok(proc::forward(&inv, ctx.timeouts())?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{FixedProbe, TerminalSize};

    use std::error;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_claims_any_regular_file() -> Result<(), Box<dyn error::Error>> {
        let dir = tempdir()?;
        let path = dir.path().join("anything.bin");
        fs::write(&path, [0u8, 159, 146, 150])?;
        assert!(can_handle(&PathSubject::new(&path)));
        assert!(!can_handle(&PathSubject::new(dir.path())));
        Ok(())
    }

    #[test]
    fn test_without_cat() -> Result<(), Box<dyn error::Error>> {
        let dir = tempdir()?;
        let path = dir.path().join("a.txt");
        fs::write(&path, "a\n")?;
        let ctx = Context::new(TerminalSize::detached()).with_probe(FixedProbe::none());
        let err = handle(&PathSubject::new(&path), &ctx).unwrap_err();
        assert_eq!(err.exit_code(), 127);
        Ok(())
    }

    #[test]
    fn test_short_file_with_cat() -> Result<(), Box<dyn error::Error>> {
        if which::which("cat").is_err() {
            return Ok(());
        }
        let dir = tempdir()?;
        let path = dir.path().join("a.txt");
        fs::write(&path, "one\ntwo\nthree\nfour\n")?;
        let ctx = Context::new(TerminalSize::fixed(4, 80)).with_probe(FixedProbe::new(["cat"]));
        assert_eq!(handle(&PathSubject::new(&path), &ctx)?, 0);
        Ok(())
    }
}
