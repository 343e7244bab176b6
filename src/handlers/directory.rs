//! Directory listing.
//!
//! Lists with `ls -la`. A listing taller than the terminal is captured with forced colors and
//! paged, a short one goes straight to the terminal.

use crate::core::pager::{self, PAGER};
use crate::core::proc::{self, Invocation, TimeoutClass};
use crate::core::{OutputMode, PathSubject};
use crate::handlers::{Context, HandleError, require};

use std::fs;

/// `ls -la` prints a `total` line plus `.` and `..` on top of the entries.
const LISTING_EXTRA_LINES: usize = 3;

pub(crate) fn can_handle(subject: &PathSubject) -> bool {
    subject.is_dir()
}

pub(crate) fn handle(subject: &PathSubject, ctx: &Context) -> Result<i32, HandleError> {
    require(ctx, "ls")?;

    let entries = fs::read_dir(subject.path())
        .map_err(HandleError::Unreadable)?
        .count();

    let paged = ctx.terminal().mode_for(entries + LISTING_EXTRA_LINES) == OutputMode::Paged;
    if paged && ctx.has(PAGER) {
        let out = proc::capture(&listing(subject, "--color=always"), ctx.timeouts())?;
        return Ok(proc::page(&out.stdout, &pager::pipe_pager())?);
    }

    Ok(proc::forward(&listing(subject, "--color=auto"), ctx.timeouts())?)
}

fn listing(subject: &PathSubject, color: &str) -> Invocation {
    Invocation::new("ls", TimeoutClass::Rendering)
        .args(["-la", color])
        .arg(subject.path())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{FixedProbe, TerminalSize};

    use std::error;
    use tempfile::tempdir;

    #[test]
    fn test_claims_directories_only() -> Result<(), Box<dyn error::Error>> {
        let dir = tempdir()?;
        let file = dir.path().join("f.txt");
        fs::write(&file, "x")?;
        assert!(can_handle(&PathSubject::new(dir.path())));
        assert!(!can_handle(&PathSubject::new(&file)));
        Ok(())
    }

    #[test]
    fn test_listing_argv() {
        let subject = PathSubject::new("/tmp");
        let argv = listing(&subject, "--color=auto").argv();
        assert_eq!(argv, ["ls", "-la", "--color=auto", "/tmp"]);
    }

    #[test]
    fn test_missing_ls_is_an_error() -> Result<(), Box<dyn error::Error>> {
        let dir = tempdir()?;
        let ctx = Context::new(TerminalSize::detached()).with_probe(FixedProbe::none());
        let err = handle(&PathSubject::new(dir.path()), &ctx).unwrap_err();
        assert_eq!(err.exit_code(), 127);
        Ok(())
    }
}
