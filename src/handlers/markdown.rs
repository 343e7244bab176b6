//! Markdown, rendered by the first working renderer of `glow`, `mdcat` and `pandoc`.
//!
//! `glow` writes to the terminal itself and brings its own pager (`glow -p`) for long
//! documents. The other two are captured and presented like any formatter output.

use crate::core::limits::MAX_MARKDOWN_SIZE;
use crate::core::proc::{self, Invocation, TimeoutClass};
use crate::core::sniff::markdown_like;
use crate::core::{OutputMode, PathSubject};
use crate::handlers::{Context, HandleError, capture_and_present, check_size, empty_notice};

const MARKDOWN_SUFFIXES: &[&str] = &[".md", ".markdown", ".mdown", ".mkd", ".mdx"];

/// Renderers in order of preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Renderer {
    Glow,
    Mdcat,
    Pandoc,
}

impl Renderer {
    const ALL: [Renderer; 3] = [Renderer::Glow, Renderer::Mdcat, Renderer::Pandoc];

    fn tool(self) -> &'static str {
        match self {
            Renderer::Glow => "glow",
            Renderer::Mdcat => "mdcat",
            Renderer::Pandoc => "pandoc",
        }
    }

    /// The renderer's argv. Output wraps at the terminal width when one is known.
    fn command(self, subject: &PathSubject, ctx: &Context, paged: bool) -> Invocation {
        let width = ctx.terminal().width().map(|w| w.to_string());
        let inv = Invocation::new(self.tool(), TimeoutClass::Rendering);
        let inv = match (self, width) {
            (Renderer::Glow, Some(w)) => inv.arg("-w").arg(w),
            (Renderer::Mdcat, Some(w)) => inv.arg("--columns").arg(w),
            _ => inv,
        };
        let inv = match self {
            Renderer::Glow => inv.arg_if(paged, "-p"),
            Renderer::Mdcat => inv.arg_if(!ctx.terminal().colors(), "--no-colour"),
            Renderer::Pandoc => inv.args(["-t", "plain"]),
        };
        inv.arg(subject.path())
    }

    fn render(self, subject: &PathSubject, ctx: &Context) -> Result<i32, HandleError> {
        let paged = ctx.terminal().mode_for(subject.line_count()) == OutputMode::Paged;
        let inv = self.command(subject, ctx, paged);
        match self {
            // glow writes to the terminal itself
            Renderer::Glow if paged => Ok(proc::interactive(&inv)?),
            Renderer::Glow => Ok(proc::forward(&inv, ctx.timeouts())?),
            Renderer::Mdcat | Renderer::Pandoc => capture_and_present(&inv, ctx),
        }
    }
}

pub(crate) fn can_handle(subject: &PathSubject) -> bool {
    subject.is_file()
        && (subject.has_suffix(MARKDOWN_SUFFIXES)
            || subject.prefix_text().is_some_and(markdown_like))
}

pub(crate) fn handle(subject: &PathSubject, ctx: &Context) -> Result<i32, HandleError> {
    if subject.size() == 0 {
        return empty_notice("Markdown");
    }
    check_size(subject, MAX_MARKDOWN_SIZE)?;

    let mut last_error = None;
    for renderer in Renderer::ALL.into_iter().filter(|r| ctx.has(r.tool())) {
        match renderer.render(subject, ctx) {
            Ok(code) => return Ok(code),
            Err(e) => {
                tracing::warn!(renderer = renderer.tool(), "{}, trying the next renderer", e);
                last_error = Some(e);
            }
        }
    }
    Err(last_error.unwrap_or(HandleError::NoRenderer))
}
