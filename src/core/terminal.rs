//! Terminal size detection for l.
//!
//! Decides whether output fits on screen and can be printed directly, or has to go
//! through the pager. Without a terminal on stdout (output redirected or piped) the height
//! is treated as infinite and everything is printed directly.

use crossterm::tty::IsTty;

use std::io;

/// Where a piece of output should go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Direct,
    Paged,
}

/// Size of the controlling terminal, if stdout is one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TerminalSize {
    height: Option<usize>,
    width: Option<usize>,
    colors: bool,
}

impl TerminalSize {
    /// Queries the terminal attached to stdout.
    pub fn detect() -> Self {
        if !io::stdout().is_tty() {
            return Self::detached();
        }
        match crossterm::terminal::size() {
            Ok((cols, rows)) if rows > 0 => Self {
                height: Some(rows as usize),
                width: Some(cols as usize),
                colors: true,
            },
            // a terminal that reports no rows behaves like no terminal for paging
            _ => Self {
                colors: true,
                ..Self::detached()
            },
        }
    }

    /// No terminal: infinite height, no forced colors.
    pub fn detached() -> Self {
        Self {
            height: None,
            width: None,
            colors: false,
        }
    }

    /// A terminal with a fixed size.
    pub fn fixed(height: usize, width: usize) -> Self {
        Self {
            height: Some(height),
            width: Some(width),
            colors: true,
        }
    }

    #[inline]
    pub fn height(&self) -> Option<usize> {
        self.height
    }

    #[inline]
    pub fn width(&self) -> Option<usize> {
        self.width
    }

    /// True when stdout is a terminal and tools may be asked for colored output.
    #[inline]
    pub fn colors(&self) -> bool {
        self.colors
    }

    /// True when stdout is a terminal, even one that did not report its size.
    #[inline]
    pub fn attached(&self) -> bool {
        self.colors || self.height.is_some()
    }

    /// Content that fits the terminal height (or any content without a terminal) is
    /// printed directly, longer content goes through the pager.
    pub fn mode_for(&self, lines: usize) -> OutputMode {
        match self.height {
            Some(height) if lines > height => OutputMode::Paged,
            _ => OutputMode::Direct,
        }
    }
}
