//! File handlers for l.
//!
//! A handler is one content category: a cheap predicate deciding whether it claims a path,
//! and an action showing that path with an external tool. The set is closed, every handler
//! is a variant of [HandlerKind] and lives in its own submodule.
//!
//! The [Registry] orders the enabled handlers by priority, highest first. Equal priorities
//! keep registration order, which is how PDF wins over Binary at 60.
//!
//! A failing action never ends the program on its own: [run] logs the failure and shows the
//! file with the Default handler instead. Only Default and Directory report their own errors.

pub mod archive;
pub mod binary;
pub mod csv;
pub mod default;
pub mod directory;
pub mod image;
pub mod json;
pub mod markdown;
pub mod media;
pub mod pdf;
pub mod xml;
pub mod yaml;

use crate::config::{Config, HandlerConfig};
use crate::core::pager;
use crate::core::proc::{self, Invocation, Timeouts, ToolError};
use crate::core::{PathSubject, SystemProbe, TerminalSize, ToolProbe};

use thiserror::Error;

use std::collections::BTreeMap;
use std::fmt;
use std::io;

/// Every handler, in registration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandlerKind {
    Directory,
    Archive,
    Image,
    Pdf,
    Binary,
    Media,
    Json,
    Xml,
    Csv,
    Markdown,
    Yaml,
    Default,
}

impl HandlerKind {
    /// All variants in registration order. The index is the tie-break between equal priorities.
    pub const ALL: [HandlerKind; 12] = [
        HandlerKind::Directory,
        HandlerKind::Archive,
        HandlerKind::Image,
        HandlerKind::Pdf,
        HandlerKind::Binary,
        HandlerKind::Media,
        HandlerKind::Json,
        HandlerKind::Xml,
        HandlerKind::Csv,
        HandlerKind::Markdown,
        HandlerKind::Yaml,
        HandlerKind::Default,
    ];

    /// Stable name, as used in the config file.
    pub fn name(self) -> &'static str {
        match self {
            HandlerKind::Directory => "directory",
            HandlerKind::Archive => "archive",
            HandlerKind::Image => "image",
            HandlerKind::Pdf => "pdf",
            HandlerKind::Binary => "binary",
            HandlerKind::Media => "media",
            HandlerKind::Json => "json",
            HandlerKind::Xml => "xml",
            HandlerKind::Csv => "csv",
            HandlerKind::Markdown => "markdown",
            HandlerKind::Yaml => "yaml",
            HandlerKind::Default => "default",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    pub fn default_priority(self) -> i32 {
        match self {
            HandlerKind::Directory => 100,
            HandlerKind::Archive => 80,
            HandlerKind::Image => 65,
            HandlerKind::Pdf => 60,
            HandlerKind::Binary => 60,
            HandlerKind::Media => 55,
            HandlerKind::Json => 50,
            HandlerKind::Xml => 45,
            HandlerKind::Csv => 40,
            HandlerKind::Markdown => 35,
            HandlerKind::Yaml => 30,
            HandlerKind::Default => 0,
        }
    }

    /// Directory and Default can never be switched off: together they cover every
    /// existing directory and regular file.
    pub fn required(self) -> bool {
        matches!(self, HandlerKind::Directory | HandlerKind::Default)
    }

    /// Whether a failed action is retried with the Default handler.
    fn falls_back(self) -> bool {
        !self.required()
    }

    /// Does this handler claim the path? Never fails, unreadable paths are not claimed.
    pub fn can_handle(self, subject: &PathSubject, ctx: &Context) -> bool {
        match self {
            HandlerKind::Directory => directory::can_handle(subject),
            HandlerKind::Archive => archive::can_handle(subject),
            HandlerKind::Image => image::can_handle(subject),
            HandlerKind::Pdf => pdf::can_handle(subject),
            HandlerKind::Binary => binary::can_handle(subject, ctx),
            HandlerKind::Media => media::can_handle(subject),
            HandlerKind::Json => json::can_handle(subject),
            HandlerKind::Xml => xml::can_handle(subject),
            HandlerKind::Csv => csv::can_handle(subject),
            HandlerKind::Markdown => markdown::can_handle(subject),
            HandlerKind::Yaml => yaml::can_handle(subject),
            HandlerKind::Default => default::can_handle(subject),
        }
    }

    /// Shows the path. Returns the exit code on success.
    pub fn handle(self, subject: &PathSubject, ctx: &Context) -> Result<i32, HandleError> {
        match self {
            HandlerKind::Directory => directory::handle(subject, ctx),
            HandlerKind::Archive => archive::handle(subject, ctx),
            HandlerKind::Image => image::handle(subject, ctx),
            HandlerKind::Pdf => pdf::handle(subject, ctx),
            HandlerKind::Binary => binary::handle(subject, ctx),
            HandlerKind::Media => media::handle(subject, ctx),
            HandlerKind::Json => json::handle(subject, ctx),
            HandlerKind::Xml => xml::handle(subject, ctx),
            HandlerKind::Csv => csv::handle(subject, ctx),
            HandlerKind::Markdown => markdown::handle(subject, ctx),
            HandlerKind::Yaml => yaml::handle(subject, ctx),
            HandlerKind::Default => default::handle(subject, ctx),
        }
    }
}

impl fmt::Display for HandlerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Why a handler could not show a path.
#[derive(Debug, Error)]
pub enum HandleError {
    #[error(transparent)]
    Tool(#[from] ToolError),

    #[error("file too large ({size} bytes, limit {limit} bytes)")]
    TooLarge { size: u64, limit: u64 },

    #[error("content does not match the {expected} signature")]
    Signature { expected: &'static str },

    #[error("cannot read path")]
    Unreadable(#[source] io::Error),

    #[error("no renderer available")]
    NoRenderer,
}

impl HandleError {
    /// Exit code when this error ends the program.
    pub fn exit_code(&self) -> i32 {
        match self {
            HandleError::Tool(e) => e.exit_code(),
            _ => 1,
        }
    }
}

/// Read-only state shared by all handlers during one run.
pub struct Context {
    probe: Box<dyn ToolProbe>,
    terminal: TerminalSize,
    timeouts: Timeouts,
    handlers: BTreeMap<String, HandlerConfig>,
}

impl Context {
    /// The real environment: tools on `PATH`, the attached terminal and `config`'s options.
    pub fn detect(config: &Config) -> Self {
        Self::new(TerminalSize::detect()).with_config(config)
    }

    /// System probe and default timeouts with the given terminal.
    pub fn new(terminal: TerminalSize) -> Self {
        Context {
            probe: Box::new(SystemProbe),
            terminal,
            timeouts: Timeouts::default(),
            handlers: BTreeMap::new(),
        }
    }

    pub fn with_probe(mut self, probe: impl ToolProbe + 'static) -> Self {
        self.probe = Box::new(probe);
        self
    }

    pub fn with_terminal(mut self, terminal: TerminalSize) -> Self {
        self.terminal = terminal;
        self
    }

    pub fn with_timeouts(mut self, timeouts: Timeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    /// Takes the timeout bounds and handler options from `config`.
    pub fn with_config(mut self, config: &Config) -> Self {
        self.timeouts = *config.timeouts();
        self.handlers = config.handlers().clone();
        self
    }

    // Getters

    #[inline]
    pub fn probe(&self) -> &dyn ToolProbe {
        self.probe.as_ref()
    }

    #[inline]
    pub fn has(&self, tool: &str) -> bool {
        self.probe.has(tool)
    }

    #[inline]
    pub fn terminal(&self) -> &TerminalSize {
        &self.terminal
    }

    #[inline]
    pub fn timeouts(&self) -> &Timeouts {
        &self.timeouts
    }

    /// Free-form options of a handler from the config file.
    pub fn string_option(&self, kind: HandlerKind, key: &str) -> Vec<String> {
        self.handlers
            .get(kind.name())
            .map(|config| config.string_list(key))
            .unwrap_or_default()
    }
}

/// A handler with its effective priority and registration index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Entry {
    pub kind: HandlerKind,
    pub priority: i32,
    pub order: usize,
}

/// The enabled handlers, highest priority first.
#[derive(Debug, Clone)]
pub struct Registry {
    entries: Vec<Entry>,
}

impl Registry {
    /// Every handler with its built-in priority.
    pub fn builtin() -> Self {
        Self::from_config(&Config::default())
    }

    /// Applies `enabled` and `priority` from the config file.
    ///
    /// Disabled handlers are left out entirely, so their content checks never run.
    pub fn from_config(config: &Config) -> Self {
        for name in config.handlers().keys() {
            if HandlerKind::from_name(name).is_none() {
                tracing::warn!(handler = %name, "unknown handler in configuration, ignoring it");
            }
        }

        let mut entries = Vec::with_capacity(HandlerKind::ALL.len());
        for (order, kind) in HandlerKind::ALL.into_iter().enumerate() {
            let settings = config.handler(kind.name());

            if settings.is_some_and(|s| !s.enabled()) {
                if kind.required() {
                    tracing::warn!(handler = kind.name(), "this handler cannot be disabled");
                } else {
                    tracing::debug!(handler = kind.name(), "handler disabled by configuration");
                    continue;
                }
            }

            let priority = settings
                .and_then(HandlerConfig::priority)
                .unwrap_or_else(|| kind.default_priority());
            entries.push(Entry {
                kind,
                priority,
                order,
            });
        }

        entries.sort_by(|a, b| b.priority.cmp(&a.priority).then(a.order.cmp(&b.order)));
        Registry { entries }
    }

    #[inline]
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Handler kinds in evaluation order.
    pub fn kinds(&self) -> impl Iterator<Item = HandlerKind> + '_ {
        self.entries.iter().map(|e| e.kind)
    }

    /// The first handler claiming `subject`. Later predicates are not evaluated.
    pub fn select(&self, subject: &PathSubject, ctx: &Context) -> Option<HandlerKind> {
        self.kinds().find(|kind| kind.can_handle(subject, ctx))
    }
}

/// Runs `kind` on `subject`, falling back to the Default handler when it fails.
///
/// Returns the process exit code.
pub fn run(kind: HandlerKind, subject: &PathSubject, ctx: &Context) -> i32 {
    match kind.handle(subject, ctx) {
        Ok(code) => code,
        Err(e) if kind.falls_back() => {
            tracing::warn!(
                handler = kind.name(),
                path = %subject.path().display(),
                "{}, falling back to the default viewer",
                e
            );
            finish(HandlerKind::Default, subject, ctx)
        }
        Err(e) => report(kind, subject, &e),
    }
}

/// Helpers:
///
/// Runs a handler with no further fallback.
fn finish(kind: HandlerKind, subject: &PathSubject, ctx: &Context) -> i32 {
    match kind.handle(subject, ctx) {
        Ok(code) => code,
        Err(e) => report(kind, subject, &e),
    }
}

fn report(kind: HandlerKind, subject: &PathSubject, e: &HandleError) -> i32 {
    tracing::error!(
        handler = kind.name(),
        path = %subject.path().display(),
        "{}",
        e
    );
    e.exit_code()
}

/// Fails with [ToolError::Missing] when the probe cannot find `tool`.
pub(crate) fn require(ctx: &Context, tool: &str) -> Result<(), HandleError> {
    if ctx.has(tool) {
        Ok(())
    } else {
        Err(ToolError::missing(tool).into())
    }
}

/// Refuses files above a handler's size ceiling.
pub(crate) fn check_size(subject: &PathSubject, limit: u64) -> Result<(), HandleError> {
    let size = subject.size();
    if size > limit {
        return Err(HandleError::TooLarge { size, limit });
    }
    Ok(())
}

/// Captures a tool's output and shows it directly or paged.
pub(crate) fn capture_and_present(inv: &Invocation, ctx: &Context) -> Result<i32, HandleError> {
    tracing::debug!(command = %inv, "capturing");
    let out = proc::capture(inv, ctx.timeouts())?;
    Ok(pager::present(&out.stdout, ctx.terminal(), ctx.probe())?)
}

/// Prints a notice such as `(Empty JSON file)` instead of running a tool on an empty file.
pub(crate) fn empty_notice(label: &str) -> Result<i32, HandleError> {
    Ok(pager::notice(&format!("(Empty {} file)", label))?)
}
