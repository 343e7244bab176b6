//! The thing being viewed.
//!
//! A [Subject] is either standard input or a [PathSubject]. A path subject stats the path once
//! when it is created and lazily caches its content prefix and line count, so every handler
//! predicate sees the same bytes and repeated checks on an unchanged file agree.

use crate::core::sniff::{self, count_lines_in};
use crate::utils::has_any_suffix;

use once_cell::unsync::OnceCell;

use std::fs::{self, File, Metadata};
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// Input of a single dispatch.
#[derive(Debug)]
pub enum Subject {
    /// No path given and stdin is not a terminal: view what is piped in.
    Stdin,
    Path(PathSubject),
}

impl Subject {
    /// Picks the subject from the optional CLI path.
    ///
    /// Without a path, piped stdin wins; on a terminal the current directory is shown.
    pub fn resolve(arg: Option<String>, stdin_is_tty: bool) -> Self {
        match arg {
            Some(path) => Subject::Path(PathSubject::new(path)),
            None if !stdin_is_tty => Subject::Stdin,
            None => Subject::Path(PathSubject::new(".")),
        }
    }
}

/// A filesystem path with cached facts about it.
#[derive(Debug)]
pub struct PathSubject {
    path: PathBuf,
    meta: Option<Metadata>,
    prefix: OnceCell<Vec<u8>>,
    lines: OnceCell<usize>,
}

impl PathSubject {
    /// Stats `path`, following symlinks. A dangling link counts as not existing.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let meta = fs::metadata(&path).ok();
        Self {
            path,
            meta,
            prefix: OnceCell::new(),
            lines: OnceCell::new(),
        }
    }

    #[inline]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[inline]
    pub fn exists(&self) -> bool {
        self.meta.is_some()
    }

    #[inline]
    pub fn is_dir(&self) -> bool {
        self.meta.as_ref().is_some_and(Metadata::is_dir)
    }

    #[inline]
    pub fn is_file(&self) -> bool {
        self.meta.as_ref().is_some_and(Metadata::is_file)
    }

    /// Size in bytes, zero for anything that is not a regular file.
    pub fn size(&self) -> u64 {
        match &self.meta {
            Some(meta) if meta.is_file() => meta.len(),
            _ => 0,
        }
    }

    /// Regular file with at least one byte.
    #[inline]
    pub fn is_nonempty_file(&self) -> bool {
        self.is_file() && self.size() > 0
    }

    /// Lowercased extension without the dot.
    pub fn ext_lower(&self) -> Option<String> {
        self.path
            .extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
    }

    /// True when the file name ends with any of `suffixes`, compared case-insensitively.
    /// Suffixes carry their leading dot and may be compound (`.tar.gz`).
    pub fn has_suffix(&self, suffixes: &[&str]) -> bool {
        has_any_suffix(&self.path, suffixes)
    }

    /// The first bytes of the file, read once. Empty for directories and unreadable files.
    pub fn prefix(&self) -> &[u8] {
        self.prefix.get_or_init(|| {
            if self.is_file() {
                sniff::sniff(&self.path)
            } else {
                Vec::new()
            }
        })
    }

    /// UTF-8 view of the prefix, see [sniff::prefix_text].
    pub fn prefix_text(&self) -> Option<&str> {
        sniff::prefix_text(self.prefix())
    }

    /// Number of lines in the whole file, counted once. Zero when it cannot be read.
    pub fn line_count(&self) -> usize {
        *self.lines.get_or_init(|| {
            if !self.is_file() {
                return 0;
            }
            File::open(&self.path)
                .and_then(|f| count_lines_in(BufReader::new(f)))
                .unwrap_or(0)
        })
    }
}
