//! External tool detection for l.
//!
//! Handlers ask a [ToolProbe] whether a tool exists before running it.
//! The real implementation, [SystemProbe], resolves names with the which crate and caches
//! every answer for the rest of the process, so each tool is looked up at most once.
//!
//! [FixedProbe] and [MaskedProbe] let tests and diagnostics pretend tools are missing.

use once_cell::sync::Lazy;

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

/// Process wide cache of tool lookups. Write once per name, never invalidated.
static TOOL_CACHE: Lazy<Mutex<HashMap<String, bool>>> = Lazy::new(|| Mutex::new(HashMap::new()));

/// Answers whether a named external tool can be executed.
pub trait ToolProbe {
    fn has(&self, tool: &str) -> bool;
}

/// Looks tools up on `PATH`, memoized for the process lifetime.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemProbe;

impl ToolProbe for SystemProbe {
    fn has(&self, tool: &str) -> bool {
        command_exists(tool)
    }
}

/// Probe with an explicit allowlist. Anything not listed is reported missing.
#[derive(Debug, Default, Clone)]
pub struct FixedProbe {
    available: HashSet<String>,
}

impl FixedProbe {
    pub fn new<I, S>(tools: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            available: tools.into_iter().map(Into::into).collect(),
        }
    }

    /// No tool is available at all.
    pub fn none() -> Self {
        Self::default()
    }
}

impl ToolProbe for FixedProbe {
    fn has(&self, tool: &str) -> bool {
        self.available.contains(tool)
    }
}

/// The system probe with some tools hidden.
#[derive(Debug, Default, Clone)]
pub struct MaskedProbe {
    hidden: HashSet<String>,
}

impl MaskedProbe {
    pub fn hiding<I, S>(tools: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            hidden: tools.into_iter().map(Into::into).collect(),
        }
    }
}

impl ToolProbe for MaskedProbe {
    fn has(&self, tool: &str) -> bool {
        !self.hidden.contains(tool) && command_exists(tool)
    }
}

/// Checks `PATH` for `tool`, consulting and filling the process wide cache.
pub fn command_exists(tool: &str) -> bool {
    // a poisoned lock only means another lookup panicked, the map itself is still valid
    let mut cache = match TOOL_CACHE.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    };
    if let Some(&known) = cache.get(tool) {
        return known;
    }
    let found = which::which(tool).is_ok();
    tracing::debug!(tool, found, "probed external tool");
    cache.insert(tool.to_owned(), found);
    found
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_is_idempotent() {
        let first = command_exists("sh");
        let second = command_exists("sh");
        assert_eq!(first, second);
    }

    #[test]
    fn test_unknown_tool_is_missing() {
        assert!(!SystemProbe.has("l-command-no-such-tool-7f3a"));
        // answered from the cache this time
        assert!(!SystemProbe.has("l-command-no-such-tool-7f3a"));
    }

    #[test]
    fn test_fixed_probe() {
        let probe = FixedProbe::new(["cat", "less"]);
        assert!(probe.has("cat"));
        assert!(probe.has("less"));
        assert!(!probe.has("jq"));
        assert!(!FixedProbe::none().has("cat"));
    }

    #[test]
    fn test_masked_probe_hides_tools() {
        let probe = MaskedProbe::hiding(["sh"]);
        assert!(!probe.has("sh"));
        assert_eq!(probe.has("cat"), SystemProbe.has("cat"));
    }
}
