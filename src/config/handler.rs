//! Per-handler settings for l.
//!
//! Every `[handlers.<name>]` table of the config file becomes a [HandlerConfig].
//! Parsing is lenient: a field with the wrong type is reported with a warning and keeps its
//! default, the rest of the table still applies.

use toml::{Table, Value};

/// Settings of a single handler.
#[derive(Debug, Clone, PartialEq)]
pub struct HandlerConfig {
    enabled: bool,
    priority: Option<i32>,
    options: Table,
}

impl Default for HandlerConfig {
    fn default() -> Self {
        HandlerConfig {
            enabled: true,
            priority: None,
            options: Table::new(),
        }
    }
}

impl HandlerConfig {
    pub fn new(enabled: bool, priority: Option<i32>) -> Self {
        HandlerConfig {
            enabled,
            priority,
            ..Self::default()
        }
    }

    pub fn with_options(mut self, options: Table) -> Self {
        self.options = options;
        self
    }

    /// Builds the settings from a raw `[handlers.<name>]` value.
    ///
    /// Returns `None` when the value is not a table at all.
    pub(crate) fn from_value(name: &str, value: &Value) -> Option<Self> {
        let Some(table) = value.as_table() else {
            tracing::warn!(
                handler = name,
                found = value.type_str(),
                "handler config must be a table, ignoring it"
            );
            return None;
        };

        let mut config = HandlerConfig::default();

        match table.get("enabled") {
            None => {}
            Some(Value::Boolean(enabled)) => config.enabled = *enabled,
            Some(other) => invalid_field(name, "enabled", "a boolean", other),
        }

        match table.get("priority") {
            None => {}
            Some(Value::Integer(p)) => match i32::try_from(*p) {
                Ok(p) => config.priority = Some(p),
                Err(_) => invalid_field(name, "priority", "a 32-bit integer", &Value::Integer(*p)),
            },
            Some(other) => invalid_field(name, "priority", "an integer", other),
        }

        match table.get("options") {
            None => {}
            Some(Value::Table(options)) => config.options = options.clone(),
            Some(other) => invalid_field(name, "options", "a table", other),
        }

        Some(config)
    }

    #[inline]
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// The configured priority, `None` keeps the built-in one.
    #[inline]
    pub fn priority(&self) -> Option<i32> {
        self.priority
    }

    #[inline]
    pub fn options(&self) -> &Table {
        &self.options
    }

    /// A string list option. Non-string items are skipped with a warning.
    pub fn string_list(&self, key: &str) -> Vec<String> {
        let Some(value) = self.options.get(key) else {
            return Vec::new();
        };
        let Some(items) = value.as_array() else {
            tracing::warn!(option = key, "option must be an array of strings, ignoring it");
            return Vec::new();
        };
        items
            .iter()
            .filter_map(|item| match item.as_str() {
                Some(s) => Some(s.to_string()),
                None => {
                    tracing::warn!(option = key, found = item.type_str(), "skipping non-string item");
                    None
                }
            })
            .collect()
    }
}

fn invalid_field(handler: &str, field: &str, expected: &str, found: &Value) {
    tracing::warn!(
        handler,
        field,
        expected,
        found = found.type_str(),
        "invalid handler config value, keeping the default"
    );
}
