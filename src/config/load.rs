//! The main config loading module for l.
//!
//! Handles finding, reading and parsing the optional `config.toml`.
//!
//! Provides the main [Config] struct, as well as the internal [RawConfig] used for parsing.
//! A missing file is normal and silently yields the defaults. An unreadable or malformed file
//! is reported with a warning and also yields the defaults, viewing a file never fails
//! because of its configuration.

use crate::config::HandlerConfig;
use crate::core::Timeouts;
use crate::utils::get_home;

use serde::Deserialize;
use thiserror::Error;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use std::{fs, io};

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "L_COMMAND_CONFIG";
/// Directory name below the user config dir.
const APP_DIR: &str = "l-command";
const CONFIG_FILE: &str = "config.toml";
/// Config file looked up in the current directory.
const LOCAL_CONFIG_FILE: &str = "l-command.toml";
const CONFIG_VERSION: &str = "1.0";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse config file {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// The `[general]` table.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct General {
    version: String,
}

impl Default for General {
    fn default() -> Self {
        General {
            version: CONFIG_VERSION.to_string(),
        }
    }
}

impl General {
    #[inline]
    pub fn version(&self) -> &str {
        &self.version
    }
}

/// The `[timeouts]` table: bounds in seconds per timeout class.
#[derive(Deserialize, Debug, Default)]
#[serde(default)]
pub(crate) struct RawTimeouts {
    quick: Option<f64>,
    processing: Option<f64>,
    rendering: Option<f64>,
}

impl RawTimeouts {
    fn resolve(&self) -> Timeouts {
        let defaults = Timeouts::default();
        Timeouts {
            quick: seconds("quick", self.quick, defaults.quick),
            processing: seconds("processing", self.processing, defaults.processing),
            rendering: seconds("rendering", self.rendering, defaults.rendering),
        }
    }
}

fn seconds(class: &str, value: Option<f64>, default: Duration) -> Duration {
    let Some(secs) = value else {
        return default;
    };
    match Duration::try_from_secs_f64(secs) {
        Ok(bound) if !bound.is_zero() => bound,
        _ => {
            tracing::warn!(class, secs, "timeout must be a positive number of seconds, keeping the default");
            default
        }
    }
}

/// Raw configuration as read from the toml file.
///
/// Handler tables stay untyped here so a broken entry only costs that entry.
#[derive(Deserialize, Debug, Default)]
#[serde(default)]
pub(crate) struct RawConfig {
    general: General,
    timeouts: RawTimeouts,
    handlers: toml::Table,
}

/// Main configuration struct for l.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Config {
    general: General,
    timeouts: Timeouts,
    handlers: BTreeMap<String, HandlerConfig>,
}

/// Conversion from RawConfig to Config.
/// Invalid handler entries are dropped, invalid fields keep their defaults.
impl From<RawConfig> for Config {
    fn from(raw: RawConfig) -> Self {
        let handlers = raw
            .handlers
            .iter()
            .filter_map(|(name, value)| {
                HandlerConfig::from_value(name, value).map(|config| (name.clone(), config))
            })
            .collect();
        Self {
            general: raw.general,
            timeouts: raw.timeouts.resolve(),
            handlers,
        }
    }
}

impl Config {
    /// Loads the first config file found on the search path, or the defaults.
    ///
    /// Called by the entry point at startup.
    pub fn load() -> Self {
        let Some(path) = Self::find() else {
            tracing::debug!("no config file found, using defaults");
            return Self::default();
        };

        match Self::load_from(&path) {
            Ok(config) => {
                tracing::debug!(path = %path.display(), "loaded config");
                config
            }
            Err(e) => {
                tracing::warn!(error = %e, cause = %error_cause(&e), "using default configuration");
                Self::default()
            }
        }
    }

    /// Reads and parses a specific config file.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Parses config text.
    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str::<RawConfig>(content).map(Config::from)
    }

    /// Adds or replaces the settings of one handler.
    pub fn with_handler(mut self, name: &str, config: HandlerConfig) -> Self {
        self.handlers.insert(name.to_string(), config);
        self
    }

    // Getters

    #[inline]
    pub fn general(&self) -> &General {
        &self.general
    }

    #[inline]
    pub fn timeouts(&self) -> &Timeouts {
        &self.timeouts
    }

    #[inline]
    pub fn handlers(&self) -> &BTreeMap<String, HandlerConfig> {
        &self.handlers
    }

    #[inline]
    pub fn handler(&self, name: &str) -> Option<&HandlerConfig> {
        self.handlers.get(name)
    }

    /// The first existing config file on the search path.
    pub fn find() -> Option<PathBuf> {
        let explicit = std::env::var_os(CONFIG_ENV).map(PathBuf::from);
        let xdg = std::env::var_os("XDG_CONFIG_HOME").map(PathBuf::from);
        first_existing(&search_paths(explicit, xdg, get_home()))
    }

    /// Where `l --init` writes a new config: the user config dir.
    pub fn default_path() -> PathBuf {
        if let Some(path) = std::env::var_os(CONFIG_ENV) {
            return PathBuf::from(path);
        }
        if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME") {
            return PathBuf::from(xdg).join(APP_DIR).join(CONFIG_FILE);
        }
        if let Some(home) = get_home() {
            return home.join(".config").join(APP_DIR).join(CONFIG_FILE);
        }
        PathBuf::from(LOCAL_CONFIG_FILE)
    }

    /// Writes the commented default config to `path`.
    /// If the file already exists, returns an error.
    pub fn generate_default(path: &Path) -> io::Result<()> {
        if path.exists() {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("Config file already exists at {}", path.display()),
            ));
        }
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, DEFAULT_CONFIG)
    }
}

/// Candidate config files in lookup order.
///
/// The explicit file, then `$XDG_CONFIG_HOME/l-command/config.toml`,
/// `~/.config/l-command/config.toml`, the legacy `~/.l-command/config.toml` and
/// finally `./l-command.toml`.
pub fn search_paths(
    explicit: Option<PathBuf>,
    xdg_config_home: Option<PathBuf>,
    home: Option<PathBuf>,
) -> Vec<PathBuf> {
    let mut paths = Vec::with_capacity(5);
    paths.extend(explicit);
    if let Some(xdg) = xdg_config_home.filter(|p| !p.as_os_str().is_empty()) {
        paths.push(xdg.join(APP_DIR).join(CONFIG_FILE));
    }
    if let Some(home) = home {
        paths.push(home.join(".config").join(APP_DIR).join(CONFIG_FILE));
        paths.push(home.join(format!(".{}", APP_DIR)).join(CONFIG_FILE));
    }
    paths.push(PathBuf::from(LOCAL_CONFIG_FILE));
    paths
}

/// First path that is a regular file.
pub fn first_existing(paths: &[PathBuf]) -> Option<PathBuf> {
    paths.iter().find(|p| p.is_file()).cloned()
}

fn error_cause(e: &ConfigError) -> String {
    match e {
        ConfigError::Read { source, .. } => source.to_string(),
        ConfigError::Parse { source, .. } => source.message().to_string(),
    }
}

const DEFAULT_CONFIG: &str = r##"# config.toml - configuration for l

# Commented values are the built-in defaults.

[general]
version = "1.0"

# Upper bounds in seconds for external tools.
# [timeouts]
# quick = 30        # jq, xmllint, yq
# processing = 60   # ffprobe, pdftotext, unzip, tar
# rendering = 45    # timg, glow, mdcat, pandoc, hexdump, column, cat

# Each handler can be disabled or moved in the evaluation order.
# Higher priority handlers are asked first. The directory and default
# handlers cannot be disabled.

# [handlers.directory]
# priority = 100

# [handlers.archive]
# enabled = true
# priority = 80

# [handlers.image]
# enabled = true
# priority = 65

# [handlers.pdf]
# enabled = true
# priority = 60

# [handlers.binary]
# enabled = true
# priority = 60

# [handlers.media]
# enabled = true
# priority = 55

# [handlers.json]
# enabled = true
# priority = 50
# [handlers.json.options]
# jq_args = ["--sort-keys"]

# [handlers.xml]
# enabled = true
# priority = 45

# [handlers.csv]
# enabled = true
# priority = 40

# [handlers.markdown]
# enabled = true
# priority = 35

# [handlers.yaml]
# enabled = true
# priority = 30
"##;

#[cfg(test)]
mod tests {
    use super::*;

    use std::error;
    use tempfile::tempdir;

    #[test]
    fn test_empty_config_is_default() -> Result<(), Box<dyn error::Error>> {
        let config = Config::from_toml("")?;
        assert_eq!(config, Config::default());
        assert_eq!(config.general().version(), "1.0");
        assert!(config.handlers().is_empty());
        Ok(())
    }

    #[test]
    fn test_handler_tables() -> Result<(), Box<dyn error::Error>> {
        let config = Config::from_toml(
            r#"
            [general]
            version = "1.0"

            [handlers.json]
            enabled = false

            [handlers.yaml]
            priority = 90

            [handlers.bogus]
            enabled = false
            "#,
        )?;
        assert_eq!(config.handler("json").map(HandlerConfig::enabled), Some(false));
        assert_eq!(config.handler("yaml").and_then(HandlerConfig::priority), Some(90));
        // unknown names are kept here, the registry decides what to do with them
        assert!(config.handler("bogus").is_some());
        Ok(())
    }

    #[test]
    fn test_timeouts_table() -> Result<(), Box<dyn error::Error>> {
        let config = Config::from_toml("[timeouts]\nquick = 0.5\nrendering = -3.0\n")?;
        let t = config.timeouts();
        assert_eq!(t.quick, Duration::from_millis(500));
        assert_eq!(t.rendering, Timeouts::default().rendering);
        assert_eq!(t.processing, Timeouts::default().processing);
        Ok(())
    }

    #[test]
    fn test_out_of_range_timeouts_keep_defaults() -> Result<(), Box<dyn error::Error>> {
        let config = Config::from_toml("[timeouts]\nquick = 1e20\nprocessing = 0.0\nrendering = 1e-12\n")?;
        assert_eq!(config.timeouts(), &Timeouts::default());
        Ok(())
    }

    #[test]
    fn test_non_table_handler_is_dropped() -> Result<(), Box<dyn error::Error>> {
        let config = Config::from_toml("[handlers]\njson = false\n")?;
        assert!(config.handler("json").is_none());
        Ok(())
    }

    #[test]
    fn test_malformed_file_is_an_error() -> Result<(), Box<dyn error::Error>> {
        let dir = tempdir()?;
        let path = dir.path().join("config.toml");
        fs::write(&path, "[handlers.json\nenabled = ")?;
        assert!(matches!(Config::load_from(&path), Err(ConfigError::Parse { .. })));

        let missing = dir.path().join("missing.toml");
        assert!(matches!(Config::load_from(&missing), Err(ConfigError::Read { .. })));
        Ok(())
    }

    #[test]
    fn test_search_order() {
        let paths = search_paths(
            Some(PathBuf::from("/etc/l.toml")),
            Some(PathBuf::from("/xdg")),
            Some(PathBuf::from("/home/u")),
        );
        assert_eq!(
            paths,
            vec![
                PathBuf::from("/etc/l.toml"),
                PathBuf::from("/xdg/l-command/config.toml"),
                PathBuf::from("/home/u/.config/l-command/config.toml"),
                PathBuf::from("/home/u/.l-command/config.toml"),
                PathBuf::from("l-command.toml"),
            ]
        );
        assert_eq!(search_paths(None, None, None), vec![PathBuf::from("l-command.toml")]);
    }

    #[test]
    fn test_first_existing_wins() -> Result<(), Box<dyn error::Error>> {
        let home = tempdir()?;
        let legacy = home.path().join(".l-command/config.toml");
        fs::create_dir_all(home.path().join(".l-command"))?;
        fs::write(&legacy, "")?;

        let paths = search_paths(None, None, Some(home.path().to_path_buf()));
        assert_eq!(first_existing(&paths), Some(legacy.clone()));

        let modern = home.path().join(".config/l-command/config.toml");
        fs::create_dir_all(home.path().join(".config/l-command"))?;
        fs::write(&modern, "")?;
        assert_eq!(first_existing(&paths), Some(modern));
        Ok(())
    }

    #[test]
    fn test_generated_default_parses() -> Result<(), Box<dyn error::Error>> {
        let dir = tempdir()?;
        let path = dir.path().join("nested/config.toml");
        Config::generate_default(&path)?;
        assert_eq!(Config::load_from(&path)?, Config::default());
        assert!(Config::generate_default(&path).is_err());
        Ok(())
    }
}
