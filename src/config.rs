//! Configuration for l.
//!
//! - [load]: finding and parsing `config.toml`, the [Config] struct and [ConfigError].
//! - [handler]: the lenient per-handler settings, [HandlerConfig].
//!
//! The file is optional. Without it every handler runs with its built-in priority.

pub mod handler;
pub mod load;

pub use handler::HandlerConfig;
pub use load::{CONFIG_ENV, Config, ConfigError, General};
