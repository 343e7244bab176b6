//! Command-line argument parsing and help for l.
//!
//! `l` takes at most one argument: a path, or one of the flags below.
//! When invoked with no args, it views piped stdin or the current directory.

use crate::config::{CONFIG_ENV, Config};
use crate::utils::logging::LOG_ENV;

/// Exit code for unusable arguments.
pub const EXIT_USAGE: i32 = 2;

#[derive(Debug, PartialEq, Eq)]
pub enum CliAction {
    /// View the given path, or stdin / the current directory when `None`.
    View(Option<String>),
    /// Nothing left to do, exit with this code.
    Exit(i32),
}

/// Parses `std::env::args`.
pub fn handle_args() -> CliAction {
    let args: Vec<String> = std::env::args().skip(1).collect();
    parse_args(&args)
}

/// Parses the arguments after the program name.
pub fn parse_args(args: &[String]) -> CliAction {
    let arg = match args {
        [] => return CliAction::View(None),
        // after "--" the argument is a path even when it starts with a dash
        [dashes, path] if dashes == "--" && !path.trim().is_empty() => {
            return CliAction::View(Some(path.clone()));
        }
        [arg] => arg.as_str(),
        _ => {
            eprintln!("Error: l accepts only one argument at a time.");
            eprintln!("Usage: l [PATH] or l [OPTION]");
            return CliAction::Exit(EXIT_USAGE);
        }
    };

    match arg {
        "--version" | "-v" => {
            print_version();
            CliAction::Exit(0)
        }
        "-h" | "--help" => {
            print_help();
            CliAction::Exit(0)
        }
        "--init" => {
            let path = Config::default_path();
            match Config::generate_default(&path) {
                Ok(()) => {
                    println!("Wrote default configuration to {}", path.display());
                    CliAction::Exit(0)
                }
                Err(e) => {
                    eprintln!("Error: {}", e);
                    CliAction::Exit(1)
                }
            }
        }
        // a lone "-" means stdin, as for most tools
        "-" | "--" => CliAction::View(None),
        arg if !arg.starts_with('-') && !arg.trim().is_empty() => {
            CliAction::View(Some(arg.to_string()))
        }
        arg => {
            eprintln!("Unknown argument: {}", arg);
            eprintln!("Try --help for available options");
            CliAction::Exit(EXIT_USAGE)
        }
    }
}

fn print_version() {
    println!("l {}", env!("CARGO_PKG_VERSION"));
}

fn print_help() {
    println!(
        r#"l - view any file or directory with the right tool

USAGE:
  l [PATH]
  l -- PATH               PATH may start with a dash

PATH:
  File or directory to view. Without a path, piped stdin is paged,
  otherwise the current directory is listed.

OPTIONS:
      --init              Generate the default configuration file
  -h, --help              Print help information
  -v, --version           Display the current installed version of l

ENVIRONMENT:
  {config_env:<22}  Use this config file instead of the default locations
  {log_env:<22}  Log filter, e.g. "debug" (default: warn)
"#,
        config_env = CONFIG_ENV,
        log_env = LOG_ENV,
    );
}
