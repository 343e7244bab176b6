//! main.rs
//! Entry point for l

use l_command::config::Config;
use l_command::core::Subject;
use l_command::dispatch::dispatch;
use l_command::handlers::{Context, Registry};
use l_command::utils::cli::{CliAction, handle_args};
use l_command::utils::logging;

use crossterm::tty::IsTty;

fn main() {
    logging::init();

    let path = match handle_args() {
        CliAction::View(path) => path,
        CliAction::Exit(code) => std::process::exit(code),
    };

    let config = Config::load();
    let registry = Registry::from_config(&config);
    let ctx = Context::detect(&config);
    let subject = Subject::resolve(path, std::io::stdin().is_tty());

    std::process::exit(dispatch(&subject, &registry, &ctx));
}
