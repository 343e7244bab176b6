//! JSON, pretty printed by `jq`.
//!
//! Extra `jq` arguments can be set with `[handlers.json.options] jq_args = [...]`.

use crate::core::limits::MAX_JSON_SIZE;
use crate::core::proc::{Invocation, TimeoutClass};
use crate::core::sniff::json_like;
use crate::core::PathSubject;
use crate::handlers::{
    Context, HandleError, HandlerKind, capture_and_present, check_size, require,
};

pub(crate) fn can_handle(subject: &PathSubject) -> bool {
    if !subject.is_file() {
        return false;
    }
    (subject.size() > 0 && subject.has_suffix(&[".json"])) || json_like(subject.prefix())
}

pub(crate) fn handle(subject: &PathSubject, ctx: &Context) -> Result<i32, HandleError> {
    check_size(subject, MAX_JSON_SIZE)?;
    require(ctx, "jq")?;

    capture_and_present(&command(subject, ctx), ctx)
}

fn command(subject: &PathSubject, ctx: &Context) -> Invocation {
    Invocation::new("jq", TimeoutClass::Quick)
        .arg_if(ctx.terminal().colors(), "-C")
        .args(ctx.string_option(HandlerKind::Json, "jq_args"))
        .arg(".")
        .arg(subject.path())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::core::TerminalSize;

    use std::error;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_content_without_extension() -> Result<(), Box<dyn error::Error>> {
        let dir = tempdir()?;
        let path = dir.path().join("payload");
        fs::write(&path, "{\"a\":1}")?;
        assert!(can_handle(&PathSubject::new(&path)));
        Ok(())
    }

    #[test]
    fn test_invalid_utf8_is_rejected() -> Result<(), Box<dyn error::Error>> {
        let dir = tempdir()?;
        let path = dir.path().join("payload");
        fs::write(&path, b"{\xC3\x28 not text")?;
        assert!(!can_handle(&PathSubject::new(&path)));
        Ok(())
    }

    #[test]
    fn test_empty_json_extension_is_not_claimed() -> Result<(), Box<dyn error::Error>> {
        let dir = tempdir()?;
        let path = dir.path().join("empty.json");
        fs::write(&path, "")?;
        assert!(!can_handle(&PathSubject::new(&path)));
        Ok(())
    }

    #[test]
    fn test_argv_with_options() -> Result<(), Box<dyn error::Error>> {
        let config = Config::from_toml("[handlers.json.options]\njq_args = [\"--sort-keys\"]\n")?;
        let ctx = Context::new(TerminalSize::fixed(40, 80)).with_config(&config);
        let argv = command(&PathSubject::new("x.json"), &ctx).argv();
        assert_eq!(argv, ["jq", "-C", "--sort-keys", ".", "x.json"]);

        let plain = Context::new(TerminalSize::detached());
        let argv = command(&PathSubject::new("x.json"), &plain).argv();
        assert_eq!(argv, ["jq", ".", "x.json"]);
        Ok(())
    }
}
