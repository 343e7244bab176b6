//! YAML, colored and normalized by `yq`.

use crate::core::limits::MAX_YAML_SIZE;
use crate::core::proc::{Invocation, TimeoutClass};
use crate::core::sniff::yaml_like;
use crate::core::PathSubject;
use crate::handlers::{
    Context, HandleError, capture_and_present, check_size, empty_notice, require,
};

pub(crate) fn can_handle(subject: &PathSubject) -> bool {
    subject.is_file()
        && (subject.has_suffix(&[".yaml", ".yml"])
            || subject.prefix_text().is_some_and(yaml_like))
}

pub(crate) fn handle(subject: &PathSubject, ctx: &Context) -> Result<i32, HandleError> {
    if subject.size() == 0 {
        return empty_notice("YAML");
    }
    check_size(subject, MAX_YAML_SIZE)?;
    require(ctx, "yq")?;

    capture_and_present(&command(subject, ctx), ctx)
}

fn command(subject: &PathSubject, ctx: &Context) -> Invocation {
    Invocation::new("yq", TimeoutClass::Quick)
        .arg("eval")
        .arg_if(ctx.terminal().colors(), "--colors")
        .arg(".")
        .arg(subject.path())
}
