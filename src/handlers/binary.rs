//! Binary files, shown as a hex dump.
//!
//! Detection asks `file --mime-encoding` first. Encodings it reports as text are double
//! checked for NUL bytes in the prefix, and the NUL check alone decides when `file` is missing
//! or fails.

use crate::core::limits::{DETECTION_TIMEOUT, MAX_BINARY_SIZE};
use crate::core::proc::{self, Invocation, TimeoutClass, Timeouts};
use crate::core::sniff::has_nul;
use crate::core::PathSubject;
use crate::handlers::{Context, HandleError, capture_and_present, require};

/// Encodings `file` reports for plain text.
const TEXT_ENCODINGS: &[&str] = &["us-ascii", "utf-8", "iso-8859-1"];

/// What `file --mime-encoding` said about a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Verdict {
    Binary,
    /// Looks like text, confirm with the NUL check.
    Text,
    /// Some other encoding, trusted as not binary.
    Other,
}

fn classify_encoding(encoding: &str) -> Verdict {
    let encoding = encoding.trim();
    if encoding == "binary" || encoding.starts_with("unknown-") {
        Verdict::Binary
    } else if TEXT_ENCODINGS.contains(&encoding) {
        Verdict::Text
    } else {
        Verdict::Other
    }
}

pub(crate) fn can_handle(subject: &PathSubject, ctx: &Context) -> bool {
    if !subject.is_nonempty_file() || subject.size() > MAX_BINARY_SIZE {
        return false;
    }

    if !ctx.has("file") {
        return has_nul(subject.prefix());
    }

    let inv = Invocation::new("file", TimeoutClass::Quick)
        .args(["--mime-encoding", "-b"])
        .arg(subject.path());
    let bound = Timeouts::uniform(DETECTION_TIMEOUT.min(ctx.timeouts().quick));

    match proc::capture(&inv, &bound) {
        Ok(out) => {
            let encoding = String::from_utf8_lossy(&out.stdout);
            let verdict = classify_encoding(&encoding);
            tracing::debug!(encoding = %encoding.trim(), ?verdict, "file encoding");
            match verdict {
                Verdict::Binary => true,
                Verdict::Text => has_nul(subject.prefix()),
                Verdict::Other => false,
            }
        }
        Err(e) => {
            tracing::debug!(error = %e, "file check failed, using the content check");
            has_nul(subject.prefix())
        }
    }
}

pub(crate) fn handle(subject: &PathSubject, ctx: &Context) -> Result<i32, HandleError> {
    require(ctx, "hexdump")?;
    let inv = Invocation::new("hexdump", TimeoutClass::Rendering)
        .arg("-C")
        .arg(subject.path());
    capture_and_present(&inv, ctx)
}
