//! Images, drawn in the terminal with `timg`.

use crate::core::limits::MAX_IMAGE_SIZE;
use crate::core::proc::{self, Invocation, TimeoutClass};
use crate::core::sniff::image_signature;
use crate::core::PathSubject;
use crate::handlers::{Context, HandleError, check_size, require};

const IMAGE_SUFFIXES: &[&str] = &[
    ".png", ".jpg", ".jpeg", ".gif", ".bmp", ".webp", ".tiff", ".tif",
];

pub(crate) fn can_handle(subject: &PathSubject) -> bool {
    subject.is_file()
        && (subject.has_suffix(IMAGE_SUFFIXES) || image_signature(subject.prefix()).is_some())
}

pub(crate) fn handle(subject: &PathSubject, ctx: &Context) -> Result<i32, HandleError> {
    check_size(subject, MAX_IMAGE_SIZE)?;
    require(ctx, "timg")?;

    let inv = Invocation::new("timg", TimeoutClass::Rendering).arg(subject.path());
    Ok(proc::forward(&inv, ctx.timeouts())?)
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::error;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_extension_or_magic() -> Result<(), Box<dyn error::Error>> {
        let dir = tempdir()?;

        let by_ext = dir.path().join("photo.JPG");
        fs::write(&by_ext, "not really")?;
        assert!(can_handle(&PathSubject::new(&by_ext)));

        let by_magic = dir.path().join("screenshot");
        fs::write(&by_magic, b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR")?;
        assert!(can_handle(&PathSubject::new(&by_magic)));

        let text = dir.path().join("notes");
        fs::write(&text, "plain text")?;
        assert!(!can_handle(&PathSubject::new(&text)));
        Ok(())
    }
}
