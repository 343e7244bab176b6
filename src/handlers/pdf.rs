//! PDF documents, shown as text extracted by `pdftotext`.

use crate::core::limits::MAX_PDF_SIZE;
use crate::core::proc::{Invocation, TimeoutClass};
use crate::core::sniff::is_pdf;
use crate::core::PathSubject;
use crate::handlers::{Context, HandleError, capture_and_present, check_size, require};

pub(crate) fn can_handle(subject: &PathSubject) -> bool {
    (subject.is_nonempty_file() && subject.has_suffix(&[".pdf"]))
        || (subject.is_file() && is_pdf(subject.prefix()))
}

pub(crate) fn handle(subject: &PathSubject, ctx: &Context) -> Result<i32, HandleError> {
    check_size(subject, MAX_PDF_SIZE)?;
    require(ctx, "pdftotext")?;

    let inv = Invocation::new("pdftotext", TimeoutClass::Processing)
        .arg("-layout")
        .arg(subject.path())
        .arg("-");
    capture_and_present(&inv, ctx)
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::error;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_detection() -> Result<(), Box<dyn error::Error>> {
        let dir = tempdir()?;

        let magic = dir.path().join("report");
        fs::write(&magic, b"%PDF-1.7\n%\xE2\xE3\xCF\xD3\n")?;
        assert!(can_handle(&PathSubject::new(&magic)));

        let ext = dir.path().join("report.PDF");
        fs::write(&ext, "garbage")?;
        assert!(can_handle(&PathSubject::new(&ext)));

        // an empty .pdf is left to the Default handler
        let empty = dir.path().join("empty.pdf");
        fs::write(&empty, "")?;
        assert!(!can_handle(&PathSubject::new(&empty)));
        Ok(())
    }
}
