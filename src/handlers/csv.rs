//! CSV and TSV, aligned into columns by `column -t`.

use crate::core::limits::MAX_CSV_SIZE;
use crate::core::proc::{Invocation, TimeoutClass};
use crate::core::sniff::csv_delimiter;
use crate::core::PathSubject;
use crate::handlers::{
    Context, HandleError, capture_and_present, check_size, empty_notice, require,
};

/// Field delimiter: the extension decides, content sniffing otherwise, comma as last resort.
fn delimiter(subject: &PathSubject) -> char {
    if subject.has_suffix(&[".tsv"]) {
        return '\t';
    }
    if subject.has_suffix(&[".csv"]) {
        return ',';
    }
    subject
        .prefix_text()
        .and_then(csv_delimiter)
        .unwrap_or(',')
}

pub(crate) fn can_handle(subject: &PathSubject) -> bool {
    subject.is_file()
        && (subject.has_suffix(&[".csv", ".tsv"])
            || subject.prefix_text().and_then(csv_delimiter).is_some())
}

pub(crate) fn handle(subject: &PathSubject, ctx: &Context) -> Result<i32, HandleError> {
    if subject.size() == 0 {
        return empty_notice("CSV");
    }
    check_size(subject, MAX_CSV_SIZE)?;
    require(ctx, "column")?;

    capture_and_present(&command(subject), ctx)
}

fn command(subject: &PathSubject) -> Invocation {
    Invocation::new("column", TimeoutClass::Rendering)
        .args(["-t", "-s"])
        .arg(delimiter(subject).to_string())
        .arg(subject.path())
}
