//! XML and HTML, reindented by `xmllint`.

use crate::core::limits::MAX_XML_SIZE;
use crate::core::proc::{Invocation, TimeoutClass};
use crate::core::sniff::{html_like, xml_like};
use crate::core::PathSubject;
use crate::handlers::{
    Context, HandleError, capture_and_present, check_size, empty_notice, require,
};

const XML_SUFFIXES: &[&str] = &[".xml", ".html", ".htm", ".xhtml", ".svg", ".xsl", ".xslt"];
/// Parsed in `xmllint`'s lenient HTML mode.
const HTML_SUFFIXES: &[&str] = &[".html", ".htm"];

pub(crate) fn can_handle(subject: &PathSubject) -> bool {
    subject.is_file()
        && (subject.has_suffix(XML_SUFFIXES) || subject.prefix_text().is_some_and(xml_like))
}

pub(crate) fn handle(subject: &PathSubject, ctx: &Context) -> Result<i32, HandleError> {
    if subject.size() == 0 {
        return empty_notice("XML/HTML");
    }
    check_size(subject, MAX_XML_SIZE)?;
    require(ctx, "xmllint")?;

    capture_and_present(&command(subject), ctx)
}

fn command(subject: &PathSubject) -> Invocation {
    let html = subject.has_suffix(HTML_SUFFIXES) || subject.prefix_text().is_some_and(html_like);
    Invocation::new("xmllint", TimeoutClass::Quick)
        .arg_if(html, "--html")
        .arg("--format")
        .arg(subject.path())
}
