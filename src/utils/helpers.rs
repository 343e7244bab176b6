//! Helpers for l.
//!
//! Small utilities shared across modules:
//! - Resolving the home directory
//! - Cutting tool stderr down to a loggable snippet
//! - Lowercased extension matching, including compound extensions like `.tar.gz`
//! - Formatting durations as `MM:SS`

use std::path::{Path, PathBuf};
use std::time::Duration;

/// The user's home directory, if one can be determined.
pub fn get_home() -> Option<PathBuf> {
    dirs::home_dir()
}

/// Lossy UTF-8 view of `bytes`, cut to at most `max` bytes on a character boundary.
///
/// A cut snippet ends with `...`.
pub fn truncate_lossy(bytes: &[u8], max: usize) -> String {
    let text = String::from_utf8_lossy(bytes);
    let text = text.trim_end();
    if text.len() <= max {
        return text.to_string();
    }
    let mut end = max;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &text[..end])
}

/// The lowercased file name of `path`, used for suffix matching.
fn lower_file_name(path: &Path) -> Option<String> {
    path.file_name()
        .map(|name| name.to_string_lossy().to_lowercase())
}

/// True when the lowercased file name ends with any of `suffixes` (each including its dot).
///
/// A bare suffix (a file literally named `.json`) does not count.
pub fn has_any_suffix(path: &Path, suffixes: &[&str]) -> bool {
    let Some(name) = lower_file_name(path) else {
        return false;
    };
    suffixes
        .iter()
        .any(|suffix| name.len() > suffix.len() && name.ends_with(suffix))
}

/// Formats a duration as `MM:SS`, or `H:MM:SS` from one hour on.
pub fn format_clock(duration: Duration) -> String {
    let total = duration.as_secs();
    let (hours, minutes, seconds) = (total / 3600, (total % 3600) / 60, total % 60);
    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{:02}:{:02}", minutes, seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_keeps_short_text() {
        assert_eq!(truncate_lossy(b"parse error\n", 512), "parse error");
    }

    #[test]
    fn test_truncate_respects_char_boundary() {
        // each 'é' is two bytes, a cut at 3 would split the second one
        let s = truncate_lossy("ééé".as_bytes(), 3);
        assert_eq!(s, "é...");
    }

    #[test]
    fn test_truncate_invalid_utf8() {
        let s = truncate_lossy(&[0x66, 0xFF, 0x6F], 512);
        assert_eq!(s, "f\u{FFFD}o");
    }

    #[test]
    fn test_compound_suffix() {
        assert!(has_any_suffix(Path::new("/tmp/A.TAR.GZ"), &[".tar.gz"]));
        assert!(has_any_suffix(Path::new("x.json"), &[".yaml", ".json"]));
        assert!(!has_any_suffix(Path::new(".json"), &[".json"]));
        assert!(!has_any_suffix(Path::new("archive.gz"), &[".tar.gz"]));
    }

    #[test]
    fn test_format_clock() {
        assert_eq!(format_clock(Duration::from_secs(120)), "02:00");
        assert_eq!(format_clock(Duration::from_secs(59)), "00:59");
        assert_eq!(format_clock(Duration::from_secs(3723)), "1:02:03");
    }
}
