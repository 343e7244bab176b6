//! Content sniffing for l.
//!
//! Reads a bounded prefix of a file (see [SNIFF_BYTES]) and applies cheap heuristics on it:
//! magic bytes, delimiter counting, brace detection and UTF-8 validation.
//!
//! Nothing here ever fails. An unreadable file simply yields an empty prefix, which no
//! content heuristic matches.

use crate::core::limits::SNIFF_BYTES;

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

/// How many lines of a prefix the YAML heuristic looks at.
const YAML_SCAN_LINES: usize = 64;
/// Offset of the `ustar` marker inside a POSIX tar header.
const TAR_MAGIC_OFFSET: usize = 257;

/// Archive container signatures recognised from the first bytes of a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveMagic {
    Zip,
    Gzip,
    Bzip2,
    Xz,
    Zstd,
    Tar,
}

/// Reads at most `limit` bytes from the start of `path` with a single read call.
///
/// Returns an empty vector when the file cannot be opened or read.
pub fn read_prefix(path: &Path, limit: usize) -> Vec<u8> {
    let Ok(mut file) = File::open(path) else {
        return Vec::new();
    };
    let mut buf = vec![0u8; limit];
    match file.read(&mut buf) {
        Ok(n) => {
            buf.truncate(n);
            buf
        }
        Err(_) => Vec::new(),
    }
}

/// Reads the default sniff prefix.
pub fn sniff(path: &Path) -> Vec<u8> {
    read_prefix(path, SNIFF_BYTES)
}

/// UTF-8 view of a prefix.
///
/// A multibyte sequence cut off by the end of the prefix is tolerated (the prefix boundary
/// is arbitrary), any other invalid byte rejects the whole prefix.
pub fn prefix_text(prefix: &[u8]) -> Option<&str> {
    match std::str::from_utf8(prefix) {
        Ok(text) => Some(text),
        Err(e) if e.error_len().is_none() => std::str::from_utf8(&prefix[..e.valid_up_to()]).ok(),
        Err(_) => None,
    }
}

pub fn has_nul(prefix: &[u8]) -> bool {
    prefix.contains(&0)
}

/// First non-whitespace character is `{` or `[` and the prefix is valid UTF-8.
pub fn json_like(prefix: &[u8]) -> bool {
    let Some(text) = prefix_text(prefix) else {
        return false;
    };
    let trimmed = strip_bom(text).trim_start();
    trimmed.starts_with('{') || trimmed.starts_with('[')
}

pub fn is_pdf(prefix: &[u8]) -> bool {
    prefix.starts_with(b"%PDF-")
}

/// Returns the image format name if the prefix carries a known image header.
pub fn image_signature(prefix: &[u8]) -> Option<&'static str> {
    if prefix.starts_with(b"\x89PNG\r\n\x1a\n") {
        return Some("png");
    }
    if prefix.starts_with(&[0xFF, 0xD8, 0xFF]) {
        return Some("jpeg");
    }
    if prefix.starts_with(b"GIF87a") || prefix.starts_with(b"GIF89a") {
        return Some("gif");
    }
    if prefix.starts_with(b"II*\0") || prefix.starts_with(b"MM\0*") {
        return Some("tiff");
    }
    if riff_form(prefix) == Some(&b"WEBP"[..]) {
        return Some("webp");
    }
    // "BM" alone is too weak, the two reserved header words must be zero as well
    if prefix.len() >= 14 && prefix.starts_with(b"BM") && prefix[6..10] == [0, 0, 0, 0] {
        return Some("bmp");
    }
    None
}

/// Returns a short container name if the prefix carries a known audio/video header.
pub fn media_signature(prefix: &[u8]) -> Option<&'static str> {
    if prefix.starts_with(b"ID3") || prefix.starts_with(&[0xFF, 0xFB]) {
        return Some("mp3");
    }
    if prefix.starts_with(b"fLaC") {
        return Some("flac");
    }
    if prefix.starts_with(b"OggS") {
        return Some("ogg");
    }
    if prefix.starts_with(b"FLV\x01") {
        return Some("flv");
    }
    if prefix.starts_with(&[0x1A, 0x45, 0xDF, 0xA3]) {
        return Some("matroska");
    }
    if prefix.starts_with(&[0x30, 0x26, 0xB2, 0x75, 0x8E, 0x66, 0xCF, 0x11]) {
        return Some("asf");
    }
    match riff_form(prefix) {
        Some(b"WAVE") => return Some("wav"),
        Some(b"AVI ") => return Some("avi"),
        _ => {}
    }
    if prefix.len() >= 12 && &prefix[4..8] == b"ftyp" {
        // ISO-BMFF is shared with still image formats
        let brand = &prefix[8..12];
        if !matches!(brand, b"heic" | b"heix" | b"avif" | b"mif1" | b"msf1") {
            return Some("mp4");
        }
    }
    None
}

pub fn archive_signature(prefix: &[u8]) -> Option<ArchiveMagic> {
    if prefix.starts_with(b"PK\x03\x04")
        || prefix.starts_with(b"PK\x05\x06")
        || prefix.starts_with(b"PK\x07\x08")
    {
        return Some(ArchiveMagic::Zip);
    }
    if prefix.starts_with(&[0x1F, 0x8B]) {
        return Some(ArchiveMagic::Gzip);
    }
    if prefix.starts_with(b"BZh") {
        return Some(ArchiveMagic::Bzip2);
    }
    if prefix.starts_with(&[0xFD, b'7', b'z', b'X', b'Z', 0x00]) {
        return Some(ArchiveMagic::Xz);
    }
    if prefix.starts_with(&[0x28, 0xB5, 0x2F, 0xFD]) {
        return Some(ArchiveMagic::Zstd);
    }
    if prefix.len() >= TAR_MAGIC_OFFSET + 5
        && &prefix[TAR_MAGIC_OFFSET..TAR_MAGIC_OFFSET + 5] == b"ustar"
    {
        return Some(ArchiveMagic::Tar);
    }
    None
}

/// XML or HTML shaped text: a declaration, a doctype, or an opening tag closed later on.
pub fn xml_like(text: &str) -> bool {
    let trimmed = strip_bom(text).trim_start();
    let head: String = trimmed.chars().take(16).collect::<String>().to_ascii_lowercase();
    if head.starts_with("<?xml") || head.starts_with("<!doctype") || head.starts_with("<html") {
        return true;
    }

    let Some(rest) = trimmed.strip_prefix('<') else {
        return false;
    };
    let name: String = rest
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | ':' | '.'))
        .collect();
    if name.is_empty() || !name.starts_with(|c: char| c.is_ascii_alphabetic()) {
        return false;
    }
    trimmed.contains(&format!("</{}", name)) || opening_tag_self_closes(rest)
}

/// True when the document starts with HTML rather than generic XML.
pub fn html_like(text: &str) -> bool {
    let head: String = strip_bom(text)
        .trim_start()
        .chars()
        .take(16)
        .collect::<String>()
        .to_ascii_lowercase();
    head.starts_with("<!doctype html") || head.starts_with("<html")
}

/// Returns the delimiter when the first two lines look like delimited records.
///
/// Both lines need at least two delimiters and their counts may differ by one at most.
pub fn csv_delimiter(text: &str) -> Option<char> {
    let mut lines = text.lines();
    let first = lines.next()?;
    let second = lines.next()?;

    [',', '\t'].into_iter().find(|&delim| {
        let a = first.matches(delim).count();
        let b = second.matches(delim).count();
        a >= 2 && b >= 2 && a.abs_diff(b) <= 1
    })
}

/// YAML shaped text.
///
/// A first line holding only a `---` document marker, or a `%YAML` directive, is enough on
/// its own. Otherwise the text must not start like JSON, and at least half of the meaningful
/// lines have to be mapping or sequence entries, with at least one mapping among them.
pub fn yaml_like(text: &str) -> bool {
    let text = strip_bom(text);
    let first = text.lines().next().unwrap_or("");
    if first.trim_end() == "---" || first.starts_with("%YAML ") || first.starts_with("%YAML\t") {
        return true;
    }
    let trimmed = text.trim_start();
    if trimmed.starts_with('{') || trimmed.starts_with('[') {
        return false;
    }

    let mut meaningful = 0usize;
    let mut yamlish = 0usize;
    let mut mappings = 0usize;
    for line in text.lines().take(YAML_SCAN_LINES) {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        meaningful += 1;
        if is_mapping_line(line) {
            yamlish += 1;
            mappings += 1;
        } else if line == "-" || line.starts_with("- ") {
            yamlish += 1;
        }
    }
    mappings > 0 && yamlish * 2 >= meaningful
}

/// Markdown shaped text: an ATX heading on the first line plus one more markdown construct.
pub fn markdown_like(text: &str) -> bool {
    let text = strip_bom(text);
    let Some(first) = text.lines().find(|l| !l.trim().is_empty()) else {
        return false;
    };
    let level = first.chars().take_while(|&c| c == '#').count();
    if !(1..=6).contains(&level) {
        return false;
    }
    let after = &first[level..];
    if !after.starts_with(' ') || after.trim().is_empty() {
        return false;
    }

    ["\n## ", "\n### ", "```", "](", "\n- ", "\n* ", "\n> "]
        .iter()
        .any(|marker| text.contains(marker))
}

/// Counts lines the way a line iterator would: a trailing fragment without newline counts.
pub fn count_lines(bytes: &[u8]) -> usize {
    let newlines = bytes.iter().filter(|&&b| b == b'\n').count();
    match bytes.last() {
        Some(b'\n') | None => newlines,
        Some(_) => newlines + 1,
    }
}

/// Streams a reader and counts its lines with [count_lines] semantics.
pub fn count_lines_in<R: Read>(mut reader: R) -> io::Result<usize> {
    let mut buf = [0u8; 32 * 1024];
    let mut newlines = 0usize;
    let mut last = None;
    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        newlines += buf[..n].iter().filter(|&&b| b == b'\n').count();
        last = Some(buf[n - 1]);
    }
    Ok(match last {
        Some(b'\n') | None => newlines,
        Some(_) => newlines + 1,
    })
}

/// Helpers:
///
/// The four byte form type of a RIFF container (`WAVE`, `AVI `, `WEBP`).
fn riff_form(prefix: &[u8]) -> Option<&[u8]> {
    if prefix.len() >= 12 && prefix.starts_with(b"RIFF") {
        Some(&prefix[8..12])
    } else {
        None
    }
}

fn strip_bom(text: &str) -> &str {
    text.strip_prefix('\u{feff}').unwrap_or(text)
}

fn opening_tag_self_closes(rest: &str) -> bool {
    rest.find('>')
        .map(|end| rest[..end].ends_with('/'))
        .unwrap_or(false)
}

/// `key: value` or `key:` with a plain (or quoted) key and no spaces inside it.
fn is_mapping_line(line: &str) -> bool {
    let line = line.strip_prefix("- ").unwrap_or(line);
    let Some(idx) = line.find(':') else {
        return false;
    };
    let (key, rest) = (&line[..idx], &line[idx + 1..]);
    if key.is_empty() || !(rest.is_empty() || rest.starts_with(' ')) {
        return false;
    }
    let quoted = (key.starts_with('"') && key.ends_with('"'))
        || (key.starts_with('\'') && key.ends_with('\''));
    quoted
        || key
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.' | '/'))
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_read_prefix_is_bounded() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let path = dir.path().join("big.txt");
        fs::write(&path, vec![b'a'; 3 * SNIFF_BYTES])?;

        assert_eq!(sniff(&path).len(), SNIFF_BYTES);
        assert_eq!(read_prefix(&path, 10), b"aaaaaaaaaa");
        Ok(())
    }

    #[test]
    fn test_read_prefix_missing_and_empty() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        assert!(sniff(&dir.path().join("nope")).is_empty());

        let empty = dir.path().join("empty");
        fs::File::create(&empty)?;
        let prefix = sniff(&empty);
        assert!(prefix.is_empty());
        assert!(!json_like(&prefix));
        assert!(image_signature(&prefix).is_none());
        assert!(archive_signature(&prefix).is_none());
        Ok(())
    }

    #[test]
    fn test_json_like_requires_valid_utf8() {
        assert!(json_like(br#"{"a":1}"#));
        assert!(json_like(b"  \n [1, 2, 3] "));
        assert!(json_like(b"{not really json"));
        assert!(!json_like(b"This is not JSON"));
        assert!(!json_like(b""));
        // same first byte, broken continuation bytes
        assert!(!json_like(b"{\"a\":\xC3\x28\xA0\xA1}"));
    }

    #[test]
    fn test_prefix_text_tolerates_cut_sequence() {
        // "é" is C3 A9, the prefix ends after C3
        let cut = b"{\"name\": \"caf\xC3";
        assert_eq!(prefix_text(cut), Some("{\"name\": \"caf"));
        assert!(json_like(cut));
        assert!(prefix_text(b"\xFF\xFE").is_none());
    }

    #[test]
    fn test_image_signatures() {
        assert_eq!(image_signature(b"\x89PNG\r\n\x1a\nrest"), Some("png"));
        assert_eq!(image_signature(&[0xFF, 0xD8, 0xFF, 0xE0]), Some("jpeg"));
        assert_eq!(image_signature(b"GIF87a...."), Some("gif"));
        assert_eq!(image_signature(b"RIFF\x10\0\0\0WEBPVP8 "), Some("webp"));
        assert_eq!(image_signature(b"MM\0*\0\0\0\x08"), Some("tiff"));
        assert_eq!(
            image_signature(b"BM\x36\0\0\0\0\0\0\0\x36\0\0\0"),
            Some("bmp")
        );
        assert_eq!(image_signature(b"BMW service notes"), None);
        assert_eq!(image_signature(b"This is not an image"), None);
    }

    #[test]
    fn test_media_signatures() {
        assert_eq!(media_signature(b"ID3\x03\0\0\0"), Some("mp3"));
        assert_eq!(media_signature(b"\0\0\0\x20ftypmp42"), Some("mp4"));
        assert_eq!(media_signature(b"\0\0\0\x18ftypheic"), None);
        assert_eq!(media_signature(b"RIFF\0\0\0\0WAVEfmt "), Some("wav"));
        assert_eq!(media_signature(&[0x1A, 0x45, 0xDF, 0xA3, 0x01]), Some("matroska"));
        assert_eq!(media_signature(b"plain text"), None);
    }

    #[test]
    fn test_archive_signatures() {
        assert_eq!(archive_signature(b"PK\x03\x04"), Some(ArchiveMagic::Zip));
        assert_eq!(archive_signature(&[0x1F, 0x8B, 0x08]), Some(ArchiveMagic::Gzip));
        assert_eq!(archive_signature(b"BZh91AY"), Some(ArchiveMagic::Bzip2));
        assert_eq!(
            archive_signature(&[0x28, 0xB5, 0x2F, 0xFD, 0x00]),
            Some(ArchiveMagic::Zstd)
        );

        let mut tar = vec![0u8; 512];
        tar[257..262].copy_from_slice(b"ustar");
        assert_eq!(archive_signature(&tar), Some(ArchiveMagic::Tar));
        assert_eq!(archive_signature(b"not an archive"), None);
    }

    #[test]
    fn test_xml_like() {
        assert!(xml_like("<?xml version='1.0'?><root></root>"));
        assert!(xml_like("<!doctype html><html></html>"));
        assert!(xml_like("<html><body>content</body></html>"));
        assert!(xml_like("  <root>content</root>"));
        assert!(xml_like("<svg xmlns=\"x\"/>"));
        assert!(!xml_like("This is not XML or HTML"));
        assert!(!xml_like("<< heredoc"));
        assert!(!xml_like("<1>"));

        assert!(html_like("<!DOCTYPE html><html></html>"));
        assert!(!html_like("<?xml version='1.0'?><root/>"));
    }

    #[test]
    fn test_csv_delimiter() {
        assert_eq!(csv_delimiter("col1,col2,col3\nval1,val2,val3"), Some(','));
        assert_eq!(csv_delimiter("name\tage\tcity\nJohn\t30\tNYC"), Some('\t'));
        assert_eq!(csv_delimiter("a,b,c,d\n1,2,3"), Some(','));
        assert_eq!(csv_delimiter("a,b,c,d,e\n1,2"), None);
        assert_eq!(csv_delimiter("only,one,line"), None);
        assert_eq!(
            csv_delimiter("This is just regular text without delimiters"),
            None
        );
    }

    #[test]
    fn test_yaml_like() {
        assert!(yaml_like("---\nkey: value\nother: data"));
        assert!(yaml_like("%YAML 1.2\n---\nkey: value"));
        assert!(yaml_like(
            "key1: value1\nkey2: value2\nlist:\n  - item1\n  - item2"
        ));
        assert!(yaml_like("# settings\nname: demo\n"));
        assert!(!yaml_like("This is just regular text"));
        assert!(!yaml_like("{\"key\": \"value\"}"));
        assert!(!yaml_like("see http://example.com for details"));
        assert!(!yaml_like(
            "Note: this is prose.\nIt goes on for a while.\nAnd then some more.\n"
        ));
        assert!(yaml_like("---\r\nname: demo\r\n"));
        assert!(yaml_like("--- !config\nname: demo\n"));

        // dashes alone do not make a document marker
        assert!(!yaml_like(
            "-----BEGIN CERTIFICATE-----\nMIIBszCCAVmgAwIBAgIUQ2h\nZXJ0aWZpY2F0ZQ==\n-----END CERTIFICATE-----\n"
        ));
        assert!(!yaml_like(
            "--- a/src/main.rs\n+++ b/src/main.rs\n@@ -1,3 +1,3 @@\n-fn main() {}\n+fn main() { run() }\n"
        ));
    }

    #[test]
    fn test_markdown_like() {
        assert!(markdown_like("# Title\n\nSome text\n\n## Section\n"));
        assert!(markdown_like("# Title\n\n- item\n- item\n"));
        assert!(!markdown_like("# Title only"));
        assert!(!markdown_like("#!/bin/sh\necho hi\n"));
        assert!(!markdown_like("#include <stdio.h>\n```"));
        assert!(!markdown_like(""));
    }

    #[test]
    fn test_count_lines() -> Result<(), Box<dyn std::error::Error>> {
        assert_eq!(count_lines(b""), 0);
        assert_eq!(count_lines(b"line1\nline2\nline3\n"), 3);
        assert_eq!(count_lines(b"line1\nline2"), 2);
        assert_eq!(count_lines_in(&b"a\nb\nc"[..])?, 3);
        assert_eq!(count_lines_in(&b""[..])?, 0);
        Ok(())
    }
}
