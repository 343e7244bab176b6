//! Audio and video files.
//!
//! Instead of playing anything, a short summary is printed from `ffprobe`'s JSON report:
//! container, duration, bit rate and one line per stream. Files above
//! [MAX_MEDIA_PROBE_SIZE] only get the basic summary built from metadata.

use crate::core::limits::MAX_MEDIA_PROBE_SIZE;
use crate::core::pager;
use crate::core::proc::{self, Invocation, TimeoutClass};
use crate::core::sniff::media_signature;
use crate::core::PathSubject;
use crate::handlers::{Context, HandleError, empty_notice, require};
use crate::utils::format_clock;

use humansize::{DECIMAL, format_size};
use phf::phf_map;
use serde::Deserialize;

use std::fmt::Write as _;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Audio,
    Video,
}

impl MediaKind {
    fn label(self) -> &'static str {
        match self {
            MediaKind::Audio => "Audio file",
            MediaKind::Video => "Video file",
        }
    }
}

static MEDIA_EXTENSIONS: phf::Map<&'static str, MediaKind> = phf_map! {
    "mp3" => MediaKind::Audio,
    "flac" => MediaKind::Audio,
    "wav" => MediaKind::Audio,
    "aac" => MediaKind::Audio,
    "ogg" => MediaKind::Audio,
    "m4a" => MediaKind::Audio,
    "wma" => MediaKind::Audio,
    "opus" => MediaKind::Audio,
    "mp4" => MediaKind::Video,
    "mkv" => MediaKind::Video,
    "avi" => MediaKind::Video,
    "mov" => MediaKind::Video,
    "wmv" => MediaKind::Video,
    "flv" => MediaKind::Video,
    "webm" => MediaKind::Video,
    "m4v" => MediaKind::Video,
    "3gp" => MediaKind::Video,
};

/// Audio or video, from the extension first and the magic bytes second.
pub fn media_kind(subject: &PathSubject) -> Option<MediaKind> {
    if let Some(kind) = subject
        .ext_lower()
        .and_then(|ext| MEDIA_EXTENSIONS.get(ext.as_str()).copied())
    {
        return Some(kind);
    }
    media_signature(subject.prefix()).map(|container| match container {
        "mp3" | "flac" | "ogg" | "wav" => MediaKind::Audio,
        _ => MediaKind::Video,
    })
}

/// The parts of `ffprobe -print_format json` that go into the summary.
#[derive(Deserialize, Debug, Default)]
#[serde(default)]
pub struct ProbeReport {
    format: ProbeFormat,
    streams: Vec<ProbeStream>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(default)]
struct ProbeFormat {
    format_name: Option<String>,
    format_long_name: Option<String>,
    duration: Option<String>,
    bit_rate: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(default)]
struct ProbeStream {
    index: u32,
    codec_type: Option<String>,
    codec_name: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    r_frame_rate: Option<String>,
    sample_rate: Option<String>,
    channels: Option<u32>,
}

impl ProbeReport {
    pub fn parse(json: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(json)
    }

    fn streams_of<'a>(&'a self, kind: &'a str) -> impl Iterator<Item = &'a ProbeStream> + 'a {
        self.streams
            .iter()
            .filter(move |s| s.codec_type.as_deref() == Some(kind))
    }
}

pub(crate) fn can_handle(subject: &PathSubject) -> bool {
    subject.is_file() && media_kind(subject).is_some()
}

pub(crate) fn handle(subject: &PathSubject, ctx: &Context) -> Result<i32, HandleError> {
    if subject.size() == 0 {
        return empty_notice("media");
    }
    let kind = media_kind(subject).unwrap_or(MediaKind::Video);

    if subject.size() > MAX_MEDIA_PROBE_SIZE {
        tracing::debug!(size = subject.size(), "media file too large for ffprobe");
        let summary = basic_summary(subject, kind);
        return Ok(pager::present(summary.as_bytes(), ctx.terminal(), ctx.probe())?);
    }

    require(ctx, "ffprobe")?;
    let inv = Invocation::new("ffprobe", TimeoutClass::Processing)
        .args([
            "-v",
            "quiet",
            "-print_format",
            "json",
            "-show_format",
            "-show_streams",
        ])
        .arg(subject.path());
    let out = proc::capture(&inv, ctx.timeouts())?;

    let summary = match ProbeReport::parse(&out.stdout) {
        Ok(report) => summarize(subject, kind, &report),
        Err(e) => {
            tracing::warn!(error = %e, "could not read the ffprobe report");
            basic_summary(subject, kind)
        }
    };
    Ok(pager::present(summary.as_bytes(), ctx.terminal(), ctx.probe())?)
}

/// Helpers:
///
/// Header lines shared by both summaries.
fn header(subject: &PathSubject) -> String {
    let name = subject
        .path()
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| subject.path().display().to_string());
    format!(
        "Media File: {}\nSize: {}\n",
        name,
        format_size(subject.size(), DECIMAL)
    )
}

fn basic_summary(subject: &PathSubject, kind: MediaKind) -> String {
    let mut out = header(subject);
    let _ = writeln!(out, "Type: {}", kind.label());
    out
}

fn summarize(subject: &PathSubject, kind: MediaKind, report: &ProbeReport) -> String {
    let mut out = header(subject);

    match (&report.format.format_long_name, &report.format.format_name) {
        (Some(long), Some(short)) => {
            let _ = writeln!(out, "Format: {} ({})", long, short);
        }
        (Some(name), None) | (None, Some(name)) => {
            let _ = writeln!(out, "Format: {}", name);
        }
        (None, None) => {
            let _ = writeln!(out, "Type: {}", kind.label());
        }
    }

    if let Some(duration) = parse_number(report.format.duration.as_deref())
        .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
    {
        let _ = writeln!(out, "Duration: {}", format_clock(duration));
    }
    if let Some(bps) = parse_number(report.format.bit_rate.as_deref()) {
        let _ = writeln!(out, "Bit Rate: {} kb/s", (bps / 1000.0).round() as u64);
    }

    let video: Vec<_> = report.streams_of("video").collect();
    if !video.is_empty() {
        let _ = writeln!(out, "Video Streams: {}", video.len());
        for s in video {
            let _ = write!(out, "  #{}: {}", s.index, s.codec_name.as_deref().unwrap_or("unknown"));
            if let (Some(w), Some(h)) = (s.width, s.height) {
                let _ = write!(out, " {}x{}", w, h);
            }
            if let Some(fps) = s.r_frame_rate.as_deref().and_then(frame_rate) {
                let _ = write!(out, " @ {:.2} fps", fps);
            }
            out.push('\n');
        }
    }

    let audio: Vec<_> = report.streams_of("audio").collect();
    if !audio.is_empty() {
        let _ = writeln!(out, "Audio Streams: {}", audio.len());
        for s in audio {
            let _ = write!(out, "  #{}: {}", s.index, s.codec_name.as_deref().unwrap_or("unknown"));
            if let Some(rate) = &s.sample_rate {
                let _ = write!(out, " {} Hz", rate);
            }
            if let Some(channels) = s.channels {
                let _ = write!(out, ", {} channels", channels);
            }
            out.push('\n');
        }
    }
    out
}

fn parse_number(value: Option<&str>) -> Option<f64> {
    value
        .and_then(|v| v.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite() && *v >= 0.0)
}

/// `30000/1001` style rates.
fn frame_rate(value: &str) -> Option<f64> {
    let (num, den) = value.split_once('/')?;
    let (num, den) = (num.parse::<f64>().ok()?, den.parse::<f64>().ok()?);
    (den > 0.0 && num > 0.0).then(|| num / den)
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::error;
    use std::fs;
    use tempfile::tempdir;

    const REPORT: &str = r#"{
        "streams": [
            {"index": 0, "codec_type": "video", "codec_name": "h264", "width": 1920, "height": 1080, "r_frame_rate": "30000/1001"},
            {"index": 1, "codec_type": "audio", "codec_name": "aac", "sample_rate": "48000", "channels": 2}
        ],
        "format": {
            "format_name": "mov,mp4,m4a,3gp,3g2,mj2",
            "format_long_name": "QuickTime / MOV",
            "duration": "120.000000",
            "bit_rate": "1280000"
        }
    }"#;

    #[test]
    fn test_kind_from_extension_and_magic() -> Result<(), Box<dyn error::Error>> {
        let dir = tempdir()?;
        let song = dir.path().join("song.FLAC");
        fs::write(&song, "x")?;
        assert_eq!(media_kind(&PathSubject::new(&song)), Some(MediaKind::Audio));

        let clip = dir.path().join("clip");
        fs::write(&clip, [0x1A, 0x45, 0xDF, 0xA3, 0x01, 0x00])?;
        assert_eq!(media_kind(&PathSubject::new(&clip)), Some(MediaKind::Video));

        let text = dir.path().join("notes.txt");
        fs::write(&text, "hello")?;
        assert!(!can_handle(&PathSubject::new(&text)));
        Ok(())
    }

    #[test]
    fn test_summary_from_report() -> Result<(), Box<dyn error::Error>> {
        let dir = tempdir()?;
        let path = dir.path().join("movie.mp4");
        fs::write(&path, vec![0u8; 2048])?;
        let subject = PathSubject::new(&path);

        let report = ProbeReport::parse(REPORT.as_bytes())?;
        let summary = summarize(&subject, MediaKind::Video, &report);

        assert!(summary.starts_with("Media File: movie.mp4\n"));
        assert!(summary.contains("Format: QuickTime / MOV (mov,mp4,m4a,3gp,3g2,mj2)"));
        assert!(summary.contains("Duration: 02:00"));
        assert!(summary.contains("Bit Rate: 1280 kb/s"));
        assert!(summary.contains("Video Streams: 1\n  #0: h264 1920x1080 @ 29.97 fps"));
        assert!(summary.contains("Audio Streams: 1\n  #1: aac 48000 Hz, 2 channels"));
        Ok(())
    }

    #[test]
    fn test_sparse_report() -> Result<(), Box<dyn error::Error>> {
        let report = ProbeReport::parse(b"{}")?;
        let subject = PathSubject::new("/nonexistent/track.mp3");
        let summary = summarize(&subject, MediaKind::Audio, &report);
        assert!(summary.contains("Type: Audio file"));
        assert!(!summary.contains("Duration"));
        Ok(())
    }

    #[test]
    fn test_absurd_duration_is_left_out() -> Result<(), Box<dyn error::Error>> {
        let report = ProbeReport::parse(br#"{"format": {"duration": "1e30", "bit_rate": "64000"}}"#)?;
        let subject = PathSubject::new("/nonexistent/track.mp3");
        let summary = summarize(&subject, MediaKind::Audio, &report);
        assert!(!summary.contains("Duration"));
        assert!(summary.contains("Bit Rate: 64 kb/s"));
        Ok(())
    }

    #[test]
    fn test_basic_summary() {
        let subject = PathSubject::new("/nonexistent/huge.mkv");
        let summary = basic_summary(&subject, MediaKind::Video);
        assert!(summary.contains("Media File: huge.mkv"));
        assert!(summary.contains("Type: Video file"));
    }

    #[test]
    fn test_frame_rate() {
        assert_eq!(frame_rate("25/1"), Some(25.0));
        assert_eq!(frame_rate("0/0"), None);
        assert_eq!(frame_rate("abc"), None);
    }
}
