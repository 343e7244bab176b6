//! Threshold table for l.
//!
//! Every size cutoff, sniff length and timeout bound used by the handlers lives here,
//! so the whole classification policy can be read in one place.
//! All values are fixed for the lifetime of the process.

use std::time::Duration;

const KIB: u64 = 1024;
const MIB: u64 = 1024 * KIB;
const GIB: u64 = 1024 * MIB;

/// Number of bytes read from the start of a file for content sniffing.
/// Shared by every content based detector, so a file is only ever read once for detection.
pub const SNIFF_BYTES: usize = 8192;

/// Files above this size are never sent through `file`/NUL detection for the binary handler.
pub const MAX_BINARY_SIZE: u64 = 10 * MIB;
/// Size ceiling for `jq`.
pub const MAX_JSON_SIZE: u64 = 10 * MIB;
/// Size ceiling for `xmllint`.
pub const MAX_XML_SIZE: u64 = 10 * MIB;
/// Size ceiling for `yq`.
pub const MAX_YAML_SIZE: u64 = 10 * MIB;
/// Size ceiling for `column`.
pub const MAX_CSV_SIZE: u64 = 10 * MIB;
/// Size ceiling for the markdown renderers.
pub const MAX_MARKDOWN_SIZE: u64 = 10 * MIB;
/// Size ceiling for `timg`.
pub const MAX_IMAGE_SIZE: u64 = 50 * MIB;
/// Size ceiling for `pdftotext`.
pub const MAX_PDF_SIZE: u64 = 100 * MIB;
/// Above this size media files only get the basic summary, ffprobe is skipped.
pub const MAX_MEDIA_PROBE_SIZE: u64 = 2 * GIB;

/// Captured stderr is cut to this many bytes before it is logged.
pub const STDERR_SNIPPET_BYTES: usize = 512;

/// Interval between two `try_wait` polls while waiting for a bounded child.
pub const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Quick utilities: validators and type detectors (`jq`, `xmllint`, `yq`, `file`).
pub const TIMEOUT_QUICK: Duration = Duration::from_secs(30);
/// Processing tools: extract or analyze substantial content (`ffprobe`, `pdftotext`, `unzip`, `tar`).
pub const TIMEOUT_PROCESSING: Duration = Duration::from_secs(60);
/// Rendering tools: produce formatted terminal output (`timg`, `glow`, `mdcat`, `pandoc`, `hexdump`, `cat`).
pub const TIMEOUT_RENDERING: Duration = Duration::from_secs(45);

/// Bound for the `file` run inside binary detection. Detection must stay cheap, so this is
/// far below the quick class.
pub const DETECTION_TIMEOUT: Duration = Duration::from_secs(1);

/// Least time the pipe readers get after a bounded child exited, even when its bound is
/// nearly used up.
pub const DRAIN_GRACE: Duration = Duration::from_millis(500);
