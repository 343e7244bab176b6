//! Archive listings.
//!
//! Archives are recognised by extension only. Before the listing tool runs, the file's magic
//! bytes have to match the container its extension promises, otherwise the file is handed to
//! the Default handler.

use crate::core::proc::{Invocation, TimeoutClass};
use crate::core::sniff::{ArchiveMagic, archive_signature};
use crate::core::PathSubject;
use crate::handlers::{Context, HandleError, capture_and_present, require};

use phf::phf_map;

/// Archive family chosen from the extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
    Zip,
    Tar,
    TarGz,
    TarBz2,
    TarXz,
    TarZst,
}

/// Suffix to archive format. Compound suffixes never overlap with plain ones.
static ARCHIVE_FORMATS: phf::Map<&'static str, ArchiveFormat> = phf_map! {
    ".zip" => ArchiveFormat::Zip,
    ".jar" => ArchiveFormat::Zip,
    ".war" => ArchiveFormat::Zip,
    ".ear" => ArchiveFormat::Zip,
    ".apk" => ArchiveFormat::Zip,
    ".ipa" => ArchiveFormat::Zip,
    ".tar" => ArchiveFormat::Tar,
    ".tar.gz" => ArchiveFormat::TarGz,
    ".tgz" => ArchiveFormat::TarGz,
    ".tar.bz2" => ArchiveFormat::TarBz2,
    ".tbz2" => ArchiveFormat::TarBz2,
    ".tar.xz" => ArchiveFormat::TarXz,
    ".txz" => ArchiveFormat::TarXz,
    ".tar.zst" => ArchiveFormat::TarZst,
};

impl ArchiveFormat {
    pub fn of(subject: &PathSubject) -> Option<Self> {
        ARCHIVE_FORMATS
            .entries()
            .find(|(suffix, _)| subject.has_suffix(&[*suffix]))
            .map(|(_, format)| *format)
    }

    /// The container signature a file of this format starts with.
    fn magic(self) -> ArchiveMagic {
        match self {
            ArchiveFormat::Zip => ArchiveMagic::Zip,
            ArchiveFormat::Tar => ArchiveMagic::Tar,
            ArchiveFormat::TarGz => ArchiveMagic::Gzip,
            ArchiveFormat::TarBz2 => ArchiveMagic::Bzip2,
            ArchiveFormat::TarXz => ArchiveMagic::Xz,
            ArchiveFormat::TarZst => ArchiveMagic::Zstd,
        }
    }

    fn label(self) -> &'static str {
        match self {
            ArchiveFormat::Zip => "zip",
            ArchiveFormat::Tar => "tar",
            ArchiveFormat::TarGz => "gzip",
            ArchiveFormat::TarBz2 => "bzip2",
            ArchiveFormat::TarXz => "xz",
            ArchiveFormat::TarZst => "zstd",
        }
    }

    /// The listing command for `subject`.
    pub fn listing(self, subject: &PathSubject) -> Invocation {
        match self {
            ArchiveFormat::Zip => Invocation::new("unzip", TimeoutClass::Processing)
                .arg("-l")
                .arg(subject.path()),
            ArchiveFormat::TarZst => Invocation::new("tar", TimeoutClass::Processing)
                .args(["--use-compress-program=unzstd", "-tvf"])
                .arg(subject.path()),
            _ => Invocation::new("tar", TimeoutClass::Processing)
                .arg("-tvf")
                .arg(subject.path()),
        }
    }
}

pub(crate) fn can_handle(subject: &PathSubject) -> bool {
    subject.is_file() && ArchiveFormat::of(subject).is_some()
}

pub(crate) fn handle(subject: &PathSubject, ctx: &Context) -> Result<i32, HandleError> {
    let Some(format) = ArchiveFormat::of(subject) else {
        return Err(HandleError::Signature { expected: "archive" });
    };

    if archive_signature(subject.prefix()) != Some(format.magic()) {
        return Err(HandleError::Signature {
            expected: format.label(),
        });
    }

    let inv = format.listing(subject);
    require(ctx, inv.program())?;
    if format == ArchiveFormat::TarZst {
        require(ctx, "unzstd")?;
    }
    capture_and_present(&inv, ctx)
}
