//! Magic-byte validation for uploaded files.
//!
//! A 12-byte prefix is enough to identify every container this service
//! handles. Validation failure is a normal outcome, not an error: an
//! unreadable file or a mismatched header reports `Invalid`, and extensions
//! without a table entry report `Unknown`, which callers treat as passing.
//! The permissiveness for unknown extensions is intentional and kept
//! visible in the result type.

use std::path::Path;

use tokio::io::AsyncReadExt;

/// Bytes read from the start of a file for signature matching.
pub const PREFIX_LEN: usize = 12;

/// Outcome of a signature check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureCheck {
    /// Prefix matches a known signature for the claimed extension.
    Valid,
    /// Prefix mismatch, or the file could not be read.
    Invalid,
    /// No signature is registered for the extension; not validated.
    Unknown,
}

/// Check a file's magic bytes against its claimed extension.
pub async fn check(path: &Path, extension: &str) -> SignatureCheck {
    if !has_signature(extension) {
        tracing::debug!(
            extension = %extension,
            "no signature registered for extension, skipping validation"
        );
        return SignatureCheck::Unknown;
    }

    let mut prefix = [0u8; PREFIX_LEN];
    let read = match read_prefix(path, &mut prefix).await {
        Ok(n) => n,
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "signature read failed");
            return SignatureCheck::Invalid;
        }
    };

    matches_signature(&prefix[..read], extension)
}

/// Convenience wrapper: `Invalid` is the only failing outcome.
pub async fn is_valid(path: &Path, extension: &str) -> bool {
    check(path, extension).await != SignatureCheck::Invalid
}

/// Whether a signature is registered for the extension.
pub fn has_signature(extension: &str) -> bool {
    matches!(
        extension,
        "mkv" | "webm" | "avi" | "wmv" | "asf" | "mp4" | "m4v" | "mov" | "wav" | "pdf" | "png"
            | "jpg" | "jpeg"
    )
}

/// Match a file prefix against the signature table. Pure so the table is
/// testable without touching the filesystem.
pub fn matches_signature(prefix: &[u8], extension: &str) -> SignatureCheck {
    let valid = match extension {
        // EBML header shared by Matroska and WebM
        "mkv" | "webm" => prefix.starts_with(&[0x1A, 0x45, 0xDF, 0xA3]),
        "avi" => prefix.len() >= 12 && &prefix[..4] == b"RIFF" && &prefix[8..12] == b"AVI ",
        "wmv" | "asf" => prefix.starts_with(&[0x30, 0x26, 0xB2, 0x75]),
        // ISO base media: brand box at offset 4
        "mp4" | "m4v" | "mov" => prefix.len() >= 8 && &prefix[4..8] == b"ftyp",
        "wav" => prefix.len() >= 12 && &prefix[..4] == b"RIFF" && &prefix[8..12] == b"WAVE",
        "pdf" => prefix.starts_with(b"%PDF"),
        "png" => prefix.starts_with(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]),
        "jpg" | "jpeg" => prefix.starts_with(&[0xFF, 0xD8, 0xFF]),
        _ => return SignatureCheck::Unknown,
    };

    if valid {
        SignatureCheck::Valid
    } else {
        SignatureCheck::Invalid
    }
}

async fn read_prefix(path: &Path, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut file = tokio::fs::File::open(path).await?;
    let mut read = 0;
    while read < buf.len() {
        let n = file.read(&mut buf[read..]).await?;
        if n == 0 {
            break;
        }
        read += n;
    }
    Ok(read)
}
