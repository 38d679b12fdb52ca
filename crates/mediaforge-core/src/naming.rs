//! Output filename generation.
//!
//! Artifacts land in shared download folders, so names must never collide
//! across requests. Uniqueness comes from a second-granularity timestamp
//! plus a short random token; no filesystem coordination is involved.

use chrono::Local;
use uuid::Uuid;

/// Length of the random hex token appended to generated names.
const TOKEN_LEN: usize = 8;

/// Build a unique output filename from `original_name`.
///
/// The base name is kept, a `_YYYYMMDD_HHMMSS_<token>` suffix is inserted,
/// and the extension is replaced by `override_ext` when given (conversions
/// change the container; the caller's extension is not trusted either way).
///
/// Two calls with the same input never return the same name.
pub fn unique_output_name(original_name: &str, override_ext: Option<&str>) -> String {
    let (base, ext) = split_name(original_name);
    let ext = override_ext.unwrap_or(ext);
    let timestamp = Local::now().format("%Y%m%d_%H%M%S");
    let token: String = Uuid::new_v4()
        .simple()
        .to_string()
        .chars()
        .take(TOKEN_LEN)
        .collect();

    if ext.is_empty() {
        format!("{}_{}_{}", base, timestamp, token)
    } else {
        format!("{}_{}_{}.{}", base, timestamp, token, ext)
    }
}

/// Split a filename into (base, extension-without-dot). A name without a
/// dot, or with only a leading dot, has an empty extension.
fn split_name(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(idx) if idx > 0 => (&name[..idx], &name[idx + 1..]),
        _ => (name, ""),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_successive_calls_differ() {
        let a = unique_output_name("clip.mp4", None);
        let b = unique_output_name("clip.mp4", None);
        assert_ne!(a, b);
    }

    #[test]
    fn test_keeps_base_and_extension() {
        let name = unique_output_name("report.pdf", None);
        assert!(name.starts_with("report_"));
        assert!(name.ends_with(".pdf"));
    }

    #[test]
    fn test_extension_override() {
        let name = unique_output_name("clip.mkv", Some("mp4"));
        assert!(name.starts_with("clip_"));
        assert!(name.ends_with(".mp4"));
        assert!(!name.contains(".mkv"));
    }

    #[test]
    fn test_name_without_extension() {
        let name = unique_output_name("archive", None);
        assert!(name.starts_with("archive_"));
        assert!(!name.contains('.'));
    }

    #[test]
    fn test_dotfile_has_no_extension() {
        let name = unique_output_name(".env", Some("pdf"));
        assert!(name.starts_with(".env_"));
        assert!(name.ends_with(".pdf"));
    }

    #[test]
    fn test_multi_dot_name_keeps_inner_dots() {
        let name = unique_output_name("backup.2024.tar", None);
        assert!(name.starts_with("backup.2024_"));
        assert!(name.ends_with(".tar"));
    }

    #[test]
    fn test_token_length() {
        let name = unique_output_name("clip.mp4", None);
        // clip_YYYYMMDD_HHMMSS_tttttttt.mp4
        let stem = name.strip_suffix(".mp4").unwrap();
        let token = stem.rsplit('_').next().unwrap();
        assert_eq!(token.len(), TOKEN_LEN);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
