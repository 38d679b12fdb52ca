//! Action identifiers.
//!
//! The wire surface is a string (`convert`, `compress_mp4_28`,
//! `compress_pdf_high`, `split_pdf`, `merge_pdf`). It is parsed exactly once
//! at the dispatch boundary into a typed `Action`; nothing downstream
//! re-inspects the string.

use serde::{Deserialize, Serialize};

use crate::error::DispatchError;

/// The category of a requested operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionFamily {
    Convert,
    Compress,
    Split,
    Merge,
}

/// Document compression quality tier, expressed as the optimizer's preset
/// scale. Ordinals follow the 100/75/50/25 convention; anything unmapped
/// falls back to `Ebook`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PdfQuality {
    Prepress,
    Printer,
    Ebook,
    Screen,
}

impl PdfQuality {
    /// Resolve a tier keyword from an action string. Matching is by
    /// substring: "high" and "low" are recognized, everything else is the
    /// medium tier.
    pub fn from_tier_keyword(keyword: &str) -> Self {
        if keyword.contains("high") {
            PdfQuality::Printer
        } else if keyword.contains("low") {
            PdfQuality::Screen
        } else {
            PdfQuality::Ebook
        }
    }

    pub fn from_ordinal(ordinal: u32) -> Self {
        match ordinal {
            100 => PdfQuality::Prepress,
            75 => PdfQuality::Printer,
            50 => PdfQuality::Ebook,
            25 => PdfQuality::Screen,
            _ => PdfQuality::Ebook,
        }
    }

    pub fn ordinal(self) -> u32 {
        match self {
            PdfQuality::Prepress => 100,
            PdfQuality::Printer => 75,
            PdfQuality::Ebook => 50,
            PdfQuality::Screen => 25,
        }
    }

    /// Ghostscript `-dPDFSETTINGS` preset for this tier.
    pub fn gs_preset(self) -> &'static str {
        match self {
            PdfQuality::Prepress => "/prepress",
            PdfQuality::Printer => "/printer",
            PdfQuality::Ebook => "/ebook",
            PdfQuality::Screen => "/screen",
        }
    }

    /// JPEG quality used when recompressing embedded raster images.
    pub fn jpeg_quality(self) -> u8 {
        self.ordinal() as u8
    }

    pub fn label(self) -> &'static str {
        match self {
            PdfQuality::Prepress => "maximum",
            PdfQuality::Printer => "high",
            PdfQuality::Ebook => "medium",
            PdfQuality::Screen => "low",
        }
    }
}

/// A parsed action with its typed parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Convert,
    CompressVideo { crf: u8 },
    CompressPdf { quality: PdfQuality },
    SplitPdf { at_page: Option<u32> },
    MergePdf,
}

impl Action {
    /// Parse an action identifier. Unknown families and malformed
    /// parameters are `UnsupportedAction`; the filesystem is never touched.
    pub fn parse(action: &str) -> Result<Self, DispatchError> {
        match action {
            // The upload page historically sent "convert_to_mp4"; both
            // spellings mean "convert to the target implied by the source".
            "convert" | "convert_to_mp4" => return Ok(Action::Convert),
            "split_pdf" => return Ok(Action::SplitPdf { at_page: None }),
            "merge_pdf" => return Ok(Action::MergePdf),
            _ => {}
        }

        if let Some(rest) = action.strip_prefix("compress_mp4_") {
            let crf = rest.parse::<u8>().map_err(|_| {
                DispatchError::UnsupportedAction(format!(
                    "malformed CRF value in action '{}'",
                    action
                ))
            })?;
            return Ok(Action::CompressVideo { crf });
        }

        if let Some(rest) = action.strip_prefix("compress_pdf") {
            let keyword = rest.trim_start_matches('_');
            return Ok(Action::CompressPdf {
                quality: PdfQuality::from_tier_keyword(keyword),
            });
        }

        if let Some(rest) = action.strip_prefix("split_pdf_") {
            let at_page = rest.parse::<u32>().map_err(|_| {
                DispatchError::UnsupportedAction(format!(
                    "malformed page number in action '{}'",
                    action
                ))
            })?;
            return Ok(Action::SplitPdf {
                at_page: Some(at_page),
            });
        }

        Err(DispatchError::UnsupportedAction(format!(
            "unsupported action family: {}",
            action
        )))
    }

    pub fn family(self) -> ActionFamily {
        match self {
            Action::Convert => ActionFamily::Convert,
            Action::CompressVideo { .. } | Action::CompressPdf { .. } => ActionFamily::Compress,
            Action::SplitPdf { .. } => ActionFamily::Split,
            Action::MergePdf => ActionFamily::Merge,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_convert() {
        assert_eq!(Action::parse("convert").unwrap(), Action::Convert);
        assert_eq!(Action::parse("convert_to_mp4").unwrap(), Action::Convert);
    }

    #[test]
    fn test_parse_video_crf() {
        assert_eq!(
            Action::parse("compress_mp4_24").unwrap(),
            Action::CompressVideo { crf: 24 }
        );
        assert_eq!(
            Action::parse("compress_mp4_28").unwrap(),
            Action::CompressVideo { crf: 28 }
        );
    }

    #[test]
    fn test_parse_video_crf_malformed() {
        let err = Action::parse("compress_mp4_fast").unwrap_err();
        assert_eq!(err.category(), "unsupported_action");
    }

    #[test]
    fn test_parse_pdf_quality_tiers() {
        assert_eq!(
            Action::parse("compress_pdf_high").unwrap(),
            Action::CompressPdf {
                quality: PdfQuality::Printer
            }
        );
        assert_eq!(
            Action::parse("compress_pdf_low").unwrap(),
            Action::CompressPdf {
                quality: PdfQuality::Screen
            }
        );
        // Unrecognized keyword falls back to the medium tier.
        assert_eq!(
            Action::parse("compress_pdf_standard").unwrap(),
            Action::CompressPdf {
                quality: PdfQuality::Ebook
            }
        );
    }

    #[test]
    fn test_pdf_quality_ordinals() {
        assert_eq!(PdfQuality::from_tier_keyword("high").ordinal(), 75);
        assert_eq!(PdfQuality::from_tier_keyword("low").ordinal(), 25);
        assert_eq!(PdfQuality::from_tier_keyword("standard").ordinal(), 50);
    }

    #[test]
    fn test_pdf_quality_gs_presets() {
        assert_eq!(PdfQuality::from_ordinal(100).gs_preset(), "/prepress");
        assert_eq!(PdfQuality::from_ordinal(75).gs_preset(), "/printer");
        assert_eq!(PdfQuality::from_ordinal(50).gs_preset(), "/ebook");
        assert_eq!(PdfQuality::from_ordinal(25).gs_preset(), "/screen");
        // Unmapped ordinals take the second-most-aggressive preset.
        assert_eq!(PdfQuality::from_ordinal(60).gs_preset(), "/ebook");
    }

    #[test]
    fn test_parse_split() {
        assert_eq!(
            Action::parse("split_pdf").unwrap(),
            Action::SplitPdf { at_page: None }
        );
        assert_eq!(
            Action::parse("split_pdf_3").unwrap(),
            Action::SplitPdf { at_page: Some(3) }
        );
        assert!(Action::parse("split_pdf_three").is_err());
    }

    #[test]
    fn test_parse_merge() {
        assert_eq!(Action::parse("merge_pdf").unwrap(), Action::MergePdf);
    }

    #[test]
    fn test_parse_unknown_family() {
        let err = Action::parse("rotate").unwrap_err();
        assert_eq!(err.category(), "unsupported_action");
        assert!(err.to_string().contains("rotate"));
    }

    #[test]
    fn test_families() {
        assert_eq!(Action::Convert.family(), ActionFamily::Convert);
        assert_eq!(
            Action::CompressVideo { crf: 28 }.family(),
            ActionFamily::Compress
        );
        assert_eq!(
            Action::SplitPdf { at_page: None }.family(),
            ActionFamily::Split
        );
        assert_eq!(Action::MergePdf.family(), ActionFamily::Merge);
    }
}
