//! Deciding which way extracted text should be displayed.

use schemars::JsonSchema;
use serde::Serialize;

/// Display direction for a block of extracted text.
#[derive(Clone, Copy, Debug, Eq, JsonSchema, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TextDirection {
    /// Left-to-right.
    Ltr,
    /// Right-to-left.
    Rtl,
}

/// Unicode ranges for RTL scripts (Arabic, Hebrew, etc.).
const RTL_RANGES: &[(u32, u32)] = &[
    (0x0590, 0x05FF), // Hebrew
    (0x0600, 0x06FF), // Arabic
    (0x0750, 0x077F), // Arabic Supplement
    (0x08A0, 0x08FF), // Arabic Extended-A
    (0xFB50, 0xFDFF), // Arabic Presentation Forms-A
    (0xFE70, 0xFEFF), // Arabic Presentation Forms-B
];

/// Classify a block of text as LTR or RTL. Any single code point from an RTL
/// script makes the whole block RTL, and we stop scanning as soon as we see
/// one.
pub fn detect_direction(text: &str) -> TextDirection {
    let is_rtl = text.chars().any(|c| {
        let code = u32::from(c);
        RTL_RANGES
            .iter()
            .any(|&(start, end)| (start..=end).contains(&code))
    });
    if is_rtl {
        TextDirection::Rtl
    } else {
        TextDirection::Ltr
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_ascii_is_ltr() {
        assert_eq!(detect_direction("abc"), TextDirection::Ltr);
    }

    #[test]
    fn hebrew_is_rtl() {
        assert_eq!(detect_direction("שלום"), TextDirection::Rtl);
    }

    #[test]
    fn arabic_is_rtl() {
        assert_eq!(detect_direction("مرحبا"), TextDirection::Rtl);
    }

    #[test]
    fn mixed_content_is_rtl() {
        assert_eq!(detect_direction("abc שלום"), TextDirection::Rtl);
    }

    #[test]
    fn empty_text_is_ltr() {
        assert_eq!(detect_direction(""), TextDirection::Ltr);
    }

    #[test]
    fn presentation_forms_are_rtl() {
        // U+FB50 is the first Arabic Presentation Forms-A code point.
        assert_eq!(detect_direction("\u{FB50}"), TextDirection::Rtl);
    }
}
