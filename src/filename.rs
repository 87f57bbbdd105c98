//! Filename derivation from video titles.
//!
//! Two strategies sit behind [`FilenameSanitizer`]: full slugification (the
//! default) and a legacy mode that only strips characters reserved by common
//! filesystems. Neither ever returns an empty name, and both keep the name
//! within [`MAX_STEM_BYTES`].

use serde::{Deserialize, Serialize};

/// Name used when sanitization leaves nothing behind.
pub const FALLBACK_NAME: &str = "untitled";

/// Byte budget for a stem, leaving room for an extension under the usual
/// 255-byte filename limit.
pub const MAX_STEM_BYTES: usize = 200;

/// Characters rejected by Windows and awkward everywhere else.
const RESERVED_CHARS: &[char] = &['\\', '/', '*', '?', ':', '"', '<', '>', '|'];

/// Turns an arbitrary title into a file stem.
pub trait FilenameSanitizer: Send + Sync {
    /// Produce a non-empty, filesystem-safe name (without extension).
    fn sanitize(&self, title: &str) -> String;
}

/// Available sanitization strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SanitizerKind {
    /// Transliterate, lowercase and hyphenate.
    #[default]
    Slugify,
    /// Strip reserved characters only, keeping case and spacing.
    StripReserved,
}

impl SanitizerKind {
    /// Build the sanitizer for this strategy.
    pub fn build(self) -> Box<dyn FilenameSanitizer> {
        match self {
            SanitizerKind::Slugify => Box::new(Slugify),
            SanitizerKind::StripReserved => Box::new(StripReserved),
        }
    }
}

impl std::str::FromStr for SanitizerKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "slugify" | "slug" => Ok(SanitizerKind::Slugify),
            "strip-reserved" | "strip" | "legacy" => Ok(SanitizerKind::StripReserved),
            _ => Err(format!(
                "Unknown sanitizer: {}. Use slugify or strip-reserved.",
                s
            )),
        }
    }
}

impl std::fmt::Display for SanitizerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SanitizerKind::Slugify => write!(f, "slugify"),
            SanitizerKind::StripReserved => write!(f, "strip-reserved"),
        }
    }
}

/// ASCII slug: `"Café: Déjà vu!"` becomes `"cafe-deja-vu"`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Slugify;

impl FilenameSanitizer for Slugify {
    fn sanitize(&self, title: &str) -> String {
        let slug = slugify(title);
        or_fallback(truncate_bytes(&slug, MAX_STEM_BYTES).trim_end_matches('-').to_string())
    }
}

/// Removes `\ / * ? : " < > |` and nothing else.
#[derive(Debug, Clone, Copy, Default)]
pub struct StripReserved;

impl FilenameSanitizer for StripReserved {
    fn sanitize(&self, title: &str) -> String {
        let stripped: String = title
            .chars()
            .filter(|c| !RESERVED_CHARS.contains(c) && !c.is_control())
            .collect();
        // Leading dots would hide the file or name the directory itself.
        let trimmed = stripped.trim().trim_start_matches('.').trim_start();
        or_fallback(truncate_bytes(trimmed, MAX_STEM_BYTES).trim_end().to_string())
    }
}

/// Convert text to a lowercase ASCII slug. May return an empty string.
pub fn slugify(text: &str) -> String {
    let ascii = deunicode::deunicode(text).to_lowercase();

    let mut slug = String::with_capacity(ascii.len());
    let mut pending_dash = false;
    for ch in ascii.chars() {
        if ch.is_ascii_lowercase() || ch.is_ascii_digit() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            slug.push(ch);
            pending_dash = false;
        } else {
            pending_dash = true;
        }
    }

    slug
}

/// Longest prefix of `text` that fits in `max` bytes, cut on a char boundary.
fn truncate_bytes(text: &str, max: usize) -> &str {
    if text.len() <= max {
        return text;
    }
    let mut end = max;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

fn or_fallback(name: String) -> String {
    if name.is_empty() {
        FALLBACK_NAME.to_string()
    } else {
        name
    }
}
