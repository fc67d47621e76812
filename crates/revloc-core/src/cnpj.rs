//! CNPJ (Brazilian company registry identifier) normalization.
//!
//! Spreadsheet exports frequently mangle the identifier into a float such as
//! `1.2345678000195E13`, so [`normalize`] recovers that form before padding.

use std::sync::LazyLock;

use regex::Regex;

/// Number of digits in a normalized CNPJ.
pub const CNPJ_DIGITS: usize = 14;

static SCIENTIFIC_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[+]?\d+(?:[.,]\d+)?[eE][+]?\d+$").expect("valid regex"));

/// Normalize a raw CNPJ into its digit-only, zero-padded form.
///
/// - Scientific notation is converted back into an integer first.
/// - Every non-digit character is removed.
/// - The result is left-padded with zeros to 14 digits. Longer inputs are
///   returned as-is and fail [`validate`].
#[must_use]
pub fn normalize(raw: &str) -> String {
    let trimmed = raw.trim();
    let clean = from_scientific(trimmed).unwrap_or_else(|| {
        trimmed
            .chars()
            .filter(char::is_ascii_digit)
            .collect::<String>()
    });
    format!("{clean:0>CNPJ_DIGITS$}")
}

/// A CNPJ is valid when it carries at least one digit and its normalized
/// form is exactly 14 ASCII digits.
#[must_use]
pub fn validate(raw: &str) -> bool {
    if !is_present(raw) {
        return false;
    }
    let normalized = normalize(raw);
    normalized.len() == CNPJ_DIGITS && normalized.bytes().all(|b| b.is_ascii_digit())
}

/// Whether the raw value carries any digits at all.
///
/// Records with a blank identifier are not enrichment candidates even though
/// [`normalize`] would pad them to fourteen zeros.
#[must_use]
pub fn is_present(raw: &str) -> bool {
    raw.chars().any(|c| c.is_ascii_digit())
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn from_scientific(value: &str) -> Option<String> {
    if !SCIENTIFIC_RE.is_match(value) {
        return None;
    }
    let parsed: f64 = value.replace(',', ".").parse().ok()?;
    if !parsed.is_finite() || parsed < 0.0 || parsed >= 1e14 {
        return None;
    }
    Some(format!("{:0>CNPJ_DIGITS$}", parsed.round() as u64))
}
