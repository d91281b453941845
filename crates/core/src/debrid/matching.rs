//! Filename matching and presentation helpers shared by all provider
//! clients.

/// Quality tokens scanned for in filenames, highest resolution first.
const QUALITY_TOKENS: [&str; 5] = ["2160p", "1080p", "720p", "480p", "360p"];

const BYTE_UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

/// Test whether a filename corresponds to an external `tt<digits>`
/// identifier.
///
/// The `tt` prefix is stripped and the check is a case-insensitive
/// substring containment of either the bare digits or the full
/// `tt<digits>` token. Permissive on purpose: a numeric coincidence in the
/// filename counts as a match and there is no fuzzy fallback.
pub fn matches_external_id(filename: &str, external_id: &str) -> bool {
    if filename.is_empty() || external_id.is_empty() {
        return false;
    }

    let digits = external_id
        .strip_prefix("tt")
        .unwrap_or(external_id)
        .to_ascii_lowercase();
    if digits.is_empty() {
        return false;
    }

    let haystack = filename.to_ascii_lowercase();
    haystack.contains(&digits) || haystack.contains(&format!("tt{digits}"))
}

/// Extract the first known quality token from a filename.
pub fn extract_quality(filename: &str) -> &'static str {
    let haystack = filename.to_ascii_lowercase();
    QUALITY_TOKENS
        .iter()
        .find(|token| haystack.contains(*token))
        .copied()
        .unwrap_or("Unknown")
}

/// Render a byte count with binary (1024-based) units and at most one
/// decimal place.
pub fn format_bytes(bytes: u64) -> String {
    if bytes == 0 {
        return "0 B".to_string();
    }

    let exponent = ((bytes as f64).ln() / 1024f64.ln()).floor() as usize;
    let exponent = exponent.min(BYTE_UNITS.len() - 1);
    let value = bytes as f64 / 1024f64.powi(exponent as i32);

    let rendered = format!("{value:.1}");
    let rendered = rendered.strip_suffix(".0").unwrap_or(&rendered);
    format!("{rendered} {}", BYTE_UNITS[exponent])
}
