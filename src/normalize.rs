//! Text normalization for keyword matching
//!
//! - Unicode NFKC fold (full-width forms, compatibility jamo, ideographic space)
//! - Lowercase conversion (Unicode-aware, not ASCII-only)
//! - Whitespace collapsing
//!
//! Hangul has no case, so lowercasing only affects Latin titles mixed into a
//! request ("Inception 같은 영화").

use unicode_normalization::UnicodeNormalization;

/// Normalize request text for rule matching.
///
/// Total and idempotent: normalizing already-normalized text returns it
/// unchanged.
///
/// ```
/// use recharge_router::normalize::normalize_text;
///
/// assert_eq!(normalize_text("  비가   오는 날  "), "비가 오는 날");
/// assert_eq!(normalize_text("INCEPTION 같은 영화"), "inception 같은 영화");
/// ```
pub fn normalize_text(text: &str) -> String {
    let folded: String = text.nfkc().collect();
    // lowercasing can enable a composition NFKC couldn't do on the capital
    // ("W\u{30A}" has no precomposed form, "w\u{30A}" is U+1E98), so fold again
    let lowered: String = folded.to_lowercase().nfkc().collect();
    lowered.split_whitespace().collect::<Vec<_>>().join(" ")
}
