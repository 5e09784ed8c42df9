//! Maps stored color tokens to display hex values.
//!
//! Client colors were originally stored as one of six named tokens; rows
//! written after the hex migration store a `#RRGGBB` string directly.
//! Resolution is total: unknown tokens fall back to the slate hex.

/// Hex value used for the `slate` token and for anything unrecognized.
pub const FALLBACK_HEX: &str = "#94A3B8";

const LEGACY_TOKENS: [(&str, &str); 6] = [
    ("slate", FALLBACK_HEX),
    ("violet", "#8B5CF6"),
    ("blue", "#3B82F6"),
    ("teal", "#14B8A6"),
    ("amber", "#F59E0B"),
    ("rose", "#F43F5E"),
];

/// Resolve a stored color token to a CSS hex string.
///
/// Hex input passes through unchanged; legacy named tokens map to their
/// fixed hex values; anything else resolves to [`FALLBACK_HEX`].
#[must_use]
pub fn resolve(token: &str) -> &str {
    if token.starts_with('#') {
        return token;
    }
    LEGACY_TOKENS
        .iter()
        .find(|(name, _)| *name == token)
        .map_or(FALLBACK_HEX, |(_, hex)| hex)
}
