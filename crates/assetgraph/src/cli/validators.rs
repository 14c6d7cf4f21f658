//! CLI input validation functions.
//!
//! These validators are used by clap's `value_parser` attribute to validate
//! user input at parse time, providing immediate feedback for invalid values.

use crate::domain::AssetKey;

/// Validate and parse an asset key.
///
/// Segments are separated by `>`, or by `/` when the input has no `>`;
/// surrounding whitespace and empty segments are dropped. A JSON array of
/// segments is taken verbatim. Examples: `warehouse>orders`,
/// `warehouse/orders`, `["s3://bucket","raw"]`.
pub fn validate_asset_key(s: &str) -> Result<AssetKey, String> {
    let key = AssetKey::parse_user(s);
    if key.path.is_empty() {
        return Err(format!(
            "Invalid asset key: '{}'. Expected path segments separated by '>' or '/', or a JSON array of segments",
            s.trim()
        ));
    }
    Ok(key)
}
