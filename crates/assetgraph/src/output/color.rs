//! Color and styling helpers for CLI output.
//!
//! Semantic Color Theme:
//!   - Good:                green  (fresh assets)
//!   - Old:                 yellow (a direct upstream is newer)
//!   - Downstream-from-old: red    (staleness inherited from upstream)
//!   - None:                dimmed (never materialized)
//!   - Reference:           cyan   (asset keys)
//!   - Emphasis:            bold   (section headers)

use crate::domain::AssetStatus;
use colored::Colorize;

use super::OutputConfig;

/// Apply semantic "success" color (green) to text.
pub fn success(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.green().to_string()
}

/// Apply semantic "error" color (red) to text.
pub fn error(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.red().to_string()
}

/// Apply color to status text based on asset status.
pub(crate) fn colorize_status(status: AssetStatus, config: &OutputConfig) -> String {
    let text = format!("{status}");
    if !config.use_colors {
        return text;
    }
    match status {
        AssetStatus::Good => text.green().to_string(),
        AssetStatus::Old => text.yellow().to_string(),
        AssetStatus::DownstreamFromOld => text.red().to_string(),
        AssetStatus::Unmaterialized => text.dimmed().to_string(),
    }
}

/// Get a colored status icon, with ASCII fallback support.
pub(crate) fn colored_status_icon(status: AssetStatus, config: &OutputConfig) -> String {
    let icon = if config.use_ascii {
        match status {
            AssetStatus::Good => "+",
            AssetStatus::Old => "!",
            AssetStatus::DownstreamFromOld => "~",
            AssetStatus::Unmaterialized => "o",
        }
    } else {
        match status {
            AssetStatus::Good => "✓",
            AssetStatus::Old => "⚠",
            AssetStatus::DownstreamFromOld => "↯",
            AssetStatus::Unmaterialized => "○",
        }
    };

    if !config.use_colors {
        return icon.to_string();
    }

    match status {
        AssetStatus::Good => icon.green().to_string(),
        AssetStatus::Old => icon.yellow().to_string(),
        AssetStatus::DownstreamFromOld => icon.red().to_string(),
        AssetStatus::Unmaterialized => icon.dimmed().to_string(),
    }
}

/// Colorize an asset key (cyan).
pub(crate) fn colorize_key(key: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return key.to_string();
    }
    key.cyan().to_string()
}

/// Apply dimmed style to text (for labels/field names).
pub(crate) fn dimmed(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.dimmed().to_string()
}

/// Apply bold style to text (for section headers).
pub(crate) fn bold(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.bold().to_string()
}
