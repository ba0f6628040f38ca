use serde::Serialize;

/// Fixed palette indexed by speaker number; ids beyond the palette fall back
/// to neutral gray.
pub const SPEAKER_PALETTE: [&str; 6] = [
    "#3B82F6", // blue
    "#EF4444", // red
    "#10B981", // green
    "#F59E0B", // yellow
    "#8B5CF6", // purple
    "#EC4899", // pink
];

pub const FALLBACK_COLOR: &str = "#374151";

/// Synthetic speaker id used for degenerate single-segment transcripts.
pub const DEFAULT_SPEAKER_ID: &str = "1";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Speaker {
    pub id: String,
    #[serde(rename = "name")]
    pub display_name: String,
    #[serde(rename = "color")]
    pub color_hex: String,
}

impl Speaker {
    /// Palette color for a speaker id. Numeric ids are treated as 1-based
    /// palette indices; anything else gets the gray fallback.
    pub fn color_for(id: &str) -> &'static str {
        id.trim()
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(|i| SPEAKER_PALETTE.get(i))
            .copied()
            .unwrap_or(FALLBACK_COLOR)
    }
}
