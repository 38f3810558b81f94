//! Status classification.
//!
//! Maps free-text status strings onto four coarse tiers, each with a fixed
//! color and glyph. Matching is exact and case-insensitive.

use serde::Serialize;
use serde_json::Value;
use std::fmt;

const HEALTHY_KEYWORDS: &[&str] = &["healthy", "up", "ok", "good"];
const WARNING_KEYWORDS: &[&str] = &["warning", "degraded", "slow"];
const CRITICAL_KEYWORDS: &[&str] = &["down", "fail", "error"];

/// Coarse health classification of a status string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusTier {
    Healthy,
    Warning,
    Critical,
    Unknown,
}

/// Display attributes for a tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Presentation {
    /// Hex color code (Okabe-Ito palette, colorblind-friendly).
    pub color: &'static str,
    pub glyph: &'static str,
}

impl StatusTier {
    pub const ALL: [StatusTier; 4] = [
        StatusTier::Healthy,
        StatusTier::Warning,
        StatusTier::Critical,
        StatusTier::Unknown,
    ];

    /// Classify a raw status string.
    pub fn classify(raw: &str) -> Self {
        let s = raw.to_lowercase();
        if HEALTHY_KEYWORDS.contains(&s.as_str()) {
            StatusTier::Healthy
        } else if WARNING_KEYWORDS.contains(&s.as_str()) {
            StatusTier::Warning
        } else if CRITICAL_KEYWORDS.contains(&s.as_str()) {
            StatusTier::Critical
        } else {
            StatusTier::Unknown
        }
    }

    /// Classify a JSON status field. Missing, null and non-string values are `Unknown`.
    pub fn classify_value(value: Option<&Value>) -> Self {
        match value {
            Some(Value::String(s)) => Self::classify(s),
            _ => StatusTier::Unknown,
        }
    }

    pub fn presentation(self) -> Presentation {
        match self {
            StatusTier::Healthy => Presentation { color: "#0072B2", glyph: "✅" },
            StatusTier::Warning => Presentation { color: "#E69F00", glyph: "⚠️" },
            StatusTier::Critical => Presentation { color: "#D55E00", glyph: "❌" },
            StatusTier::Unknown => Presentation { color: "#999999", glyph: "ℹ️" },
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            StatusTier::Healthy => "healthy",
            StatusTier::Warning => "warning",
            StatusTier::Critical => "critical",
            StatusTier::Unknown => "unknown",
        }
    }
}

impl fmt::Display for StatusTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
