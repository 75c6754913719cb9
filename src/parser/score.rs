use std::fmt;

use serde::Serialize;

/// Template total when every category scores 3.
pub const DEFAULT_MAX_TOTAL: f64 = 30.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ScoreLabel {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl fmt::Display for ScoreLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ScoreLabel::Excellent => "Excellent",
            ScoreLabel::Good => "Good",
            ScoreLabel::Fair => "Fair",
            ScoreLabel::Poor => "Poor",
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NormalizedScore {
    pub value: Option<f64>,
    pub label: Option<ScoreLabel>,
}

/// Rescale a raw total over `max_total` into a clamped 0-100 score with its
/// qualitative label. A missing total or non-positive `max_total` yields an
/// absent score, never a division fault.
pub fn normalize(raw_total: Option<f64>, max_total: f64) -> NormalizedScore {
    let Some(raw) = raw_total else {
        return NormalizedScore::default();
    };
    if max_total <= 0.0 {
        return NormalizedScore::default();
    }
    let value = (raw / max_total * 100.0).clamp(0.0, 100.0);
    NormalizedScore {
        value: Some(value),
        label: Some(label_for(value)),
    }
}

fn label_for(value: f64) -> ScoreLabel {
    if value >= 85.0 {
        ScoreLabel::Excellent
    } else if value >= 70.0 {
        ScoreLabel::Good
    } else if value >= 50.0 {
        ScoreLabel::Fair
    } else {
        ScoreLabel::Poor
    }
}

// ── Tests ──
