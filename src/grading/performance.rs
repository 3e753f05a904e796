// src/grading/performance.rs

use serde::Serialize;

/// Lower bound (inclusive) of the success tier.
pub const SUCCESS_THRESHOLD: f64 = 70.0;
/// Lower bound (inclusive) of the warning tier.
pub const WARNING_THRESHOLD: f64 = 50.0;

/// Qualitative performance bucket, best first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Success,
    Warning,
    Danger,
}

impl Tier {
    pub fn label(&self) -> &'static str {
        match self {
            Tier::Success => "Excellent Performance!",
            Tier::Warning => "Good Attempt!",
            Tier::Danger => "Needs Improvement",
        }
    }

    /// Display colour for the rendering layer.
    pub fn color_hex(&self) -> &'static str {
        match self {
            Tier::Success => "#4CAF50",
            Tier::Warning => "#FFC107",
            Tier::Danger => "#F44336",
        }
    }
}

/// Classifier output. Carries the presentation hints so callers need no lookup table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Performance {
    #[serde(rename = "status")]
    pub tier: Tier,
    pub message: &'static str,
    pub color_hex: &'static str,
}

impl From<Tier> for Performance {
    fn from(tier: Tier) -> Self {
        Self {
            tier,
            message: tier.label(),
            color_hex: tier.color_hex(),
        }
    }
}

/// Maps a percentage to a tier. Highest cutoff is checked first.
///
/// Out-of-range inputs are not rejected; NaN fails every comparison and lands in `Danger`.
pub fn classify(percentage: f64) -> Performance {
    let tier = if percentage >= SUCCESS_THRESHOLD {
        Tier::Success
    } else if percentage >= WARNING_THRESHOLD {
        Tier::Warning
    } else {
        Tier::Danger
    };
    Performance::from(tier)
}
