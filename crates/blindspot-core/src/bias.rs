use serde::{Deserialize, Serialize};

/// Political lean attached to a media outlet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BiasLabel {
    Left,
    Center,
    Right,
}

impl BiasLabel {
    /// Fixed label order used wherever deterministic iteration matters:
    /// rounding-correction and verdict tie-breaks resolve to the first label
    /// in this order, and reports render labels in this order.
    pub const ALL: [BiasLabel; 3] = [BiasLabel::Left, BiasLabel::Center, BiasLabel::Right];

    /// Signed contribution of one article to a cluster's bias score.
    #[must_use]
    pub fn score(self) -> f64 {
        match self {
            BiasLabel::Left => -1.0,
            BiasLabel::Center => 0.0,
            BiasLabel::Right => 1.0,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            BiasLabel::Left => "left",
            BiasLabel::Center => "center",
            BiasLabel::Right => "right",
        }
    }

    /// Parse a label from its string form, case-insensitively.
    #[must_use]
    pub fn parse(s: &str) -> Option<BiasLabel> {
        match s.to_ascii_lowercase().as_str() {
            "left" => Some(BiasLabel::Left),
            "center" => Some(BiasLabel::Center),
            "right" => Some(BiasLabel::Right),
            _ => None,
        }
    }
}

impl std::fmt::Display for BiasLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Qualitative bias classification of one cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    LeftDominant,
    CenterDominant,
    RightDominant,
    Balanced,
}

impl Verdict {
    /// The dominant verdict form for a bias label.
    #[must_use]
    pub fn dominant_for(label: BiasLabel) -> Verdict {
        match label {
            BiasLabel::Left => Verdict::LeftDominant,
            BiasLabel::Center => Verdict::CenterDominant,
            BiasLabel::Right => Verdict::RightDominant,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Verdict::LeftDominant => "left dominant",
            Verdict::CenterDominant => "center dominant",
            Verdict::RightDominant => "right dominant",
            Verdict::Balanced => "balanced",
        }
    }

    /// Parse a verdict from its display form.
    #[must_use]
    pub fn parse(s: &str) -> Option<Verdict> {
        match s {
            "left dominant" => Some(Verdict::LeftDominant),
            "center dominant" => Some(Verdict::CenterDominant),
            "right dominant" => Some(Verdict::RightDominant),
            "balanced" => Some(Verdict::Balanced),
            _ => None,
        }
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
