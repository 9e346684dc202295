use serde::Serialize;

/// Named band of a 300–850 credit score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreBand {
    Poor,
    Fair,
    Good,
    Excellent,
}

impl ScoreBand {
    pub const fn ordered() -> [Self; 4] {
        [Self::Poor, Self::Fair, Self::Good, Self::Excellent]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Poor => "Poor",
            Self::Fair => "Fair",
            Self::Good => "Good",
            Self::Excellent => "Excellent",
        }
    }

    /// Lowest score in the band; `Poor` is open below.
    pub const fn floor(self) -> Option<i64> {
        match self {
            Self::Poor => None,
            Self::Fair => Some(601),
            Self::Good => Some(661),
            Self::Excellent => Some(781),
        }
    }
}

/// Classifies any integer score; values outside 300–850 use the same cut-offs.
pub const fn categorize(score: i64) -> ScoreBand {
    match score {
        i64::MIN..=600 => ScoreBand::Poor,
        601..=660 => ScoreBand::Fair,
        661..=780 => ScoreBand::Good,
        781..=i64::MAX => ScoreBand::Excellent,
    }
}
