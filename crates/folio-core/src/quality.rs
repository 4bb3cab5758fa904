//! Discrete rendering-fidelity tiers.

use crate::error::ParseQualityError;
use std::fmt;
use std::str::FromStr;

/// Rendering-fidelity tier, ordered `Minimal < Low < High`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum QualityLevel {
    Minimal,
    Low,
    High,
}

impl QualityLevel {
    /// All levels in cycling order.
    pub const ALL: [QualityLevel; 3] = [QualityLevel::Minimal, QualityLevel::Low, QualityLevel::High];

    pub fn as_str(self) -> &'static str {
        match self {
            QualityLevel::Minimal => "minimal",
            QualityLevel::Low => "low",
            QualityLevel::High => "high",
        }
    }

    /// Next level for the UI toggle; wraps from `High` back to `Minimal`.
    pub fn cycled(self) -> Self {
        match self {
            QualityLevel::Minimal => QualityLevel::Low,
            QualityLevel::Low => QualityLevel::High,
            QualityLevel::High => QualityLevel::Minimal,
        }
    }

    /// One step down, or `None` at the floor.
    pub fn degraded(self) -> Option<Self> {
        match self {
            QualityLevel::High => Some(QualityLevel::Low),
            QualityLevel::Low => Some(QualityLevel::Minimal),
            QualityLevel::Minimal => None,
        }
    }

    /// Parses a persisted value, treating anything unrecognised as absent.
    #[inline]
    pub fn from_persisted(raw: Option<&str>) -> Option<Self> {
        raw.and_then(|s| s.parse().ok())
    }
}

impl fmt::Display for QualityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QualityLevel {
    type Err = ParseQualityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "minimal" => Ok(QualityLevel::Minimal),
            "low" => Ok(QualityLevel::Low),
            "high" => Ok(QualityLevel::High),
            other => Err(ParseQualityError(other.to_string())),
        }
    }
}
