//! Spam heuristic types

use serde::{Deserialize, Serialize};

/// A surface feature that contributes to the heuristic spam score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SpamSignal {
    /// More than one http(s) link
    Links,
    /// A character repeated five or more times in a row
    RepeatedChars,
    /// Every cased character is uppercase
    AllCaps,
    /// At least one word appears twice
    RepeatedWords,
}

impl SpamSignal {
    /// All signals, in evaluation order
    pub const ALL: [SpamSignal; 4] = [
        SpamSignal::Links,
        SpamSignal::RepeatedChars,
        SpamSignal::AllCaps,
        SpamSignal::RepeatedWords,
    ];

    /// Weight in tenths of a point
    pub fn weight_tenths(&self) -> u32 {
        match self {
            SpamSignal::Links => 4,
            SpamSignal::RepeatedChars => 3,
            SpamSignal::AllCaps => 2,
            SpamSignal::RepeatedWords => 1,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            SpamSignal::Links => "LINKS",
            SpamSignal::RepeatedChars => "REPEATED_CHARS",
            SpamSignal::AllCaps => "ALL_CAPS",
            SpamSignal::RepeatedWords => "REPEATED_WORDS",
        }
    }
}

/// Heuristic scoring result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeuristicScore {
    /// Spam likelihood in [0, 1]
    pub score: f64,
    /// Signals that fired
    pub signals: Vec<SpamSignal>,
}

impl HeuristicScore {
    pub fn zero() -> Self {
        Self {
            score: 0.0,
            signals: Vec::new(),
        }
    }

    pub fn has(&self, signal: SpamSignal) -> bool {
        self.signals.contains(&signal)
    }
}
