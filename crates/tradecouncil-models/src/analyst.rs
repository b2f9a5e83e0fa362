use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::label::Labeled;

/// Ternary directional opinion.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Signal {
    Bullish,
    Neutral,
    Bearish,
}

impl Labeled for Signal {
    const ALL: &'static [Self] = &[Signal::Bullish, Signal::Neutral, Signal::Bearish];

    fn label(self) -> &'static str {
        match self {
            Signal::Bullish => "bullish",
            Signal::Neutral => "neutral",
            Signal::Bearish => "bearish",
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Structured view of one successful analyst task.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnalystReport {
    pub analyst_type: String,
    pub analyst_name: String,
    pub signal: Signal,
    /// 0.0 to 1.0.
    pub confidence: Decimal,
    pub summary: String,
    pub key_findings: Vec<String>,
    pub raw_output: String,
}
