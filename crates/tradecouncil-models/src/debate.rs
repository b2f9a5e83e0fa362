use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::analyst::Signal;
use crate::decision::TradeAction;
use crate::label::Labeled;

/// The two sides of the investment debate.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum InvestmentRole {
    Bull,
    Bear,
}

impl Labeled for InvestmentRole {
    const ALL: &'static [Self] = &[InvestmentRole::Bull, InvestmentRole::Bear];

    fn label(self) -> &'static str {
        match self {
            InvestmentRole::Bull => "bull",
            InvestmentRole::Bear => "bear",
        }
    }
}

/// The three fixed risk postures of the risk debate.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum RiskPerspective {
    Aggressive,
    Conservative,
    Neutral,
}

impl Labeled for RiskPerspective {
    const ALL: &'static [Self] = &[
        RiskPerspective::Aggressive,
        RiskPerspective::Conservative,
        RiskPerspective::Neutral,
    ];

    fn label(self) -> &'static str {
        match self {
            RiskPerspective::Aggressive => "aggressive",
            RiskPerspective::Conservative => "conservative",
            RiskPerspective::Neutral => "neutral",
        }
    }
}

impl fmt::Display for RiskPerspective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One turn of a debate. Never mutated after it is recorded.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DebateArgument {
    pub role: String,
    /// 1-based.
    pub round: u32,
    pub argument_text: String,
    pub key_points: Vec<String>,
    pub counterpoints: Vec<String>,
}

impl DebateArgument {
    /// The degraded argument recorded when a turn's task fails.
    pub fn empty(role: impl Into<String>, round: u32) -> Self {
        Self {
            role: role.into(),
            round,
            argument_text: String::new(),
            key_points: Vec::new(),
            counterpoints: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.argument_text.is_empty() && self.key_points.is_empty() && self.counterpoints.is_empty()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InvestmentDebateResult {
    pub prevailing_perspective: Signal,
    pub confidence: Decimal,
    pub rationale: String,
    pub key_bull_arguments: Vec<String>,
    pub key_bear_arguments: Vec<String>,
    pub bull_history: Vec<DebateArgument>,
    pub bear_history: Vec<DebateArgument>,
    pub rounds_completed: u32,
}

/// One-line positions of each risk posture, as written by the risk arbiter.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PerspectiveSummaries {
    pub aggressive: String,
    pub conservative: String,
    pub neutral: String,
}

impl PerspectiveSummaries {
    pub fn get(&self, perspective: RiskPerspective) -> &str {
        match perspective {
            RiskPerspective::Aggressive => &self.aggressive,
            RiskPerspective::Conservative => &self.conservative,
            RiskPerspective::Neutral => &self.neutral,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RiskDebateResult {
    pub approved: bool,
    pub adjusted_action: TradeAction,
    pub risk_adjustments: Vec<String>,
    pub rationale: String,
    pub perspective_summaries: PerspectiveSummaries,
    pub aggressive_history: Vec<DebateArgument>,
    pub conservative_history: Vec<DebateArgument>,
    pub neutral_history: Vec<DebateArgument>,
    pub rounds_completed: u32,
}

impl RiskDebateResult {
    pub fn history(&self, perspective: RiskPerspective) -> &[DebateArgument] {
        match perspective {
            RiskPerspective::Aggressive => &self.aggressive_history,
            RiskPerspective::Conservative => &self.conservative_history,
            RiskPerspective::Neutral => &self.neutral_history,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_argument_keeps_role_and_round() {
        let arg = DebateArgument::empty("bear", 2);
        assert_eq!(arg.role, "bear");
        assert_eq!(arg.round, 2);
        assert!(arg.is_empty());
    }

    #[test]
    fn perspective_order_is_fixed() {
        let labels: Vec<_> = RiskPerspective::ALL.iter().map(|p| p.label()).collect();
        assert_eq!(labels, vec!["aggressive", "conservative", "neutral"]);
    }

    #[test]
    fn summaries_lookup_by_perspective() {
        let summaries = PerspectiveSummaries {
            aggressive: "size up".to_string(),
            conservative: "cut it".to_string(),
            neutral: "keep it".to_string(),
        };
        assert_eq!(summaries.get(RiskPerspective::Conservative), "cut it");
    }
}
