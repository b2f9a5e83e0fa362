use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::label::Labeled;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum TradeAction {
    Buy,
    Sell,
    Hold,
}

impl Labeled for TradeAction {
    const ALL: &'static [Self] = &[TradeAction::Buy, TradeAction::Sell, TradeAction::Hold];

    fn label(self) -> &'static str {
        match self {
            TradeAction::Buy => "BUY",
            TradeAction::Sell => "SELL",
            TradeAction::Hold => "HOLD",
        }
    }
}

impl fmt::Display for TradeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Candidate trade proposed by the trader stage.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TraderDecision {
    pub action: TradeAction,
    /// Empty whenever `action` is `Hold`.
    pub symbols: Vec<String>,
    pub reasoning: String,
    /// 0.0 to 1.0.
    pub conviction: Decimal,
    /// 0 to 100.
    pub position_size_pct: Option<Decimal>,
    pub raw_output: String,
}

impl TraderDecision {
    /// A BUY/SELL that names no symbol. Downstream stages treat it as no trade.
    pub fn is_abstain(&self) -> bool {
        self.action != TradeAction::Hold && self.symbols.is_empty()
    }
}

/// Terminal, execution-ready decision of the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FundManagerDecision {
    pub approved: bool,
    pub final_action: TradeAction,
    pub final_symbols: Vec<String>,
    pub position_size_pct: Option<Decimal>,
    pub risk_adjustments_applied: Vec<String>,
    pub rationale: String,
    pub raw_output: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn action_serializes_uppercase() {
        assert_eq!(serde_json::to_string(&TradeAction::Sell).unwrap(), "\"SELL\"");
        let parsed: TradeAction = serde_json::from_str("\"HOLD\"").unwrap();
        assert_eq!(parsed, TradeAction::Hold);
    }

    #[test]
    fn buy_without_symbols_is_abstain() {
        let decision = TraderDecision {
            action: TradeAction::Buy,
            symbols: vec![],
            reasoning: String::new(),
            conviction: dec!(0.5),
            position_size_pct: None,
            raw_output: String::new(),
        };
        assert!(decision.is_abstain());

        let hold = TraderDecision {
            action: TradeAction::Hold,
            ..decision
        };
        assert!(!hold.is_abstain());
    }
}
