use tracing::info;
use tradecouncil_models::{
    AgentTask, DebatePipelineConfig, FundContext, FundManagerDecision, InvestmentDebateResult,
    RiskDebateResult, TraderDecision,
};

use crate::error::{AgentError, Stage};
use crate::fields::{
    APPROVED, FINAL_ACTION, FINAL_SYMBOLS, POSITION_SIZE_PCT, RATIONALE, RISK_ADJUSTMENTS_APPLIED,
};
use crate::prompts::{fund_manager_prompt, fund_manager_system_prompt};
use crate::runner::{Staged, TaskRunner};

pub const ROLE: &str = "fund_manager";

/// The terminal decision exactly as extracted. Nothing downstream overrides it.
pub fn parse_fund_manager_decision(text: &str) -> FundManagerDecision {
    FundManagerDecision {
        approved: APPROVED.extract(text),
        final_action: FINAL_ACTION.extract(text),
        final_symbols: FINAL_SYMBOLS.extract(text),
        position_size_pct: POSITION_SIZE_PCT.extract(text),
        risk_adjustments_applied: RISK_ADJUSTMENTS_APPLIED.extract(text),
        rationale: RATIONALE.extract(text),
        raw_output: text.to_string(),
    }
}

pub struct FundManagerStage<'a> {
    runner: &'a TaskRunner,
    config: &'a DebatePipelineConfig,
}

impl<'a> FundManagerStage<'a> {
    pub fn new(runner: &'a TaskRunner, config: &'a DebatePipelineConfig) -> Self {
        Self { runner, config }
    }

    pub async fn run(
        &self,
        context: &FundContext,
        trader: &TraderDecision,
        risk: &RiskDebateResult,
        debate: &InvestmentDebateResult,
        trade_memory: Option<&str>,
        model: Option<&str>,
    ) -> Result<Staged<FundManagerDecision>, AgentError> {
        let prompt = fund_manager_prompt(context, trader, risk, debate, trade_memory);
        let task = AgentTask::new("fund-manager", ROLE, prompt)
            .with_system_prompt(fund_manager_system_prompt())
            .with_model(model.map(str::to_string).or_else(|| self.config.model.clone()))
            .with_limits(&self.config.fund_manager);

        let result = self.runner.run_decisive(Stage::FundManager, &task).await?;
        let decision = parse_fund_manager_decision(result.usable_text());

        info!(
            fund = %context.fund_id,
            approved = decision.approved,
            action = %decision.final_action,
            symbols = ?decision.final_symbols,
            "Fund manager decision"
        );
        Ok(Staged::new(decision, result.cost_usd))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::DEFAULT_APPROVED;
    use crate::test_support::{Script, ScriptedExecutor, MANAGER_APPROVED, TRADER_BUY};
    use rust_decimal_macros::dec;
    use std::sync::Arc;
    use tradecouncil_models::{PerspectiveSummaries, Signal, TradeAction};

    #[test]
    fn approved_decision_is_extracted() {
        let decision = parse_fund_manager_decision(MANAGER_APPROVED);
        assert!(decision.approved);
        assert_eq!(decision.final_action, TradeAction::Buy);
        assert_eq!(decision.final_symbols, vec!["AAPL", "MSFT"]);
        assert_eq!(decision.position_size_pct, Some(dec!(3)));
        assert_eq!(decision.risk_adjustments_applied.len(), 2);
        assert_eq!(decision.rationale, "Approved at the risk-adjusted size.");
    }

    #[test]
    fn empty_output_is_an_unapproved_hold() {
        let decision = parse_fund_manager_decision("");
        assert_eq!(decision.approved, DEFAULT_APPROVED);
        assert_eq!(decision.final_action, TradeAction::Hold);
        assert!(decision.final_symbols.is_empty());
        assert_eq!(decision.position_size_pct, None);
    }

    #[test]
    fn rejection_keeps_extracted_fields() {
        let decision =
            parse_fund_manager_decision("APPROVED: no\nFINAL_ACTION: SELL\nFINAL_SYMBOLS: TSLA");
        assert!(!decision.approved);
        assert_eq!(decision.final_action, TradeAction::Sell);
        assert_eq!(decision.final_symbols, vec!["TSLA"]);
    }

    fn upstream() -> (TraderDecision, RiskDebateResult, InvestmentDebateResult) {
        let trader = crate::trader::parse_trader_decision(TRADER_BUY);
        let risk = RiskDebateResult {
            approved: true,
            adjusted_action: TradeAction::Buy,
            risk_adjustments: vec!["Cap combined position at 3%".to_string()],
            rationale: "sized down".to_string(),
            perspective_summaries: PerspectiveSummaries::default(),
            aggressive_history: vec![],
            conservative_history: vec![],
            neutral_history: vec![],
            rounds_completed: 2,
        };
        let debate = InvestmentDebateResult {
            prevailing_perspective: Signal::Bullish,
            confidence: dec!(0.72),
            rationale: "momentum".to_string(),
            key_bull_arguments: vec![],
            key_bear_arguments: vec![],
            bull_history: vec![],
            bear_history: vec![],
            rounds_completed: 2,
        };
        (trader, risk, debate)
    }

    #[tokio::test]
    async fn prompt_carries_every_upstream_result() {
        let executor = Arc::new(ScriptedExecutor::new().on(ROLE, Script::reply(MANAGER_APPROVED)));
        let runner = TaskRunner::new(executor.clone());
        let config = DebatePipelineConfig::default();
        let (trader, risk, debate) = upstream();

        let staged = FundManagerStage::new(&runner, &config)
            .run(&FundContext::default(), &trader, &risk, &debate, Some("Trimmed MSFT"), None)
            .await
            .unwrap();
        assert!(staged.output.approved);
        assert_eq!(staged.cost_usd, dec!(0.01));

        let prompt = &executor.prompts_for(ROLE).await[0];
        assert!(prompt.contains("Cap combined position at 3%"));
        assert!(prompt.contains("Symbols: AAPL, MSFT"));
        assert!(prompt.contains("momentum"));
        assert!(prompt.contains("Trimmed MSFT"));
    }

    #[tokio::test]
    async fn thrown_error_is_fatal() {
        let executor = Arc::new(ScriptedExecutor::new().on(ROLE, Script::Throw("down".to_string())));
        let runner = TaskRunner::new(executor);
        let config = DebatePipelineConfig::default();
        let (trader, risk, debate) = upstream();

        let err = FundManagerStage::new(&runner, &config)
            .run(&FundContext::default(), &trader, &risk, &debate, None, None)
            .await
            .unwrap_err();
        assert_eq!(err.stage(), Some(Stage::FundManager));
    }
}
