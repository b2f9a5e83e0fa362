use tracing::{info, warn};
use tradecouncil_models::{
    AgentTask, AnalystReport, DebatePipelineConfig, FundContext, InvestmentDebateResult,
    TradeAction, TraderDecision,
};

use crate::error::{AgentError, Stage};
use crate::fields::{
    CONVICTION, DEFAULT_CONVICTION, FINAL_ACTION, POSITION_SIZE_PCT, REASONING, SYMBOLS,
};
use crate::prompts::{render_analyst_reports, trader_prompt, trader_system_prompt};
use crate::runner::{Staged, TaskRunner};

pub const ROLE: &str = "trader";

/// Extract a trader decision from raw output and normalize it.
pub fn parse_trader_decision(text: &str) -> TraderDecision {
    normalize_trader_decision(TraderDecision {
        action: FINAL_ACTION.extract(text),
        symbols: SYMBOLS.extract(text),
        reasoning: REASONING.extract(text),
        conviction: CONVICTION.extract(text).unwrap_or(DEFAULT_CONVICTION),
        position_size_pct: POSITION_SIZE_PCT.extract(text),
        raw_output: text.to_string(),
    })
}

/// HOLD never carries symbols. A BUY/SELL without symbols is left alone and
/// treated downstream as an abstain.
pub fn normalize_trader_decision(mut decision: TraderDecision) -> TraderDecision {
    if decision.action == TradeAction::Hold {
        decision.symbols.clear();
    }
    decision
}

pub struct TraderStage<'a> {
    runner: &'a TaskRunner,
    config: &'a DebatePipelineConfig,
}

impl<'a> TraderStage<'a> {
    pub fn new(runner: &'a TaskRunner, config: &'a DebatePipelineConfig) -> Self {
        Self { runner, config }
    }

    pub async fn run(
        &self,
        context: &FundContext,
        reports: &[AnalystReport],
        debate: &InvestmentDebateResult,
        trade_memory: Option<&str>,
        model: Option<&str>,
    ) -> Result<Staged<TraderDecision>, AgentError> {
        let prompt = trader_prompt(context, &render_analyst_reports(reports), debate, trade_memory);
        let task = AgentTask::new("trader", ROLE, prompt)
            .with_system_prompt(trader_system_prompt())
            .with_model(model.map(str::to_string).or_else(|| self.config.model.clone()))
            .with_limits(&self.config.trader);

        let result = self.runner.run_decisive(Stage::Trader, &task).await?;
        let decision = parse_trader_decision(result.usable_text());

        if decision.is_abstain() {
            warn!(fund = %context.fund_id, action = %decision.action, "Trader named no symbols; treating as abstain");
        }
        info!(
            fund = %context.fund_id,
            action = %decision.action,
            symbols = ?decision.symbols,
            conviction = %decision.conviction,
            "Trader decision"
        );
        Ok(Staged::new(decision, result.cost_usd))
    }
}
