use rust_decimal::Decimal;
use tracing::info;
use tradecouncil_models::{
    AgentTask, AnalystReport, DebatePipelineConfig, FundContext, Labeled, PerspectiveSummaries,
    RiskDebateResult, RiskPerspective, TraderDecision,
};

use crate::debate::{extract_argument, TurnScheduler};
use crate::error::{AgentError, Stage};
use crate::fields::{
    ADJUSTED_ACTION, AGGRESSIVE_SUMMARY, APPROVED, CONSERVATIVE_SUMMARY, NEUTRAL_SUMMARY,
    RATIONALE, RISK_ADJUSTMENTS,
};
use crate::prompts::{
    debate_turn_prompt, render_analyst_reports, risk_arbiter_prompt, risk_arbiter_system_prompt,
    risk_debater_system_prompt, trade_subject,
};
use crate::runner::{Staged, TaskRunner};

pub const ARBITER_ROLE: &str = "risk_arbiter";

/// Three-way debate over the trader's proposal. Perspectives speak in the
/// fixed order aggressive, conservative, neutral; each sees the latest
/// argument of the other two.
pub struct RiskDebateEngine<'a> {
    runner: &'a TaskRunner,
    config: &'a DebatePipelineConfig,
}

impl<'a> RiskDebateEngine<'a> {
    pub fn new(runner: &'a TaskRunner, config: &'a DebatePipelineConfig) -> Self {
        Self { runner, config }
    }

    pub async fn run(
        &self,
        context: &FundContext,
        reports: &[AnalystReport],
        decision: &TraderDecision,
        model: Option<&str>,
    ) -> Result<Staged<RiskDebateResult>, AgentError> {
        let rounds = self.config.max_risk_debate_rounds;
        info!(fund = %context.fund_id, rounds, action = %decision.action, "Starting risk debate");

        let model = model.map(str::to_string).or_else(|| self.config.model.clone());
        let analyst_block = render_analyst_reports(reports);
        let subject = trade_subject(decision);
        let mut scheduler = TurnScheduler::new(RiskPerspective::ALL, rounds);
        let mut cost_usd = Decimal::ZERO;

        while let Some(turn) = scheduler.next_turn() {
            let role = turn.role.label();
            let prompt = debate_turn_prompt(
                context,
                &analyst_block,
                Some(&subject),
                role,
                turn.round,
                rounds,
                &scheduler.context_for(turn.role),
            );
            let task = AgentTask::new(format!("risk-{role}-r{}", turn.round), role, prompt)
                .with_system_prompt(risk_debater_system_prompt(turn.role))
                .with_model(model.clone())
                .with_limits(&self.config.risk);

            let result = self.runner.run_one(&task).await;
            cost_usd += result.cost_usd;
            info!(role, round = turn.round, status = result.status.as_str(), "Risk turn complete");
            scheduler.record(extract_argument(role, turn.round, result.usable_text()));
        }

        let arbiter = AgentTask::new(
            "risk-arbiter",
            ARBITER_ROLE,
            risk_arbiter_prompt(context, decision, &scheduler.transcript()),
        )
        .with_system_prompt(risk_arbiter_system_prompt())
        .with_model(model)
        .with_limits(&self.config.risk);

        let verdict = self.runner.run_decisive(Stage::RiskDebate, &arbiter).await?;
        cost_usd += verdict.cost_usd;
        let text = verdict.usable_text();

        let result = RiskDebateResult {
            approved: APPROVED.extract(text),
            adjusted_action: ADJUSTED_ACTION.extract(text),
            risk_adjustments: RISK_ADJUSTMENTS.extract(text),
            rationale: RATIONALE.extract(text),
            perspective_summaries: PerspectiveSummaries {
                aggressive: AGGRESSIVE_SUMMARY.extract(text),
                conservative: CONSERVATIVE_SUMMARY.extract(text),
                neutral: NEUTRAL_SUMMARY.extract(text),
            },
            aggressive_history: scheduler.history(RiskPerspective::Aggressive),
            conservative_history: scheduler.history(RiskPerspective::Conservative),
            neutral_history: scheduler.history(RiskPerspective::Neutral),
            rounds_completed: scheduler.rounds_completed(),
        };

        info!(
            fund = %context.fund_id,
            approved = result.approved,
            adjusted_action = %result.adjusted_action,
            "Risk debate complete"
        );
        Ok(Staged::new(result, cost_usd))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::DEFAULT_APPROVED;
    use crate::prompts::NO_ARGUMENT;
    use crate::test_support::{argument_reply, Script, ScriptedExecutor, RISK_APPROVED, TRADER_BUY};
    use crate::trader::parse_trader_decision;
    use std::sync::Arc;
    use tradecouncil_models::TradeAction;

    fn context() -> FundContext {
        FundContext {
            fund_id: "alpha".to_string(),
            briefing: "Growth fund".to_string(),
            universe: vec![],
        }
    }

    fn config(rounds: u32) -> DebatePipelineConfig {
        DebatePipelineConfig {
            max_risk_debate_rounds: rounds,
            ..DebatePipelineConfig::default()
        }
    }

    fn perspectives() -> ScriptedExecutor {
        ScriptedExecutor::new()
            .on("aggressive", Script::Reply(argument_reply("go big")))
            .on("conservative", Script::Reply(argument_reply("stay small")))
            .on("neutral", Script::Reply(argument_reply("meet halfway")))
            .on(ARBITER_ROLE, Script::reply(RISK_APPROVED))
    }

    #[tokio::test]
    async fn perspectives_run_in_fixed_order_each_round() {
        let executor = Arc::new(perspectives());
        let runner = TaskRunner::new(executor.clone());
        let config = config(2);

        let result = RiskDebateEngine::new(&runner, &config)
            .run(&context(), &[], &parse_trader_decision(TRADER_BUY), None)
            .await
            .unwrap()
            .output;

        assert_eq!(
            executor.roles_called().await,
            vec![
                "aggressive",
                "conservative",
                "neutral",
                "aggressive",
                "conservative",
                "neutral",
                ARBITER_ROLE
            ]
        );
        assert_eq!(result.rounds_completed, 2);
        for perspective in RiskPerspective::ALL {
            assert_eq!(result.history(*perspective).len(), 2);
        }
        assert!(result.approved);
        assert_eq!(result.adjusted_action, TradeAction::Buy);
        assert_eq!(result.risk_adjustments.len(), 2);
        assert_eq!(
            result.perspective_summaries.get(RiskPerspective::Conservative),
            "Would cap at 2% given valuation."
        );
    }

    #[tokio::test]
    async fn later_perspectives_see_current_round() {
        let executor = Arc::new(
            perspectives()
                .then("aggressive", Script::Reply(argument_reply("agg round one")))
                .then("conservative", Script::Reply(argument_reply("con round one"))),
        );
        let runner = TaskRunner::new(executor.clone());
        let config = config(2);

        RiskDebateEngine::new(&runner, &config)
            .run(&context(), &[], &parse_trader_decision(TRADER_BUY), None)
            .await
            .unwrap();

        let neutral = executor.prompts_for("neutral").await;
        assert!(neutral[0].contains("agg round one"));
        assert!(neutral[0].contains("con round one"));

        let aggressive = executor.prompts_for("aggressive").await;
        assert!(aggressive[0].contains("You speak first"));
        assert!(aggressive[0].contains("Symbols: AAPL, MSFT"));
        assert!(aggressive[1].contains("con round one"));
        assert!(aggressive[1].contains("meet halfway"));
    }

    #[tokio::test]
    async fn failed_perspective_yields_empty_argument() {
        let executor = Arc::new(perspectives().on("conservative", Script::Fail("overloaded".to_string())));
        let runner = TaskRunner::new(executor.clone());
        let config = config(2);

        let result = RiskDebateEngine::new(&runner, &config)
            .run(&context(), &[], &parse_trader_decision(TRADER_BUY), None)
            .await
            .unwrap()
            .output;

        assert_eq!(result.conservative_history.len(), 2);
        assert!(result.conservative_history.iter().all(|a| a.is_empty()));
        assert_eq!(result.neutral_history.len(), 2);
        assert!(executor.prompts_for("neutral").await[0].contains(NO_ARGUMENT));
    }

    #[tokio::test]
    async fn unparseable_verdict_uses_defaults() {
        let executor = Arc::new(perspectives().on(ARBITER_ROLE, Script::reply("I cannot decide.")));
        let runner = TaskRunner::new(executor);
        let config = config(1);

        let result = RiskDebateEngine::new(&runner, &config)
            .run(&context(), &[], &parse_trader_decision(TRADER_BUY), None)
            .await
            .unwrap()
            .output;
        assert_eq!(result.approved, DEFAULT_APPROVED);
        assert_eq!(result.adjusted_action, TradeAction::Hold);
        assert!(result.risk_adjustments.is_empty());
        assert_eq!(result.perspective_summaries.neutral, "");
    }

    #[tokio::test]
    async fn arbiter_error_aborts() {
        let executor = Arc::new(perspectives().on(ARBITER_ROLE, Script::Throw("gone".to_string())));
        let runner = TaskRunner::new(executor);
        let config = config(1);

        let err = RiskDebateEngine::new(&runner, &config)
            .run(&context(), &[], &parse_trader_decision(TRADER_BUY), None)
            .await
            .unwrap_err();
        assert_eq!(err.stage(), Some(Stage::RiskDebate));
    }
}
