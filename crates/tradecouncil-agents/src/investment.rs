use rust_decimal::Decimal;
use tracing::info;
use tradecouncil_models::{
    AgentTask, AnalystReport, DebatePipelineConfig, FundContext, InvestmentDebateResult,
    InvestmentRole, Labeled,
};

use crate::debate::{extract_argument, TurnScheduler};
use crate::error::{AgentError, Stage};
use crate::fields::{
    CONFIDENCE, DEFAULT_CONFIDENCE, KEY_BEAR_ARGUMENTS, KEY_BULL_ARGUMENTS,
    PREVAILING_PERSPECTIVE, RATIONALE,
};
use crate::prompts::{
    debate_turn_prompt, investment_arbiter_prompt, investment_arbiter_system_prompt,
    investment_debater_system_prompt, render_analyst_reports,
};
use crate::runner::{Staged, TaskRunner};

pub const ARBITER_ROLE: &str = "investment_arbiter";

/// Bull/bear debate over the analyst reports, judged by one arbiter call.
pub struct InvestmentDebateEngine<'a> {
    runner: &'a TaskRunner,
    config: &'a DebatePipelineConfig,
}

impl<'a> InvestmentDebateEngine<'a> {
    pub fn new(runner: &'a TaskRunner, config: &'a DebatePipelineConfig) -> Self {
        Self { runner, config }
    }

    /// Always runs every configured round and always reaches the arbiter.
    /// Only an error thrown by the arbiter call aborts.
    pub async fn run(
        &self,
        context: &FundContext,
        reports: &[AnalystReport],
        model: Option<&str>,
    ) -> Result<Staged<InvestmentDebateResult>, AgentError> {
        let rounds = self.config.max_debate_rounds;
        info!(fund = %context.fund_id, rounds, "Starting investment debate");

        let model = model.map(str::to_string).or_else(|| self.config.model.clone());
        let analyst_block = render_analyst_reports(reports);
        let mut scheduler = TurnScheduler::new(InvestmentRole::ALL, rounds);
        let mut cost_usd = Decimal::ZERO;

        while let Some(turn) = scheduler.next_turn() {
            let role = turn.role.label();
            let prompt = debate_turn_prompt(
                context,
                &analyst_block,
                None,
                role,
                turn.round,
                rounds,
                &scheduler.context_for(turn.role),
            );
            let task = AgentTask::new(format!("debate-{role}-r{}", turn.round), role, prompt)
                .with_system_prompt(investment_debater_system_prompt(turn.role))
                .with_model(model.clone())
                .with_limits(&self.config.debate);

            let result = self.runner.run_one(&task).await;
            cost_usd += result.cost_usd;
            info!(role, round = turn.round, status = result.status.as_str(), "Debate turn complete");
            scheduler.record(extract_argument(role, turn.round, result.usable_text()));
        }

        let transcript = scheduler.transcript();
        let arbiter = AgentTask::new(
            "debate-arbiter",
            ARBITER_ROLE,
            investment_arbiter_prompt(context, &analyst_block, &transcript),
        )
        .with_system_prompt(investment_arbiter_system_prompt())
        .with_model(model)
        .with_limits(&self.config.debate);

        let verdict = self
            .runner
            .run_decisive(Stage::InvestmentDebate, &arbiter)
            .await?;
        cost_usd += verdict.cost_usd;
        let text = verdict.usable_text();

        let result = InvestmentDebateResult {
            prevailing_perspective: PREVAILING_PERSPECTIVE.extract(text),
            confidence: CONFIDENCE.extract(text).unwrap_or(DEFAULT_CONFIDENCE),
            rationale: RATIONALE.extract(text),
            key_bull_arguments: KEY_BULL_ARGUMENTS.extract(text),
            key_bear_arguments: KEY_BEAR_ARGUMENTS.extract(text),
            bull_history: scheduler.history(InvestmentRole::Bull),
            bear_history: scheduler.history(InvestmentRole::Bear),
            rounds_completed: scheduler.rounds_completed(),
        };

        info!(
            fund = %context.fund_id,
            verdict = %result.prevailing_perspective,
            confidence = %result.confidence,
            "Investment debate complete"
        );
        Ok(Staged::new(result, cost_usd))
    }
}
