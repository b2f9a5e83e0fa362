use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use tracing::{error, info};
use tradecouncil_models::{
    AnalystReport, DebatePipelineConfig, DebatePipelineResult, FundContext, PipelineOverrides,
};
use uuid::Uuid;

use crate::analyst::AnalystStage;
use crate::error::AgentError;
use crate::executor::AgentExecutor;
use crate::fund_manager::FundManagerStage;
use crate::investment::InvestmentDebateEngine;
use crate::risk::RiskDebateEngine;
use crate::runner::TaskRunner;
use crate::trader::TraderStage;

/// Runs analysts, investment debate, trader, risk debate and fund manager
/// strictly in that order and assembles the result.
pub struct PipelineOrchestrator {
    runner: TaskRunner,
    config: DebatePipelineConfig,
}

impl PipelineOrchestrator {
    pub fn new(executor: Arc<dyn AgentExecutor>, config: DebatePipelineConfig) -> Self {
        Self {
            runner: TaskRunner::new(executor),
            config,
        }
    }

    pub fn config(&self) -> &DebatePipelineConfig {
        &self.config
    }

    /// Run every stage. Either returns a fully populated result or the error
    /// of the single-call stage that aborted the run.
    pub async fn run_pipeline(
        &self,
        context: &FundContext,
        overrides: &PipelineOverrides,
    ) -> Result<DebatePipelineResult, AgentError> {
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        let start = Instant::now();
        info!(%run_id, fund = %context.fund_id, "Starting debate pipeline");

        let result = self.run_stages(run_id, started_at, context, overrides).await;
        match &result {
            Ok(result) => info!(
                %run_id,
                fund = %context.fund_id,
                approved = result.fund_manager_decision.approved,
                action = %result.fund_manager_decision.final_action,
                total_cost_usd = %result.total_cost_usd,
                elapsed_ms = start.elapsed().as_millis() as u64,
                "Debate pipeline complete"
            ),
            Err(e) => error!(%run_id, fund = %context.fund_id, error = %e, "Debate pipeline aborted"),
        }
        result
    }

    async fn run_stages(
        &self,
        run_id: Uuid,
        started_at: DateTime<Utc>,
        context: &FundContext,
        overrides: &PipelineOverrides,
    ) -> Result<DebatePipelineResult, AgentError> {
        let model = overrides.model.as_deref();
        let trade_memory = if self.config.include_trade_memory {
            overrides.trade_memory_text.as_deref()
        } else {
            None
        };

        // 1. Analysts in parallel
        let analysts = AnalystStage::new(&self.runner, &self.config)
            .run(context, model)
            .await;
        let reports = &analysts.output.reports;

        // 2. Bull/bear debate
        let debate = InvestmentDebateEngine::new(&self.runner, &self.config)
            .run(context, reports, model)
            .await?;

        // 3. Trade proposal
        let trader = TraderStage::new(&self.runner, &self.config)
            .run(context, reports, &debate.output, trade_memory, model)
            .await?;

        // 4. Three-way risk debate
        let risk = RiskDebateEngine::new(&self.runner, &self.config)
            .run(context, reports, &trader.output, model)
            .await?;

        // 5. Final decision
        let manager = FundManagerStage::new(&self.runner, &self.config)
            .run(
                context,
                &trader.output,
                &risk.output,
                &debate.output,
                trade_memory,
                model,
            )
            .await?;

        let total_cost_usd =
            analysts.cost_usd + debate.cost_usd + trader.cost_usd + risk.cost_usd + manager.cost_usd;

        Ok(DebatePipelineResult {
            run_id,
            fund_id: context.fund_id.clone(),
            started_at,
            ended_at: Utc::now(),
            config: self.config.clone(),
            analyst_tasks: analysts.output.tasks,
            analyst_reports: analysts.output.reports,
            investment_debate: debate.output,
            trader_decision: trader.output,
            risk_debate: risk.output,
            fund_manager_decision: manager.output,
            total_cost_usd,
        })
    }

    /// Analyst fan-out on its own, for standalone use.
    pub async fn run_analyst_stage_only(
        &self,
        context: &FundContext,
        overrides: &PipelineOverrides,
    ) -> Vec<AnalystReport> {
        AnalystStage::new(&self.runner, &self.config)
            .run(context, overrides.model.as_deref())
            .await
            .output
            .reports
    }
}
