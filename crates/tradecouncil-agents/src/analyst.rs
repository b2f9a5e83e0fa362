use tracing::{info, warn};
use tradecouncil_models::{
    AgentTask, AgentTaskResult, AnalystConfig, AnalystReport, DebatePipelineConfig, FundContext,
    TaskSummary,
};

use crate::fields::{CONFIDENCE, DEFAULT_CONFIDENCE, KEY_FINDINGS, SIGNAL, SUMMARY};
use crate::prompts::{analyst_prompt, analyst_system_prompt};
use crate::runner::{total_cost, Staged, TaskRunner};

/// Status of every analyst task plus the reports of those that succeeded.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalystStageOutput {
    pub tasks: Vec<TaskSummary>,
    pub reports: Vec<AnalystReport>,
}

/// Roster position keeps ids distinct when two analysts share a type.
pub fn task_id(index: usize, analyst: &AnalystConfig) -> String {
    format!("analyst-{}-{}", index + 1, analyst.analyst_type)
}

/// Structured report from one successful analyst task.
pub fn build_report(analyst: &AnalystConfig, result: &AgentTaskResult) -> AnalystReport {
    let text = result.usable_text();
    AnalystReport {
        analyst_type: analyst.analyst_type.clone(),
        analyst_name: analyst.name.clone(),
        signal: SIGNAL.extract(text),
        confidence: CONFIDENCE.extract(text).unwrap_or(DEFAULT_CONFIDENCE),
        summary: SUMMARY.extract(text),
        key_findings: KEY_FINDINGS.extract(text),
        raw_output: result.output_text.clone(),
    }
}

/// Fans the analyst roster out in parallel and keeps the successes.
pub struct AnalystStage<'a> {
    runner: &'a TaskRunner,
    config: &'a DebatePipelineConfig,
}

impl<'a> AnalystStage<'a> {
    pub fn new(runner: &'a TaskRunner, config: &'a DebatePipelineConfig) -> Self {
        Self { runner, config }
    }

    /// Run every enabled analyst from the configuration.
    pub async fn run(
        &self,
        context: &FundContext,
        model: Option<&str>,
    ) -> Staged<AnalystStageOutput> {
        let analysts: Vec<AnalystConfig> = self.config.enabled_analysts().cloned().collect();
        self.run_with(context, &analysts, model).await
    }

    /// Run a caller-supplied analyst set. Zero successes is a valid result.
    pub async fn run_with(
        &self,
        context: &FundContext,
        analysts: &[AnalystConfig],
        model: Option<&str>,
    ) -> Staged<AnalystStageOutput> {
        info!(fund = %context.fund_id, analysts = analysts.len(), "Starting analyst stage");

        let prompt = analyst_prompt(context);
        let tasks: Vec<AgentTask> = analysts
            .iter()
            .enumerate()
            .map(|(index, analyst)| {
                let resolved_model = model
                    .map(str::to_string)
                    .or_else(|| analyst.model.clone())
                    .or_else(|| self.config.model.clone());
                AgentTask::new(task_id(index, analyst), analyst.analyst_type.clone(), prompt.clone())
                    .with_system_prompt(analyst_system_prompt(analyst))
                    .with_model(resolved_model)
                    .with_limits(&self.config.analyst)
            })
            .collect();

        let results = self.runner.run_all(tasks).await;

        // Results come back in roster order.
        let reports: Vec<AnalystReport> = analysts
            .iter()
            .zip(&results)
            .filter(|(_, result)| result.is_success())
            .map(|(analyst, result)| build_report(analyst, result))
            .collect();

        if reports.is_empty() {
            warn!(fund = %context.fund_id, "No analyst succeeded; continuing with empty reports");
        } else {
            info!(
                fund = %context.fund_id,
                succeeded = reports.len(),
                failed = results.len() - reports.len(),
                "Analyst stage complete"
            );
        }

        Staged::new(
            AnalystStageOutput {
                tasks: results.iter().map(TaskSummary::from).collect(),
                reports,
            },
            total_cost(&results),
        )
    }
}
