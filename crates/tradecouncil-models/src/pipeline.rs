use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::analyst::AnalystReport;
use crate::config::DebatePipelineConfig;
use crate::debate::{InvestmentDebateResult, RiskDebateResult};
use crate::decision::{FundManagerDecision, TraderDecision};
use crate::task::{AgentTaskResult, TaskStatus};

/// Opaque input describing the fund a pipeline runs for.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct FundContext {
    pub fund_id: String,
    /// Caller-rendered portfolio, mandate and market context.
    pub briefing: String,
    /// Tickers the trader may propose.
    #[serde(default)]
    pub universe: Vec<String>,
}

/// Per-run overrides supplied by the caller.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PipelineOverrides {
    pub model: Option<String>,
    pub trade_memory_text: Option<String>,
}

/// Status line of one analyst task, kept whether or not it succeeded.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TaskSummary {
    pub id: String,
    pub role_label: String,
    pub status: TaskStatus,
    pub elapsed_ms: u64,
    pub cost_usd: Decimal,
    pub error_message: Option<String>,
}

impl From<&AgentTaskResult> for TaskSummary {
    fn from(result: &AgentTaskResult) -> Self {
        Self {
            id: result.id.clone(),
            role_label: result.role_label.clone(),
            status: result.status,
            elapsed_ms: result.elapsed_ms(),
            cost_usd: result.cost_usd,
            error_message: result.error_message.clone(),
        }
    }
}

/// Everything one pipeline run produced. Assembled once, never mutated.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DebatePipelineResult {
    pub run_id: Uuid,
    pub fund_id: String,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    pub config: DebatePipelineConfig,
    pub analyst_tasks: Vec<TaskSummary>,
    pub analyst_reports: Vec<AnalystReport>,
    pub investment_debate: InvestmentDebateResult,
    pub trader_decision: TraderDecision,
    pub risk_debate: RiskDebateResult,
    pub fund_manager_decision: FundManagerDecision,
    pub total_cost_usd: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn summary_copies_status_and_cost() {
        let now = Utc::now();
        let result = AgentTaskResult {
            id: "analyst-news".to_string(),
            role_label: "news".to_string(),
            started_at: now,
            ended_at: now + chrono::Duration::seconds(3),
            status: TaskStatus::Timeout,
            output_text: String::new(),
            error_message: Some("timed out after 3s".to_string()),
            cost_usd: dec!(0.02),
            num_turns: 0,
            session_id: None,
        };

        let summary = TaskSummary::from(&result);
        assert_eq!(summary.status, TaskStatus::Timeout);
        assert_eq!(summary.elapsed_ms, 3000);
        assert_eq!(summary.cost_usd, dec!(0.02));
        assert_eq!(summary.error_message.as_deref(), Some("timed out after 3s"));
    }

    #[test]
    fn fund_context_universe_is_optional() {
        let ctx: FundContext =
            serde_json::from_str(r#"{"fund_id": "alpha", "briefing": "long-only"}"#).unwrap();
        assert_eq!(ctx.fund_id, "alpha");
        assert!(ctx.universe.is_empty());
    }
}
