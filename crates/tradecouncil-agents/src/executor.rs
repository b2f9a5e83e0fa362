//! The one capability the pipeline consumes: run a bounded generation task
//! and get back text plus cost metadata.

use std::time::Duration;

use async_trait::async_trait;
use rust_decimal::Decimal;
use tradecouncil_models::AgentTask;

use crate::error::AgentError;

/// Input to a single executor call.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionRequest {
    /// Role of the task (e.g. `macro`, `bull`, `risk_arbiter`). Used for logging and routing.
    pub role_label: String,
    pub prompt: String,
    pub system_prompt: Option<String>,
    pub model: Option<String>,
    pub max_turns: u32,
    pub timeout: Duration,
    pub max_budget_usd: Option<Decimal>,
    pub resume_session_id: Option<String>,
}

impl From<&AgentTask> for ExecutionRequest {
    fn from(task: &AgentTask) -> Self {
        Self {
            role_label: task.role_label.clone(),
            prompt: task.prompt.clone(),
            system_prompt: task.system_prompt.clone(),
            model: task.model_override.clone(),
            max_turns: task.max_turns,
            timeout: task.timeout,
            max_budget_usd: task.budget_cap,
            resume_session_id: None,
        }
    }
}

/// Output of a call that ran to completion.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionOutput {
    pub output_text: String,
    pub cost_usd: Decimal,
    pub num_turns: u32,
    pub session_id: Option<String>,
}

/// What the executor reports back. Reported failures are values, not errors:
/// an `Err` from [`AgentExecutor::execute`] means the call itself blew up.
#[derive(Debug, Clone, PartialEq)]
pub enum ExecutionOutcome {
    Completed(ExecutionOutput),
    Timeout,
    BudgetExceeded { cost_usd: Decimal },
    MaxTurnsExceeded { cost_usd: Decimal },
    Failed { message: String },
}

impl ExecutionOutcome {
    pub fn cost_usd(&self) -> Decimal {
        match self {
            ExecutionOutcome::Completed(output) => output.cost_usd,
            ExecutionOutcome::BudgetExceeded { cost_usd }
            | ExecutionOutcome::MaxTurnsExceeded { cost_usd } => *cost_usd,
            ExecutionOutcome::Timeout | ExecutionOutcome::Failed { .. } => Decimal::ZERO,
        }
    }
}

/// Runs agent tasks. Implementations must allow independent concurrent calls,
/// honor `request.timeout` as a hard wall-clock limit, and share no mutable
/// state between calls.
#[async_trait]
pub trait AgentExecutor: Send + Sync {
    async fn execute(&self, request: ExecutionRequest) -> Result<ExecutionOutcome, AgentError>;
}
