//! Concurrent task execution with per-task failure isolation.

use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use tracing::{error, info, warn};
use tradecouncil_models::{AgentTask, AgentTaskResult, TaskStatus};

use crate::error::{AgentError, Stage};
use crate::executor::{AgentExecutor, ExecutionOutcome, ExecutionRequest};

/// A stage's output together with what it cost to produce.
#[derive(Debug, Clone, PartialEq)]
pub struct Staged<T> {
    pub output: T,
    pub cost_usd: Decimal,
}

impl<T> Staged<T> {
    pub fn new(output: T, cost_usd: Decimal) -> Self {
        Self { output, cost_usd }
    }
}

/// Total spend across a set of task results.
pub fn total_cost(results: &[AgentTaskResult]) -> Decimal {
    results.iter().map(|r| r.cost_usd).sum()
}

/// Submits agent tasks to an executor and turns every outcome into an
/// [`AgentTaskResult`].
#[derive(Clone)]
pub struct TaskRunner {
    executor: Arc<dyn AgentExecutor>,
}

impl TaskRunner {
    pub fn new(executor: Arc<dyn AgentExecutor>) -> Self {
        Self { executor }
    }

    /// Run every task concurrently. Returns exactly one result per task, in
    /// input order, whatever mix of successes, timeouts, and errors occurs.
    pub async fn run_all(&self, tasks: Vec<AgentTask>) -> Vec<AgentTaskResult> {
        let mut handles = Vec::with_capacity(tasks.len());
        for task in tasks {
            let executor = Arc::clone(&self.executor);
            let identity = (task.id.clone(), task.role_label.clone());
            let handle = tokio::spawn(async move { execute_isolated(executor.as_ref(), &task).await });
            handles.push((identity, handle));
        }

        let mut results = Vec::with_capacity(handles.len());
        for ((id, role_label), handle) in handles {
            match handle.await {
                Ok(result) => results.push(result),
                Err(e) => {
                    error!(task_id = %id, error = %e, "Agent task panicked");
                    let now = Utc::now();
                    results.push(AgentTaskResult {
                        id,
                        role_label,
                        started_at: now,
                        ended_at: now,
                        status: TaskStatus::Error,
                        output_text: String::new(),
                        error_message: Some(format!("task panicked: {e}")),
                        cost_usd: Decimal::ZERO,
                        num_turns: 0,
                        session_id: None,
                    });
                }
            }
        }
        results
    }

    /// Run one task with the same isolation as [`TaskRunner::run_all`].
    pub async fn run_one(&self, task: &AgentTask) -> AgentTaskResult {
        execute_isolated(self.executor.as_ref(), task).await
    }

    /// Run a task that has no peers to fall back on. A reported failure still
    /// becomes a degraded result, but an error thrown by the executor aborts
    /// the calling stage.
    pub async fn run_decisive(
        &self,
        stage: Stage,
        task: &AgentTask,
    ) -> Result<AgentTaskResult, AgentError> {
        let started_at = Utc::now();
        let request = ExecutionRequest::from(task);
        match tokio::time::timeout(task.timeout, self.executor.execute(request)).await {
            Ok(Ok(outcome)) => Ok(to_result(task, started_at, outcome)),
            Ok(Err(e)) => {
                error!(task_id = %task.id, stage = %stage, error = %e, "Decisive task failed");
                Err(e.in_stage(stage))
            }
            Err(_) => Ok(to_result(task, started_at, ExecutionOutcome::Timeout)),
        }
    }
}

async fn execute_isolated(executor: &dyn AgentExecutor, task: &AgentTask) -> AgentTaskResult {
    let started_at = Utc::now();
    let request = ExecutionRequest::from(task);
    let outcome = match tokio::time::timeout(task.timeout, executor.execute(request)).await {
        Ok(Ok(outcome)) => outcome,
        Ok(Err(e)) => ExecutionOutcome::Failed {
            message: e.to_string(),
        },
        Err(_) => ExecutionOutcome::Timeout,
    };
    to_result(task, started_at, outcome)
}

fn to_result(task: &AgentTask, started_at: chrono::DateTime<Utc>, outcome: ExecutionOutcome) -> AgentTaskResult {
    let cost_usd = outcome.cost_usd();
    let (status, output_text, error_message, num_turns, session_id) = match outcome {
        ExecutionOutcome::Completed(output) => (
            TaskStatus::Success,
            output.output_text,
            None,
            output.num_turns,
            output.session_id,
        ),
        ExecutionOutcome::Timeout => (
            TaskStatus::Timeout,
            String::new(),
            Some(format!("timed out after {:?}", task.timeout)),
            0,
            None,
        ),
        ExecutionOutcome::BudgetExceeded { cost_usd } => (
            TaskStatus::Error,
            String::new(),
            Some(format!("budget exceeded (spent ${cost_usd})")),
            0,
            None,
        ),
        ExecutionOutcome::MaxTurnsExceeded { .. } => (
            TaskStatus::Error,
            String::new(),
            Some(format!("max turns exceeded ({})", task.max_turns)),
            task.max_turns,
            None,
        ),
        ExecutionOutcome::Failed { message } => {
            (TaskStatus::Error, String::new(), Some(message), 0, None)
        }
    };

    let result = AgentTaskResult {
        id: task.id.clone(),
        role_label: task.role_label.clone(),
        started_at,
        ended_at: Utc::now(),
        status,
        output_text,
        error_message,
        cost_usd,
        num_turns,
        session_id,
    };

    match result.status {
        TaskStatus::Success => info!(
            task_id = %result.id,
            role = %result.role_label,
            elapsed_ms = result.elapsed_ms(),
            cost_usd = %result.cost_usd,
            "Agent task succeeded"
        ),
        status => warn!(
            task_id = %result.id,
            role = %result.role_label,
            status = status.as_str(),
            error = result.error_message.as_deref().unwrap_or_default(),
            elapsed_ms = result.elapsed_ms(),
            "Agent task degraded"
        ),
    }

    result
}
