use std::time::Duration;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::StageLimits;

/// One bounded generation task. Immutable once handed to a runner.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentTask {
    pub id: String,
    pub role_label: String,
    pub prompt: String,
    /// Role instructions, kept apart from the task-specific prompt.
    pub system_prompt: Option<String>,
    pub model_override: Option<String>,
    pub max_turns: u32,
    pub timeout: Duration,
    pub budget_cap: Option<Decimal>,
}

impl AgentTask {
    pub fn new(id: impl Into<String>, role_label: impl Into<String>, prompt: String) -> Self {
        let limits = StageLimits::default();
        Self {
            id: id.into(),
            role_label: role_label.into(),
            prompt,
            system_prompt: None,
            model_override: None,
            max_turns: limits.max_turns,
            timeout: limits.timeout(),
            budget_cap: limits.budget_usd,
        }
    }

    pub fn with_system_prompt(mut self, system_prompt: String) -> Self {
        self.system_prompt = Some(system_prompt);
        self
    }

    pub fn with_model(mut self, model: Option<String>) -> Self {
        self.model_override = model;
        self
    }

    pub fn with_limits(mut self, limits: &StageLimits) -> Self {
        self.max_turns = limits.max_turns;
        self.timeout = limits.timeout();
        self.budget_cap = limits.budget_usd;
        self
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Success,
    Timeout,
    Error,
}

impl TaskStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            TaskStatus::Success => "success",
            TaskStatus::Timeout => "timeout",
            TaskStatus::Error => "error",
        }
    }
}

/// Outcome of exactly one submitted [`AgentTask`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AgentTaskResult {
    pub id: String,
    pub role_label: String,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    pub status: TaskStatus,
    /// Empty unless `status` is `Success`.
    pub output_text: String,
    pub error_message: Option<String>,
    pub cost_usd: Decimal,
    pub num_turns: u32,
    pub session_id: Option<String>,
}

impl AgentTaskResult {
    pub fn is_success(&self) -> bool {
        self.status == TaskStatus::Success
    }

    pub fn elapsed_ms(&self) -> u64 {
        (self.ended_at - self.started_at).num_milliseconds().max(0) as u64
    }

    /// Text handed to the extractor: the output on success, nothing otherwise.
    pub fn usable_text(&self) -> &str {
        if self.is_success() {
            &self.output_text
        } else {
            ""
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn result_with(status: TaskStatus, text: &str) -> AgentTaskResult {
        let now = Utc::now();
        AgentTaskResult {
            id: "analyst-macro".to_string(),
            role_label: "macro".to_string(),
            started_at: now,
            ended_at: now + chrono::Duration::milliseconds(1500),
            status,
            output_text: text.to_string(),
            error_message: None,
            cost_usd: dec!(0.012),
            num_turns: 2,
            session_id: None,
        }
    }

    #[test]
    fn limits_flow_into_task() {
        let limits = StageLimits {
            timeout_seconds: 12,
            max_turns: 4,
            budget_usd: Some(dec!(0.25)),
        };
        let task = AgentTask::new("t1", "bull", "argue".to_string()).with_limits(&limits);
        assert_eq!(task.timeout, Duration::from_secs(12));
        assert_eq!(task.max_turns, 4);
        assert_eq!(task.budget_cap, Some(dec!(0.25)));
    }

    #[test]
    fn failed_result_has_no_usable_text() {
        let ok = result_with(TaskStatus::Success, "SIGNAL: bullish");
        let timed_out = result_with(TaskStatus::Timeout, "partial");
        assert_eq!(ok.usable_text(), "SIGNAL: bullish");
        assert_eq!(timed_out.usable_text(), "");
        assert_eq!(ok.elapsed_ms(), 1500);
    }

    #[test]
    fn status_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&TaskStatus::Timeout).unwrap(),
            "\"timeout\""
        );
    }
}
