use rust_decimal::Decimal;
use serde::Deserialize;

use crate::error::AgentError;
use crate::executor::{ExecutionOutcome, ExecutionOutput};

/// Locate the first JSON object in CLI stdout, which may carry warnings or
/// other noise around it.
///
/// Accepts a clean object, an object inside a markdown code fence, or an
/// object preceded by free text.
pub fn extract_json(text: &str) -> Result<&str, AgentError> {
    let trimmed = text.trim();

    if trimmed.starts_with('{') && is_json(trimmed) {
        return Ok(trimmed);
    }

    if let Some(fenced) = fenced_block(trimmed) {
        if is_json(fenced) {
            return Ok(fenced);
        }
    }

    if let Some(object) = first_balanced_object(trimmed) {
        if is_json(object) {
            return Ok(object);
        }
    }

    Err(AgentError::Parse(format!(
        "No valid JSON object found in output (length={})",
        text.len()
    )))
}

fn is_json(candidate: &str) -> bool {
    serde_json::from_str::<serde_json::Value>(candidate).is_ok()
}

fn fenced_block(text: &str) -> Option<&str> {
    let start = text.find("```")?;
    let after_fence = &text[start + 3..];
    let body_start = after_fence.find('\n')? + 1;
    let body = &after_fence[body_start..];
    let end = body.find("```")?;
    Some(body[..end].trim())
}

fn first_balanced_object(text: &str) -> Option<&str> {
    let mut depth = 0usize;
    let mut start = None;
    let mut in_string = false;
    let mut escaped = false;

    for (i, ch) in text.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match ch {
            '\\' if in_string => escaped = true,
            '"' => in_string = !in_string,
            '{' if !in_string => {
                if depth == 0 {
                    start = Some(i);
                }
                depth += 1;
            }
            '}' if !in_string && depth > 0 => {
                depth -= 1;
                if depth == 0 {
                    return start.map(|s| &text[s..=i]);
                }
            }
            _ => {}
        }
    }

    None
}

/// Result envelope printed by `claude --output-format json`.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct CliEnvelope {
    #[serde(default)]
    pub subtype: String,
    #[serde(default)]
    pub is_error: bool,
    #[serde(default)]
    pub result: Option<String>,
    #[serde(default)]
    pub total_cost_usd: f64,
    #[serde(default)]
    pub num_turns: u32,
    #[serde(default)]
    pub session_id: Option<String>,
}

impl CliEnvelope {
    pub fn cost(&self) -> Decimal {
        Decimal::try_from(self.total_cost_usd).unwrap_or(Decimal::ZERO)
    }

    /// Map the envelope onto an executor outcome, applying the caller's budget cap.
    pub fn into_outcome(self, budget_cap: Option<Decimal>) -> ExecutionOutcome {
        let cost_usd = self.cost();

        if self.subtype == "error_max_turns" {
            return ExecutionOutcome::MaxTurnsExceeded { cost_usd };
        }
        if self.subtype.contains("budget") {
            return ExecutionOutcome::BudgetExceeded { cost_usd };
        }
        if let Some(cap) = budget_cap {
            if cost_usd > cap {
                return ExecutionOutcome::BudgetExceeded { cost_usd };
            }
        }
        if self.is_error || self.subtype.starts_with("error") {
            let message = self
                .result
                .filter(|r| !r.trim().is_empty())
                .unwrap_or_else(|| format!("claude reported {}", self.subtype));
            return ExecutionOutcome::Failed { message };
        }

        ExecutionOutcome::Completed(ExecutionOutput {
            output_text: self.result.unwrap_or_default(),
            cost_usd,
            num_turns: self.num_turns,
            session_id: self.session_id,
        })
    }
}

/// Parse the CLI result envelope out of raw stdout.
pub fn parse_cli_envelope(raw: &str) -> Result<CliEnvelope, AgentError> {
    let json_str = extract_json(raw)?;
    serde_json::from_str(json_str)
        .map_err(|e| AgentError::Parse(format!("Failed to parse CLI envelope: {e}")))
}
