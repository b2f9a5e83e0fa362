use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::error::AgentError;
use crate::executor::{AgentExecutor, ExecutionOutcome, ExecutionRequest};
use crate::parser::parse_cli_envelope;

/// Configuration for Claude CLI invocations.
#[derive(Debug, Clone)]
pub struct ClaudeCliConfig {
    pub binary: String,
    /// Model used when a request names none.
    pub default_model: String,
}

impl Default for ClaudeCliConfig {
    fn default() -> Self {
        Self {
            binary: "claude".to_string(),
            default_model: "claude-sonnet-4-5-20250929".to_string(),
        }
    }
}

impl From<&tradecouncil_models::ExecutorConfig> for ClaudeCliConfig {
    fn from(config: &tradecouncil_models::ExecutorConfig) -> Self {
        Self {
            binary: config.binary.clone(),
            default_model: config.default_model.clone(),
        }
    }
}

/// [`AgentExecutor`] backed by the `claude` CLI in print mode.
pub struct ClaudeCliExecutor {
    config: ClaudeCliConfig,
}

impl ClaudeCliExecutor {
    pub fn new(config: ClaudeCliConfig) -> Self {
        Self { config }
    }

    /// Command-line arguments for one request.
    pub fn build_args(&self, request: &ExecutionRequest) -> Vec<String> {
        let model = request
            .model
            .clone()
            .unwrap_or_else(|| self.config.default_model.clone());

        let mut args = vec![
            "-p".to_string(),
            request.prompt.clone(),
            "--model".to_string(),
            model,
            "--output-format".to_string(),
            "json".to_string(),
            "--max-turns".to_string(),
            request.max_turns.to_string(),
        ];
        if let Some(system_prompt) = &request.system_prompt {
            args.push("--system-prompt".to_string());
            args.push(system_prompt.clone());
        }
        if let Some(session) = &request.resume_session_id {
            args.push("--resume".to_string());
            args.push(session.clone());
        }
        args
    }
}

#[async_trait]
impl AgentExecutor for ClaudeCliExecutor {
    async fn execute(&self, request: ExecutionRequest) -> Result<ExecutionOutcome, AgentError> {
        debug!(role = %request.role_label, max_turns = request.max_turns, "Invoking claude CLI");

        let args = self.build_args(&request);
        let mut command = Command::new(&self.config.binary);
        command.args(&args).kill_on_drop(true);

        let output = match tokio::time::timeout(request.timeout, command.output()).await {
            Err(_) => {
                warn!(role = %request.role_label, timeout_s = request.timeout.as_secs(), "Claude CLI timed out");
                return Ok(ExecutionOutcome::Timeout);
            }
            Ok(result) => result.map_err(|e| {
                AgentError::Cli(format!("Failed to spawn {}: {e}", self.config.binary))
            })?,
        };

        let stdout = String::from_utf8_lossy(&output.stdout);
        match parse_cli_envelope(&stdout) {
            Ok(envelope) => Ok(envelope.into_outcome(request.max_budget_usd)),
            Err(parse_err) => {
                let stderr = String::from_utf8_lossy(&output.stderr);
                warn!(role = %request.role_label, status = %output.status, stderr = %stderr, "Claude CLI produced no result envelope");
                let message = if output.status.success() {
                    parse_err.to_string()
                } else {
                    format!("claude exited {}: {}", output.status, stderr.trim())
                };
                Ok(ExecutionOutcome::Failed { message })
            }
        }
    }
}

/// Check if the CLI is available on the system.
pub async fn check_cli_available(binary: &str) -> bool {
    match Command::new(binary).arg("--version").output().await {
        Ok(output) => output.status.success(),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn request() -> ExecutionRequest {
        ExecutionRequest {
            role_label: "bull".to_string(),
            prompt: "Argue the bull case".to_string(),
            system_prompt: None,
            model: None,
            max_turns: 3,
            timeout: Duration::from_secs(10),
            max_budget_usd: None,
            resume_session_id: None,
        }
    }

    #[test]
    fn default_config() {
        let config = ClaudeCliConfig::default();
        assert_eq!(config.binary, "claude");
    }

    #[test]
    fn args_fall_back_to_default_model() {
        let executor = ClaudeCliExecutor::new(ClaudeCliConfig::default());
        let args = executor.build_args(&request());
        assert_eq!(args[0], "-p");
        assert_eq!(args[1], "Argue the bull case");
        assert!(args.windows(2).any(|w| w[0] == "--model" && w[1] == "claude-sonnet-4-5-20250929"));
        assert!(args.windows(2).any(|w| w[0] == "--max-turns" && w[1] == "3"));
        assert!(!args.contains(&"--resume".to_string()));
    }

    #[test]
    fn args_carry_system_prompt_and_resume() {
        let executor = ClaudeCliExecutor::new(ClaudeCliConfig::default());
        let mut req = request();
        req.model = Some("claude-haiku".to_string());
        req.system_prompt = Some("You are the bull".to_string());
        req.resume_session_id = Some("sess-9".to_string());

        let args = executor.build_args(&req);
        assert!(args.windows(2).any(|w| w[0] == "--model" && w[1] == "claude-haiku"));
        assert!(args.windows(2).any(|w| w[0] == "--system-prompt" && w[1] == "You are the bull"));
        assert!(args.windows(2).any(|w| w[0] == "--resume" && w[1] == "sess-9"));
    }

    #[tokio::test]
    async fn missing_binary_is_a_thrown_error() {
        let executor = ClaudeCliExecutor::new(ClaudeCliConfig {
            binary: "definitely-not-a-real-binary-tc".to_string(),
            default_model: "m".to_string(),
        });
        let result = executor.execute(request()).await;
        assert!(matches!(result, Err(AgentError::Cli(_))));
    }
}
