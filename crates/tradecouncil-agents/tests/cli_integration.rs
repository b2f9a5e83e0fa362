//! Integration tests that invoke the real Claude CLI.
//!
//! These tests are `#[ignore]` by default. They require:
//! - The `claude` CLI installed and on PATH
//! - Valid Anthropic credentials configured
//!
//! Run explicitly with:
//! ```bash
//! cargo test -p tradecouncil-agents --test cli_integration -- --ignored
//! ```

use std::sync::Arc;
use std::time::Duration;

use tradecouncil_agents::claude_cli::check_cli_available;
use tradecouncil_agents::{
    AgentExecutor, ClaudeCliConfig, ClaudeCliExecutor, ExecutionOutcome, ExecutionRequest,
    PipelineOrchestrator,
};
use tradecouncil_models::{DebatePipelineConfig, FundContext, PipelineOverrides, StageLimits};

const TEST_MODEL: &str = "claude-3-5-haiku-latest";

fn request(prompt: &str, model: &str) -> ExecutionRequest {
    ExecutionRequest {
        role_label: "probe".to_string(),
        prompt: prompt.to_string(),
        system_prompt: Some("You are a test agent. Answer in one short line.".to_string()),
        model: Some(model.to_string()),
        max_turns: 1,
        timeout: Duration::from_secs(60),
        max_budget_usd: None,
        resume_session_id: None,
    }
}

/// Verify the Claude CLI is installed and responds to --version.
#[tokio::test]
#[ignore]
async fn cli_is_available() {
    assert!(
        check_cli_available("claude").await,
        "claude CLI not found on PATH"
    );
}

/// A trivial prompt must come back as a completed outcome with cost metadata.
///
/// Catches changes to the CLI's JSON result envelope.
#[tokio::test]
#[ignore]
async fn cli_envelope_maps_to_completed_outcome() {
    if !check_cli_available("claude").await {
        eprintln!("Skipping: claude CLI not available");
        return;
    }

    let executor = ClaudeCliExecutor::new(ClaudeCliConfig::default());
    let outcome = executor
        .execute(request("Reply with exactly: SIGNAL: neutral", TEST_MODEL))
        .await
        .expect("Claude CLI invocation failed");

    match outcome {
        ExecutionOutcome::Completed(output) => {
            assert!(output.output_text.to_lowercase().contains("neutral"), "{}", output.output_text);
            assert!(output.num_turns >= 1);
        }
        other => panic!("expected completion, got {other:?}"),
    }
}

/// An unknown model must surface as a reported failure, not a thrown error.
#[tokio::test]
#[ignore]
async fn cli_reports_failure_for_invalid_model() {
    if !check_cli_available("claude").await {
        eprintln!("Skipping: claude CLI not available");
        return;
    }

    let executor = ClaudeCliExecutor::new(ClaudeCliConfig::default());
    let outcome = executor
        .execute(request("hello", "nonexistent-model-12345"))
        .await
        .expect("spawning the CLI should succeed");

    assert!(
        matches!(outcome, ExecutionOutcome::Failed { .. }),
        "expected a reported failure, got {outcome:?}"
    );
}

/// One round of each debate over a small fund, end to end.
#[tokio::test]
#[ignore]
async fn single_round_pipeline_completes() {
    if !check_cli_available("claude").await {
        eprintln!("Skipping: claude CLI not available");
        return;
    }

    let limits = StageLimits::new(180, 3);
    let config = DebatePipelineConfig {
        max_debate_rounds: 1,
        max_risk_debate_rounds: 1,
        model: Some(TEST_MODEL.to_string()),
        analyst: limits.clone(),
        debate: limits.clone(),
        trader: limits.clone(),
        risk: limits.clone(),
        fund_manager: limits,
        ..DebatePipelineConfig::default()
    };
    let orchestrator =
        PipelineOrchestrator::new(Arc::new(ClaudeCliExecutor::new(ClaudeCliConfig::default())), config);

    let context = FundContext {
        fund_id: "smoke".to_string(),
        briefing: "Long-only fund, 50% cash, considering mega-cap tech.".to_string(),
        universe: vec!["AAPL".to_string(), "MSFT".to_string()],
    };
    let result = orchestrator
        .run_pipeline(&context, &PipelineOverrides::default())
        .await
        .expect("pipeline aborted");

    assert_eq!(result.investment_debate.rounds_completed, 1);
    assert_eq!(result.risk_debate.rounds_completed, 1);
    assert!(result.total_cost_usd > rust_decimal::Decimal::ZERO);
}
