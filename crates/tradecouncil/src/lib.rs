//! TradeCouncil - multi-agent debate pipeline for fund trade decisions.
//!
//! Five analysts report in parallel, a bull and a bear researcher debate
//! their findings, a trader proposes a trade, three risk analysts debate
//! it, and a fund manager issues the final decision. Every agent is a call
//! into an [`agents::AgentExecutor`], by default the Claude CLI.
//!
//! # Library Usage
//!
//! ```rust,no_run
//! use tradecouncil::models::{FundContext, PipelineOverrides, TradeCouncilConfig};
//!
//! # async fn demo() -> Result<(), tradecouncil::agents::AgentError> {
//! let config = TradeCouncilConfig::default();
//! let orchestrator = tradecouncil::build_orchestrator(&config);
//! let context = FundContext {
//!     fund_id: "alpha".to_string(),
//!     briefing: "Long-only US large caps.".to_string(),
//!     universe: vec!["AAPL".to_string()],
//! };
//! let result = tradecouncil::run_pipeline(&orchestrator, &context, &PipelineOverrides::default()).await?;
//! println!("{}", result.fund_manager_decision.final_action);
//! # Ok(())
//! # }
//! ```

pub use tradecouncil_agents as agents;
pub use tradecouncil_models as models;

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use tradecouncil_agents::{AgentError, ClaudeCliConfig, ClaudeCliExecutor, PipelineOrchestrator};
use tradecouncil_models::{
    AnalystReport, DebatePipelineResult, FundContext, PipelineOverrides, TradeCouncilConfig,
};

/// Load configuration from a TOML file. A missing file means defaults.
pub fn load_config(path: &Path) -> Result<TradeCouncilConfig, anyhow::Error> {
    if !path.exists() {
        tracing::warn!(path = %path.display(), "Config file not found; using defaults");
        return Ok(TradeCouncilConfig::default());
    }
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config: {}", path.display()))?;
    toml::from_str(&raw).with_context(|| format!("Failed to parse config: {}", path.display()))
}

/// Build an orchestrator backed by the Claude CLI.
pub fn build_orchestrator(config: &TradeCouncilConfig) -> PipelineOrchestrator {
    let executor = ClaudeCliExecutor::new(ClaudeCliConfig::from(&config.executor));
    PipelineOrchestrator::new(Arc::new(executor), config.pipeline.clone())
}

/// Run the full debate pipeline.
pub async fn run_pipeline(
    orchestrator: &PipelineOrchestrator,
    context: &FundContext,
    overrides: &PipelineOverrides,
) -> Result<DebatePipelineResult, AgentError> {
    orchestrator.run_pipeline(context, overrides).await
}

/// Run only the analyst fan-out.
pub async fn run_analyst_stage_only(
    orchestrator: &PipelineOrchestrator,
    context: &FundContext,
    overrides: &PipelineOverrides,
) -> Vec<AnalystReport> {
    orchestrator.run_analyst_stage_only(context, overrides).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_config_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, TradeCouncilConfig::default());
    }

    #[test]
    fn partial_config_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tradecouncil.toml");
        std::fs::write(
            &path,
            "[executor]\nbinary = \"/opt/claude\"\n\n[pipeline]\nmax_debate_rounds = 4\n",
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.executor.binary, "/opt/claude");
        assert_eq!(config.pipeline.max_debate_rounds, 4);
        assert_eq!(config.pipeline.max_risk_debate_rounds, 2);
        assert_eq!(config.reports.output_dir, "reports");
    }

    #[test]
    fn malformed_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "[pipeline\nmax_debate_rounds = ").unwrap();
        assert!(load_config(&path).is_err());
    }

    #[test]
    fn orchestrator_uses_pipeline_config() {
        let mut config = TradeCouncilConfig::default();
        config.pipeline.max_risk_debate_rounds = 1;
        let orchestrator = build_orchestrator(&config);
        assert_eq!(orchestrator.config().max_risk_debate_rounds, 1);
    }
}
