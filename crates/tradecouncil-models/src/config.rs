use std::time::Duration;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Top-level configuration for tradecouncil.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TradeCouncilConfig {
    pub executor: ExecutorConfig,
    pub pipeline: DebatePipelineConfig,
    pub reports: ReportConfig,
}

/// How agent tasks are executed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ExecutorConfig {
    /// Path or name of the `claude` binary.
    pub binary: String,
    /// Model used when neither the run, the analyst nor the pipeline names one.
    pub default_model: String,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            binary: "claude".to_string(),
            default_model: "claude-sonnet-4-5-20250929".to_string(),
        }
    }
}

/// Where rendered reports and JSON records are written.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ReportConfig {
    pub output_dir: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            output_dir: "reports".to_string(),
        }
    }
}

/// Per-task limits applied to every task a stage submits.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StageLimits {
    /// Hard wall-clock timeout per task.
    pub timeout_seconds: u64,
    pub max_turns: u32,
    /// Spend cap per task in USD. `None` means uncapped.
    pub budget_usd: Option<Decimal>,
}

impl StageLimits {
    pub fn new(timeout_seconds: u64, max_turns: u32) -> Self {
        Self {
            timeout_seconds,
            max_turns,
            budget_usd: None,
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

impl Default for StageLimits {
    fn default() -> Self {
        Self::new(180, 3)
    }
}

/// Configuration of one debate pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebatePipelineConfig {
    /// Rounds of bull/bear exchange before the investment arbiter.
    pub max_debate_rounds: u32,
    /// Rounds of aggressive/conservative/neutral exchange before the risk arbiter.
    pub max_risk_debate_rounds: u32,
    /// Append caller-supplied trade memory to the trader and fund manager prompts.
    pub include_trade_memory: bool,
    /// Model for every stage unless an analyst entry or the run overrides it.
    pub model: Option<String>,
    pub analyst: StageLimits,
    pub debate: StageLimits,
    pub trader: StageLimits,
    pub risk: StageLimits,
    pub fund_manager: StageLimits,
    pub analysts: Vec<AnalystConfig>,
}

impl DebatePipelineConfig {
    pub fn enabled_analysts(&self) -> impl Iterator<Item = &AnalystConfig> {
        self.analysts.iter().filter(|a| a.enabled)
    }
}

impl Default for DebatePipelineConfig {
    fn default() -> Self {
        Self {
            max_debate_rounds: 2,
            max_risk_debate_rounds: 2,
            include_trade_memory: true,
            model: None,
            analyst: StageLimits::new(300, 8),
            debate: StageLimits::new(180, 3),
            trader: StageLimits::new(240, 3),
            risk: StageLimits::new(180, 3),
            fund_manager: StageLimits::new(240, 3),
            analysts: AnalystConfig::default_roster(),
        }
    }
}

/// One analyst perspective of the analyst stage.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnalystConfig {
    pub analyst_type: String,
    pub name: String,
    /// What this analyst is asked to look at.
    pub focus: String,
    /// Override model for this analyst. Falls back to `DebatePipelineConfig::model`.
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

impl AnalystConfig {
    pub fn new(analyst_type: &str, name: &str, focus: &str) -> Self {
        Self {
            analyst_type: analyst_type.to_string(),
            name: name.to_string(),
            focus: focus.to_string(),
            model: None,
            enabled: true,
        }
    }

    pub fn default_roster() -> Vec<Self> {
        vec![
            Self::new(
                "macro",
                "Macro Analyst",
                "Rates, inflation, growth, central bank policy and cross-asset flows",
            ),
            Self::new(
                "technical",
                "Technical Analyst",
                "Trend, momentum, support and resistance, volume and volatility regimes",
            ),
            Self::new(
                "sentiment",
                "Sentiment Analyst",
                "Positioning, fear and greed gauges, social and options-market sentiment",
            ),
            Self::new(
                "news",
                "News Analyst",
                "Company, sector and macro headlines and scheduled catalysts",
            ),
            Self::new(
                "risk",
                "Risk Analyst",
                "Portfolio concentration, drawdown, correlation and tail exposures",
            ),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn roundtrip_config() {
        let config = TradeCouncilConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let deserialized: TradeCouncilConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, deserialized);
    }

    #[test]
    fn default_pipeline_runs_two_rounds_with_five_analysts() {
        let pipeline = DebatePipelineConfig::default();
        assert_eq!(pipeline.max_debate_rounds, 2);
        assert_eq!(pipeline.max_risk_debate_rounds, 2);
        assert!(pipeline.include_trade_memory);
        assert_eq!(pipeline.enabled_analysts().count(), 5);
    }

    #[test]
    fn partial_toml_falls_back_to_defaults() {
        let toml_str = r#"
[pipeline]
max_debate_rounds = 3

[pipeline.risk]
timeout_seconds = 60
budget_usd = "0.75"

[[pipeline.analysts]]
analyst_type = "macro"
name = "Macro"
focus = "rates"

[[pipeline.analysts]]
analyst_type = "news"
name = "News"
focus = "headlines"
enabled = false
"#;

        let config: TradeCouncilConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.pipeline.max_debate_rounds, 3);
        assert_eq!(config.pipeline.max_risk_debate_rounds, 2);
        assert_eq!(config.pipeline.risk.timeout_seconds, 60);
        assert_eq!(config.pipeline.risk.max_turns, 3);
        assert_eq!(config.pipeline.risk.budget_usd, Some(dec!(0.75)));
        assert_eq!(config.pipeline.analysts.len(), 2);
        assert_eq!(config.pipeline.enabled_analysts().count(), 1);
        assert_eq!(config.executor.binary, "claude");
        assert_eq!(config.reports.output_dir, "reports");
    }
}
