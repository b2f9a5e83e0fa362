//! Markdown rendering of a pipeline run and delivery to a report sink.
//!
//! Sections always appear in the same order: analysts, investment debate,
//! trader decision, risk debate, fund manager decision, configuration.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::info;
use tradecouncil_models::{
    DebateArgument, DebatePipelineResult, Labeled, RiskPerspective, TaskStatus,
};

use crate::error::AgentError;

/// Session type used for full pipeline runs.
pub const PIPELINE_SESSION: &str = "debate";

fn bullet_list(items: &[String]) -> String {
    if items.is_empty() {
        return "- _none_\n".to_string();
    }
    items.iter().map(|i| format!("- {i}\n")).collect()
}

fn size(pct: Option<Decimal>) -> String {
    pct.map_or_else(|| "unspecified".to_string(), |p| format!("{p}%"))
}

fn symbols(symbols: &[String]) -> String {
    if symbols.is_empty() {
        "none".to_string()
    } else {
        symbols.join(", ")
    }
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "no"
    }
}

fn render_history(out: &mut String, title: &str, history: &[DebateArgument]) {
    out.push_str(&format!("### {title}\n\n"));
    if history.is_empty() {
        out.push_str("_No turns._\n\n");
        return;
    }
    for argument in history {
        out.push_str(&format!("**Round {}**\n\n", argument.round));
        if argument.is_empty() {
            out.push_str("_No argument recorded (turn failed)._\n\n");
            continue;
        }
        out.push_str(&format!("{}\n\n", argument.argument_text));
        if !argument.key_points.is_empty() {
            out.push_str(&bullet_list(&argument.key_points));
            out.push('\n');
        }
        if !argument.counterpoints.is_empty() {
            out.push_str("_Counterpoints:_\n\n");
            out.push_str(&bullet_list(&argument.counterpoints));
            out.push('\n');
        }
    }
}

pub fn render_markdown(result: &DebatePipelineResult) -> String {
    let mut out = format!(
        "# Debate Pipeline Report: {}\n\n\
         - Run: `{}`\n- Started: {}\n- Finished: {}\n- Total cost: ${}\n\n",
        result.fund_id,
        result.run_id,
        result.started_at.to_rfc3339(),
        result.ended_at.to_rfc3339(),
        result.total_cost_usd.round_dp(4)
    );

    // Analysts
    out.push_str("## Analyst Reports\n\n");
    out.push_str("| Task | Status | Elapsed (ms) | Cost (USD) | Error |\n");
    out.push_str("|------|--------|--------------|------------|-------|\n");
    for task in &result.analyst_tasks {
        out.push_str(&format!(
            "| {} | {} | {} | {} | {} |\n",
            task.role_label,
            task.status.as_str(),
            task.elapsed_ms,
            task.cost_usd,
            task.error_message.as_deref().unwrap_or("")
        ));
    }
    out.push('\n');
    let succeeded = result
        .analyst_tasks
        .iter()
        .filter(|t| t.status == TaskStatus::Success)
        .count();
    if result.analyst_reports.is_empty() {
        out.push_str("_No analyst produced a report._\n\n");
    }
    for report in &result.analyst_reports {
        out.push_str(&format!(
            "### {} ({})\n\n**Signal:** {} (confidence {})\n\n{}\n\n",
            report.analyst_name, report.analyst_type, report.signal, report.confidence, report.summary
        ));
        out.push_str(&bullet_list(&report.key_findings));
        out.push('\n');
    }
    out.push_str(&format!(
        "{succeeded} of {} analysts succeeded.\n\n",
        result.analyst_tasks.len()
    ));

    // Investment debate
    let debate = &result.investment_debate;
    out.push_str(&format!(
        "## Investment Debate\n\n**Verdict:** {} (confidence {}), {} rounds\n\n{}\n\n\
         **Key bull arguments**\n\n{}\n**Key bear arguments**\n\n{}\n",
        debate.prevailing_perspective,
        debate.confidence,
        debate.rounds_completed,
        debate.rationale,
        bullet_list(&debate.key_bull_arguments),
        bullet_list(&debate.key_bear_arguments)
    ));
    render_history(&mut out, "Bull", &debate.bull_history);
    render_history(&mut out, "Bear", &debate.bear_history);

    // Trader
    let trader = &result.trader_decision;
    out.push_str(&format!(
        "## Trader Decision\n\n- Action: {}\n- Symbols: {}\n- Conviction: {}\n- Position size: {}\n\n{}\n\n",
        trader.action,
        symbols(&trader.symbols),
        trader.conviction,
        size(trader.position_size_pct),
        trader.reasoning
    ));

    // Risk debate
    let risk = &result.risk_debate;
    out.push_str(&format!(
        "## Risk Debate\n\n- Approved: {}\n- Adjusted action: {}\n- Rounds: {}\n\n{}\n\n\
         **Required adjustments**\n\n{}\n",
        yes_no(risk.approved),
        risk.adjusted_action,
        risk.rounds_completed,
        risk.rationale,
        bullet_list(&risk.risk_adjustments)
    ));
    for perspective in RiskPerspective::ALL {
        let summary = risk.perspective_summaries.get(*perspective);
        if !summary.is_empty() {
            out.push_str(&format!("- **{perspective}:** {summary}\n"));
        }
    }
    out.push('\n');
    for perspective in RiskPerspective::ALL {
        let mut title = perspective.label().to_string();
        title[..1].make_ascii_uppercase();
        render_history(&mut out, &title, risk.history(*perspective));
    }

    // Fund manager
    let manager = &result.fund_manager_decision;
    out.push_str(&format!(
        "## Fund Manager Decision\n\n- Approved: {}\n- Final action: {}\n- Final symbols: {}\n- Position size: {}\n\n{}\n\n\
         **Risk adjustments applied**\n\n{}\n",
        yes_no(manager.approved),
        manager.final_action,
        symbols(&manager.final_symbols),
        size(manager.position_size_pct),
        manager.rationale,
        bullet_list(&manager.risk_adjustments_applied)
    ));

    // Config
    let config = serde_json::to_string_pretty(&result.config)
        .unwrap_or_else(|e| format!("(config could not be serialized: {e})"));
    out.push_str(&format!("## Configuration\n\n```json\n{config}\n```\n"));
    out
}

/// Where a report is filed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportKey {
    pub fund_id: String,
    pub session_type: String,
    pub date: NaiveDate,
}

impl ReportKey {
    pub fn for_result(result: &DebatePipelineResult, session_type: &str) -> Self {
        Self {
            fund_id: result.fund_id.clone(),
            session_type: session_type.to_string(),
            date: result.started_at.date_naive(),
        }
    }
}

/// Accepts a rendered report and its structured record.
pub trait ReportSink: Send + Sync {
    fn store(
        &self,
        key: &ReportKey,
        markdown: &str,
        record: &serde_json::Value,
    ) -> Result<(), AgentError>;
}

/// Writes `<root>/<fund_id>/<date>_<session>.md` and `.json`.
pub struct FsReportSink {
    root: PathBuf,
}

impl FsReportSink {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of a report file, without extension.
    pub fn stem(&self, key: &ReportKey) -> Result<PathBuf, AgentError> {
        for part in [&key.fund_id, &key.session_type] {
            if part.is_empty()
                || part == ".."
                || part.contains(|c: char| c == '/' || c == '\\')
            {
                return Err(AgentError::Sink(format!("invalid report key component: {part:?}")));
            }
        }
        Ok(self
            .root
            .join(&key.fund_id)
            .join(format!("{}_{}", key.date.format("%Y-%m-%d"), key.session_type)))
    }
}

impl ReportSink for FsReportSink {
    fn store(
        &self,
        key: &ReportKey,
        markdown: &str,
        record: &serde_json::Value,
    ) -> Result<(), AgentError> {
        let stem = self.stem(key)?;
        if let Some(dir) = stem.parent() {
            std::fs::create_dir_all(dir)?;
        }
        let md_path = stem.with_extension("md");
        let json_path = stem.with_extension("json");
        std::fs::write(&md_path, markdown)?;
        std::fs::write(&json_path, serde_json::to_string_pretty(record)?)?;
        info!(path = %md_path.display(), "Report stored");
        Ok(())
    }
}

/// Render and store a finished run.
pub fn store_pipeline_result(
    sink: &dyn ReportSink,
    result: &DebatePipelineResult,
) -> Result<ReportKey, AgentError> {
    let key = ReportKey::for_result(result, PIPELINE_SESSION);
    let record = serde_json::to_value(result)?;
    sink.store(&key, &render_markdown(result), &record)?;
    Ok(key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orchestrator::PipelineOrchestrator;
    use crate::test_support::{Script, ScriptedExecutor};
    use std::sync::Arc;
    use tradecouncil_models::{DebatePipelineConfig, FundContext, PipelineOverrides};

    async fn run(executor: ScriptedExecutor) -> DebatePipelineResult {
        let context = FundContext {
            fund_id: "alpha".to_string(),
            briefing: "Growth fund".to_string(),
            universe: vec![],
        };
        PipelineOrchestrator::new(Arc::new(executor), DebatePipelineConfig::default())
            .run_pipeline(&context, &PipelineOverrides::default())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn sections_appear_in_fixed_order() {
        let markdown = render_markdown(&run(ScriptedExecutor::happy_path()).await);
        let sections = [
            "## Analyst Reports",
            "## Investment Debate",
            "## Trader Decision",
            "## Risk Debate",
            "## Fund Manager Decision",
            "## Configuration",
        ];
        let positions: Vec<usize> = sections
            .iter()
            .map(|s| markdown.find(s).unwrap_or_else(|| panic!("missing {s}")))
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
        assert!(markdown.contains("\"max_debate_rounds\": 2"));
        assert!(markdown.contains("Final symbols: AAPL, MSFT"));
    }

    #[tokio::test]
    async fn debate_turns_show_their_counterpoints() {
        let markdown = render_markdown(&run(ScriptedExecutor::happy_path()).await);
        let debate = &markdown[markdown.find("## Investment Debate").unwrap()..];
        let counterpoints_at = debate.find("_Counterpoints:_\n\n- the other side overstates its case").unwrap();
        assert!(debate.find("- supporting detail").unwrap() < counterpoints_at);

        let risk = &markdown[markdown.find("## Risk Debate").unwrap()..];
        assert!(risk.contains("- the other side overstates its case"));
    }

    #[tokio::test]
    async fn failed_analysts_appear_in_status_table() {
        let executor = ScriptedExecutor::happy_path()
            .on("news", Script::Timeout)
            .on("technical", Script::Fail("rate limited".to_string()));
        let markdown = render_markdown(&run(executor).await);
        assert!(markdown.contains("| news | timeout |"));
        assert!(markdown.contains("| technical | error |"));
        assert!(markdown.contains("rate limited"));
        assert!(markdown.contains("3 of 5 analysts succeeded."));
    }

    #[tokio::test]
    async fn fs_sink_writes_markdown_and_json() {
        let dir = tempfile::tempdir().unwrap();
        let sink = FsReportSink::new(dir.path());
        let result = run(ScriptedExecutor::happy_path()).await;

        let key = store_pipeline_result(&sink, &result).unwrap();
        let stem = sink.stem(&key).unwrap();
        assert!(stem.starts_with(dir.path().join("alpha")));

        let markdown = std::fs::read_to_string(stem.with_extension("md")).unwrap();
        assert!(markdown.starts_with("# Debate Pipeline Report: alpha"));

        let json = std::fs::read_to_string(stem.with_extension("json")).unwrap();
        let parsed: DebatePipelineResult = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.run_id, result.run_id);
        assert_eq!(parsed.fund_manager_decision, result.fund_manager_decision);
    }

    #[test]
    fn key_components_cannot_escape_root() {
        let sink = FsReportSink::new("/tmp/reports");
        let key = ReportKey {
            fund_id: "../etc".to_string(),
            session_type: PIPELINE_SESSION.to_string(),
            date: NaiveDate::from_ymd_opt(2026, 10, 14).unwrap(),
        };
        assert!(matches!(sink.stem(&key), Err(AgentError::Sink(_))));

        let ok = ReportKey {
            fund_id: "alpha".to_string(),
            ..key
        };
        assert_eq!(
            sink.stem(&ok).unwrap(),
            PathBuf::from("/tmp/reports/alpha/2026-10-14_debate")
        );
    }
}
