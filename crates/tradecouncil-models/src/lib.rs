pub mod analyst;
pub mod config;
pub mod debate;
pub mod decision;
pub mod label;
pub mod pipeline;
pub mod task;

pub use analyst::{AnalystReport, Signal};
pub use config::{
    AnalystConfig, DebatePipelineConfig, ExecutorConfig, ReportConfig, StageLimits,
    TradeCouncilConfig,
};
pub use debate::{
    DebateArgument, InvestmentDebateResult, InvestmentRole, PerspectiveSummaries,
    RiskDebateResult, RiskPerspective,
};
pub use decision::{FundManagerDecision, TradeAction, TraderDecision};
pub use label::Labeled;
pub use pipeline::{DebatePipelineResult, FundContext, PipelineOverrides, TaskSummary};
pub use task::{AgentTask, AgentTaskResult, TaskStatus};
