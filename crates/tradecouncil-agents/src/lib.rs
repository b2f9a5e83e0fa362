pub mod analyst;
pub mod claude_cli;
pub mod debate;
pub mod error;
pub mod executor;
pub mod extract;
pub mod fields;
pub mod fund_manager;
pub mod investment;
pub mod orchestrator;
pub mod parser;
pub mod prompts;
pub mod report;
pub mod risk;
pub mod runner;
pub mod trader;

pub mod test_support;

pub use claude_cli::{ClaudeCliConfig, ClaudeCliExecutor};
pub use error::{AgentError, Stage};
pub use executor::{AgentExecutor, ExecutionOutcome, ExecutionOutput, ExecutionRequest};
pub use orchestrator::PipelineOrchestrator;
pub use report::{render_markdown, FsReportSink, ReportKey, ReportSink};
pub use runner::{Staged, TaskRunner};
