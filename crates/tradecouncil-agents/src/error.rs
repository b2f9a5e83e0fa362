use std::fmt;

use thiserror::Error;

/// Pipeline stage names, used to say which single-call step aborted a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    InvestmentDebate,
    Trader,
    RiskDebate,
    FundManager,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::InvestmentDebate => "investment debate arbiter",
            Stage::Trader => "trader stage",
            Stage::RiskDebate => "risk debate arbiter",
            Stage::FundManager => "fund manager stage",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug)]
pub enum AgentError {
    #[error("Claude CLI error: {0}")]
    Cli(String),

    #[error("Executor error: {0}")]
    Executor(String),

    #[error("Agent response parse error: {0}")]
    Parse(String),

    #[error("{stage} failed: {source}")]
    Stage {
        stage: Stage,
        source: Box<AgentError>,
    },

    #[error("Report sink error: {0}")]
    Sink(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AgentError {
    pub fn in_stage(self, stage: Stage) -> Self {
        AgentError::Stage {
            stage,
            source: Box::new(self),
        }
    }

    /// The stage that aborted the run, if this error came out of one.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            AgentError::Stage { stage, .. } => Some(*stage),
            _ => None,
        }
    }
}
