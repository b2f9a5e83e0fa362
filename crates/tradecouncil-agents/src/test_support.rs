//! Deterministic executors for exercising the pipeline without the Claude CLI.
//!
//! `ScriptedExecutor` routes each request by its role label to a canned
//! [`Script`] and records every request in call order, so tests can assert
//! what each stage saw and in which order stages ran.

use std::collections::{HashMap, VecDeque};
use std::time::Duration;

use async_trait::async_trait;
use rust_decimal::Decimal;
use tokio::sync::Mutex;

use crate::error::AgentError;
use crate::executor::{AgentExecutor, ExecutionOutcome, ExecutionOutput, ExecutionRequest};
use crate::{fund_manager, investment, risk, trader};

/// How the executor answers one request.
#[derive(Debug, Clone, PartialEq)]
pub enum Script {
    Reply(String),
    ReplyAfter(Duration, String),
    /// Reported timeout.
    Timeout,
    /// Reported failure with a message.
    Fail(String),
    /// Reported max-turns breach.
    MaxTurns,
    /// The executor call itself returns `Err`.
    Throw(String),
}

impl Script {
    pub fn reply(text: &str) -> Self {
        Script::Reply(text.to_string())
    }
}

pub struct ScriptedExecutor {
    defaults: HashMap<String, Script>,
    queued: Mutex<HashMap<String, VecDeque<Script>>>,
    fallback: Script,
    cost_per_call: Decimal,
    calls: Mutex<Vec<ExecutionRequest>>,
}

impl Default for ScriptedExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedExecutor {
    /// Unknown roles get an empty successful reply.
    pub fn new() -> Self {
        Self {
            defaults: HashMap::new(),
            queued: Mutex::new(HashMap::new()),
            fallback: Script::Reply(String::new()),
            cost_per_call: Decimal::new(1, 2),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Every stage answers with well-formed output.
    pub fn happy_path() -> Self {
        let mut executor = Self::new();
        for analyst in ["macro", "technical", "sentiment", "news", "risk"] {
            executor = executor.on(
                analyst,
                Script::Reply(analyst_reply("bullish", "0.7", &format!("{analyst} looks constructive"))),
            );
        }
        executor
            .on("bull", Script::Reply(argument_reply("Earnings momentum is accelerating")))
            .on("bear", Script::Reply(argument_reply("Valuation already prices it in")))
            .on(investment::ARBITER_ROLE, Script::reply(INVESTMENT_VERDICT))
            .on(trader::ROLE, Script::reply(TRADER_BUY))
            .on("aggressive", Script::Reply(argument_reply("Size up while momentum lasts")))
            .on("conservative", Script::Reply(argument_reply("Cap the position at 2%")))
            .on("neutral", Script::Reply(argument_reply("Take the trade at half size")))
            .on(risk::ARBITER_ROLE, Script::reply(RISK_APPROVED))
            .on(fund_manager::ROLE, Script::reply(MANAGER_APPROVED))
    }

    /// Answer every request for `role` with `script`.
    pub fn on(mut self, role: &str, script: Script) -> Self {
        self.defaults.insert(role.to_string(), script);
        self
    }

    /// Answer the next request for `role` with `script`, ahead of its default.
    pub fn then(mut self, role: &str, script: Script) -> Self {
        self.queued
            .get_mut()
            .entry(role.to_string())
            .or_default()
            .push_back(script);
        self
    }

    /// Answer for roles with no script.
    pub fn fallback(mut self, script: Script) -> Self {
        self.fallback = script;
        self
    }

    pub fn with_cost_per_call(mut self, cost: Decimal) -> Self {
        self.cost_per_call = cost;
        self
    }

    pub async fn calls(&self) -> Vec<ExecutionRequest> {
        self.calls.lock().await.clone()
    }

    pub async fn roles_called(&self) -> Vec<String> {
        self.calls
            .lock()
            .await
            .iter()
            .map(|r| r.role_label.clone())
            .collect()
    }

    /// Prompts sent to `role`, in call order.
    pub async fn prompts_for(&self, role: &str) -> Vec<String> {
        self.calls
            .lock()
            .await
            .iter()
            .filter(|r| r.role_label == role)
            .map(|r| r.prompt.clone())
            .collect()
    }

    async fn next_script(&self, role: &str) -> Script {
        if let Some(script) = self
            .queued
            .lock()
            .await
            .get_mut(role)
            .and_then(|queue| queue.pop_front())
        {
            return script;
        }
        self.defaults
            .get(role)
            .cloned()
            .unwrap_or_else(|| self.fallback.clone())
    }

    fn completed(&self, text: String) -> ExecutionOutcome {
        ExecutionOutcome::Completed(ExecutionOutput {
            output_text: text,
            cost_usd: self.cost_per_call,
            num_turns: 1,
            session_id: None,
        })
    }
}

#[async_trait]
impl AgentExecutor for ScriptedExecutor {
    async fn execute(&self, request: ExecutionRequest) -> Result<ExecutionOutcome, AgentError> {
        let role = request.role_label.clone();
        self.calls.lock().await.push(request);

        match self.next_script(&role).await {
            Script::Reply(text) => Ok(self.completed(text)),
            Script::ReplyAfter(delay, text) => {
                tokio::time::sleep(delay).await;
                Ok(self.completed(text))
            }
            Script::Timeout => Ok(ExecutionOutcome::Timeout),
            Script::Fail(message) => Ok(ExecutionOutcome::Failed { message }),
            Script::MaxTurns => Ok(ExecutionOutcome::MaxTurnsExceeded {
                cost_usd: self.cost_per_call,
            }),
            Script::Throw(message) => Err(AgentError::Executor(message)),
        }
    }
}

/// Well-formed analyst output.
pub fn analyst_reply(signal: &str, confidence: &str, summary: &str) -> String {
    format!(
        "SIGNAL: {signal}\nCONFIDENCE: {confidence}\nSUMMARY: {summary}\n\
         KEY_FINDINGS:\n- {summary} (first finding)\n- second finding\n"
    )
}

/// Well-formed debate turn output.
pub fn argument_reply(argument: &str) -> String {
    format!(
        "ARGUMENT: {argument}\nKEY_POINTS:\n- {argument}\n- supporting detail\n\
         COUNTERPOINTS:\n- the other side overstates its case\n"
    )
}

pub const INVESTMENT_VERDICT: &str = "PREVAILING_PERSPECTIVE: bullish
CONFIDENCE: 0.72
RATIONALE: Earnings momentum outweighs valuation concerns.
KEY_BULL_ARGUMENTS:
- Earnings momentum is accelerating
KEY_BEAR_ARGUMENTS:
- Valuation already prices it in
";

pub const TRADER_BUY: &str = "FINAL_ACTION: BUY
SYMBOLS: AAPL, MSFT
CONVICTION: 0.68
POSITION_SIZE_PCT: 4
REASONING: Debate favoured the bull case; add exposure to quality megacaps.
";

pub const RISK_APPROVED: &str = "APPROVED: yes
ADJUSTED_ACTION: BUY
RISK_ADJUSTMENTS:
- Cap combined position at 3%
- Stop loss 8% below entry
RATIONALE: Acceptable risk once sized down.
AGGRESSIVE_SUMMARY: Wants the full 4% while momentum lasts.
CONSERVATIVE_SUMMARY: Would cap at 2% given valuation.
NEUTRAL_SUMMARY: Supports the trade at reduced size.
";

pub const MANAGER_APPROVED: &str = "APPROVED: yes
FINAL_ACTION: BUY
FINAL_SYMBOLS: AAPL, MSFT
POSITION_SIZE_PCT: 3
RISK_ADJUSTMENTS_APPLIED:
- Cap combined position at 3%
- Stop loss 8% below entry
RATIONALE: Approved at the risk-adjusted size.
";
