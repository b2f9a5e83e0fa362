use rust_decimal::Decimal;
use tradecouncil_models::{
    AnalystConfig, AnalystReport, DebateArgument, FundContext, InvestmentDebateResult,
    InvestmentRole, RiskDebateResult, RiskPerspective, TraderDecision,
};

use crate::extract::{format_block, Grammar};
use crate::fields::{
    ANALYST_GRAMMAR, ARGUMENT_GRAMMAR, FUND_MANAGER_GRAMMAR, INVESTMENT_VERDICT_GRAMMAR,
    RISK_VERDICT_GRAMMAR, TRADER_GRAMMAR,
};

/// Tie-break rule handed to the investment arbiter word for word.
pub const NEUTRAL_TIE_BREAK: &str =
    "Choose NEUTRAL only when the evidence is truly balanced. Otherwise commit to BULLISH or BEARISH.";

/// Stands in for an argument whose turn failed.
pub const NO_ARGUMENT: &str = "(no argument was recorded for this turn)";

const NO_REPORTS: &str =
    "No analyst reports are available for this run. Reason from the fund briefing alone.";

fn with_format(body: String, grammar: Grammar) -> String {
    format!("{body}\n\n## ANSWER FORMAT\n\n{}", format_block(grammar))
}

fn fund_header(context: &FundContext) -> String {
    let universe = if context.universe.is_empty() {
        "(not restricted)".to_string()
    } else {
        context.universe.join(", ")
    };
    format!(
        "# Fund: {}\n\n## BRIEFING\n\n{}\n\n## TRADEABLE UNIVERSE\n\n{}",
        context.fund_id,
        context.briefing.trim(),
        universe
    )
}

fn bullets(items: &[String]) -> String {
    if items.is_empty() {
        return "- (none)".to_string();
    }
    items
        .iter()
        .map(|i| format!("- {i}"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn size_text(size: Option<Decimal>) -> String {
    size.map_or_else(|| "unspecified".to_string(), |s| format!("{s}%"))
}

/// Analyst reports as shared context for every later stage.
pub fn render_analyst_reports(reports: &[AnalystReport]) -> String {
    if reports.is_empty() {
        return NO_REPORTS.to_string();
    }
    reports
        .iter()
        .map(|r| {
            format!(
                "### {} ({})\nSignal: {} (confidence {})\n{}\nKey findings:\n{}",
                r.analyst_name,
                r.analyst_type,
                r.signal,
                r.confidence,
                r.summary,
                bullets(&r.key_findings)
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

pub fn render_argument(argument: &DebateArgument) -> String {
    if argument.is_empty() {
        return format!(
            "### Round {}: {}\n{NO_ARGUMENT}",
            argument.round, argument.role
        );
    }
    format!(
        "### Round {}: {}\n{}\nKey points:\n{}\nCounterpoints:\n{}",
        argument.round,
        argument.role,
        argument.argument_text,
        bullets(&argument.key_points),
        bullets(&argument.counterpoints)
    )
}

pub fn render_transcript(transcript: &[DebateArgument]) -> String {
    if transcript.is_empty() {
        return "(the debate produced no turns)".to_string();
    }
    transcript
        .iter()
        .map(render_argument)
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn render_trader_decision(decision: &TraderDecision) -> String {
    let symbols = if decision.symbols.is_empty() {
        "none".to_string()
    } else {
        decision.symbols.join(", ")
    };
    format!(
        "Action: {}\nSymbols: {}\nConviction: {}\nPosition size: {}\nReasoning: {}",
        decision.action,
        symbols,
        decision.conviction,
        size_text(decision.position_size_pct),
        decision.reasoning
    )
}

fn render_trade_memory(trade_memory: Option<&str>) -> String {
    match trade_memory.map(str::trim).filter(|m| !m.is_empty()) {
        Some(memory) => format!("\n\n## RECENT TRADE MEMORY\n\n{memory}"),
        None => String::new(),
    }
}

pub fn analyst_system_prompt(analyst: &AnalystConfig) -> String {
    format!(
        "You are the {} on a fund's investment committee. Your focus: {}.\n\n\
         Form an independent directional view from your domain only. Do not \
         recommend trades; the committee does that later. Be specific and cite \
         the evidence behind each finding.\n\n\
         SIGNAL is your directional read (bullish, neutral or bearish). \
         CONFIDENCE is how sure you are, from 0 to 1.",
        analyst.name, analyst.focus
    )
}

pub fn analyst_prompt(context: &FundContext) -> String {
    with_format(
        format!(
            "{}\n\n## TASK\n\nAnalyze the current situation for this fund from your domain.",
            fund_header(context)
        ),
        ANALYST_GRAMMAR,
    )
}

pub fn investment_debater_system_prompt(role: InvestmentRole) -> String {
    let stance = match role {
        InvestmentRole::Bull => {
            "the BULL researcher. Build the strongest evidence-based case for adding \
             risk and going long"
        }
        InvestmentRole::Bear => {
            "the BEAR researcher. Build the strongest evidence-based case for reducing \
             risk, staying out, or going short"
        }
    };
    format!(
        "You are {stance}. Ground every claim in the analyst reports. Address the \
         opposing side's latest argument directly and rebut its weakest points."
    )
}

pub fn risk_debater_system_prompt(perspective: RiskPerspective) -> String {
    let stance = match perspective {
        RiskPerspective::Aggressive => {
            "the AGGRESSIVE risk analyst. Argue for capturing the upside: larger size, \
             fewer constraints, acting now"
        }
        RiskPerspective::Conservative => {
            "the CONSERVATIVE risk analyst. Argue for protecting capital: smaller size, \
             tight stops, or not trading at all"
        }
        RiskPerspective::Neutral => {
            "the NEUTRAL risk analyst. Weigh both sides and argue for the balanced \
             sizing and safeguards that best fit the fund's mandate"
        }
    };
    format!(
        "You are {stance}. You are debating a proposed trade with two other risk \
         analysts. Respond to their most recent arguments directly."
    )
}

/// One turn of either debate. `opponents` are the latest arguments of the
/// other roles; `subject` is what is being debated when it is not the
/// analyst context itself.
pub fn debate_turn_prompt(
    context: &FundContext,
    analyst_block: &str,
    subject: Option<&str>,
    role: &str,
    round: u32,
    total_rounds: u32,
    opponents: &[DebateArgument],
) -> String {
    let subject = subject
        .map(|s| format!("\n\n## PROPOSED TRADE\n\n{s}"))
        .unwrap_or_default();
    let opposing = if opponents.is_empty() {
        "You speak first. There are no prior arguments.".to_string()
    } else {
        render_transcript(opponents)
    };
    with_format(
        format!(
            "{}\n\n## ANALYST REPORTS\n\n{analyst_block}{subject}\n\n\
             ## LATEST OPPOSING ARGUMENTS\n\n{opposing}\n\n\
             ## TASK\n\nYou are the {role} side. This is round {round} of {total_rounds}. \
             Make your argument.",
            fund_header(context)
        ),
        ARGUMENT_GRAMMAR,
    )
}

pub fn investment_arbiter_system_prompt() -> String {
    format!(
        "You are the research manager judging a debate between a bull and a bear \
         researcher. Decide which side made the stronger, better-evidenced case. \
         {NEUTRAL_TIE_BREAK}\n\n\
         CONFIDENCE is how decisive the debate was, from 0 to 1."
    )
}

pub fn investment_arbiter_prompt(
    context: &FundContext,
    analyst_block: &str,
    transcript: &[DebateArgument],
) -> String {
    with_format(
        format!(
            "{}\n\n## ANALYST REPORTS\n\n{analyst_block}\n\n## DEBATE TRANSCRIPT\n\n{}\n\n\
             ## TASK\n\nIssue your verdict on the debate.",
            fund_header(context),
            render_transcript(transcript)
        ),
        INVESTMENT_VERDICT_GRAMMAR,
    )
}

pub fn trader_system_prompt() -> String {
    "You are the fund's trader. Turn the committee's research and the debate \
     verdict into one concrete trade proposal. Propose HOLD when no trade is \
     justified; a BUY or SELL must name the symbols it applies to. \
     CONVICTION is from 0 to 1; POSITION_SIZE_PCT is percent of fund NAV."
        .to_string()
}

pub fn trader_prompt(
    context: &FundContext,
    analyst_block: &str,
    debate: &InvestmentDebateResult,
    trade_memory: Option<&str>,
) -> String {
    with_format(
        format!(
            "{}\n\n## ANALYST REPORTS\n\n{analyst_block}\n\n## DEBATE VERDICT\n\n\
             Prevailing perspective: {} (confidence {})\n{}\n\n\
             Strongest bull arguments:\n{}\n\nStrongest bear arguments:\n{}{}\n\n\
             ## TASK\n\nPropose the trade.",
            fund_header(context),
            debate.prevailing_perspective,
            debate.confidence,
            debate.rationale,
            bullets(&debate.key_bull_arguments),
            bullets(&debate.key_bear_arguments),
            render_trade_memory(trade_memory)
        ),
        TRADER_GRAMMAR,
    )
}

pub fn trade_subject(decision: &TraderDecision) -> String {
    render_trader_decision(decision)
}

pub fn risk_arbiter_system_prompt() -> String {
    "You are the chief risk officer judging a three-way debate between aggressive, \
     conservative and neutral risk analysts over a proposed trade. Decide whether \
     the trade is acceptable, what action should stand, and which risk adjustments \
     are required. Summarize each analyst's position in one line."
        .to_string()
}

pub fn risk_arbiter_prompt(
    context: &FundContext,
    decision: &TraderDecision,
    transcript: &[DebateArgument],
) -> String {
    with_format(
        format!(
            "{}\n\n## PROPOSED TRADE\n\n{}\n\n## RISK DEBATE TRANSCRIPT\n\n{}\n\n\
             ## TASK\n\nIssue your risk verdict.",
            fund_header(context),
            render_trader_decision(decision),
            render_transcript(transcript)
        ),
        RISK_VERDICT_GRAMMAR,
    )
}

pub fn fund_manager_system_prompt() -> String {
    "You are the fund manager and the final decision authority. Review the \
     proposed trade, the investment debate verdict and the risk verdict, then \
     issue the execution-ready decision. Apply the risk adjustments you accept \
     and list them. HOLD means no order is placed."
        .to_string()
}

pub fn fund_manager_prompt(
    context: &FundContext,
    trader: &TraderDecision,
    risk: &RiskDebateResult,
    debate: &InvestmentDebateResult,
    trade_memory: Option<&str>,
) -> String {
    with_format(
        format!(
            "{}\n\n## INVESTMENT DEBATE VERDICT\n\nPrevailing perspective: {} (confidence {})\n{}\n\n\
             ## PROPOSED TRADE\n\n{}\n\n## RISK VERDICT\n\n\
             Approved by risk: {}\nAdjusted action: {}\nRequired adjustments:\n{}\n{}\n\n\
             Aggressive: {}\nConservative: {}\nNeutral: {}{}\n\n\
             ## TASK\n\nIssue the final decision.",
            fund_header(context),
            debate.prevailing_perspective,
            debate.confidence,
            debate.rationale,
            render_trader_decision(trader),
            if risk.approved { "yes" } else { "no" },
            risk.adjusted_action,
            bullets(&risk.risk_adjustments),
            risk.rationale,
            risk.perspective_summaries.aggressive,
            risk.perspective_summaries.conservative,
            risk.perspective_summaries.neutral,
            render_trade_memory(trade_memory)
        ),
        FUND_MANAGER_GRAMMAR,
    )
}
