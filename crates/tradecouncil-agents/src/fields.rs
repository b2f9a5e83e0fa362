//! Declared answer fields for every agent role and the defaults used when
//! an answer omits them.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tradecouncil_models::{Signal, TradeAction};

use crate::extract::{
    ChoiceField, FlagField, Grammar, LineField, ListField, NumberField, TextField, TickerField,
};

pub const DEFAULT_SIGNAL: Signal = Signal::Neutral;
pub const DEFAULT_PERSPECTIVE: Signal = Signal::Neutral;
pub const DEFAULT_ACTION: TradeAction = TradeAction::Hold;
pub const DEFAULT_CONFIDENCE: Decimal = dec!(0.5);
pub const DEFAULT_CONVICTION: Decimal = dec!(0.5);
pub const DEFAULT_APPROVED: bool = false;

pub const SUMMARY_FALLBACK_CHARS: usize = 500;
pub const ARGUMENT_FALLBACK_CHARS: usize = 2000;
pub const RATIONALE_FALLBACK_CHARS: usize = 800;

const fn unit(label: &'static str, default: Decimal) -> NumberField {
    NumberField {
        label,
        min: Decimal::ZERO,
        max: Decimal::ONE,
        default: Some(default),
    }
}

const fn percent(label: &'static str) -> NumberField {
    NumberField {
        label,
        min: Decimal::ZERO,
        max: Decimal::ONE_HUNDRED,
        default: None,
    }
}

const fn text(label: &'static str, fallback_chars: usize) -> TextField {
    TextField {
        label,
        fallback_chars,
    }
}

// Analyst
pub const SIGNAL: ChoiceField<Signal> = ChoiceField::new("SIGNAL", DEFAULT_SIGNAL);
pub const CONFIDENCE: NumberField = unit("CONFIDENCE", DEFAULT_CONFIDENCE);
pub const SUMMARY: TextField = text("SUMMARY", SUMMARY_FALLBACK_CHARS);
pub const KEY_FINDINGS: ListField = ListField {
    label: "KEY_FINDINGS",
};

pub const ANALYST_GRAMMAR: Grammar = &[&SIGNAL, &CONFIDENCE, &SUMMARY, &KEY_FINDINGS];

// Debate turn (bull, bear, and each risk perspective)
pub const ARGUMENT: TextField = text("ARGUMENT", ARGUMENT_FALLBACK_CHARS);
pub const KEY_POINTS: ListField = ListField { label: "KEY_POINTS" };
pub const COUNTERPOINTS: ListField = ListField {
    label: "COUNTERPOINTS",
};

pub const ARGUMENT_GRAMMAR: Grammar = &[&ARGUMENT, &KEY_POINTS, &COUNTERPOINTS];

// Investment arbiter
pub const PREVAILING_PERSPECTIVE: ChoiceField<Signal> =
    ChoiceField::new("PREVAILING_PERSPECTIVE", DEFAULT_PERSPECTIVE);
pub const RATIONALE: TextField = text("RATIONALE", RATIONALE_FALLBACK_CHARS);
pub const KEY_BULL_ARGUMENTS: ListField = ListField {
    label: "KEY_BULL_ARGUMENTS",
};
pub const KEY_BEAR_ARGUMENTS: ListField = ListField {
    label: "KEY_BEAR_ARGUMENTS",
};

pub const INVESTMENT_VERDICT_GRAMMAR: Grammar = &[
    &PREVAILING_PERSPECTIVE,
    &CONFIDENCE,
    &RATIONALE,
    &KEY_BULL_ARGUMENTS,
    &KEY_BEAR_ARGUMENTS,
];

// Trader
pub const FINAL_ACTION: ChoiceField<TradeAction> = ChoiceField::new("FINAL_ACTION", DEFAULT_ACTION);
pub const SYMBOLS: TickerField = TickerField { label: "SYMBOLS" };
pub const CONVICTION: NumberField = unit("CONVICTION", DEFAULT_CONVICTION);
pub const POSITION_SIZE_PCT: NumberField = percent("POSITION_SIZE_PCT");
pub const REASONING: TextField = text("REASONING", RATIONALE_FALLBACK_CHARS);

pub const TRADER_GRAMMAR: Grammar = &[
    &FINAL_ACTION,
    &SYMBOLS,
    &CONVICTION,
    &POSITION_SIZE_PCT,
    &REASONING,
];

// Risk arbiter
pub const APPROVED: FlagField = FlagField {
    label: "APPROVED",
    default: DEFAULT_APPROVED,
};
pub const ADJUSTED_ACTION: ChoiceField<TradeAction> =
    ChoiceField::new("ADJUSTED_ACTION", DEFAULT_ACTION);
pub const RISK_ADJUSTMENTS: ListField = ListField {
    label: "RISK_ADJUSTMENTS",
};
pub const AGGRESSIVE_SUMMARY: LineField = LineField {
    label: "AGGRESSIVE_SUMMARY",
};
pub const CONSERVATIVE_SUMMARY: LineField = LineField {
    label: "CONSERVATIVE_SUMMARY",
};
pub const NEUTRAL_SUMMARY: LineField = LineField {
    label: "NEUTRAL_SUMMARY",
};

pub const RISK_VERDICT_GRAMMAR: Grammar = &[
    &APPROVED,
    &ADJUSTED_ACTION,
    &RISK_ADJUSTMENTS,
    &RATIONALE,
    &AGGRESSIVE_SUMMARY,
    &CONSERVATIVE_SUMMARY,
    &NEUTRAL_SUMMARY,
];

// Fund manager
pub const FINAL_SYMBOLS: TickerField = TickerField {
    label: "FINAL_SYMBOLS",
};
pub const RISK_ADJUSTMENTS_APPLIED: ListField = ListField {
    label: "RISK_ADJUSTMENTS_APPLIED",
};

pub const FUND_MANAGER_GRAMMAR: Grammar = &[
    &APPROVED,
    &FINAL_ACTION,
    &FINAL_SYMBOLS,
    &POSITION_SIZE_PCT,
    &RISK_ADJUSTMENTS_APPLIED,
    &RATIONALE,
];

pub const GRAMMARS: &[Grammar] = &[
    ANALYST_GRAMMAR,
    ARGUMENT_GRAMMAR,
    INVESTMENT_VERDICT_GRAMMAR,
    TRADER_GRAMMAR,
    RISK_VERDICT_GRAMMAR,
    FUND_MANAGER_GRAMMAR,
];
