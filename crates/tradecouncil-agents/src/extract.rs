//! Pattern-based recovery of typed fields from agent prose.
//!
//! Agents are asked to answer with `LABEL: value` lines and bulleted blocks.
//! Every extractor here is a pure function of the input text and never
//! fails: a missing or malformed field yields the field's declared default.
//! The field declarations themselves live in [`crate::fields`].

use std::collections::HashSet;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::Decimal;
use tradecouncil_models::Labeled;

/// A `LABEL: value` line in any case or markdown decoration. `FINAL_ACTION`
/// is also written `Final Action:`, `**FINAL_ACTION:**`, `## final action:`
/// or `FINAL_ACTION =`.
static LABEL_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^[\s>#*_\-]*(?P<label>[a-z][a-z0-9]*(?:[ _]+[a-z0-9]+)*?)[\s*_]*[:=][\s*_]*(?P<value>.*?)[\s*_]*$",
    )
    .expect("Invalid label regex")
});

/// Every label some grammar declares, canonicalized. A free-text section
/// ends at the next line carrying one of these.
static DECLARED_LABELS: LazyLock<HashSet<String>> = LazyLock::new(|| {
    crate::fields::GRAMMARS
        .iter()
        .flat_map(|grammar| grammar.iter().map(|field| canonical_label(field.label())))
        .collect()
});

static BULLET: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?:[-*•+]|\d{1,2}[.)])\s+(.+?)\s*$").expect("Invalid bullet regex")
});

static NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"-?(?:\d*\.\d+|\d+(?:\.\d+)?)(%?)").expect("Invalid number regex")
});

static TICKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Z][A-Z0-9]{0,5}(?:[.\-][A-Z0-9]{1,4})?$").expect("Invalid ticker regex")
});

/// Words that look like tickers but mean "nothing here".
const NOT_TICKERS: &[&str] = &["NONE", "NA", "N/A", "NIL", "HOLD", "BUY", "SELL", "TBD"];

const EMPTY_MARKERS: &[&str] = &["none", "n/a", "na", "-", "nil", "nothing"];

/// `Final Action` and `final_action` both become `FINAL_ACTION`.
fn canonical_label(label: &str) -> String {
    label
        .split(|c: char| c == '_' || c.is_whitespace())
        .filter(|w| !w.is_empty())
        .map(str::to_ascii_uppercase)
        .collect::<Vec<_>>()
        .join("_")
}

fn is_declared_label_line(line: &str) -> bool {
    LABEL_LINE
        .captures(line)
        .is_some_and(|caps| DECLARED_LABELS.contains(&canonical_label(&caps["label"])))
}

/// First line carrying `label`, with its line index and inline value.
fn find_label(text: &str, label: &str) -> Option<(usize, String)> {
    let wanted = canonical_label(label);
    text.lines().enumerate().find_map(|(i, line)| {
        let caps = LABEL_LINE.captures(line)?;
        (canonical_label(&caps["label"]) == wanted)
            .then(|| (i, caps["value"].trim().to_string()))
    })
}

/// `.8` and `-.5` are valid numbers to an agent but not to `Decimal`.
fn parse_decimal(literal: &str) -> Option<Decimal> {
    let literal = match literal.strip_prefix('-') {
        Some(rest) if rest.starts_with('.') => format!("-0{rest}"),
        _ if literal.starts_with('.') => format!("0{literal}"),
        _ => literal.to_string(),
    };
    Decimal::from_str(&literal).ok()
}

fn is_empty_marker(value: &str) -> bool {
    let value = value.trim().trim_end_matches('.');
    value.is_empty() || EMPTY_MARKERS.iter().any(|m| value.eq_ignore_ascii_case(m))
}

fn char_prefix(text: &str, max_chars: usize) -> String {
    text.trim().chars().take(max_chars).collect::<String>().trim_end().to_string()
}

/// Enum-valued field (signal, action, perspective).
#[derive(Debug, Clone, Copy)]
pub struct ChoiceField<T> {
    pub label: &'static str,
    pub default: T,
}

impl<T: Labeled> ChoiceField<T> {
    pub const fn new(label: &'static str, default: T) -> Self {
        Self { label, default }
    }

    /// The first word of the value that names an allowed variant.
    pub fn extract(&self, text: &str) -> T {
        find_label(text, self.label)
            .and_then(|(_, value)| {
                value
                    .split(|c: char| !c.is_ascii_alphanumeric())
                    .filter(|w| !w.is_empty())
                    .find_map(T::from_label)
            })
            .unwrap_or(self.default)
    }
}

/// Scalar clamped to `[min, max]`, e.g. confidence in `[0, 1]`.
#[derive(Debug, Clone, Copy)]
pub struct NumberField {
    pub label: &'static str,
    pub min: Decimal,
    pub max: Decimal,
    /// Returned when the field is absent or unparseable.
    pub default: Option<Decimal>,
}

impl NumberField {
    /// Parsed and clamped value, or the default. A percentage written for a
    /// unit-range field (`85%`) is read as a fraction.
    pub fn extract(&self, text: &str) -> Option<Decimal> {
        self.parse(text).or(self.default)
    }

    fn parse(&self, text: &str) -> Option<Decimal> {
        let (_, value) = find_label(text, self.label)?;
        let caps = NUMBER.captures(&value)?;
        let mut number = parse_decimal(caps.get(0)?.as_str().trim_end_matches('%'))?;
        let is_percent = caps.get(1).is_some_and(|m| !m.as_str().is_empty());
        if is_percent && self.max <= Decimal::ONE {
            number /= Decimal::ONE_HUNDRED;
        }
        Some(number.clamp(self.min, self.max))
    }
}

/// Bulleted block following a header line. Inline `A; B` after the header
/// counts too; `none` counts as empty.
#[derive(Debug, Clone, Copy)]
pub struct ListField {
    pub label: &'static str,
}

impl ListField {
    pub fn extract(&self, text: &str) -> Vec<String> {
        let Some((index, inline)) = find_label(text, self.label) else {
            return Vec::new();
        };

        let mut items: Vec<String> = Vec::new();
        if !is_empty_marker(&inline) {
            items.extend(
                inline
                    .split(';')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !is_empty_marker(s)),
            );
        }

        for line in text.lines().skip(index + 1) {
            if line.trim().is_empty() {
                continue;
            }
            match BULLET.captures(line) {
                Some(caps) => {
                    let item = caps[1].trim_matches('*').trim();
                    if !is_empty_marker(item) {
                        items.push(item.to_string());
                    }
                }
                None => break,
            }
        }
        items
    }
}

/// Free text from the label up to the next declared label. When the label is
/// missing entirely, the first `fallback_chars` characters of the raw text.
#[derive(Debug, Clone, Copy)]
pub struct TextField {
    pub label: &'static str,
    pub fallback_chars: usize,
}

impl TextField {
    pub fn extract(&self, text: &str) -> String {
        let Some((index, inline)) = find_label(text, self.label) else {
            return char_prefix(text, self.fallback_chars);
        };

        let mut section = vec![inline];
        for line in text.lines().skip(index + 1) {
            if is_declared_label_line(line) {
                break;
            }
            section.push(line.trim_end().to_string());
        }
        section.join("\n").trim().to_string()
    }
}

/// Single-line value with no fallback.
#[derive(Debug, Clone, Copy)]
pub struct LineField {
    pub label: &'static str,
}

impl LineField {
    pub fn extract(&self, text: &str) -> String {
        find_label(text, self.label)
            .map(|(_, value)| value)
            .unwrap_or_default()
    }
}

/// Yes/no flag.
#[derive(Debug, Clone, Copy)]
pub struct FlagField {
    pub label: &'static str,
    pub default: bool,
}

impl FlagField {
    pub fn extract(&self, text: &str) -> bool {
        let Some((_, value)) = find_label(text, self.label) else {
            return self.default;
        };
        let word = value
            .split(|c: char| !c.is_ascii_alphanumeric())
            .find(|w| !w.is_empty())
            .unwrap_or_default()
            .to_ascii_lowercase();
        match word.as_str() {
            "yes" | "y" | "true" | "approved" | "approve" => true,
            "no" | "n" | "false" | "rejected" | "reject" | "denied" | "deny" => false,
            _ => self.default,
        }
    }
}

/// Comma- or space-separated ticker symbols, deduplicated in order.
#[derive(Debug, Clone, Copy)]
pub struct TickerField {
    pub label: &'static str,
}

impl TickerField {
    pub fn extract(&self, text: &str) -> Vec<String> {
        let Some((_, value)) = find_label(text, self.label) else {
            return Vec::new();
        };

        let mut symbols: Vec<String> = Vec::new();
        for token in value.split(|c: char| c == ',' || c == ';' || c.is_whitespace()) {
            let token = token.trim_matches(|c: char| !c.is_ascii_alphanumeric());
            if TICKER.is_match(token)
                && !NOT_TICKERS.contains(&token)
                && !symbols.iter().any(|s| s == token)
            {
                symbols.push(token.to_string());
            }
        }
        symbols
    }
}

/// How a field is shown to the agent in a prompt's format block.
pub trait FieldFormat {
    fn label(&self) -> &'static str;
    /// The value placeholder, e.g. `BUY|SELL|HOLD` or `<number 0-1>`.
    fn placeholder(&self) -> String;
    /// Bulleted blocks are rendered over several lines.
    fn is_block(&self) -> bool {
        false
    }
}

impl<T: Labeled> FieldFormat for ChoiceField<T> {
    fn label(&self) -> &'static str {
        self.label
    }
    fn placeholder(&self) -> String {
        T::choices()
    }
}

impl FieldFormat for NumberField {
    fn label(&self) -> &'static str {
        self.label
    }
    fn placeholder(&self) -> String {
        format!("<number {}-{}>", self.min, self.max)
    }
}

impl FieldFormat for ListField {
    fn label(&self) -> &'static str {
        self.label
    }
    fn placeholder(&self) -> String {
        "- <one item per line>".to_string()
    }
    fn is_block(&self) -> bool {
        true
    }
}

impl FieldFormat for TextField {
    fn label(&self) -> &'static str {
        self.label
    }
    fn placeholder(&self) -> String {
        "<text>".to_string()
    }
}

impl FieldFormat for LineField {
    fn label(&self) -> &'static str {
        self.label
    }
    fn placeholder(&self) -> String {
        "<one line>".to_string()
    }
}

impl FieldFormat for FlagField {
    fn label(&self) -> &'static str {
        self.label
    }
    fn placeholder(&self) -> String {
        "yes|no".to_string()
    }
}

impl FieldFormat for TickerField {
    fn label(&self) -> &'static str {
        self.label
    }
    fn placeholder(&self) -> String {
        "<comma-separated tickers, or none>".to_string()
    }
}

/// Ordered field list describing one agent's answer.
pub type Grammar = &'static [&'static (dyn FieldFormat + Sync)];

/// Render the answer-format instructions for a grammar.
pub fn format_block(grammar: Grammar) -> String {
    let mut out = String::from(
        "Finish your answer with these labeled fields, each label at the start of its own line:\n",
    );
    for field in grammar {
        if field.is_block() {
            out.push_str(&format!("{}:\n{}\n", field.label(), field.placeholder()));
        } else {
            out.push_str(&format!("{}: {}\n", field.label(), field.placeholder()));
        }
    }
    out
}
