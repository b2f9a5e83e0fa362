/// A closed set of values that agents name in free-form prose.
///
/// Every enum the extractor can recover from text implements this, so the
/// allowed spellings live next to the type rather than inside the parser.
pub trait Labeled: Copy + Sized + 'static {
    /// All variants, in the order they are offered to an agent.
    const ALL: &'static [Self];

    /// The canonical spelling an agent is asked to emit.
    fn label(self) -> &'static str;

    /// Case-insensitive lookup of a variant by its label.
    fn from_label(text: &str) -> Option<Self> {
        let text = text.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|v| v.label().eq_ignore_ascii_case(text))
    }

    /// The allowed labels joined for display in prompts, e.g. `BUY|SELL|HOLD`.
    fn choices() -> String {
        Self::ALL
            .iter()
            .map(|v| v.label())
            .collect::<Vec<_>>()
            .join("|")
    }
}
