//! Built-in correction rules for card-style solar equipment sheets.

use indexmap::IndexMap;

use super::RuleSet;
use super::rules::{Dictionary, PatternRule, PatternSpec};

/// Bump whenever an entry below changes meaning.
pub const BUILTIN_RULES_VERSION: &str = "1";

/// Recognizer misreads seen on these sheets, wrong -> right.
const DICTIONARY: &[(&str, &str)] = &[
    ("Enerqy", "Energy"),
    ("10Ok", "100k"),
    ("Pane1s", "Panels"),
    ("So1ar", "Solar"),
];

/// (tag, pattern, replacement), applied in this order.
const PATTERNS: &[(&str, &str, &str)] = &[
    // "928Panels" -> "928 Panels"
    ("digit-word", r"(\d)([A-Z][a-z]+)", "$1 $2"),
    // "WSolar" -> "W Solar"
    ("acronym-word", r"([A-Z]+)([A-Z][a-z]+)", "$1 $2"),
    // "A&B", "1+2+3" -> "A & B", "1 + 2 + 3"; each side is matched on its
    // own so chained symbols share their middle operand
    ("joining-symbol-left", r"(\w)\s*([&+])", "$1 $2"),
    ("joining-symbol-right", r"([&+])\s*(\w)", "$1 $2"),
];

pub(super) fn builtin_rules() -> RuleSet {
    let entries: IndexMap<String, String> = DICTIONARY
        .iter()
        .map(|(from, to)| (from.to_string(), to.to_string()))
        .collect();
    let specs: Vec<PatternSpec> = PATTERNS
        .iter()
        .map(|(tag, pattern, replacement)| PatternSpec::new(tag, pattern, replacement))
        .collect();
    let dictionary = Dictionary::new(entries).expect("built-in dictionary converges");
    let patterns = specs
        .iter()
        .enumerate()
        .map(|(i, spec)| PatternRule::compile(spec, i).expect("built-in pattern compiles"))
        .collect();
    RuleSet {
        version: BUILTIN_RULES_VERSION.to_string(),
        dictionary,
        patterns,
    }
}
