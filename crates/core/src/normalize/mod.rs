//! Text normalization for recognized cell text.
//!
//! Every cell goes through the same three passes:
//!
//! 1. dictionary: literal known-wrong tokens are replaced
//! 2. patterns: regex rules in their configured order
//! 3. cleanup: whitespace runs collapse to one space, ends are trimmed
//!
//! The passes repeat until the text stops changing, which makes
//! `normalize` idempotent for every rule set that converges.

mod builtin;
mod rules;

pub use builtin::BUILTIN_RULES_VERSION;
pub use rules::{CorrectionRule, Dictionary, PatternRule, PatternSpec};

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::warn;

use crate::error::{LayoutError, Result};

/// Upper bound on full pipeline passes per string.
pub const MAX_NORMALIZE_PASSES: usize = 8;

static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s{2,}").unwrap());

/// A versioned, ordered set of corrections.
#[derive(Clone, Debug, Default)]
pub struct RuleSet {
    pub version: String,
    dictionary: Dictionary,
    patterns: Vec<PatternRule>,
}

impl RuleSet {
    /// Compile a rule set. Fails on the first invalid pattern or
    /// non-convergent dictionary entry.
    pub fn new(
        version: impl Into<String>,
        dictionary: IndexMap<String, String>,
        patterns: &[PatternSpec],
    ) -> Result<Self> {
        Ok(Self {
            version: version.into(),
            dictionary: Dictionary::new(dictionary)?,
            patterns: compile_patterns(patterns, 0)?,
        })
    }

    /// A rule set that only performs whitespace cleanup.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The rule set shipped with the engine.
    pub fn builtin() -> Self {
        builtin::builtin_rules()
    }

    /// Append another rule set: dictionary entries override, patterns run
    /// after the current ones.
    pub fn extended_with(
        &self,
        dictionary: IndexMap<String, String>,
        patterns: &[PatternSpec],
    ) -> Result<Self> {
        let mut merged = self.dictionary.entries().clone();
        merged.extend(dictionary);
        let mut all = self.patterns.clone();
        all.extend(compile_patterns(patterns, self.patterns.len())?);
        Ok(Self {
            version: self.version.clone(),
            dictionary: Dictionary::new(merged)?,
            patterns: all,
        })
    }

    pub fn dictionary(&self) -> &Dictionary {
        &self.dictionary
    }

    pub fn patterns(&self) -> &[PatternRule] {
        &self.patterns
    }

    /// Every rule in application order.
    pub fn rules(&self) -> Vec<CorrectionRule<'_>> {
        self.dictionary
            .entries()
            .iter()
            .map(|(from, to)| CorrectionRule::Literal {
                from: from.as_str(),
                to: to.as_str(),
            })
            .chain(self.patterns.iter().map(CorrectionRule::Pattern))
            .collect()
    }
}

/// Untagged rules are named after their position in the whole pattern list.
fn compile_patterns(specs: &[PatternSpec], offset: usize) -> Result<Vec<PatternRule>> {
    specs
        .iter()
        .enumerate()
        .map(|(i, spec)| PatternRule::compile(spec, offset + i))
        .collect()
}

/// Applies a [`RuleSet`] to cell text.
#[derive(Clone, Debug, Default)]
pub struct TextNormalizer {
    rules: RuleSet,
}

impl TextNormalizer {
    pub fn new(rules: RuleSet) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Normalize `text` to a fixed point of the pipeline.
    ///
    /// # Errors
    /// `NonConvergentRule` naming the first rule still rewriting the text
    /// after [`MAX_NORMALIZE_PASSES`] passes. Rule sets are checked for the
    /// common cycles when they are built, so this only fires for pattern
    /// templates that feed each other.
    pub fn normalize(&self, text: &str) -> Result<String> {
        let mut current = self.pass(text);
        for _ in 1..MAX_NORMALIZE_PASSES {
            let next = self.pass(&current);
            if next == current {
                return Ok(current);
            }
            current = next;
        }
        let tag = self.rewriting_rule(&current);
        warn!(
            version = %self.rules.version,
            rule = %tag,
            passes = MAX_NORMALIZE_PASSES,
            "normalization did not settle"
        );
        Err(LayoutError::NonConvergentRule { tag })
    }

    /// One dictionary, pattern and cleanup pass.
    fn pass(&self, text: &str) -> String {
        let mut out = self.rules.dictionary.apply(text);
        for rule in &self.rules.patterns {
            out = rule.apply(&out);
        }
        cleanup(&out)
    }

    /// Tag of the first step of a pass that changes `text`.
    fn rewriting_rule(&self, text: &str) -> String {
        let mut current = self.rules.dictionary.apply(text);
        if current != text {
            return "dictionary".to_string();
        }
        for rule in &self.rules.patterns {
            let next = rule.apply(&current);
            if next != current {
                return rule.tag.clone();
            }
            current = next;
        }
        "cleanup".to_string()
    }
}

/// Collapse whitespace runs and trim.
pub fn cleanup(text: &str) -> String {
    WHITESPACE_RUN.replace_all(text, " ").trim().to_string()
}
