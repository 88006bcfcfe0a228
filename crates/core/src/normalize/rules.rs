//! Correction rules: literal dictionary entries and regex patterns.

use indexmap::IndexMap;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

use crate::error::{LayoutError, Result};

/// A pattern rule as written in configuration.
///
/// `replacement` uses the regex crate's template syntax: `$1`, `${name}`.
/// Use `${1}` when a group reference is directly followed by a letter.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PatternSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(rename = "match")]
    pub pattern: String,
    pub replacement: String,
}

impl PatternSpec {
    pub fn new(tag: &str, pattern: &str, replacement: &str) -> Self {
        Self {
            tag: Some(tag.to_string()),
            pattern: pattern.to_string(),
            replacement: replacement.to_string(),
        }
    }
}

/// A compiled pattern rule.
#[derive(Clone, Debug)]
pub struct PatternRule {
    pub tag: String,
    pub regex: Regex,
    pub replacement: String,
}

impl PatternRule {
    /// Compile a spec. Untagged specs are named after their position.
    pub fn compile(spec: &PatternSpec, position: usize) -> Result<Self> {
        let tag = spec
            .tag
            .clone()
            .unwrap_or_else(|| format!("pattern-{position}"));
        let regex = Regex::new(&spec.pattern).map_err(|source| LayoutError::InvalidRule {
            tag: tag.clone(),
            source,
        })?;
        // a literal replacement the rule would rewrite again never settles
        if !spec.replacement.contains('$') {
            let again = regex.replace_all(&spec.replacement, spec.replacement.as_str());
            if again != spec.replacement {
                return Err(LayoutError::NonConvergentRule { tag });
            }
        }
        Ok(Self {
            tag,
            regex,
            replacement: spec.replacement.clone(),
        })
    }

    pub fn apply(&self, text: &str) -> String {
        self.regex
            .replace_all(text, self.replacement.as_str())
            .into_owned()
    }
}

/// Literal known-wrong to corrected token substitutions.
///
/// All keys are matched in a single left-to-right scan, so replacements never
/// overlap and replaced text is not rescanned within the same pass. When two
/// keys match at the same position the longer one wins; equal lengths go to
/// the entry inserted first.
#[derive(Clone, Debug, Default)]
pub struct Dictionary {
    entries: IndexMap<String, String>,
    matcher: Option<Regex>,
}

impl Dictionary {
    /// Rejects empty keys, and any replacement that contains a key (its own
    /// or another entry's), since such entries can rewrite each other forever.
    pub fn new(entries: IndexMap<String, String>) -> Result<Self> {
        if entries.keys().any(String::is_empty) {
            return Err(LayoutError::InvalidConfig(
                "correction dictionary has an empty key".to_string(),
            ));
        }
        for (from, to) in &entries {
            if entries.keys().any(|key| to.contains(key.as_str())) {
                return Err(LayoutError::NonConvergentRule {
                    tag: format!("dict:{from}"),
                });
            }
        }
        if entries.is_empty() {
            return Ok(Self::default());
        }

        let mut keys: Vec<&str> = entries.keys().map(String::as_str).collect();
        keys.sort_by_key(|k| std::cmp::Reverse(k.len()));
        let alternation = keys
            .iter()
            .map(|k| regex::escape(k))
            .collect::<Vec<_>>()
            .join("|");
        let matcher = Regex::new(&alternation).map_err(|source| LayoutError::InvalidRule {
            tag: "dictionary".to_string(),
            source,
        })?;

        Ok(Self {
            entries,
            matcher: Some(matcher),
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &IndexMap<String, String> {
        &self.entries
    }

    pub fn apply(&self, text: &str) -> String {
        match &self.matcher {
            Some(matcher) => matcher
                .replace_all(text, |caps: &Captures<'_>| {
                    let key = &caps[0];
                    self.entries
                        .get(key)
                        .cloned()
                        .unwrap_or_else(|| key.to_string())
                })
                .into_owned(),
            None => text.to_string(),
        }
    }
}

/// One step of the correction pipeline, in application order.
#[derive(Clone, Copy, Debug)]
pub enum CorrectionRule<'a> {
    Literal { from: &'a str, to: &'a str },
    Pattern(&'a PatternRule),
}

impl CorrectionRule<'_> {
    pub fn tag(&self) -> String {
        match self {
            CorrectionRule::Literal { from, .. } => format!("dict:{from}"),
            CorrectionRule::Pattern(rule) => rule.tag.clone(),
        }
    }
}
