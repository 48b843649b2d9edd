//! # Path Eligibility Policy
//!
//! Ordered include/exclude path rules evaluated on every request. The rule
//! set is built once at initialization and never mutated afterwards.
//!
//! Precedence: a path matching any exclude pattern is ineligible regardless
//! of include matches. Within a category the first declared matching rule
//! wins. When no include rules are configured, every non-excluded path is
//! eligible.

use serde::{Deserialize, Serialize};

/// Whether a rule includes or excludes matching paths
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleKind {
    Include,
    Exclude,
}

/// A single path pattern tagged include or exclude
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathRule {
    pub kind: RuleKind,
    pub pattern: String,
}

impl PathRule {
    /// Create an include rule
    pub fn include<S: Into<String>>(pattern: S) -> Self {
        Self {
            kind: RuleKind::Include,
            pattern: pattern.into(),
        }
    }

    /// Create an exclude rule
    pub fn exclude<S: Into<String>>(pattern: S) -> Self {
        Self {
            kind: RuleKind::Exclude,
            pattern: pattern.into(),
        }
    }
}

/// Immutable rule set resolving eligibility for request paths.
///
/// Patterns are matched against the path relative to `base_path`, so the
/// configuration reads the same whether the application is mounted at the
/// host root or under a sub-path.
#[derive(Debug, Clone, Default)]
pub struct PathRules {
    base_path: String,
    rules: Vec<PathRule>,
}

impl PathRules {
    /// Build a rule set for the given mount point
    pub fn new<S: Into<String>>(base_path: S, rules: Vec<PathRule>) -> Self {
        Self {
            base_path: base_path.into(),
            rules,
        }
    }

    /// Decide whether the given full request path is cache-eligible.
    /// Pure and side-effect free; safe to call on every request.
    pub fn is_eligible(&self, path: &str) -> bool {
        let relative = self.relative_path(path);

        let mut has_includes = false;
        let mut included = false;
        for rule in &self.rules {
            match rule.kind {
                RuleKind::Exclude => {
                    if pattern_matches(&rule.pattern, relative) {
                        return false;
                    }
                }
                RuleKind::Include => {
                    has_includes = true;
                    if !included && pattern_matches(&rule.pattern, relative) {
                        included = true;
                    }
                }
            }
        }

        !has_includes || included
    }

    /// Strip the mount prefix; paths outside the mount are evaluated as-is
    fn relative_path<'a>(&self, path: &'a str) -> &'a str {
        if self.base_path.is_empty() {
            return path;
        }
        match path.strip_prefix(self.base_path.as_str()) {
            Some("") => "/",
            Some(rest) if rest.starts_with('/') => rest,
            _ => path,
        }
    }
}

/// Exact-or-segment-prefix match: `/health` matches `/health` and
/// `/health/live` but not `/healthz`.
fn pattern_matches(pattern: &str, path: &str) -> bool {
    match path.strip_prefix(pattern) {
        Some("") => true,
        Some(rest) => pattern.ends_with('/') || rest.starts_with('/'),
        None => false,
    }
}
