//! Version pragma extraction.
//!
//! Solidity sources declare the compiler range they accept with a pragma such
//! as `pragma solidity >=0.4.6 <0.9.0;`. Pragma ranges follow npm-style range
//! syntax, which differs from cargo's in two places that matter here:
//!
//! - comparators in one range are separated by whitespace, not commas;
//! - a bare version (`0.8.0`) means exactly that version, not a caret range.
//!
//! [`VersionConstraint`] normalizes those differences onto [`semver::VersionReq`]
//! and adds `||` alternatives and `a - b` hyphen ranges on top.

use crate::error::{SolcError, SolcResult};
use regex::Regex;
use semver::{Version, VersionReq};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

/// A parsed compiler version range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionConstraint {
    expression: String,
    alternatives: Vec<VersionReq>,
}

impl VersionConstraint {
    /// Parse a pragma range expression such as `^0.8.0` or `>=0.4.6 <0.9.0`.
    pub fn parse(expression: &str) -> SolcResult<Self> {
        let expression = expression.split_whitespace().collect::<Vec<_>>().join(" ");
        if expression.is_empty() {
            return Err(malformed(&expression, "empty version expression"));
        }

        let alternatives = expression
            .split("||")
            .map(|range| parse_range(&expression, range.trim()))
            .collect::<SolcResult<Vec<_>>>()?;

        Ok(Self {
            expression,
            alternatives,
        })
    }

    /// Whether `version` satisfies any alternative of this range.
    pub fn matches(&self, version: &Version) -> bool {
        self.alternatives.iter().any(|req| req.matches(version))
    }

    /// The normalized pragma expression
    pub fn expression(&self) -> &str {
        &self.expression
    }

    /// One requirement per `||` alternative
    pub fn alternatives(&self) -> &[VersionReq] {
        &self.alternatives
    }

    /// Range satisfied only by versions both `self` and `other` accept.
    ///
    /// Alternatives distribute: `(a || b)` with `c` becomes `(a c) || (b c)`.
    pub fn intersect(&self, other: &VersionConstraint) -> VersionConstraint {
        let mut expressions = Vec::new();
        let mut alternatives = Vec::new();
        for (left_expr, left) in self.ranges().zip(&self.alternatives) {
            for (right_expr, right) in other.ranges().zip(&other.alternatives) {
                expressions.push(format!("{left_expr} {right_expr}"));
                alternatives.push(VersionReq {
                    comparators: left
                        .comparators
                        .iter()
                        .chain(&right.comparators)
                        .cloned()
                        .collect(),
                });
            }
        }
        VersionConstraint {
            expression: expressions.join(" || "),
            alternatives,
        }
    }

    fn ranges(&self) -> impl Iterator<Item = &str> {
        self.expression.split("||").map(str::trim)
    }
}

impl FromStr for VersionConstraint {
    type Err = SolcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for VersionConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.expression)
    }
}

/// Find and parse the version pragmas declared in `source`.
///
/// Comments are ignored. `pragma solidity <expr>;` is preferred; a bare
/// `pragma <expr>;` whose expression starts like a version range is accepted
/// as a fallback. Other pragmas (`experimental`, `abicoder`) are skipped.
///
/// Flattened sources carry one pragma per original file; every declaration
/// must hold, so the result is their intersection.
pub fn extract_constraint(source: &str) -> SolcResult<VersionConstraint> {
    let code = comment_pattern().replace_all(source, " ");

    let mut declared = declarations(solidity_pragma(), &code);
    if declared.is_empty() {
        declared = declarations(bare_pragma(), &code);
    }

    let mut constraints = declared.iter().map(|expr| VersionConstraint::parse(expr));
    let first = constraints.next().ok_or(SolcError::ConstraintNotFound)??;
    constraints.try_fold(first, |merged, next| -> SolcResult<VersionConstraint> {
        Ok(merged.intersect(&next?))
    })
}

fn declarations<'a>(pattern: &Regex, code: &'a str) -> Vec<&'a str> {
    pattern
        .captures_iter(code)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
        .collect()
}

fn comment_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?s)/\*.*?\*/|//[^\n]*").expect("valid comment regex"))
}

fn solidity_pragma() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\bpragma\s+solidity\b([^;]*)").expect("valid pragma regex")
    })
}

fn bare_pragma() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\bpragma\s+([~^<>=*0-9][^;\n]*)").expect("valid pragma regex")
    })
}

fn malformed(expression: &str, reason: impl Into<String>) -> SolcError {
    SolcError::ConstraintMalformed {
        expression: expression.to_string(),
        reason: reason.into(),
    }
}

/// Translate one `||`-free range into a cargo-style requirement.
fn parse_range(expression: &str, range: &str) -> SolcResult<VersionReq> {
    if range.is_empty() {
        return Err(malformed(expression, "empty alternative"));
    }

    let comparators = match range.split_once(" - ") {
        Some((lower, upper)) => vec![
            format!(">={}", lower.trim()),
            format!("<={}", upper.trim()),
        ],
        None => join_operators(range)?
            .into_iter()
            .map(|comparator| exact_if_bare(&comparator))
            .collect(),
    };

    VersionReq::parse(&comparators.join(", ")).map_err(|e| malformed(expression, e.to_string()))
}

/// Merge operators written apart from their version (`>= 0.4.6`) and split
/// comparators written together (`>=0.4.0<0.6.0`).
fn join_operators(range: &str) -> SolcResult<Vec<String>> {
    let mut comparators = Vec::new();
    let mut pending_op: Option<&str> = None;

    for token in range.split_whitespace().flat_map(split_glued) {
        let is_operator = token.chars().all(is_operator_char);
        match (pending_op.take(), is_operator) {
            (Some(op), false) => comparators.push(format!("{op}{token}")),
            (None, true) => pending_op = Some(token),
            (None, false) => comparators.push(token.to_string()),
            (Some(op), true) => {
                return Err(malformed(range, format!("operator '{op}' without a version")))
            }
        }
    }
    if let Some(op) = pending_op {
        return Err(malformed(range, format!("operator '{op}' without a version")));
    }
    Ok(comparators)
}

fn is_operator_char(c: char) -> bool {
    matches!(c, '<' | '>' | '=' | '^' | '~')
}

/// Break a token wherever an operator follows a version character.
fn split_glued(token: &str) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut start = 0;
    let mut previous_is_operator = true;
    for (index, c) in token.char_indices() {
        let is_operator = is_operator_char(c);
        if is_operator && !previous_is_operator {
            pieces.push(&token[start..index]);
            start = index;
        }
        previous_is_operator = is_operator;
    }
    pieces.push(&token[start..]);
    pieces
}

/// A bare numeric version pins exactly, unlike cargo's implicit caret.
fn exact_if_bare(comparator: &str) -> String {
    if comparator.chars().all(|c| c.is_ascii_digit() || c == '.') {
        format!("={comparator}")
    } else {
        comparator.to_string()
    }
}
