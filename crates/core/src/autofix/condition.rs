//! Single-comparison trigger conditions.
//!
//! A trigger is `<key> <op> <number>`, e.g. `cpu_usage_percent >= 85.5`.
//! The whole string must match one anchored regex; the captured key is then
//! looked up verbatim in the flattened metrics. Nothing is ever substituted
//! into or executed as code.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;

use crate::metrics::FlatMetrics;

static CONDITION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Za-z0-9_]+)\s*(>=|<=|==|!=|>|<)\s*([+-]?[0-9]+(?:\.[0-9]*)?)$")
        .expect("valid regex")
});

/// Comparison operator of a trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    GreaterThan,
    LessThan,
    GreaterOrEqual,
    LessOrEqual,
    Equal,
    NotEqual,
}

impl Comparison {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::GreaterThan => ">",
            Self::LessThan => "<",
            Self::GreaterOrEqual => ">=",
            Self::LessOrEqual => "<=",
            Self::Equal => "==",
            Self::NotEqual => "!=",
        }
    }

    /// Apply the operator as `value <op> threshold`.
    #[allow(clippy::float_cmp)]
    pub fn apply(self, value: f64, threshold: f64) -> bool {
        match self {
            Self::GreaterThan => value > threshold,
            Self::LessThan => value < threshold,
            Self::GreaterOrEqual => value >= threshold,
            Self::LessOrEqual => value <= threshold,
            Self::Equal => value == threshold,
            Self::NotEqual => value != threshold,
        }
    }
}

impl FromStr for Comparison {
    type Err = ConditionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            ">" => Ok(Self::GreaterThan),
            "<" => Ok(Self::LessThan),
            ">=" => Ok(Self::GreaterOrEqual),
            "<=" => Ok(Self::LessOrEqual),
            "==" => Ok(Self::Equal),
            "!=" => Ok(Self::NotEqual),
            other => Err(ConditionError::InvalidFormat(other.to_string())),
        }
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a condition did not evaluate to a boolean.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConditionError {
    #[error("invalid condition format: {0:?}")]
    InvalidFormat(String),

    #[error("metric not found: {0}")]
    MetricNotFound(String),

    #[error("invalid comparison value: {0:?}")]
    InvalidValue(String),
}

/// A parsed trigger.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub key: String,
    pub op: Comparison,
    pub threshold: f64,
}

impl Condition {
    /// Evaluate against flattened metrics. The key must be present verbatim.
    pub fn evaluate(&self, flat: &FlatMetrics) -> Result<bool, ConditionError> {
        let value = flat
            .get(&self.key)
            .ok_or_else(|| ConditionError::MetricNotFound(self.key.clone()))?;
        Ok(self.op.apply(*value, self.threshold))
    }
}

impl FromStr for Condition {
    type Err = ConditionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse(s)
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.key, self.op, self.threshold)
    }
}

/// Parse a trigger string. Surrounding whitespace is ignored.
pub fn parse(condition: &str) -> Result<Condition, ConditionError> {
    let trimmed = condition.trim();
    let caps = CONDITION_RE
        .captures(trimmed)
        .ok_or_else(|| ConditionError::InvalidFormat(trimmed.to_string()))?;

    let key = caps[1].to_string();
    let op = caps[2].parse::<Comparison>()?;
    let literal = &caps[3];
    let threshold = literal
        .parse::<f64>()
        .map_err(|_| ConditionError::InvalidValue(literal.to_string()))?;

    Ok(Condition { key, op, threshold })
}

/// Parse and evaluate in one step, keeping the failure reason.
pub fn check(flat: &FlatMetrics, condition: &str) -> Result<bool, ConditionError> {
    parse(condition)?.evaluate(flat)
}

/// Evaluate a trigger, failing closed.
///
/// Any failure yields `false`. Malformed triggers are logged as warnings;
/// missing metrics only at debug level since snapshots legitimately omit
/// categories from time to time.
pub fn evaluate(flat: &FlatMetrics, condition: &str) -> bool {
    match check(flat, condition) {
        Ok(result) => result,
        Err(ConditionError::MetricNotFound(key)) => {
            tracing::debug!(condition, metric = %key, "Metric not found, condition not met");
            false
        }
        Err(e) => {
            tracing::warn!(condition, error = %e, "Invalid condition, treating as not met");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn flat(pairs: &[(&str, f64)]) -> FlatMetrics {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn operators_against_equal_value() {
        let m = flat(&[("x", 10.0)]);
        assert!(!evaluate(&m, "x > 10"));
        assert!(!evaluate(&m, "x < 10"));
        assert!(evaluate(&m, "x >= 10"));
        assert!(evaluate(&m, "x <= 10"));
        assert!(evaluate(&m, "x == 10"));
        assert!(!evaluate(&m, "x != 10"));
    }

    #[test]
    fn operators_against_smaller_value() {
        let m = flat(&[("x", 10.0)]);
        assert!(evaluate(&m, "x > 5"));
        assert!(!evaluate(&m, "x < 5"));
        assert!(evaluate(&m, "x >= 5"));
        assert!(!evaluate(&m, "x <= 5"));
        assert!(!evaluate(&m, "x == 5"));
        assert!(evaluate(&m, "x != 5"));
    }

    #[test]
    fn whitespace_is_optional_and_trimmed() {
        let m = flat(&[("cpu_usage_percent", 90.0)]);
        assert!(evaluate(&m, "cpu_usage_percent>80"));
        assert!(evaluate(&m, "  cpu_usage_percent   >=   80.5  "));
    }

    #[test]
    fn signed_and_decimal_thresholds() {
        let m = flat(&[("temp_delta", -2.5)]);
        assert!(evaluate(&m, "temp_delta < -1"));
        assert!(evaluate(&m, "temp_delta == -2.5"));
        assert!(evaluate(&m, "temp_delta > -3.25"));
        assert!(!evaluate(&m, "temp_delta > +0"));
    }

    #[test]
    fn trailing_decimal_point_is_a_number() {
        let m = flat(&[("cpu_usage_percent", 90.0)]);
        assert!(evaluate(&m, "cpu_usage_percent > 80."));
        assert_eq!(parse("cpu_usage_percent > 80.").unwrap().threshold, 80.0);
        assert!(parse("cpu_usage_percent > .5").is_err());
    }

    #[test]
    fn missing_metric_is_false_not_error() {
        let m = flat(&[("cpu_usage_percent", 50.0)]);
        assert!(!evaluate(&m, "memory_percent > 80"));
        assert_matches!(
            check(&m, "memory_percent > 80"),
            Err(ConditionError::MetricNotFound(key)) if key == "memory_percent"
        );
    }

    #[test]
    fn malformed_conditions_fail_closed() {
        let m = flat(&[("x", 1.0)]);
        for bad in [
            "x between 1 and 2",
            "x > 1 and x < 2",
            "x => 1",
            "x = 1",
            "(x > 1)",
            "x > abc",
            "x > .5",
            "x > 1e3",
            "> 1",
            "x >",
            "",
            "__import__('os').system('id') > 0",
        ] {
            assert!(!evaluate(&m, bad), "{bad:?} should not evaluate to true");
            assert_matches!(check(&m, bad), Err(ConditionError::InvalidFormat(_)), "{bad:?}");
        }
    }

    #[test]
    fn exact_key_lookup_ignores_substring_keys() {
        // `cpu` is a prefix of `cpu_usage_percent`; only the exact key counts.
        let m = flat(&[("cpu", 5.0), ("cpu_usage_percent", 95.0)]);
        assert!(evaluate(&m, "cpu_usage_percent > 80"));
        assert!(!evaluate(&m, "cpu > 80"));

        let only_prefix = flat(&[("cpu", 95.0)]);
        assert!(!evaluate(&only_prefix, "cpu_usage_percent > 80"));
    }

    #[test]
    fn parse_extracts_parts() {
        let cond = parse("disk_percent >= 92.5").unwrap();
        assert_eq!(cond.key, "disk_percent");
        assert_eq!(cond.op, Comparison::GreaterOrEqual);
        assert_eq!(cond.threshold, 92.5);
        assert_eq!(cond.to_string(), "disk_percent >= 92.5");
    }

    #[test]
    fn two_char_operators_win_over_one_char() {
        assert_eq!(parse("x<=1").unwrap().op, Comparison::LessOrEqual);
        assert_eq!(parse("x!=1").unwrap().op, Comparison::NotEqual);
    }

    #[test]
    fn unknown_operator_string_is_rejected() {
        assert_matches!("=>".parse::<Comparison>(), Err(ConditionError::InvalidFormat(_)));
    }
}
