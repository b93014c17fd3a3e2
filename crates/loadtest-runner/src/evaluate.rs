//! Threshold evaluation
//!
//! Applies the configuration's predicate expressions to a finished run's
//! summary. Selectors address a metric, optionally scoped to one scenario:
//!
//! ```text
//! http_req_failed                          rate<0.05
//! http_req_duration                        p(95)<2500
//! http_req_duration{scenario:wine-predict} p(95)<3000
//! http_reqs                                rate>5
//! checks                                   rate>0.90
//! ```
//!
//! A selector whose scope recorded no traffic is skipped rather than failed;
//! a malformed selector or expression is a loud error.

use crate::metrics::{RunSummary, TrendStats};
use loadtest_core::ThresholdSet;
use serde::Serialize;
use std::fmt;
use thiserror::Error;
use tracing::debug;

/// Errors that can occur while evaluating thresholds
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EvalError {
    /// Predicate expression could not be parsed
    #[error("Malformed threshold expression '{0}'")]
    BadExpression(String),

    /// Selector does not address a known metric or statistic
    #[error("Unknown metric selector '{0}'")]
    UnknownSelector(String),
}

/// Result of applying one predicate to the summary
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ThresholdOutcome {
    pub selector: String,
    pub expression: String,
    pub actual: f64,
    pub passed: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Op {
    Lt,
    Le,
    Gt,
    Ge,
}

impl Op {
    fn apply(&self, actual: f64, bound: f64) -> bool {
        match self {
            Op::Lt => actual < bound,
            Op::Le => actual <= bound,
            Op::Gt => actual > bound,
            Op::Ge => actual >= bound,
        }
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Op::Lt => "<",
            Op::Le => "<=",
            Op::Gt => ">",
            Op::Ge => ">=",
        })
    }
}

/// Evaluate every threshold in the set against the run summary
pub fn evaluate(
    thresholds: &ThresholdSet,
    summary: &RunSummary,
) -> Result<Vec<ThresholdOutcome>, EvalError> {
    let mut outcomes = Vec::new();
    for (selector, expressions) in thresholds.iter() {
        let (metric, scope) = parse_selector(selector)?;
        for expression in expressions {
            let (stat, op, bound) = parse_expression(expression)?;
            match resolve(summary, metric, scope, &stat) {
                Resolved::Value(actual) => outcomes.push(ThresholdOutcome {
                    selector: selector.clone(),
                    expression: expression.clone(),
                    actual,
                    passed: op.apply(actual, bound),
                }),
                Resolved::NoData => {
                    debug!(selector = %selector, "no data recorded for threshold, skipping");
                }
                Resolved::Unknown => {
                    return Err(EvalError::UnknownSelector(selector.clone()));
                }
            }
        }
    }
    Ok(outcomes)
}

enum Resolved {
    Value(f64),
    NoData,
    Unknown,
}

/// Split `metric{scenario:name}` into metric and optional scope
fn parse_selector(selector: &str) -> Result<(&str, Option<&str>), EvalError> {
    match selector.split_once('{') {
        None => Ok((selector.trim(), None)),
        Some((metric, rest)) => {
            let tag = rest
                .strip_suffix('}')
                .ok_or_else(|| EvalError::UnknownSelector(selector.to_string()))?;
            let (key, value) = tag
                .split_once(':')
                .ok_or_else(|| EvalError::UnknownSelector(selector.to_string()))?;
            if key.trim() != "scenario" {
                return Err(EvalError::UnknownSelector(selector.to_string()));
            }
            Ok((metric.trim(), Some(value.trim())))
        }
    }
}

/// Split `p(95)<2500` into statistic, operator and bound
fn parse_expression(expression: &str) -> Result<(String, Op, f64), EvalError> {
    let bad = || EvalError::BadExpression(expression.to_string());

    let (lhs, op, rhs) = if let Some((lhs, rhs)) = expression.split_once("<=") {
        (lhs, Op::Le, rhs)
    } else if let Some((lhs, rhs)) = expression.split_once(">=") {
        (lhs, Op::Ge, rhs)
    } else if let Some((lhs, rhs)) = expression.split_once('<') {
        (lhs, Op::Lt, rhs)
    } else if let Some((lhs, rhs)) = expression.split_once('>') {
        (lhs, Op::Gt, rhs)
    } else {
        return Err(bad());
    };

    let stat = lhs.trim();
    if stat.is_empty() {
        return Err(bad());
    }
    let bound: f64 = rhs.trim().parse().map_err(|_| bad())?;
    Ok((stat.to_string(), op, bound))
}

fn resolve(summary: &RunSummary, metric: &str, scope: Option<&str>, stat: &str) -> Resolved {
    match (metric, scope) {
        ("http_req_failed", None) if stat == "rate" => Resolved::Value(summary.failure_rate),
        ("http_reqs", None) if stat == "rate" => Resolved::Value(summary.request_rate),
        ("http_reqs", None) if stat == "count" => Resolved::Value(summary.http_reqs as f64),
        ("http_req_duration", None) => match summary.http_req_duration.stat(stat) {
            Some(value) => Resolved::Value(value),
            None => Resolved::Unknown,
        },
        ("http_req_duration", Some(scenario)) => {
            // validate the statistic even when the scope has no samples
            if TrendStats::default().stat(stat).is_none() {
                return Resolved::Unknown;
            }
            match summary.scenarios.get(scenario) {
                Some(trend) => match trend.stat(stat) {
                    Some(value) => Resolved::Value(value),
                    None => Resolved::Unknown,
                },
                None => Resolved::NoData,
            }
        }
        ("checks", None) if stat == "rate" => Resolved::Value(summary.checks.pass_rate()),
        ("checks", Some(scenario)) if stat == "rate" => match summary.checks.scope_rate(scenario) {
            Some(rate) => Resolved::Value(rate),
            None => Resolved::NoData,
        },
        _ => Resolved::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;
    use loadtest_core::threshold_set;
    use loadtest_http::CheckReport;

    fn summary() -> RunSummary {
        let mut scenarios = IndexMap::new();
        scenarios.insert(
            "wine-predict".to_string(),
            TrendStats {
                avg: 120.0,
                min: 40.0,
                med: 100.0,
                max: 900.0,
                p90: 300.0,
                p95: 400.0,
                p99: 800.0,
            },
        );
        RunSummary {
            test_type: "smoke".to_string(),
            test_target: "model-wine".to_string(),
            duration_secs: 10.0,
            http_reqs: 100,
            http_req_failed: 3,
            failure_rate: 0.03,
            request_rate: 10.0,
            http_req_duration: TrendStats {
                avg: 100.0,
                min: 10.0,
                med: 80.0,
                max: 950.0,
                p90: 250.0,
                p95: 350.0,
                p99: 900.0,
            },
            scenarios,
            checks: CheckReport::default(),
        }
    }

    #[test]
    fn test_failure_rate_threshold() {
        let outcomes = evaluate(
            &threshold_set(&[("http_req_failed", &["rate<0.05"])]),
            &summary(),
        )
        .unwrap();
        assert_eq!(outcomes.len(), 1);
        assert!(outcomes[0].passed);
        assert!((outcomes[0].actual - 0.03).abs() < 1e-9);
    }

    #[test]
    fn test_duration_percentile_threshold() {
        let outcomes = evaluate(
            &threshold_set(&[("http_req_duration", &["p(95)<3000", "p(99)<500"])]),
            &summary(),
        )
        .unwrap();
        assert!(outcomes[0].passed); // 350 < 3000
        assert!(!outcomes[1].passed); // 900 >= 500
    }

    #[test]
    fn test_scoped_duration_uses_scenario_histogram() {
        let outcomes = evaluate(
            &threshold_set(&[("http_req_duration{scenario:wine-predict}", &["p(95)<500"])]),
            &summary(),
        )
        .unwrap();
        assert!(outcomes[0].passed);
        assert!((outcomes[0].actual - 400.0).abs() < 1e-9);
    }

    #[test]
    fn test_scoped_selector_without_data_is_skipped() {
        let outcomes = evaluate(
            &threshold_set(&[("http_req_duration{scenario:ghost}", &["p(95)<500"])]),
            &summary(),
        )
        .unwrap();
        assert!(outcomes.is_empty());
    }

    #[test]
    fn test_throughput_floor() {
        let outcomes = evaluate(&threshold_set(&[("http_reqs", &["rate>5"])]), &summary()).unwrap();
        assert!(outcomes[0].passed);
    }

    #[test]
    fn test_bad_expression_is_loud() {
        assert_eq!(
            evaluate(&threshold_set(&[("http_req_failed", &["rate=0.05"])]), &summary()),
            Err(EvalError::BadExpression("rate=0.05".to_string()))
        );
        assert_eq!(
            evaluate(&threshold_set(&[("http_req_duration", &["p(50)<100"])]), &summary()),
            Err(EvalError::UnknownSelector("http_req_duration".to_string()))
        );
    }

    #[test]
    fn test_unknown_metric_is_loud() {
        assert!(matches!(
            evaluate(&threshold_set(&[("grpc_req_duration", &["p(95)<100"])]), &summary()),
            Err(EvalError::UnknownSelector(_))
        ));
        assert!(matches!(
            evaluate(&threshold_set(&[("http_req_duration{region:eu}", &["p(95)<100"])]), &summary()),
            Err(EvalError::UnknownSelector(_))
        ));
    }

    #[test]
    fn test_operator_variants() {
        assert!(Op::Le.apply(5.0, 5.0));
        assert!(!Op::Lt.apply(5.0, 5.0));
        assert!(Op::Ge.apply(5.0, 5.0));
        assert!(Op::Gt.apply(6.0, 5.0));
    }
}
