//! CVSS severity parsing
//!
//! Computes the CVSS v3.x base score from a vector string per the
//! official specification, and extracts severity information from OSV
//! records. Plain numeric scores are accepted as-is.

use std::collections::HashMap;

use tracing::debug;

use crate::osv::Severity;
use crate::{Error, Result};

/// Extract the base score and vector string from OSV severity data.
///
/// Only the first severity element is considered. An empty or missing
/// score yields `(None, "")`. A vector that cannot be parsed is still
/// returned so callers can persist it; the failure is logged at debug
/// level and the score is left absent.
pub fn extract_from_osv(severities: &[Severity]) -> (Option<f64>, String) {
    let Some(first) = severities.first() else {
        return (None, String::new());
    };

    let vector = first.score.trim().to_string();
    if vector.is_empty() {
        return (None, String::new());
    }

    match parse_vector(&vector) {
        Ok(score) => (Some(score), vector),
        Err(err) => {
            debug!(vector = %vector, error = %err, "severity vector not parseable");
            (None, vector)
        }
    }
}

/// Parse a severity vector string into a numeric base score.
///
/// `CVSS:3.x` vectors are computed via the base-score formula; any
/// other input is parsed as a plain decimal number.
pub fn parse_vector(vector: &str) -> Result<f64> {
    if vector.starts_with("CVSS:3.") {
        return compute_cvss3_base_score(vector);
    }

    vector.parse::<f64>().map_err(|e| Error::Severity {
        vector: vector.to_string(),
        reason: e.to_string(),
    })
}

fn invalid(vector: &str, reason: impl Into<String>) -> Error {
    Error::Severity {
        vector: vector.to_string(),
        reason: reason.into(),
    }
}

fn compute_cvss3_base_score(vector: &str) -> Result<f64> {
    let mut parts = vector.split('/');
    let prefix = parts.next().unwrap_or_default();
    if !prefix.starts_with("CVSS:3.") {
        return Err(invalid(vector, "unsupported CVSS version"));
    }

    let mut metrics: HashMap<&str, &str> = HashMap::new();
    for part in parts {
        if let Some((key, value)) = part.split_once(':') {
            metrics.insert(key, value);
        }
    }

    for key in ["AV", "AC", "PR", "UI", "S", "C", "I", "A"] {
        if !metrics.contains_key(key) {
            return Err(invalid(vector, format!("missing metric {key}")));
        }
    }
    let metric = |key: &str| -> &str { metrics.get(key).copied().unwrap_or_default() };

    let av = match metric("AV") {
        "N" => 0.85,
        "A" => 0.62,
        "L" => 0.55,
        "P" => 0.2,
        _ => return Err(invalid(vector, "invalid AV metric")),
    };
    let ac = match metric("AC") {
        "L" => 0.77,
        "H" => 0.44,
        _ => return Err(invalid(vector, "invalid AC metric")),
    };
    let scope_changed = metric("S") == "C";
    let pr = match (scope_changed, metric("PR")) {
        (_, "N") => 0.85,
        (false, "L") => 0.62,
        (false, "H") => 0.27,
        (true, "L") => 0.68,
        (true, "H") => 0.5,
        _ => return Err(invalid(vector, "invalid PR metric")),
    };
    let ui = match metric("UI") {
        "N" => 0.85,
        "R" => 0.62,
        _ => return Err(invalid(vector, "invalid UI metric")),
    };
    let cia = |value: &str, name: &str| -> Result<f64> {
        match value {
            "N" => Ok(0.0),
            "L" => Ok(0.22),
            "H" => Ok(0.56),
            _ => Err(invalid(vector, format!("invalid {name} metric"))),
        }
    };
    let conf = cia(metric("C"), "C")?;
    let integ = cia(metric("I"), "I")?;
    let avail = cia(metric("A"), "A")?;

    let exploitability = 8.22 * av * ac * pr * ui;
    let iss = 1.0 - (1.0 - conf) * (1.0 - integ) * (1.0 - avail);
    if iss <= 0.0 {
        return Ok(0.0);
    }

    if scope_changed {
        let impact = (7.52 * (iss - 0.029) - 3.25 * (iss - 0.02).powi(15)).max(0.0);
        return Ok(round_up1((1.08 * (impact + exploitability)).min(10.0)));
    }

    let impact = 6.42 * iss;
    Ok(round_up1((impact + exploitability).min(10.0)))
}

fn round_up1(val: f64) -> f64 {
    (val * 10.0).ceil() / 10.0
}
