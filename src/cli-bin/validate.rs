//! Pre-flight validation over the raw JSON problem file, run before
//! `Problem::load_from_json` (which panics on a bad job reference — an
//! invariant the core is entitled to assume its caller already checked).
//! Distinguishes the three data-error exit codes spec §6 documents for
//! the CLI collaborator: bad job reference (3), invalid abort window (4),
//! invalid precedence suspension window (5).

use std::collections::HashSet;

#[derive(Debug)]
pub enum ValidationError {
    BadJobReference(String),
    InvalidAbort(String),
    InvalidSuspension(String),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::BadJobReference(msg) => write!(f, "bad job reference: {msg}"),
            ValidationError::InvalidAbort(msg) => write!(f, "invalid abort window: {msg}"),
            ValidationError::InvalidSuspension(msg) => write!(f, "invalid precedence suspension: {msg}"),
        }
    }
}

impl ValidationError {
    pub fn exit_code(&self) -> i32 {
        match self {
            ValidationError::BadJobReference(_) => 3,
            ValidationError::InvalidAbort(_) => 4,
            ValidationError::InvalidSuspension(_) => 5,
        }
    }
}

fn job_id(value: &serde_json::Value) -> Option<(u64, u64)> {
    Some((value.get("task_id")?.as_u64()?, value.get("job_id")?.as_u64()?))
}

/// Checks job-id references and precedence suspension ordering against the
/// raw parsed JSON, ahead of the typed (panicking) `Problem::load_from_json`.
pub fn validate_raw(data: &str) -> Result<(), ValidationError> {
    let parsed: serde_json::Value = match serde_json::from_str(data) {
        Ok(value) => value,
        Err(_) => return Ok(()), // malformed JSON surfaces via the typed parse instead
    };

    let known_ids: HashSet<(u64, u64)> = parsed
        .get("workload")
        .and_then(|w| w.as_array())
        .into_iter()
        .flatten()
        .filter_map(|job| job.get("id").and_then(job_id))
        .collect();

    for prec in parsed.get("precedence").and_then(|p| p.as_array()).into_iter().flatten() {
        let from = prec.get("from").and_then(job_id);
        let to = prec.get("to").and_then(job_id);
        for (label, id) in [("from", from), ("to", to)] {
            let Some(id) = id else { continue };
            if !known_ids.contains(&id) {
                return Err(ValidationError::BadJobReference(format!(
                    "precedence constraint references unknown {label} job {id:?}"
                )));
            }
        }

        if let Some(suspension) = prec.get("suspension") {
            if let (Some(min), Some(max)) = (parse_time_field(suspension, "from"), parse_time_field(suspension, "until")) {
                if min > max {
                    return Err(ValidationError::InvalidSuspension(format!(
                        "suspension window [{min}, {max}] has min > max"
                    )));
                }
            }
        }
    }

    for abort in parsed.get("aborts").and_then(|a| a.as_array()).into_iter().flatten() {
        let Some(id) = abort.get("job").and_then(job_id) else { continue };
        if !known_ids.contains(&id) {
            return Err(ValidationError::InvalidAbort(format!("abort action references unknown job {id:?}")));
        }
    }

    Ok(())
}

fn parse_time_field(value: &serde_json::Value, field: &str) -> Option<f64> {
    let raw = value.get(field)?.as_str()?;
    raw.split_whitespace().next()?.parse().ok()
}
