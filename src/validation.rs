use std::collections::HashMap;

use crate::models::{ActivityFilter, ActivityType};

pub const PARTICIPANTS_MIN: f64 = 1.0;
pub const PARTICIPANTS_MAX: f64 = 8.0;

const KNOWN_PARAMS: [&str; 5] = ["type", "participants", "price", "accessibility", "key"];

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{message}")]
pub struct ValidationError {
    pub message: String,
}

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Validates the raw `/api/inspire` query pairs.
///
/// Parameters are checked in declaration order and only the first failure is
/// reported. A parameter given more than once is a type error for that
/// parameter. Unknown parameters are rejected after the known ones, sorted by
/// name so the reported message does not depend on query order.
pub fn validate_filter(pairs: &[(String, String)]) -> Result<ActivityFilter, ValidationError> {
    let mut params: HashMap<&str, Vec<&str>> = HashMap::new();
    for (name, value) in pairs {
        params.entry(name.as_str()).or_default().push(value.as_str());
    }

    let mut filter = ActivityFilter::default();

    if let Some(raw) = single(&params, "type", "string")? {
        filter.kind = Some(parse_activity_type(raw)?);
    }
    if let Some(raw) = single(&params, "participants", "number")? {
        let value = parse_number("participants", raw)?;
        if value.fract() != 0.0 {
            return Err(ValidationError::new("\"participants\" must be an integer"));
        }
        check_range("participants", value, PARTICIPANTS_MIN, PARTICIPANTS_MAX)?;
        filter.participants = Some(value as u8);
    }
    if let Some(raw) = single(&params, "price", "number")? {
        let value = parse_number("price", raw)?;
        check_range("price", value, 0.0, 1.0)?;
        filter.price = Some(value);
    }
    if let Some(raw) = single(&params, "accessibility", "number")? {
        let value = parse_number("accessibility", raw)?;
        check_range("accessibility", value, 0.0, 1.0)?;
        filter.accessibility = Some(value);
    }
    if let Some(raw) = single(&params, "key", "string")? {
        if raw.is_empty() {
            return Err(ValidationError::new("\"key\" is not allowed to be empty"));
        }
        filter.key = Some(raw.to_string());
    }

    let mut unknown: Vec<&str> = params
        .keys()
        .copied()
        .filter(|name| !KNOWN_PARAMS.contains(name))
        .collect();
    unknown.sort_unstable();
    if let Some(name) = unknown.first() {
        return Err(ValidationError::new(format!("\"{}\" is not allowed", name)));
    }

    Ok(filter)
}

/// A repeated parameter arrives as a list, which is never a valid value.
fn single<'a>(
    params: &HashMap<&str, Vec<&'a str>>,
    name: &str,
    expected: &str,
) -> Result<Option<&'a str>, ValidationError> {
    match params.get(name).map(Vec::as_slice) {
        None | Some([]) => Ok(None),
        Some([value]) => Ok(Some(*value)),
        Some(_) => Err(ValidationError::new(format!(
            "\"{}\" must be a {}",
            name, expected
        ))),
    }
}

/// Returns the trimmed advice search keyword.
pub fn validate_search_query(q: Option<&str>) -> Result<&str, ValidationError> {
    match q.map(str::trim) {
        Some(keyword) if !keyword.is_empty() => Ok(keyword),
        _ => Err(ValidationError::new("Missing search query (q).")),
    }
}

fn parse_activity_type(raw: &str) -> Result<ActivityType, ValidationError> {
    if raw.is_empty() {
        return Err(ValidationError::new("\"type\" is not allowed to be empty"));
    }
    raw.parse::<ActivityType>().map_err(|_| {
        let allowed: Vec<&str> = ActivityType::ALL.iter().map(|kind| kind.as_str()).collect();
        ValidationError::new(format!("\"type\" must be one of [{}]", allowed.join(", ")))
    })
}

fn parse_number(name: &str, raw: &str) -> Result<f64, ValidationError> {
    match raw.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(ValidationError::new(format!("\"{}\" must be a number", name))),
    }
}

fn check_range(name: &str, value: f64, min: f64, max: f64) -> Result<(), ValidationError> {
    if value < min {
        return Err(ValidationError::new(format!(
            "\"{}\" must be greater than or equal to {}",
            name, min
        )));
    }
    if value > max {
        return Err(ValidationError::new(format!(
            "\"{}\" must be less than or equal to {}",
            name, max
        )));
    }
    Ok(())
}
