//! Request payload validation.
//!
//! Payloads are checked field by field against the raw JSON object so every
//! violation is reported at once, with its location and kind:
//! - missing or mistyped required fields
//! - empty titles
//! - fields that are not part of the item schema

use serde::Serialize;
use serde_json::{Map, Value};

use super::item::{ItemPatch, NewItem};

const ITEM_FIELDS: &[&str] = &["title", "description", "is_active"];

/// A single rejected input value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldViolation {
    /// Location path, e.g. `["body", "title"]`.
    pub loc: Vec<String>,
    pub msg: String,
    #[serde(rename = "type")]
    pub kind: String,
}

impl FieldViolation {
    pub fn new(loc: &[&str], kind: &str, msg: impl Into<String>) -> Self {
        FieldViolation {
            loc: loc.iter().map(|s| s.to_string()).collect(),
            msg: msg.into(),
            kind: kind.to_string(),
        }
    }
}

/// Every violation found in one request.
#[derive(Debug, Clone, PartialEq, Eq, Default, thiserror::Error)]
#[error("{} validation error(s)", .0.len())]
pub struct ValidationErrors(pub Vec<FieldViolation>);

impl ValidationErrors {
    pub fn single(violation: FieldViolation) -> Self {
        ValidationErrors(vec![violation])
    }

    pub fn push(&mut self, violation: FieldViolation) {
        self.0.push(violation);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn violations(&self) -> &[FieldViolation] {
        &self.0
    }

    fn into_result<T>(self, value: T) -> Result<T, ValidationErrors> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

/// Validate a create payload.
pub fn parse_new_item(body: &Value) -> Result<NewItem, ValidationErrors> {
    let obj = expect_object(body)?;
    let mut errors = reject_unknown(obj, ITEM_FIELDS);

    let title = match obj.get("title") {
        None => {
            errors.push(FieldViolation::new(
                &["body", "title"],
                "missing",
                "Field required",
            ));
            None
        }
        Some(v) => title_value(v, &mut errors),
    };
    let description = obj
        .get("description")
        .and_then(|v| description_value(v, &mut errors))
        .flatten();
    let is_active = match obj.get("is_active") {
        None | Some(Value::Null) => true,
        Some(v) => bool_value("is_active", v, &mut errors).unwrap_or(true),
    };

    match title {
        Some(title) => errors.into_result(NewItem {
            title,
            description,
            is_active,
        }),
        None => Err(errors),
    }
}

/// Validate a partial update payload.
///
/// Only keys present in the object end up in the patch.
pub fn parse_item_patch(body: &Value) -> Result<ItemPatch, ValidationErrors> {
    let obj = expect_object(body)?;
    let mut errors = reject_unknown(obj, ITEM_FIELDS);
    let mut patch = ItemPatch::default();

    if let Some(v) = obj.get("title") {
        patch.title = title_value(v, &mut errors);
    }
    if let Some(v) = obj.get("description") {
        patch.description = description_value(v, &mut errors);
    }
    if let Some(v) = obj.get("is_active") {
        if v.is_null() {
            errors.push(FieldViolation::new(
                &["body", "is_active"],
                "bool_type",
                "Input should be a valid boolean",
            ));
        } else {
            patch.is_active = bool_value("is_active", v, &mut errors);
        }
    }

    errors.into_result(patch)
}

/// Parse an integer query parameter. Negative values clamp to zero.
pub fn parse_non_negative(name: &str, raw: Option<&str>) -> Result<Option<i64>, FieldViolation> {
    match raw {
        None => Ok(None),
        Some(s) => s
            .trim()
            .parse::<i64>()
            .map(|n| Some(n.max(0)))
            .map_err(|_| {
                FieldViolation::new(
                    &["query", name],
                    "int_parsing",
                    "Input should be a valid integer, unable to parse string as an integer",
                )
            }),
    }
}

fn expect_object(body: &Value) -> Result<&Map<String, Value>, ValidationErrors> {
    body.as_object().ok_or_else(|| {
        ValidationErrors::single(FieldViolation::new(
            &["body"],
            "model_type",
            "Input should be a valid dictionary or object",
        ))
    })
}

fn reject_unknown(obj: &Map<String, Value>, allowed: &[&str]) -> ValidationErrors {
    let mut errors = ValidationErrors::default();
    for key in obj.keys() {
        if !allowed.contains(&key.as_str()) {
            errors.push(FieldViolation::new(
                &["body", key.as_str()],
                "extra_forbidden",
                "Extra inputs are not permitted",
            ));
        }
    }
    errors
}

fn title_value(v: &Value, errors: &mut ValidationErrors) -> Option<String> {
    match v.as_str() {
        Some("") => {
            errors.push(FieldViolation::new(
                &["body", "title"],
                "string_too_short",
                "String should have at least 1 character",
            ));
            None
        }
        Some(s) => Some(s.to_string()),
        None => {
            errors.push(FieldViolation::new(
                &["body", "title"],
                "string_type",
                "Input should be a valid string",
            ));
            None
        }
    }
}

/// `Some(None)` for an explicit null, `None` when the value was rejected.
fn description_value(v: &Value, errors: &mut ValidationErrors) -> Option<Option<String>> {
    match v {
        Value::Null => Some(None),
        Value::String(s) => Some(Some(s.clone())),
        _ => {
            errors.push(FieldViolation::new(
                &["body", "description"],
                "string_type",
                "Input should be a valid string",
            ));
            None
        }
    }
}

/// Booleans accept JSON `true`/`false`, the integers 0/1 and the usual
/// textual spellings (case-insensitive).
fn bool_value(field: &str, v: &Value, errors: &mut ValidationErrors) -> Option<bool> {
    let parsed = match v {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => match n.as_f64() {
            Some(x) if x == 1.0 => Some(true),
            Some(x) if x == 0.0 => Some(false),
            _ => None,
        },
        Value::String(s) => match s.to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" | "on" | "t" | "y" => Some(true),
            "false" | "0" | "no" | "off" | "f" | "n" => Some(false),
            _ => None,
        },
        _ => None,
    };

    if parsed.is_none() {
        errors.push(FieldViolation::new(
            &["body", field],
            "bool_type",
            "Input should be a valid boolean",
        ));
    }
    parsed
}
