//! Request body parsing and field validation.
//!
//! Payloads are read as raw JSON objects so that every problem can be
//! reported per field instead of failing on the first bad value.

use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;

use crate::shared::error::{AppError, AppResult};

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?)+$",
    )
    .expect("email pattern is valid")
});

pub const REQUIRED: &str = "This field is required.";
pub const NOT_NULL: &str = "This field may not be null.";
pub const NOT_BLANK: &str = "This field may not be blank.";
pub const NOT_STRING: &str = "Not a valid string.";
pub const INVALID_EMAIL: &str = "Enter a valid email address.";
pub const INVALID_INTEGER: &str = "A valid integer is required.";
pub const EMPTY_BODY: &str = "Request body cannot be empty.";

/// `Full` backs create and replace; `Partial` backs PATCH and skips the
/// required check while still validating whatever is present.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Full,
    Partial,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = Self::default();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    /// Folds nested errors in under `prefix.field`.
    pub fn merge_prefixed(&mut self, prefix: &str, other: FieldErrors) {
        for (field, messages) in other.0 {
            self.0
                .entry(format!("{prefix}.{field}"))
                .or_default()
                .extend(messages);
        }
    }

    /// Every message, in field order.
    pub fn messages(&self) -> Vec<&str> {
        self.0.values().flatten().map(String::as_str).collect()
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, messages) in &self.0 {
            if !first {
                f.write_str("; ")?;
            }
            first = false;
            write!(f, "{}: {}", field, messages.join(" "))?;
        }
        Ok(())
    }
}

pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
    }
}

/// Parses a request body into a JSON object.
///
/// With `required` set, an empty or falsy body is a `BadRequest`; otherwise
/// it reads as an empty object.
pub fn parse_body(body: &[u8], required: bool) -> AppResult<Map<String, Value>> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return if required {
            Err(AppError::BadRequest(EMPTY_BODY.to_string()))
        } else {
            Ok(Map::new())
        };
    }

    let value: Value = serde_json::from_slice(body)
        .map_err(|e| AppError::BadRequest(format!("JSON parse error - {e}")))?;

    if required && is_falsy(&value) {
        return Err(AppError::BadRequest(EMPTY_BODY.to_string()));
    }

    match value {
        Value::Object(map) => Ok(map),
        Value::Null => Ok(Map::new()),
        other => Err(AppError::InvalidData(FieldErrors::single(
            "non_field_errors",
            format!(
                "Invalid data. Expected a dictionary, but got {}.",
                type_name(&other)
            ),
        ))),
    }
}

/// Reads typed fields out of a JSON object, collecting every failure.
pub struct PayloadReader<'a> {
    data: &'a Map<String, Value>,
    mode: Mode,
    errors: FieldErrors,
}

impl<'a> PayloadReader<'a> {
    pub fn new(data: &'a Map<String, Value>, mode: Mode) -> Self {
        Self {
            data,
            mode,
            errors: FieldErrors::default(),
        }
    }

    fn present(&mut self, field: &str, required: bool) -> Option<&'a Value> {
        match self.data.get(field) {
            None => {
                if required && self.mode == Mode::Full {
                    self.errors.add(field, REQUIRED);
                }
                None
            }
            Some(Value::Null) => {
                self.errors.add(field, NOT_NULL);
                None
            }
            Some(value) => Some(value),
        }
    }

    fn text(&mut self, field: &str, value: &Value, max_len: usize) -> Option<String> {
        let text = match value {
            Value::String(s) => s.trim().to_string(),
            Value::Number(n) => n.to_string(),
            _ => {
                self.errors.add(field, NOT_STRING);
                return None;
            }
        };

        if text.is_empty() {
            self.errors.add(field, NOT_BLANK);
            return None;
        }
        if text.chars().count() > max_len {
            self.errors.add(
                field,
                format!("Ensure this field has no more than {max_len} characters."),
            );
            return None;
        }
        Some(text)
    }

    /// A required (in `Full` mode) string field.
    pub fn string(&mut self, field: &str, max_len: usize) -> Option<String> {
        let value = self.present(field, true)?;
        self.text(field, value, max_len)
    }

    /// A string field that is never required, such as one with a default.
    pub fn optional_string(&mut self, field: &str, max_len: usize) -> Option<String> {
        let value = self.present(field, false)?;
        self.text(field, value, max_len)
    }

    pub fn email(&mut self, field: &str, max_len: usize) -> Option<String> {
        let value = self.present(field, true)?;
        let text = self.text(field, value, max_len)?;
        if EMAIL_RE.is_match(&text) {
            Some(text)
        } else {
            self.errors.add(field, INVALID_EMAIL);
            None
        }
    }

    pub fn list(&mut self, field: &str) -> Option<&'a Vec<Value>> {
        match self.present(field, true)? {
            Value::Array(items) => Some(items),
            other => {
                self.errors.add(
                    field,
                    format!(
                        "Expected a list of items but got type \"{}\".",
                        type_name(other)
                    ),
                );
                None
            }
        }
    }

    pub fn errors_mut(&mut self) -> &mut FieldErrors {
        &mut self.errors
    }

    pub fn finish<T>(self, value: T) -> Result<T, FieldErrors> {
        if self.errors.is_empty() {
            Ok(value)
        } else {
            Err(self.errors)
        }
    }
}

/// Accepts a JSON integer or a numeric string that fits an `i32` key.
pub fn parse_integer(value: &Value) -> Option<i32> {
    match value {
        Value::Number(n) => n.as_i64().and_then(|v| i32::try_from(v).ok()),
        Value::String(s) => s.trim().parse::<i32>().ok(),
        _ => None,
    }
}
