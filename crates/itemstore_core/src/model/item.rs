//! Item domain model and input validation.
//!
//! # Responsibility
//! - Define the canonical catalog record persisted in `items`.
//! - Turn raw transport payloads into validated `Item` values.
//!
//! # Invariants
//! - `name` is 3..=50 ASCII alphanumeric characters.
//! - `description`, when present, is at most 200 characters.
//! - `price` is strictly positive.
//! - `id` is caller-supplied and never generated by storage.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Caller-supplied identity key of an item.
pub type ItemId = i64;

pub const NAME_MIN_CHARS: usize = 3;
pub const NAME_MAX_CHARS: usize = 50;
pub const DESCRIPTION_MAX_CHARS: usize = 200;

static NAME_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new("^[A-Za-z0-9]+$").unwrap_or_else(|err| panic!("invalid name pattern: {err}"))
});

/// Canonical catalog record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    /// Stable identity key, immutable after creation.
    pub id: ItemId,
    pub name: String,
    /// `None` means "no description"; distinct from an empty string.
    pub description: Option<String>,
    pub price: f64,
}

impl Item {
    /// Builds a validated item.
    ///
    /// # Errors
    /// - Returns every field constraint the inputs violate.
    pub fn new(
        id: ItemId,
        name: impl Into<String>,
        description: Option<&str>,
        price: f64,
    ) -> Result<Self, ItemValidationError> {
        let item = Self {
            id,
            name: name.into(),
            description: description.map(str::to_owned),
            price,
        };
        item.validate()?;
        Ok(item)
    }

    /// Re-checks field constraints on an already typed item.
    ///
    /// Repositories call this before every write and after every row read.
    pub fn validate(&self) -> Result<(), ItemValidationError> {
        let mut issues = Vec::new();
        if let Err(issue) = check_name(&self.name) {
            issues.push(issue);
        }
        if let Some(description) = self.description.as_deref() {
            if let Err(issue) = check_description(description) {
                issues.push(issue);
            }
        }
        if let Err(issue) = check_price(self.price) {
            issues.push(issue);
        }
        ItemValidationError::from_issues(issues)
    }
}

/// Parses and validates a raw JSON payload into an `Item`.
///
/// Unknown fields are ignored. Each offending field contributes one issue.
///
/// # Errors
/// - `body` issue when the payload is not a JSON object.
/// - One issue per missing, mistyped or out-of-range field.
pub fn validate_item(payload: &Value) -> Result<Item, ItemValidationError> {
    let Some(fields) = payload.as_object() else {
        return Err(ItemValidationError::single(
            "body",
            "payload must be a JSON object",
        ));
    };

    let mut issues = Vec::new();

    let id = match fields.get("id") {
        None | Some(Value::Null) => {
            issues.push(FieldIssue::new("id", "field required"));
            None
        }
        Some(value) => match value.as_i64() {
            Some(id) => Some(id),
            None => {
                issues.push(FieldIssue::new("id", "value is not a valid integer"));
                None
            }
        },
    };

    let name = match fields.get("name") {
        None | Some(Value::Null) => {
            issues.push(FieldIssue::new("name", "field required"));
            None
        }
        Some(Value::String(name)) => match check_name(name) {
            Ok(()) => Some(name.clone()),
            Err(issue) => {
                issues.push(issue);
                None
            }
        },
        Some(_) => {
            issues.push(FieldIssue::new("name", "value is not a valid string"));
            None
        }
    };

    let description = match fields.get("description") {
        None | Some(Value::Null) => None,
        Some(Value::String(description)) => match check_description(description) {
            Ok(()) => Some(description.clone()),
            Err(issue) => {
                issues.push(issue);
                None
            }
        },
        Some(_) => {
            issues.push(FieldIssue::new(
                "description",
                "value is not a valid string",
            ));
            None
        }
    };

    let price = match fields.get("price") {
        None | Some(Value::Null) => {
            issues.push(FieldIssue::new("price", "field required"));
            None
        }
        Some(value) => match value.as_f64() {
            Some(price) => match check_price(price) {
                Ok(()) => Some(price),
                Err(issue) => {
                    issues.push(issue);
                    None
                }
            },
            None => {
                issues.push(FieldIssue::new("price", "value is not a valid number"));
                None
            }
        },
    };

    ItemValidationError::from_issues(issues)?;

    match (id, name, price) {
        (Some(id), Some(name), Some(price)) => Ok(Item {
            id,
            name,
            description,
            price,
        }),
        _ => Err(ItemValidationError::single("body", "incomplete item")),
    }
}

fn check_name(name: &str) -> Result<(), FieldIssue> {
    let length = name.chars().count();
    if length < NAME_MIN_CHARS {
        return Err(FieldIssue::new(
            "name",
            format!("must contain at least {NAME_MIN_CHARS} characters"),
        ));
    }
    if length > NAME_MAX_CHARS {
        return Err(FieldIssue::new(
            "name",
            format!("must contain at most {NAME_MAX_CHARS} characters"),
        ));
    }
    if !NAME_PATTERN.is_match(name) {
        return Err(FieldIssue::new(
            "name",
            "must contain only ASCII letters and digits",
        ));
    }
    Ok(())
}

fn check_description(description: &str) -> Result<(), FieldIssue> {
    if description.chars().count() > DESCRIPTION_MAX_CHARS {
        return Err(FieldIssue::new(
            "description",
            format!("must contain at most {DESCRIPTION_MAX_CHARS} characters"),
        ));
    }
    Ok(())
}

fn check_price(price: f64) -> Result<(), FieldIssue> {
    // NaN fails the comparison as well.
    if !(price > 0.0) {
        return Err(FieldIssue::new("price", "must be greater than 0"));
    }
    Ok(())
}

/// One rejected field and the reason it was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldIssue {
    pub field: &'static str,
    pub message: String,
}

impl FieldIssue {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Structured validation failure listing every offending field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemValidationError {
    issues: Vec<FieldIssue>,
}

impl ItemValidationError {
    fn single(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            issues: vec![FieldIssue::new(field, message)],
        }
    }

    fn from_issues(issues: Vec<FieldIssue>) -> Result<(), Self> {
        if issues.is_empty() {
            Ok(())
        } else {
            Err(Self { issues })
        }
    }

    pub fn issues(&self) -> &[FieldIssue] {
        &self.issues
    }

    /// Returns whether `field` is among the rejected fields.
    pub fn has_field(&self, field: &str) -> bool {
        self.issues.iter().any(|issue| issue.field == field)
    }
}

impl Display for ItemValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid item:")?;
        for (index, issue) in self.issues.iter().enumerate() {
            let separator = if index == 0 { " " } else { "; " };
            write!(f, "{separator}{}: {}", issue.field, issue.message)?;
        }
        Ok(())
    }
}

impl Error for ItemValidationError {}
