//! Field rules for inbound payloads: required-ness, formats, coercions and
//! per-owner uniqueness.

pub mod customer;

pub use customer::{CustomerInput, CustomerPatch, PatchField, ValidatedPatch};

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use uuid::Uuid;

use crate::database::{CustomerRepository, DatabaseError};

/// Ten digits, after non-digits have been stripped.
pub static PHONE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]{10}$").expect("valid phone regex"));

/// `local@domain.tld`, no whitespace.
pub static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));

/// Trimmed value, or a "`label` is required" message.
pub fn validate_required(label: &str, value: Option<&str>) -> Result<String, String> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(format!("{} is required", label)),
    }
}

pub fn validate_format(value: &str, pattern: &Regex, message: &str) -> Result<(), String> {
    if pattern.is_match(value) {
        Ok(())
    } else {
        Err(message.to_string())
    }
}

pub fn normalize_phone(raw: &str) -> String {
    raw.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Trim and lowercase; `None` for blank input.
pub fn normalize_email(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_lowercase())
}

/// Trim and uppercase; `None` for blank input.
pub fn normalize_gstin(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_uppercase())
}

/// Trim; `None` for blank input.
pub fn normalize_text(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

pub fn coerce_bool(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(false, |f| f != 0.0),
        Value::String(s) => matches!(s.trim().to_ascii_lowercase().as_str(), "true" | "1" | "yes" | "on"),
        _ => false,
    }
}

/// Non-empty trimmed strings from an array, first occurrence wins. Anything else is empty.
pub fn coerce_tags(value: &Value) -> Vec<String> {
    let Value::Array(items) = value else {
        return Vec::new();
    };

    let mut tags: Vec<String> = Vec::with_capacity(items.len());
    for tag in items.iter().filter_map(Value::as_str).map(str::trim) {
        if !tag.is_empty() && !tags.iter().any(|t| t == tag) {
            tags.push(tag.to_string());
        }
    }
    tags
}

/// Fields checked for uniqueness within one owner's records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniqueField {
    Phone,
    Email,
}

impl UniqueField {
    pub fn duplicate_message(&self) -> &'static str {
        match self {
            UniqueField::Phone => "Another customer already uses this phone number",
            UniqueField::Email => "Another customer already uses this email address",
        }
    }
}

/// `true` when no other record of `owner` holds `value`. `exclude` skips the record being updated.
pub async fn validate_uniqueness(
    repo: &dyn CustomerRepository,
    field: UniqueField,
    value: &str,
    owner: Uuid,
    exclude: Option<Uuid>,
) -> Result<bool, DatabaseError> {
    let taken = match field {
        UniqueField::Phone => repo.phone_in_use(owner, value, exclude).await?,
        UniqueField::Email => repo.email_in_use(owner, value, exclude).await?,
    };
    Ok(!taken)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn required_trims_and_rejects_blank() {
        assert_eq!(validate_required("Name", Some("  Acme ")), Ok("Acme".to_string()));
        assert_eq!(validate_required("Name", Some("   ")), Err("Name is required".to_string()));
        assert_eq!(validate_required("Name", None), Err("Name is required".to_string()));
    }

    #[test]
    fn phone_normalization_and_format() {
        let phone = normalize_phone("98-765 43210");
        assert_eq!(phone, "9876543210");
        assert!(validate_format(&phone, &PHONE_RE, "bad").is_ok());

        let with_country_code = normalize_phone("+91-9876543210");
        assert_eq!(with_country_code.len(), 12);
        assert!(validate_format(&with_country_code, &PHONE_RE, "bad").is_err());
        assert!(validate_format("12345", &PHONE_RE, "bad").is_err());
    }

    #[test]
    fn email_shape() {
        assert!(EMAIL_RE.is_match("a@b.com"));
        assert!(EMAIL_RE.is_match("first.last+tag@mail.example.in"));
        assert!(!EMAIL_RE.is_match("a@b"));
        assert!(!EMAIL_RE.is_match("a b@c.com"));
        assert!(!EMAIL_RE.is_match("@c.com"));
    }

    #[test]
    fn email_and_gstin_normalization() {
        assert_eq!(normalize_email(" A@B.COM "), Some("a@b.com".to_string()));
        assert_eq!(normalize_email("  "), None);
        assert_eq!(normalize_gstin(" 27aapfu0939f1zv "), Some("27AAPFU0939F1ZV".to_string()));
        assert_eq!(normalize_gstin(""), None);
    }

    #[test]
    fn bool_coercion() {
        assert!(coerce_bool(&json!(true)));
        assert!(coerce_bool(&json!("TRUE")));
        assert!(coerce_bool(&json!("1")));
        assert!(coerce_bool(&json!(2)));
        assert!(!coerce_bool(&json!("false")));
        assert!(!coerce_bool(&json!(0)));
        assert!(!coerce_bool(&json!(null)));
        assert!(!coerce_bool(&json!({"x": 1})));
    }

    #[test]
    fn tag_coercion() {
        assert_eq!(
            coerce_tags(&json!(["vip", " wholesale ", "vip", "", 4])),
            vec!["vip".to_string(), "wholesale".to_string()]
        );
        assert!(coerce_tags(&json!("vip")).is_empty());
        assert!(coerce_tags(&json!(null)).is_empty());
    }
}
