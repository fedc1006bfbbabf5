use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{
    coerce_bool, coerce_tags, normalize_email, normalize_gstin, normalize_phone, normalize_text,
    validate_format, validate_required, EMAIL_RE, PHONE_RE,
};
use crate::database::CustomerChanges;

const PHONE_FORMAT_MESSAGE: &str = "Phone number must be a valid 10-digit number";
const EMAIL_FORMAT_MESSAGE: &str = "Please enter a valid email address";

/// Body accepted by create and full update. Unknown keys are ignored; `null` counts as absent.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerInput {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub company: Option<String>,
    pub address: Option<String>,
    pub state: Option<String>,
    pub city: Option<String>,
    pub pincode: Option<String>,
    pub gstin: Option<String>,
    pub gst_number: Option<String>,
    pub is_inter_state: Option<Value>,
    pub is_active: Option<Value>,
    pub notes: Option<String>,
    pub tags: Option<Value>,
}

impl CustomerInput {
    /// Required and format rules. Each field is checked independently; the result carries
    /// every failing field's message, or the normalized column writes.
    pub fn validate(&self) -> Result<CustomerChanges, Vec<String>> {
        let mut errors = Vec::new();

        let name = match validate_required("Customer name", self.name.as_deref()) {
            Ok(name) => Some(name),
            Err(e) => {
                errors.push(e);
                None
            }
        };

        let phone = match validate_required("Phone number", self.phone.as_deref()) {
            Ok(raw) => {
                let digits = normalize_phone(&raw);
                match validate_format(&digits, &PHONE_RE, PHONE_FORMAT_MESSAGE) {
                    Ok(()) => Some(digits),
                    Err(e) => {
                        errors.push(e);
                        None
                    }
                }
            }
            Err(e) => {
                errors.push(e);
                None
            }
        };

        let email = match self.email.as_deref().map(normalize_email) {
            None => None,
            Some(None) => Some(None),
            Some(Some(email)) => match validate_format(&email, &EMAIL_RE, EMAIL_FORMAT_MESSAGE) {
                Ok(()) => Some(Some(email)),
                Err(e) => {
                    errors.push(e);
                    None
                }
            },
        };

        if !errors.is_empty() {
            return Err(errors);
        }

        // gstin wins when both aliases are sent
        let gstin = self
            .gstin
            .as_deref()
            .or(self.gst_number.as_deref())
            .map(normalize_gstin);

        Ok(CustomerChanges {
            name,
            phone,
            email,
            company: self.company.as_deref().map(normalize_text),
            address: self.address.as_deref().map(normalize_text),
            state: self.state.as_deref().map(normalize_text),
            city: self.city.as_deref().map(normalize_text),
            pincode: self.pincode.as_deref().map(normalize_text),
            gstin,
            notes: self.notes.as_deref().map(normalize_text),
            is_inter_state: self.is_inter_state.as_ref().map(coerce_bool),
            is_active: self.is_active.as_ref().map(coerce_bool),
            tags: self.tags.as_ref().map(coerce_tags),
        })
    }
}

/// The only fields a partial update may touch. Anything else in the body is dropped
/// during deserialization and never reaches the store.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerPatch {
    pub notes: Option<String>,
    pub tags: Option<Value>,
    pub is_active: Option<Value>,
    pub address: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PatchField {
    Notes,
    Tags,
    IsActive,
    Address,
    Email,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedPatch {
    pub changes: CustomerChanges,
    pub fields: Vec<PatchField>,
}

impl CustomerPatch {
    pub fn is_empty(&self) -> bool {
        self.notes.is_none()
            && self.tags.is_none()
            && self.is_active.is_none()
            && self.address.is_none()
            && self.email.is_none()
    }

    pub fn validate(&self) -> Result<ValidatedPatch, Vec<String>> {
        let mut changes = CustomerChanges::default();
        let mut fields = Vec::new();

        if let Some(raw) = self.email.as_deref() {
            let email = normalize_email(raw);
            if let Some(e) = &email {
                validate_format(e, &EMAIL_RE, EMAIL_FORMAT_MESSAGE).map_err(|e| vec![e])?;
            }
            changes.email = Some(email);
            fields.push(PatchField::Email);
        }
        if let Some(raw) = self.notes.as_deref() {
            changes.notes = Some(normalize_text(raw));
            fields.push(PatchField::Notes);
        }
        if let Some(raw) = &self.tags {
            changes.tags = Some(coerce_tags(raw));
            fields.push(PatchField::Tags);
        }
        if let Some(raw) = &self.is_active {
            changes.is_active = Some(coerce_bool(raw));
            fields.push(PatchField::IsActive);
        }
        if let Some(raw) = self.address.as_deref() {
            changes.address = Some(normalize_text(raw));
            fields.push(PatchField::Address);
        }

        Ok(ValidatedPatch { changes, fields })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn input(value: Value) -> CustomerInput {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn full_input_is_normalized() {
        let changes = input(json!({
            "name": " Acme Traders ",
            "phone": "98-765 43210",
            "email": " A@B.COM ",
            "gstNumber": "27aapfu0939f1zv",
            "isInterState": "true",
            "tags": ["vip", "vip", "north"],
            "company": ""
        }))
        .validate()
        .unwrap();

        assert_eq!(changes.name.as_deref(), Some("Acme Traders"));
        assert_eq!(changes.phone.as_deref(), Some("9876543210"));
        assert_eq!(changes.email, Some(Some("a@b.com".to_string())));
        assert_eq!(changes.gstin, Some(Some("27AAPFU0939F1ZV".to_string())));
        assert_eq!(changes.is_inter_state, Some(true));
        assert_eq!(changes.tags, Some(vec!["vip".to_string(), "north".to_string()]));
        assert_eq!(changes.company, Some(None));
        assert_eq!(changes.city, None);
    }

    #[test]
    fn gstin_alias_takes_precedence() {
        let changes = input(json!({
            "name": "Acme",
            "phone": "9876543210",
            "gstin": "aaa",
            "gstNumber": "bbb"
        }))
        .validate()
        .unwrap();
        assert_eq!(changes.gstin, Some(Some("AAA".to_string())));
    }

    #[test]
    fn independent_field_errors_are_all_reported() {
        let errors = input(json!({
            "name": "  ",
            "phone": "12345",
            "email": "not-an-email"
        }))
        .validate()
        .unwrap_err();

        assert_eq!(
            errors,
            vec![
                "Customer name is required".to_string(),
                PHONE_FORMAT_MESSAGE.to_string(),
                EMAIL_FORMAT_MESSAGE.to_string(),
            ]
        );
    }

    #[test]
    fn missing_phone_short_circuits_its_format_check() {
        let errors = input(json!({ "name": "Acme" })).validate().unwrap_err();
        assert_eq!(errors, vec!["Phone number is required".to_string()]);
    }

    #[test]
    fn patch_ignores_fields_outside_the_allow_list() {
        let patch: CustomerPatch = serde_json::from_value(json!({
            "phone": "1111111111",
            "name": "Hijack",
            "notes": "prefers email",
            "isActive": false
        }))
        .unwrap();

        let validated = patch.validate().unwrap();
        assert_eq!(validated.fields, vec![PatchField::Notes, PatchField::IsActive]);
        assert_eq!(validated.changes.phone, None);
        assert_eq!(validated.changes.name, None);
        assert_eq!(validated.changes.is_active, Some(false));
    }

    #[test]
    fn patch_with_only_unknown_fields_is_empty() {
        let patch: CustomerPatch = serde_json::from_value(json!({ "phone": "1111111111" })).unwrap();
        assert!(patch.is_empty());
    }

    #[test]
    fn patch_rejects_bad_email_and_clears_blank_email() {
        let bad: CustomerPatch = serde_json::from_value(json!({ "email": "nope" })).unwrap();
        assert_eq!(bad.validate().unwrap_err(), vec![EMAIL_FORMAT_MESSAGE.to_string()]);

        let blank: CustomerPatch = serde_json::from_value(json!({ "email": "  " })).unwrap();
        let validated = blank.validate().unwrap();
        assert_eq!(validated.changes.email, Some(None));
        assert_eq!(validated.fields, vec![PatchField::Email]);
    }

    #[test]
    fn patch_field_names_serialize_camel_case() {
        let names = serde_json::to_value(vec![PatchField::IsActive, PatchField::Notes]).unwrap();
        assert_eq!(names, json!(["isActive", "notes"]));
    }
}
