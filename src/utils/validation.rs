use std::borrow::Cow;
use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError, ValidationErrors};

use crate::models::employee::NewEmployee;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Field name to the messages raised for it, ordered by field name.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0.entry(field.to_string()).or_default().push(message.into());
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<ValidationErrors> for FieldErrors {
    fn from(err: ValidationErrors) -> Self {
        let mut fields = FieldErrors::default();
        for (field, errs) in err.field_errors() {
            for e in errs {
                let message = e
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| e.code.to_string());
                fields.add(field, message);
            }
        }
        fields
    }
}

/// Employee fields exactly as submitted, echoed back when validation fails.
///
/// `id` and `photo_path` are the hidden fields of the edit form. The stored
/// photo path is never taken from the form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct EmployeeForm {
    pub id: Option<i32>,
    #[validate(custom = "validate_required")]
    pub first_name: String,
    #[validate(custom = "validate_required")]
    pub last_name: String,
    #[validate(email(message = "Enter a valid email address"))]
    pub email: String,
    #[validate(custom = "validate_mobile")]
    pub mobile: String,
    pub date_of_birth: String,
    pub photo_path: Option<String>,
}

impl EmployeeForm {
    fn trimmed(&self) -> Self {
        Self {
            id: self.id,
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            email: self.email.trim().to_string(),
            mobile: self.mobile.trim().to_string(),
            date_of_birth: self.date_of_birth.trim().to_string(),
            photo_path: self.photo_path.clone(),
        }
    }
}

fn error(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(Cow::from(message));
    err
}

fn validate_required(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(error("required", "This field is required"));
    }
    Ok(())
}

fn validate_mobile(value: &str) -> Result<(), ValidationError> {
    validate_required(value)?;
    let number = value.strip_prefix('+').unwrap_or(value);
    let allowed = number
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, ' ' | '-' | '.' | '(' | ')'));
    if !allowed || !number.chars().any(|c| c.is_ascii_digit()) {
        return Err(error("phone", "Enter a valid phone number"));
    }
    Ok(())
}

fn parse_date(value: &str) -> Result<NaiveDate, &'static str> {
    if value.is_empty() {
        return Err("This field is required");
    }
    NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|_| "Enter a date as YYYY-MM-DD")
}

pub fn validate_payload<T: Validate>(payload: &T) -> Result<(), FieldErrors> {
    payload.validate().map_err(FieldErrors::from)
}

/// Checks a submitted form and converts it into a storable employee.
///
/// Text fields are trimmed before any check runs.
pub fn validate_form(form: &EmployeeForm) -> Result<NewEmployee, FieldErrors> {
    let form = form.trimmed();
    let mut errors = validate_payload(&form).err().unwrap_or_default();

    let date_of_birth = match parse_date(&form.date_of_birth) {
        Ok(date) => Some(date),
        Err(message) => {
            errors.add("date_of_birth", message);
            None
        }
    };

    match date_of_birth {
        Some(date_of_birth) if errors.is_empty() => Ok(NewEmployee {
            first_name: form.first_name,
            last_name: form.last_name,
            email: form.email,
            mobile: form.mobile,
            date_of_birth,
            photo_path: None,
        }),
        _ => Err(errors),
    }
}
