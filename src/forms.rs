//! Urlencoded form payloads and their validation.
//!
//! Forms are deserialized leniently (every field optional) and then
//! cleaned into typed values. Cleaning either yields the typed value or a
//! list of per-field errors suitable for re-rendering the form.

use model::store::NewTreasure;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;
use validator::{Validate, ValidationError, ValidationErrors};

pub const MAX_DIGITS: u32 = 10;
pub const DECIMAL_PLACES: u32 = 2;

/// One problem with one submitted field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormErrors {
    pub errors: Vec<FieldError>,
}

impl FormErrors {
    /// Collect errors from `validator`, ordered like `fields`.
    fn from_validation(errors: &ValidationErrors, fields: &[&str]) -> Self {
        let mut collected: Vec<FieldError> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, field_errors)| {
                let field = field.to_string();
                field_errors.iter().map(move |e| FieldError {
                    field: field.clone(),
                    message: e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string()),
                })
            })
            .collect();

        collected.sort_by_key(|e| {
            fields
                .iter()
                .position(|f| *f == e.field)
                .unwrap_or(fields.len())
        });
        Self { errors: collected }
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn messages(&self) -> Vec<String> {
        self.errors
            .iter()
            .map(|e| format!("{}: {}", e.field, e.message))
            .collect()
    }

    pub fn for_field(&self, field: &str) -> Vec<&str> {
        self.errors
            .iter()
            .filter(|e| e.field == field)
            .map(|e| e.message.as_str())
            .collect()
    }
}

fn field_error(code: &'static str, message: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(Cow::Borrowed(message));
    error
}

/// Blank or whitespace-only input counts as missing.
fn normalize(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Parse a treasure value: a plain decimal with at most 10 digits, 2 of them decimal places.
/// There is no lower bound.
///
/// Digits are counted as written, so trailing zeros after the point count
/// as decimal places (`1.500` has three).
pub fn parse_value(raw: &str) -> Result<Decimal, &'static str> {
    let value = Decimal::from_str(raw.trim()).map_err(|_| "Enter a number.")?;

    let decimals = value.scale();
    let significant = {
        let mantissa = value.mantissa().unsigned_abs();
        if mantissa == 0 { 1 } else { mantissa.to_string().len() as u32 }
    };
    // `0.05` is stored as 5 with scale 2: both digits sit after the point.
    let digits = significant.max(decimals);
    let whole_digits = digits - decimals;

    if digits > MAX_DIGITS {
        return Err("Ensure that there are no more than 10 digits in total.");
    }
    if decimals > DECIMAL_PLACES {
        return Err("Ensure that there are no more than 2 decimal places.");
    }
    if whole_digits > MAX_DIGITS - DECIMAL_PLACES {
        return Err("Ensure that there are no more than 8 digits before the decimal point.");
    }

    Ok(value)
}

const TREASURE_FIELDS: [&str; 4] = ["name", "value", "material", "location"];

/// The treasure submission form.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct TreasureForm {
    #[validate(
        required(message = "This field is required."),
        length(max = 100, message = "Ensure this value has at most 100 characters.")
    )]
    pub name: Option<String>,
    #[validate(required(message = "This field is required."))]
    pub value: Option<String>,
    #[validate(
        required(message = "This field is required."),
        length(max = 100, message = "Ensure this value has at most 100 characters.")
    )]
    pub material: Option<String>,
    #[validate(
        required(message = "This field is required."),
        length(max = 100, message = "Ensure this value has at most 100 characters.")
    )]
    pub location: Option<String>,
}

impl TreasureForm {
    fn normalized(&self) -> Self {
        Self {
            name: normalize(&self.name),
            value: normalize(&self.value),
            material: normalize(&self.material),
            location: normalize(&self.location),
        }
    }

    /// Validate the submission and turn it into an insertable treasure.
    pub fn clean(&self) -> Result<NewTreasure, FormErrors> {
        let form = self.normalized();
        let mut errors = form.validate().err().unwrap_or_else(ValidationErrors::new);

        let value = match form.value.as_deref().map(parse_value) {
            Some(Ok(value)) => Some(value),
            Some(Err(message)) => {
                errors.add("value", field_error("invalid_decimal", message));
                None
            }
            None => None,
        };

        if !errors.errors().is_empty() {
            return Err(FormErrors::from_validation(&errors, &TREASURE_FIELDS));
        }

        match (form.name, value, form.material, form.location) {
            (Some(name), Some(value), Some(material), Some(location)) => Ok(NewTreasure {
                name,
                value,
                material,
                location,
            }),
            _ => Err(FormErrors {
                errors: vec![FieldError {
                    field: "form".to_string(),
                    message: "Incomplete submission.".to_string(),
                }],
            }),
        }
    }
}

/// Checked login credentials, not yet authenticated.
pub struct Credentials {
    pub username: String,
    pub password: String,
}

const LOGIN_FIELDS: [&str; 2] = ["username", "password"];

/// The login form.
#[derive(Clone, Default, Deserialize, Validate)]
pub struct LoginForm {
    #[validate(
        required(message = "This field is required."),
        length(max = 64, message = "Ensure this value has at most 64 characters.")
    )]
    pub username: Option<String>,
    #[validate(required(message = "This field is required."))]
    pub password: Option<String>,
}

impl LoginForm {
    pub fn clean(&self) -> Result<Credentials, FormErrors> {
        let form = LoginForm {
            username: normalize(&self.username),
            // Passwords are taken verbatim; only an empty one counts as missing.
            password: self.password.clone().filter(|p| !p.is_empty()),
        };

        if let Err(errors) = form.validate() {
            return Err(FormErrors::from_validation(&errors, &LOGIN_FIELDS));
        }

        match (form.username, form.password) {
            (Some(username), Some(password)) => Ok(Credentials { username, password }),
            _ => Err(FormErrors {
                errors: vec![FieldError {
                    field: "form".to_string(),
                    message: "Incomplete submission.".to_string(),
                }],
            }),
        }
    }

    /// Submitted username, for echoing back into the form.
    pub fn username_value(&self) -> String {
        self.username.as_deref().unwrap_or_default().trim().to_string()
    }
}

impl fmt::Debug for LoginForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginForm")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}
