//! Action input schemas.

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

fn message(code: &'static str, msg: &'static str) -> ValidationError {
    ValidationError::new(code).with_message(msg.into())
}

fn validate_password(value: &str) -> Result<(), ValidationError> {
    let len = value.chars().count();
    if len < 8 {
        return Err(message("too_short", "Password must be at least 8 characters long."));
    }
    if len > 16 {
        return Err(message("too_long", "Password must be at most 16 characters long."));
    }
    Ok(())
}

fn bounded_name(value: &str, empty: &'static str, long: &'static str) -> Result<(), ValidationError> {
    match value.chars().count() {
        0 => Err(message("too_short", empty)),
        n if n > 20 => Err(message("too_long", long)),
        _ => Ok(()),
    }
}

fn validate_username_update(value: &str) -> Result<(), ValidationError> {
    bounded_name(value, "Username must not be empty", "Username must not exceed 20 characters")
}

fn validate_first_name_update(value: &str) -> Result<(), ValidationError> {
    bounded_name(value, "First name must not be empty", "First name must not exceed 20 characters")
}

fn validate_last_name_update(value: &str) -> Result<(), ValidationError> {
    bounded_name(value, "Last name must not be empty", "Last name must not exceed 20 characters")
}

/// `POST /auth/signIn` credentials.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SignInInput {
    #[serde(default)]
    #[validate(required(message = "Please enter a valid username."))]
    pub username: Option<String>,
    #[serde(default)]
    #[validate(custom(function = "validate_password"))]
    pub password: String,
}

/// `POST /auth/signUp` profile.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SignUpInput {
    #[serde(default)]
    #[validate(email(message = "Please enter a valid email address."))]
    pub email: String,
    #[serde(default)]
    #[validate(custom(function = "validate_password"))]
    pub password: String,
    #[serde(default)]
    #[serde(rename = "firstName")]
    #[validate(required(message = "Please enter a valid first name."))]
    pub first_name: Option<String>,
    #[serde(default)]
    #[serde(rename = "lastName")]
    #[validate(required(message = "Please enter a valid last name."))]
    pub last_name: Option<String>,
    #[serde(default)]
    #[validate(required(message = "Please enter a valid username."))]
    pub username: Option<String>,
}

/// Partial profile update. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UserUpdateInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(custom(function = "validate_username_update"))]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[serde(rename = "firstName")]
    #[validate(custom(function = "validate_first_name_update"))]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[serde(rename = "lastName")]
    #[validate(custom(function = "validate_last_name_update"))]
    pub last_name: Option<String>,
}

/// Actions that take no input.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct NoInput {}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UserIdInput {
    pub id: String,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct RefreshInput {
    /// Page whose renders should be evicted. Falls back to the request's
    /// `x-current-path` header.
    #[serde(default)]
    pub path: Option<String>,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::action::parse_input;

    #[test]
    fn password_bounds() {
        assert!(validate_password("password123").is_ok());
        assert!(validate_password("12345678").is_ok());
        assert!(validate_password("1234567890123456").is_ok());
        let short = validate_password("1234567").unwrap_err();
        assert_eq!(short.message.as_deref(), Some("Password must be at least 8 characters long."));
        let long = validate_password("12345678901234567").unwrap_err();
        assert_eq!(long.message.as_deref(), Some("Password must be at most 16 characters long."));
    }

    #[test]
    fn sign_up_messages() {
        let errors = parse_input::<SignUpInput>(json!({
            "email": "not-an-email",
            "password": "password123",
            "username": "alice"
        }))
        .unwrap_err();

        assert_eq!(errors["email"], vec!["Please enter a valid email address."]);
        assert_eq!(errors["firstName"], vec!["Please enter a valid first name."]);
        assert_eq!(errors["lastName"], vec!["Please enter a valid last name."]);
        assert!(!errors.contains_key("username"));
    }

    #[test]
    fn sign_up_forwards_camel_case() {
        let input = parse_input::<SignUpInput>(json!({
            "email": "alice@example.com",
            "password": "password123",
            "firstName": "Alice",
            "lastName": "Liddell",
            "username": "alice"
        }))
        .unwrap();
        let body = serde_json::to_value(&input).unwrap();
        assert_eq!(body["firstName"], "Alice");
        assert_eq!(body["lastName"], "Liddell");
    }

    #[test]
    fn update_validates_only_present_fields() {
        let empty = parse_input::<UserUpdateInput>(json!({})).unwrap();
        assert_eq!(serde_json::to_value(&empty).unwrap(), json!({}));

        let errors = parse_input::<UserUpdateInput>(json!({
            "username": "",
            "lastName": "a-very-long-last-name-indeed",
            "email": "nope"
        }))
        .unwrap_err();
        assert_eq!(errors["username"], vec!["Username must not be empty"]);
        assert_eq!(errors["lastName"], vec!["Last name must not exceed 20 characters"]);
        assert_eq!(errors["email"], vec!["Invalid email format"]);
    }
}
