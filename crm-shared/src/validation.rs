//! Field normalization and checks shared by the handlers
//!
//! Request structs carry `validator` derives for the simple rules; the helpers
//! here cover what those derives cannot express (trimming, required-but-blank,
//! tag list cleanup).

use validator::ValidateEmail;

/// A single field that failed validation
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field}: {message}")]
pub struct FieldError {
    /// Field name as it appears in the JSON body
    pub field: String,

    /// Human-readable reason
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Minimum password length accepted at registration and password change
pub const MIN_PASSWORD_LEN: usize = 8;

/// Trims a required text field, rejecting missing or blank values
pub fn required(field: &str, value: Option<&str>) -> Result<String, FieldError> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(FieldError::new(field, format!("{} is required", field))),
    }
}

/// Trims an optional text field; blank becomes `None`
pub fn optional(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Longest name, email or company accepted (VARCHAR(255) columns)
pub const MAX_TEXT_LEN: usize = 255;

/// Longest phone number accepted
pub const MAX_PHONE_LEN: usize = 64;

/// Longest tag name or problem category accepted
pub const MAX_TAG_LEN: usize = 100;

/// Rejects values longer than `max` characters
pub fn max_length(field: &str, value: &str, max: usize) -> Result<(), FieldError> {
    if value.chars().count() > max {
        return Err(FieldError::new(
            field,
            format!("{} must be at most {} characters", field, max),
        ));
    }
    Ok(())
}

/// Trims an email and checks its format and length, keeping its case
pub fn contact_email(field: &str, value: &str) -> Result<String, FieldError> {
    let email = required(field, Some(value))?;
    max_length(field, &email, MAX_TEXT_LEN)?;
    if !email.validate_email() {
        return Err(FieldError::new(field, "Invalid email format"));
    }
    Ok(email)
}

/// Lowercases and trims an account email, rejecting malformed addresses
///
/// Account emails are unique case-insensitively, so they are stored lowercase.
pub fn normalize_email(field: &str, value: &str) -> Result<String, FieldError> {
    contact_email(field, value).map(|email| email.to_lowercase())
}

/// Checks the password length rule
pub fn check_password(field: &str, password: &str) -> Result<(), FieldError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(FieldError::new(
            field,
            format!("Password must be at least {} characters", MIN_PASSWORD_LEN),
        ));
    }
    Ok(())
}

/// Cleans a list of tag names
///
/// Names are trimmed, blanks dropped and duplicates collapsed, keeping the
/// first spelling seen. Order of first appearance is preserved. A name longer
/// than [`MAX_TAG_LEN`] rejects the whole list.
pub fn normalize_tags(tags: &[String]) -> Result<Vec<String>, FieldError> {
    let mut out: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let name = tag.trim();
        if name.is_empty() || out.iter().any(|seen| seen == name) {
            continue;
        }
        max_length("tags", name, MAX_TAG_LEN)?;
        out.push(name.to_string());
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_trims() {
        assert_eq!(required("name", Some("  Ada ")).unwrap(), "Ada");
    }

    #[test]
    fn test_required_rejects_blank_and_missing() {
        let err = required("name", Some("   ")).unwrap_err();
        assert_eq!(err.field, "name");
        assert_eq!(err.message, "name is required");

        assert!(required("title", None).is_err());
    }

    #[test]
    fn test_optional() {
        assert_eq!(optional(Some(" Acme ")), Some("Acme".to_string()));
        assert_eq!(optional(Some("  ")), None);
        assert_eq!(optional(None), None);
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(
            normalize_email("email", "  John@Example.COM ").unwrap(),
            "john@example.com"
        );
        assert!(normalize_email("email", "not-an-email").is_err());
        assert_eq!(
            normalize_email("email", "").unwrap_err().message,
            "email is required"
        );
    }

    #[test]
    fn test_check_password() {
        assert!(check_password("password", "1234567").is_err());
        assert!(check_password("password", "12345678").is_ok());
    }

    #[test]
    fn test_normalize_tags() {
        let tags = vec![
            " VIP ".to_string(),
            "".to_string(),
            "Enterprise".to_string(),
            "VIP".to_string(),
            "   ".to_string(),
        ];
        assert_eq!(normalize_tags(&tags).unwrap(), vec!["VIP", "Enterprise"]);
    }

    #[test]
    fn test_normalize_tags_rejects_long_name() {
        let tags = vec!["ok".to_string(), "x".repeat(MAX_TAG_LEN + 1)];
        let err = normalize_tags(&tags).unwrap_err();
        assert_eq!(err.field, "tags");

        let exact = vec!["y".repeat(MAX_TAG_LEN)];
        assert!(normalize_tags(&exact).is_ok());
    }

    #[test]
    fn test_contact_email_keeps_case() {
        assert_eq!(
            contact_email("email", "  Buyer@Acme.test ").unwrap(),
            "Buyer@Acme.test"
        );
        assert!(contact_email("email", "nope").is_err());

        let long = format!("{}@example.com", "a".repeat(MAX_TEXT_LEN));
        assert!(contact_email("email", &long).is_err());
    }

    #[test]
    fn test_max_length_counts_characters() {
        assert!(max_length("name", &"é".repeat(10), 10).is_ok());
        assert!(max_length("name", &"é".repeat(11), 10).is_err());
    }

    #[test]
    fn test_normalize_tags_is_case_sensitive() {
        let tags = vec!["vip".to_string(), "VIP".to_string()];
        assert_eq!(normalize_tags(&tags).unwrap(), vec!["vip", "VIP"]);
    }
}
