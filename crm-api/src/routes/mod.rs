/// API route handlers, one module per resource
///
/// - `health`: health check
/// - `auth`: register, login, logout, session
/// - `customers`: customer CRUD with tags
/// - `notes`: notes nested under a customer
/// - `problems`: problems tracker and statistics
/// - `users`: profile and admin user management
/// - `tags`: tag listing with usage counts
/// - `dashboard`: summary data for the dashboard view

pub mod auth;
pub mod customers;
pub mod dashboard;
pub mod health;
pub mod notes;
pub mod problems;
pub mod tags;
pub mod users;

use serde::{Deserialize, Deserializer, Serialize};

/// Body returned by DELETE endpoints
#[derive(Debug, Serialize, Deserialize)]
pub struct SuccessResponse {
    pub success: bool,
}

impl SuccessResponse {
    pub fn ok() -> Self {
        Self { success: true }
    }
}

/// Distinguishes an absent field (`None`) from an explicit `null`
/// (`Some(None)`) in PATCH bodies
///
/// Use with `#[serde(default, deserialize_with = "double_option")]`.
pub fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Patch {
        #[serde(default, deserialize_with = "double_option")]
        phone: Option<Option<String>>,
    }

    #[test]
    fn test_double_option() {
        let absent: Patch = serde_json::from_str("{}").unwrap();
        assert_eq!(absent.phone, None);

        let null: Patch = serde_json::from_str(r#"{"phone": null}"#).unwrap();
        assert_eq!(null.phone, Some(None));

        let set: Patch = serde_json::from_str(r#"{"phone": "555-1234"}"#).unwrap();
        assert_eq!(set.phone, Some(Some("555-1234".to_string())));
    }
}
