/// Role and ownership checks
///
/// The permission model is small:
///
/// 1. **Ownership**: customers, notes and problems are visible only to the user
///    who owns them. A record owned by someone else is reported as not found,
///    never as forbidden, so ids of other users' records do not leak.
/// 2. **Role**: user management (listing users, changing roles, deleting
///    users) requires [`UserRole::Admin`].
///
/// # Example
///
/// ```
/// use crm_shared::auth::authorization::require_admin;
/// use crm_shared::auth::middleware::AuthContext;
/// use crm_shared::models::user::UserRole;
/// use uuid::Uuid;
///
/// let rep = AuthContext {
///     user_id: Uuid::new_v4(),
///     role: UserRole::SalesRep,
///     email: "rep@example.com".to_string(),
/// };
/// assert!(require_admin(&rep).is_err());
/// ```

use uuid::Uuid;

use super::middleware::AuthContext;
use crate::models::user::UserRole;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthzError {
    #[error("Insufficient permissions: requires {required:?}, has {actual:?}")]
    InsufficientRole { required: UserRole, actual: UserRole },

    /// An admin tried to delete or demote their own account
    #[error("You cannot perform this action on your own account")]
    SelfTarget,
}

/// Requires the caller to be an admin
pub fn require_admin(auth: &AuthContext) -> Result<(), AuthzError> {
    if auth.role.can_manage_users() {
        Ok(())
    } else {
        Err(AuthzError::InsufficientRole {
            required: UserRole::Admin,
            actual: auth.role,
        })
    }
}

/// Rejects user-management actions aimed at the caller's own account
pub fn require_other_user(auth: &AuthContext, target: Uuid) -> Result<(), AuthzError> {
    if auth.user_id == target {
        Err(AuthzError::SelfTarget)
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(role: UserRole) -> AuthContext {
        AuthContext {
            user_id: Uuid::new_v4(),
            role,
            email: "someone@example.com".to_string(),
        }
    }

    #[test]
    fn test_require_admin() {
        assert!(require_admin(&ctx(UserRole::Admin)).is_ok());
        assert_eq!(
            require_admin(&ctx(UserRole::SalesRep)),
            Err(AuthzError::InsufficientRole {
                required: UserRole::Admin,
                actual: UserRole::SalesRep,
            })
        );
    }

    #[test]
    fn test_require_other_user() {
        let admin = ctx(UserRole::Admin);
        assert_eq!(
            require_other_user(&admin, admin.user_id),
            Err(AuthzError::SelfTarget)
        );
        assert!(require_other_user(&admin, Uuid::new_v4()).is_ok());
    }
}
