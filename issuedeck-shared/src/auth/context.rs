/// Authenticated request context
///
/// After successful JWT validation, the API server inserts an
/// [`AuthContext`] into the request extensions. Handlers extract it with
/// Axum's `Extension` extractor and pass the actor identity explicitly
/// into every access-control predicate and scoped query; there is no
/// implicit "current user".
///
/// # Example
///
/// ```
/// use issuedeck_shared::auth::context::AuthContext;
/// use uuid::Uuid;
///
/// let user_id = Uuid::new_v4();
/// let context = AuthContext::from_claims(user_id);
/// assert_eq!(context.user_id, user_id);
/// ```

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identity of the authenticated caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthContext {
    /// Authenticated user ID
    pub user_id: Uuid,
}

impl AuthContext {
    /// Creates an auth context from validated JWT claims
    pub fn from_claims(user_id: Uuid) -> Self {
        Self { user_id }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_context_from_claims() {
        let user_id = Uuid::new_v4();
        let context = AuthContext::from_claims(user_id);
        assert_eq!(context.user_id, user_id);
    }
}
