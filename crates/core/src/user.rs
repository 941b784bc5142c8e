//! Accounts as far as the core needs them: identity, password hash and
//! the scope allow-list.

use serde::Serialize;

use crate::scope;
use crate::types::DbId;

/// A registered writer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub id: DbId,
    pub username: String,
    /// Argon2id PHC string.
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Scopes this user may request or present.
    pub scopes: Vec<String>,
}

impl User {
    pub fn can_use_scope(&self, scope: &str) -> bool {
        scope::is_allowed(&self.scopes, scope)
    }
}

/// Account to insert. Hashing happens in the transport layer.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub password_hash: String,
    pub scopes: Vec<String>,
}

impl NewUser {
    /// New account with the default allow-list.
    pub fn new(username: impl Into<String>, password_hash: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password_hash: password_hash.into(),
            scopes: scope::default_scopes(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_can_use_scope_follows_allow_list() {
        let mut user = User {
            id: 1,
            username: "ada".into(),
            password_hash: "x".into(),
            scopes: scope::default_scopes(),
        };
        assert!(user.can_use_scope(scope::SCOPE_BASIC));

        user.scopes.retain(|s| s != scope::SCOPE_BASIC);
        assert!(!user.can_use_scope(scope::SCOPE_BASIC));
    }

    #[test]
    fn test_password_hash_not_serialized() {
        let json = serde_json::to_value(User {
            id: 1,
            username: "ada".into(),
            password_hash: "secret".into(),
            scopes: vec![],
        })
        .unwrap();
        assert!(json.get("password_hash").is_none());
    }
}
