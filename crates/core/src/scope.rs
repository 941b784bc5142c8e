//! Token scope names and the server-side allow-list.
//!
//! Scopes are flat: holding one never implies another.

/// Placeholder scope granted to every account.
pub const SCOPE_NULL: &str = "null";

/// Scope required by every write operation.
pub const SCOPE_BASIC: &str = "basic";

/// Allow-list given to accounts created without an explicit one.
pub const DEFAULT_SCOPES: &[&str] = &[SCOPE_NULL, SCOPE_BASIC];

/// The default allow-list as owned strings, ready to persist.
pub fn default_scopes() -> Vec<String> {
    DEFAULT_SCOPES.iter().map(|s| s.to_string()).collect()
}

/// Exact-match membership test against an allow-list.
pub fn is_allowed(allowed: &[String], scope: &str) -> bool {
    allowed.iter().any(|s| s == scope)
}
