//! Read-only view of a user account.

use super::UserId;

/// A user who can register for events.
///
/// Accounts are managed elsewhere; this service only checks existence and
/// shows name and email on rosters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// User identifier.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Email address.
    pub email: String,
}
