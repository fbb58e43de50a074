/// User domain types
use crate::types::UserId;
use serde::{Deserialize, Serialize};

/// Full user account, as seen by the account owner
///
/// The password hash never leaves the storage layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub username: String,
    pub fullname: String,
    pub description: Option<String>,
    pub picture: Option<String>,
    /// Set once the e-mail one-time code has been confirmed
    pub is_active: bool,
    /// Banned users disappear from public listings
    pub is_banned: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Public projection of a user used in listings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: UserId,
    pub username: String,
    pub fullname: String,
    pub description: Option<String>,
    pub picture: Option<String>,
}

/// User listing entry ranked by follower count
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PopularUser {
    #[serde(flatten)]
    pub user: UserSummary,
    pub followers: i64,
}

/// New account data
#[derive(Debug, Clone)]
pub struct CreateUser {
    pub email: String,
    pub username: String,
    pub password_hash: String,
    pub fullname: String,
}

/// Editable profile fields
#[derive(Debug, Clone)]
pub struct UpdateUser {
    pub fullname: String,
    pub description: String,
}

/// Stored login material for a username or e-mail
#[derive(Debug, Clone)]
pub struct UserCredentials {
    pub id: UserId,
    pub password_hash: String,
    pub is_active: bool,
}
