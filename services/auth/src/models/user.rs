//! User model and related functionality

use chrono::{DateTime, SecondsFormat, Utc};
use common::{Identity, IssuedToken, Role};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;

/// User entity
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i32,
    pub username: String,
    pub email: String,
    /// Stored credential, in whatever form the password scheme produced
    pub password: String,
    #[sqlx(try_from = "String")]
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub technician_id: Option<i32>,
    pub client_id: Option<i32>,
}

impl User {
    /// What goes into a token minted for this user
    pub fn identity(&self) -> Identity {
        Identity {
            id: self.id,
            username: self.username.clone(),
            email: self.email.clone(),
            role: self.role,
            technician_id: self.technician_id,
            client_id: self.client_id,
        }
    }
}

/// New user creation payload; `password` is already sealed
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password: String,
    pub role: Role,
    pub technician_id: Option<i32>,
    pub client_id: Option<i32>,
}

/// Body of `POST /api/auth/register`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    /// Parsed against the closed role set; absent means `User`
    pub role: Option<String>,
    pub technician_id: Option<i32>,
    pub client_id: Option<i32>,
}

impl RegisterRequest {
    /// Self-service sign-ups may only create a plain, unlinked user
    pub fn is_self_service(&self) -> bool {
        matches!(self.role.as_deref(), None | Some("User"))
            && self.technician_id.is_none()
            && self.client_id.is_none()
    }
}

/// Body of `POST /api/auth/register-user`
#[derive(Debug, Clone, Deserialize)]
pub struct PublicRegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl From<PublicRegisterRequest> for RegisterRequest {
    fn from(request: PublicRegisterRequest) -> Self {
        RegisterRequest {
            username: request.username,
            email: request.email,
            password: request.password,
            role: Some(Role::User.to_string()),
            technician_id: None,
            client_id: None,
        }
    }
}

/// User login credentials
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Change to a nullable link: `None` keeps it, `Some(None)` clears it
pub type LinkUpdate = Option<Option<i32>>;

/// A link field that is present, possibly as `null`
fn present_link<'de, D>(deserializer: D) -> Result<LinkUpdate, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<i32>::deserialize(deserializer).map(Some)
}

/// Body of `PUT /api/users/{id}/role`
///
/// Links left out keep their current value; an explicit `null` removes them.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRoleRequest {
    pub role: String,
    #[serde(default, deserialize_with = "present_link")]
    pub technician_id: LinkUpdate,
    #[serde(default, deserialize_with = "present_link")]
    pub client_id: LinkUpdate,
}

/// User as returned by the API; never carries the credential
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub role: Role,
    pub technician_id: Option<i32>,
    pub client_id: Option<i32>,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        UserResponse {
            id: user.id,
            username: user.username,
            email: user.email,
            role: user.role,
            technician_id: user.technician_id,
            client_id: user.client_id,
            created_at: user.created_at,
        }
    }
}

/// Response for register and login
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    /// RFC 3339, whole seconds, UTC
    pub expires: String,
    pub user: UserResponse,
}

impl AuthResponse {
    pub fn new(issued: IssuedToken, user: User) -> Self {
        AuthResponse {
            token: issued.token,
            expires: issued.expires_at.to_rfc3339_opts(SecondsFormat::Secs, true),
            user: user.into(),
        }
    }
}
