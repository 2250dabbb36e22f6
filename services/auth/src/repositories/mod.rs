//! Credential store
//!
//! [`UserRepository`] is implemented for PostgreSQL and for process memory;
//! `STORAGE_BACKEND` picks one at start-up.

use async_trait::async_trait;
use common::{DatabaseResult, Role};

use crate::models::{LinkUpdate, NewUser, User};

pub mod memory;
pub mod postgres;

pub use memory::MemoryUserRepository;
pub use postgres::PgUserRepository;

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a user; a taken email or username is a `UniqueViolation`
    async fn create(&self, new_user: NewUser) -> DatabaseResult<User>;

    async fn find_by_email(&self, email: &str) -> DatabaseResult<Option<User>>;

    async fn find_by_id(&self, id: i32) -> DatabaseResult<Option<User>>;

    /// All users ordered by id
    async fn list(&self) -> DatabaseResult<Vec<User>>;

    /// Change a user's role; `None` links keep their stored value and
    /// `Some(None)` clears it
    async fn update_role(
        &self,
        id: i32,
        role: Role,
        technician_id: LinkUpdate,
        client_id: LinkUpdate,
    ) -> DatabaseResult<Option<User>>;

    async fn email_exists(&self, email: &str) -> DatabaseResult<bool>;
}
