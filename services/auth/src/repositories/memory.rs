//! In-process user repository
//!
//! Mirrors the unique constraints on `email` and `username`. Technician and
//! client links are stored without checking that they resolve, since those
//! tables belong to the api service.

use async_trait::async_trait;
use chrono::Utc;
use common::{DatabaseError, DatabaseResult, Role};
use std::sync::Arc;
use tokio::sync::RwLock;

use super::UserRepository;
use crate::models::{LinkUpdate, NewUser, User};

#[derive(Debug, Default)]
struct Table {
    next_id: i32,
    rows: Vec<User>,
}

#[derive(Debug, Clone, Default)]
pub struct MemoryUserRepository {
    table: Arc<RwLock<Table>>,
}

impl MemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn create(&self, new_user: NewUser) -> DatabaseResult<User> {
        let mut table = self.table.write().await;

        if table.rows.iter().any(|u| u.email == new_user.email) {
            return Err(DatabaseError::UniqueViolation("users_email_key".to_string()));
        }
        if table.rows.iter().any(|u| u.username == new_user.username) {
            return Err(DatabaseError::UniqueViolation(
                "users_username_key".to_string(),
            ));
        }

        table.next_id += 1;
        let user = User {
            id: table.next_id,
            username: new_user.username,
            email: new_user.email,
            password: new_user.password,
            role: new_user.role,
            created_at: Utc::now(),
            technician_id: new_user.technician_id,
            client_id: new_user.client_id,
        };
        table.rows.push(user.clone());

        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> DatabaseResult<Option<User>> {
        let table = self.table.read().await;
        Ok(table.rows.iter().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: i32) -> DatabaseResult<Option<User>> {
        let table = self.table.read().await;
        Ok(table.rows.iter().find(|u| u.id == id).cloned())
    }

    async fn list(&self) -> DatabaseResult<Vec<User>> {
        let table = self.table.read().await;
        Ok(table.rows.clone())
    }

    async fn update_role(
        &self,
        id: i32,
        role: Role,
        technician_id: LinkUpdate,
        client_id: LinkUpdate,
    ) -> DatabaseResult<Option<User>> {
        let mut table = self.table.write().await;

        let Some(user) = table.rows.iter_mut().find(|u| u.id == id) else {
            return Ok(None);
        };

        user.role = role;
        if let Some(link) = technician_id {
            user.technician_id = link;
        }
        if let Some(link) = client_id {
            user.client_id = link;
        }

        Ok(Some(user.clone()))
    }

    async fn email_exists(&self, email: &str) -> DatabaseResult<bool> {
        let table = self.table.read().await;
        Ok(table.rows.iter().any(|u| u.email == email))
    }
}
