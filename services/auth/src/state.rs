//! Application state shared across handlers

use axum::extract::FromRef;
use common::JwtService;
use std::sync::Arc;

use crate::{authenticator::Authenticator, repositories::UserRepository};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub authenticator: Authenticator,
    pub jwt_service: JwtService,
    pub user_repository: Arc<dyn UserRepository>,
}

impl FromRef<AppState> for JwtService {
    fn from_ref(state: &AppState) -> Self {
        state.jwt_service.clone()
    }
}
