//! Authorization gate
//!
//! [`CurrentUser`] authenticates a request from its `Authorization: Bearer`
//! header. Handlers then ask it for a role check (`require`) or for one of
//! the ownership rules applied to repair orders and technician records.

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};
use tracing::{debug, warn};

use crate::{
    error::{ApiError, ApiResult},
    jwt::{Claims, JwtService},
    role::Role,
};

/// Claims of the authenticated caller
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Claims);

/// Which repair orders a caller may list as "my orders"
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderScope {
    All,
    Technician(i32),
    Client(i32),
    /// Account has no link to a technician or client record
    Empty,
}

/// The two links an order carries that ownership rules look at
pub trait OrderOwnership {
    fn assigned_technician_id(&self) -> i32;
    fn owning_client_id(&self) -> i32;
}

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
    JwtService: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|_| ApiError::Unauthorized)?;

        let jwt = JwtService::from_ref(state);
        let claims = jwt.validate_token(bearer.token()).map_err(|e| {
            debug!("Rejected bearer token: {}", e);
            ApiError::Unauthorized
        })?;

        Ok(CurrentUser(claims))
    }
}

impl CurrentUser {
    pub fn id(&self) -> i32 {
        self.0.sub
    }

    pub fn role(&self) -> Role {
        self.0.role
    }

    /// Permit only callers whose role is in `allowed`
    pub fn require(&self, allowed: &[Role]) -> ApiResult<()> {
        if allowed.contains(&self.0.role) {
            Ok(())
        } else {
            warn!(
                "User {} with role {} denied, requires one of {:?}",
                self.0.sub, self.0.role, allowed
            );
            Err(ApiError::Forbidden(
                "Insufficient role for this operation".to_string(),
            ))
        }
    }

    /// Orders visible through "my orders"
    pub fn order_scope(&self) -> OrderScope {
        match self.0.role {
            Role::Admin => OrderScope::All,
            Role::Technician => self
                .0
                .technician_id
                .map_or(OrderScope::Empty, OrderScope::Technician),
            Role::User => self
                .0
                .client_id
                .map_or(OrderScope::Empty, OrderScope::Client),
        }
    }

    /// Staff see every order; a user only the orders for their own devices
    pub fn may_view_order(&self, order: &impl OrderOwnership) -> ApiResult<()> {
        match self.0.role {
            Role::Admin | Role::Technician => Ok(()),
            Role::User if self.0.client_id == Some(order.owning_client_id()) => Ok(()),
            Role::User => Err(self.deny("view this repair order")),
        }
    }

    /// Admins modify any order; a technician only those assigned to them
    pub fn may_modify_order(&self, order: &impl OrderOwnership) -> ApiResult<()> {
        match self.0.role {
            Role::Admin => Ok(()),
            Role::Technician if self.0.technician_id == Some(order.assigned_technician_id()) => {
                Ok(())
            }
            _ => Err(self.deny("modify this repair order")),
        }
    }

    /// Admins edit any technician; a technician only their own record
    pub fn may_edit_technician(&self, technician_id: i32) -> ApiResult<()> {
        match self.0.role {
            Role::Admin => Ok(()),
            Role::Technician if self.0.technician_id == Some(technician_id) => Ok(()),
            _ => Err(self.deny("edit this technician")),
        }
    }

    fn deny(&self, action: &str) -> ApiError {
        warn!("User {} ({}) may not {}", self.0.sub, self.0.role, action);
        ApiError::Forbidden(format!("Not allowed to {}", action))
    }
}
