//! Registration and login
//!
//! The authenticator owns the credential rules: input validation, the closed
//! role set, duplicate detection, password checking, login throttling and
//! token issuance.

use common::{
    ApiError, ApiResult, DatabaseError, IssuedToken, JwtService, Role, validation,
};
use std::sync::Arc;
use tracing::{info, warn};

use crate::{
    models::{NewUser, RegisterRequest, User},
    password::PasswordScheme,
    rate_limiter::RateLimiter,
    repositories::UserRepository,
};

#[derive(Clone)]
pub struct Authenticator {
    users: Arc<dyn UserRepository>,
    jwt: JwtService,
    passwords: PasswordScheme,
    limiter: RateLimiter,
}

impl Authenticator {
    pub fn new(
        users: Arc<dyn UserRepository>,
        jwt: JwtService,
        passwords: PasswordScheme,
        limiter: RateLimiter,
    ) -> Self {
        Self {
            users,
            jwt,
            passwords,
            limiter,
        }
    }

    /// Create an account and log it in
    pub async fn register(&self, request: RegisterRequest) -> ApiResult<(IssuedToken, User)> {
        validation::validate_username(&request.username).map_err(ApiError::Validation)?;
        validation::validate_email(&request.email).map_err(ApiError::Validation)?;
        validation::validate_password(&request.password).map_err(ApiError::Validation)?;
        if let Some(id) = request.technician_id {
            validation::validate_id("TechnicianId", id).map_err(ApiError::Validation)?;
        }
        if let Some(id) = request.client_id {
            validation::validate_id("ClientId", id).map_err(ApiError::Validation)?;
        }

        let role = match request.role.as_deref() {
            None => Role::default(),
            Some(name) => name
                .parse::<Role>()
                .map_err(|e| ApiError::Validation(e.to_string()))?,
        };

        if self.user_exists(&request.email).await? {
            warn!("Registration rejected, email already in use: {}", request.email);
            return Err(duplicate());
        }

        let password = self.passwords.seal(&request.password).map_err(ApiError::internal)?;

        let new_user = NewUser {
            username: request.username,
            email: request.email,
            password,
            role,
            technician_id: request.technician_id,
            client_id: request.client_id,
        };

        let user = self.users.create(new_user).await.map_err(|e| match e {
            DatabaseError::UniqueViolation(_) => duplicate(),
            DatabaseError::ForeignKeyViolation(_) => ApiError::InvalidReference(
                "Linked technician or client does not exist".to_string(),
            ),
            other => ApiError::internal(other),
        })?;

        info!("Registered user {} with role {}", user.id, user.role);

        let issued = self.jwt.issue(&user.identity()).map_err(ApiError::internal)?;
        Ok((issued, user))
    }

    /// Exchange credentials for a token
    ///
    /// Unknown email and wrong password fail identically.
    pub async fn login(&self, email: &str, password: &str) -> ApiResult<(IssuedToken, User)> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(ApiError::Validation(
                "Email and password are required".to_string(),
            ));
        }

        if !self.limiter.check(email).await {
            warn!("Login refused, too many failed attempts for {}", email);
            return Err(ApiError::TooManyRequests);
        }

        let user = self.users.find_by_email(email).await.map_err(ApiError::internal)?;

        let user = match user {
            Some(user) if self.passwords.verify(password, &user.password) => user,
            _ => {
                warn!("Failed login for {}", email);
                self.limiter.record_failure(email).await;
                return Err(ApiError::InvalidCredentials);
            }
        };

        self.limiter.reset(email).await;
        info!("User {} logged in", user.id);

        let issued = self.jwt.issue(&user.identity()).map_err(ApiError::internal)?;
        Ok((issued, user))
    }

    pub async fn user_exists(&self, email: &str) -> ApiResult<bool> {
        self.users
            .email_exists(email)
            .await
            .map_err(ApiError::internal)
    }
}

fn duplicate() -> ApiError {
    ApiError::DuplicateIdentity("A user with this email or username already exists".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{rate_limiter::RateLimiterConfig, repositories::MemoryUserRepository};
    use common::JwtConfig;

    fn authenticator(limit: u32) -> (Authenticator, JwtService) {
        let jwt =
            JwtService::new(JwtConfig::with_secret("authenticator-test-secret-0123456789")).unwrap();
        let limiter = RateLimiter::new(RateLimiterConfig {
            max_attempts: limit,
            window_seconds: 300,
            ban_duration_seconds: 900,
        });
        let auth = Authenticator::new(
            Arc::new(MemoryUserRepository::new()),
            jwt.clone(),
            PasswordScheme::Plaintext,
            limiter,
        );
        (auth, jwt)
    }

    fn request(username: &str, email: &str, role: Option<&str>) -> RegisterRequest {
        RegisterRequest {
            username: username.to_string(),
            email: email.to_string(),
            password: "secret1".to_string(),
            role: role.map(str::to_string),
            technician_id: None,
            client_id: None,
        }
    }

    #[tokio::test]
    async fn test_register_defaults_to_user_role() {
        let (auth, jwt) = authenticator(5);
        let (issued, user) = auth
            .register(request("jdoe", "jdoe@example.com", None))
            .await
            .unwrap();

        assert_eq!(user.role, Role::User);
        let claims = jwt.validate_token(&issued.token).unwrap();
        assert_eq!(claims.role, Role::User);
        assert_eq!(claims.sub, user.id);
    }

    #[tokio::test]
    async fn test_register_rejects_unknown_role() {
        let (auth, _) = authenticator(5);
        let result = auth
            .register(request("jdoe", "jdoe@example.com", Some("SuperAdmin")))
            .await;

        assert!(matches!(result, Err(ApiError::Validation(_))));
        assert!(!auth.user_exists("jdoe@example.com").await.unwrap());
    }

    #[tokio::test]
    async fn test_register_duplicate_email_and_username() {
        let (auth, _) = authenticator(5);
        auth.register(request("jdoe", "jdoe@example.com", None))
            .await
            .unwrap();

        let same_email = auth
            .register(request("other", "jdoe@example.com", None))
            .await;
        assert!(matches!(same_email, Err(ApiError::DuplicateIdentity(_))));

        let same_username = auth
            .register(request("jdoe", "other@example.com", None))
            .await;
        assert!(matches!(same_username, Err(ApiError::DuplicateIdentity(_))));
    }

    #[tokio::test]
    async fn test_register_validates_input() {
        let (auth, _) = authenticator(5);

        let bad_email = auth.register(request("jdoe", "not-an-email", None)).await;
        assert!(matches!(bad_email, Err(ApiError::Validation(_))));

        let mut short_password = request("jdoe", "jdoe@example.com", None);
        short_password.password = "12345".to_string();
        assert!(matches!(
            auth.register(short_password).await,
            Err(ApiError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_login_role_claim_matches_stored_role() {
        let (auth, jwt) = authenticator(5);
        auth.register(request("tech", "tech@example.com", Some("Technician")))
            .await
            .unwrap();

        let (issued, user) = auth.login("tech@example.com", "secret1").await.unwrap();
        assert_eq!(user.role, Role::Technician);
        assert_eq!(jwt.validate_token(&issued.token).unwrap().role, Role::Technician);
    }

    #[tokio::test]
    async fn test_login_failures_are_indistinguishable() {
        let (auth, _) = authenticator(5);
        auth.register(request("jdoe", "jdoe@example.com", None))
            .await
            .unwrap();

        let wrong_password = auth.login("jdoe@example.com", "wrong-pass").await.unwrap_err();
        let unknown_email = auth.login("nobody@example.com", "secret1").await.unwrap_err();

        assert!(matches!(wrong_password, ApiError::InvalidCredentials));
        assert!(matches!(unknown_email, ApiError::InvalidCredentials));
        assert_eq!(wrong_password.to_string(), unknown_email.to_string());
        assert_eq!(wrong_password.to_string(), "Invalid email or password");
    }

    #[tokio::test]
    async fn test_login_is_throttled_after_repeated_failures() {
        let (auth, _) = authenticator(2);
        auth.register(request("jdoe", "jdoe@example.com", None))
            .await
            .unwrap();

        for _ in 0..2 {
            assert!(matches!(
                auth.login("jdoe@example.com", "wrong-pass").await,
                Err(ApiError::InvalidCredentials)
            ));
        }

        // Correct password is refused while locked out
        assert!(matches!(
            auth.login("jdoe@example.com", "secret1").await,
            Err(ApiError::TooManyRequests)
        ));
    }

    #[tokio::test]
    async fn test_successful_login_resets_failures() {
        let (auth, _) = authenticator(2);
        auth.register(request("jdoe", "jdoe@example.com", None))
            .await
            .unwrap();

        assert!(auth.login("jdoe@example.com", "wrong-pass").await.is_err());
        assert!(auth.login("jdoe@example.com", "secret1").await.is_ok());
        assert!(auth.login("jdoe@example.com", "wrong-pass").await.is_err());
        assert!(auth.login("jdoe@example.com", "secret1").await.is_ok());
    }
}
