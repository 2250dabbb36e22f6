//! Bearer token issuing and validation
//!
//! Tokens are HS256 JWTs signed with a shared secret. Both services build a
//! [`JwtService`] from the same environment, so a token minted by the auth
//! service is accepted by the api service. Validation is stateless: signature,
//! expiry, issuer and audience are checked and nothing is looked up.

use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::role::Role;

const MIN_SECRET_LEN: usize = 32;

/// JWT configuration
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// HMAC secret shared by the services
    pub secret: String,
    /// `iss` claim written and required
    pub issuer: String,
    /// `aud` claim written and required
    pub audience: String,
    /// Token lifetime in minutes
    pub expiry_minutes: i64,
}

impl JwtConfig {
    /// Create a new JwtConfig from environment variables
    ///
    /// # Environment Variables
    /// - `JWT_SECRET`: HMAC secret, at least 32 bytes (required)
    /// - `JWT_ISSUER`: Token issuer (default: repairdesk-auth)
    /// - `JWT_AUDIENCE`: Token audience (default: repairdesk-api)
    /// - `JWT_EXPIRY_MINUTES`: Token lifetime in minutes (default: 1440)
    pub fn from_env() -> Result<Self> {
        let secret = std::env::var("JWT_SECRET")
            .map_err(|_| anyhow::anyhow!("JWT_SECRET environment variable not set"))?;

        let issuer =
            std::env::var("JWT_ISSUER").unwrap_or_else(|_| "repairdesk-auth".to_string());
        let audience =
            std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "repairdesk-api".to_string());

        let expiry_minutes = std::env::var("JWT_EXPIRY_MINUTES")
            .unwrap_or_else(|_| "1440".to_string()) // 24 hours
            .parse()
            .unwrap_or(1440);

        let config = JwtConfig {
            secret,
            issuer,
            audience,
            expiry_minutes,
        };
        config.check()?;
        Ok(config)
    }

    /// Default issuer, audience and lifetime around an explicit secret
    pub fn with_secret(secret: impl Into<String>) -> Self {
        JwtConfig {
            secret: secret.into(),
            issuer: "repairdesk-auth".to_string(),
            audience: "repairdesk-api".to_string(),
            expiry_minutes: 1440,
        }
    }

    fn check(&self) -> Result<()> {
        if self.secret.len() < MIN_SECRET_LEN {
            anyhow::bail!("JWT_SECRET must be at least {} bytes", MIN_SECRET_LEN);
        }
        if self.expiry_minutes <= 0 {
            anyhow::bail!("JWT_EXPIRY_MINUTES must be positive");
        }
        Ok(())
    }
}

/// The account a token is minted for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub role: Role,
    pub technician_id: Option<i32>,
    pub client_id: Option<i32>,
}

/// JWT claims structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    /// User ID
    pub sub: i32,
    pub username: String,
    pub email: String,
    pub role: Role,
    /// Linked technician record, if any
    pub technician_id: Option<i32>,
    /// Linked client record, if any
    pub client_id: Option<i32>,
    /// Issued at time
    pub iat: i64,
    /// Expiration time
    pub exp: i64,
    pub iss: String,
    pub aud: String,
}

/// A freshly minted token and the instant it stops being accepted
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// JWT service
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    config: JwtConfig,
}

impl JwtService {
    /// Initialize a new JWT service
    pub fn new(config: JwtConfig) -> Result<Self> {
        config.check()?;

        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.set_issuer(&[config.issuer.as_str()]);
        validation.set_audience(&[config.audience.as_str()]);

        Ok(JwtService {
            encoding_key,
            decoding_key,
            validation,
            config,
        })
    }

    /// Mint a token for `identity`, valid for the configured lifetime
    pub fn issue(&self, identity: &Identity) -> Result<IssuedToken> {
        self.issue_at(identity, Utc::now())
    }

    fn issue_at(&self, identity: &Identity, now: DateTime<Utc>) -> Result<IssuedToken> {
        let expires_at = now + Duration::minutes(self.config.expiry_minutes);

        let claims = Claims {
            sub: identity.id,
            username: identity.username.clone(),
            email: identity.email.clone(),
            role: identity.role,
            technician_id: identity.technician_id,
            client_id: identity.client_id,
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
            iss: self.config.issuer.clone(),
            aud: self.config.audience.clone(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)?;
        Ok(IssuedToken { token, expires_at })
    }

    /// Validate a token and return the claims
    pub fn validate_token(&self, token: &str) -> Result<Claims> {
        let token_data = decode::<Claims>(token, &self.decoding_key, &self.validation)?;
        Ok(token_data.claims)
    }
}
