use crate::{
    config::settings::AuthSettings,
    database::connection::DbPool,
    models::{
        auth::Claims,
        user::{User, UserError, UserRole},
    },
};
use chrono::Duration;
use jsonwebtoken::{
    DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("JWT secret is not configured")]
    MissingSecret,
    #[error("Token expired")]
    Expired,
    #[error("Invalid token: {0}")]
    InvalidToken(jsonwebtoken::errors::Error),
    #[error("Token encoding failed: {0}")]
    Encode(jsonwebtoken::errors::Error),
}

#[derive(Clone)]
pub struct AuthService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    token_ttl: Duration,
    secure_cookies: bool,
}

impl AuthService {
    pub fn new(settings: &AuthSettings, secure_cookies: bool) -> Result<Self, AuthError> {
        if settings.jwt_secret.trim().is_empty() {
            return Err(AuthError::MissingSecret);
        }

        let secret = settings.jwt_secret.as_bytes();
        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            token_ttl: Duration::days(settings.token_ttl_days),
            secure_cookies,
        })
    }

    pub fn token_ttl(&self) -> Duration {
        self.token_ttl
    }

    /// Cookies are `Secure` and cross-site only in production.
    pub fn secure_cookies(&self) -> bool {
        self.secure_cookies
    }

    pub fn generate_token(&self, user: &User) -> Result<String, AuthError> {
        self.generate_token_for(user.id, &user.email, user.role)
    }

    pub fn generate_token_for(
        &self,
        user_id: Uuid,
        email: &str,
        role: UserRole,
    ) -> Result<String, AuthError> {
        let claims = Claims::new(user_id, email.to_string(), role, self.token_ttl);
        encode(&Header::default(), &claims, &self.encoding_key).map_err(AuthError::Encode)
    }

    pub fn verify_token(&self, token: &str) -> Result<Claims, AuthError> {
        decode::<Claims>(token, &self.decoding_key, &Validation::default())
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::Expired,
                _ => AuthError::InvalidToken(e),
            })
    }

    pub async fn authenticate_user(
        &self,
        pool: &DbPool,
        email: &str,
        password: &str,
    ) -> Result<Option<User>, UserError> {
        User::authenticate(pool, email, password).await
    }
}
