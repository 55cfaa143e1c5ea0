use crate::database::connection::DbPool;
use crate::models::volunteer::{CreateVolunteer, Volunteer, VolunteerError};
use bcrypt::{DEFAULT_COST, hash, verify};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum UserError {
    #[error("User with ID {id} not found")]
    NotFound { id: Uuid },
    #[error("User already exists")]
    EmailTaken,
    #[error("Password hashing failed: {0}")]
    Hash(#[from] bcrypt::BcryptError),
    #[error("Volunteer profile error: {0}")]
    Volunteer(#[from] VolunteerError),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Type, PartialEq, Eq)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    User,
    Volunteer,
}

impl FromStr for UserRole {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "user" => Ok(UserRole::User),
            "volunteer" => Ok(UserRole::Volunteer),
            _ => Err(()),
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserRole::User => write!(f, "user"),
            UserRole::Volunteer => write!(f, "volunteer"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// `password` is plain text; it is hashed on insert.
#[derive(Debug, Clone)]
pub struct CreateUser {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: UserRole,
}

impl User {
    pub async fn create(pool: &DbPool, user: CreateUser) -> Result<Self, UserError> {
        if Self::find_by_email(pool, &user.email).await?.is_some() {
            return Err(UserError::EmailTaken);
        }

        let now = Utc::now();
        let hashed_password = hash(user.password.as_bytes(), DEFAULT_COST)?;

        let user = sqlx::query_as::<_, User>(
            "INSERT INTO users (id, name, email, password_hash, role, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(user.name)
        .bind(user.email)
        .bind(hashed_password)
        .bind(user.role)
        .bind(now)
        .bind(now)
        .fetch_one(pool)
        .await
        .map_err(map_unique_violation)?;

        Ok(user)
    }

    /// Registers a volunteer account together with its profile row.
    pub async fn create_volunteer(
        pool: &DbPool,
        user: CreateUser,
        profile: CreateVolunteer,
    ) -> Result<(Self, Volunteer), UserError> {
        if Self::find_by_email(pool, &user.email).await?.is_some() {
            return Err(UserError::EmailTaken);
        }

        let now = Utc::now();
        let hashed_password = hash(user.password.as_bytes(), DEFAULT_COST)?;

        let mut tx = pool.begin().await?;

        let created = sqlx::query_as::<_, User>(
            "INSERT INTO users (id, name, email, password_hash, role, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(user.name)
        .bind(user.email)
        .bind(hashed_password)
        .bind(UserRole::Volunteer)
        .bind(now)
        .bind(now)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_unique_violation)?;

        let volunteer = Volunteer::upsert_by_email(&mut *tx, profile).await?;

        tx.commit().await?;

        Ok((created, volunteer))
    }

    pub async fn find_by_id(pool: &DbPool, id: Uuid) -> Result<Option<Self>, UserError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?;

        Ok(user)
    }

    pub async fn find_by_email(pool: &DbPool, email: &str) -> Result<Option<Self>, UserError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(pool)
            .await?;

        Ok(user)
    }

    pub fn verify_password(&self, password: &str) -> Result<bool, bcrypt::BcryptError> {
        verify(password, &self.password_hash)
    }

    pub async fn authenticate(
        pool: &DbPool,
        email: &str,
        password: &str,
    ) -> Result<Option<Self>, UserError> {
        if let Some(user) = Self::find_by_email(pool, email).await? {
            if user.verify_password(password)? {
                return Ok(Some(user));
            }
        }
        Ok(None)
    }

    /// Switches the account to the volunteer role and stores the profile,
    /// replacing any profile already registered under the same email.
    pub async fn promote_to_volunteer(
        pool: &DbPool,
        id: Uuid,
        profile: CreateVolunteer,
    ) -> Result<(Self, Volunteer), UserError> {
        let mut tx = pool.begin().await?;

        let user = sqlx::query_as::<_, User>(
            "UPDATE users SET role = $2, updated_at = $3 WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(UserRole::Volunteer)
        .bind(Utc::now())
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(UserError::NotFound { id })?;

        let volunteer = Volunteer::upsert_by_email(&mut *tx, profile).await?;

        tx.commit().await?;

        Ok((user, volunteer))
    }
}

fn map_unique_violation(err: sqlx::Error) -> UserError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => UserError::EmailTaken,
        _ => UserError::Database(err),
    }
}
