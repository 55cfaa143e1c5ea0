use crate::database::connection::DbPool;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgExecutor};
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum VolunteerError {
    #[error("Volunteer with ID {id} not found")]
    NotFound { id: Uuid },
    #[error("Email {email} is already registered")]
    EmailTaken { email: String },
    #[error("{0}")]
    Validation(String),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Volunteer {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateVolunteer {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip: String,
}

impl CreateVolunteer {
    pub fn validate(&self) -> Result<(), VolunteerError> {
        let fields = [
            &self.name,
            &self.email,
            &self.phone,
            &self.address,
            &self.city,
            &self.state,
            &self.zip,
        ];
        if fields.iter().any(|value| value.trim().is_empty()) {
            return Err(VolunteerError::Validation(
                "All fields are required".to_string(),
            ));
        }
        if !self.email.contains('@') {
            return Err(VolunteerError::Validation(
                "A valid email is required".to_string(),
            ));
        }
        Ok(())
    }
}

/// Blank values are treated as absent and keep the stored value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateVolunteer {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
}

impl UpdateVolunteer {
    /// The new email, if it is given and differs from `current`.
    pub fn changed_email(&self, current: &str) -> Option<&str> {
        self.email
            .as_deref()
            .map(str::trim)
            .filter(|email| !email.is_empty() && *email != current)
    }

    pub fn merge(self, existing: &Volunteer) -> CreateVolunteer {
        CreateVolunteer {
            name: keep_or_replace(self.name, &existing.name),
            email: keep_or_replace(self.email, &existing.email),
            phone: keep_or_replace(self.phone, &existing.phone),
            address: keep_or_replace(self.address, &existing.address),
            city: keep_or_replace(self.city, &existing.city),
            state: keep_or_replace(self.state, &existing.state),
            zip: keep_or_replace(self.zip, &existing.zip),
        }
    }
}

fn keep_or_replace(candidate: Option<String>, current: &str) -> String {
    match candidate {
        Some(value) if !value.trim().is_empty() => value.trim().to_string(),
        _ => current.to_string(),
    }
}

#[derive(Debug, Clone, Serialize, FromRow, PartialEq, Eq)]
pub struct GroupCount {
    pub key: String,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct VolunteerStats {
    pub total_volunteers: i64,
    pub volunteers_by_state: Vec<GroupCount>,
    pub top_cities: Vec<GroupCount>,
}

impl Volunteer {
    pub async fn create(pool: &DbPool, volunteer: CreateVolunteer) -> Result<Self, VolunteerError> {
        volunteer.validate()?;

        if Self::find_by_email(pool, &volunteer.email).await?.is_some() {
            return Err(VolunteerError::EmailTaken {
                email: volunteer.email,
            });
        }

        let now = Utc::now();
        let email = volunteer.email.clone();

        let volunteer = sqlx::query_as::<_, Volunteer>(
            "INSERT INTO volunteers (id, name, email, phone, address, city, state, zip, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
             RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(volunteer.name)
        .bind(volunteer.email)
        .bind(volunteer.phone)
        .bind(volunteer.address)
        .bind(volunteer.city)
        .bind(volunteer.state)
        .bind(volunteer.zip)
        .bind(now)
        .bind(now)
        .fetch_one(pool)
        .await
        .map_err(|e| map_unique_violation(e, email))?;

        Ok(volunteer)
    }

    /// Inserts the profile, or overwrites the one already stored for that email.
    pub async fn upsert_by_email<'e, E>(
        executor: E,
        volunteer: CreateVolunteer,
    ) -> Result<Self, VolunteerError>
    where
        E: PgExecutor<'e>,
    {
        volunteer.validate()?;
        let now = Utc::now();

        let volunteer = sqlx::query_as::<_, Volunteer>(
            "INSERT INTO volunteers (id, name, email, phone, address, city, state, zip, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $9)
             ON CONFLICT (email) DO UPDATE
             SET name = EXCLUDED.name,
                 phone = EXCLUDED.phone,
                 address = EXCLUDED.address,
                 city = EXCLUDED.city,
                 state = EXCLUDED.state,
                 zip = EXCLUDED.zip,
                 updated_at = EXCLUDED.updated_at
             RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(volunteer.name)
        .bind(volunteer.email)
        .bind(volunteer.phone)
        .bind(volunteer.address)
        .bind(volunteer.city)
        .bind(volunteer.state)
        .bind(volunteer.zip)
        .bind(now)
        .fetch_one(executor)
        .await?;

        Ok(volunteer)
    }

    pub async fn find_by_id(pool: &DbPool, id: Uuid) -> Result<Option<Self>, VolunteerError> {
        let volunteer = sqlx::query_as::<_, Volunteer>("SELECT * FROM volunteers WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?;

        Ok(volunteer)
    }

    pub async fn find_by_email(
        pool: &DbPool,
        email: &str,
    ) -> Result<Option<Self>, VolunteerError> {
        let volunteer =
            sqlx::query_as::<_, Volunteer>("SELECT * FROM volunteers WHERE email = $1")
                .bind(email)
                .fetch_optional(pool)
                .await?;

        Ok(volunteer)
    }

    pub async fn find_all(pool: &DbPool) -> Result<Vec<Self>, VolunteerError> {
        let volunteers =
            sqlx::query_as::<_, Volunteer>("SELECT * FROM volunteers ORDER BY created_at DESC")
                .fetch_all(pool)
                .await?;

        Ok(volunteers)
    }

    pub async fn update(
        pool: &DbPool,
        id: Uuid,
        update_data: UpdateVolunteer,
    ) -> Result<Self, VolunteerError> {
        let existing = match Self::find_by_id(pool, id).await? {
            Some(volunteer) => volunteer,
            None => return Err(VolunteerError::NotFound { id }),
        };

        if let Some(email) = update_data.changed_email(&existing.email) {
            if Self::find_by_email(pool, email).await?.is_some() {
                return Err(VolunteerError::EmailTaken {
                    email: email.to_string(),
                });
            }
        }

        let merged = update_data.merge(&existing);
        merged.validate()?;
        let email = merged.email.clone();

        let updated = sqlx::query_as::<_, Volunteer>(
            "UPDATE volunteers
             SET name = $2, email = $3, phone = $4, address = $5, city = $6, state = $7, zip = $8, updated_at = $9
             WHERE id = $1
             RETURNING *",
        )
        .bind(id)
        .bind(merged.name)
        .bind(merged.email)
        .bind(merged.phone)
        .bind(merged.address)
        .bind(merged.city)
        .bind(merged.state)
        .bind(merged.zip)
        .bind(Utc::now())
        .fetch_optional(pool)
        .await
        .map_err(|e| map_unique_violation(e, email))?;

        updated.ok_or(VolunteerError::NotFound { id })
    }

    pub async fn delete(pool: &DbPool, id: Uuid) -> Result<(), VolunteerError> {
        let result = sqlx::query("DELETE FROM volunteers WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(VolunteerError::NotFound { id });
        }

        Ok(())
    }

    pub async fn stats(pool: &DbPool) -> Result<VolunteerStats, VolunteerError> {
        let total_volunteers: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM volunteers")
            .fetch_one(pool)
            .await?;

        let volunteers_by_state = sqlx::query_as::<_, GroupCount>(
            "SELECT state AS key, COUNT(*) AS count
             FROM volunteers
             GROUP BY state
             ORDER BY count DESC, key ASC",
        )
        .fetch_all(pool)
        .await?;

        let top_cities = sqlx::query_as::<_, GroupCount>(
            "SELECT city AS key, COUNT(*) AS count
             FROM volunteers
             GROUP BY city
             ORDER BY count DESC, key ASC
             LIMIT 10",
        )
        .fetch_all(pool)
        .await?;

        Ok(VolunteerStats {
            total_volunteers,
            volunteers_by_state,
            top_cities,
        })
    }
}

fn map_unique_violation(err: sqlx::Error, email: String) -> VolunteerError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            VolunteerError::EmailTaken { email }
        }
        _ => VolunteerError::Database(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> CreateVolunteer {
        CreateVolunteer {
            name: "Ravi Kumar".to_string(),
            email: "ravi@example.org".to_string(),
            phone: "555-0100".to_string(),
            address: "12 MG Road".to_string(),
            city: "Pune".to_string(),
            state: "MH".to_string(),
            zip: "411001".to_string(),
        }
    }

    fn stored() -> Volunteer {
        let p = profile();
        Volunteer {
            id: Uuid::new_v4(),
            name: p.name,
            email: p.email,
            phone: p.phone,
            address: p.address,
            city: p.city,
            state: p.state,
            zip: p.zip,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn complete_profile_validates() {
        assert!(profile().validate().is_ok());
    }

    #[test]
    fn blank_field_is_rejected() {
        let mut p = profile();
        p.zip = "   ".to_string();
        assert!(matches!(p.validate(), Err(VolunteerError::Validation(_))));
    }

    #[test]
    fn merge_keeps_blank_and_missing_fields() {
        let update = UpdateVolunteer {
            name: Some("".to_string()),
            city: Some("Mumbai".to_string()),
            ..Default::default()
        };

        let merged = update.merge(&stored());
        assert_eq!(merged.name, "Ravi Kumar");
        assert_eq!(merged.city, "Mumbai");
        assert_eq!(merged.state, "MH");
    }

    #[test]
    fn changed_email_ignores_same_and_blank() {
        let same = UpdateVolunteer {
            email: Some("ravi@example.org".to_string()),
            ..Default::default()
        };
        assert_eq!(same.changed_email("ravi@example.org"), None);

        let blank = UpdateVolunteer {
            email: Some(" ".to_string()),
            ..Default::default()
        };
        assert_eq!(blank.changed_email("ravi@example.org"), None);

        let new = UpdateVolunteer {
            email: Some("ravi.k@example.org".to_string()),
            ..Default::default()
        };
        assert_eq!(new.changed_email("ravi@example.org"), Some("ravi.k@example.org"));
    }
}
