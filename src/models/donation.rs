use crate::database::connection::DbPool;
use crate::models::campaign::{Campaign, CampaignStatus, MAX_AMOUNT, check_amount, credit};
use chrono::{DateTime, Utc};
use rand::{Rng, distributions::Alphanumeric};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum DonationError {
    #[error("Donation with ID {id} not found")]
    NotFound { id: Uuid },
    #[error("Campaign not found")]
    CampaignNotFound { id: Uuid },
    #[error("Campaign is {status} and no longer accepts donations")]
    CampaignClosed { id: Uuid, status: CampaignStatus },
    #[error("Transaction {transaction_id} has already been recorded")]
    DuplicateTransaction { transaction_id: String },
    #[error("{0}")]
    Validation(String),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Type, PartialEq, Eq)]
#[sqlx(type_name = "payment_method", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Card,
    Paypal,
    Bank,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Donation {
    pub id: Uuid,
    pub amount: Decimal,
    pub campaign_id: Option<Uuid>,
    pub payment_method: PaymentMethod,
    pub transaction_id: String,
    pub donor_name: String,
    pub donor_email: String,
    pub donated_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// A donation joined with the title of the campaign it funds.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct DonationRecord {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub donation: Donation,
    pub campaign_title: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDonation {
    pub amount: Decimal,
    pub campaign_id: Option<Uuid>,
    pub payment_method: PaymentMethod,
    pub transaction_id: Option<String>,
    pub donor_name: String,
    pub donor_email: String,
    pub donated_by: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, FromRow, PartialEq)]
pub struct DonationSummary {
    pub total_donations: Decimal,
    pub total_donations_count: i64,
}

impl CreateDonation {
    pub fn validate(&self) -> Result<(), DonationError> {
        if self.amount <= Decimal::ZERO {
            return Err(DonationError::Validation(
                "Donation amount must be greater than 0".to_string(),
            ));
        }
        check_amount("Donation amount", self.amount).map_err(DonationError::Validation)?;
        if self.donor_name.trim().is_empty() {
            return Err(DonationError::Validation(
                "Donor name is required".to_string(),
            ));
        }
        let email = self.donor_email.trim();
        if email.is_empty() || !email.contains('@') {
            return Err(DonationError::Validation(
                "A valid donor email is required".to_string(),
            ));
        }
        if let Some(transaction_id) = &self.transaction_id {
            if transaction_id.trim().is_empty() {
                return Err(DonationError::Validation(
                    "Transaction ID cannot be blank".to_string(),
                ));
            }
        }
        Ok(())
    }

    fn resolved_transaction_id(&self) -> String {
        self.transaction_id
            .as_deref()
            .map(|id| id.trim().to_string())
            .unwrap_or_else(generate_transaction_id)
    }
}

/// `TXN-<unix millis>-<8 random alphanumerics>`.
pub fn generate_transaction_id() -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(8)
        .map(char::from)
        .collect();
    format!("TXN-{}-{}", Utc::now().timestamp_millis(), suffix.to_uppercase())
}

const RECORD_SELECT: &str = "SELECT d.*, c.title AS campaign_title
     FROM donations d
     LEFT JOIN campaigns c ON c.id = d.campaign_id";

impl Donation {
    /// Stores the donation and, for a campaign donation, credits the campaign
    /// in the same transaction. The campaign row stays locked until commit so
    /// concurrent donations serialize on it.
    pub async fn record(
        pool: &DbPool,
        donation: CreateDonation,
    ) -> Result<(Self, Option<Campaign>), DonationError> {
        donation.validate()?;
        let transaction_id = donation.resolved_transaction_id();

        let mut tx = pool.begin().await?;

        let campaign = match donation.campaign_id {
            Some(id) => {
                let campaign = sqlx::query_as::<_, Campaign>(
                    "SELECT * FROM campaigns WHERE id = $1 FOR UPDATE",
                )
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or(DonationError::CampaignNotFound { id })?;

                if !campaign.accepts_donations() {
                    return Err(DonationError::CampaignClosed {
                        id,
                        status: campaign.status,
                    });
                }
                Some(campaign)
            }
            None => None,
        };

        let recorded = sqlx::query_as::<_, Donation>(
            "INSERT INTO donations (id, amount, campaign_id, payment_method, transaction_id, donor_name, donor_email, donated_by, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(donation.amount)
        .bind(donation.campaign_id)
        .bind(donation.payment_method)
        .bind(&transaction_id)
        .bind(donation.donor_name.trim())
        .bind(donation.donor_email.trim())
        .bind(donation.donated_by)
        .bind(Utc::now())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                DonationError::DuplicateTransaction {
                    transaction_id: transaction_id.clone(),
                }
            }
            _ => DonationError::Database(e),
        })?;

        let credited = match campaign {
            Some(campaign) => {
                let new_total = credit(campaign.current_amount, recorded.amount).ok_or_else(|| {
                    DonationError::Validation(format!(
                        "Campaign total cannot exceed {}",
                        MAX_AMOUNT
                    ))
                })?;

                let updated = sqlx::query_as::<_, Campaign>(
                    "UPDATE campaigns SET current_amount = $2, updated_at = $3 WHERE id = $1 RETURNING *",
                )
                .bind(campaign.id)
                .bind(new_total)
                .bind(Utc::now())
                .fetch_one(&mut *tx)
                .await?;
                Some(updated)
            }
            None => None,
        };

        tx.commit().await?;

        Ok((recorded, credited))
    }

    pub async fn find_by_id(
        pool: &DbPool,
        id: Uuid,
    ) -> Result<Option<DonationRecord>, DonationError> {
        let donation =
            sqlx::query_as::<_, DonationRecord>(&format!("{} WHERE d.id = $1", RECORD_SELECT))
                .bind(id)
                .fetch_optional(pool)
                .await?;

        Ok(donation)
    }

    pub async fn find_all(pool: &DbPool) -> Result<Vec<DonationRecord>, DonationError> {
        let donations = sqlx::query_as::<_, DonationRecord>(&format!(
            "{} ORDER BY d.created_at DESC",
            RECORD_SELECT
        ))
        .fetch_all(pool)
        .await?;

        Ok(donations)
    }

    pub async fn find_by_campaign(
        pool: &DbPool,
        campaign_id: Uuid,
    ) -> Result<Vec<DonationRecord>, DonationError> {
        let donations = sqlx::query_as::<_, DonationRecord>(&format!(
            "{} WHERE d.campaign_id = $1 ORDER BY d.created_at DESC",
            RECORD_SELECT
        ))
        .bind(campaign_id)
        .fetch_all(pool)
        .await?;

        Ok(donations)
    }

    pub async fn summary_for_campaign(
        pool: &DbPool,
        campaign_id: Uuid,
    ) -> Result<DonationSummary, DonationError> {
        let summary = sqlx::query_as::<_, DonationSummary>(
            "SELECT COALESCE(SUM(amount), 0) AS total_donations, COUNT(*) AS total_donations_count
             FROM donations
             WHERE campaign_id = $1",
        )
        .bind(campaign_id)
        .fetch_one(pool)
        .await?;

        Ok(summary)
    }
}
