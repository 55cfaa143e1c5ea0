use crate::database::connection::DbPool;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

pub const TITLE_MIN_CHARS: usize = 3;
pub const TITLE_MAX_CHARS: usize = 100;
pub const DESCRIPTION_MIN_CHARS: usize = 10;

/// Money columns are `NUMERIC(14, 2)`.
pub const AMOUNT_SCALE: u32 = 2;
/// 999999999999.99, the largest value a money column holds.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(276_447_231, 23_283, 0, false, 2);

#[derive(Error, Debug)]
pub enum CampaignError {
    #[error("Campaign with ID {id} not found")]
    NotFound { id: Uuid },
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("No fields provided for update")]
    NoUpdateFields,
    #[error("{0}")]
    Validation(String),
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Type, PartialEq, Eq)]
#[sqlx(type_name = "campaign_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum CampaignStatus {
    Active,
    Completed,
    Cancelled,
}

impl fmt::Display for CampaignStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            CampaignStatus::Active => "active",
            CampaignStatus::Completed => "completed",
            CampaignStatus::Cancelled => "cancelled",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Campaign {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub target_amount: Decimal,
    pub current_amount: Decimal,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub images: Vec<String>,
    pub created_by: Uuid,
    pub status: CampaignStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A campaign as returned by the API, with its derived funding progress.
#[derive(Debug, Clone, Serialize)]
pub struct CampaignView {
    #[serde(flatten)]
    pub campaign: Campaign,
    pub progress: Decimal,
}

impl From<Campaign> for CampaignView {
    fn from(campaign: Campaign) -> Self {
        let progress = campaign.progress();
        Self { campaign, progress }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCampaign {
    pub created_by: Uuid,
    pub title: String,
    pub description: String,
    pub target_amount: Decimal,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub images: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateCampaign {
    pub title: Option<String>,
    pub description: Option<String>,
    pub target_amount: Option<Decimal>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub images: Option<Vec<String>>,
    pub status: Option<CampaignStatus>,
}

/// Percentage of the target raised so far, rounded to two places.
pub fn progress(current: Decimal, target: Decimal) -> Decimal {
    if target <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    (current / target * Decimal::ONE_HUNDRED).round_dp(2).normalize()
}

/// Checks that `amount` can be stored without rounding or overflow.
pub fn check_amount(label: &str, amount: Decimal) -> Result<(), String> {
    if amount.normalize().scale() > AMOUNT_SCALE {
        return Err(format!(
            "{} cannot have more than {} decimal places",
            label, AMOUNT_SCALE
        ));
    }
    if amount > MAX_AMOUNT {
        return Err(format!("{} cannot exceed {}", label, MAX_AMOUNT));
    }
    Ok(())
}

/// New running total after crediting `amount`, or `None` when the amount is
/// not positive or the total would not fit a money column.
pub fn credit(current: Decimal, amount: Decimal) -> Option<Decimal> {
    if amount <= Decimal::ZERO {
        return None;
    }
    current
        .checked_add(amount)
        .filter(|total| *total <= MAX_AMOUNT)
}

fn validate_title(title: &str) -> Result<(), CampaignError> {
    let len = title.trim().chars().count();
    if len < TITLE_MIN_CHARS {
        return Err(CampaignError::Validation(format!(
            "Title must be at least {} characters long",
            TITLE_MIN_CHARS
        )));
    }
    if len > TITLE_MAX_CHARS {
        return Err(CampaignError::Validation(format!(
            "Title cannot exceed {} characters",
            TITLE_MAX_CHARS
        )));
    }
    Ok(())
}

fn validate_description(description: &str) -> Result<(), CampaignError> {
    if description.trim().chars().count() < DESCRIPTION_MIN_CHARS {
        return Err(CampaignError::Validation(format!(
            "Description must be at least {} characters long",
            DESCRIPTION_MIN_CHARS
        )));
    }
    Ok(())
}

fn validate_target(target_amount: Decimal) -> Result<(), CampaignError> {
    if target_amount < Decimal::ONE {
        return Err(CampaignError::Validation(
            "Target amount must be greater than 0".to_string(),
        ));
    }
    check_amount("Target amount", target_amount).map_err(CampaignError::Validation)
}

fn validate_start(start_date: NaiveDate, today: NaiveDate) -> Result<(), CampaignError> {
    if start_date < today {
        return Err(CampaignError::Validation(
            "Start date must be in the future".to_string(),
        ));
    }
    Ok(())
}

fn validate_schedule(start_date: NaiveDate, end_date: NaiveDate) -> Result<(), CampaignError> {
    if end_date <= start_date {
        return Err(CampaignError::Validation(
            "End date must be after start date".to_string(),
        ));
    }
    Ok(())
}

fn validate_images(images: &[String]) -> Result<(), CampaignError> {
    if images.iter().any(|url| url.trim().is_empty()) {
        return Err(CampaignError::Validation(
            "Image URLs cannot be empty".to_string(),
        ));
    }
    Ok(())
}

impl CreateCampaign {
    pub fn validate(&self, today: NaiveDate) -> Result<(), CampaignError> {
        validate_title(&self.title)?;
        validate_description(&self.description)?;
        validate_target(self.target_amount)?;
        validate_start(self.start_date, today)?;
        validate_schedule(self.start_date, self.end_date)?;
        validate_images(&self.images)
    }
}

impl UpdateCampaign {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.target_amount.is_none()
            && self.start_date.is_none()
            && self.end_date.is_none()
            && self.images.is_none()
            && self.status.is_none()
    }

    /// Overlays the update on `existing` and validates the result. The
    /// start-date rule only applies when the start date actually moves.
    pub fn merge(self, existing: &Campaign, today: NaiveDate) -> Result<Campaign, CampaignError> {
        if self.is_empty() {
            return Err(CampaignError::NoUpdateFields);
        }

        let mut merged = existing.clone();

        if let Some(title) = self.title {
            validate_title(&title)?;
            merged.title = title.trim().to_string();
        }
        if let Some(description) = self.description {
            validate_description(&description)?;
            merged.description = description.trim().to_string();
        }
        if let Some(target_amount) = self.target_amount {
            validate_target(target_amount)?;
            merged.target_amount = target_amount;
        }
        if let Some(start_date) = self.start_date {
            if start_date != existing.start_date {
                validate_start(start_date, today)?;
            }
            merged.start_date = start_date;
        }
        if let Some(end_date) = self.end_date {
            merged.end_date = end_date;
        }
        validate_schedule(merged.start_date, merged.end_date)?;

        if let Some(images) = self.images {
            validate_images(&images)?;
            merged.images = images;
        }
        if let Some(status) = self.status {
            merged.status = status;
        }

        Ok(merged)
    }
}

impl Campaign {
    pub fn progress(&self) -> Decimal {
        progress(self.current_amount, self.target_amount)
    }

    pub fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.created_by == user_id
    }

    pub fn accepts_donations(&self) -> bool {
        self.status == CampaignStatus::Active
    }

    pub async fn create(
        pool: &DbPool,
        campaign: CreateCampaign,
        today: NaiveDate,
    ) -> Result<Self, CampaignError> {
        campaign.validate(today)?;
        let now = Utc::now();

        let campaign = sqlx::query_as::<_, Campaign>(
            "INSERT INTO campaigns (id, title, description, target_amount, current_amount, start_date, end_date, images, created_by, status, created_at, updated_at)
             VALUES ($1, $2, $3, $4, 0, $5, $6, $7, $8, $9, $10, $11)
             RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(campaign.title.trim())
        .bind(campaign.description.trim())
        .bind(campaign.target_amount)
        .bind(campaign.start_date)
        .bind(campaign.end_date)
        .bind(&campaign.images)
        .bind(campaign.created_by)
        .bind(CampaignStatus::Active)
        .bind(now)
        .bind(now)
        .fetch_one(pool)
        .await?;

        Ok(campaign)
    }

    pub async fn find_by_id(pool: &DbPool, id: Uuid) -> Result<Option<Self>, CampaignError> {
        let campaign = sqlx::query_as::<_, Campaign>("SELECT * FROM campaigns WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?;

        Ok(campaign)
    }

    pub async fn find_all(pool: &DbPool) -> Result<Vec<Self>, CampaignError> {
        let campaigns =
            sqlx::query_as::<_, Campaign>("SELECT * FROM campaigns ORDER BY created_at DESC")
                .fetch_all(pool)
                .await?;

        Ok(campaigns)
    }

    pub async fn find_by_creator(
        pool: &DbPool,
        created_by: Uuid,
    ) -> Result<Vec<Self>, CampaignError> {
        let campaigns = sqlx::query_as::<_, Campaign>(
            "SELECT * FROM campaigns WHERE created_by = $1 ORDER BY created_at DESC",
        )
        .bind(created_by)
        .fetch_all(pool)
        .await?;

        Ok(campaigns)
    }

    /// `current_amount` is never written here; only recorded donations move it.
    pub async fn update(
        pool: &DbPool,
        id: Uuid,
        update_data: UpdateCampaign,
        today: NaiveDate,
    ) -> Result<Self, CampaignError> {
        if update_data.is_empty() {
            return Err(CampaignError::NoUpdateFields);
        }

        let existing = match Self::find_by_id(pool, id).await? {
            Some(campaign) => campaign,
            None => return Err(CampaignError::NotFound { id }),
        };

        let merged = update_data.merge(&existing, today)?;

        let updated = sqlx::query_as::<_, Campaign>(
            "UPDATE campaigns
             SET title = $2, description = $3, target_amount = $4, start_date = $5,
                 end_date = $6, images = $7, status = $8, updated_at = $9
             WHERE id = $1
             RETURNING *",
        )
        .bind(id)
        .bind(merged.title)
        .bind(merged.description)
        .bind(merged.target_amount)
        .bind(merged.start_date)
        .bind(merged.end_date)
        .bind(merged.images)
        .bind(merged.status)
        .bind(Utc::now())
        .fetch_optional(pool)
        .await?;

        updated.ok_or(CampaignError::NotFound { id })
    }

    pub async fn delete(pool: &DbPool, id: Uuid) -> Result<(), CampaignError> {
        let result = sqlx::query("DELETE FROM campaigns WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(CampaignError::NotFound { id });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn new_campaign() -> CreateCampaign {
        CreateCampaign {
            created_by: Uuid::new_v4(),
            title: "Clean water for Dharavi".to_string(),
            description: "Funding three community water filters.".to_string(),
            target_amount: Decimal::from(5000),
            start_date: date(2026, 11, 1),
            end_date: date(2026, 12, 31),
            images: vec!["https://img.example.org/filter.jpg".to_string()],
        }
    }

    fn stored(current: Decimal, target: Decimal) -> Campaign {
        let c = new_campaign();
        Campaign {
            id: Uuid::new_v4(),
            title: c.title,
            description: c.description,
            target_amount: target,
            current_amount: current,
            start_date: c.start_date,
            end_date: c.end_date,
            images: c.images,
            created_by: c.created_by,
            status: CampaignStatus::Active,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn validation_message(result: Result<(), CampaignError>) -> String {
        match result {
            Err(CampaignError::Validation(message)) => message,
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn valid_campaign_passes() {
        assert!(new_campaign().validate(date(2026, 10, 17)).is_ok());
    }

    #[test]
    fn start_date_today_is_allowed() {
        let mut c = new_campaign();
        c.start_date = date(2026, 10, 17);
        assert!(c.validate(date(2026, 10, 17)).is_ok());
    }

    #[test]
    fn start_date_in_past_is_rejected() {
        let message = validation_message(new_campaign().validate(date(2026, 11, 2)));
        assert_eq!(message, "Start date must be in the future");
    }

    #[test]
    fn end_date_must_follow_start_date() {
        let mut c = new_campaign();
        c.end_date = c.start_date;
        let message = validation_message(c.validate(date(2026, 10, 17)));
        assert_eq!(message, "End date must be after start date");
    }

    #[test]
    fn title_and_description_lengths_are_enforced() {
        let mut c = new_campaign();
        c.title = "  ab  ".to_string();
        assert!(validation_message(c.validate(date(2026, 10, 17))).starts_with("Title"));

        let mut c = new_campaign();
        c.title = "x".repeat(101);
        assert_eq!(
            validation_message(c.validate(date(2026, 10, 17))),
            "Title cannot exceed 100 characters"
        );

        let mut c = new_campaign();
        c.description = "too short".to_string();
        assert!(validation_message(c.validate(date(2026, 10, 17))).starts_with("Description"));
    }

    #[test]
    fn target_below_one_is_rejected() {
        let mut c = new_campaign();
        c.target_amount = Decimal::new(99, 2);
        assert_eq!(
            validation_message(c.validate(date(2026, 10, 17))),
            "Target amount must be greater than 0"
        );
    }

    #[test]
    fn progress_is_rounded_percentage() {
        assert_eq!(
            progress(Decimal::from(1), Decimal::from(3)),
            Decimal::new(3333, 2)
        );
        assert_eq!(
            progress(Decimal::from(7500), Decimal::from(5000)),
            Decimal::from(150)
        );
        assert_eq!(progress(Decimal::from(10), Decimal::ZERO), Decimal::ZERO);
    }

    #[test]
    fn view_carries_progress() {
        let view = CampaignView::from(stored(Decimal::from(1250), Decimal::from(5000)));
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["progress"], "25");
        assert_eq!(json["status"], "active");
        assert!(json.get("campaign").is_none());
    }

    #[test]
    fn credit_rejects_non_positive_amounts() {
        assert_eq!(credit(Decimal::from(10), Decimal::ZERO), None);
        assert_eq!(credit(Decimal::from(10), Decimal::from(-5)), None);
        assert_eq!(
            credit(Decimal::from(10), Decimal::new(2550, 2)),
            Some(Decimal::new(3550, 2))
        );
        assert_eq!(credit(Decimal::MAX, Decimal::ONE), None);
    }

    #[test]
    fn credit_stops_at_column_capacity() {
        assert_eq!(credit(MAX_AMOUNT - Decimal::ONE, Decimal::ONE), Some(MAX_AMOUNT));
        assert_eq!(credit(MAX_AMOUNT, Decimal::new(1, 2)), None);
        assert_eq!(MAX_AMOUNT.to_string(), "999999999999.99");
    }

    #[test]
    fn target_must_fit_money_column() {
        let mut c = new_campaign();
        c.target_amount = Decimal::new(100_005, 3);
        assert_eq!(
            validation_message(c.validate(date(2026, 10, 17))),
            "Target amount cannot have more than 2 decimal places"
        );

        c.target_amount = Decimal::from(1_000_000_000_000i64);
        assert!(validation_message(c.validate(date(2026, 10, 17))).starts_with("Target amount cannot exceed"));

        c.target_amount = Decimal::new(10_000, 3);
        assert!(c.validate(date(2026, 10, 17)).is_ok());
    }

    #[test]
    fn update_rejects_target_beyond_capacity() {
        let existing = stored(Decimal::ZERO, Decimal::from(100));
        let update = UpdateCampaign {
            target_amount: Some(Decimal::from(1_000_000_000_000i64)),
            ..Default::default()
        };

        let result = update.merge(&existing, date(2026, 10, 17));
        assert!(matches!(result, Err(CampaignError::Validation(_))));
    }

    #[test]
    fn empty_update_is_rejected() {
        let existing = stored(Decimal::ZERO, Decimal::from(100));
        let result = UpdateCampaign::default().merge(&existing, date(2026, 10, 17));
        assert!(matches!(result, Err(CampaignError::NoUpdateFields)));
    }

    #[test]
    fn update_keeps_past_start_date_when_unchanged() {
        let existing = stored(Decimal::ZERO, Decimal::from(100));
        let update = UpdateCampaign {
            start_date: Some(existing.start_date),
            title: Some("  New title  ".to_string()),
            ..Default::default()
        };

        let merged = update.merge(&existing, date(2027, 1, 15)).unwrap();
        assert_eq!(merged.title, "New title");
        assert_eq!(merged.start_date, existing.start_date);
    }

    #[test]
    fn update_checks_schedule_against_merged_dates() {
        let existing = stored(Decimal::ZERO, Decimal::from(100));
        let update = UpdateCampaign {
            end_date: Some(date(2026, 10, 30)),
            ..Default::default()
        };

        let result = update.merge(&existing, date(2026, 10, 17));
        assert!(matches!(result, Err(CampaignError::Validation(_))));
    }

    #[test]
    fn update_never_touches_current_amount() {
        let existing = stored(Decimal::from(80), Decimal::from(100));
        let update = UpdateCampaign {
            target_amount: Some(Decimal::from(50)),
            status: Some(CampaignStatus::Completed),
            ..Default::default()
        };

        let merged = update.merge(&existing, date(2026, 10, 17)).unwrap();
        assert_eq!(merged.current_amount, Decimal::from(80));
        assert_eq!(merged.status, CampaignStatus::Completed);
        assert_eq!(merged.progress(), Decimal::from(160));
        assert!(!merged.accepts_donations());
    }

    #[test]
    fn status_display_matches_wire_name() {
        for status in [
            CampaignStatus::Active,
            CampaignStatus::Completed,
            CampaignStatus::Cancelled,
        ] {
            let wire = serde_json::to_value(status).unwrap();
            assert_eq!(wire, status.to_string());
        }
    }
}
