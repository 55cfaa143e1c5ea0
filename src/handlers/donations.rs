use crate::{
    database::connection::DbPool,
    middleware::auth::AuthenticatedUser,
    models::{
        campaign::CampaignView,
        donation::{CreateDonation, Donation, DonationError},
    },
    requests::donation::DonationRequest,
    services::email::{Mailer, donation_receipt_template},
    utils::helpers::ApiResponse,
};
use actix_web::{HttpResponse, Result, web};
use serde::Serialize;
use tracing::{error, info, warn};
use uuid::Uuid;

#[derive(Debug, Serialize)]
pub struct RecordedDonation {
    pub donation: Donation,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub campaign: Option<CampaignView>,
}

pub async fn create(
    pool: web::Data<DbPool>,
    mailer: web::Data<Mailer>,
    request: web::Json<DonationRequest>,
    user: AuthenticatedUser,
) -> Result<HttpResponse> {
    info!("Recording donation from user: {}", user.user_id);

    let request = request.into_inner();
    let create_donation = CreateDonation {
        amount: request.amount,
        campaign_id: request.campaign_id,
        payment_method: request.payment_method,
        transaction_id: request.transaction_id,
        donor_name: request.donor_name,
        donor_email: request.donor_email,
        donated_by: Some(user.user_id),
    };

    match Donation::record(&pool, create_donation).await {
        Ok((donation, campaign)) => {
            info!(
                "Recorded donation {} of {} (campaign: {:?})",
                donation.id, donation.amount, donation.campaign_id
            );

            if let Some(base_url) = mailer.base_url() {
                let template = donation_receipt_template(
                    base_url,
                    &donation.donor_name,
                    donation.amount,
                    campaign.as_ref().map(|c| (c.title.as_str(), c.id)),
                    &donation.transaction_id,
                );
                mailer.send_in_background(
                    donation.donor_email.clone(),
                    Some(donation.donor_name.clone()),
                    template,
                );
            }

            Ok(HttpResponse::Created().json(ApiResponse::success(RecordedDonation {
                donation,
                campaign: campaign.map(CampaignView::from),
            })))
        }
        Err(DonationError::CampaignNotFound { id }) => {
            warn!("Donation for unknown campaign {}", id);
            Ok(HttpResponse::NotFound()
                .json(ApiResponse::<()>::error("Campaign not found".to_string())))
        }
        Err(e @ DonationError::CampaignClosed { .. })
        | Err(e @ DonationError::DuplicateTransaction { .. }) => {
            Ok(HttpResponse::Conflict().json(ApiResponse::<()>::error(e.to_string())))
        }
        Err(DonationError::Database(e)) => {
            error!("Database error recording donation: {}", e);
            Ok(
                HttpResponse::InternalServerError().json(ApiResponse::<()>::error(
                    "Failed to record donation".to_string(),
                )),
            )
        }
        Err(e) => Ok(HttpResponse::BadRequest().json(ApiResponse::<()>::error(e.to_string()))),
    }
}

pub async fn all(pool: web::Data<DbPool>, _user: AuthenticatedUser) -> Result<HttpResponse> {
    info!("Getting all donations");

    match Donation::find_all(&pool).await {
        Ok(donations) => Ok(HttpResponse::Ok().json(ApiResponse::success(donations))),
        Err(e) => {
            error!("Error getting all donations: {}", e);
            Ok(
                HttpResponse::InternalServerError().json(ApiResponse::<()>::error(
                    "Failed to retrieve donations".to_string(),
                )),
            )
        }
    }
}

pub async fn get_donation(
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
    _user: AuthenticatedUser,
) -> Result<HttpResponse> {
    let donation_id = path.into_inner();

    match Donation::find_by_id(&pool, donation_id).await {
        Ok(Some(donation)) => Ok(HttpResponse::Ok().json(ApiResponse::success(donation))),
        Ok(None) => Ok(HttpResponse::NotFound()
            .json(ApiResponse::<()>::error("Donation not found".to_string()))),
        Err(e) => {
            error!("Error getting donation {}: {}", donation_id, e);
            Ok(
                HttpResponse::InternalServerError().json(ApiResponse::<()>::error(
                    "Failed to retrieve donation".to_string(),
                )),
            )
        }
    }
}

pub async fn get_campaign_donations(
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
    _user: AuthenticatedUser,
) -> Result<HttpResponse> {
    let campaign_id = path.into_inner();

    match Donation::find_by_campaign(&pool, campaign_id).await {
        Ok(donations) => Ok(HttpResponse::Ok().json(ApiResponse::success(donations))),
        Err(e) => {
            error!("Error getting donations for campaign {}: {}", campaign_id, e);
            Ok(
                HttpResponse::InternalServerError().json(ApiResponse::<()>::error(
                    "Failed to retrieve donations".to_string(),
                )),
            )
        }
    }
}

pub async fn status(
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
    _user: AuthenticatedUser,
) -> Result<HttpResponse> {
    let campaign_id = path.into_inner();

    match Donation::summary_for_campaign(&pool, campaign_id).await {
        Ok(summary) => Ok(HttpResponse::Ok().json(ApiResponse::success(summary))),
        Err(e) => {
            error!("Error summarising donations for {}: {}", campaign_id, e);
            Ok(
                HttpResponse::InternalServerError().json(ApiResponse::<()>::error(
                    "Failed to retrieve donation status".to_string(),
                )),
            )
        }
    }
}
