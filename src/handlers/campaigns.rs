use crate::{
    database::connection::DbPool,
    middleware::auth::AuthenticatedUser,
    models::campaign::{Campaign, CampaignError, CampaignView, CreateCampaign, UpdateCampaign},
    requests::campaign::{CreateCampaignRequest, UpdateCampaignRequest},
    utils::helpers::ApiResponse,
};
use actix_web::{HttpResponse, Result, web};
use chrono::Utc;
use tracing::{error, info, warn};
use uuid::Uuid;

fn views(campaigns: Vec<Campaign>) -> Vec<CampaignView> {
    campaigns.into_iter().map(CampaignView::from).collect()
}

pub async fn create(
    pool: web::Data<DbPool>,
    request: web::Json<CreateCampaignRequest>,
    user: AuthenticatedUser,
) -> Result<HttpResponse> {
    if !user.is_volunteer() {
        warn!("User {} tried to create a campaign without volunteer role", user.user_id);
        return Ok(HttpResponse::Forbidden().json(ApiResponse::<()>::error(
            "Only volunteers can create campaigns".to_string(),
        )));
    }

    info!("Creating campaign for user: {}", user.user_id);

    let request = request.into_inner();
    let create_campaign = CreateCampaign {
        created_by: user.user_id,
        title: request.title,
        description: request.description,
        target_amount: request.target_amount,
        start_date: request.start_date,
        end_date: request.end_date,
        images: request.images,
    };

    match Campaign::create(&pool, create_campaign, Utc::now().date_naive()).await {
        Ok(campaign) => {
            info!("Successfully created campaign with ID: {}", campaign.id);
            Ok(HttpResponse::Created().json(ApiResponse::success(CampaignView::from(campaign))))
        }
        Err(CampaignError::Database(e)) => {
            error!("Database error creating campaign: {}", e);
            Ok(
                HttpResponse::InternalServerError().json(ApiResponse::<()>::error(
                    "Failed to create campaign".to_string(),
                )),
            )
        }
        Err(e) => Ok(HttpResponse::BadRequest().json(ApiResponse::<()>::error(e.to_string()))),
    }
}

pub async fn all(pool: web::Data<DbPool>) -> Result<HttpResponse> {
    info!("Getting all campaigns");

    match Campaign::find_all(&pool).await {
        Ok(campaigns) => Ok(HttpResponse::Ok().json(ApiResponse::success(views(campaigns)))),
        Err(e) => {
            error!("Error getting all campaigns: {}", e);
            Ok(
                HttpResponse::InternalServerError().json(ApiResponse::<()>::error(
                    "Failed to retrieve campaigns".to_string(),
                )),
            )
        }
    }
}

pub async fn get_campaign(
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let campaign_id = path.into_inner();

    match Campaign::find_by_id(&pool, campaign_id).await {
        Ok(Some(campaign)) => {
            Ok(HttpResponse::Ok().json(ApiResponse::success(CampaignView::from(campaign))))
        }
        Ok(None) => Ok(HttpResponse::NotFound()
            .json(ApiResponse::<()>::error("Campaign not found".to_string()))),
        Err(e) => {
            error!("Error getting campaign {}: {}", campaign_id, e);
            Ok(
                HttpResponse::InternalServerError().json(ApiResponse::<()>::error(
                    "Failed to retrieve campaign".to_string(),
                )),
            )
        }
    }
}

pub async fn get_user_campaigns(
    pool: web::Data<DbPool>,
    user: AuthenticatedUser,
) -> Result<HttpResponse> {
    match Campaign::find_by_creator(&pool, user.user_id).await {
        Ok(campaigns) => Ok(HttpResponse::Ok().json(ApiResponse::success(views(campaigns)))),
        Err(e) => {
            error!("Error getting campaigns for user {}: {}", user.user_id, e);
            Ok(
                HttpResponse::InternalServerError().json(ApiResponse::<()>::error(
                    "Failed to retrieve campaigns".to_string(),
                )),
            )
        }
    }
}

/// Loads the campaign and checks that `user` is a volunteer who owns it.
/// `Err` carries the response to send instead.
async fn owned_campaign(
    pool: &DbPool,
    campaign_id: Uuid,
    user: &AuthenticatedUser,
) -> std::result::Result<Campaign, HttpResponse> {
    match Campaign::find_by_id(pool, campaign_id).await {
        Ok(Some(campaign)) if user.is_volunteer() && campaign.is_owned_by(user.user_id) => {
            Ok(campaign)
        }
        Ok(Some(_)) => Err(HttpResponse::Forbidden()
            .json(ApiResponse::<()>::error("Access denied".to_string()))),
        Ok(None) => Err(HttpResponse::NotFound()
            .json(ApiResponse::<()>::error("Campaign not found".to_string()))),
        Err(e) => {
            error!("Error checking campaign ownership: {}", e);
            Err(
                HttpResponse::InternalServerError().json(ApiResponse::<()>::error(
                    "Failed to verify campaign".to_string(),
                )),
            )
        }
    }
}

pub async fn update(
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
    request: web::Json<UpdateCampaignRequest>,
    user: AuthenticatedUser,
) -> Result<HttpResponse> {
    let campaign_id = path.into_inner();
    info!(
        "Updating campaign {} for user: {}",
        campaign_id, user.user_id
    );

    if let Err(response) = owned_campaign(&pool, campaign_id, &user).await {
        return Ok(response);
    }

    let request = request.into_inner();
    let update_data = UpdateCampaign {
        title: request.title,
        description: request.description,
        target_amount: request.target_amount,
        start_date: request.start_date,
        end_date: request.end_date,
        images: request.images,
        status: request.status,
    };

    match Campaign::update(&pool, campaign_id, update_data, Utc::now().date_naive()).await {
        Ok(campaign) => {
            info!("Successfully updated campaign: {}", campaign_id);
            Ok(HttpResponse::Ok().json(ApiResponse::success(CampaignView::from(campaign))))
        }
        Err(CampaignError::NotFound { .. }) => Ok(HttpResponse::NotFound()
            .json(ApiResponse::<()>::error("Campaign not found".to_string()))),
        Err(CampaignError::Database(e)) => {
            error!("Database error updating campaign: {}", e);
            Ok(
                HttpResponse::InternalServerError().json(ApiResponse::<()>::error(
                    "Failed to update campaign".to_string(),
                )),
            )
        }
        Err(e) => Ok(HttpResponse::BadRequest().json(ApiResponse::<()>::error(e.to_string()))),
    }
}

pub async fn delete(
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
    user: AuthenticatedUser,
) -> Result<HttpResponse> {
    let campaign_id = path.into_inner();
    info!(
        "Deleting campaign {} for user: {}",
        campaign_id, user.user_id
    );

    if let Err(response) = owned_campaign(&pool, campaign_id, &user).await {
        return Ok(response);
    }

    match Campaign::delete(&pool, campaign_id).await {
        Ok(()) => {
            info!("Successfully deleted campaign: {}", campaign_id);
            Ok(HttpResponse::Ok().json(ApiResponse::message(
                "Campaign deleted successfully".to_string(),
            )))
        }
        Err(CampaignError::NotFound { .. }) => Ok(HttpResponse::NotFound()
            .json(ApiResponse::<()>::error("Campaign not found".to_string()))),
        Err(e) => {
            error!("Error deleting campaign: {}", e);
            Ok(
                HttpResponse::InternalServerError().json(ApiResponse::<()>::error(
                    "Failed to delete campaign".to_string(),
                )),
            )
        }
    }
}
