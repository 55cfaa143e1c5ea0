use crate::{
    database::connection::DbPool,
    middleware::auth::AuthenticatedUser,
    models::volunteer::{Volunteer, VolunteerError},
    requests::volunteer::VolunteerProfileRequest,
    services::email::{Mailer, volunteer_welcome_template},
    utils::helpers::ApiResponse,
};
use actix_web::{HttpResponse, Result, web};
use tracing::{error, info};
use uuid::Uuid;

pub async fn create(
    pool: web::Data<DbPool>,
    mailer: web::Data<Mailer>,
    request: web::Json<VolunteerProfileRequest>,
    user: AuthenticatedUser,
) -> Result<HttpResponse> {
    let Some(profile) = request.complete() else {
        return Ok(HttpResponse::BadRequest()
            .json(ApiResponse::<()>::error("All fields are required".to_string())));
    };

    info!("User {} registering volunteer {}", user.user_id, profile.email);

    match Volunteer::create(&pool, profile).await {
        Ok(volunteer) => {
            if let Some(base_url) = mailer.base_url() {
                let template = volunteer_welcome_template(base_url, &volunteer.name);
                mailer.send_in_background(
                    volunteer.email.clone(),
                    Some(volunteer.name.clone()),
                    template,
                );
            }
            Ok(HttpResponse::Created().json(ApiResponse::success(volunteer)))
        }
        Err(VolunteerError::EmailTaken { .. }) => Ok(HttpResponse::Conflict()
            .json(ApiResponse::<()>::error("Email already registered".to_string()))),
        Err(VolunteerError::Database(e)) => {
            error!("Database error creating volunteer: {}", e);
            Ok(
                HttpResponse::InternalServerError().json(ApiResponse::<()>::error(
                    "Failed to create volunteer".to_string(),
                )),
            )
        }
        Err(e) => Ok(HttpResponse::BadRequest().json(ApiResponse::<()>::error(e.to_string()))),
    }
}

pub async fn all(pool: web::Data<DbPool>, _user: AuthenticatedUser) -> Result<HttpResponse> {
    match Volunteer::find_all(&pool).await {
        Ok(volunteers) => Ok(HttpResponse::Ok().json(ApiResponse::success(volunteers))),
        Err(e) => {
            error!("Error getting volunteers: {}", e);
            Ok(
                HttpResponse::InternalServerError().json(ApiResponse::<()>::error(
                    "Failed to retrieve volunteers".to_string(),
                )),
            )
        }
    }
}

pub async fn get_volunteer(
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
    _user: AuthenticatedUser,
) -> Result<HttpResponse> {
    let volunteer_id = path.into_inner();

    match Volunteer::find_by_id(&pool, volunteer_id).await {
        Ok(Some(volunteer)) => Ok(HttpResponse::Ok().json(ApiResponse::success(volunteer))),
        Ok(None) => Ok(HttpResponse::NotFound()
            .json(ApiResponse::<()>::error("Volunteer not found".to_string()))),
        Err(e) => {
            error!("Error getting volunteer {}: {}", volunteer_id, e);
            Ok(
                HttpResponse::InternalServerError().json(ApiResponse::<()>::error(
                    "Failed to retrieve volunteer".to_string(),
                )),
            )
        }
    }
}

pub async fn update(
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
    request: web::Json<VolunteerProfileRequest>,
    user: AuthenticatedUser,
) -> Result<HttpResponse> {
    let volunteer_id = path.into_inner();
    info!("Updating volunteer {} for user: {}", volunteer_id, user.user_id);

    match Volunteer::update(&pool, volunteer_id, request.into_inner().into_update()).await {
        Ok(volunteer) => Ok(HttpResponse::Ok().json(ApiResponse::success(volunteer))),
        Err(VolunteerError::NotFound { .. }) => Ok(HttpResponse::NotFound()
            .json(ApiResponse::<()>::error("Volunteer not found".to_string()))),
        Err(VolunteerError::EmailTaken { .. }) => Ok(HttpResponse::Conflict()
            .json(ApiResponse::<()>::error("Email already in use".to_string()))),
        Err(VolunteerError::Database(e)) => {
            error!("Database error updating volunteer: {}", e);
            Ok(
                HttpResponse::InternalServerError().json(ApiResponse::<()>::error(
                    "Failed to update volunteer".to_string(),
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
    let volunteer_id = path.into_inner();
    info!("Deleting volunteer {} for user: {}", volunteer_id, user.user_id);

    match Volunteer::delete(&pool, volunteer_id).await {
        Ok(()) => Ok(HttpResponse::Ok().json(ApiResponse::message(
            "Volunteer deleted successfully".to_string(),
        ))),
        Err(VolunteerError::NotFound { .. }) => Ok(HttpResponse::NotFound()
            .json(ApiResponse::<()>::error("Volunteer not found".to_string()))),
        Err(e) => {
            error!("Error deleting volunteer: {}", e);
            Ok(
                HttpResponse::InternalServerError().json(ApiResponse::<()>::error(
                    "Failed to delete volunteer".to_string(),
                )),
            )
        }
    }
}

pub async fn stats(pool: web::Data<DbPool>, _user: AuthenticatedUser) -> Result<HttpResponse> {
    match Volunteer::stats(&pool).await {
        Ok(stats) => Ok(HttpResponse::Ok().json(ApiResponse::success(stats))),
        Err(e) => {
            error!("Error computing volunteer stats: {}", e);
            Ok(
                HttpResponse::InternalServerError().json(ApiResponse::<()>::error(
                    "Failed to retrieve volunteer statistics".to_string(),
                )),
            )
        }
    }
}
