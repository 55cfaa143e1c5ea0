use crate::{
    database::connection::DbPool,
    models::{
        auth::{CheckUserResponse, UserInfo},
        user::{User, UserError, UserRole},
        volunteer::VolunteerError,
    },
    requests::user::{CheckUserRequest, UpgradeToVolunteerRequest},
    services::{
        auth::AuthService,
        email::{Mailer, volunteer_welcome_template},
    },
    utils::{cookies::auth_cookie, helpers::ApiResponse},
};
use actix_web::{HttpResponse, Result, web};
use tracing::{error, info};

/// A hash that bcrypt cannot read counts as a mismatch but is logged.
fn password_matches(user: &User, password: &str) -> bool {
    user.verify_password(password).unwrap_or_else(|e| {
        error!("Password verification error for user {}: {}", user.id, e);
        false
    })
}

pub async fn check_user(
    pool: web::Data<DbPool>,
    request: web::Json<CheckUserRequest>,
) -> Result<HttpResponse> {
    let user = match User::find_by_email(&pool, request.email.trim()).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            return Ok(HttpResponse::Ok().json(ApiResponse::success(CheckUserResponse {
                exists: false,
                role: None,
            })));
        }
        Err(e) => {
            error!("Failed to look up user: {}", e);
            return Ok(
                HttpResponse::InternalServerError().json(ApiResponse::<()>::error(
                    "Failed to check user".to_string(),
                )),
            );
        }
    };

    if !password_matches(&user, &request.password) {
        return Ok(HttpResponse::Unauthorized()
            .json(ApiResponse::<()>::error("Invalid credentials".to_string())));
    }

    Ok(HttpResponse::Ok().json(ApiResponse::success(CheckUserResponse {
        exists: true,
        role: Some(user.role),
    })))
}

pub async fn upgrade_to_volunteer(
    pool: web::Data<DbPool>,
    auth: web::Data<AuthService>,
    mailer: web::Data<Mailer>,
    request: web::Json<UpgradeToVolunteerRequest>,
) -> Result<HttpResponse> {
    let user = match User::find_by_email(&pool, request.email.trim()).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            return Ok(HttpResponse::NotFound()
                .json(ApiResponse::<()>::error("User not found".to_string())));
        }
        Err(e) => {
            error!("Failed to look up user: {}", e);
            return Ok(
                HttpResponse::InternalServerError().json(ApiResponse::<()>::error(
                    "Failed to upgrade user".to_string(),
                )),
            );
        }
    };

    if !password_matches(&user, &request.password) {
        return Ok(HttpResponse::Unauthorized()
            .json(ApiResponse::<()>::error("Invalid credentials".to_string())));
    }

    let Some(profile) = request.profile(&user.name) else {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::<()>::error(
            "Additional fields are required for volunteers".to_string(),
        )));
    };

    let was_volunteer = user.role == UserRole::Volunteer;

    let (user, volunteer) = match User::promote_to_volunteer(&pool, user.id, profile).await {
        Ok(promoted) => promoted,
        Err(UserError::NotFound { id }) => {
            return Ok(HttpResponse::NotFound()
                .json(ApiResponse::<()>::error(format!("User {} not found", id))));
        }
        Err(UserError::Volunteer(VolunteerError::Validation(message))) => {
            return Ok(HttpResponse::BadRequest().json(ApiResponse::<()>::error(message)));
        }
        Err(e) => {
            error!("Failed to upgrade user: {}", e);
            return Ok(
                HttpResponse::InternalServerError().json(ApiResponse::<()>::error(
                    "Failed to upgrade user".to_string(),
                )),
            );
        }
    };

    info!("User {} upgraded to volunteer", user.id);

    if !was_volunteer {
        if let Some(base_url) = mailer.base_url() {
            let template = volunteer_welcome_template(base_url, &volunteer.name);
            mailer.send_in_background(volunteer.email, Some(volunteer.name), template);
        }
    }

    let token = auth.generate_token(&user).map_err(|e| {
        error!("Failed to generate token: {}", e);
        actix_web::error::ErrorInternalServerError("Failed to generate token")
    })?;

    Ok(HttpResponse::Ok()
        .cookie(auth_cookie(token, &auth))
        .json(ApiResponse::success_with_message(
            UserInfo::from(&user),
            "Successfully upgraded to volunteer".to_string(),
        )))
}
