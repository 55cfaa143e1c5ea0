use crate::{
    database::connection::DbPool,
    middleware::auth::AuthenticatedUser,
    models::{
        auth::UserInfo,
        user::{CreateUser, User, UserError},
        volunteer::VolunteerError,
    },
    requests::user::{LoginRequest, RegisterRequest},
    services::{
        auth::AuthService,
        email::{Mailer, volunteer_welcome_template},
    },
    utils::{
        cookies::{auth_cookie, removal_cookie},
        helpers::ApiResponse,
    },
};
use actix_web::{HttpResponse, Result, web};
use tracing::{error, info, warn};

pub async fn register(
    pool: web::Data<DbPool>,
    auth: web::Data<AuthService>,
    mailer: web::Data<Mailer>,
    request: web::Json<RegisterRequest>,
) -> Result<HttpResponse> {
    let registration = match request.validate() {
        Ok(registration) => registration,
        Err(e) => {
            return Ok(HttpResponse::BadRequest()
                .json(ApiResponse::<()>::error(e.message().to_string())));
        }
    };

    let create_user = CreateUser {
        name: registration.name,
        email: registration.email,
        password: registration.password,
        role: registration.role,
    };

    let created = match registration.volunteer {
        Some(profile) => User::create_volunteer(&pool, create_user, profile)
            .await
            .map(|(user, volunteer)| (user, Some(volunteer))),
        None => User::create(&pool, create_user).await.map(|user| (user, None)),
    };

    let user = match created {
        Ok((user, volunteer)) => {
            if let (Some(volunteer), Some(base_url)) = (volunteer, mailer.base_url()) {
                let template = volunteer_welcome_template(base_url, &volunteer.name);
                mailer.send_in_background(volunteer.email, Some(volunteer.name), template);
            }
            user
        }
        Err(UserError::EmailTaken) => {
            return Ok(HttpResponse::BadRequest()
                .json(ApiResponse::<()>::error("User already exists".to_string())));
        }
        Err(UserError::Volunteer(VolunteerError::Validation(message))) => {
            return Ok(HttpResponse::BadRequest().json(ApiResponse::<()>::error(message)));
        }
        Err(e) => {
            error!("Failed to create user: {}", e);
            return Ok(
                HttpResponse::InternalServerError().json(ApiResponse::<()>::error(
                    "Failed to create user".to_string(),
                )),
            );
        }
    };

    let token = auth.generate_token(&user).map_err(|e| {
        error!("Failed to generate token: {}", e);
        actix_web::error::ErrorInternalServerError("Failed to generate token")
    })?;

    info!("Registered {} account {}", user.role, user.id);

    Ok(HttpResponse::Created()
        .cookie(auth_cookie(token, &auth))
        .json(ApiResponse::success_with_message(
            UserInfo::from(&user),
            "User registered successfully".to_string(),
        )))
}

pub async fn login(
    pool: web::Data<DbPool>,
    auth: web::Data<AuthService>,
    request: web::Json<LoginRequest>,
) -> Result<HttpResponse> {
    let Some((email, password)) = request.credentials() else {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::<()>::error(
            "Email and password are required".to_string(),
        )));
    };

    let user = match auth.authenticate_user(&pool, &email, &password).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            warn!("Invalid credentials for user: {}", email);
            return Ok(HttpResponse::Unauthorized().json(ApiResponse::<()>::error(
                "Invalid email or password".to_string(),
            )));
        }
        Err(e) => {
            error!("Authentication error: {}", e);
            return Ok(
                HttpResponse::InternalServerError().json(ApiResponse::<()>::error(
                    "Authentication error".to_string(),
                )),
            );
        }
    };

    let token = auth.generate_token(&user).map_err(|e| {
        error!("Failed to generate token: {}", e);
        actix_web::error::ErrorInternalServerError("Failed to generate token")
    })?;

    Ok(HttpResponse::Ok()
        .cookie(auth_cookie(token, &auth))
        .json(ApiResponse::success(UserInfo::from(&user))))
}

pub async fn logout(
    auth: web::Data<AuthService>,
    user: AuthenticatedUser,
) -> Result<HttpResponse> {
    info!("Logging out user: {}", user.user_id);

    Ok(HttpResponse::Ok()
        .cookie(removal_cookie(&auth))
        .json(ApiResponse::message("Logged Out".to_string())))
}

pub async fn is_auth(pool: web::Data<DbPool>, user: AuthenticatedUser) -> Result<HttpResponse> {
    match User::find_by_id(&pool, user.user_id).await {
        Ok(Some(found)) => Ok(HttpResponse::Ok().json(ApiResponse::success(UserInfo::from(&found)))),
        Ok(None) => Ok(HttpResponse::Unauthorized()
            .json(ApiResponse::<()>::error("User not found".to_string()))),
        Err(e) => {
            error!("Auth check error: {}", e);
            Ok(
                HttpResponse::InternalServerError().json(ApiResponse::<()>::error(
                    "Server error during authentication check".to_string(),
                )),
            )
        }
    }
}
