use actix_web::{HttpResponse, error::InternalError, web};
use tracing::warn;

use crate::{handlers, utils::helpers::ApiResponse};

pub fn scoped_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/user")
            .route("/register", web::post().to(handlers::auth::register))
            .route("/login", web::post().to(handlers::auth::login))
            .route("/logout", web::get().to(handlers::auth::logout))
            .route("/is-auth", web::get().to(handlers::auth::is_auth))
            .route("/check-user", web::post().to(handlers::users::check_user))
            .route(
                "/upgrade-to-volunteer",
                web::post().to(handlers::users::upgrade_to_volunteer),
            ),
    )
    .service(
        web::scope("/campaign")
            .route("/create", web::post().to(handlers::campaigns::create))
            .route("/get-all", web::get().to(handlers::campaigns::all))
            .route("/mine", web::get().to(handlers::campaigns::get_user_campaigns))
            .route("/update/{id}", web::put().to(handlers::campaigns::update))
            .route("/delete/{id}", web::delete().to(handlers::campaigns::delete))
            .route("/{id}", web::get().to(handlers::campaigns::get_campaign)),
    )
    .service(
        web::scope("/donation")
            .route("/create", web::post().to(handlers::donations::create))
            .route("/get-all", web::get().to(handlers::donations::all))
            .route(
                "/campaign/{campaign_id}",
                web::get().to(handlers::donations::get_campaign_donations),
            )
            .route(
                "/status/{campaign_id}",
                web::get().to(handlers::donations::status),
            )
            .route("/{id}", web::get().to(handlers::donations::get_donation)),
    )
    .service(
        web::scope("/volunteer")
            .route("/create", web::post().to(handlers::volunteers::create))
            .route("/get-all", web::get().to(handlers::volunteers::all))
            .route("/stats", web::get().to(handlers::volunteers::stats))
            .route("/update/{id}", web::put().to(handlers::volunteers::update))
            .route("/delete/{id}", web::delete().to(handlers::volunteers::delete))
            .route("/{id}", web::get().to(handlers::volunteers::get_volunteer)),
    );
}

pub async fn health() -> HttpResponse {
    HttpResponse::Ok().body("Backend is running")
}

/// Malformed bodies get the same JSON envelope as every other error.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        warn!("Rejected request body: {}", err);
        let response =
            HttpResponse::BadRequest().json(ApiResponse::<()>::error(err.to_string()));
        InternalError::from_response(err, response).into()
    })
}
