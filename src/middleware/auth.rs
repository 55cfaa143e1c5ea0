use crate::{
    models::user::UserRole,
    services::auth::{AuthError, AuthService},
    utils::{cookies::AUTH_COOKIE, helpers::ApiResponse},
};
use actix_web::{
    FromRequest, HttpRequest, HttpResponse, dev::Payload, error::InternalError, http::header,
    web,
};
use futures_util::future::{Ready, ready};
use tracing::{error, warn};
use uuid::Uuid;

/// The caller identified by the `token` cookie or an `Authorization: Bearer`
/// header. Handlers that take this argument reject anonymous requests with 401.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
    pub email: String,
    pub user_role: UserRole,
}

impl AuthenticatedUser {
    pub fn is_volunteer(&self) -> bool {
        self.user_role == UserRole::Volunteer
    }
}

impl FromRequest for AuthenticatedUser {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(authenticate(req))
    }
}

fn authenticate(req: &HttpRequest) -> Result<AuthenticatedUser, actix_web::Error> {
    let Some(auth) = req.app_data::<web::Data<AuthService>>() else {
        error!("AuthService is not registered as app data");
        return Err(reject(
            HttpResponse::InternalServerError(),
            "Server error during authentication check",
        ));
    };

    let token = token_from_request(req)
        .ok_or_else(|| reject(HttpResponse::Unauthorized(), "Authentication required"))?;

    match auth.verify_token(&token) {
        Ok(claims) => Ok(AuthenticatedUser {
            user_id: claims.sub,
            email: claims.email,
            user_role: claims.role,
        }),
        Err(AuthError::Expired) => Err(reject(
            HttpResponse::Unauthorized(),
            "Token expired. Please login again.",
        )),
        Err(e) => {
            warn!("Rejected token: {}", e);
            Err(reject(
                HttpResponse::Unauthorized(),
                "Invalid authentication token",
            ))
        }
    }
}

fn token_from_request(req: &HttpRequest) -> Option<String> {
    if let Some(cookie) = req.cookie(AUTH_COOKIE) {
        if !cookie.value().is_empty() {
            return Some(cookie.value().to_string());
        }
    }

    req.headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
}

fn reject(mut builder: actix_web::HttpResponseBuilder, message: &str) -> actix_web::Error {
    let response = builder.json(ApiResponse::<()>::error(message.to_string()));
    InternalError::from_response(message.to_string(), response).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::settings::AuthSettings;
    use actix_web::{App, cookie::Cookie, http::StatusCode, test};

    fn auth_service() -> AuthService {
        AuthService::new(
            &AuthSettings {
                jwt_secret: "middleware-secret".to_string(),
                token_ttl_days: 7,
            },
            false,
        )
        .unwrap()
    }

    async fn whoami(user: AuthenticatedUser) -> HttpResponse {
        HttpResponse::Ok().json(ApiResponse::success(serde_json::json!({
            "id": user.user_id,
            "role": user.user_role,
        })))
    }

    #[actix_web::test]
    async fn missing_token_is_unauthorized() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(auth_service()))
                .route("/me", web::get().to(whoami)),
        )
        .await;

        let resp = test::call_service(&app, test::TestRequest::get().uri("/me").to_request()).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "Authentication required");
    }

    #[actix_web::test]
    async fn cookie_token_is_accepted() {
        let auth = auth_service();
        let user_id = Uuid::new_v4();
        let token = auth
            .generate_token_for(user_id, "v@example.org", UserRole::Volunteer)
            .unwrap();

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(auth))
                .route("/me", web::get().to(whoami)),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/me")
            .cookie(Cookie::new(AUTH_COOKIE, token))
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["data"]["id"], user_id.to_string());
        assert_eq!(body["data"]["role"], "volunteer");
    }

    #[actix_web::test]
    async fn bearer_token_is_accepted() {
        let auth = auth_service();
        let token = auth
            .generate_token_for(Uuid::new_v4(), "u@example.org", UserRole::User)
            .unwrap();

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(auth))
                .route("/me", web::get().to(whoami)),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/me")
            .insert_header((header::AUTHORIZATION, format!("Bearer {}", token)))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[actix_web::test]
    async fn tampered_token_is_rejected() {
        let auth = auth_service();
        let mut token = auth
            .generate_token_for(Uuid::new_v4(), "u@example.org", UserRole::User)
            .unwrap();
        token.push('x');

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(auth))
                .route("/me", web::get().to(whoami)),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/me")
            .cookie(Cookie::new(AUTH_COOKIE, token))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "Invalid authentication token");
    }

    #[actix_web::test]
    async fn expired_token_asks_for_login() {
        let expired = AuthService::new(
            &AuthSettings {
                jwt_secret: "middleware-secret".to_string(),
                token_ttl_days: -1,
            },
            false,
        )
        .unwrap()
        .generate_token_for(Uuid::new_v4(), "u@example.org", UserRole::User)
        .unwrap();

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(auth_service()))
                .route("/me", web::get().to(whoami)),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/me")
            .insert_header((header::AUTHORIZATION, format!("Bearer {}", expired)))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "Token expired. Please login again.");
    }
}
