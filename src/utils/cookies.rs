use crate::services::auth::AuthService;
use actix_web::cookie::{Cookie, SameSite, time::Duration};

pub const AUTH_COOKIE: &str = "token";

pub fn auth_cookie(token: String, auth: &AuthService) -> Cookie<'static> {
    let secure = auth.secure_cookies();
    Cookie::build(AUTH_COOKIE, token)
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(same_site(secure))
        .max_age(Duration::seconds(auth.token_ttl().num_seconds()))
        .finish()
}

pub fn removal_cookie(auth: &AuthService) -> Cookie<'static> {
    let secure = auth.secure_cookies();
    let mut cookie = Cookie::build(AUTH_COOKIE, "")
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(same_site(secure))
        .finish();
    cookie.make_removal();
    cookie
}

fn same_site(secure: bool) -> SameSite {
    if secure { SameSite::None } else { SameSite::Strict }
}
