//! Fixtures shared by the database-backed test suites.

#![allow(dead_code, unused_macros)]

use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use sevakriti::{
    config::settings::AuthSettings,
    models::{
        campaign::{Campaign, CreateCampaign},
        donation::{CreateDonation, PaymentMethod},
        user::{CreateUser, User, UserRole},
    },
    services::auth::AuthService,
};
use sqlx::PgPool;
use uuid::Uuid;

/// Builds the full `/api` service over `$pool` with mail disabled.
macro_rules! test_app {
    ($pool:expr, $auth:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data(actix_web::web::Data::new($pool.clone()))
                .app_data(actix_web::web::Data::new($auth))
                .app_data(actix_web::web::Data::new(
                    sevakriti::services::email::Mailer::disabled(),
                ))
                .app_data(sevakriti::routes::api::json_config())
                .service(
                    actix_web::web::scope("/api")
                        .configure(sevakriti::routes::api::scoped_config),
                ),
        )
        .await
    };
}

pub fn auth_service() -> AuthService {
    AuthService::new(
        &AuthSettings {
            jwt_secret: "integration-secret".to_string(),
            token_ttl_days: 7,
        },
        false,
    )
    .unwrap()
}

pub fn bearer(auth: &AuthService, user: &User) -> (&'static str, String) {
    let token = auth.generate_token(user).unwrap();
    ("Authorization", format!("Bearer {}", token))
}

pub async fn seed_user(pool: &PgPool, email: &str, role: UserRole) -> User {
    User::create(
        pool,
        CreateUser {
            name: email.split('@').next().unwrap_or("someone").to_string(),
            email: email.to_string(),
            password: "hunter22".to_string(),
            role,
        },
    )
    .await
    .unwrap()
}

pub async fn seed_campaign(pool: &PgPool, owner: &User, target: Decimal) -> Campaign {
    let today = Utc::now().date_naive();
    Campaign::create(
        pool,
        CreateCampaign {
            created_by: owner.id,
            title: "Clean water for Dharavi".to_string(),
            description: "Funding three community water filters.".to_string(),
            target_amount: target,
            start_date: today + Duration::days(1),
            end_date: today + Duration::days(30),
            images: vec!["https://img.example.org/filter.jpg".to_string()],
        },
        today,
    )
    .await
    .unwrap()
}

pub fn donation_to(campaign_id: Option<Uuid>, amount: Decimal) -> CreateDonation {
    CreateDonation {
        amount,
        campaign_id,
        payment_method: PaymentMethod::Card,
        transaction_id: None,
        donor_name: "Meera".to_string(),
        donor_email: "meera@example.org".to_string(),
        donated_by: None,
    }
}
