use actix_cors::Cors;
use actix_web::{App, HttpServer, http::header, middleware::Logger, web};
use anyhow::Context;
use sevakriti::{
    config::settings::Settings,
    database::connection::{create_pool, run_migrations},
    routes::api,
    services::{auth::AuthService, email::Mailer},
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let settings = Settings::load().context("failed to load configuration")?;

    let pool = create_pool(&settings.database)
        .await
        .context("failed to connect to database")?;
    run_migrations(&pool)
        .await
        .context("failed to run database migrations")?;

    let auth = AuthService::new(&settings.auth, settings.is_production())
        .context("failed to initialise authentication")?;
    let mailer = Mailer::from_env();

    let pool = web::Data::new(pool);
    let auth = web::Data::new(auth);
    let mailer = web::Data::new(mailer);
    let frontend_url = settings.cors.frontend_url.clone();

    let bind_address = settings.bind_address();
    info!(
        "Server is running on {}:{} ({}, email {})",
        bind_address.0,
        bind_address.1,
        settings.environment,
        if mailer.is_enabled() { "on" } else { "off" }
    );

    HttpServer::new(move || {
        let cors = Cors::default()
            .allowed_origin(&frontend_url)
            .allowed_methods(vec!["GET", "POST", "PUT", "DELETE"])
            .allowed_headers(vec![header::CONTENT_TYPE, header::AUTHORIZATION])
            .supports_credentials()
            .max_age(3600);

        App::new()
            .wrap(cors)
            .wrap(Logger::default())
            .app_data(pool.clone())
            .app_data(auth.clone())
            .app_data(mailer.clone())
            .app_data(api::json_config())
            .route("/", web::get().to(api::health))
            .service(web::scope("/api").configure(api::scoped_config))
    })
    .bind(bind_address)?
    .run()
    .await?;

    Ok(())
}
