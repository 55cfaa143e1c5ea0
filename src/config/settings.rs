use config::{Config, ConfigError, Environment, File, builder::DefaultState, ConfigBuilder};
use serde::Deserialize;
use std::env;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub environment: String,
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    pub auth: AuthSettings,
    pub cors: CorsSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthSettings {
    pub jwt_secret: String,
    pub token_ttl_days: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CorsSettings {
    pub frontend_url: String,
}

impl Settings {
    /// Defaults, then `config/default.toml`, then `APP__*` variables, then the
    /// plain deployment variables (`PORT`, `DATABASE_URL`, ...).
    pub fn load() -> Result<Self, ConfigError> {
        with_defaults()?
            .add_source(File::with_name("config/default").required(false))
            .add_source(
                Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("server.port", env::var("PORT").ok())?
            .set_override_option("database.url", env::var("DATABASE_URL").ok())?
            .set_override_option("auth.jwt_secret", env::var("JWT_SECRET").ok())?
            .set_override_option("cors.frontend_url", env::var("FRONTEND_URL").ok())?
            .set_override_option("environment", env::var("NODE_ENV").ok())?
            .build()?
            .try_deserialize()
    }

    pub fn is_production(&self) -> bool {
        self.environment.eq_ignore_ascii_case("production")
    }

    pub fn bind_address(&self) -> (String, u16) {
        (self.server.host.clone(), self.server.port)
    }
}

fn with_defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Config::builder()
        .set_default("environment", "development")?
        .set_default("server.host", "0.0.0.0")?
        .set_default("server.port", 5000_i64)?
        .set_default("database.max_connections", 10_i64)?
        .set_default("database.acquire_timeout_secs", 5_i64)?
        .set_default("auth.token_ttl_days", 7_i64)?
        .set_default("cors.frontend_url", "http://localhost:5173")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(overrides: &[(&str, &str)]) -> Result<Settings, ConfigError> {
        let mut builder = with_defaults()?;
        for (key, value) in overrides {
            builder = builder.set_override(*key, *value)?;
        }
        builder.build()?.try_deserialize()
    }

    #[test]
    fn defaults_fill_everything_but_secrets() {
        let settings = build(&[
            ("database.url", "postgres://localhost/sevakriti"),
            ("auth.jwt_secret", "secret"),
        ])
        .unwrap();

        assert_eq!(settings.server.port, 5000);
        assert_eq!(settings.auth.token_ttl_days, 7);
        assert_eq!(settings.cors.frontend_url, "http://localhost:5173");
        assert!(!settings.is_production());
    }

    #[test]
    fn missing_jwt_secret_is_an_error() {
        let result = build(&[("database.url", "postgres://localhost/sevakriti")]);
        assert!(result.is_err());
    }

    #[test]
    fn string_port_override_is_parsed() {
        let settings = build(&[
            ("database.url", "postgres://localhost/sevakriti"),
            ("auth.jwt_secret", "secret"),
            ("server.port", "8080"),
            ("environment", "Production"),
        ])
        .unwrap();

        assert_eq!(settings.bind_address(), ("0.0.0.0".to_string(), 8080));
        assert!(settings.is_production());
    }
}
