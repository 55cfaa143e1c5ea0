pub mod auth;
pub mod campaign;
pub mod donation;
pub mod user;
pub mod volunteer;
