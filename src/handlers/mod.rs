pub mod auth;
pub mod campaigns;
pub mod donations;
pub mod users;
pub mod volunteers;
