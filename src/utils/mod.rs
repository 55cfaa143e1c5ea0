pub mod cookies;
pub mod helpers;
