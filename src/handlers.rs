pub mod api;
pub mod auth;
pub mod health;
pub mod likes;
pub mod profiles;
pub mod static_assets;
pub mod treasures;
