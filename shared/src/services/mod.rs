pub mod account_service;
pub mod asset_service;
pub mod dashboard_service;
pub mod history_service;
pub mod platform_service;
pub mod refresh_service;
pub mod user_service;
