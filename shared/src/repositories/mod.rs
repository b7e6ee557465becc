pub mod account_repository;
pub mod asset_repository;
pub mod history_repository;
pub mod platform_repository;
pub mod settings_repository;
pub mod user_repository;
