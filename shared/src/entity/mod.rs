//! `SeaORM` entities for the tracker schema

pub mod prelude;

pub mod accounts;
pub mod app_settings;
pub mod assets;
pub mod platforms;
pub mod portfolio_history;
pub mod users;
