pub use super::accounts::Entity as Accounts;
pub use super::app_settings::Entity as AppSettings;
pub use super::assets::Entity as Assets;
pub use super::platforms::Entity as Platforms;
pub use super::portfolio_history::Entity as PortfolioHistory;
pub use super::users::Entity as Users;
