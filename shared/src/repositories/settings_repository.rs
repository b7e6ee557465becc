use sea_orm::{prelude::*, sea_query::OnConflict, ActiveValue};
use std::sync::Arc;

use crate::entity::app_settings;

pub const TARGET_GOAL_KEY: &str = "target_goal_value";
pub const EXCHANGE_RATE_KEY: &str = "usd_to_cad_exchange_rate";

pub struct SettingsRepository {
    db: Arc<DatabaseConnection>,
}

impl SettingsRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    pub async fn get(&self, key: &str) -> Result<Option<String>, DbErr> {
        let setting = app_settings::Entity::find_by_id(key.to_string())
            .one(self.db.as_ref())
            .await?;
        Ok(setting.and_then(|s| s.setting_value))
    }

    /// Numeric setting, `default` when missing or unparseable.
    pub async fn get_f64(&self, key: &str, default: f64) -> Result<f64, DbErr> {
        let Some(raw) = self.get(key).await? else {
            return Ok(default);
        };
        match raw.trim().parse::<f64>() {
            Ok(value) if value.is_finite() => Ok(value),
            _ => {
                tracing::warn!("Could not parse setting {} = '{}', using default {}", key, raw, default);
                Ok(default)
            }
        }
    }

    pub async fn set(&self, key: &str, value: &str) -> Result<(), DbErr> {
        let active_model = app_settings::ActiveModel {
            setting_key: ActiveValue::Set(key.to_string()),
            setting_value: ActiveValue::Set(Some(value.to_string())),
        };
        app_settings::Entity::insert(active_model)
            .on_conflict(
                OnConflict::column(app_settings::Column::SettingKey)
                    .update_column(app_settings::Column::SettingValue)
                    .to_owned(),
            )
            .exec(self.db.as_ref())
            .await?;
        Ok(())
    }
}
