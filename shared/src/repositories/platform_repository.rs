use sea_orm::{prelude::*, ActiveValue, QueryOrder};
use std::sync::Arc;

use crate::entity::platforms;

pub struct PlatformRepository {
    db: Arc<DatabaseConnection>,
}

impl PlatformRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    pub async fn find_by_id(&self, platform_id: i32) -> Result<Option<platforms::Model>, DbErr> {
        platforms::Entity::find_by_id(platform_id).one(self.db.as_ref()).await
    }

    /// Lookup by exact name, optionally ignoring one row (the row being edited).
    pub async fn find_by_name(
        &self,
        name: &str,
        excluding: Option<i32>,
    ) -> Result<Option<platforms::Model>, DbErr> {
        let mut query = platforms::Entity::find().filter(platforms::Column::Name.eq(name));
        if let Some(id) = excluding {
            query = query.filter(platforms::Column::PlatformId.ne(id));
        }
        query.one(self.db.as_ref()).await
    }

    pub async fn list_all(&self) -> Result<Vec<platforms::Model>, DbErr> {
        platforms::Entity::find()
            .order_by_asc(platforms::Column::Name)
            .all(self.db.as_ref())
            .await
    }

    pub async fn create(&self, name: &str) -> Result<platforms::Model, DbErr> {
        let active_model = platforms::ActiveModel {
            name: ActiveValue::Set(name.to_string()),
            ..Default::default()
        };
        active_model.insert(self.db.as_ref()).await
    }

    pub async fn rename(&self, platform_id: i32, name: &str) -> Result<platforms::Model, DbErr> {
        let active_model = platforms::ActiveModel {
            platform_id: ActiveValue::Unchanged(platform_id),
            name: ActiveValue::Set(name.to_string()),
        };
        active_model.update(self.db.as_ref()).await
    }

    /// Accounts and their assets go with the platform (ON DELETE CASCADE).
    pub async fn delete(&self, platform_id: i32) -> Result<u64, DbErr> {
        let result = platforms::Entity::delete_by_id(platform_id)
            .exec(self.db.as_ref())
            .await?;
        Ok(result.rows_affected)
    }
}
