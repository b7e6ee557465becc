use sea_orm::{prelude::*, ActiveValue, QueryOrder};
use std::sync::Arc;

use crate::entity::users;

pub struct UserRepository {
    db: Arc<DatabaseConnection>,
}

impl UserRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    pub async fn find_by_id(&self, user_id: i32) -> Result<Option<users::Model>, DbErr> {
        users::Entity::find_by_id(user_id).one(self.db.as_ref()).await
    }

    /// Lookup by exact name, optionally ignoring one row (the row being edited).
    pub async fn find_by_name(
        &self,
        name: &str,
        excluding: Option<i32>,
    ) -> Result<Option<users::Model>, DbErr> {
        let mut query = users::Entity::find().filter(users::Column::Name.eq(name));
        if let Some(id) = excluding {
            query = query.filter(users::Column::UserId.ne(id));
        }
        query.one(self.db.as_ref()).await
    }

    pub async fn list_all(&self) -> Result<Vec<users::Model>, DbErr> {
        users::Entity::find()
            .order_by_asc(users::Column::Name)
            .all(self.db.as_ref())
            .await
    }

    pub async fn create(&self, name: &str) -> Result<users::Model, DbErr> {
        let active_model = users::ActiveModel {
            name: ActiveValue::Set(name.to_string()),
            ..Default::default()
        };
        active_model.insert(self.db.as_ref()).await
    }

    pub async fn rename(&self, user_id: i32, name: &str) -> Result<users::Model, DbErr> {
        let active_model = users::ActiveModel {
            user_id: ActiveValue::Unchanged(user_id),
            name: ActiveValue::Set(name.to_string()),
        };
        active_model.update(self.db.as_ref()).await
    }

    /// Accounts and their assets go with the user (ON DELETE CASCADE).
    pub async fn delete(&self, user_id: i32) -> Result<u64, DbErr> {
        let result = users::Entity::delete_by_id(user_id)
            .exec(self.db.as_ref())
            .await?;
        Ok(result.rows_affected)
    }
}
