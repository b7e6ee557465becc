use sea_orm::{prelude::*, ActiveValue, FromQueryResult, JoinType, QueryOrder, QuerySelect};
use serde::Serialize;
use std::sync::Arc;

use crate::entity::{accounts, platforms, users};
use crate::validation::AccountDraft;

/// An account with the names of its owner and platform.
#[derive(Debug, Clone, PartialEq, FromQueryResult, Serialize)]
pub struct AccountListing {
    pub account_id: i32,
    pub user_id: i32,
    pub platform_id: i32,
    pub account_type: String,
    pub account_name: String,
    pub cash_balance: Option<f64>,
    pub user_name: String,
    pub platform_name: String,
}

impl AccountListing {
    pub fn cash(&self) -> f64 {
        self.cash_balance.unwrap_or(0.0)
    }
}

pub struct AccountRepository {
    db: Arc<DatabaseConnection>,
}

impl AccountRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    pub async fn find_by_id(&self, account_id: i32) -> Result<Option<accounts::Model>, DbErr> {
        accounts::Entity::find_by_id(account_id)
            .one(self.db.as_ref())
            .await
    }

    pub async fn find_by_name(
        &self,
        account_name: &str,
        excluding: Option<i32>,
    ) -> Result<Option<accounts::Model>, DbErr> {
        let mut query =
            accounts::Entity::find().filter(accounts::Column::AccountName.eq(account_name));
        if let Some(id) = excluding {
            query = query.filter(accounts::Column::AccountId.ne(id));
        }
        query.one(self.db.as_ref()).await
    }

    fn listing_query() -> Select<accounts::Entity> {
        accounts::Entity::find()
            .select_only()
            .columns([
                accounts::Column::AccountId,
                accounts::Column::UserId,
                accounts::Column::PlatformId,
                accounts::Column::AccountType,
                accounts::Column::AccountName,
                accounts::Column::CashBalance,
            ])
            .column_as(users::Column::Name, "user_name")
            .column_as(platforms::Column::Name, "platform_name")
            .join(JoinType::InnerJoin, accounts::Relation::Users.def())
            .join(JoinType::InnerJoin, accounts::Relation::Platforms.def())
    }

    /// Every account, ordered by owner, platform, then account name.
    pub async fn list_with_owners(&self) -> Result<Vec<AccountListing>, DbErr> {
        Self::listing_query()
            .order_by_asc(users::Column::Name)
            .order_by_asc(platforms::Column::Name)
            .order_by_asc(accounts::Column::AccountName)
            .into_model::<AccountListing>()
            .all(self.db.as_ref())
            .await
    }

    pub async fn find_listing(&self, account_id: i32) -> Result<Option<AccountListing>, DbErr> {
        Self::listing_query()
            .filter(accounts::Column::AccountId.eq(account_id))
            .into_model::<AccountListing>()
            .one(self.db.as_ref())
            .await
    }

    pub async fn create(&self, draft: &AccountDraft) -> Result<accounts::Model, DbErr> {
        let active_model = accounts::ActiveModel {
            user_id: ActiveValue::Set(draft.user_id),
            platform_id: ActiveValue::Set(draft.platform_id),
            account_type: ActiveValue::Set(draft.account_type.clone()),
            account_name: ActiveValue::Set(draft.account_name.clone()),
            cash_balance: ActiveValue::Set(Some(draft.cash_balance)),
            ..Default::default()
        };
        active_model.insert(self.db.as_ref()).await
    }

    pub async fn update(
        &self,
        account_id: i32,
        draft: &AccountDraft,
    ) -> Result<accounts::Model, DbErr> {
        let active_model = accounts::ActiveModel {
            account_id: ActiveValue::Unchanged(account_id),
            user_id: ActiveValue::Set(draft.user_id),
            platform_id: ActiveValue::Set(draft.platform_id),
            account_type: ActiveValue::Set(draft.account_type.clone()),
            account_name: ActiveValue::Set(draft.account_name.clone()),
            cash_balance: ActiveValue::Set(Some(draft.cash_balance)),
        };
        active_model.update(self.db.as_ref()).await
    }

    /// Assets go with the account (ON DELETE CASCADE).
    pub async fn delete(&self, account_id: i32) -> Result<u64, DbErr> {
        let result = accounts::Entity::delete_by_id(account_id)
            .exec(self.db.as_ref())
            .await?;
        Ok(result.rows_affected)
    }

    pub async fn total_cash(&self) -> Result<f64, DbErr> {
        let accounts = accounts::Entity::find().all(self.db.as_ref()).await?;
        Ok(accounts.iter().map(accounts::Model::cash).sum())
    }
}
