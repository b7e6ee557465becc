use chrono::NaiveDate;
use sea_orm::{prelude::*, sea_query::OnConflict, ActiveValue, QueryOrder};
use std::sync::Arc;

use crate::entity::portfolio_history;

pub struct HistoryRepository {
    db: Arc<DatabaseConnection>,
}

impl HistoryRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    pub async fn find(&self, date: NaiveDate) -> Result<Option<portfolio_history::Model>, DbErr> {
        portfolio_history::Entity::find_by_id(date)
            .one(self.db.as_ref())
            .await
    }

    pub async fn list_oldest_first(&self) -> Result<Vec<portfolio_history::Model>, DbErr> {
        portfolio_history::Entity::find()
            .order_by_asc(portfolio_history::Column::SnapshotDate)
            .all(self.db.as_ref())
            .await
    }

    pub async fn list_newest_first(&self) -> Result<Vec<portfolio_history::Model>, DbErr> {
        portfolio_history::Entity::find()
            .order_by_desc(portfolio_history::Column::SnapshotDate)
            .all(self.db.as_ref())
            .await
    }

    /// Records the value for `date` unless that day already has one.
    /// Returns whether a row was written.
    pub async fn insert_if_absent(&self, date: NaiveDate, value: f64) -> Result<bool, DbErr> {
        if self.find(date).await?.is_some() {
            return Ok(false);
        }
        let active_model = portfolio_history::ActiveModel {
            snapshot_date: ActiveValue::Set(date),
            total_portfolio_value: ActiveValue::Set(value),
        };
        portfolio_history::Entity::insert(active_model)
            .on_conflict(
                OnConflict::column(portfolio_history::Column::SnapshotDate)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(self.db.as_ref())
            .await
            .map(|rows| rows > 0)
    }

    pub async fn upsert(&self, date: NaiveDate, value: f64) -> Result<(), DbErr> {
        let active_model = portfolio_history::ActiveModel {
            snapshot_date: ActiveValue::Set(date),
            total_portfolio_value: ActiveValue::Set(value),
        };
        portfolio_history::Entity::insert(active_model)
            .on_conflict(
                OnConflict::column(portfolio_history::Column::SnapshotDate)
                    .update_column(portfolio_history::Column::TotalPortfolioValue)
                    .to_owned(),
            )
            .exec_without_returning(self.db.as_ref())
            .await?;
        Ok(())
    }

    pub async fn delete(&self, date: NaiveDate) -> Result<u64, DbErr> {
        let result = portfolio_history::Entity::delete_by_id(date)
            .exec(self.db.as_ref())
            .await?;
        Ok(result.rows_affected)
    }
}
