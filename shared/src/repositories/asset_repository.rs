use sea_orm::{prelude::*, ActiveValue, QueryOrder, QuerySelect};
use std::sync::Arc;

use crate::entity::assets;
use crate::market_data::Quote;
use crate::validation::AssetDraft;

pub struct AssetRepository {
    db: Arc<DatabaseConnection>,
}

impl AssetRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    pub async fn find_by_id(&self, asset_id: i32) -> Result<Option<assets::Model>, DbErr> {
        assets::Entity::find_by_id(asset_id)
            .one(self.db.as_ref())
            .await
    }

    /// Same ticker inside the same account, optionally ignoring one asset.
    pub async fn find_in_account(
        &self,
        account_id: i32,
        ticker_symbol: &str,
        excluding: Option<i32>,
    ) -> Result<Option<assets::Model>, DbErr> {
        let mut query = assets::Entity::find()
            .filter(assets::Column::AccountId.eq(account_id))
            .filter(assets::Column::TickerSymbol.eq(ticker_symbol));
        if let Some(id) = excluding {
            query = query.filter(assets::Column::AssetId.ne(id));
        }
        query.one(self.db.as_ref()).await
    }

    pub async fn list_for_account(&self, account_id: i32) -> Result<Vec<assets::Model>, DbErr> {
        assets::Entity::find()
            .filter(assets::Column::AccountId.eq(account_id))
            .order_by_asc(assets::Column::TickerSymbol)
            .all(self.db.as_ref())
            .await
    }

    pub async fn list_all(&self) -> Result<Vec<assets::Model>, DbErr> {
        assets::Entity::find()
            .order_by_asc(assets::Column::AssetId)
            .all(self.db.as_ref())
            .await
    }

    pub async fn list_by_ticker(&self, ticker_symbol: &str) -> Result<Vec<assets::Model>, DbErr> {
        assets::Entity::find()
            .filter(assets::Column::TickerSymbol.eq(ticker_symbol))
            .all(self.db.as_ref())
            .await
    }

    pub async fn distinct_tickers(&self) -> Result<Vec<String>, DbErr> {
        assets::Entity::find()
            .select_only()
            .column(assets::Column::TickerSymbol)
            .distinct()
            .order_by_asc(assets::Column::TickerSymbol)
            .into_tuple::<String>()
            .all(self.db.as_ref())
            .await
    }

    pub async fn create(
        &self,
        account_id: i32,
        draft: &AssetDraft,
        quote: Option<&Quote>,
    ) -> Result<assets::Model, DbErr> {
        // A manually entered name wins over the provider's
        let name = draft
            .name
            .clone()
            .or_else(|| quote.and_then(|q| q.name.clone()));

        let active_model = assets::ActiveModel {
            account_id: ActiveValue::Set(account_id),
            ticker_symbol: ActiveValue::Set(draft.ticker_symbol.clone()),
            name: ActiveValue::Set(name),
            quantity: ActiveValue::Set(draft.quantity),
            average_cost: ActiveValue::Set(draft.average_cost),
            total_invested: ActiveValue::Set(draft.total_invested),
            current_price: ActiveValue::Set(quote.and_then(|q| q.current_price)),
            price_yesterday: ActiveValue::Set(quote.and_then(|q| q.price_yesterday)),
            fifty_two_week_high: ActiveValue::Set(quote.and_then(|q| q.fifty_two_week_high)),
            fifty_two_week_low: ActiveValue::Set(quote.and_then(|q| q.fifty_two_week_low)),
            ..Default::default()
        };
        active_model.insert(self.db.as_ref()).await
    }

    /// Rewrites the manually entered fields. A changed ticker clears the
    /// market fields since they describe the old symbol.
    pub async fn update_details(
        &self,
        existing: &assets::Model,
        draft: &AssetDraft,
    ) -> Result<assets::Model, DbErr> {
        let mut active_model: assets::ActiveModel = existing.clone().into();
        active_model.ticker_symbol = ActiveValue::Set(draft.ticker_symbol.clone());
        active_model.name = ActiveValue::Set(draft.name.clone().or_else(|| existing.name.clone()));
        active_model.quantity = ActiveValue::Set(draft.quantity);
        active_model.average_cost = ActiveValue::Set(draft.average_cost);
        active_model.total_invested = ActiveValue::Set(draft.total_invested);

        if draft.ticker_symbol != existing.ticker_symbol {
            active_model.current_price = ActiveValue::Set(None);
            active_model.price_yesterday = ActiveValue::Set(None);
            active_model.fifty_two_week_high = ActiveValue::Set(None);
            active_model.fifty_two_week_low = ActiveValue::Set(None);
        }

        active_model.update(self.db.as_ref()).await
    }

    /// Overwrites the market fields of one asset; the name is only filled
    /// in when the asset has none.
    pub async fn apply_quote(
        &self,
        existing: &assets::Model,
        quote: &Quote,
    ) -> Result<assets::Model, DbErr> {
        let mut active_model: assets::ActiveModel = existing.clone().into();
        active_model.current_price = ActiveValue::Set(quote.current_price);
        active_model.price_yesterday = ActiveValue::Set(quote.price_yesterday);
        active_model.fifty_two_week_high = ActiveValue::Set(quote.fifty_two_week_high);
        active_model.fifty_two_week_low = ActiveValue::Set(quote.fifty_two_week_low);
        if existing.name.as_deref().map_or(true, |n| n.trim().is_empty()) {
            if let Some(name) = &quote.name {
                active_model.name = ActiveValue::Set(Some(name.clone()));
            }
        }
        active_model.update(self.db.as_ref()).await
    }

    pub async fn delete(&self, asset_id: i32) -> Result<u64, DbErr> {
        let result = assets::Entity::delete_by_id(asset_id)
            .exec(self.db.as_ref())
            .await?;
        Ok(result.rows_affected)
    }
}
