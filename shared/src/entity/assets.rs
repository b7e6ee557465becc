//! `SeaORM` Entity, @generated manually

use sea_orm::entity::prelude::*;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "assets")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub asset_id: i32,
    pub account_id: i32,
    #[sea_orm(column_type = "Text")]
    pub ticker_symbol: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub name: Option<String>,
    #[sea_orm(column_type = "Double")]
    pub quantity: f64,
    #[sea_orm(column_type = "Double")]
    pub average_cost: f64,
    #[sea_orm(column_type = "Double")]
    pub total_invested: f64,
    #[sea_orm(column_type = "Double", nullable)]
    pub current_price: Option<f64>,
    #[sea_orm(column_type = "Double", nullable)]
    pub price_yesterday: Option<f64>,
    #[sea_orm(column_type = "Double", nullable)]
    pub fifty_two_week_high: Option<f64>,
    #[sea_orm(column_type = "Double", nullable)]
    pub fifty_two_week_low: Option<f64>,
    #[sea_orm(column_type = "Text", nullable)]
    pub notes: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::accounts::Entity",
        from = "Column::AccountId",
        to = "super::accounts::Column::AccountId",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Accounts,
}

impl Related<super::accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Accounts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
