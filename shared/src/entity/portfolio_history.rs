//! `SeaORM` Entity, @generated manually

use sea_orm::entity::prelude::*;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "portfolio_history")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub snapshot_date: Date,
    #[sea_orm(column_type = "Double")]
    pub total_portfolio_value: f64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
