use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(AppSettings::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(AppSettings::SettingKey).text().not_null().primary_key())
                    .col(ColumnDef::new(AppSettings::SettingValue).text().null())
                    .to_owned(),
            )
            .await?;

        // One row per calendar day (YYYY-MM-DD)
        manager
            .create_table(
                Table::create()
                    .table(PortfolioHistory::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(PortfolioHistory::SnapshotDate).date().not_null().primary_key())
                    .col(ColumnDef::new(PortfolioHistory::TotalPortfolioValue).double().not_null())
                    .to_owned(),
            )
            .await?;

        let seed_goal = Query::insert()
            .into_table(AppSettings::Table)
            .columns([AppSettings::SettingKey, AppSettings::SettingValue])
            .values_panic(["target_goal_value".into(), "100000".into()])
            .on_conflict(OnConflict::column(AppSettings::SettingKey).do_nothing().to_owned())
            .to_owned();

        manager.exec_stmt(seed_goal).await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PortfolioHistory::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(AppSettings::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum AppSettings {
    Table,
    SettingKey,
    SettingValue,
}

#[derive(DeriveIden)]
enum PortfolioHistory {
    Table,
    SnapshotDate,
    TotalPortfolioValue,
}
