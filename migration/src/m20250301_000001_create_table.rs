use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Owners and brokerages have no dependencies
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Users::UserId).integer().not_null().auto_increment().primary_key())
                    .col(ColumnDef::new(Users::Name).text().not_null().unique_key())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Platforms::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Platforms::PlatformId).integer().not_null().auto_increment().primary_key())
                    .col(ColumnDef::new(Platforms::Name).text().not_null().unique_key())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Accounts::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Accounts::AccountId).integer().not_null().auto_increment().primary_key())
                    .col(ColumnDef::new(Accounts::UserId).integer().not_null())
                    .col(ColumnDef::new(Accounts::PlatformId).integer().not_null())
                    .col(ColumnDef::new(Accounts::AccountType).text().not_null())
                    .col(ColumnDef::new(Accounts::AccountName).text().not_null().unique_key())
                    .col(ColumnDef::new(Accounts::CashBalance).double().default(0.0))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_accounts_user")
                            .from(Accounts::Table, Accounts::UserId)
                            .to(Users::Table, Users::UserId)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_accounts_platform")
                            .from(Accounts::Table, Accounts::PlatformId)
                            .to(Platforms::Table, Platforms::PlatformId)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Assets::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Assets::AssetId).integer().not_null().auto_increment().primary_key())
                    .col(ColumnDef::new(Assets::AccountId).integer().not_null())
                    .col(ColumnDef::new(Assets::TickerSymbol).text().not_null())
                    .col(ColumnDef::new(Assets::Name).text().null())
                    .col(ColumnDef::new(Assets::Quantity).double().not_null())
                    .col(ColumnDef::new(Assets::AverageCost).double().not_null())
                    .col(ColumnDef::new(Assets::TotalInvested).double().not_null())
                    // Provider-fetched, overwritten on refresh
                    .col(ColumnDef::new(Assets::CurrentPrice).double().null())
                    .col(ColumnDef::new(Assets::PriceYesterday).double().null())
                    .col(ColumnDef::new(Assets::FiftyTwoWeekHigh).double().null())
                    .col(ColumnDef::new(Assets::FiftyTwoWeekLow).double().null())
                    .col(ColumnDef::new(Assets::Notes).text().null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_assets_account")
                            .from(Assets::Table, Assets::AccountId)
                            .to(Accounts::Table, Accounts::AccountId)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_assets_account_ticker")
                    .table(Assets::Table)
                    .col(Assets::AccountId)
                    .col(Assets::TickerSymbol)
                    .unique()
                    .if_not_exists()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Drop tables in reverse order
        manager
            .drop_table(Table::drop().table(Assets::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Accounts::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Platforms::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Users {
    Table,
    UserId,
    Name,
}

#[derive(DeriveIden)]
enum Platforms {
    Table,
    PlatformId,
    Name,
}

#[derive(DeriveIden)]
enum Accounts {
    Table,
    AccountId,
    UserId,
    PlatformId,
    AccountType,
    AccountName,
    CashBalance,
}

#[derive(DeriveIden)]
enum Assets {
    Table,
    AssetId,
    AccountId,
    TickerSymbol,
    Name,
    Quantity,
    AverageCost,
    TotalInvested,
    CurrentPrice,
    PriceYesterday,
    FiftyTwoWeekHigh,
    FiftyTwoWeekLow,
    Notes,
}
