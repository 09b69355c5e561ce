use sea_orm_migration::prelude::*;

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
}

/// 限时优惠 (卡优惠 / 商家活动)
#[derive(DeriveIden)]
enum Offers {
    Table,
    Id,
    UserId,
    CardId,
    Merchant,
    Title,
    ValueCents,
    StartsOn,
    EndsOn,
    CreatedAt,
}

/// 订阅扣费
#[derive(DeriveIden)]
enum Subscriptions {
    Table,
    Id,
    UserId,
    CardId,
    Name,
    AmountCents,
    BillingCycle,
    BillingAnchorOn,
    NextBillingOn,
    Active,
    CreatedAt,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Offers::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Offers::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Offers::UserId).big_integer().not_null())
                    .col(ColumnDef::new(Offers::CardId).big_integer().null())
                    .col(ColumnDef::new(Offers::Merchant).string_len(255).not_null())
                    .col(ColumnDef::new(Offers::Title).string_len(255).not_null())
                    .col(
                        ColumnDef::new(Offers::ValueCents)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Offers::StartsOn).date().not_null())
                    .col(ColumnDef::new(Offers::EndsOn).date().not_null())
                    .col(
                        ColumnDef::new(Offers::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_offers_user")
                            .from(Offers::Table, Offers::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_offers_user_dates")
                    .table(Offers::Table)
                    .col(Offers::UserId)
                    .col(Offers::StartsOn)
                    .col(Offers::EndsOn)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Subscriptions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Subscriptions::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Subscriptions::UserId).big_integer().not_null())
                    .col(ColumnDef::new(Subscriptions::CardId).big_integer().null())
                    .col(ColumnDef::new(Subscriptions::Name).string_len(255).not_null())
                    .col(
                        ColumnDef::new(Subscriptions::AmountCents)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Subscriptions::BillingCycle)
                            .string_len(16)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Subscriptions::BillingAnchorOn).date().not_null())
                    .col(ColumnDef::new(Subscriptions::NextBillingOn).date().not_null())
                    .col(
                        ColumnDef::new(Subscriptions::Active)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Subscriptions::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_subscriptions_user")
                            .from(Subscriptions::Table, Subscriptions::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(
                Table::drop()
                    .if_exists()
                    .table(Subscriptions::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(Table::drop().if_exists().table(Offers::Table).to_owned())
            .await?;
        Ok(())
    }
}
