use sea_orm_migration::prelude::*;

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    ExternalId,
    Email,
    DisplayName,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum CreditCards {
    Table,
    Id,
    UserId,
    Issuer,
    Name,
    LastFour,
    Network,
    AnnualFeeCents,
    BaseRewardBp,
    OpenedOn,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum CardBonusCategories {
    Table,
    Id,
    CardId,
    Category,
    RewardBp,
}

/// 卡片周期性报销额度 (statement credits / benefits)
#[derive(DeriveIden)]
enum CardCredits {
    Table,
    Id,
    CardId,
    UserId,
    Name,
    AmountCents,
    Frequency,
    UsedCents,
    PeriodStart,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum GiftCards {
    Table,
    Id,
    UserId,
    Merchant,
    CardNumber,
    InitialBalanceCents,
    BalanceCents,
    Status,
    ExpiresOn,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Users::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Users::ExternalId).string_len(255).not_null())
                    .col(ColumnDef::new(Users::Email).string_len(255).null())
                    .col(ColumnDef::new(Users::DisplayName).string_len(255).null())
                    .col(
                        ColumnDef::new(Users::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Users::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // 身份提供方 subject 唯一
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_users_external_id_unique")
                    .table(Users::Table)
                    .col(Users::ExternalId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(CreditCards::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CreditCards::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(CreditCards::UserId).big_integer().not_null())
                    .col(ColumnDef::new(CreditCards::Issuer).string_len(128).not_null())
                    .col(ColumnDef::new(CreditCards::Name).string_len(255).not_null())
                    .col(ColumnDef::new(CreditCards::LastFour).string_len(4).null())
                    .col(ColumnDef::new(CreditCards::Network).string_len(32).null())
                    .col(
                        ColumnDef::new(CreditCards::AnnualFeeCents)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(CreditCards::BaseRewardBp)
                            .integer()
                            .not_null()
                            .default(100),
                    )
                    .col(ColumnDef::new(CreditCards::OpenedOn).date().null())
                    .col(
                        ColumnDef::new(CreditCards::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(CreditCards::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_credit_cards_user")
                            .from(CreditCards::Table, CreditCards::UserId)
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
                    .name("idx_credit_cards_user")
                    .table(CreditCards::Table)
                    .col(CreditCards::UserId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(CardBonusCategories::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CardBonusCategories::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(CardBonusCategories::CardId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CardBonusCategories::Category)
                            .string_len(64)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CardBonusCategories::RewardBp)
                            .integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_card_bonus_categories_card")
                            .from(CardBonusCategories::Table, CardBonusCategories::CardId)
                            .to(CreditCards::Table, CreditCards::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 同一张卡同一类别只允许一条
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("uq_card_bonus_categories_card_category")
                    .table(CardBonusCategories::Table)
                    .col(CardBonusCategories::CardId)
                    .col(CardBonusCategories::Category)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(CardCredits::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CardCredits::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(CardCredits::CardId).big_integer().not_null())
                    .col(ColumnDef::new(CardCredits::UserId).big_integer().not_null())
                    .col(ColumnDef::new(CardCredits::Name).string_len(255).not_null())
                    .col(
                        ColumnDef::new(CardCredits::AmountCents)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CardCredits::Frequency)
                            .string_len(16)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CardCredits::UsedCents)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(CardCredits::PeriodStart).date().not_null())
                    .col(
                        ColumnDef::new(CardCredits::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(CardCredits::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_card_credits_card")
                            .from(CardCredits::Table, CardCredits::CardId)
                            .to(CreditCards::Table, CreditCards::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(GiftCards::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(GiftCards::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(GiftCards::UserId).big_integer().not_null())
                    .col(ColumnDef::new(GiftCards::Merchant).string_len(255).not_null())
                    .col(ColumnDef::new(GiftCards::CardNumber).string_len(64).null())
                    .col(
                        ColumnDef::new(GiftCards::InitialBalanceCents)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(GiftCards::BalanceCents)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(GiftCards::Status)
                            .string_len(16)
                            .not_null()
                            .default("active"),
                    )
                    .col(ColumnDef::new(GiftCards::ExpiresOn).date().null())
                    .col(
                        ColumnDef::new(GiftCards::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(GiftCards::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_gift_cards_user")
                            .from(GiftCards::Table, GiftCards::UserId)
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
                    .name("idx_gift_cards_user_status")
                    .table(GiftCards::Table)
                    .col(GiftCards::UserId)
                    .col(GiftCards::Status)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().if_exists().table(GiftCards::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().if_exists().table(CardCredits::Table).to_owned())
            .await?;
        manager
            .drop_table(
                Table::drop()
                    .if_exists()
                    .table(CardBonusCategories::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(Table::drop().if_exists().table(CreditCards::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().if_exists().table(Users::Table).to_owned())
            .await?;
        Ok(())
    }
}
