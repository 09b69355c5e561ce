use sea_orm_migration::prelude::*;

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum PurchasePlans {
    Table,
    Id,
    UserId,
    Name,
    Priority,
    BudgetCents,
    Category,
    Status,
    Notes,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum ProductOptions {
    Table,
    Id,
    PlanId,
    Name,
    ListPriceCents,
    Specs,
    Url,
    CreatedAt,
}

#[derive(DeriveIden)]
enum MerchantOptions {
    Table,
    Id,
    ProductOptionId,
    Merchant,
    PriceCents,
    NetPriceCents,
    Url,
    CreatedAt,
    UpdatedAt,
}

/// 叠加优惠组成 (卡返现 / 店铺促销 / 优惠券 ...)
#[derive(DeriveIden)]
enum StackComponents {
    Table,
    Id,
    MerchantOptionId,
    Kind,
    Label,
    ValueCents,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(PurchasePlans::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PurchasePlans::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(PurchasePlans::UserId).big_integer().not_null())
                    .col(ColumnDef::new(PurchasePlans::Name).string_len(255).not_null())
                    .col(
                        // 1 = low, 2 = medium, 3 = high
                        ColumnDef::new(PurchasePlans::Priority)
                            .integer()
                            .not_null()
                            .default(2),
                    )
                    .col(ColumnDef::new(PurchasePlans::BudgetCents).big_integer().null())
                    .col(ColumnDef::new(PurchasePlans::Category).string_len(64).null())
                    .col(
                        ColumnDef::new(PurchasePlans::Status)
                            .string_len(16)
                            .not_null()
                            .default("planning"),
                    )
                    .col(ColumnDef::new(PurchasePlans::Notes).text().null())
                    .col(
                        ColumnDef::new(PurchasePlans::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(PurchasePlans::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_purchase_plans_user")
                            .from(PurchasePlans::Table, PurchasePlans::UserId)
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
                    .name("idx_purchase_plans_user")
                    .table(PurchasePlans::Table)
                    .col(PurchasePlans::UserId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ProductOptions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ProductOptions::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ProductOptions::PlanId).big_integer().not_null())
                    .col(ColumnDef::new(ProductOptions::Name).string_len(255).not_null())
                    .col(
                        ColumnDef::new(ProductOptions::ListPriceCents)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    // JSON object, 以文本存储以兼容 SQLite
                    .col(
                        ColumnDef::new(ProductOptions::Specs)
                            .text()
                            .not_null()
                            .default("{}"),
                    )
                    .col(ColumnDef::new(ProductOptions::Url).text().null())
                    .col(
                        ColumnDef::new(ProductOptions::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_product_options_plan")
                            .from(ProductOptions::Table, ProductOptions::PlanId)
                            .to(PurchasePlans::Table, PurchasePlans::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(MerchantOptions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(MerchantOptions::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(MerchantOptions::ProductOptionId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(MerchantOptions::Merchant)
                            .string_len(255)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(MerchantOptions::PriceCents)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(MerchantOptions::NetPriceCents)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(MerchantOptions::Url).text().null())
                    .col(
                        ColumnDef::new(MerchantOptions::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(MerchantOptions::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_merchant_options_product")
                            .from(MerchantOptions::Table, MerchantOptions::ProductOptionId)
                            .to(ProductOptions::Table, ProductOptions::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(StackComponents::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(StackComponents::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(StackComponents::MerchantOptionId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(StackComponents::Kind).string_len(16).not_null())
                    .col(ColumnDef::new(StackComponents::Label).string_len(255).not_null())
                    .col(
                        ColumnDef::new(StackComponents::ValueCents)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_stack_components_merchant_option")
                            .from(StackComponents::Table, StackComponents::MerchantOptionId)
                            .to(MerchantOptions::Table, MerchantOptions::Id)
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
                    .table(StackComponents::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(
                Table::drop()
                    .if_exists()
                    .table(MerchantOptions::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(
                Table::drop()
                    .if_exists()
                    .table(ProductOptions::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(
                Table::drop()
                    .if_exists()
                    .table(PurchasePlans::Table)
                    .to_owned(),
            )
            .await?;
        Ok(())
    }
}
