use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(CreditTransactions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CreditTransactions::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(CreditTransactions::UserId).uuid().not_null())
                    .col(
                        ColumnDef::new(CreditTransactions::Amount)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CreditTransactions::BalanceAfter)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CreditTransactions::Kind)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(ColumnDef::new(CreditTransactions::ReferenceId).uuid())
                    .col(ColumnDef::new(CreditTransactions::Note).text())
                    .col(
                        ColumnDef::new(CreditTransactions::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(CreditTransactions::Table, CreditTransactions::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .table(CreditTransactions::Table)
                    .col(CreditTransactions::UserId)
                    .col(CreditTransactions::CreatedAt)
                    .name("idx_credit_transactions_user_id_created_at")
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ResourceUnlocks::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(ResourceUnlocks::UserId).uuid().not_null())
                    .col(ColumnDef::new(ResourceUnlocks::ResourceId).uuid().not_null())
                    .col(
                        ColumnDef::new(ResourceUnlocks::PriceCredits)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ResourceUnlocks::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .primary_key(
                        Index::create()
                            .col(ResourceUnlocks::UserId)
                            .col(ResourceUnlocks::ResourceId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(ResourceUnlocks::Table, ResourceUnlocks::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(ResourceUnlocks::Table, ResourceUnlocks::ResourceId)
                            .to(Resources::Table, Resources::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ResourceUnlocks::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(CreditTransactions::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum CreditTransactions {
    Table,
    Id,
    UserId,
    Amount,
    BalanceAfter,
    Kind,
    ReferenceId,
    Note,
    CreatedAt,
}

#[derive(Iden)]
enum ResourceUnlocks {
    Table,
    UserId,
    ResourceId,
    PriceCredits,
    CreatedAt,
}

#[derive(Iden)]
enum Users {
    Table,
    Id,
}

#[derive(Iden)]
enum Resources {
    Table,
    Id,
}
