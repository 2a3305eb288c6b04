use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_index(
                Index::create()
                    .table(Resources::Table)
                    .col(Resources::Status)
                    .col(Resources::IsTop)
                    .col(Resources::CreatedAt)
                    .name("idx_resources_status_is_top_created_at")
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .table(Resources::Table)
                    .col(Resources::OwnerId)
                    .name("idx_resources_owner_id")
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .table(Resources::Table)
                    .col(Resources::CategoryId)
                    .name("idx_resources_category_id")
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .table(Orders::Table)
                    .col(Orders::UserId)
                    .name("idx_orders_user_id")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_orders_user_id").to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_resources_category_id").to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_resources_owner_id").to_owned())
            .await?;
        manager
            .drop_index(
                Index::drop()
                    .name("idx_resources_status_is_top_created_at")
                    .to_owned(),
            )
            .await
    }
}

#[derive(Iden)]
enum Resources {
    Table,
    Status,
    IsTop,
    OwnerId,
    CategoryId,
    CreatedAt,
}

#[derive(Iden)]
enum Orders {
    Table,
    UserId,
}
