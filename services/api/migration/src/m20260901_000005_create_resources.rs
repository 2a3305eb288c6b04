use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Resources::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Resources::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Resources::OwnerId).uuid().not_null())
                    .col(ColumnDef::new(Resources::CategoryId).uuid())
                    .col(ColumnDef::new(Resources::Title).string_len(200).not_null())
                    .col(
                        ColumnDef::new(Resources::Description)
                            .text()
                            .not_null()
                            .default(""),
                    )
                    .col(ColumnDef::new(Resources::Link).text().not_null())
                    .col(
                        ColumnDef::new(Resources::PriceCredits)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Resources::Status)
                            .string_len(16)
                            .not_null()
                            .default("pending"),
                    )
                    .col(ColumnDef::new(Resources::RejectReason).text())
                    .col(
                        ColumnDef::new(Resources::IsTop)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Resources::ViewCount)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Resources::VisitCount)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Resources::FavoriteCount)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Resources::RatingAvg)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(
                        ColumnDef::new(Resources::RatingCount)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Resources::AiSummary).text())
                    .col(ColumnDef::new(Resources::AiScore).integer())
                    .col(
                        ColumnDef::new(Resources::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Resources::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Resources::Table, Resources::OwnerId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Resources::Table, Resources::CategoryId)
                            .to(Categories::Table, Categories::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ResourceTags::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(ResourceTags::ResourceId).uuid().not_null())
                    .col(ColumnDef::new(ResourceTags::TagId).uuid().not_null())
                    .primary_key(
                        Index::create()
                            .col(ResourceTags::ResourceId)
                            .col(ResourceTags::TagId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(ResourceTags::Table, ResourceTags::ResourceId)
                            .to(Resources::Table, Resources::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(ResourceTags::Table, ResourceTags::TagId)
                            .to(Tags::Table, Tags::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ResourceTags::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Resources::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Resources {
    Table,
    Id,
    OwnerId,
    CategoryId,
    Title,
    Description,
    Link,
    PriceCredits,
    Status,
    RejectReason,
    IsTop,
    ViewCount,
    VisitCount,
    FavoriteCount,
    RatingAvg,
    RatingCount,
    AiSummary,
    AiScore,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum ResourceTags {
    Table,
    ResourceId,
    TagId,
}

#[derive(Iden)]
enum Users {
    Table,
    Id,
}

#[derive(Iden)]
enum Categories {
    Table,
    Id,
}

#[derive(Iden)]
enum Tags {
    Table,
    Id,
}
