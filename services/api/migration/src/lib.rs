use sea_orm_migration::prelude::*;

mod m20260901_000001_create_users;
mod m20260901_000002_create_auth_codes;
mod m20260901_000003_create_categories;
mod m20260901_000004_create_tags;
mod m20260901_000005_create_resources;
mod m20260901_000006_create_favorites_and_ratings;
mod m20260901_000007_create_credit_ledger;
mod m20260901_000008_create_orders;
mod m20260901_000009_add_listing_indexes;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260901_000001_create_users::Migration),
            Box::new(m20260901_000002_create_auth_codes::Migration),
            Box::new(m20260901_000003_create_categories::Migration),
            Box::new(m20260901_000004_create_tags::Migration),
            Box::new(m20260901_000005_create_resources::Migration),
            Box::new(m20260901_000006_create_favorites_and_ratings::Migration),
            Box::new(m20260901_000007_create_credit_ledger::Migration),
            Box::new(m20260901_000008_create_orders::Migration),
            Box::new(m20260901_000009_add_listing_indexes::Migration),
        ]
    }
}
