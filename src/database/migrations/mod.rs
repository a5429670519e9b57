//! SeaORM migrations
//!
//! Portable across SQLite, PostgreSQL and MySQL.

use sea_orm_migration::prelude::*;

pub mod m20250901_000001_create_addresses;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![Box::new(m20250901_000001_create_addresses::Migration)]
    }
}
