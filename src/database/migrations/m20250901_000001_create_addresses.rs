use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Addresses::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Addresses::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Addresses::Zipcode).string().not_null())
                    .col(ColumnDef::new(Addresses::Number).string().not_null())
                    .col(ColumnDef::new(Addresses::Street).string().not_null())
                    .col(ColumnDef::new(Addresses::Street2).string())
                    .col(ColumnDef::new(Addresses::City).string().not_null())
                    .col(ColumnDef::new(Addresses::State).string().not_null())
                    .col(ColumnDef::new(Addresses::Plus4).string())
                    .col(
                        ColumnDef::new(Addresses::Country)
                            .string()
                            .not_null()
                            .default("US"),
                    )
                    .col(ColumnDef::new(Addresses::Latitude).double().not_null())
                    .col(ColumnDef::new(Addresses::Longitude).double().not_null())
                    .col(ColumnDef::new(Addresses::Source).string())
                    .col(ColumnDef::new(Addresses::Geohash).string_len(12))
                    .to_owned(),
            )
            .await?;

        self.create_indexes(manager).await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Addresses::Table).to_owned())
            .await
    }
}

impl Migration {
    async fn create_indexes(&self, manager: &SchemaManager<'_>) -> Result<(), DbErr> {
        // Bounding-box and reverse-geocode windows
        manager
            .create_index(
                Index::create()
                    .name("idx_addresses_lat_lon")
                    .table(Addresses::Table)
                    .col(Addresses::Latitude)
                    .col(Addresses::Longitude)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        // Exact and prefix geohash lookups
        manager
            .create_index(
                Index::create()
                    .name("idx_addresses_geohash")
                    .table(Addresses::Table)
                    .col(Addresses::Geohash)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        // Forward geocode
        manager
            .create_index(
                Index::create()
                    .name("idx_addresses_postal")
                    .table(Addresses::Table)
                    .col(Addresses::Zipcode)
                    .col(Addresses::Number)
                    .col(Addresses::Street)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum Addresses {
    Table,
    Id,
    Zipcode,
    Number,
    Street,
    Street2,
    City,
    State,
    Plus4,
    Country,
    Latitude,
    Longitude,
    Source,
    Geohash,
}
