use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(SearchCache::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SearchCache::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(SearchCache::Query).string().not_null())
                    .col(ColumnDef::new(SearchCache::ResultsJson).text().not_null())
                    .col(ColumnDef::new(SearchCache::CreatedAt).string().not_null())
                    .to_owned(),
            )
            .await?;

        // Upserts in the cache repository conflict on this index.
        manager
            .create_index(
                Index::create()
                    .name("idx_search_cache_query_unique")
                    .table(SearchCache::Table)
                    .col(SearchCache::Query)
                    .unique()
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_search_cache_created_at")
                    .table(SearchCache::Table)
                    .col(SearchCache::CreatedAt)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(SearchCache::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum SearchCache {
    Table,
    Id,
    Query,
    ResultsJson,
    CreatedAt,
}
