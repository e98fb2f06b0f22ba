use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ReadingEvents::Table)
                    .if_not_exists()
                    .col(pk_auto(ReadingEvents::Id))
                    .col(string(ReadingEvents::Title))
                    .col(big_integer(ReadingEvents::PagesRead))
                    .col(boolean(ReadingEvents::Finished).default(false))
                    .col(timestamp_with_time_zone(ReadingEvents::RecordedAt))
                    .to_owned(),
            )
            .await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ReadingEvents::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum ReadingEvents {
    Table,
    Id,
    Title,
    PagesRead,
    Finished,
    RecordedAt,
}
