use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(CurrentBooks::Table)
                    .if_not_exists()
                    .col(uuid(CurrentBooks::Id).primary_key())
                    .col(string(CurrentBooks::Title))
                    .col(big_integer(CurrentBooks::CurrentPage))
                    .col(big_integer(CurrentBooks::TotalPages))
                    .to_owned(),
            )
            .await?;

        // Titles are the join key but are not unique.
        manager
            .create_index(
                Index::create()
                    .name("idx_current_books_title")
                    .table(CurrentBooks::Table)
                    .col(CurrentBooks::Title)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(CurrentBooks::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum CurrentBooks {
    Table,
    Id,
    Title,
    CurrentPage,
    TotalPages,
}
