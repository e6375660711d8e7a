use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

const DEFAULT_CATEGORIAS: [&str; 3] = ["Pessoal", "Trabalho", "Estudos"];

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Categorias::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Categorias::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Categorias::Descricao).string().not_null())
                    .to_owned(),
            )
            .await?;

        for descricao in DEFAULT_CATEGORIAS {
            manager
                .exec_stmt(
                    Query::insert()
                        .into_table(Categorias::Table)
                        .columns([Categorias::Descricao])
                        .values_panic([descricao.into()])
                        .to_owned(),
                )
                .await?;
        }
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Categorias::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Categorias {
    Table,
    Id,
    Descricao,
}
