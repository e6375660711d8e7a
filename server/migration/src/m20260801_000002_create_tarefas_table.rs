use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Tarefas::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Tarefas::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Tarefas::Descricao).string().not_null())
                    .col(ColumnDef::new(Tarefas::IdCategoria).integer().not_null())
                    .col(
                        ColumnDef::new(Tarefas::DataConclusao)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(ColumnDef::new(Tarefas::Usuario).string().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_tarefas_id_categoria")
                            .from(Tarefas::Table, Tarefas::IdCategoria)
                            .to(Categorias::Table, Categorias::Id),
                    )
                    .to_owned(),
            )
            .await?;

        // Every query is scoped by owner, so index the owner column.
        manager
            .create_index(
                Index::create()
                    .name("idx_tarefas_usuario")
                    .table(Tarefas::Table)
                    .col(Tarefas::Usuario)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_tarefas_usuario")
                    .table(Tarefas::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .drop_table(Table::drop().table(Tarefas::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Tarefas {
    Table,
    Id,
    Descricao,
    IdCategoria,
    DataConclusao,
    Usuario,
}

#[derive(DeriveIden)]
enum Categorias {
    Table,
    Id,
}
