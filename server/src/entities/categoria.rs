use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "categorias")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub descricao: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::tarefa::Entity")]
    Tarefa,
}

impl Related<super::tarefa::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Tarefa.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
