use sea_orm::entity::prelude::*;

/// Customer record. Soft-deleted through `activo`.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "clients")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub nombre: String,
    pub apellidos: String,
    #[sea_orm(unique)]
    pub email: String,
    pub telefono: String,
    #[sea_orm(unique)]
    pub nif: String,
    pub direccion: String,
    pub creador: String,
    pub compania_id: Option<Uuid>,
    pub activo: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::companies::Entity",
        from = "Column::CompaniaId",
        to = "super::companies::Column::Id"
    )]
    Company,
    #[sea_orm(has_many = "super::projects::Entity")]
    Projects,
}

impl Related<super::companies::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Company.def()
    }
}

impl Related<super::projects::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Projects.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
