use sea_orm::entity::prelude::*;

/// Unit of work for one client. `estado` holds the status label
/// (`Pendiente`, `En progreso`, ...). Soft-deleted through `activo`.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "projects")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub titulo: String,
    pub descripcion: String,
    pub fecha_inicio: chrono::DateTime<chrono::Utc>,
    pub fecha_fin: chrono::DateTime<chrono::Utc>,
    pub estado: String,
    pub presupuesto: f64,
    pub cliente_id: Uuid,
    pub compania_id: Option<Uuid>,
    pub creador: String,
    pub activo: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::clients::Entity",
        from = "Column::ClienteId",
        to = "super::clients::Column::Id"
    )]
    Client,
    #[sea_orm(
        belongs_to = "super::companies::Entity",
        from = "Column::CompaniaId",
        to = "super::companies::Column::Id"
    )]
    Company,
    #[sea_orm(has_many = "super::albaranes::Entity")]
    Albaranes,
}

impl Related<super::clients::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Client.def()
    }
}

impl Related<super::companies::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Company.def()
    }
}

impl Related<super::albaranes::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Albaranes.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
