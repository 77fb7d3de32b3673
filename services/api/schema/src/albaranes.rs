use sea_orm::entity::prelude::*;

/// Delivery note. Entry lists are JSONB arrays replaced wholesale on save;
/// totals are recomputed by the service before every write.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "albaranes")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub number: String,
    pub project_id: Uuid,
    /// Snapshot of the project's client at creation time.
    pub client_id: Uuid,
    pub created_by: String,
    pub date: chrono::DateTime<chrono::Utc>,
    pub hours_entries: Json,
    pub material_entries: Json,
    pub observations: Option<String>,
    pub total_hours: f64,
    pub total_materials: f64,
    pub total_amount: f64,
    pub is_signed: bool,
    pub signature_date: Option<chrono::DateTime<chrono::Utc>>,
    pub signed_by: Option<String>,
    pub signature_image: Option<String>,
    pub status: String,
    pub pdf_url: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::projects::Entity",
        from = "Column::ProjectId",
        to = "super::projects::Column::Id"
    )]
    Project,
    #[sea_orm(
        belongs_to = "super::clients::Entity",
        from = "Column::ClientId",
        to = "super::clients::Column::Id"
    )]
    Client,
}

impl Related<super::projects::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Project.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
