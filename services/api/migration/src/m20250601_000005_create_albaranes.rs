use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Albaranes::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Albaranes::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Albaranes::Number).string().not_null().unique_key())
                    .col(ColumnDef::new(Albaranes::ProjectId).uuid().not_null())
                    .col(ColumnDef::new(Albaranes::ClientId).uuid().not_null())
                    .col(ColumnDef::new(Albaranes::CreatedBy).string().not_null())
                    .col(
                        ColumnDef::new(Albaranes::Date)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Albaranes::HoursEntries)
                            .json_binary()
                            .not_null()
                            .default(Expr::cust("'[]'::jsonb")),
                    )
                    .col(
                        ColumnDef::new(Albaranes::MaterialEntries)
                            .json_binary()
                            .not_null()
                            .default(Expr::cust("'[]'::jsonb")),
                    )
                    .col(ColumnDef::new(Albaranes::Observations).text().null())
                    .col(
                        ColumnDef::new(Albaranes::TotalHours)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(
                        ColumnDef::new(Albaranes::TotalMaterials)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(
                        ColumnDef::new(Albaranes::TotalAmount)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(
                        ColumnDef::new(Albaranes::IsSigned)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Albaranes::SignatureDate)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(ColumnDef::new(Albaranes::SignedBy).string().null())
                    .col(ColumnDef::new(Albaranes::SignatureImage).text().null())
                    .col(
                        ColumnDef::new(Albaranes::Status)
                            .string()
                            .not_null()
                            .default("draft"),
                    )
                    .col(ColumnDef::new(Albaranes::PdfUrl).string().null())
                    .col(
                        ColumnDef::new(Albaranes::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Albaranes::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Albaranes::Table, Albaranes::ProjectId)
                            .to(Projects::Table, Projects::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Albaranes::Table, Albaranes::ClientId)
                            .to(Clients::Table, Clients::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .table(Albaranes::Table)
                    .col(Albaranes::ProjectId)
                    .name("idx_albaranes_project_id")
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .table(Albaranes::Table)
                    .col(Albaranes::CreatedBy)
                    .name("idx_albaranes_created_by")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Albaranes::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Albaranes {
    Table,
    Id,
    Number,
    ProjectId,
    ClientId,
    CreatedBy,
    Date,
    HoursEntries,
    MaterialEntries,
    Observations,
    TotalHours,
    TotalMaterials,
    TotalAmount,
    IsSigned,
    SignatureDate,
    SignedBy,
    SignatureImage,
    Status,
    PdfUrl,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Projects {
    Table,
    Id,
}

#[derive(Iden)]
enum Clients {
    Table,
    Id,
}
