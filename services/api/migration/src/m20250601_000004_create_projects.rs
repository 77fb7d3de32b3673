use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Projects::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Projects::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Projects::Titulo).string().not_null())
                    .col(ColumnDef::new(Projects::Descripcion).text().not_null())
                    .col(
                        ColumnDef::new(Projects::FechaInicio)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Projects::FechaFin)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Projects::Estado)
                            .string()
                            .not_null()
                            .default("Pendiente"),
                    )
                    .col(ColumnDef::new(Projects::Presupuesto).double().not_null())
                    .col(ColumnDef::new(Projects::ClienteId).uuid().not_null())
                    .col(ColumnDef::new(Projects::CompaniaId).uuid().null())
                    .col(ColumnDef::new(Projects::Creador).string().not_null())
                    .col(
                        ColumnDef::new(Projects::Activo)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Projects::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Projects::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Projects::Table, Projects::ClienteId)
                            .to(Clients::Table, Clients::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Projects::Table, Projects::CompaniaId)
                            .to(Companies::Table, Companies::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .table(Projects::Table)
                    .col(Projects::ClienteId)
                    .name("idx_projects_cliente_id")
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .table(Projects::Table)
                    .col(Projects::Creador)
                    .name("idx_projects_creador")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Projects::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Projects {
    Table,
    Id,
    Titulo,
    Descripcion,
    FechaInicio,
    FechaFin,
    Estado,
    Presupuesto,
    ClienteId,
    CompaniaId,
    Creador,
    Activo,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Clients {
    Table,
    Id,
}

#[derive(Iden)]
enum Companies {
    Table,
    Id,
}
