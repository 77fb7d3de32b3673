use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Clients::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Clients::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Clients::Nombre).string().not_null())
                    .col(ColumnDef::new(Clients::Apellidos).string().not_null())
                    .col(ColumnDef::new(Clients::Email).string().not_null().unique_key())
                    .col(ColumnDef::new(Clients::Telefono).string().not_null())
                    .col(ColumnDef::new(Clients::Nif).string().not_null().unique_key())
                    .col(ColumnDef::new(Clients::Direccion).string().not_null())
                    .col(ColumnDef::new(Clients::Creador).string().not_null())
                    .col(ColumnDef::new(Clients::CompaniaId).uuid().null())
                    .col(
                        ColumnDef::new(Clients::Activo)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Clients::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Clients::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Clients::Table, Clients::CompaniaId)
                            .to(Companies::Table, Companies::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .table(Clients::Table)
                    .col(Clients::Creador)
                    .name("idx_clients_creador")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Clients::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Clients {
    Table,
    Id,
    Nombre,
    Apellidos,
    Email,
    Telefono,
    Nif,
    Direccion,
    Creador,
    CompaniaId,
    Activo,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Companies {
    Table,
    Id,
}
