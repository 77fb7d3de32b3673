use sea_orm_migration::prelude::*;

mod m20250601_000001_create_users;
mod m20250601_000002_create_companies;
mod m20250601_000003_create_clients;
mod m20250601_000004_create_projects;
mod m20250601_000005_create_albaranes;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250601_000001_create_users::Migration),
            Box::new(m20250601_000002_create_companies::Migration),
            Box::new(m20250601_000003_create_clients::Migration),
            Box::new(m20250601_000004_create_projects::Migration),
            Box::new(m20250601_000005_create_albaranes::Migration),
        ]
    }
}
