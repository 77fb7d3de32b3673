use anyhow::Context as _;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, Condition, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, sea_query::Expr,
};
use uuid::Uuid;

use albaran_api_schema::{albaranes, clients, companies, projects, users};
use albaran_domain::status::AlbaranStatus;

use crate::domain::repository::{
    AlbaranRepository, ClientRepository, CompanyRepository, ProjectRepository, UserRepository,
};
use crate::domain::types::{
    Albaran, AlbaranFilter, Client, ClientFilter, Company, Project, ProjectFilter, User,
};
use crate::error::ApiError;

// ── User repository ──────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbUserRepository {
    pub db: DatabaseConnection,
}

impl UserRepository for DbUserRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, ApiError> {
        let model = users::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find user by id")?;
        Ok(model.map(user_from_model))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, ApiError> {
        let model = users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.db)
            .await
            .context("find user by email")?;
        Ok(model.map(user_from_model))
    }

    async fn find_by_emails(&self, emails: &[String]) -> Result<Vec<User>, ApiError> {
        if emails.is_empty() {
            return Ok(vec![]);
        }
        let models = users::Entity::find()
            .filter(users::Column::Email.is_in(emails.iter().cloned()))
            .all(&self.db)
            .await
            .context("find users by emails")?;
        Ok(models.into_iter().map(user_from_model).collect())
    }

    async fn create(&self, user: &User) -> Result<(), ApiError> {
        user_to_active(user)
            .insert(&self.db)
            .await
            .context("create user")?;
        Ok(())
    }

    async fn update(&self, user: &User) -> Result<(), ApiError> {
        user_to_active(user)
            .update(&self.db)
            .await
            .context("update user")?;
        Ok(())
    }
}

fn user_to_active(user: &User) -> users::ActiveModel {
    users::ActiveModel {
        id: Set(user.id),
        email: Set(user.email.clone()),
        password_hash: Set(user.password_hash.clone()),
        nombre: Set(user.nombre.clone()),
        apellidos: Set(user.apellidos.clone()),
        nif: Set(user.nif.clone()),
        direccion: Set(user.direccion.clone()),
        is_validated: Set(user.is_validated),
        validation_code: Set(user.validation_code.clone()),
        validation_code_expires: Set(user.validation_code_expires),
        created_at: Set(user.created_at),
        updated_at: Set(user.updated_at),
    }
}

fn user_from_model(model: users::Model) -> User {
    User {
        id: model.id,
        email: model.email,
        password_hash: model.password_hash,
        nombre: model.nombre,
        apellidos: model.apellidos,
        nif: model.nif,
        direccion: model.direccion,
        is_validated: model.is_validated,
        validation_code: model.validation_code,
        validation_code_expires: model.validation_code_expires,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

// ── Company repository ───────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbCompanyRepository {
    pub db: DatabaseConnection,
}

impl CompanyRepository for DbCompanyRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Company>, ApiError> {
        let model = companies::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find company by id")?;
        Ok(model.map(company_from_model).transpose()?)
    }

    async fn find_by_nif(&self, nif: &str) -> Result<Option<Company>, ApiError> {
        let model = companies::Entity::find()
            .filter(companies::Column::Nif.eq(nif))
            .one(&self.db)
            .await
            .context("find company by nif")?;
        Ok(model.map(company_from_model).transpose()?)
    }

    async fn list_by_member(&self, email: &str) -> Result<Vec<Company>, ApiError> {
        let models = companies::Entity::find()
            .filter(
                Condition::any()
                    .add(companies::Column::Jefe.eq(email))
                    .add(Expr::cust_with_values(
                        "miembros @> $1",
                        [serde_json::json!([email])],
                    )),
            )
            .order_by_asc(companies::Column::CreatedAt)
            .all(&self.db)
            .await
            .context("list companies by member")?;
        Ok(models
            .into_iter()
            .map(company_from_model)
            .collect::<anyhow::Result<_>>()?)
    }

    async fn create(&self, company: &Company) -> Result<(), ApiError> {
        companies::ActiveModel {
            id: Set(company.id),
            nif: Set(company.nif.clone()),
            nombre: Set(company.nombre.clone()),
            jefe: Set(company.jefe.clone()),
            miembros: Set(serde_json::to_value(&company.miembros).context("encode miembros")?),
            created_at: Set(company.created_at),
            updated_at: Set(company.updated_at),
        }
        .insert(&self.db)
        .await
        .context("create company")?;
        Ok(())
    }
}

fn company_from_model(model: companies::Model) -> anyhow::Result<Company> {
    Ok(Company {
        id: model.id,
        nif: model.nif,
        nombre: model.nombre,
        jefe: model.jefe,
        miembros: serde_json::from_value(model.miembros).context("decode miembros")?,
        created_at: model.created_at,
        updated_at: model.updated_at,
    })
}

// ── Client repository ────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbClientRepository {
    pub db: DatabaseConnection,
}

impl ClientRepository for DbClientRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Client>, ApiError> {
        let model = clients::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find client by id")?;
        Ok(model.map(client_from_model))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Client>, ApiError> {
        let model = clients::Entity::find()
            .filter(clients::Column::Email.eq(email))
            .one(&self.db)
            .await
            .context("find client by email")?;
        Ok(model.map(client_from_model))
    }

    async fn find_by_nif(&self, nif: &str) -> Result<Option<Client>, ApiError> {
        let model = clients::Entity::find()
            .filter(clients::Column::Nif.eq(nif))
            .one(&self.db)
            .await
            .context("find client by nif")?;
        Ok(model.map(client_from_model))
    }

    async fn list_active(&self, filter: ClientFilter) -> Result<Vec<Client>, ApiError> {
        let mut query = clients::Entity::find().filter(clients::Column::Activo.eq(true));
        query = match filter {
            ClientFilter::All => query,
            ClientFilter::Creador(email) => query.filter(clients::Column::Creador.eq(email)),
            ClientFilter::Compania(id) => query.filter(clients::Column::CompaniaId.eq(id)),
        };
        let models = query
            .order_by_desc(clients::Column::CreatedAt)
            .all(&self.db)
            .await
            .context("list clients")?;
        Ok(models.into_iter().map(client_from_model).collect())
    }

    async fn create(&self, client: &Client) -> Result<(), ApiError> {
        client_to_active(client)
            .insert(&self.db)
            .await
            .context("create client")?;
        Ok(())
    }

    async fn update(&self, client: &Client) -> Result<(), ApiError> {
        client_to_active(client)
            .update(&self.db)
            .await
            .context("update client")?;
        Ok(())
    }
}

fn client_to_active(client: &Client) -> clients::ActiveModel {
    clients::ActiveModel {
        id: Set(client.id),
        nombre: Set(client.nombre.clone()),
        apellidos: Set(client.apellidos.clone()),
        email: Set(client.email.clone()),
        telefono: Set(client.telefono.clone()),
        nif: Set(client.nif.clone()),
        direccion: Set(client.direccion.clone()),
        creador: Set(client.creador.clone()),
        compania_id: Set(client.compania),
        activo: Set(client.activo),
        created_at: Set(client.created_at),
        updated_at: Set(client.updated_at),
    }
}

fn client_from_model(model: clients::Model) -> Client {
    Client {
        id: model.id,
        nombre: model.nombre,
        apellidos: model.apellidos,
        email: model.email,
        telefono: model.telefono,
        nif: model.nif,
        direccion: model.direccion,
        creador: model.creador,
        compania: model.compania_id,
        activo: model.activo,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

// ── Project repository ───────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbProjectRepository {
    pub db: DatabaseConnection,
}

impl ProjectRepository for DbProjectRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Project>, ApiError> {
        let model = projects::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find project by id")?;
        Ok(model.map(project_from_model).transpose()?)
    }

    async fn list_active(&self, filter: ProjectFilter) -> Result<Vec<Project>, ApiError> {
        let mut query = projects::Entity::find().filter(projects::Column::Activo.eq(true));
        query = match filter {
            ProjectFilter::All => query,
            ProjectFilter::Creador(email) => query.filter(projects::Column::Creador.eq(email)),
            ProjectFilter::Cliente(id) => query.filter(projects::Column::ClienteId.eq(id)),
            ProjectFilter::Compania(id) => query.filter(projects::Column::CompaniaId.eq(id)),
        };
        let models = query
            .order_by_desc(projects::Column::CreatedAt)
            .all(&self.db)
            .await
            .context("list projects")?;
        Ok(models
            .into_iter()
            .map(project_from_model)
            .collect::<anyhow::Result<_>>()?)
    }

    async fn create(&self, project: &Project) -> Result<(), ApiError> {
        project_to_active(project)
            .insert(&self.db)
            .await
            .context("create project")?;
        Ok(())
    }

    async fn update(&self, project: &Project) -> Result<(), ApiError> {
        project_to_active(project)
            .update(&self.db)
            .await
            .context("update project")?;
        Ok(())
    }
}

fn project_to_active(project: &Project) -> projects::ActiveModel {
    projects::ActiveModel {
        id: Set(project.id),
        titulo: Set(project.titulo.clone()),
        descripcion: Set(project.descripcion.clone()),
        fecha_inicio: Set(project.fecha_inicio),
        fecha_fin: Set(project.fecha_fin),
        estado: Set(project.estado.as_str().to_owned()),
        presupuesto: Set(project.presupuesto),
        cliente_id: Set(project.cliente),
        compania_id: Set(project.compania),
        creador: Set(project.creador.clone()),
        activo: Set(project.activo),
        created_at: Set(project.created_at),
        updated_at: Set(project.updated_at),
    }
}

fn project_from_model(model: projects::Model) -> anyhow::Result<Project> {
    Ok(Project {
        id: model.id,
        titulo: model.titulo,
        descripcion: model.descripcion,
        fecha_inicio: model.fecha_inicio,
        fecha_fin: model.fecha_fin,
        estado: model.estado.parse().context("decode project estado")?,
        presupuesto: model.presupuesto,
        cliente: model.cliente_id,
        compania: model.compania_id,
        creador: model.creador,
        activo: model.activo,
        created_at: model.created_at,
        updated_at: model.updated_at,
    })
}

// ── Albaran repository ───────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbAlbaranRepository {
    pub db: DatabaseConnection,
}

impl AlbaranRepository for DbAlbaranRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Albaran>, ApiError> {
        let model = albaranes::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find albaran by id")?;
        Ok(model.map(albaran_from_model).transpose()?)
    }

    async fn list(&self, filter: AlbaranFilter) -> Result<Vec<Albaran>, ApiError> {
        let mut query = albaranes::Entity::find()
            .filter(albaranes::Column::Status.ne(AlbaranStatus::Cancelled.as_str()));
        query = match filter {
            AlbaranFilter::All => query,
            AlbaranFilter::CreatedBy(email) => query.filter(albaranes::Column::CreatedBy.eq(email)),
            AlbaranFilter::Project(id) => query.filter(albaranes::Column::ProjectId.eq(id)),
            AlbaranFilter::Client(id) => query.filter(albaranes::Column::ClientId.eq(id)),
        };
        let models = query
            .order_by_desc(albaranes::Column::CreatedAt)
            .all(&self.db)
            .await
            .context("list albaranes")?;
        Ok(models
            .into_iter()
            .map(albaran_from_model)
            .collect::<anyhow::Result<_>>()?)
    }

    async fn count_with_prefix(&self, prefix: &str) -> Result<u64, ApiError> {
        let count = albaranes::Entity::find()
            .filter(albaranes::Column::Number.starts_with(prefix))
            .count(&self.db)
            .await
            .context("count albaranes by number prefix")?;
        Ok(count)
    }

    async fn create(&self, albaran: &Albaran) -> Result<(), ApiError> {
        albaran_to_active(albaran)?
            .insert(&self.db)
            .await
            .context("create albaran")?;
        Ok(())
    }

    async fn update(&self, albaran: &Albaran) -> Result<(), ApiError> {
        albaran_to_active(albaran)?
            .update(&self.db)
            .await
            .context("update albaran")?;
        Ok(())
    }
}

fn albaran_to_active(albaran: &Albaran) -> anyhow::Result<albaranes::ActiveModel> {
    Ok(albaranes::ActiveModel {
        id: Set(albaran.id),
        number: Set(albaran.number.clone()),
        project_id: Set(albaran.project),
        client_id: Set(albaran.client),
        created_by: Set(albaran.created_by.clone()),
        date: Set(albaran.date),
        hours_entries: Set(
            serde_json::to_value(&albaran.hours_entries).context("encode hours entries")?
        ),
        material_entries: Set(
            serde_json::to_value(&albaran.material_entries).context("encode material entries")?
        ),
        observations: Set(albaran.observations.clone()),
        total_hours: Set(albaran.total_hours),
        total_materials: Set(albaran.total_materials),
        total_amount: Set(albaran.total_amount),
        is_signed: Set(albaran.is_signed),
        signature_date: Set(albaran.signature_date),
        signed_by: Set(albaran.signed_by.clone()),
        signature_image: Set(albaran.signature_image.clone()),
        status: Set(albaran.status.as_str().to_owned()),
        pdf_url: Set(albaran.pdf_url.clone()),
        created_at: Set(albaran.created_at),
        updated_at: Set(albaran.updated_at),
    })
}

fn albaran_from_model(model: albaranes::Model) -> anyhow::Result<Albaran> {
    Ok(Albaran {
        id: model.id,
        number: model.number,
        project: model.project_id,
        client: model.client_id,
        created_by: model.created_by,
        date: model.date,
        hours_entries: serde_json::from_value(model.hours_entries)
            .context("decode hours entries")?,
        material_entries: serde_json::from_value(model.material_entries)
            .context("decode material entries")?,
        observations: model.observations,
        total_hours: model.total_hours,
        total_materials: model.total_materials,
        total_amount: model.total_amount,
        is_signed: model.is_signed,
        signature_date: model.signature_date,
        signed_by: model.signed_by,
        signature_image: model.signature_image,
        status: model.status.parse().context("decode albaran status")?,
        pdf_url: model.pdf_url,
        created_at: model.created_at,
        updated_at: model.updated_at,
    })
}
