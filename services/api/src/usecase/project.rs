use chrono::{DateTime, Utc};
use uuid::Uuid;

use albaran_domain::schema::{FieldRule, FieldValue, Rule, Validate, validate};
use albaran_domain::status::ProjectStatus;

use crate::domain::repository::{
    ClientRepository, CompanyRepository, ProjectRepository, UserRepository,
};
use crate::domain::types::{Client, Project, ProjectFilter};
use crate::error::{ApiError, Resource};
use crate::usecase::access::{ensure_owner_or_member, member_company, validated_user};

/// A client that a project may be attached to: present and active.
async fn active_client<R: ClientRepository>(clients: &R, id: Uuid) -> Result<Client, ApiError> {
    let client = clients
        .find_by_id(id)
        .await?
        .ok_or(ApiError::NotFound(Resource::Client))?;
    if !client.activo {
        return Err(ApiError::Inactive(Resource::Client));
    }
    Ok(client)
}

fn ensure_range(inicio: DateTime<Utc>, fin: DateTime<Utc>) -> Result<(), ApiError> {
    if inicio >= fin {
        return Err(ApiError::DateRange);
    }
    Ok(())
}

// ── CreateProject ────────────────────────────────────────────────────────────

pub struct CreateProjectInput {
    pub titulo: Option<String>,
    pub descripcion: Option<String>,
    pub fecha_inicio: Option<DateTime<Utc>>,
    pub fecha_fin: Option<DateTime<Utc>>,
    pub estado: Option<ProjectStatus>,
    pub presupuesto: Option<f64>,
    pub cliente: Option<Uuid>,
    pub compania: Option<Uuid>,
}

impl Validate for CreateProjectInput {
    const SCHEMA: &'static [FieldRule] = &[
        FieldRule::new("titulo", &[Rule::Required]),
        FieldRule::new("descripcion", &[Rule::Required]),
        FieldRule::new("fechaInicio", &[Rule::Required]),
        FieldRule::new("fechaFin", &[Rule::Required]),
        FieldRule::new("presupuesto", &[Rule::Required, Rule::NonNegative]),
        FieldRule::new("clienteId", &[Rule::Required]),
    ];

    fn value(&self, field: &str) -> FieldValue<'_> {
        match field {
            "titulo" => FieldValue::text(&self.titulo),
            "descripcion" => FieldValue::text(&self.descripcion),
            "fechaInicio" => FieldValue::presence(&self.fecha_inicio),
            "fechaFin" => FieldValue::presence(&self.fecha_fin),
            "presupuesto" => FieldValue::number(self.presupuesto),
            "clienteId" => FieldValue::presence(&self.cliente),
            _ => FieldValue::Absent,
        }
    }
}

pub struct CreateProjectUseCase<P, R, C, U>
where
    P: ProjectRepository,
    R: ClientRepository,
    C: CompanyRepository,
    U: UserRepository,
{
    pub projects: P,
    pub clients: R,
    pub companies: C,
    pub users: U,
}

impl<P, R, C, U> CreateProjectUseCase<P, R, C, U>
where
    P: ProjectRepository,
    R: ClientRepository,
    C: CompanyRepository,
    U: UserRepository,
{
    pub async fn execute(&self, actor: &str, input: CreateProjectInput) -> Result<Project, ApiError> {
        validate(&input)?;
        let (Some(cliente), Some(fecha_inicio), Some(fecha_fin)) =
            (input.cliente, input.fecha_inicio, input.fecha_fin)
        else {
            return Err(ApiError::Validation("clienteId is required".into()));
        };

        // 1. Client must exist and be active
        active_client(&self.clients, cliente).await?;

        // 2. Creator must be a validated user
        validated_user(&self.users, actor).await?;

        // 3. Optional company must include the creator
        if let Some(id) = input.compania {
            member_company(&self.companies, id, actor).await?;
        }

        // 4. Strict date range
        ensure_range(fecha_inicio, fecha_fin)?;

        let now = Utc::now();
        let project = Project {
            id: Uuid::new_v4(),
            titulo: input.titulo.unwrap_or_default(),
            descripcion: input.descripcion.unwrap_or_default(),
            fecha_inicio,
            fecha_fin,
            estado: input.estado.unwrap_or_default(),
            presupuesto: input.presupuesto.unwrap_or_default(),
            cliente,
            compania: input.compania,
            creador: actor.to_owned(),
            activo: true,
            created_at: now,
            updated_at: now,
        };
        self.projects.create(&project).await?;
        tracing::info!(project_id = %project.id, "project created");
        Ok(project)
    }
}

// ── ListProjects ─────────────────────────────────────────────────────────────

pub struct ListProjectsUseCase<P: ProjectRepository> {
    pub projects: P,
}

impl<P: ProjectRepository> ListProjectsUseCase<P> {
    pub async fn execute(&self, filter: ProjectFilter) -> Result<Vec<Project>, ApiError> {
        self.projects.list_active(filter).await
    }
}

// ── GetProject ───────────────────────────────────────────────────────────────

pub struct GetProjectUseCase<P: ProjectRepository> {
    pub projects: P,
}

impl<P: ProjectRepository> GetProjectUseCase<P> {
    pub async fn execute(&self, id: Uuid) -> Result<Project, ApiError> {
        self.projects
            .find_by_id(id)
            .await?
            .ok_or(ApiError::NotFound(Resource::Project))
    }
}

// ── UpdateProject ────────────────────────────────────────────────────────────

/// Mutable project fields. `compania: Some(None)` detaches the company.
#[derive(Default)]
pub struct ProjectPatch {
    pub titulo: Option<String>,
    pub descripcion: Option<String>,
    pub fecha_inicio: Option<DateTime<Utc>>,
    pub fecha_fin: Option<DateTime<Utc>>,
    pub estado: Option<ProjectStatus>,
    pub presupuesto: Option<f64>,
    pub cliente: Option<Uuid>,
    pub compania: Option<Option<Uuid>>,
}

impl Validate for ProjectPatch {
    const SCHEMA: &'static [FieldRule] = &[
        FieldRule::new("titulo", &[Rule::NonEmpty]),
        FieldRule::new("descripcion", &[Rule::NonEmpty]),
        FieldRule::new("presupuesto", &[Rule::NonNegative]),
    ];

    fn value(&self, field: &str) -> FieldValue<'_> {
        match field {
            "titulo" => FieldValue::text(&self.titulo),
            "descripcion" => FieldValue::text(&self.descripcion),
            "presupuesto" => FieldValue::number(self.presupuesto),
            _ => FieldValue::Absent,
        }
    }
}

pub struct UpdateProjectUseCase<P, R, C>
where
    P: ProjectRepository,
    R: ClientRepository,
    C: CompanyRepository,
{
    pub projects: P,
    pub clients: R,
    pub companies: C,
}

impl<P, R, C> UpdateProjectUseCase<P, R, C>
where
    P: ProjectRepository,
    R: ClientRepository,
    C: CompanyRepository,
{
    pub async fn execute(&self, id: Uuid, actor: &str, patch: ProjectPatch) -> Result<Project, ApiError> {
        // 1. Exists → 404
        let mut project = self
            .projects
            .find_by_id(id)
            .await?
            .ok_or(ApiError::NotFound(Resource::Project))?;

        // 2. Owner or company member → 403
        ensure_owner_or_member(
            &self.companies,
            actor,
            &project.creador,
            project.compania,
            Resource::Project,
        )
        .await?;

        validate(&patch)?;

        // 3. Reassignments are resolved before anything is applied
        if let Some(cliente) = patch.cliente {
            active_client(&self.clients, cliente).await?;
        }
        if let Some(Some(company_id)) = patch.compania {
            member_company(&self.companies, company_id, actor).await?;
        }

        // 4. The resulting range must still be valid
        let fecha_inicio = patch.fecha_inicio.unwrap_or(project.fecha_inicio);
        let fecha_fin = patch.fecha_fin.unwrap_or(project.fecha_fin);
        if patch.fecha_inicio.is_some() || patch.fecha_fin.is_some() {
            ensure_range(fecha_inicio, fecha_fin)?;
        }

        project.fecha_inicio = fecha_inicio;
        project.fecha_fin = fecha_fin;
        if let Some(cliente) = patch.cliente {
            project.cliente = cliente;
        }
        if let Some(compania) = patch.compania {
            project.compania = compania;
        }
        if let Some(v) = patch.titulo {
            project.titulo = v;
        }
        if let Some(v) = patch.descripcion {
            project.descripcion = v;
        }
        if let Some(v) = patch.estado {
            project.estado = v;
        }
        if let Some(v) = patch.presupuesto {
            project.presupuesto = v;
        }
        project.updated_at = Utc::now();
        self.projects.update(&project).await?;
        Ok(project)
    }
}

// ── DeleteProject ────────────────────────────────────────────────────────────

pub struct DeleteProjectUseCase<P: ProjectRepository, C: CompanyRepository> {
    pub projects: P,
    pub companies: C,
}

impl<P: ProjectRepository, C: CompanyRepository> DeleteProjectUseCase<P, C> {
    /// Soft delete: the row stays, `activo` becomes false.
    pub async fn execute(&self, id: Uuid, actor: &str) -> Result<(), ApiError> {
        let mut project = self
            .projects
            .find_by_id(id)
            .await?
            .ok_or(ApiError::NotFound(Resource::Project))?;
        ensure_owner_or_member(
            &self.companies,
            actor,
            &project.creador,
            project.compania,
            Resource::Project,
        )
        .await?;

        project.activo = false;
        project.updated_at = Utc::now();
        self.projects.update(&project).await?;
        tracing::info!(project_id = %project.id, "project deactivated");
        Ok(())
    }
}
