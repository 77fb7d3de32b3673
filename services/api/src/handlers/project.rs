use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use albaran_auth_types::identity::Identity;
use albaran_domain::status::ProjectStatus;

use crate::domain::types::{Project, ProjectFilter};
use crate::error::ApiError;
use crate::handlers::AckResponse;
use crate::state::AppState;
use crate::usecase::project::{
    CreateProjectInput, CreateProjectUseCase, DeleteProjectUseCase, GetProjectUseCase,
    ListProjectsUseCase, ProjectPatch, UpdateProjectUseCase,
};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectResponse {
    pub id: Uuid,
    pub titulo: String,
    pub descripcion: String,
    #[serde(serialize_with = "albaran_core::serde::to_rfc3339_ms")]
    pub fecha_inicio: chrono::DateTime<chrono::Utc>,
    #[serde(serialize_with = "albaran_core::serde::to_rfc3339_ms")]
    pub fecha_fin: chrono::DateTime<chrono::Utc>,
    pub estado: ProjectStatus,
    pub presupuesto: f64,
    pub cliente: Uuid,
    pub compania: Option<Uuid>,
    pub creador: String,
    pub activo: bool,
    #[serde(serialize_with = "albaran_core::serde::to_rfc3339_ms")]
    pub created_at: chrono::DateTime<chrono::Utc>,
    #[serde(serialize_with = "albaran_core::serde::to_rfc3339_ms")]
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<Project> for ProjectResponse {
    fn from(p: Project) -> Self {
        Self {
            id: p.id,
            titulo: p.titulo,
            descripcion: p.descripcion,
            fecha_inicio: p.fecha_inicio,
            fecha_fin: p.fecha_fin,
            estado: p.estado,
            presupuesto: p.presupuesto,
            cliente: p.cliente,
            compania: p.compania,
            creador: p.creador,
            activo: p.activo,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

async fn list(
    state: &AppState,
    filter: ProjectFilter,
) -> Result<Json<Vec<ProjectResponse>>, ApiError> {
    let usecase = ListProjectsUseCase {
        projects: state.project_repo(),
    };
    let projects = usecase.execute(filter).await?;
    Ok(Json(projects.into_iter().map(Into::into).collect()))
}

// ── POST /api/projects ───────────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateProjectRequest {
    pub titulo: Option<String>,
    pub descripcion: Option<String>,
    #[serde(default, deserialize_with = "albaran_core::serde::deserialize_optional_datetime")]
    pub fecha_inicio: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(default, deserialize_with = "albaran_core::serde::deserialize_optional_datetime")]
    pub fecha_fin: Option<chrono::DateTime<chrono::Utc>>,
    pub estado: Option<ProjectStatus>,
    pub presupuesto: Option<f64>,
    pub cliente_id: Option<Uuid>,
    pub compania_id: Option<Uuid>,
}

pub async fn create_project(
    identity: Identity,
    State(state): State<AppState>,
    Json(body): Json<CreateProjectRequest>,
) -> Result<(StatusCode, Json<ProjectResponse>), ApiError> {
    let usecase = CreateProjectUseCase {
        projects: state.project_repo(),
        clients: state.client_repo(),
        companies: state.company_repo(),
        users: state.user_repo(),
    };
    let project = usecase
        .execute(
            &identity.email,
            CreateProjectInput {
                titulo: body.titulo,
                descripcion: body.descripcion,
                fecha_inicio: body.fecha_inicio,
                fecha_fin: body.fecha_fin,
                estado: body.estado,
                presupuesto: body.presupuesto,
                cliente: body.cliente_id,
                compania: body.compania_id,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(project.into())))
}

// ── GET /api/projects ────────────────────────────────────────────────────────

pub async fn list_projects(
    _identity: Identity,
    State(state): State<AppState>,
) -> Result<Json<Vec<ProjectResponse>>, ApiError> {
    list(&state, ProjectFilter::All).await
}

// ── GET /api/projects/me ─────────────────────────────────────────────────────

pub async fn list_my_projects(
    identity: Identity,
    State(state): State<AppState>,
) -> Result<Json<Vec<ProjectResponse>>, ApiError> {
    list(&state, ProjectFilter::Creador(identity.email)).await
}

// ── GET /api/projects/client/{id} ────────────────────────────────────────────

pub async fn list_client_projects(
    _identity: Identity,
    State(state): State<AppState>,
    Path(client_id): Path<Uuid>,
) -> Result<Json<Vec<ProjectResponse>>, ApiError> {
    list(&state, ProjectFilter::Cliente(client_id)).await
}

// ── GET /api/projects/company/{id} ───────────────────────────────────────────

pub async fn list_company_projects(
    _identity: Identity,
    State(state): State<AppState>,
    Path(company_id): Path<Uuid>,
) -> Result<Json<Vec<ProjectResponse>>, ApiError> {
    list(&state, ProjectFilter::Compania(company_id)).await
}

// ── GET /api/projects/{id} ───────────────────────────────────────────────────

pub async fn get_project(
    _identity: Identity,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ProjectResponse>, ApiError> {
    let usecase = GetProjectUseCase {
        projects: state.project_repo(),
    };
    Ok(Json(usecase.execute(id).await?.into()))
}

// ── PUT /api/projects/{id} ───────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateProjectRequest {
    pub titulo: Option<String>,
    pub descripcion: Option<String>,
    #[serde(default, deserialize_with = "albaran_core::serde::deserialize_optional_datetime")]
    pub fecha_inicio: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(default, deserialize_with = "albaran_core::serde::deserialize_optional_datetime")]
    pub fecha_fin: Option<chrono::DateTime<chrono::Utc>>,
    pub estado: Option<ProjectStatus>,
    pub presupuesto: Option<f64>,
    pub cliente_id: Option<Uuid>,
    #[serde(default, deserialize_with = "albaran_core::serde::deserialize_double_option")]
    pub compania_id: Option<Option<Uuid>>,
}

pub async fn update_project(
    identity: Identity,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateProjectRequest>,
) -> Result<Json<ProjectResponse>, ApiError> {
    let usecase = UpdateProjectUseCase {
        projects: state.project_repo(),
        clients: state.client_repo(),
        companies: state.company_repo(),
    };
    let project = usecase
        .execute(
            id,
            &identity.email,
            ProjectPatch {
                titulo: body.titulo,
                descripcion: body.descripcion,
                fecha_inicio: body.fecha_inicio,
                fecha_fin: body.fecha_fin,
                estado: body.estado,
                presupuesto: body.presupuesto,
                cliente: body.cliente_id,
                compania: body.compania_id,
            },
        )
        .await?;
    Ok(Json(project.into()))
}

// ── DELETE /api/projects/{id} ────────────────────────────────────────────────

pub async fn delete_project(
    identity: Identity,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<AckResponse>, ApiError> {
    let usecase = DeleteProjectUseCase {
        projects: state.project_repo(),
        companies: state.company_repo(),
    };
    usecase.execute(id, &identity.email).await?;
    Ok(Json(AckResponse::ok("project deleted")))
}
