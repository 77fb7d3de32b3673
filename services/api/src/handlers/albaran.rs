use axum::{
    Json,
    extract::{Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use albaran_auth_types::identity::Identity;
use albaran_domain::status::{AlbaranStatus, ProjectStatus};

use crate::domain::types::{
    Albaran, AlbaranDetails, AlbaranFilter, AlbaranListItem, Client, HoursEntry, MaterialEntry,
    Project,
};
use crate::error::ApiError;
use crate::handlers::AckResponse;
use crate::handlers::user::UserResponse;
use crate::state::AppState;
use crate::usecase::albaran::{
    AlbaranPatch, CreateAlbaranInput, CreateAlbaranUseCase, DeleteAlbaranUseCase,
    GetAlbaranUseCase, HoursEntryInput, ListAlbaranesUseCase, MaterialEntryInput,
    UpdateAlbaranUseCase,
};
use crate::usecase::pdf::GeneratePdfUseCase;

// ── Response types ───────────────────────────────────────────────────────────

/// Fields shared by the list and detail views.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlbaranFields {
    pub id: Uuid,
    pub number: String,
    pub created_by: String,
    #[serde(serialize_with = "albaran_core::serde::to_rfc3339_ms")]
    pub date: chrono::DateTime<chrono::Utc>,
    pub material_entries: Vec<MaterialEntry>,
    pub observations: Option<String>,
    pub total_hours: f64,
    pub total_materials: f64,
    pub total_amount: f64,
    pub is_signed: bool,
    #[serde(serialize_with = "albaran_core::serde::to_rfc3339_ms_opt")]
    pub signature_date: Option<chrono::DateTime<chrono::Utc>>,
    pub signed_by: Option<String>,
    pub signature_image: Option<String>,
    pub status: AlbaranStatus,
    pub pdf_url: Option<String>,
    #[serde(serialize_with = "albaran_core::serde::to_rfc3339_ms")]
    pub created_at: chrono::DateTime<chrono::Utc>,
    #[serde(serialize_with = "albaran_core::serde::to_rfc3339_ms")]
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl AlbaranFields {
    /// Split off the parts each view renders differently.
    fn split(a: Albaran) -> (Self, Uuid, Uuid, Vec<HoursEntry>) {
        let fields = Self {
            id: a.id,
            number: a.number,
            created_by: a.created_by,
            date: a.date,
            material_entries: a.material_entries,
            observations: a.observations,
            total_hours: a.total_hours,
            total_materials: a.total_materials,
            total_amount: a.total_amount,
            is_signed: a.is_signed,
            signature_date: a.signature_date,
            signed_by: a.signed_by,
            signature_image: a.signature_image,
            status: a.status,
            pdf_url: a.pdf_url,
            created_at: a.created_at,
            updated_at: a.updated_at,
        };
        (fields, a.project, a.client, a.hours_entries)
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlbaranResponse {
    #[serde(flatten)]
    pub fields: AlbaranFields,
    pub project: Uuid,
    pub client: Uuid,
    pub hours_entries: Vec<HoursEntry>,
}

impl From<Albaran> for AlbaranResponse {
    fn from(a: Albaran) -> Self {
        let (fields, project, client, hours_entries) = AlbaranFields::split(a);
        Self {
            fields,
            project,
            client,
            hours_entries,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSummary {
    pub id: Uuid,
    pub titulo: String,
    pub descripcion: String,
    #[serde(serialize_with = "albaran_core::serde::to_rfc3339_ms")]
    pub fecha_inicio: chrono::DateTime<chrono::Utc>,
    #[serde(serialize_with = "albaran_core::serde::to_rfc3339_ms")]
    pub fecha_fin: chrono::DateTime<chrono::Utc>,
    pub estado: ProjectStatus,
    pub presupuesto: f64,
}

impl From<Project> for ProjectSummary {
    fn from(p: Project) -> Self {
        Self {
            id: p.id,
            titulo: p.titulo,
            descripcion: p.descripcion,
            fecha_inicio: p.fecha_inicio,
            fecha_fin: p.fecha_fin,
            estado: p.estado,
            presupuesto: p.presupuesto,
        }
    }
}

#[derive(Serialize)]
pub struct ClientSummary {
    pub id: Uuid,
    pub nombre: String,
    pub apellidos: String,
    pub email: String,
    pub telefono: String,
    pub nif: String,
    pub direccion: String,
}

impl From<Client> for ClientSummary {
    fn from(c: Client) -> Self {
        Self {
            id: c.id,
            nombre: c.nombre,
            apellidos: c.apellidos,
            email: c.email,
            telefono: c.telefono,
            nif: c.nif,
            direccion: c.direccion,
        }
    }
}

/// List view: project and client summaries instead of bare ids.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlbaranListItemResponse {
    #[serde(flatten)]
    pub fields: AlbaranFields,
    pub project: Option<ProjectSummary>,
    pub client: Option<ClientSummary>,
    pub hours_entries: Vec<HoursEntry>,
}

impl From<AlbaranListItem> for AlbaranListItemResponse {
    fn from(item: AlbaranListItem) -> Self {
        let (fields, _, _, hours_entries) = AlbaranFields::split(item.albaran);
        Self {
            fields,
            project: item.project.map(Into::into),
            client: item.client.map(Into::into),
            hours_entries,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HoursEntryDetail {
    #[serde(flatten)]
    pub entry: HoursEntry,
    pub user_details: Option<UserResponse>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlbaranDetailsResponse {
    #[serde(flatten)]
    pub fields: AlbaranFields,
    pub project: Option<ProjectSummary>,
    pub client: Option<ClientSummary>,
    pub hours_entries: Vec<HoursEntryDetail>,
    pub creator_details: Option<UserResponse>,
}

impl From<AlbaranDetails> for AlbaranDetailsResponse {
    fn from(d: AlbaranDetails) -> Self {
        let (fields, _, _, hours_entries) = AlbaranFields::split(d.albaran);
        let hours_entries = hours_entries
            .into_iter()
            .zip(d.entry_users)
            .map(|(entry, user)| HoursEntryDetail {
                entry,
                user_details: user.map(Into::into),
            })
            .collect();
        Self {
            fields,
            project: d.project.map(Into::into),
            client: d.client.map(Into::into),
            hours_entries,
            creator_details: d.creator.map(Into::into),
        }
    }
}

// ── Request types ────────────────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HoursEntryRequest {
    pub user: Option<String>,
    pub hours: Option<f64>,
    pub description: Option<String>,
    #[serde(default, deserialize_with = "albaran_core::serde::deserialize_optional_datetime")]
    pub date: Option<chrono::DateTime<chrono::Utc>>,
}

impl From<HoursEntryRequest> for HoursEntryInput {
    fn from(r: HoursEntryRequest) -> Self {
        Self {
            user: r.user,
            hours: r.hours,
            description: r.description,
            date: r.date,
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct MaterialEntryRequest {
    pub name: Option<String>,
    pub quantity: Option<f64>,
    pub unit_price: Option<f64>,
    pub total_price: Option<f64>,
    pub description: Option<String>,
}

impl From<MaterialEntryRequest> for MaterialEntryInput {
    fn from(r: MaterialEntryRequest) -> Self {
        Self {
            name: r.name,
            quantity: r.quantity,
            unit_price: r.unit_price,
            total_price: r.total_price,
            description: r.description,
        }
    }
}

fn inputs<R, I: From<R>>(requests: Vec<R>) -> Vec<I> {
    requests.into_iter().map(Into::into).collect()
}

async fn list(
    state: &AppState,
    filter: AlbaranFilter,
) -> Result<Json<Vec<AlbaranListItemResponse>>, ApiError> {
    let usecase = ListAlbaranesUseCase {
        albaranes: state.albaran_repo(),
        projects: state.project_repo(),
        clients: state.client_repo(),
    };
    let albaranes = usecase.execute(filter).await?;
    Ok(Json(albaranes.into_iter().map(Into::into).collect()))
}

// ── POST /api/albaranes ──────────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateAlbaranRequest {
    pub project_id: Option<Uuid>,
    #[serde(default, deserialize_with = "albaran_core::serde::deserialize_optional_datetime")]
    pub date: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(default)]
    pub hours_entries: Vec<HoursEntryRequest>,
    #[serde(default)]
    pub material_entries: Vec<MaterialEntryRequest>,
    pub observations: Option<String>,
}

pub async fn create_albaran(
    identity: Identity,
    State(state): State<AppState>,
    Json(body): Json<CreateAlbaranRequest>,
) -> Result<(StatusCode, Json<AlbaranResponse>), ApiError> {
    let usecase = CreateAlbaranUseCase {
        albaranes: state.albaran_repo(),
        projects: state.project_repo(),
        clients: state.client_repo(),
        users: state.user_repo(),
    };
    let albaran = usecase
        .execute(
            &identity.email,
            CreateAlbaranInput {
                project: body.project_id,
                date: body.date,
                hours_entries: inputs(body.hours_entries),
                material_entries: inputs(body.material_entries),
                observations: body.observations,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(albaran.into())))
}

// ── GET /api/albaranes ───────────────────────────────────────────────────────

pub async fn list_albaranes(
    _identity: Identity,
    State(state): State<AppState>,
) -> Result<Json<Vec<AlbaranListItemResponse>>, ApiError> {
    list(&state, AlbaranFilter::All).await
}

// ── GET /api/albaranes/me ────────────────────────────────────────────────────

pub async fn list_my_albaranes(
    identity: Identity,
    State(state): State<AppState>,
) -> Result<Json<Vec<AlbaranListItemResponse>>, ApiError> {
    list(&state, AlbaranFilter::CreatedBy(identity.email)).await
}

// ── GET /api/albaranes/project/{id} ──────────────────────────────────────────

pub async fn list_project_albaranes(
    _identity: Identity,
    State(state): State<AppState>,
    Path(project_id): Path<Uuid>,
) -> Result<Json<Vec<AlbaranListItemResponse>>, ApiError> {
    list(&state, AlbaranFilter::Project(project_id)).await
}

// ── GET /api/albaranes/client/{id} ───────────────────────────────────────────

pub async fn list_client_albaranes(
    _identity: Identity,
    State(state): State<AppState>,
    Path(client_id): Path<Uuid>,
) -> Result<Json<Vec<AlbaranListItemResponse>>, ApiError> {
    list(&state, AlbaranFilter::Client(client_id)).await
}

// ── GET /api/albaranes/{id} ──────────────────────────────────────────────────

pub async fn get_albaran(
    _identity: Identity,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<AlbaranDetailsResponse>, ApiError> {
    let usecase = GetAlbaranUseCase {
        albaranes: state.albaran_repo(),
        projects: state.project_repo(),
        clients: state.client_repo(),
        users: state.user_repo(),
    };
    Ok(Json(usecase.execute(id).await?.into()))
}

// ── PUT /api/albaranes/{id} ──────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateAlbaranRequest {
    pub hours_entries: Option<Vec<HoursEntryRequest>>,
    pub material_entries: Option<Vec<MaterialEntryRequest>>,
    #[serde(default, deserialize_with = "albaran_core::serde::deserialize_double_option")]
    pub observations: Option<Option<String>>,
    pub is_signed: Option<bool>,
    pub signed_by: Option<String>,
    pub signature_image: Option<String>,
}

pub async fn update_albaran(
    identity: Identity,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateAlbaranRequest>,
) -> Result<Json<AlbaranResponse>, ApiError> {
    let usecase = UpdateAlbaranUseCase {
        albaranes: state.albaran_repo(),
        projects: state.project_repo(),
        companies: state.company_repo(),
        users: state.user_repo(),
    };
    let albaran = usecase
        .execute(
            id,
            &identity.email,
            AlbaranPatch {
                hours_entries: body.hours_entries.map(inputs),
                material_entries: body.material_entries.map(inputs),
                observations: body.observations,
                is_signed: body.is_signed,
                signed_by: body.signed_by,
                signature_image: body.signature_image,
            },
        )
        .await?;
    Ok(Json(albaran.into()))
}

// ── DELETE /api/albaranes/{id} ───────────────────────────────────────────────

pub async fn delete_albaran(
    identity: Identity,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<AckResponse>, ApiError> {
    let usecase = DeleteAlbaranUseCase {
        albaranes: state.albaran_repo(),
        projects: state.project_repo(),
        companies: state.company_repo(),
    };
    usecase.execute(id, &identity.email).await?;
    Ok(Json(AckResponse::ok("albaran cancelled")))
}

// ── GET /api/albaranes/pdf/{id} ──────────────────────────────────────────────

pub async fn download_pdf(
    identity: Identity,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let usecase = GeneratePdfUseCase {
        albaranes: state.albaran_repo(),
        projects: state.project_repo(),
        clients: state.client_repo(),
        companies: state.company_repo(),
        users: state.user_repo(),
        renderer: state.pdf_renderer(),
        storage: state.pdf_storage(),
    };
    let document = usecase.execute(id, &identity.email).await?;
    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_owned()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", document.filename),
            ),
        ],
        document.bytes,
    )
        .into_response())
}
