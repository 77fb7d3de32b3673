use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use albaran_auth_types::identity::Identity;

use crate::domain::types::{Client, ClientFilter};
use crate::error::ApiError;
use crate::handlers::AckResponse;
use crate::state::AppState;
use crate::usecase::client::{
    ClientPatch, CreateClientInput, CreateClientUseCase, DeleteClientUseCase, GetClientUseCase,
    ListClientsUseCase, UpdateClientUseCase,
};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientResponse {
    pub id: Uuid,
    pub nombre: String,
    pub apellidos: String,
    pub email: String,
    pub telefono: String,
    pub nif: String,
    pub direccion: String,
    pub creador: String,
    pub compania: Option<Uuid>,
    pub activo: bool,
    #[serde(serialize_with = "albaran_core::serde::to_rfc3339_ms")]
    pub created_at: chrono::DateTime<chrono::Utc>,
    #[serde(serialize_with = "albaran_core::serde::to_rfc3339_ms")]
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<Client> for ClientResponse {
    fn from(c: Client) -> Self {
        Self {
            id: c.id,
            nombre: c.nombre,
            apellidos: c.apellidos,
            email: c.email,
            telefono: c.telefono,
            nif: c.nif,
            direccion: c.direccion,
            creador: c.creador,
            compania: c.compania,
            activo: c.activo,
            created_at: c.created_at,
            updated_at: c.updated_at,
        }
    }
}

async fn list(state: &AppState, filter: ClientFilter) -> Result<Json<Vec<ClientResponse>>, ApiError> {
    let usecase = ListClientsUseCase {
        clients: state.client_repo(),
    };
    let clients = usecase.execute(filter).await?;
    Ok(Json(clients.into_iter().map(Into::into).collect()))
}

// ── POST /api/clients ────────────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateClientRequest {
    pub nombre: Option<String>,
    pub apellidos: Option<String>,
    pub email: Option<String>,
    pub telefono: Option<String>,
    pub nif: Option<String>,
    pub direccion: Option<String>,
    pub compania_id: Option<Uuid>,
}

pub async fn create_client(
    identity: Identity,
    State(state): State<AppState>,
    Json(body): Json<CreateClientRequest>,
) -> Result<(StatusCode, Json<ClientResponse>), ApiError> {
    let usecase = CreateClientUseCase {
        clients: state.client_repo(),
        companies: state.company_repo(),
        users: state.user_repo(),
    };
    let client = usecase
        .execute(
            &identity.email,
            CreateClientInput {
                nombre: body.nombre,
                apellidos: body.apellidos,
                email: body.email,
                telefono: body.telefono,
                nif: body.nif,
                direccion: body.direccion,
                compania: body.compania_id,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(client.into())))
}

// ── GET /api/clients ─────────────────────────────────────────────────────────

pub async fn list_clients(
    _identity: Identity,
    State(state): State<AppState>,
) -> Result<Json<Vec<ClientResponse>>, ApiError> {
    list(&state, ClientFilter::All).await
}

// ── GET /api/clients/me ──────────────────────────────────────────────────────

pub async fn list_my_clients(
    identity: Identity,
    State(state): State<AppState>,
) -> Result<Json<Vec<ClientResponse>>, ApiError> {
    list(&state, ClientFilter::Creador(identity.email)).await
}

// ── GET /api/clients/company/{id} ────────────────────────────────────────────

pub async fn list_company_clients(
    _identity: Identity,
    State(state): State<AppState>,
    Path(company_id): Path<Uuid>,
) -> Result<Json<Vec<ClientResponse>>, ApiError> {
    list(&state, ClientFilter::Compania(company_id)).await
}

// ── GET /api/clients/{id} ────────────────────────────────────────────────────

pub async fn get_client(
    _identity: Identity,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ClientResponse>, ApiError> {
    let usecase = GetClientUseCase {
        clients: state.client_repo(),
    };
    Ok(Json(usecase.execute(id).await?.into()))
}

// ── PUT /api/clients/{id} ────────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateClientRequest {
    pub nombre: Option<String>,
    pub apellidos: Option<String>,
    pub email: Option<String>,
    pub telefono: Option<String>,
    pub nif: Option<String>,
    pub direccion: Option<String>,
    #[serde(default, deserialize_with = "albaran_core::serde::deserialize_double_option")]
    pub compania_id: Option<Option<Uuid>>,
}

pub async fn update_client(
    identity: Identity,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateClientRequest>,
) -> Result<Json<ClientResponse>, ApiError> {
    let usecase = UpdateClientUseCase {
        clients: state.client_repo(),
        companies: state.company_repo(),
    };
    let client = usecase
        .execute(
            id,
            &identity.email,
            ClientPatch {
                nombre: body.nombre,
                apellidos: body.apellidos,
                email: body.email,
                telefono: body.telefono,
                nif: body.nif,
                direccion: body.direccion,
                compania: body.compania_id,
            },
        )
        .await?;
    Ok(Json(client.into()))
}

// ── DELETE /api/clients/{id} ─────────────────────────────────────────────────

pub async fn delete_client(
    identity: Identity,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<AckResponse>, ApiError> {
    let usecase = DeleteClientUseCase {
        clients: state.client_repo(),
        companies: state.company_repo(),
    };
    usecase.execute(id, &identity.email).await?;
    Ok(Json(AckResponse::ok("client deleted")))
}
