use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use albaran_auth_types::identity::Identity;

use crate::domain::types::Company;
use crate::error::ApiError;
use crate::state::AppState;
use crate::usecase::company::{CreateCompanyInput, CreateCompanyUseCase, ListCompaniesUseCase};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyResponse {
    pub id: Uuid,
    pub nif: String,
    pub nombre: String,
    pub jefe: String,
    pub miembros: Vec<String>,
    #[serde(serialize_with = "albaran_core::serde::to_rfc3339_ms")]
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<Company> for CompanyResponse {
    fn from(c: Company) -> Self {
        Self {
            id: c.id,
            nif: c.nif,
            nombre: c.nombre,
            jefe: c.jefe,
            miembros: c.miembros,
            created_at: c.created_at,
        }
    }
}

// ── POST /companies/create ───────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateCompanyRequest {
    pub nif: Option<String>,
    pub nombre: Option<String>,
    pub email_jefe: Option<String>,
    #[serde(default)]
    pub miembros: Vec<String>,
}

pub async fn create_company(
    identity: Identity,
    State(state): State<AppState>,
    Json(body): Json<CreateCompanyRequest>,
) -> Result<(StatusCode, Json<CompanyResponse>), ApiError> {
    let usecase = CreateCompanyUseCase {
        companies: state.company_repo(),
        users: state.user_repo(),
    };
    let company = usecase
        .execute(
            &identity.email,
            CreateCompanyInput {
                nif: body.nif,
                nombre: body.nombre,
                jefe: body.email_jefe,
                miembros: body.miembros,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(company.into())))
}

// ── GET /api/companies ───────────────────────────────────────────────────────

pub async fn list_companies(
    identity: Identity,
    State(state): State<AppState>,
) -> Result<Json<Vec<CompanyResponse>>, ApiError> {
    let usecase = ListCompaniesUseCase {
        companies: state.company_repo(),
    };
    let companies = usecase.execute(&identity.email).await?;
    Ok(Json(companies.into_iter().map(Into::into).collect()))
}
