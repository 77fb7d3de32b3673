use axum::{Json, extract::State, http::StatusCode};
use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use albaran_auth_types::cookie::{clear_session_cookie, set_session_cookie};
use albaran_auth_types::identity::Identity;

use crate::domain::types::UserProfile;
use crate::error::ApiError;
use crate::handlers::AckResponse;
use crate::state::AppState;
use crate::usecase::user::{
    ChangePasswordInput, ChangePasswordUseCase, GetUserInfoUseCase, LoginInput, LoginUseCase,
    RegisterInput, RegisterUseCase, ResendCodeUseCase, ValidateUserUseCase,
};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub nombre: String,
    pub apellidos: String,
    pub nif: String,
    pub direccion: String,
    pub is_validated: bool,
    #[serde(serialize_with = "albaran_core::serde::to_rfc3339_ms")]
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<UserProfile> for UserResponse {
    fn from(u: UserProfile) -> Self {
        Self {
            id: u.id,
            email: u.email,
            nombre: u.nombre,
            apellidos: u.apellidos,
            nif: u.nif,
            direccion: u.direccion,
            is_validated: u.is_validated,
            created_at: u.created_at,
        }
    }
}

// ── POST /register ───────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub nombre: Option<String>,
    pub apellidos: Option<String>,
    pub nif: Option<String>,
    pub direccion: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    pub id: Uuid,
    pub validation_code: String,
}

pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), ApiError> {
    let usecase = RegisterUseCase {
        users: state.user_repo(),
        hasher: state.hasher(),
    };
    let output = usecase
        .execute(RegisterInput {
            email: body.email,
            password: body.password,
            nombre: body.nombre,
            apellidos: body.apellidos,
            nif: body.nif,
            direccion: body.direccion,
        })
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            id: output.id,
            validation_code: output.validation_code,
        }),
    ))
}

// ── POST /login ──────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub user: UserResponse,
    pub token: String,
    pub expires_at: u64,
}

pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<LoginRequest>,
) -> Result<(CookieJar, Json<LoginResponse>), ApiError> {
    let usecase = LoginUseCase {
        users: state.user_repo(),
        hasher: state.hasher(),
        jwt_secret: state.jwt_secret.as_str().to_owned(),
    };
    let output = usecase
        .execute(LoginInput {
            email: body.email,
            password: body.password,
        })
        .await?;
    let jar = set_session_cookie(jar, output.token.clone(), &state.cookies);
    Ok((
        jar,
        Json(LoginResponse {
            user: output.user.into(),
            token: output.token,
            expires_at: output.expires_at,
        }),
    ))
}

// ── POST /logout ─────────────────────────────────────────────────────────────

pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> (CookieJar, Json<AckResponse>) {
    (
        clear_session_cookie(jar, &state.cookies),
        Json(AckResponse::ok("logged out")),
    )
}

// ── PUT /api/user/validation ─────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct ValidateRequest {
    pub email: String,
    pub code: String,
}

pub async fn validate_user(
    State(state): State<AppState>,
    Json(body): Json<ValidateRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    let usecase = ValidateUserUseCase {
        users: state.user_repo(),
    };
    let user = usecase.execute(&body.email, &body.code).await?;
    Ok(Json(user.into()))
}

// ── POST /api/user/resend-code ───────────────────────────────────────────────

#[derive(Deserialize)]
pub struct ResendCodeRequest {
    pub email: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResendCodeResponse {
    pub validation_code: String,
}

pub async fn resend_code(
    State(state): State<AppState>,
    Json(body): Json<ResendCodeRequest>,
) -> Result<Json<ResendCodeResponse>, ApiError> {
    let usecase = ResendCodeUseCase {
        users: state.user_repo(),
    };
    let code = usecase.execute(&body.email).await?;
    Ok(Json(ResendCodeResponse {
        validation_code: code,
    }))
}

// ── POST /api/user/change-password ───────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

pub async fn change_password(
    identity: Identity,
    State(state): State<AppState>,
    Json(body): Json<ChangePasswordRequest>,
) -> Result<Json<AckResponse>, ApiError> {
    let usecase = ChangePasswordUseCase {
        users: state.user_repo(),
        hasher: state.hasher(),
    };
    usecase
        .execute(
            identity.user_id,
            ChangePasswordInput {
                current_password: body.current_password,
                new_password: body.new_password,
            },
        )
        .await?;
    Ok(Json(AckResponse::ok("password changed")))
}

// ── GET /api/user/info ───────────────────────────────────────────────────────

pub async fn get_user_info(
    identity: Identity,
    State(state): State<AppState>,
) -> Result<Json<UserResponse>, ApiError> {
    let usecase = GetUserInfoUseCase {
        users: state.user_repo(),
    };
    let user = usecase.execute(identity.user_id).await?;
    Ok(Json(user.into()))
}
