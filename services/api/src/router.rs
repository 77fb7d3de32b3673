use axum::{
    Router,
    extract::State,
    http::StatusCode,
    routing::{get, post, put},
};
use tower_http::trace::TraceLayer;

use albaran_core::health::{healthz, readiness};
use albaran_core::middleware::{propagate_request_id_layer, request_id_layer};

use crate::handlers::{
    albaran::{
        create_albaran, delete_albaran, download_pdf, get_albaran, list_albaranes,
        list_client_albaranes, list_my_albaranes, list_project_albaranes, update_albaran,
    },
    client::{
        create_client, delete_client, get_client, list_clients, list_company_clients,
        list_my_clients, update_client,
    },
    company::{create_company, list_companies},
    project::{
        create_project, delete_project, get_project, list_client_projects,
        list_company_projects, list_my_projects, list_projects, update_project,
    },
    user::{change_password, get_user_info, login, logout, register, resend_code, validate_user},
};
use crate::state::AppState;

async fn readyz(State(state): State<AppState>) -> StatusCode {
    readiness(state.db.ping().await)
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Health
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // Session
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", post(logout))
        // Users
        .route("/api/user/validation", put(validate_user))
        .route("/api/user/resend-code", post(resend_code))
        .route("/api/user/change-password", post(change_password))
        .route("/api/user/info", get(get_user_info))
        // Companies
        .route("/companies/create", post(create_company))
        .route("/api/companies", get(list_companies))
        // Clients
        .route("/api/clients", post(create_client).get(list_clients))
        .route("/api/clients/me", get(list_my_clients))
        .route("/api/clients/company/{id}", get(list_company_clients))
        .route(
            "/api/clients/{id}",
            get(get_client).put(update_client).delete(delete_client),
        )
        // Projects
        .route("/api/projects", post(create_project).get(list_projects))
        .route("/api/projects/me", get(list_my_projects))
        .route("/api/projects/client/{id}", get(list_client_projects))
        .route("/api/projects/company/{id}", get(list_company_projects))
        .route(
            "/api/projects/{id}",
            get(get_project).put(update_project).delete(delete_project),
        )
        // Albaranes
        .route("/api/albaranes", post(create_albaran).get(list_albaranes))
        .route("/api/albaranes/me", get(list_my_albaranes))
        .route("/api/albaranes/project/{id}", get(list_project_albaranes))
        .route("/api/albaranes/client/{id}", get(list_client_albaranes))
        .route("/api/albaranes/pdf/{id}", get(download_pdf))
        .route(
            "/api/albaranes/{id}",
            get(get_albaran).put(update_albaran).delete(delete_albaran),
        )
        .layer(propagate_request_id_layer())
        .layer(TraceLayer::new_for_http())
        .layer(request_id_layer())
        .with_state(state)
}
