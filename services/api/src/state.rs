use std::path::PathBuf;

use axum::extract::FromRef;
use sea_orm::DatabaseConnection;

use albaran_auth_types::cookie::CookieSettings;
use albaran_auth_types::identity::JwtSecret;

use crate::infra::db::{
    DbAlbaranRepository, DbClientRepository, DbCompanyRepository, DbProjectRepository,
    DbUserRepository,
};
use crate::infra::password::BcryptHasher;
use crate::infra::pdf::PdfWriterRenderer;
use crate::infra::signature::FetchLimits;
use crate::infra::storage::FsPdfStorage;

/// Shared application state passed to every handler via axum `State`.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub jwt_secret: JwtSecret,
    pub cookies: CookieSettings,
    pub bcrypt_cost: u32,
    pub pdf_dir: PathBuf,
    pub http: reqwest::Client,
    pub signature_limits: FetchLimits,
}

impl AppState {
    pub fn user_repo(&self) -> DbUserRepository {
        DbUserRepository {
            db: self.db.clone(),
        }
    }

    pub fn company_repo(&self) -> DbCompanyRepository {
        DbCompanyRepository {
            db: self.db.clone(),
        }
    }

    pub fn client_repo(&self) -> DbClientRepository {
        DbClientRepository {
            db: self.db.clone(),
        }
    }

    pub fn project_repo(&self) -> DbProjectRepository {
        DbProjectRepository {
            db: self.db.clone(),
        }
    }

    pub fn albaran_repo(&self) -> DbAlbaranRepository {
        DbAlbaranRepository {
            db: self.db.clone(),
        }
    }

    pub fn hasher(&self) -> BcryptHasher {
        BcryptHasher {
            cost: self.bcrypt_cost,
        }
    }

    pub fn pdf_renderer(&self) -> PdfWriterRenderer {
        PdfWriterRenderer {
            http: self.http.clone(),
            limits: self.signature_limits,
        }
    }

    pub fn pdf_storage(&self) -> FsPdfStorage {
        FsPdfStorage {
            root: self.pdf_dir.clone(),
        }
    }
}

impl FromRef<AppState> for JwtSecret {
    fn from_ref(state: &AppState) -> Self {
        state.jwt_secret.clone()
    }
}
