#![allow(async_fn_in_trait)]

use uuid::Uuid;

use crate::domain::types::{
    Albaran, AlbaranDetails, AlbaranFilter, Client, ClientFilter, Company, Project, ProjectFilter,
    User,
};
use crate::error::ApiError;

/// Repository for user accounts.
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, ApiError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, ApiError>;
    /// Users matching any of `emails`, in no particular order.
    async fn find_by_emails(&self, emails: &[String]) -> Result<Vec<User>, ApiError>;
    async fn create(&self, user: &User) -> Result<(), ApiError>;
    /// Overwrite every mutable column of an existing user.
    async fn update(&self, user: &User) -> Result<(), ApiError>;
}

/// Repository for companies. Companies are never updated or deleted.
pub trait CompanyRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Company>, ApiError>;
    async fn find_by_nif(&self, nif: &str) -> Result<Option<Company>, ApiError>;
    /// Companies where `email` is the jefe or one of the miembros.
    async fn list_by_member(&self, email: &str) -> Result<Vec<Company>, ApiError>;
    async fn create(&self, company: &Company) -> Result<(), ApiError>;
}

/// Repository for clients.
pub trait ClientRepository: Send + Sync {
    /// Returns the client regardless of `activo`.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Client>, ApiError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<Client>, ApiError>;
    async fn find_by_nif(&self, nif: &str) -> Result<Option<Client>, ApiError>;
    /// Active clients matching `filter`.
    async fn list_active(&self, filter: ClientFilter) -> Result<Vec<Client>, ApiError>;
    async fn create(&self, client: &Client) -> Result<(), ApiError>;
    async fn update(&self, client: &Client) -> Result<(), ApiError>;
}

/// Repository for projects.
pub trait ProjectRepository: Send + Sync {
    /// Returns the project regardless of `activo`.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Project>, ApiError>;
    /// Active projects matching `filter`.
    async fn list_active(&self, filter: ProjectFilter) -> Result<Vec<Project>, ApiError>;
    async fn create(&self, project: &Project) -> Result<(), ApiError>;
    async fn update(&self, project: &Project) -> Result<(), ApiError>;
}

/// Repository for albaranes.
pub trait AlbaranRepository: Send + Sync {
    /// Returns the albaran regardless of status.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Albaran>, ApiError>;
    /// Non-cancelled albaranes matching `filter`, newest first.
    async fn list(&self, filter: AlbaranFilter) -> Result<Vec<Albaran>, ApiError>;
    /// Number of albaranes whose number starts with `prefix`.
    async fn count_with_prefix(&self, prefix: &str) -> Result<u64, ApiError>;
    async fn create(&self, albaran: &Albaran) -> Result<(), ApiError>;
    async fn update(&self, albaran: &Albaran) -> Result<(), ApiError>;
}

/// One-way password hashing.
pub trait PasswordHasher: Send + Sync {
    fn hash(&self, password: &str) -> Result<String, ApiError>;
    fn verify(&self, password: &str, hash: &str) -> Result<bool, ApiError>;
}

/// Port for rendering a signed albaran as a PDF.
pub trait PdfRenderer: Send + Sync {
    async fn render(&self, details: &AlbaranDetails) -> Result<Vec<u8>, ApiError>;
}

/// Port for caching rendered PDFs.
pub trait PdfStorage: Send + Sync {
    /// Bytes at `location`, or `None` if nothing is stored there any more.
    async fn load(&self, location: &str) -> Result<Option<Vec<u8>>, ApiError>;
    /// Store a render for albaran `number`. Returns its location.
    async fn store(&self, number: &str, bytes: &[u8]) -> Result<String, ApiError>;
}
