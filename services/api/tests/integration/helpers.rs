use std::sync::{Arc, Mutex};

use chrono::{DateTime, TimeZone, Utc};
use uuid::Uuid;

use albaran_api::domain::repository::{
    AlbaranRepository, ClientRepository, CompanyRepository, PasswordHasher, PdfRenderer,
    PdfStorage, ProjectRepository, UserRepository,
};
use albaran_api::domain::types::{
    Albaran, AlbaranDetails, AlbaranFilter, Client, ClientFilter, Company, Project, ProjectFilter,
    User,
};
use albaran_api::error::ApiError;
use albaran_domain::status::{AlbaranStatus, ProjectStatus};

pub const TEST_JWT_SECRET: &str = "test-secret-that-is-long-enough";

// ── MemoryStore ──────────────────────────────────────────────────────────────

/// Shared in-memory tables. Clones see the same data.
#[derive(Clone, Default)]
pub struct MemoryStore {
    pub users: Arc<Mutex<Vec<User>>>,
    pub companies: Arc<Mutex<Vec<Company>>>,
    pub clients: Arc<Mutex<Vec<Client>>>,
    pub projects: Arc<Mutex<Vec<Project>>>,
    pub albaranes: Arc<Mutex<Vec<Albaran>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(self, user: User) -> Self {
        self.users.lock().unwrap().push(user);
        self
    }

    pub fn with_company(self, company: Company) -> Self {
        self.companies.lock().unwrap().push(company);
        self
    }

    pub fn with_client(self, client: Client) -> Self {
        self.clients.lock().unwrap().push(client);
        self
    }

    pub fn with_project(self, project: Project) -> Self {
        self.projects.lock().unwrap().push(project);
        self
    }

    pub fn with_albaran(self, albaran: Albaran) -> Self {
        self.albaranes.lock().unwrap().push(albaran);
        self
    }

    pub fn user(&self, email: &str) -> User {
        let users = self.users.lock().unwrap();
        users.iter().find(|u| u.email == email).cloned().unwrap()
    }

    pub fn client(&self, id: Uuid) -> Client {
        let clients = self.clients.lock().unwrap();
        clients.iter().find(|c| c.id == id).cloned().unwrap()
    }

    pub fn project(&self, id: Uuid) -> Project {
        let projects = self.projects.lock().unwrap();
        projects.iter().find(|p| p.id == id).cloned().unwrap()
    }

    pub fn albaran(&self, id: Uuid) -> Albaran {
        let albaranes = self.albaranes.lock().unwrap();
        albaranes.iter().find(|a| a.id == id).cloned().unwrap()
    }
}

fn replace<T: Clone>(rows: &Arc<Mutex<Vec<T>>>, row: &T, same: impl Fn(&T) -> bool) {
    let mut rows = rows.lock().unwrap();
    if let Some(slot) = rows.iter_mut().find(|r| same(r)) {
        *slot = row.clone();
    }
}

impl UserRepository for MemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, ApiError> {
        Ok(self.users.lock().unwrap().iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, ApiError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn find_by_emails(&self, emails: &[String]) -> Result<Vec<User>, ApiError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .filter(|u| emails.contains(&u.email))
            .cloned()
            .collect())
    }

    async fn create(&self, user: &User) -> Result<(), ApiError> {
        self.users.lock().unwrap().push(user.clone());
        Ok(())
    }

    async fn update(&self, user: &User) -> Result<(), ApiError> {
        replace(&self.users, user, |u| u.id == user.id);
        Ok(())
    }
}

impl CompanyRepository for MemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Company>, ApiError> {
        Ok(self
            .companies
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.id == id)
            .cloned())
    }

    async fn find_by_nif(&self, nif: &str) -> Result<Option<Company>, ApiError> {
        Ok(self
            .companies
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.nif == nif)
            .cloned())
    }

    async fn list_by_member(&self, email: &str) -> Result<Vec<Company>, ApiError> {
        Ok(self
            .companies
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.includes(email))
            .cloned()
            .collect())
    }

    async fn create(&self, company: &Company) -> Result<(), ApiError> {
        self.companies.lock().unwrap().push(company.clone());
        Ok(())
    }
}

impl ClientRepository for MemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Client>, ApiError> {
        Ok(self.clients.lock().unwrap().iter().find(|c| c.id == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Client>, ApiError> {
        Ok(self
            .clients
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.email == email)
            .cloned())
    }

    async fn find_by_nif(&self, nif: &str) -> Result<Option<Client>, ApiError> {
        Ok(self
            .clients
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.nif == nif)
            .cloned())
    }

    async fn list_active(&self, filter: ClientFilter) -> Result<Vec<Client>, ApiError> {
        Ok(self
            .clients
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.activo)
            .filter(|c| match &filter {
                ClientFilter::All => true,
                ClientFilter::Creador(email) => &c.creador == email,
                ClientFilter::Compania(id) => c.compania == Some(*id),
            })
            .cloned()
            .collect())
    }

    async fn create(&self, client: &Client) -> Result<(), ApiError> {
        self.clients.lock().unwrap().push(client.clone());
        Ok(())
    }

    async fn update(&self, client: &Client) -> Result<(), ApiError> {
        replace(&self.clients, client, |c| c.id == client.id);
        Ok(())
    }
}

impl ProjectRepository for MemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Project>, ApiError> {
        Ok(self
            .projects
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.id == id)
            .cloned())
    }

    async fn list_active(&self, filter: ProjectFilter) -> Result<Vec<Project>, ApiError> {
        Ok(self
            .projects
            .lock()
            .unwrap()
            .iter()
            .filter(|p| p.activo)
            .filter(|p| match &filter {
                ProjectFilter::All => true,
                ProjectFilter::Creador(email) => &p.creador == email,
                ProjectFilter::Cliente(id) => p.cliente == *id,
                ProjectFilter::Compania(id) => p.compania == Some(*id),
            })
            .cloned()
            .collect())
    }

    async fn create(&self, project: &Project) -> Result<(), ApiError> {
        self.projects.lock().unwrap().push(project.clone());
        Ok(())
    }

    async fn update(&self, project: &Project) -> Result<(), ApiError> {
        replace(&self.projects, project, |p| p.id == project.id);
        Ok(())
    }
}

impl AlbaranRepository for MemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Albaran>, ApiError> {
        Ok(self
            .albaranes
            .lock()
            .unwrap()
            .iter()
            .find(|a| a.id == id)
            .cloned())
    }

    async fn list(&self, filter: AlbaranFilter) -> Result<Vec<Albaran>, ApiError> {
        let mut rows: Vec<Albaran> = self
            .albaranes
            .lock()
            .unwrap()
            .iter()
            .filter(|a| a.status != AlbaranStatus::Cancelled)
            .filter(|a| match &filter {
                AlbaranFilter::All => true,
                AlbaranFilter::CreatedBy(email) => &a.created_by == email,
                AlbaranFilter::Project(id) => a.project == *id,
                AlbaranFilter::Client(id) => a.client == *id,
            })
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    async fn count_with_prefix(&self, prefix: &str) -> Result<u64, ApiError> {
        Ok(self
            .albaranes
            .lock()
            .unwrap()
            .iter()
            .filter(|a| a.number.starts_with(prefix))
            .count() as u64)
    }

    async fn create(&self, albaran: &Albaran) -> Result<(), ApiError> {
        self.albaranes.lock().unwrap().push(albaran.clone());
        Ok(())
    }

    async fn update(&self, albaran: &Albaran) -> Result<(), ApiError> {
        replace(&self.albaranes, albaran, |a| a.id == albaran.id);
        Ok(())
    }
}

// ── PlainHasher ──────────────────────────────────────────────────────────────

/// Reversible "hash" keeping tests fast.
pub struct PlainHasher;

impl PasswordHasher for PlainHasher {
    fn hash(&self, password: &str) -> Result<String, ApiError> {
        Ok(format!("plain:{password}"))
    }

    fn verify(&self, password: &str, hash: &str) -> Result<bool, ApiError> {
        Ok(hash.strip_prefix("plain:") == Some(password))
    }
}

// ── MockPdfRenderer / MockPdfStorage ─────────────────────────────────────────

/// Renders the albaran number as the document body and counts calls.
#[derive(Clone, Default)]
pub struct MockPdfRenderer {
    pub renders: Arc<Mutex<u32>>,
}

impl MockPdfRenderer {
    pub fn render_count(&self) -> u32 {
        *self.renders.lock().unwrap()
    }
}

impl PdfRenderer for MockPdfRenderer {
    async fn render(&self, details: &AlbaranDetails) -> Result<Vec<u8>, ApiError> {
        *self.renders.lock().unwrap() += 1;
        Ok(format!("%PDF-mock {}", details.albaran.number).into_bytes())
    }
}

#[derive(Clone, Default)]
pub struct MockPdfStorage {
    pub files: Arc<Mutex<Vec<(String, Vec<u8>)>>>,
}

impl MockPdfStorage {
    pub fn remove_all(&self) {
        self.files.lock().unwrap().clear();
    }
}

impl PdfStorage for MockPdfStorage {
    async fn load(&self, location: &str) -> Result<Option<Vec<u8>>, ApiError> {
        Ok(self
            .files
            .lock()
            .unwrap()
            .iter()
            .find(|(l, _)| l == location)
            .map(|(_, b)| b.clone()))
    }

    async fn store(&self, number: &str, bytes: &[u8]) -> Result<String, ApiError> {
        let location = format!("mem://albaran-{number}.pdf");
        let mut files = self.files.lock().unwrap();
        files.retain(|(l, _)| l != &location);
        files.push((location.clone(), bytes.to_vec()));
        Ok(location)
    }
}

// ── Fixtures ─────────────────────────────────────────────────────────────────

pub fn date(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
}

pub fn test_user(email: &str) -> User {
    let now = Utc::now();
    User {
        id: Uuid::new_v4(),
        email: email.to_owned(),
        password_hash: "plain:password123".to_owned(),
        nombre: "Ana".to_owned(),
        apellidos: "García López".to_owned(),
        nif: "12345678Z".to_owned(),
        direccion: "Calle Mayor 1, Madrid".to_owned(),
        is_validated: true,
        validation_code: None,
        validation_code_expires: None,
        created_at: now,
        updated_at: now,
    }
}

pub fn unvalidated_user(email: &str) -> User {
    User {
        is_validated: false,
        validation_code: Some("123456".to_owned()),
        validation_code_expires: Some(Utc::now() + chrono::Duration::hours(1)),
        ..test_user(email)
    }
}

pub fn test_company(jefe: &str, miembros: &[&str]) -> Company {
    let now = Utc::now();
    Company {
        id: Uuid::new_v4(),
        nif: format!("B{}", &Uuid::new_v4().simple().to_string()[..8]),
        nombre: "Reformas Norte SL".to_owned(),
        jefe: jefe.to_owned(),
        miembros: miembros.iter().map(|m| (*m).to_owned()).collect(),
        created_at: now,
        updated_at: now,
    }
}

pub fn test_client(creador: &str, compania: Option<Uuid>) -> Client {
    let now = Utc::now();
    let tag = Uuid::new_v4().simple().to_string();
    Client {
        id: Uuid::new_v4(),
        nombre: "Luis".to_owned(),
        apellidos: "Pérez".to_owned(),
        email: format!("cliente-{}@example.com", &tag[..8]),
        telefono: "600123123".to_owned(),
        nif: format!("X{}", &tag[..8]),
        direccion: "Avenida Sol 4".to_owned(),
        creador: creador.to_owned(),
        compania,
        activo: true,
        created_at: now,
        updated_at: now,
    }
}

pub fn test_project(creador: &str, cliente: Uuid, compania: Option<Uuid>) -> Project {
    let now = Utc::now();
    Project {
        id: Uuid::new_v4(),
        titulo: "Reforma cocina".to_owned(),
        descripcion: "Cambio de encimera y azulejos".to_owned(),
        fecha_inicio: date(2024, 5, 1),
        fecha_fin: date(2024, 6, 1),
        estado: ProjectStatus::Pendiente,
        presupuesto: 4500.0,
        cliente,
        compania,
        creador: creador.to_owned(),
        activo: true,
        created_at: now,
        updated_at: now,
    }
}

pub fn test_albaran(created_by: &str, project: &Project) -> Albaran {
    let now = Utc::now();
    Albaran {
        id: Uuid::new_v4(),
        number: "ALB-2024-00001".to_owned(),
        project: project.id,
        client: project.cliente,
        created_by: created_by.to_owned(),
        date: now,
        hours_entries: vec![],
        material_entries: vec![],
        observations: None,
        total_hours: 0.0,
        total_materials: 0.0,
        total_amount: 0.0,
        is_signed: false,
        signature_date: None,
        signed_by: None,
        signature_image: None,
        status: AlbaranStatus::Draft,
        pdf_url: None,
        created_at: now,
        updated_at: now,
    }
}

pub fn signed_albaran(created_by: &str, project: &Project) -> Albaran {
    let mut albaran = test_albaran(created_by, project);
    albaran.sign(created_by.to_owned(), None, Utc::now());
    albaran
}

/// A creator, their client and an active project under a company with one member.
pub struct World {
    pub store: MemoryStore,
    pub creator: String,
    pub member: String,
    pub outsider: String,
    pub company: Company,
    pub client: Client,
    pub project: Project,
}

pub fn world() -> World {
    let creator = "creador@example.com".to_owned();
    let member = "miembro@example.com".to_owned();
    let outsider = "ajeno@example.com".to_owned();
    let company = test_company(&creator, &[member.as_str()]);
    let client = test_client(&creator, Some(company.id));
    let project = test_project(&creator, client.id, Some(company.id));
    let store = MemoryStore::new()
        .with_user(test_user(&creator))
        .with_user(test_user(&member))
        .with_user(test_user(&outsider))
        .with_company(company.clone())
        .with_client(client.clone())
        .with_project(project.clone());
    World {
        store,
        creator,
        member,
        outsider,
        company,
        client,
        project,
    }
}
