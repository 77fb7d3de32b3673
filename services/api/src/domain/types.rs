use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use albaran_domain::status::{AlbaranStatus, ProjectStatus};

/// Validation codes expire one hour after issue.
pub const VALIDATION_CODE_TTL_SECS: i64 = 3600;

/// Minimum password length accepted on registration and password change.
pub const MIN_PASSWORD_LEN: usize = 8;

/// Registered account.
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub nombre: String,
    pub apellidos: String,
    pub nif: String,
    pub direccion: String,
    pub is_validated: bool,
    pub validation_code: Option<String>,
    pub validation_code_expires: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// The user without credentials or validation state, safe to return.
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id,
            email: self.email.clone(),
            nombre: self.nombre.clone(),
            apellidos: self.apellidos.clone(),
            nif: self.nif.clone(),
            direccion: self.direccion.clone(),
            is_validated: self.is_validated,
            created_at: self.created_at,
        }
    }

    /// `true` if `code` is the current code and has not expired at `now`.
    pub fn accepts_code(&self, code: &str, now: DateTime<Utc>) -> bool {
        match (&self.validation_code, self.validation_code_expires) {
            (Some(current), Some(expires)) => current == code && expires > now,
            _ => false,
        }
    }
}

/// Public view of a user.
#[derive(Debug, Clone, PartialEq)]
pub struct UserProfile {
    pub id: Uuid,
    pub email: String,
    pub nombre: String,
    pub apellidos: String,
    pub nif: String,
    pub direccion: String,
    pub is_validated: bool,
    pub created_at: DateTime<Utc>,
}

/// Legal entity with one owner and a list of member emails.
#[derive(Debug, Clone)]
pub struct Company {
    pub id: Uuid,
    pub nif: String,
    pub nombre: String,
    pub jefe: String,
    pub miembros: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Company {
    /// `true` if `email` is the jefe or one of the miembros.
    pub fn includes(&self, email: &str) -> bool {
        self.jefe == email || self.miembros.iter().any(|m| m == email)
    }
}

/// Customer record.
#[derive(Debug, Clone)]
pub struct Client {
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
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Unit of work for one client. Invariant: `fecha_inicio < fecha_fin`.
#[derive(Debug, Clone)]
pub struct Project {
    pub id: Uuid,
    pub titulo: String,
    pub descripcion: String,
    pub fecha_inicio: DateTime<Utc>,
    pub fecha_fin: DateTime<Utc>,
    pub estado: ProjectStatus,
    pub presupuesto: f64,
    pub cliente: Uuid,
    pub compania: Option<Uuid>,
    pub creador: String,
    pub activo: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Hours worked by one user. Stored inside the albaran's JSONB column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HoursEntry {
    pub user: String,
    pub hours: f64,
    pub description: String,
    pub date: DateTime<Utc>,
}

/// Material consumed. Stored inside the albaran's JSONB column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterialEntry {
    pub name: String,
    pub quantity: f64,
    pub unit_price: f64,
    pub total_price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Delivery note.
#[derive(Debug, Clone)]
pub struct Albaran {
    pub id: Uuid,
    pub number: String,
    pub project: Uuid,
    pub client: Uuid,
    pub created_by: String,
    pub date: DateTime<Utc>,
    pub hours_entries: Vec<HoursEntry>,
    pub material_entries: Vec<MaterialEntry>,
    pub observations: Option<String>,
    pub total_hours: f64,
    pub total_materials: f64,
    pub total_amount: f64,
    pub is_signed: bool,
    pub signature_date: Option<DateTime<Utc>>,
    pub signed_by: Option<String>,
    pub signature_image: Option<String>,
    pub status: AlbaranStatus,
    pub pdf_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Albaran {
    /// Recompute derived totals from the entry lists. Call before every save.
    ///
    /// Hours carry no rate, so `total_amount` equals `total_materials`.
    pub fn recompute_totals(&mut self) {
        self.total_hours = self.hours_entries.iter().map(|e| e.hours).sum();
        self.total_materials = self.material_entries.iter().map(|e| e.total_price).sum();
        self.total_amount = self.total_materials;
    }

    /// Move into the signed state. One-way.
    pub fn sign(&mut self, signed_by: String, image: Option<String>, now: DateTime<Utc>) {
        self.is_signed = true;
        self.signature_date = Some(now);
        self.signed_by = Some(signed_by);
        self.status = AlbaranStatus::Signed;
        if image.is_some() {
            self.signature_image = image;
        }
    }
}

/// Number prefix shared by all albaranes created in `year`.
pub fn albaran_number_prefix(year: i32) -> String {
    format!("ALB-{year}-")
}

/// Albaran number: `ALB-{year}-{seq:05}`.
pub fn albaran_number(year: i32, seq: u64) -> String {
    format!("{}{seq:05}", albaran_number_prefix(year))
}

/// Year used for numbering an albaran created at `now`.
pub fn numbering_year(now: DateTime<Utc>) -> i32 {
    now.year()
}

/// An albaran with the records it references, resolved for display and PDF output.
///
/// `entry_users` is aligned with `albaran.hours_entries`; `None` where the
/// user no longer exists.
#[derive(Debug, Clone)]
pub struct AlbaranDetails {
    pub albaran: Albaran,
    pub project: Option<Project>,
    pub client: Option<Client>,
    pub creator: Option<UserProfile>,
    pub entry_users: Vec<Option<UserProfile>>,
}

/// An albaran with its project and client, for list views.
#[derive(Debug, Clone)]
pub struct AlbaranListItem {
    pub albaran: Albaran,
    pub project: Option<Project>,
    pub client: Option<Client>,
}

/// Rendered PDF ready to send.
#[derive(Debug, Clone)]
pub struct PdfDocument {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// Selection for client list queries. Only active clients are returned.
#[derive(Debug, Clone)]
pub enum ClientFilter {
    All,
    Creador(String),
    Compania(Uuid),
}

/// Selection for project list queries. Only active projects are returned.
#[derive(Debug, Clone)]
pub enum ProjectFilter {
    All,
    Creador(String),
    Cliente(Uuid),
    Compania(Uuid),
}

/// Selection for albaran list queries. Cancelled albaranes are excluded;
/// results are newest first.
#[derive(Debug, Clone)]
pub enum AlbaranFilter {
    All,
    CreatedBy(String),
    Project(Uuid),
    Client(Uuid),
}
