use std::collections::HashMap;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use albaran_domain::schema::{FieldRule, FieldValue, Rule, Validate, validate};
use albaran_domain::status::AlbaranStatus;

use crate::domain::repository::{
    AlbaranRepository, ClientRepository, CompanyRepository, ProjectRepository, UserRepository,
};
use crate::domain::types::{
    Albaran, AlbaranDetails, AlbaranFilter, AlbaranListItem, HoursEntry, MaterialEntry,
    albaran_number,
    albaran_number_prefix, numbering_year,
};
use crate::error::{ApiError, Resource};
use crate::usecase::access::{ensure_owner_or_member, validated_user};

// ── Entries ──────────────────────────────────────────────────────────────────

/// Hours entry as submitted. `date` defaults to now.
#[derive(Debug, Clone, Default)]
pub struct HoursEntryInput {
    pub user: Option<String>,
    pub hours: Option<f64>,
    pub description: Option<String>,
    pub date: Option<DateTime<Utc>>,
}

impl Validate for HoursEntryInput {
    const SCHEMA: &'static [FieldRule] = &[
        FieldRule::new("user", &[Rule::Required]),
        FieldRule::new("hours", &[Rule::Required, Rule::NonNegative]),
        FieldRule::new("description", &[Rule::Required]),
    ];

    fn value(&self, field: &str) -> FieldValue<'_> {
        match field {
            "user" => FieldValue::text(&self.user),
            "hours" => FieldValue::number(self.hours),
            "description" => FieldValue::text(&self.description),
            _ => FieldValue::Absent,
        }
    }
}

/// Material entry as submitted. `total_price` defaults to `quantity * unit_price`.
#[derive(Debug, Clone, Default)]
pub struct MaterialEntryInput {
    pub name: Option<String>,
    pub quantity: Option<f64>,
    pub unit_price: Option<f64>,
    pub total_price: Option<f64>,
    pub description: Option<String>,
}

impl Validate for MaterialEntryInput {
    const SCHEMA: &'static [FieldRule] = &[
        FieldRule::new("name", &[Rule::Required]),
        FieldRule::new("quantity", &[Rule::Required, Rule::NonNegative]),
        FieldRule::new("unitPrice", &[Rule::Required, Rule::NonNegative]),
        FieldRule::new("totalPrice", &[Rule::NonNegative]),
    ];

    fn value(&self, field: &str) -> FieldValue<'_> {
        match field {
            "name" => FieldValue::text(&self.name),
            "quantity" => FieldValue::number(self.quantity),
            "unitPrice" => FieldValue::number(self.unit_price),
            "totalPrice" => FieldValue::number(self.total_price),
            _ => FieldValue::Absent,
        }
    }
}

fn entry_error(list: &str, index: usize, e: impl std::fmt::Display) -> ApiError {
    ApiError::Validation(format!("{list}[{index}].{e}"))
}

/// Validate submitted hours entries. Every user must exist; validation
/// state is not required.
async fn resolve_hours<U: UserRepository>(
    users: &U,
    inputs: Vec<HoursEntryInput>,
    now: DateTime<Utc>,
) -> Result<Vec<HoursEntry>, ApiError> {
    let mut entries = Vec::with_capacity(inputs.len());
    for (i, input) in inputs.into_iter().enumerate() {
        validate(&input).map_err(|e| entry_error("hoursEntries", i, e))?;
        let user = input.user.unwrap_or_default();
        if users.find_by_email(&user).await?.is_none() {
            return Err(ApiError::UnknownUser(user));
        }
        entries.push(HoursEntry {
            user,
            hours: input.hours.unwrap_or_default(),
            description: input.description.unwrap_or_default(),
            date: input.date.unwrap_or(now),
        });
    }
    Ok(entries)
}

fn resolve_materials(inputs: Vec<MaterialEntryInput>) -> Result<Vec<MaterialEntry>, ApiError> {
    inputs
        .into_iter()
        .enumerate()
        .map(|(i, input)| {
            validate(&input).map_err(|e| entry_error("materialEntries", i, e))?;
            let quantity = input.quantity.unwrap_or_default();
            let unit_price = input.unit_price.unwrap_or_default();
            Ok(MaterialEntry {
                name: input.name.unwrap_or_default(),
                quantity,
                unit_price,
                total_price: input.total_price.unwrap_or(quantity * unit_price),
                description: input.description,
            })
        })
        .collect()
}

/// Allow `actor` if they created the albaran or belong to its project's company.
pub(crate) async fn ensure_albaran_access<P, C>(
    projects: &P,
    companies: &C,
    actor: &str,
    albaran: &Albaran,
) -> Result<(), ApiError>
where
    P: ProjectRepository,
    C: CompanyRepository,
{
    if actor == albaran.created_by {
        return Ok(());
    }
    let compania = projects
        .find_by_id(albaran.project)
        .await?
        .and_then(|p| p.compania);
    ensure_owner_or_member(
        companies,
        actor,
        &albaran.created_by,
        compania,
        Resource::Albaran,
    )
    .await
}

/// Resolve the records an albaran references for display.
pub(crate) async fn load_details<U, P, R>(
    users: &U,
    projects: &P,
    clients: &R,
    albaran: Albaran,
) -> Result<AlbaranDetails, ApiError>
where
    U: UserRepository,
    P: ProjectRepository,
    R: ClientRepository,
{
    let project = projects.find_by_id(albaran.project).await?;
    let client = clients.find_by_id(albaran.client).await?;
    let creator = users
        .find_by_email(&albaran.created_by)
        .await?
        .map(|u| u.profile());

    let mut emails: Vec<String> = albaran.hours_entries.iter().map(|e| e.user.clone()).collect();
    emails.sort();
    emails.dedup();
    let by_email: HashMap<String, _> = users
        .find_by_emails(&emails)
        .await?
        .into_iter()
        .map(|u| (u.email.clone(), u.profile()))
        .collect();
    let entry_users = albaran
        .hours_entries
        .iter()
        .map(|e| by_email.get(&e.user).cloned())
        .collect();

    Ok(AlbaranDetails {
        albaran,
        project,
        client,
        creator,
        entry_users,
    })
}

// ── CreateAlbaran ────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct CreateAlbaranInput {
    pub project: Option<Uuid>,
    pub date: Option<DateTime<Utc>>,
    pub hours_entries: Vec<HoursEntryInput>,
    pub material_entries: Vec<MaterialEntryInput>,
    pub observations: Option<String>,
}

impl Validate for CreateAlbaranInput {
    const SCHEMA: &'static [FieldRule] = &[FieldRule::new("projectId", &[Rule::Required])];

    fn value(&self, field: &str) -> FieldValue<'_> {
        match field {
            "projectId" => FieldValue::presence(&self.project),
            _ => FieldValue::Absent,
        }
    }
}

pub struct CreateAlbaranUseCase<A, P, R, U>
where
    A: AlbaranRepository,
    P: ProjectRepository,
    R: ClientRepository,
    U: UserRepository,
{
    pub albaranes: A,
    pub projects: P,
    pub clients: R,
    pub users: U,
}

impl<A, P, R, U> CreateAlbaranUseCase<A, P, R, U>
where
    A: AlbaranRepository,
    P: ProjectRepository,
    R: ClientRepository,
    U: UserRepository,
{
    pub async fn execute(&self, actor: &str, input: CreateAlbaranInput) -> Result<Albaran, ApiError> {
        validate(&input)?;
        let project_id = input.project.unwrap_or_default();

        // 1. Project must exist and be active; its client must exist
        let project = self
            .projects
            .find_by_id(project_id)
            .await?
            .ok_or(ApiError::NotFound(Resource::Project))?;
        if !project.activo {
            return Err(ApiError::Inactive(Resource::Project));
        }
        let client = self
            .clients
            .find_by_id(project.cliente)
            .await?
            .ok_or(ApiError::NotFound(Resource::Client))?;

        // 2. Creator must be a validated user
        validated_user(&self.users, actor).await?;

        // 3. Entries
        let now = Utc::now();
        let hours_entries = resolve_hours(&self.users, input.hours_entries, now).await?;
        let material_entries = resolve_materials(input.material_entries)?;

        // 4. Per-year number
        let year = numbering_year(now);
        let existing = self
            .albaranes
            .count_with_prefix(&albaran_number_prefix(year))
            .await?;

        let mut albaran = Albaran {
            id: Uuid::new_v4(),
            number: albaran_number(year, existing + 1),
            project: project.id,
            client: client.id,
            created_by: actor.to_owned(),
            date: input.date.unwrap_or(now),
            hours_entries,
            material_entries,
            observations: input.observations,
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
        };
        albaran.recompute_totals();
        self.albaranes.create(&albaran).await?;
        tracing::info!(albaran_id = %albaran.id, number = %albaran.number, "albaran created");
        Ok(albaran)
    }
}

// ── ListAlbaranes ────────────────────────────────────────────────────────────

pub struct ListAlbaranesUseCase<A, P, R>
where
    A: AlbaranRepository,
    P: ProjectRepository,
    R: ClientRepository,
{
    pub albaranes: A,
    pub projects: P,
    pub clients: R,
}

impl<A, P, R> ListAlbaranesUseCase<A, P, R>
where
    A: AlbaranRepository,
    P: ProjectRepository,
    R: ClientRepository,
{
    /// Each referenced project and client is loaded once per call.
    pub async fn execute(&self, filter: AlbaranFilter) -> Result<Vec<AlbaranListItem>, ApiError> {
        let albaranes = self.albaranes.list(filter).await?;

        let mut projects = HashMap::new();
        let mut clients = HashMap::new();
        let mut items = Vec::with_capacity(albaranes.len());
        for albaran in albaranes {
            if !projects.contains_key(&albaran.project) {
                let project = self.projects.find_by_id(albaran.project).await?;
                projects.insert(albaran.project, project);
            }
            if !clients.contains_key(&albaran.client) {
                let client = self.clients.find_by_id(albaran.client).await?;
                clients.insert(albaran.client, client);
            }
            items.push(AlbaranListItem {
                project: projects.get(&albaran.project).cloned().flatten(),
                client: clients.get(&albaran.client).cloned().flatten(),
                albaran,
            });
        }
        Ok(items)
    }
}

// ── GetAlbaran ───────────────────────────────────────────────────────────────

pub struct GetAlbaranUseCase<A, P, R, U>
where
    A: AlbaranRepository,
    P: ProjectRepository,
    R: ClientRepository,
    U: UserRepository,
{
    pub albaranes: A,
    pub projects: P,
    pub clients: R,
    pub users: U,
}

impl<A, P, R, U> GetAlbaranUseCase<A, P, R, U>
where
    A: AlbaranRepository,
    P: ProjectRepository,
    R: ClientRepository,
    U: UserRepository,
{
    pub async fn execute(&self, id: Uuid) -> Result<AlbaranDetails, ApiError> {
        let albaran = self
            .albaranes
            .find_by_id(id)
            .await?
            .ok_or(ApiError::NotFound(Resource::Albaran))?;
        load_details(&self.users, &self.projects, &self.clients, albaran).await
    }
}

// ── UpdateAlbaran ────────────────────────────────────────────────────────────

/// Mutable albaran fields. Entry lists replace the stored ones wholesale.
#[derive(Default)]
pub struct AlbaranPatch {
    pub hours_entries: Option<Vec<HoursEntryInput>>,
    pub material_entries: Option<Vec<MaterialEntryInput>>,
    /// `Some(None)` clears the observations.
    pub observations: Option<Option<String>>,
    pub is_signed: Option<bool>,
    pub signed_by: Option<String>,
    pub signature_image: Option<String>,
}

pub struct UpdateAlbaranUseCase<A, P, C, U>
where
    A: AlbaranRepository,
    P: ProjectRepository,
    C: CompanyRepository,
    U: UserRepository,
{
    pub albaranes: A,
    pub projects: P,
    pub companies: C,
    pub users: U,
}

impl<A, P, C, U> UpdateAlbaranUseCase<A, P, C, U>
where
    A: AlbaranRepository,
    P: ProjectRepository,
    C: CompanyRepository,
    U: UserRepository,
{
    pub async fn execute(&self, id: Uuid, actor: &str, patch: AlbaranPatch) -> Result<Albaran, ApiError> {
        // 1. Exists → 404
        let mut albaran = self
            .albaranes
            .find_by_id(id)
            .await?
            .ok_or(ApiError::NotFound(Resource::Albaran))?;

        // 2. Creator or project company member → 403
        ensure_albaran_access(&self.projects, &self.companies, actor, &albaran).await?;

        // 3. Terminal states reject every change
        if albaran.is_signed {
            return Err(ApiError::Locked);
        }
        if albaran.status == AlbaranStatus::Cancelled {
            return Err(ApiError::Cancelled);
        }

        let now = Utc::now();
        if let Some(inputs) = patch.hours_entries {
            albaran.hours_entries = resolve_hours(&self.users, inputs, now).await?;
        }
        if let Some(inputs) = patch.material_entries {
            albaran.material_entries = resolve_materials(inputs)?;
        }
        if let Some(observations) = patch.observations {
            albaran.observations = observations;
        }

        // 4. Signing is one-way
        let signing = patch.is_signed.unwrap_or(false);
        if signing {
            let signed_by = patch.signed_by.unwrap_or_else(|| actor.to_owned());
            albaran.sign(signed_by, patch.signature_image, now);
        }

        albaran.recompute_totals();
        albaran.updated_at = now;
        self.albaranes.update(&albaran).await?;
        if signing {
            tracing::info!(albaran_id = %albaran.id, number = %albaran.number, "albaran signed");
        }
        Ok(albaran)
    }
}

// ── DeleteAlbaran ────────────────────────────────────────────────────────────

pub struct DeleteAlbaranUseCase<A, P, C>
where
    A: AlbaranRepository,
    P: ProjectRepository,
    C: CompanyRepository,
{
    pub albaranes: A,
    pub projects: P,
    pub companies: C,
}

impl<A, P, C> DeleteAlbaranUseCase<A, P, C>
where
    A: AlbaranRepository,
    P: ProjectRepository,
    C: CompanyRepository,
{
    /// Soft delete: the status becomes cancelled. Repeating it is a no-op.
    pub async fn execute(&self, id: Uuid, actor: &str) -> Result<(), ApiError> {
        let mut albaran = self
            .albaranes
            .find_by_id(id)
            .await?
            .ok_or(ApiError::NotFound(Resource::Albaran))?;
        ensure_albaran_access(&self.projects, &self.companies, actor, &albaran).await?;

        if albaran.is_signed {
            return Err(ApiError::Locked);
        }
        if albaran.status == AlbaranStatus::Cancelled {
            return Ok(());
        }

        albaran.status = AlbaranStatus::Cancelled;
        albaran.updated_at = Utc::now();
        self.albaranes.update(&albaran).await?;
        tracing::info!(albaran_id = %albaran.id, number = %albaran.number, "albaran cancelled");
        Ok(())
    }
}
