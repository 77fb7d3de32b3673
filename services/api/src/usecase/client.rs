use chrono::Utc;
use uuid::Uuid;

use albaran_domain::schema::{FieldRule, FieldValue, Rule, Validate, validate};

use crate::domain::repository::{ClientRepository, CompanyRepository, UserRepository};
use crate::domain::types::{Client, ClientFilter};
use crate::error::{ApiError, Resource};
use crate::usecase::access::{ensure_owner_or_member, member_company, validated_user};

async fn ensure_email_free<R: ClientRepository>(
    clients: &R,
    email: &str,
    except: Option<Uuid>,
) -> Result<(), ApiError> {
    match clients.find_by_email(email).await? {
        Some(other) if Some(other.id) != except => Err(ApiError::Duplicate {
            entity: Resource::Client,
            field: "email",
            value: email.to_owned(),
        }),
        _ => Ok(()),
    }
}

async fn ensure_nif_free<R: ClientRepository>(
    clients: &R,
    nif: &str,
    except: Option<Uuid>,
) -> Result<(), ApiError> {
    match clients.find_by_nif(nif).await? {
        Some(other) if Some(other.id) != except => Err(ApiError::Duplicate {
            entity: Resource::Client,
            field: "nif",
            value: nif.to_owned(),
        }),
        _ => Ok(()),
    }
}

// ── CreateClient ─────────────────────────────────────────────────────────────

pub struct CreateClientInput {
    pub nombre: Option<String>,
    pub apellidos: Option<String>,
    pub email: Option<String>,
    pub telefono: Option<String>,
    pub nif: Option<String>,
    pub direccion: Option<String>,
    pub compania: Option<Uuid>,
}

impl Validate for CreateClientInput {
    const SCHEMA: &'static [FieldRule] = &[
        FieldRule::new("nombre", &[Rule::Required]),
        FieldRule::new("apellidos", &[Rule::Required]),
        FieldRule::new("email", &[Rule::Required]),
        FieldRule::new("telefono", &[Rule::Required]),
        FieldRule::new("nif", &[Rule::Required]),
        FieldRule::new("direccion", &[Rule::Required]),
        // Shape is checked after presence of every field.
        FieldRule::new("email", &[Rule::Email]),
    ];

    fn value(&self, field: &str) -> FieldValue<'_> {
        match field {
            "nombre" => FieldValue::text(&self.nombre),
            "apellidos" => FieldValue::text(&self.apellidos),
            "email" => FieldValue::text(&self.email),
            "telefono" => FieldValue::text(&self.telefono),
            "nif" => FieldValue::text(&self.nif),
            "direccion" => FieldValue::text(&self.direccion),
            _ => FieldValue::Absent,
        }
    }
}

pub struct CreateClientUseCase<R, C, U>
where
    R: ClientRepository,
    C: CompanyRepository,
    U: UserRepository,
{
    pub clients: R,
    pub companies: C,
    pub users: U,
}

impl<R, C, U> CreateClientUseCase<R, C, U>
where
    R: ClientRepository,
    C: CompanyRepository,
    U: UserRepository,
{
    pub async fn execute(&self, actor: &str, input: CreateClientInput) -> Result<Client, ApiError> {
        validate(&input)?;
        let email = input.email.unwrap_or_default();
        let nif = input.nif.unwrap_or_default();

        // 1. Email, then NIF, must be free
        ensure_email_free(&self.clients, &email, None).await?;
        ensure_nif_free(&self.clients, &nif, None).await?;

        // 2. Creator must be a validated user
        validated_user(&self.users, actor).await?;

        // 3. Optional company must exist and include the creator
        if let Some(id) = input.compania {
            member_company(&self.companies, id, actor).await?;
        }

        let now = Utc::now();
        let client = Client {
            id: Uuid::new_v4(),
            nombre: input.nombre.unwrap_or_default(),
            apellidos: input.apellidos.unwrap_or_default(),
            email,
            telefono: input.telefono.unwrap_or_default(),
            nif,
            direccion: input.direccion.unwrap_or_default(),
            creador: actor.to_owned(),
            compania: input.compania,
            activo: true,
            created_at: now,
            updated_at: now,
        };
        self.clients.create(&client).await?;
        tracing::info!(client_id = %client.id, "client created");
        Ok(client)
    }
}

// ── ListClients ──────────────────────────────────────────────────────────────

pub struct ListClientsUseCase<R: ClientRepository> {
    pub clients: R,
}

impl<R: ClientRepository> ListClientsUseCase<R> {
    pub async fn execute(&self, filter: ClientFilter) -> Result<Vec<Client>, ApiError> {
        self.clients.list_active(filter).await
    }
}

// ── GetClient ────────────────────────────────────────────────────────────────

pub struct GetClientUseCase<R: ClientRepository> {
    pub clients: R,
}

impl<R: ClientRepository> GetClientUseCase<R> {
    pub async fn execute(&self, id: Uuid) -> Result<Client, ApiError> {
        self.clients
            .find_by_id(id)
            .await?
            .ok_or(ApiError::NotFound(Resource::Client))
    }
}

// ── UpdateClient ─────────────────────────────────────────────────────────────

/// Mutable client fields. `compania: Some(None)` detaches the company.
#[derive(Default)]
pub struct ClientPatch {
    pub nombre: Option<String>,
    pub apellidos: Option<String>,
    pub email: Option<String>,
    pub telefono: Option<String>,
    pub nif: Option<String>,
    pub direccion: Option<String>,
    pub compania: Option<Option<Uuid>>,
}

impl Validate for ClientPatch {
    const SCHEMA: &'static [FieldRule] = &[
        FieldRule::new("nombre", &[Rule::NonEmpty]),
        FieldRule::new("apellidos", &[Rule::NonEmpty]),
        FieldRule::new("email", &[Rule::NonEmpty, Rule::Email]),
        FieldRule::new("telefono", &[Rule::NonEmpty]),
        FieldRule::new("nif", &[Rule::NonEmpty]),
        FieldRule::new("direccion", &[Rule::NonEmpty]),
    ];

    fn value(&self, field: &str) -> FieldValue<'_> {
        match field {
            "nombre" => FieldValue::text(&self.nombre),
            "apellidos" => FieldValue::text(&self.apellidos),
            "email" => FieldValue::text(&self.email),
            "telefono" => FieldValue::text(&self.telefono),
            "nif" => FieldValue::text(&self.nif),
            "direccion" => FieldValue::text(&self.direccion),
            _ => FieldValue::Absent,
        }
    }
}

pub struct UpdateClientUseCase<R: ClientRepository, C: CompanyRepository> {
    pub clients: R,
    pub companies: C,
}

impl<R: ClientRepository, C: CompanyRepository> UpdateClientUseCase<R, C> {
    pub async fn execute(&self, id: Uuid, actor: &str, patch: ClientPatch) -> Result<Client, ApiError> {
        // 1. Exists → 404
        let mut client = self
            .clients
            .find_by_id(id)
            .await?
            .ok_or(ApiError::NotFound(Resource::Client))?;

        // 2. Owner or company member → 403
        ensure_owner_or_member(
            &self.companies,
            actor,
            &client.creador,
            client.compania,
            Resource::Client,
        )
        .await?;

        // 3. Field rules, then uniqueness excluding self
        validate(&patch)?;
        if let Some(email) = &patch.email {
            if *email != client.email {
                ensure_email_free(&self.clients, email, Some(client.id)).await?;
            }
        }
        if let Some(nif) = &patch.nif {
            if *nif != client.nif {
                ensure_nif_free(&self.clients, nif, Some(client.id)).await?;
            }
        }

        // 4. Company reassignment
        if let Some(compania) = patch.compania {
            if let Some(company_id) = compania {
                member_company(&self.companies, company_id, actor).await?;
            }
            client.compania = compania;
        }

        if let Some(v) = patch.nombre {
            client.nombre = v;
        }
        if let Some(v) = patch.apellidos {
            client.apellidos = v;
        }
        if let Some(v) = patch.email {
            client.email = v;
        }
        if let Some(v) = patch.telefono {
            client.telefono = v;
        }
        if let Some(v) = patch.nif {
            client.nif = v;
        }
        if let Some(v) = patch.direccion {
            client.direccion = v;
        }
        client.updated_at = Utc::now();
        self.clients.update(&client).await?;
        Ok(client)
    }
}

// ── DeleteClient ─────────────────────────────────────────────────────────────

pub struct DeleteClientUseCase<R: ClientRepository, C: CompanyRepository> {
    pub clients: R,
    pub companies: C,
}

impl<R: ClientRepository, C: CompanyRepository> DeleteClientUseCase<R, C> {
    /// Soft delete: the row stays, `activo` becomes false.
    pub async fn execute(&self, id: Uuid, actor: &str) -> Result<(), ApiError> {
        let mut client = self
            .clients
            .find_by_id(id)
            .await?
            .ok_or(ApiError::NotFound(Resource::Client))?;
        ensure_owner_or_member(
            &self.companies,
            actor,
            &client.creador,
            client.compania,
            Resource::Client,
        )
        .await?;

        client.activo = false;
        client.updated_at = Utc::now();
        self.clients.update(&client).await?;
        tracing::info!(client_id = %client.id, "client deactivated");
        Ok(())
    }
}
