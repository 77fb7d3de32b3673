use chrono::Utc;
use uuid::Uuid;

use albaran_domain::schema::{FieldRule, FieldValue, Rule, Validate, validate};

use crate::domain::repository::{CompanyRepository, UserRepository};
use crate::domain::types::Company;
use crate::error::{ApiError, Resource};
use crate::usecase::access::validated_user;

// ── CreateCompany ────────────────────────────────────────────────────────────

pub struct CreateCompanyInput {
    pub nif: Option<String>,
    pub nombre: Option<String>,
    /// Defaults to the acting user.
    pub jefe: Option<String>,
    pub miembros: Vec<String>,
}

impl Validate for CreateCompanyInput {
    const SCHEMA: &'static [FieldRule] = &[
        FieldRule::new("nif", &[Rule::Required]),
        FieldRule::new("nombre", &[Rule::Required]),
        FieldRule::new("emailJefe", &[Rule::NonEmpty, Rule::Email]),
    ];

    fn value(&self, field: &str) -> FieldValue<'_> {
        match field {
            "nif" => FieldValue::text(&self.nif),
            "nombre" => FieldValue::text(&self.nombre),
            "emailJefe" => FieldValue::text(&self.jefe),
            _ => FieldValue::Absent,
        }
    }
}

pub struct CreateCompanyUseCase<C: CompanyRepository, U: UserRepository> {
    pub companies: C,
    pub users: U,
}

impl<C: CompanyRepository, U: UserRepository> CreateCompanyUseCase<C, U> {
    pub async fn execute(&self, actor: &str, input: CreateCompanyInput) -> Result<Company, ApiError> {
        validate(&input)?;
        let nif = input.nif.unwrap_or_default();

        // 1. NIF must be free
        if self.companies.find_by_nif(&nif).await?.is_some() {
            return Err(ApiError::Duplicate {
                entity: Resource::Company,
                field: "nif",
                value: nif,
            });
        }

        // 2. Jefe and every member must be validated users
        let jefe = input.jefe.unwrap_or_else(|| actor.to_owned());
        validated_user(&self.users, &jefe).await?;
        for miembro in &input.miembros {
            validated_user(&self.users, miembro).await?;
        }

        let now = Utc::now();
        let company = Company {
            id: Uuid::new_v4(),
            nif,
            nombre: input.nombre.unwrap_or_default(),
            jefe,
            miembros: input.miembros,
            created_at: now,
            updated_at: now,
        };
        self.companies.create(&company).await?;
        tracing::info!(company_id = %company.id, "company created");
        Ok(company)
    }
}

// ── ListCompanies ────────────────────────────────────────────────────────────

pub struct ListCompaniesUseCase<C: CompanyRepository> {
    pub companies: C,
}

impl<C: CompanyRepository> ListCompaniesUseCase<C> {
    pub async fn execute(&self, actor: &str) -> Result<Vec<Company>, ApiError> {
        self.companies.list_by_member(actor).await
    }
}
