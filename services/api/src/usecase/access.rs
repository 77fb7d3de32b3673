//! Checks shared by the client, project and albaran use cases.

use uuid::Uuid;

use crate::domain::repository::{CompanyRepository, UserRepository};
use crate::domain::types::{Company, User};
use crate::error::{ApiError, Resource};

/// Allow `actor` if they own the record or belong to its company.
///
/// A missing company grants nothing beyond ownership.
pub async fn ensure_owner_or_member<C: CompanyRepository>(
    companies: &C,
    actor: &str,
    owner: &str,
    compania: Option<Uuid>,
    resource: Resource,
) -> Result<(), ApiError> {
    if actor == owner {
        return Ok(());
    }
    let Some(id) = compania else {
        return Err(ApiError::Forbidden(resource));
    };
    match companies.find_by_id(id).await? {
        Some(company) if company.includes(actor) => Ok(()),
        _ => Err(ApiError::Forbidden(resource)),
    }
}

/// Resolve a company that `actor` wants to attach a record to.
pub async fn member_company<C: CompanyRepository>(
    companies: &C,
    id: Uuid,
    actor: &str,
) -> Result<Company, ApiError> {
    let company = companies
        .find_by_id(id)
        .await?
        .ok_or(ApiError::NotFound(Resource::Company))?;
    if !company.includes(actor) {
        return Err(ApiError::Forbidden(Resource::Company));
    }
    Ok(company)
}

/// The user behind `email`, which must exist and be validated.
pub async fn validated_user<U: UserRepository>(users: &U, email: &str) -> Result<User, ApiError> {
    let user = users
        .find_by_email(email)
        .await?
        .ok_or_else(|| ApiError::UnknownUser(email.to_owned()))?;
    if !user.is_validated {
        return Err(ApiError::Unvalidated(email.to_owned()));
    }
    Ok(user)
}
