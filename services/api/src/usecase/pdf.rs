use chrono::Utc;
use uuid::Uuid;

use crate::domain::repository::{
    AlbaranRepository, ClientRepository, CompanyRepository, PdfRenderer, PdfStorage,
    ProjectRepository, UserRepository,
};
use crate::domain::types::PdfDocument;
use crate::error::{ApiError, Resource};
use crate::usecase::albaran::{ensure_albaran_access, load_details};

/// Download name for an albaran's PDF.
pub fn pdf_filename(number: &str) -> String {
    format!("albaran-{number}.pdf")
}

/// Render a signed albaran, reusing the cached file when it still exists.
pub struct GeneratePdfUseCase<A, P, R, C, U, G, S>
where
    A: AlbaranRepository,
    P: ProjectRepository,
    R: ClientRepository,
    C: CompanyRepository,
    U: UserRepository,
    G: PdfRenderer,
    S: PdfStorage,
{
    pub albaranes: A,
    pub projects: P,
    pub clients: R,
    pub companies: C,
    pub users: U,
    pub renderer: G,
    pub storage: S,
}

impl<A, P, R, C, U, G, S> GeneratePdfUseCase<A, P, R, C, U, G, S>
where
    A: AlbaranRepository,
    P: ProjectRepository,
    R: ClientRepository,
    C: CompanyRepository,
    U: UserRepository,
    G: PdfRenderer,
    S: PdfStorage,
{
    pub async fn execute(&self, id: Uuid, actor: &str) -> Result<PdfDocument, ApiError> {
        // 1. Exists → 404, access → 403
        let mut albaran = self
            .albaranes
            .find_by_id(id)
            .await?
            .ok_or(ApiError::NotFound(Resource::Albaran))?;
        ensure_albaran_access(&self.projects, &self.companies, actor, &albaran).await?;

        // 2. Only signed albaranes are exported
        if !albaran.is_signed {
            return Err(ApiError::Precondition(
                "albaran must be signed before generating a PDF".into(),
            ));
        }
        let filename = pdf_filename(&albaran.number);

        // 3. Cached render
        if let Some(location) = &albaran.pdf_url {
            if let Some(bytes) = self.storage.load(location).await? {
                return Ok(PdfDocument { filename, bytes });
            }
            tracing::warn!(albaran_id = %albaran.id, %location, "cached pdf missing, re-rendering");
        }

        // 4. Render, store, remember the location
        let details = load_details(&self.users, &self.projects, &self.clients, albaran.clone()).await?;
        let bytes = self.renderer.render(&details).await?;
        let location = self.storage.store(&albaran.number, &bytes).await?;
        albaran.pdf_url = Some(location);
        albaran.updated_at = Utc::now();
        self.albaranes.update(&albaran).await?;
        tracing::info!(albaran_id = %albaran.id, number = %albaran.number, "pdf rendered");

        Ok(PdfDocument { filename, bytes })
    }
}
