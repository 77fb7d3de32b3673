use std::io::ErrorKind;
use std::path::PathBuf;

use anyhow::Context as _;

use crate::domain::repository::PdfStorage;
use crate::error::ApiError;
use crate::usecase::pdf::pdf_filename;

/// Rendered PDFs on the local filesystem, one file per albaran number.
#[derive(Clone)]
pub struct FsPdfStorage {
    pub root: PathBuf,
}

impl PdfStorage for FsPdfStorage {
    async fn load(&self, location: &str) -> Result<Option<Vec<u8>>, ApiError> {
        match tokio::fs::read(location).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(anyhow::Error::new(e)
                .context(format!("read cached pdf {location}"))
                .into()),
        }
    }

    async fn store(&self, number: &str, bytes: &[u8]) -> Result<String, ApiError> {
        tokio::fs::create_dir_all(&self.root)
            .await
            .with_context(|| format!("create pdf dir {}", self.root.display()))?;
        let path = self.root.join(pdf_filename(number));
        tokio::fs::write(&path, bytes)
            .await
            .with_context(|| format!("write pdf {}", path.display()))?;
        Ok(path.to_string_lossy().into_owned())
    }
}
