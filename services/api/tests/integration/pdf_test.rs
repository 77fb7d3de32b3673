use albaran_api::error::{ApiError, Resource};
use albaran_api::infra::pdf::PdfWriterRenderer;
use albaran_api::infra::storage::FsPdfStorage;
use albaran_api::usecase::pdf::GeneratePdfUseCase;

use crate::helpers::{
    MemoryStore, MockPdfRenderer, MockPdfStorage, World, signed_albaran, test_albaran, world,
};

type MockGenerate = GeneratePdfUseCase<
    MemoryStore,
    MemoryStore,
    MemoryStore,
    MemoryStore,
    MemoryStore,
    MockPdfRenderer,
    MockPdfStorage,
>;

fn generate(w: &World, renderer: &MockPdfRenderer, storage: &MockPdfStorage) -> MockGenerate {
    GeneratePdfUseCase {
        albaranes: w.store.clone(),
        projects: w.store.clone(),
        clients: w.store.clone(),
        companies: w.store.clone(),
        users: w.store.clone(),
        renderer: renderer.clone(),
        storage: storage.clone(),
    }
}

#[tokio::test]
async fn should_render_signed_albaran_and_remember_location() {
    let w = world();
    let albaran = signed_albaran(&w.creator, &w.project);
    w.store.albaranes.lock().unwrap().push(albaran.clone());
    let renderer = MockPdfRenderer::default();
    let storage = MockPdfStorage::default();

    let document = generate(&w, &renderer, &storage)
        .execute(albaran.id, &w.creator)
        .await
        .unwrap();
    assert_eq!(document.filename, "albaran-ALB-2024-00001.pdf");
    assert!(document.bytes.starts_with(b"%PDF"));
    assert_eq!(
        w.store.albaran(albaran.id).pdf_url.as_deref(),
        Some("mem://albaran-ALB-2024-00001.pdf")
    );
}

#[tokio::test]
async fn should_serve_cached_render_on_repeat() {
    let w = world();
    let albaran = signed_albaran(&w.creator, &w.project);
    w.store.albaranes.lock().unwrap().push(albaran.clone());
    let renderer = MockPdfRenderer::default();
    let storage = MockPdfStorage::default();
    let usecase = generate(&w, &renderer, &storage);

    let first = usecase.execute(albaran.id, &w.creator).await.unwrap();
    let second = usecase.execute(albaran.id, &w.member).await.unwrap();
    assert_eq!(first.bytes, second.bytes);
    assert_eq!(renderer.render_count(), 1);
}

#[tokio::test]
async fn should_rerender_when_cached_file_is_gone() {
    let w = world();
    let albaran = signed_albaran(&w.creator, &w.project);
    w.store.albaranes.lock().unwrap().push(albaran.clone());
    let renderer = MockPdfRenderer::default();
    let storage = MockPdfStorage::default();
    let usecase = generate(&w, &renderer, &storage);

    usecase.execute(albaran.id, &w.creator).await.unwrap();
    storage.remove_all();
    let document = usecase.execute(albaran.id, &w.creator).await.unwrap();
    assert!(!document.bytes.is_empty());
    assert_eq!(renderer.render_count(), 2);
}

#[tokio::test]
async fn should_refuse_unsigned_albaran() {
    let w = world();
    let albaran = test_albaran(&w.creator, &w.project);
    w.store.albaranes.lock().unwrap().push(albaran.clone());
    let renderer = MockPdfRenderer::default();
    let result = generate(&w, &renderer, &MockPdfStorage::default())
        .execute(albaran.id, &w.creator)
        .await;
    assert!(matches!(result, Err(ApiError::Precondition(_))));
    assert_eq!(renderer.render_count(), 0);
}

#[tokio::test]
async fn should_forbid_outsider_from_downloading() {
    let w = world();
    let albaran = signed_albaran(&w.creator, &w.project);
    w.store.albaranes.lock().unwrap().push(albaran.clone());
    let result = generate(&w, &MockPdfRenderer::default(), &MockPdfStorage::default())
        .execute(albaran.id, &w.outsider)
        .await;
    assert!(matches!(result, Err(ApiError::Forbidden(Resource::Albaran))));
}

#[tokio::test]
async fn should_write_real_pdf_to_disk() {
    let w = world();
    let albaran = signed_albaran(&w.creator, &w.project);
    w.store.albaranes.lock().unwrap().push(albaran.clone());
    let dir = tempfile::tempdir().unwrap();
    let usecase = GeneratePdfUseCase {
        albaranes: w.store.clone(),
        projects: w.store.clone(),
        clients: w.store.clone(),
        companies: w.store.clone(),
        users: w.store.clone(),
        renderer: PdfWriterRenderer::default(),
        storage: FsPdfStorage {
            root: dir.path().to_path_buf(),
        },
    };

    let document = usecase.execute(albaran.id, &w.member).await.unwrap();
    assert!(document.bytes.starts_with(b"%PDF-"));
    let location = w.store.albaran(albaran.id).pdf_url.unwrap();
    assert_eq!(std::fs::read(location).unwrap(), document.bytes);
}
