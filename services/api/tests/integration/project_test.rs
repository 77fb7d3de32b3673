use albaran_api::domain::types::ProjectFilter;
use albaran_api::error::{ApiError, Resource};
use albaran_api::usecase::project::{
    CreateProjectInput, CreateProjectUseCase, DeleteProjectUseCase, GetProjectUseCase,
    ListProjectsUseCase, ProjectPatch, UpdateProjectUseCase,
};
use albaran_domain::status::ProjectStatus;

use crate::helpers::{MemoryStore, World, date, test_client, world};

fn input(w: &World, inicio: (i32, u32, u32), fin: (i32, u32, u32)) -> CreateProjectInput {
    CreateProjectInput {
        titulo: Some("Instalación eléctrica".to_owned()),
        descripcion: Some("Cuadro y cableado".to_owned()),
        fecha_inicio: Some(date(inicio.0, inicio.1, inicio.2)),
        fecha_fin: Some(date(fin.0, fin.1, fin.2)),
        estado: None,
        presupuesto: Some(1200.0),
        cliente: Some(w.client.id),
        compania: Some(w.company.id),
    }
}

fn create(w: &World) -> CreateProjectUseCase<MemoryStore, MemoryStore, MemoryStore, MemoryStore> {
    CreateProjectUseCase {
        projects: w.store.clone(),
        clients: w.store.clone(),
        companies: w.store.clone(),
        users: w.store.clone(),
    }
}

fn update(w: &World) -> UpdateProjectUseCase<MemoryStore, MemoryStore, MemoryStore> {
    UpdateProjectUseCase {
        projects: w.store.clone(),
        clients: w.store.clone(),
        companies: w.store.clone(),
    }
}

// ── CreateProject ────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_reject_inverted_date_range_and_accept_swapped() {
    let w = world();
    let result = create(&w)
        .execute(&w.creator, input(&w, (2024, 6, 1), (2024, 5, 1)))
        .await;
    assert!(matches!(result, Err(ApiError::DateRange)));

    let project = create(&w)
        .execute(&w.creator, input(&w, (2024, 5, 1), (2024, 6, 1)))
        .await
        .unwrap();
    assert!(project.fecha_inicio < project.fecha_fin);
    assert_eq!(project.estado, ProjectStatus::Pendiente);
    assert!(project.activo);
}

#[tokio::test]
async fn should_reject_equal_start_and_end() {
    let w = world();
    let result = create(&w)
        .execute(&w.creator, input(&w, (2024, 5, 1), (2024, 5, 1)))
        .await;
    assert!(matches!(result, Err(ApiError::DateRange)));
}

#[tokio::test]
async fn should_reject_inactive_client() {
    let w = world();
    let mut retired = test_client(&w.creator, None);
    retired.activo = false;
    w.store.clients.lock().unwrap().push(retired.clone());
    let mut body = input(&w, (2024, 5, 1), (2024, 6, 1));
    body.cliente = Some(retired.id);
    let result = create(&w).execute(&w.creator, body).await;
    assert!(matches!(result, Err(ApiError::Inactive(Resource::Client))));
}

#[tokio::test]
async fn should_reject_negative_budget() {
    let w = world();
    let mut body = input(&w, (2024, 5, 1), (2024, 6, 1));
    body.presupuesto = Some(-1.0);
    let result = create(&w).execute(&w.creator, body).await;
    match result {
        Err(ApiError::Validation(msg)) => assert!(msg.starts_with("presupuesto"), "{msg}"),
        other => panic!("expected Validation, got {:?}", other.err()),
    }
}

#[tokio::test]
async fn should_reject_company_outside_membership() {
    let w = world();
    let result = create(&w)
        .execute(&w.outsider, input(&w, (2024, 5, 1), (2024, 6, 1)))
        .await;
    assert!(matches!(result, Err(ApiError::Forbidden(Resource::Company))));
}

// ── UpdateProject ────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_recheck_range_when_one_date_changes() {
    let w = world();
    // Existing range is 2024-05-01 .. 2024-06-01
    let patch = ProjectPatch {
        fecha_inicio: Some(date(2024, 7, 1)),
        ..Default::default()
    };
    let result = update(&w).execute(w.project.id, &w.creator, patch).await;
    assert!(matches!(result, Err(ApiError::DateRange)));
    assert_eq!(w.store.project(w.project.id).fecha_inicio, date(2024, 5, 1));
}

#[tokio::test]
async fn should_let_member_change_status() {
    let w = world();
    let patch = ProjectPatch {
        estado: Some(ProjectStatus::EnProgreso),
        ..Default::default()
    };
    let project = update(&w)
        .execute(w.project.id, &w.member, patch)
        .await
        .unwrap();
    assert_eq!(project.estado, ProjectStatus::EnProgreso);
}

#[tokio::test]
async fn should_forbid_outsider_from_updating_project() {
    let w = world();
    let result = update(&w)
        .execute(w.project.id, &w.outsider, ProjectPatch::default())
        .await;
    assert!(matches!(result, Err(ApiError::Forbidden(Resource::Project))));
}

#[tokio::test]
async fn should_move_project_to_another_active_client() {
    let w = world();
    let other = test_client(&w.creator, None);
    w.store.clients.lock().unwrap().push(other.clone());
    let patch = ProjectPatch {
        cliente: Some(other.id),
        ..Default::default()
    };
    let project = update(&w)
        .execute(w.project.id, &w.creator, patch)
        .await
        .unwrap();
    assert_eq!(project.cliente, other.id);
}

// ── DeleteProject / List / Get ───────────────────────────────────────────────

#[tokio::test]
async fn should_soft_delete_project() {
    let w = world();
    let delete = DeleteProjectUseCase {
        projects: w.store.clone(),
        companies: w.store.clone(),
    };
    delete.execute(w.project.id, &w.member).await.unwrap();

    let get = GetProjectUseCase {
        projects: w.store.clone(),
    };
    assert!(!get.execute(w.project.id).await.unwrap().activo);

    let list = ListProjectsUseCase {
        projects: w.store.clone(),
    };
    assert!(list.execute(ProjectFilter::All).await.unwrap().is_empty());
    assert!(
        list.execute(ProjectFilter::Cliente(w.client.id))
            .await
            .unwrap()
            .is_empty()
    );
}

#[tokio::test]
async fn should_filter_projects_by_company() {
    let w = world();
    let list = ListProjectsUseCase {
        projects: w.store.clone(),
    };
    let projects = list
        .execute(ProjectFilter::Compania(w.company.id))
        .await
        .unwrap();
    assert_eq!(projects.len(), 1);
    assert_eq!(projects[0].id, w.project.id);
    assert!(
        list.execute(ProjectFilter::Creador(w.outsider.clone()))
            .await
            .unwrap()
            .is_empty()
    );
}
