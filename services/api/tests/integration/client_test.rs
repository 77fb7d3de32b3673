use albaran_api::domain::types::ClientFilter;
use albaran_api::error::{ApiError, Resource};
use albaran_api::usecase::client::{
    ClientPatch, CreateClientInput, CreateClientUseCase, DeleteClientUseCase, GetClientUseCase,
    ListClientsUseCase, UpdateClientUseCase,
};

use crate::helpers::{MemoryStore, World, test_client, test_company, world};

fn input(email: &str, nif: &str) -> CreateClientInput {
    CreateClientInput {
        nombre: Some("Marta".to_owned()),
        apellidos: Some("Ruiz".to_owned()),
        email: Some(email.to_owned()),
        telefono: Some("600000001".to_owned()),
        nif: Some(nif.to_owned()),
        direccion: Some("Plaza Nueva 7".to_owned()),
        compania: None,
    }
}

fn create(w: &World) -> CreateClientUseCase<MemoryStore, MemoryStore, MemoryStore> {
    CreateClientUseCase {
        clients: w.store.clone(),
        companies: w.store.clone(),
        users: w.store.clone(),
    }
}

// ── CreateClient ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_create_client_with_fresh_email_and_nif() {
    let w = world();
    let client = create(&w)
        .execute(&w.creator, input("marta@cliente.com", "Y0000001"))
        .await
        .unwrap();
    assert!(client.activo);
    assert_eq!(client.creador, w.creator);
    assert_eq!(w.store.client(client.id).email, "marta@cliente.com");
}

#[tokio::test]
async fn should_name_email_when_email_collides() {
    let w = world();
    let result = create(&w)
        .execute(&w.creator, input(&w.client.email, "Y0000002"))
        .await;
    match result {
        Err(e @ ApiError::Duplicate { field: "email", .. }) => {
            assert!(e.to_string().contains("email"), "{e}")
        }
        other => panic!("expected Duplicate email, got {:?}", other.err()),
    }
}

#[tokio::test]
async fn should_name_nif_when_nif_collides() {
    let w = world();
    let result = create(&w)
        .execute(&w.creator, input("otra@cliente.com", &w.client.nif))
        .await;
    assert!(
        matches!(result, Err(ApiError::Duplicate { field: "nif", .. })),
        "expected Duplicate nif, got {:?}",
        result.err()
    );
}

#[tokio::test]
async fn should_reject_company_the_creator_does_not_belong_to() {
    let w = world();
    let foreign = test_company("otro@x.com", &[]);
    w.store.companies.lock().unwrap().push(foreign.clone());
    let mut body = input("marta@cliente.com", "Y0000003");
    body.compania = Some(foreign.id);
    let result = create(&w).execute(&w.creator, body).await;
    assert!(matches!(result, Err(ApiError::Forbidden(Resource::Company))));
}

#[tokio::test]
async fn should_reject_client_from_unknown_creator() {
    let w = world();
    let result = create(&w)
        .execute("ghost@x.com", input("marta@cliente.com", "Y0000004"))
        .await;
    assert!(matches!(result, Err(ApiError::UnknownUser(_))));
}

#[tokio::test]
async fn should_reject_malformed_client_email() {
    let w = world();
    let result = create(&w)
        .execute(&w.creator, input("marta.cliente.com", "Y0000005"))
        .await;
    match result {
        Err(ApiError::Validation(msg)) => assert!(msg.starts_with("email"), "{msg}"),
        other => panic!("expected Validation, got {:?}", other.err()),
    }
}

// ── UpdateClient ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_let_company_member_update_client() {
    let w = world();
    let usecase = UpdateClientUseCase {
        clients: w.store.clone(),
        companies: w.store.clone(),
    };
    let patch = ClientPatch {
        telefono: Some("699999999".to_owned()),
        ..Default::default()
    };
    let client = usecase.execute(w.client.id, &w.member, patch).await.unwrap();
    assert_eq!(client.telefono, "699999999");
    assert_eq!(client.nombre, w.client.nombre);
}

#[tokio::test]
async fn should_forbid_outsider_from_updating_client() {
    let w = world();
    let usecase = UpdateClientUseCase {
        clients: w.store.clone(),
        companies: w.store.clone(),
    };
    let result = usecase
        .execute(w.client.id, &w.outsider, ClientPatch::default())
        .await;
    assert!(matches!(result, Err(ApiError::Forbidden(Resource::Client))));
}

#[tokio::test]
async fn should_allow_keeping_own_email_on_update() {
    let w = world();
    let usecase = UpdateClientUseCase {
        clients: w.store.clone(),
        companies: w.store.clone(),
    };
    let patch = ClientPatch {
        email: Some(w.client.email.clone()),
        nif: Some(w.client.nif.clone()),
        ..Default::default()
    };
    assert!(usecase.execute(w.client.id, &w.creator, patch).await.is_ok());
}

#[tokio::test]
async fn should_reject_email_taken_by_another_client_on_update() {
    let w = world();
    let other = test_client(&w.creator, None);
    w.store.clients.lock().unwrap().push(other.clone());
    let usecase = UpdateClientUseCase {
        clients: w.store.clone(),
        companies: w.store.clone(),
    };
    let patch = ClientPatch {
        email: Some(other.email.clone()),
        ..Default::default()
    };
    let result = usecase.execute(w.client.id, &w.creator, patch).await;
    assert!(matches!(result, Err(ApiError::Duplicate { field: "email", .. })));
}

#[tokio::test]
async fn should_reject_empty_text_in_patch() {
    let w = world();
    let usecase = UpdateClientUseCase {
        clients: w.store.clone(),
        companies: w.store.clone(),
    };
    let patch = ClientPatch {
        nombre: Some(String::new()),
        ..Default::default()
    };
    let result = usecase.execute(w.client.id, &w.creator, patch).await;
    assert!(matches!(result, Err(ApiError::Validation(_))));
}

#[tokio::test]
async fn should_detach_client_from_company() {
    let w = world();
    let usecase = UpdateClientUseCase {
        clients: w.store.clone(),
        companies: w.store.clone(),
    };
    let patch = ClientPatch {
        compania: Some(None),
        ..Default::default()
    };
    let client = usecase.execute(w.client.id, &w.creator, patch).await.unwrap();
    assert_eq!(client.compania, None);
}

// ── DeleteClient / List / Get ────────────────────────────────────────────────

#[tokio::test]
async fn should_soft_delete_client() {
    let w = world();
    let delete = DeleteClientUseCase {
        clients: w.store.clone(),
        companies: w.store.clone(),
    };
    delete.execute(w.client.id, &w.creator).await.unwrap();

    // Still retrievable by id, flagged inactive
    let get = GetClientUseCase {
        clients: w.store.clone(),
    };
    let client = get.execute(w.client.id).await.unwrap();
    assert!(!client.activo);

    // Excluded from list queries
    let list = ListClientsUseCase {
        clients: w.store.clone(),
    };
    assert!(list.execute(ClientFilter::All).await.unwrap().is_empty());
    assert!(
        list.execute(ClientFilter::Compania(w.company.id))
            .await
            .unwrap()
            .is_empty()
    );
}

#[tokio::test]
async fn should_forbid_outsider_from_deleting_client() {
    let w = world();
    let delete = DeleteClientUseCase {
        clients: w.store.clone(),
        companies: w.store.clone(),
    };
    let result = delete.execute(w.client.id, &w.outsider).await;
    assert!(matches!(result, Err(ApiError::Forbidden(Resource::Client))));
    assert!(w.store.client(w.client.id).activo);
}

#[tokio::test]
async fn should_filter_clients_by_creator() {
    let w = world();
    w.store
        .clients
        .lock()
        .unwrap()
        .push(test_client(&w.outsider, None));
    let list = ListClientsUseCase {
        clients: w.store.clone(),
    };
    let mine = list
        .execute(ClientFilter::Creador(w.creator.clone()))
        .await
        .unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].id, w.client.id);
}

#[tokio::test]
async fn should_return_not_found_for_unknown_client() {
    let w = world();
    let get = GetClientUseCase {
        clients: w.store.clone(),
    };
    let result = get.execute(uuid::Uuid::new_v4()).await;
    assert!(matches!(result, Err(ApiError::NotFound(Resource::Client))));
}
