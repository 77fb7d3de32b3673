use albaran_api::error::ApiError;
use albaran_api::usecase::user::{
    ChangePasswordInput, ChangePasswordUseCase, GetUserInfoUseCase, LoginInput, LoginUseCase,
    RegisterInput, RegisterUseCase, ResendCodeUseCase, ValidateUserUseCase,
};
use albaran_auth_types::token::validate_session_token;

use crate::helpers::{MemoryStore, PlainHasher, TEST_JWT_SECRET, test_user, unvalidated_user};

fn register_input(email: &str, password: &str) -> RegisterInput {
    RegisterInput {
        email: Some(email.to_owned()),
        password: Some(password.to_owned()),
        nombre: Some("Alice".to_owned()),
        apellidos: Some("Martín".to_owned()),
        nif: Some("00000000T".to_owned()),
        direccion: Some("Calle Luna 3".to_owned()),
    }
}

fn login(store: &MemoryStore) -> LoginUseCase<MemoryStore, PlainHasher> {
    LoginUseCase {
        users: store.clone(),
        hasher: PlainHasher,
        jwt_secret: TEST_JWT_SECRET.to_owned(),
    }
}

fn credentials(email: &str, password: &str) -> LoginInput {
    LoginInput {
        email: email.to_owned(),
        password: password.to_owned(),
    }
}

// ── Register / Validate / Login ──────────────────────────────────────────────

#[tokio::test]
async fn should_walk_register_validate_login_flow() {
    let store = MemoryStore::new();
    let register = RegisterUseCase {
        users: store.clone(),
        hasher: PlainHasher,
    };
    let output = register
        .execute(register_input("alice@x.com", "pw123456"))
        .await
        .unwrap();
    assert_eq!(output.validation_code.len(), 6);
    assert!(output.validation_code.chars().all(|c| c.is_ascii_digit()));

    // Login before validation fails
    let result = login(&store)
        .execute(credentials("alice@x.com", "pw123456"))
        .await;
    assert!(
        matches!(result, Err(ApiError::Unvalidated(ref e)) if e == "alice@x.com"),
        "expected Unvalidated, got {:?}",
        result.err()
    );

    // Wrong code is rejected
    let validate = ValidateUserUseCase {
        users: store.clone(),
    };
    let wrong = if output.validation_code == "000000" { "111111" } else { "000000" };
    let result = validate.execute("alice@x.com", wrong).await;
    assert!(matches!(result, Err(ApiError::InvalidCode)));

    // Right code validates
    let profile = validate
        .execute("alice@x.com", &output.validation_code)
        .await
        .unwrap();
    assert!(profile.is_validated);
    assert_eq!(profile.id, output.id);
    assert!(store.user("alice@x.com").validation_code.is_none());

    // Login now succeeds and issues a session for this user
    let session = login(&store)
        .execute(credentials("alice@x.com", "pw123456"))
        .await
        .unwrap();
    assert_eq!(session.user.email, "alice@x.com");
    let info = validate_session_token(&session.token, TEST_JWT_SECRET).unwrap();
    assert_eq!(info.user_id, output.id);
    assert_eq!(info.exp, session.expires_at);
}

#[tokio::test]
async fn should_hash_password_on_register() {
    let store = MemoryStore::new();
    let register = RegisterUseCase {
        users: store.clone(),
        hasher: PlainHasher,
    };
    register
        .execute(register_input("alice@x.com", "pw123456"))
        .await
        .unwrap();
    assert_eq!(store.user("alice@x.com").password_hash, "plain:pw123456");
}

#[tokio::test]
async fn should_reject_duplicate_email_on_register() {
    let store = MemoryStore::new().with_user(test_user("alice@x.com"));
    let register = RegisterUseCase {
        users: store,
        hasher: PlainHasher,
    };
    let result = register
        .execute(register_input("alice@x.com", "pw123456"))
        .await;
    assert!(
        matches!(result, Err(ApiError::Duplicate { field: "email", .. })),
        "expected Duplicate email, got {:?}",
        result.err()
    );
}

#[tokio::test]
async fn should_reject_short_password_on_register() {
    let register = RegisterUseCase {
        users: MemoryStore::new(),
        hasher: PlainHasher,
    };
    let result = register.execute(register_input("alice@x.com", "short")).await;
    match result {
        Err(ApiError::Validation(msg)) => assert!(msg.starts_with("password"), "{msg}"),
        other => panic!("expected Validation, got {:?}", other.err()),
    }
}

#[tokio::test]
async fn should_reject_malformed_email_on_register() {
    let register = RegisterUseCase {
        users: MemoryStore::new(),
        hasher: PlainHasher,
    };
    let result = register.execute(register_input("not-an-email", "pw123456")).await;
    match result {
        Err(ApiError::Validation(msg)) => assert!(msg.starts_with("email"), "{msg}"),
        other => panic!("expected Validation, got {:?}", other.err()),
    }
}

#[tokio::test]
async fn should_reject_missing_field_on_register() {
    let register = RegisterUseCase {
        users: MemoryStore::new(),
        hasher: PlainHasher,
    };
    let mut input = register_input("alice@x.com", "pw123456");
    input.nif = None;
    let result = register.execute(input).await;
    match result {
        Err(ApiError::Validation(msg)) => assert_eq!(msg, "nif is required"),
        other => panic!("expected Validation, got {:?}", other.err()),
    }
}

#[tokio::test]
async fn should_reject_unknown_email_on_login() {
    let result = login(&MemoryStore::new())
        .execute(credentials("ghost@x.com", "pw123456"))
        .await;
    assert!(matches!(result, Err(ApiError::UnknownUser(_))));
}

#[tokio::test]
async fn should_reject_wrong_password_on_login() {
    let store = MemoryStore::new().with_user(test_user("alice@x.com"));
    let result = login(&store)
        .execute(credentials("alice@x.com", "wrong-password"))
        .await;
    assert!(matches!(result, Err(ApiError::InvalidCredentials)));
}

#[tokio::test]
async fn should_reject_expired_validation_code() {
    let mut user = unvalidated_user("alice@x.com");
    user.validation_code_expires = Some(chrono::Utc::now() - chrono::Duration::minutes(1));
    let store = MemoryStore::new().with_user(user);
    let result = ValidateUserUseCase { users: store }
        .execute("alice@x.com", "123456")
        .await;
    assert!(matches!(result, Err(ApiError::InvalidCode)));
}

// ── ResendCode ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_replace_code_on_resend() {
    let store = MemoryStore::new().with_user(unvalidated_user("alice@x.com"));
    let usecase = ResendCodeUseCase {
        users: store.clone(),
    };
    let code = usecase.execute("alice@x.com").await.unwrap();
    let user = store.user("alice@x.com");
    assert_eq!(user.validation_code.as_deref(), Some(code.as_str()));
    assert!(user.validation_code_expires.unwrap() > chrono::Utc::now());
}

#[tokio::test]
async fn should_reject_resend_for_validated_user() {
    let store = MemoryStore::new().with_user(test_user("alice@x.com"));
    let result = ResendCodeUseCase { users: store }
        .execute("alice@x.com")
        .await;
    assert!(matches!(result, Err(ApiError::AlreadyValidated)));
}

// ── ChangePassword ───────────────────────────────────────────────────────────

#[tokio::test]
async fn should_change_password_when_current_matches() {
    let user = test_user("alice@x.com");
    let store = MemoryStore::new().with_user(user.clone());
    let usecase = ChangePasswordUseCase {
        users: store.clone(),
        hasher: PlainHasher,
    };
    usecase
        .execute(
            user.id,
            ChangePasswordInput {
                current_password: "password123".into(),
                new_password: "brand-new-pass".into(),
            },
        )
        .await
        .unwrap();
    assert_eq!(store.user("alice@x.com").password_hash, "plain:brand-new-pass");
}

#[tokio::test]
async fn should_reject_password_change_with_wrong_current() {
    let user = test_user("alice@x.com");
    let usecase = ChangePasswordUseCase {
        users: MemoryStore::new().with_user(user.clone()),
        hasher: PlainHasher,
    };
    let result = usecase
        .execute(
            user.id,
            ChangePasswordInput {
                current_password: "nope".into(),
                new_password: "brand-new-pass".into(),
            },
        )
        .await;
    assert!(matches!(result, Err(ApiError::InvalidCredentials)));
}

#[tokio::test]
async fn should_reject_unchanged_password() {
    let user = test_user("alice@x.com");
    let usecase = ChangePasswordUseCase {
        users: MemoryStore::new().with_user(user.clone()),
        hasher: PlainHasher,
    };
    let result = usecase
        .execute(
            user.id,
            ChangePasswordInput {
                current_password: "password123".into(),
                new_password: "password123".into(),
            },
        )
        .await;
    assert!(matches!(result, Err(ApiError::Validation(_))));
}

// ── GetUserInfo ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_return_profile_without_credentials() {
    let user = test_user("alice@x.com");
    let usecase = GetUserInfoUseCase {
        users: MemoryStore::new().with_user(user.clone()),
    };
    let profile = usecase.execute(user.id).await.unwrap();
    assert_eq!(profile, user.profile());
}
