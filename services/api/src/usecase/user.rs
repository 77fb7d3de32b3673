use anyhow::Context as _;
use chrono::{DateTime, Duration, Utc};
use rand::RngExt;
use uuid::Uuid;

use albaran_auth_types::token::issue_session_token;
use albaran_domain::schema::{FieldRule, FieldValue, Rule, Validate, validate};

use crate::domain::repository::{PasswordHasher, UserRepository};
use crate::domain::types::{MIN_PASSWORD_LEN, User, UserProfile, VALIDATION_CODE_TTL_SECS};
use crate::error::{ApiError, Resource};

fn generate_validation_code() -> String {
    rand::rng().random_range(100_000..1_000_000u32).to_string()
}

fn code_expiry(now: DateTime<Utc>) -> DateTime<Utc> {
    now + Duration::seconds(VALIDATION_CODE_TTL_SECS)
}

// ── Register ─────────────────────────────────────────────────────────────────

pub struct RegisterInput {
    pub email: Option<String>,
    pub password: Option<String>,
    pub nombre: Option<String>,
    pub apellidos: Option<String>,
    pub nif: Option<String>,
    pub direccion: Option<String>,
}

impl Validate for RegisterInput {
    const SCHEMA: &'static [FieldRule] = &[
        FieldRule::new("email", &[Rule::Required, Rule::Email]),
        FieldRule::new(
            "password",
            &[Rule::Required, Rule::MinLength(MIN_PASSWORD_LEN)],
        ),
        FieldRule::new("nombre", &[Rule::Required]),
        FieldRule::new("apellidos", &[Rule::Required]),
        FieldRule::new("nif", &[Rule::Required]),
        FieldRule::new("direccion", &[Rule::Required]),
    ];

    fn value(&self, field: &str) -> FieldValue<'_> {
        match field {
            "email" => FieldValue::text(&self.email),
            "password" => FieldValue::text(&self.password),
            "nombre" => FieldValue::text(&self.nombre),
            "apellidos" => FieldValue::text(&self.apellidos),
            "nif" => FieldValue::text(&self.nif),
            "direccion" => FieldValue::text(&self.direccion),
            _ => FieldValue::Absent,
        }
    }
}

/// The new user's id and the code to deliver out of band.
pub struct RegisterOutput {
    pub id: Uuid,
    pub validation_code: String,
}

pub struct RegisterUseCase<U: UserRepository, H: PasswordHasher> {
    pub users: U,
    pub hasher: H,
}

impl<U: UserRepository, H: PasswordHasher> RegisterUseCase<U, H> {
    pub async fn execute(&self, input: RegisterInput) -> Result<RegisterOutput, ApiError> {
        validate(&input)?;
        let email = input.email.unwrap_or_default();

        if self.users.find_by_email(&email).await?.is_some() {
            return Err(ApiError::Duplicate {
                entity: Resource::User,
                field: "email",
                value: email,
            });
        }

        let password_hash = self.hasher.hash(&input.password.unwrap_or_default())?;
        let code = generate_validation_code();
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            email,
            password_hash,
            nombre: input.nombre.unwrap_or_default(),
            apellidos: input.apellidos.unwrap_or_default(),
            nif: input.nif.unwrap_or_default(),
            direccion: input.direccion.unwrap_or_default(),
            is_validated: false,
            validation_code: Some(code.clone()),
            validation_code_expires: Some(code_expiry(now)),
            created_at: now,
            updated_at: now,
        };
        self.users.create(&user).await?;
        tracing::info!(user_id = %user.id, "user registered");

        Ok(RegisterOutput {
            id: user.id,
            validation_code: code,
        })
    }
}

// ── Login ────────────────────────────────────────────────────────────────────

pub struct LoginInput {
    pub email: String,
    pub password: String,
}

pub struct LoginOutput {
    pub user: UserProfile,
    pub token: String,
    pub expires_at: u64,
}

pub struct LoginUseCase<U: UserRepository, H: PasswordHasher> {
    pub users: U,
    pub hasher: H,
    pub jwt_secret: String,
}

impl<U: UserRepository, H: PasswordHasher> LoginUseCase<U, H> {
    pub async fn execute(&self, input: LoginInput) -> Result<LoginOutput, ApiError> {
        // 1. Unknown email → 404
        let user = self
            .users
            .find_by_email(&input.email)
            .await?
            .ok_or_else(|| ApiError::UnknownUser(input.email.clone()))?;

        // 2. Wrong password → 401
        if !self.hasher.verify(&input.password, &user.password_hash)? {
            return Err(ApiError::InvalidCredentials);
        }

        // 3. Account not yet validated → 400
        if !user.is_validated {
            return Err(ApiError::Unvalidated(user.email));
        }

        let (token, expires_at) = issue_session_token(user.id, &user.email, &self.jwt_secret)
            .context("issue session token")?;
        Ok(LoginOutput {
            user: user.profile(),
            token,
            expires_at,
        })
    }
}

// ── ValidateUser ─────────────────────────────────────────────────────────────

pub struct ValidateUserUseCase<U: UserRepository> {
    pub users: U,
}

impl<U: UserRepository> ValidateUserUseCase<U> {
    pub async fn execute(&self, email: &str, code: &str) -> Result<UserProfile, ApiError> {
        let mut user = self
            .users
            .find_by_email(email)
            .await?
            .filter(|u| u.accepts_code(code, Utc::now()))
            .ok_or(ApiError::InvalidCode)?;

        user.is_validated = true;
        user.validation_code = None;
        user.validation_code_expires = None;
        user.updated_at = Utc::now();
        self.users.update(&user).await?;
        tracing::info!(user_id = %user.id, "user validated");

        Ok(user.profile())
    }
}

// ── ResendValidationCode ─────────────────────────────────────────────────────

pub struct ResendCodeUseCase<U: UserRepository> {
    pub users: U,
}

impl<U: UserRepository> ResendCodeUseCase<U> {
    /// Returns the freshly issued code.
    pub async fn execute(&self, email: &str) -> Result<String, ApiError> {
        let mut user = self
            .users
            .find_by_email(email)
            .await?
            .ok_or_else(|| ApiError::UnknownUser(email.to_owned()))?;
        if user.is_validated {
            return Err(ApiError::AlreadyValidated);
        }

        let code = generate_validation_code();
        let now = Utc::now();
        user.validation_code = Some(code.clone());
        user.validation_code_expires = Some(code_expiry(now));
        user.updated_at = now;
        self.users.update(&user).await?;

        Ok(code)
    }
}

// ── ChangePassword ───────────────────────────────────────────────────────────

pub struct ChangePasswordInput {
    pub current_password: String,
    pub new_password: String,
}

pub struct ChangePasswordUseCase<U: UserRepository, H: PasswordHasher> {
    pub users: U,
    pub hasher: H,
}

impl<U: UserRepository, H: PasswordHasher> ChangePasswordUseCase<U, H> {
    pub async fn execute(&self, user_id: Uuid, input: ChangePasswordInput) -> Result<(), ApiError> {
        let mut user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or(ApiError::NotFound(Resource::User))?;

        if !self
            .hasher
            .verify(&input.current_password, &user.password_hash)?
        {
            return Err(ApiError::InvalidCredentials);
        }
        if input.new_password == input.current_password {
            return Err(ApiError::Validation(
                "new password must differ from the current one".into(),
            ));
        }
        if input.new_password.chars().count() < MIN_PASSWORD_LEN {
            return Err(ApiError::Validation(format!(
                "newPassword must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }

        user.password_hash = self.hasher.hash(&input.new_password)?;
        user.updated_at = Utc::now();
        self.users.update(&user).await?;
        tracing::info!(user_id = %user.id, "password changed");
        Ok(())
    }
}

// ── GetUserInfo ──────────────────────────────────────────────────────────────

pub struct GetUserInfoUseCase<U: UserRepository> {
    pub users: U,
}

impl<U: UserRepository> GetUserInfoUseCase<U> {
    pub async fn execute(&self, user_id: Uuid) -> Result<UserProfile, ApiError> {
        self.users
            .find_by_id(user_id)
            .await?
            .map(|u| u.profile())
            .ok_or(ApiError::NotFound(Resource::User))
    }
}
